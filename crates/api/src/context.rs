use galley_auth::{Principal, Role, SessionToken};

/// Principal context for a request (authenticated identity + current role).
///
/// Inserted by the auth middleware; the token is kept so `/logout` can
/// revoke exactly the session that made the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
    token: SessionToken,
}

impl PrincipalContext {
    pub fn new(principal: Principal, token: SessionToken) -> Self {
        Self { principal, token }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn username(&self) -> &str {
        self.principal.username()
    }

    pub fn role(&self) -> Role {
        self.principal.role()
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }
}
