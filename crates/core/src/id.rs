//! Strongly-typed identifiers used across the domain.
//!
//! Movement records and serving events are keyed by monotonic integers
//! assigned by the store on append.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a stock movement record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(i64);

/// Identifier of a serving event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServingId(i64);

macro_rules! impl_sequence_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            pub fn get(&self) -> i64 {
                self.0
            }

            /// The identifier assigned after this one.
            pub fn next(&self) -> Self {
                Self(self.0 + 1)
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::validation(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }
    };
}

impl_sequence_newtype!(MovementId, "MovementId");
impl_sequence_newtype!(ServingId, "ServingId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_ordered_by_sequence() {
        let first = MovementId::new(1);
        assert!(first < first.next());
        assert_eq!(first.next().get(), 2);
    }

    #[test]
    fn parse_rejects_non_numeric() {
        assert!("abc".parse::<ServingId>().is_err());
        assert_eq!(" 7 ".parse::<ServingId>().unwrap(), ServingId::new(7));
    }
}
