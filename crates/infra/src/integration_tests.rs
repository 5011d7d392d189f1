//! Integration tests for the kitchen: Kitchen facade → services → store.
//!
//! Every scenario runs against both the in-memory and the SQLite store.
//!
//! Verifies:
//! - Serving deducts exactly one portion or changes nothing
//! - Movement records and serving events stay paired
//! - Role policy is enforced before any write
//! - Concurrent serves never oversell stock

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use galley_auth::{Principal, Role, UserAccount};
    use galley_core::{DomainError, IngredientName};
    use galley_inventory::MovementKind;

    use crate::config::AppConfig;
    use crate::error::ServiceError;
    use crate::kitchen::Kitchen;
    use crate::store::{InMemoryKitchenStore, KitchenStore, SqliteKitchenStore};

    fn admin() -> Principal {
        Principal::new("admin1", Role::Admin)
    }

    fn manager() -> Principal {
        Principal::new("manager1", Role::Manager)
    }

    fn cook() -> Principal {
        Principal::new("cook1", Role::Cook)
    }

    fn kitchen_on(store: Arc<dyn KitchenStore>) -> Kitchen {
        Kitchen::new(store, &AppConfig::default())
    }

    async fn memory_kitchen() -> Kitchen {
        kitchen_on(Arc::new(InMemoryKitchenStore::new()))
    }

    async fn sqlite_kitchen() -> Kitchen {
        kitchen_on(Arc::new(SqliteKitchenStore::in_memory().await.unwrap()))
    }

    fn recipe(pairs: &[(&str, i64)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    async fn quantity(kitchen: &Kitchen, name: &str) -> Option<i64> {
        kitchen
            .stock_entry(&admin(), name)
            .await
            .unwrap()
            .map(|e| e.quantity)
    }

    async fn stock_cake(kitchen: &Kitchen, flour: i64, egg: Option<i64>) {
        kitchen
            .add_stock(&manager(), "flour", &flour.to_string(), "2024-03-01")
            .await
            .unwrap();
        if let Some(egg) = egg {
            kitchen
                .add_stock(&manager(), "egg", &egg.to_string(), "2024-03-01")
                .await
                .unwrap();
        }
        kitchen
            .set_recipe(&admin(), "Cake", &recipe(&[("flour", 200), ("egg", 2)]))
            .await
            .unwrap();
    }

    // --- scenarios ---

    async fn serving_cake_deducts_one_portion(kitchen: Kitchen) {
        stock_cake(&kitchen, 500, Some(4)).await;

        let receipt = kitchen.serve(&cook(), "Cake").await.unwrap();
        assert_eq!(receipt.portions_served(), 1);
        assert_eq!(receipt.serving.dish.as_str(), "Cake");
        assert_eq!(receipt.serving.actor, "cook1");

        assert_eq!(quantity(&kitchen, "flour").await, Some(300));
        assert_eq!(quantity(&kitchen, "egg").await, Some(2));

        let counts = kitchen.serving_counts(&manager()).await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.values().copied().collect::<Vec<_>>(), vec![1]);

        let history = kitchen.stock_history(&manager()).await.unwrap();
        assert_eq!(history.len(), 4);
        let deductions: Vec<_> = history
            .iter()
            .filter(|m| m.kind == MovementKind::Deduction)
            .collect();
        assert_eq!(deductions.len(), 2);
        assert!(deductions.iter().all(|m| m.actor == "cook1"
            && m.occurred_at == receipt.serving.served_at));
        assert_eq!(receipt.movements, deductions.into_iter().cloned().collect::<Vec<_>>());
    }

    async fn insufficient_stock_changes_nothing(kitchen: Kitchen) {
        kitchen
            .add_stock(&manager(), "flour", "100", "2024-03-01")
            .await
            .unwrap();
        kitchen
            .set_recipe(&admin(), "Cake", &recipe(&[("flour", 200)]))
            .await
            .unwrap();

        let err = kitchen.serve(&cook(), "Cake").await.unwrap_err();
        assert_eq!(err.code(), "insufficient_stock");
        assert_eq!(
            err.messages(),
            vec!["flour insufficient: 100 available, 200 required".to_string()]
        );

        assert_eq!(quantity(&kitchen, "flour").await, Some(100));
        assert_eq!(kitchen.stock_history(&admin()).await.unwrap().len(), 1);
        assert!(kitchen.serving_history(&admin()).await.unwrap().is_empty());
    }

    async fn missing_ingredient_fails_even_when_others_suffice(kitchen: Kitchen) {
        stock_cake(&kitchen, 10_000, None).await;

        let err = kitchen.serve(&cook(), "Cake").await.unwrap_err();
        assert!(matches!(
            &err,
            ServiceError::Domain(DomainError::InsufficientStock(reasons))
                if reasons == &vec!["egg missing from stock".to_string()]
        ));
        assert_eq!(quantity(&kitchen, "flour").await, Some(10_000));
    }

    async fn serving_without_recipe_is_recipe_not_found(kitchen: Kitchen) {
        let err = kitchen.serve(&cook(), "Soup").await.unwrap_err();
        assert_eq!(err.code(), "recipe_not_found");
        assert_eq!(err.messages(), vec!["recipe not found for 'Soup'".to_string()]);
    }

    async fn stock_runs_out_after_the_last_full_portion(kitchen: Kitchen) {
        stock_cake(&kitchen, 400, Some(4)).await;

        kitchen.serve(&cook(), "Cake").await.unwrap();
        kitchen.serve(&admin(), "Cake").await.unwrap();
        let err = kitchen.serve(&cook(), "Cake").await.unwrap_err();
        assert_eq!(err.messages().len(), 2);

        assert_eq!(quantity(&kitchen, "flour").await, Some(0));
        assert_eq!(quantity(&kitchen, "egg").await, Some(0));
        assert_eq!(kitchen.serving_history(&admin()).await.unwrap().len(), 2);
    }

    async fn recipe_round_trips_and_is_replaced_wholesale(kitchen: Kitchen) {
        let first = recipe(&[("flour", 200), ("egg", 2)]);
        kitchen.set_recipe(&admin(), "Cake", &first).await.unwrap();
        let stored = kitchen.recipe(&admin(), "Cake").await.unwrap().unwrap();
        let lines: BTreeMap<String, String> = stored
            .lines()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(lines, first);

        kitchen
            .set_recipe_text(&admin(), "Cake", "sugar: 50\n\nbutter:25\n")
            .await
            .unwrap();
        let stored = kitchen.recipe(&admin(), "Cake").await.unwrap().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored.required(&IngredientName::parse("sugar").unwrap()), Some(50));
        assert_eq!(stored.required(&IngredientName::parse("flour").unwrap()), None);

        kitchen
            .set_recipe(&admin(), "Bread", &recipe(&[("flour", 300)]))
            .await
            .unwrap();
        let dishes: Vec<String> = kitchen
            .list_dishes(&cook())
            .await
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(dishes, vec!["Bread".to_string(), "Cake".to_string()]);
    }

    async fn malformed_recipe_text_writes_nothing(kitchen: Kitchen) {
        let err = kitchen
            .set_recipe_text(&admin(), "Cake", "flour:200\negg two\n")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert!(kitchen.recipe(&admin(), "Cake").await.unwrap().is_none());
        assert!(kitchen.list_dishes(&admin()).await.unwrap().is_empty());

        let err = kitchen
            .set_recipe(&admin(), "Cake", &recipe(&[("flour", 0)]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");

        let err = kitchen.set_recipe(&admin(), "Cake", &BTreeMap::new()).await.unwrap_err();
        assert_eq!(err.messages(), vec!["at least one ingredient is required".to_string()]);

        let mut spelled_out = recipe(&[("flour", 200)]);
        spelled_out.insert("egg".to_string(), "two".to_string());
        let err = kitchen.set_recipe(&admin(), "Cake", &spelled_out).await.unwrap_err();
        assert_eq!(err.messages(), vec!["egg quantity must be an integer: 'two'".to_string()]);

        let err = kitchen.set_recipe(&cook(), "Cake", &spelled_out).await.unwrap_err();
        assert_eq!(err.code(), "permission_denied");
        assert!(kitchen.list_dishes(&admin()).await.unwrap().is_empty());
    }

    async fn restock_replaces_quantity_and_logs_addition(kitchen: Kitchen) {
        kitchen
            .add_stock(&manager(), "flour", "500", "2024-03-01")
            .await
            .unwrap();
        let movement = kitchen
            .add_stock(&admin(), " flour ", "120", "2024-03-02")
            .await
            .unwrap();
        assert_eq!(movement.kind, MovementKind::Addition);
        assert_eq!(movement.quantity, 120);
        assert_eq!(movement.actor, "admin1");

        let entry = kitchen.stock_entry(&manager(), "flour").await.unwrap().unwrap();
        assert_eq!(entry.quantity, 120);
        assert_eq!(entry.updated_on.to_string(), "2024-03-02");

        let history = kitchen.stock_history(&manager()).await.unwrap();
        let ids: Vec<i64> = history.iter().map(|m| m.id.get()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    async fn invalid_stock_input_is_rejected(kitchen: Kitchen) {
        for (name, quantity, date) in [
            ("flour", "10", "2024-13-01"),
            ("flour", "ten", "2024-03-01"),
            ("flour", "-5", "2024-03-01"),
            ("fl0ur!", "10", "2024-03-01"),
            ("", "10", "2024-03-01"),
        ] {
            let err = kitchen
                .add_stock(&manager(), name, quantity, date)
                .await
                .unwrap_err();
            assert_eq!(err.code(), "validation_error", "input {name:?} {quantity:?} {date:?}");
        }
        assert!(kitchen.list_stock(&manager()).await.unwrap().is_empty());
        assert!(kitchen.stock_history(&manager()).await.unwrap().is_empty());
    }

    async fn listings_are_stable_without_writes(kitchen: Kitchen) {
        stock_cake(&kitchen, 500, Some(4)).await;
        kitchen.serve(&cook(), "Cake").await.unwrap();

        let stock = kitchen.list_stock(&manager()).await.unwrap();
        assert_eq!(stock, kitchen.list_stock(&manager()).await.unwrap());
        let names: Vec<&str> = stock.iter().map(|e| e.ingredient.as_str()).collect();
        assert_eq!(names, vec!["egg", "flour"]);

        let history = kitchen.stock_history(&manager()).await.unwrap();
        assert_eq!(history, kitchen.stock_history(&manager()).await.unwrap());
    }

    async fn low_stock_reports_only_entries_below_threshold(kitchen: Kitchen) {
        kitchen.add_stock(&manager(), "flour", "50", "2024-03-01").await.unwrap();
        kitchen.add_stock(&manager(), "egg", "150", "2024-03-01").await.unwrap();

        let alerts = kitchen.low_stock(&manager(), None).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].to_string(), "flour stock low: 50 units");

        let alerts = kitchen.low_stock(&manager(), Some(200)).await.unwrap();
        assert_eq!(alerts.len(), 2);
    }

    async fn serving_counts_start_empty(kitchen: Kitchen) {
        assert!(kitchen.serving_counts(&admin()).await.unwrap().is_empty());
    }

    async fn roles_are_enforced_before_writes(kitchen: Kitchen) {
        let denied = |r: Result<(), ServiceError>| matches!(r, Err(ServiceError::PermissionDenied(_)));

        assert!(denied(
            kitchen
                .add_stock(&cook(), "flour", "500", "2024-03-01")
                .await
                .map(|_| ())
        ));
        assert!(denied(kitchen.list_stock(&cook()).await.map(|_| ())));
        assert!(denied(kitchen.stock_history(&cook()).await.map(|_| ())));
        assert!(denied(kitchen.low_stock(&cook(), None).await.map(|_| ())));
        assert!(denied(kitchen.serving_counts(&cook()).await.map(|_| ())));
        assert!(denied(kitchen.recipe(&cook(), "Cake").await.map(|_| ())));
        assert!(denied(
            kitchen
                .set_recipe(&cook(), "Cake", &recipe(&[("flour", 1)]))
                .await
                .map(|_| ())
        ));
        assert!(denied(
            kitchen
                .register_user(&cook(), "cook2", "secret1", "cook")
                .await
                .map(|_| ())
        ));

        assert!(denied(kitchen.serve(&manager(), "Cake").await.map(|_| ())));
        assert!(denied(kitchen.list_dishes(&manager()).await.map(|_| ())));
        assert!(denied(
            kitchen
                .set_recipe_text(&manager(), "Cake", "flour:1")
                .await
                .map(|_| ())
        ));
        assert!(denied(
            kitchen
                .register_user(&manager(), "cook2", "secret1", "cook")
                .await
                .map(|_| ())
        ));

        // Nothing reached storage.
        assert!(kitchen.list_stock(&admin()).await.unwrap().is_empty());
        assert!(kitchen.list_dishes(&admin()).await.unwrap().is_empty());

        // Denial wins over bad input.
        let err = kitchen.add_stock(&cook(), "", "", "").await.unwrap_err();
        assert_eq!(err.code(), "permission_denied");
    }

    async fn unknown_account_has_no_principal(kitchen: Kitchen) {
        assert_eq!(kitchen.accounts().principal("nobody").await.unwrap(), None);
        assert!(kitchen.login("nobody", "secret1").await.is_none());
    }

    macro_rules! on_both_stores {
        ($($scenario:ident),* $(,)?) => {
            mod in_memory {
                $(
                    #[tokio::test]
                    async fn $scenario() {
                        super::$scenario(super::memory_kitchen().await).await;
                    }
                )*
            }

            mod sqlite {
                $(
                    #[tokio::test]
                    async fn $scenario() {
                        super::$scenario(super::sqlite_kitchen().await).await;
                    }
                )*
            }
        };
    }

    on_both_stores!(
        serving_cake_deducts_one_portion,
        insufficient_stock_changes_nothing,
        missing_ingredient_fails_even_when_others_suffice,
        serving_without_recipe_is_recipe_not_found,
        stock_runs_out_after_the_last_full_portion,
        recipe_round_trips_and_is_replaced_wholesale,
        malformed_recipe_text_writes_nothing,
        restock_replaces_quantity_and_logs_addition,
        invalid_stock_input_is_rejected,
        listings_are_stable_without_writes,
        low_stock_reports_only_entries_below_threshold,
        serving_counts_start_empty,
        roles_are_enforced_before_writes,
        unknown_account_has_no_principal,
    );

    async fn concurrent_serves_never_oversell(kitchen: Kitchen) {
        // Three portions' worth of flour, twelve cooks.
        kitchen.add_stock(&manager(), "flour", "600", "2024-03-01").await.unwrap();
        kitchen
            .set_recipe(&admin(), "Bread", &recipe(&[("flour", 200)]))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..12 {
            let kitchen = kitchen.clone();
            handles.push(tokio::spawn(async move {
                kitchen.serve(&cook(), "Bread").await
            }));
        }

        let mut served = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => served += 1,
                Err(e) => assert_eq!(e.code(), "insufficient_stock"),
            }
        }

        assert_eq!(served, 3);
        assert_eq!(quantity(&kitchen, "flour").await, Some(0));
        assert_eq!(kitchen.serving_history(&admin()).await.unwrap().len(), 3);
        let deductions = kitchen
            .stock_history(&admin())
            .await
            .unwrap()
            .into_iter()
            .filter(|m| m.kind == MovementKind::Deduction)
            .count();
        assert_eq!(deductions, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_serves_never_oversell_in_memory() {
        concurrent_serves_never_oversell(memory_kitchen().await).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_serves_never_oversell_sqlite() {
        concurrent_serves_never_oversell(sqlite_kitchen().await).await;
    }

    #[tokio::test]
    async fn sqlite_store_persists_accounts() {
        let store = SqliteKitchenStore::in_memory().await.unwrap();
        let account = UserAccount {
            username: "cook2".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
            role: Role::Cook,
        };
        assert!(store.insert_account_if_absent(&account).await.unwrap());
        assert!(!store.insert_account_if_absent(&account).await.unwrap());

        let promoted = UserAccount {
            role: Role::Manager,
            ..account.clone()
        };
        store.put_account(&promoted).await.unwrap();
        assert_eq!(store.account("cook2").await.unwrap(), Some(promoted));
        assert_eq!(store.account("cook3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn login_sessions_follow_the_stored_role() {
        let kitchen = memory_kitchen().await;
        assert_eq!(kitchen.seed_default_users().await.unwrap(), 3);
        assert_eq!(kitchen.seed_default_users().await.unwrap(), 0);

        assert!(kitchen.login("cook1", "wrong").await.is_none());
        assert!(kitchen.login("ghost", "cook123").await.is_none());

        let (session, principal) = kitchen.login("cook1", "cook123").await.unwrap();
        assert_eq!(principal.role(), Role::Cook);
        assert_eq!(
            kitchen.resolve_session(&session.token).await.map(|p| p.role()),
            Some(Role::Cook)
        );

        kitchen
            .register_user(&admin(), "cook1", "cook123", "manager")
            .await
            .unwrap();
        assert_eq!(
            kitchen.resolve_session(&session.token).await.map(|p| p.role()),
            Some(Role::Manager)
        );

        assert!(kitchen.logout(&session.token));
        assert!(kitchen.resolve_session(&session.token).await.is_none());
    }

    #[tokio::test]
    async fn registration_validates_input() {
        let kitchen = memory_kitchen().await;
        for (username, password, role) in [
            ("cook 2", "secret1", "cook"),
            ("cook2", "short", "cook"),
            ("cook2", "secret1", "chef"),
        ] {
            let err = kitchen
                .register_user(&admin(), username, password, role)
                .await
                .unwrap_err();
            assert_eq!(err.code(), "validation_error");
        }
        assert_eq!(kitchen.accounts().principal("cook2").await.unwrap(), None);
    }
}
