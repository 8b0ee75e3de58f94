//! Add, update and delete commands.

use crate::args::{AddArgs, DeleteArgs, UpdateArgs};
use crate::commands::{open, store_result, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Expense;
use crate::{Config, Result};
use chrono::Local;

/// Records a new expense and returns it with its assigned id.
pub async fn add(config: Config, args: AddArgs) -> Result<Out<Expense>> {
    let mut tracker = open(&config);
    let new = args.new_expense(Local::now().date_naive());
    let added = store_result(tracker.add(new))?;
    let message = format!(
        "Added expense {} of {} on {}",
        added.id(),
        added.amount().currency(),
        added.date()
    );
    Ok(Out::new(message, added))
}

/// Changes the given fields of an expense. Fails when no expense has the id.
pub async fn update(config: Config, args: UpdateArgs) -> Result<Out<Expense>> {
    let updates = args.updates();
    if updates.is_empty() {
        return Err(anyhow::anyhow!("No fields to update were given"))
            .pub_result(ErrorType::Request);
    }
    let mut tracker = open(&config);
    let updated = store_result(tracker.update(&args.id(), updates))?;
    Ok(Out::new(format!("Updated expense {}", updated.id()), updated))
}

/// Deletes an expense. Deleting an id that does not exist changes nothing and is not an error.
pub async fn delete(config: Config, args: DeleteArgs) -> Result<Out<Expense>> {
    let id = args.id();
    let mut tracker = open(&config);
    Ok(match store_result(tracker.remove(&id))? {
        Some(removed) => Out::new(format!("Deleted expense {id}"), removed),
        None => format!("There is no expense with id {id}; nothing was deleted").into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{Amount, Category};
    use crate::storage::Storage;
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_add_then_load() {
        let env = TestEnv::new().await;
        let args = AddArgs::new(amount("24.58"), "DOLLARAMA", Category::Shopping)
            .with_date(NaiveDate::from_ymd_opt(2025, 8, 5).unwrap());
        let out = add(env.config(), args).await.unwrap();
        let added = out.structure().unwrap().clone();
        assert!(out.message().contains("$24.58"));

        let stored = env.config().storage().load();
        assert_eq!(stored, vec![added]);
    }

    #[tokio::test]
    async fn test_add_recurring_defaults_to_monthly() {
        let env = TestEnv::new().await;
        let args =
            AddArgs::new(amount("17.99"), "Netflix", Category::Subscriptions).with_recurring(None);
        let out = add(env.config(), args).await.unwrap();
        let added = out.structure().unwrap();
        assert!(added.recurring());
        assert_eq!(added.frequency(), "monthly");
    }

    #[tokio::test]
    async fn test_add_over_quota_is_storage_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::create(dir.path(), 5, Some(64)).await.unwrap();
        let args = AddArgs::new(amount("1500"), "Rent Payment", Category::Housing);
        let err = add(config, args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Storage));
        assert!(format!("{err:#}").contains("storage is full"));
    }

    #[tokio::test]
    async fn test_update() {
        let env = TestEnv::new().await;
        env.insert_demo_expenses();
        let args = UpdateArgs::new("3")
            .with_amount(amount("30"))
            .with_category(Category::Groceries);
        let out = update(env.config(), args).await.unwrap();
        let updated = out.structure().unwrap();
        assert_eq!(updated.amount(), amount("30"));
        assert_eq!(updated.category(), Category::Groceries);
        assert_eq!(updated.description(), "DOLLARAMA # 741 TORONTO ON");

        let stored = env.config().storage().load();
        assert_eq!(&stored[1], updated);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let env = TestEnv::new().await;
        env.insert_demo_expenses();
        let err = update(env.config(), UpdateArgs::new("404").with_amount(amount("1")))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::NotFound));
    }

    #[tokio::test]
    async fn test_update_without_fields_is_rejected() {
        let env = TestEnv::new().await;
        env.insert_demo_expenses();
        let err = update(env.config(), UpdateArgs::new("3")).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Request));
    }

    #[tokio::test]
    async fn test_delete() {
        let env = TestEnv::new().await;
        env.insert_demo_expenses();
        let out = delete(env.config(), DeleteArgs::new("3")).await.unwrap();
        assert_eq!(out.structure().unwrap().id().as_str(), "3");
        assert_eq!(env.config().storage().load().len(), 4);
    }

    #[tokio::test]
    async fn test_delete_missing_changes_nothing() {
        let env = TestEnv::new().await;
        env.insert_demo_expenses();
        let before = env.config().storage().load();
        let out = delete(env.config(), DeleteArgs::new("nope")).await.unwrap();
        assert!(out.structure().is_none());
        assert_eq!(env.config().storage().load(), before);
    }
}
