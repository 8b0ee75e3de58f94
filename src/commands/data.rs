//! Whole-dataset commands: export, import, clear and info.

use crate::args::{ClearArgs, ExportArgs, ImportArgs};
use crate::backup::{PRE_CLEAR, PRE_IMPORT};
use crate::commands::{import_result, open, plural, store_result, Out};
use crate::error::{ErrorType, IntoResult};
use crate::{transfer, utils, Config, Result};
use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writes every expense to a JSON or CSV file and returns the path written.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<PathBuf>> {
    let now = Utc::now();
    let format = args.format();
    let path = export_path(args.output(), &format.file_name(now));
    let tracker = open(&config);
    let expenses = tracker.store().expenses();
    let data = format
        .render(expenses, now)
        .pub_result(ErrorType::Export)?;
    utils::write(&path, data)
        .await
        .pub_result(ErrorType::Export)?;
    let message = format!(
        "Exported {} to {}",
        plural(expenses.len(), "expense", "expenses"),
        path.display()
    );
    Ok(Out::new(message, path))
}

/// A directory, or no path at all, gets the default file name.
fn export_path(output: Option<&Path>, default_name: &str) -> PathBuf {
    match output {
        Some(p) if p.is_dir() => p.join(default_name),
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(default_name),
    }
}

/// Replaces all expenses with the contents of an export file. Without `--yes` nothing is changed
/// and the message says what would happen. Returns the number of expenses imported.
pub async fn import(config: Config, args: ImportArgs) -> Result<Out<usize>> {
    let data = utils::read(args.file())
        .await
        .pub_result(ErrorType::Import)?;
    let incoming = transfer::parse_import(&data)
        .with_context(|| format!("Unable to import {}", args.file().display()))
        .pub_result(ErrorType::Import)?;

    let mut tracker = open(&config);
    if !args.yes() {
        return Ok(format!(
            "Importing {} will replace the {} you have now. Run again with --yes to import.",
            plural(incoming.len(), "expense", "expenses"),
            plural(tracker.store().len(), "expense", "expenses"),
        )
        .into());
    }

    let backup = config
        .backup()
        .save_json(PRE_IMPORT, tracker.store().expenses())
        .await
        .pub_result(ErrorType::Storage)?;
    debug!("Saved a backup to {}", backup.display());

    let count = import_result(tracker.import(&data))?;
    Ok(Out::new(
        format!("Imported {}", plural(count, "expense", "expenses")),
        count,
    ))
}

/// Deletes all expenses after saving a backup. Refuses without `--yes`. Returns the number of
/// expenses deleted.
pub async fn clear(config: Config, args: ClearArgs) -> Result<Out<usize>> {
    let mut tracker = open(&config);
    let count = tracker.store().len();
    if !args.yes() {
        return Ok(format!(
            "This will delete all {}. Run again with --yes to delete them.",
            plural(count, "expense", "expenses")
        )
        .into());
    }

    let backup = config
        .backup()
        .save_json(PRE_CLEAR, tracker.store().expenses())
        .await
        .pub_result(ErrorType::Storage)?;
    warn!(
        "Deleting all expenses, a backup was saved to {}",
        backup.display()
    );

    store_result(tracker.clear_all())?;
    Ok(Out::new(
        format!("Deleted {}", plural(count, "expense", "expenses")),
        count,
    ))
}

/// How much data is stored, as shown on the settings screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageReport {
    pub path: PathBuf,
    pub item_count: usize,
    pub size_bytes: u64,
    pub size_kb: f64,
    pub size_mb: f64,
    pub quota_bytes: Option<u64>,
}

/// Reports the number of stored expenses and the size of the data file.
pub async fn info(config: Config) -> Result<Out<StorageReport>> {
    let info = open(&config).storage_info();
    let report = StorageReport {
        path: config.storage_path(),
        item_count: info.item_count,
        size_bytes: info.size_bytes,
        size_kb: info.size_kb(),
        size_mb: info.size_mb(),
        quota_bytes: config.quota_bytes(),
    };
    let message = format!(
        "{} stored, using {:.2} KB ({:.2} MB)",
        plural(report.item_count, "expense", "expenses"),
        report.size_kb,
        report.size_mb
    );
    Ok(Out::new(message, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::storage::Storage;
    use crate::test::TestEnv;
    use crate::transfer::ExportFormat;

    #[tokio::test]
    async fn test_export_json_then_import() {
        let env = TestEnv::new().await;
        env.insert_demo_expenses();
        let dir = tempfile::TempDir::new().unwrap();

        let args = ExportArgs::new(ExportFormat::Json, Some(dir.path().to_path_buf()));
        let out = export(env.config(), args).await.unwrap();
        let path = out.structure().unwrap().clone();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("budget-tracker-"), "{name}");
        assert!(name.ends_with(".json"), "{name}");

        let other = TestEnv::new().await;
        let out = import(other.config(), ImportArgs::new(&path, true))
            .await
            .unwrap();
        assert_eq!(out.structure(), Some(&5));
        assert_eq!(other.config().storage().load(), env.demo_expenses());
    }

    #[tokio::test]
    async fn test_export_csv_to_file() {
        let env = TestEnv::new().await;
        env.insert_demo_expenses();
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("out.csv");

        let out = export(env.config(), ExportArgs::new(ExportFormat::Csv, Some(file.clone())))
            .await
            .unwrap();
        assert_eq!(out.structure(), Some(&file));
        let csv = utils::read(&file).await.unwrap();
        assert_eq!(csv.lines().count(), 6);
        assert!(csv.starts_with(r#""Date","Description","Amount""#));
    }

    #[tokio::test]
    async fn test_import_without_yes_changes_nothing() {
        let env = TestEnv::new().await;
        env.insert_demo_expenses();
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("in.json");
        utils::write(&file, r#"{"expenses": []}"#).await.unwrap();

        let out = import(env.config(), ImportArgs::new(&file, false))
            .await
            .unwrap();
        assert!(out.structure().is_none());
        assert!(out.message().contains("--yes"));
        assert_eq!(env.config().storage().load().len(), 5);
    }

    #[tokio::test]
    async fn test_import_backs_up_and_replaces() {
        let env = TestEnv::new().await;
        env.insert_demo_expenses();
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("in.json");
        utils::write(&file, r#"{"version": "1.0", "expenses": []}"#)
            .await
            .unwrap();

        import(env.config(), ImportArgs::new(&file, true))
            .await
            .unwrap();
        assert!(env.config().storage().load().is_empty());

        let mut backups = utils::read_dir(env.config().backups()).await.unwrap();
        let entry = backups.next_entry().await.unwrap().unwrap();
        let name = entry.file_name().to_string_lossy().to_string();
        assert!(name.starts_with("pre-import."), "{name}");
        let restored = transfer::parse_import(&utils::read(entry.path()).await.unwrap()).unwrap();
        assert_eq!(restored, env.demo_expenses());
    }

    #[tokio::test]
    async fn test_import_invalid_file() {
        let env = TestEnv::new().await;
        env.insert_demo_expenses();
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("in.json");
        utils::write(&file, r#"{"expenses": 42}"#).await.unwrap();

        let err = import(env.config(), ImportArgs::new(&file, true))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Import));
        assert!(format!("{err:#}").contains("not an array"));
        assert_eq!(env.config().storage().load().len(), 5);
    }

    #[tokio::test]
    async fn test_import_over_quota_is_storage_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::create(dir.path().join("home"), 5, Some(100)).await.unwrap();
        let file = dir.path().join("in.json");
        let many: Vec<String> = (0..10)
            .map(|i| format!(r#"{{"id":"{i}","date":"2025-08-01","amount":1,"category":"other"}}"#))
            .collect();
        utils::write(&file, format!(r#"{{"expenses": [{}]}}"#, many.join(",")))
            .await
            .unwrap();

        let err = import(config.clone(), ImportArgs::new(&file, true))
            .await
            .unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Storage));
        assert!(config.storage().load().is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let env = TestEnv::new().await;
        env.insert_demo_expenses();

        let out = clear(env.config(), ClearArgs::new(false)).await.unwrap();
        assert!(out.structure().is_none());
        assert_eq!(env.config().storage().load().len(), 5);

        let out = clear(env.config(), ClearArgs::new(true)).await.unwrap();
        assert_eq!(out.structure(), Some(&5));
        assert!(env.config().storage().load().is_empty());
    }

    #[tokio::test]
    async fn test_info() {
        let env = TestEnv::new().await;
        env.insert_demo_expenses();
        let out = info(env.config()).await.unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.item_count, 5);
        assert!(report.size_bytes > 0);
        assert_eq!(report.path, env.config().storage_path());
        assert!(out.message().starts_with("5 expenses stored"));
    }
}
