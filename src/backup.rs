//! Backup management for the expense data before destructive operations.

use crate::model::Expense;
use crate::{transfer, utils, Config, Result};
use anyhow::Context;
use chrono::{Local, Utc};
use std::path::PathBuf;

/// Prefix for backups taken before an import replaces the data.
pub const PRE_IMPORT: &str = "pre-import";

/// Prefix for backups taken before all data is cleared.
pub const PRE_CLEAR: &str = "pre-clear";

const EXTENSION: &str = "json";

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// Saves `expenses` as a JSON export document, so a backup can be restored with `import`.
    ///
    /// The filename format is `{prefix}.YYYY-MM-DD-NNN.json` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files.
    ///
    /// Returns the path to the created backup file.
    pub async fn save_json(&self, prefix: &str, expenses: &[Expense]) -> Result<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(prefix, &date).await?;
        let filename = format!("{prefix}.{date}-{seq:03}.{EXTENSION}");
        let path = self.backups_dir.join(&filename);

        let json = transfer::export_json(expenses, Utc::now())
            .context("Failed to serialize the expenses for backup")?;
        utils::write(&path, json).await?;

        self.rotate(prefix).await?;

        Ok(path)
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;
        for name in self.file_names().await? {
            if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }
        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    async fn rotate(&self, prefix: &str) -> Result<()> {
        let mut files: Vec<String> = self
            .file_names()
            .await?
            .into_iter()
            .filter(|name| is_backup_file(name, prefix))
            .collect();

        // sorts by date and then sequence number
        files.sort();

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for name in files.into_iter().take(to_delete) {
            utils::remove(self.backups_dir.join(name)).await?;
        }
        Ok(())
    }

    async fn file_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        Ok(names)
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename.
/// Returns None if the filename doesn't match `{prefix}.{date}-{NNN}.json`.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    let expected_start = format!("{prefix}.{date}-");
    let remainder = filename.strip_prefix(&expected_start)?;
    let seq_str = remainder.strip_suffix(&format!(".{EXTENSION}"))?;
    seq_str.parse().ok()
}

/// Checks if a filename is a backup file with the given prefix.
fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("pre-import.2025-12-14-001.json", "pre-import", "2025-12-14"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("pre-import.2025-12-14-042.json", "pre-import", "2025-12-14"),
            Some(42)
        );
        // Wrong prefix
        assert_eq!(
            parse_sequence_number("pre-clear.2025-12-14-001.json", "pre-import", "2025-12-14"),
            None
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number("pre-import.2025-12-13-001.json", "pre-import", "2025-12-14"),
            None
        );
        // Wrong extension
        assert_eq!(
            parse_sequence_number("pre-import.2025-12-14-001.csv", "pre-import", "2025-12-14"),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file("pre-import.2025-12-14-001.json", "pre-import"));
        assert!(is_backup_file("pre-clear.2025-12-14-001.json", "pre-clear"));
        assert!(!is_backup_file("pre-import.2025-12-14-001.json", "pre-clear"));
        assert!(!is_backup_file("pre-clear.2025-12-14-001.json.tmp", "pre-clear"));
    }

    #[tokio::test]
    async fn test_save_json_rotates() {
        let env = TestEnv::new().await;
        let config = env.config();
        let backup = config.backup();
        let expenses = env.demo_expenses();

        let mut paths = Vec::new();
        for _ in 0..(config.backup_copies() + 2) {
            paths.push(backup.save_json(PRE_CLEAR, &expenses).await.unwrap());
        }
        backup.save_json(PRE_IMPORT, &[]).await.unwrap();

        let names = backup.file_names().await.unwrap();
        let clears = names.iter().filter(|n| is_backup_file(n, PRE_CLEAR)).count();
        assert_eq!(clears, config.backup_copies() as usize);
        assert_eq!(
            names.iter().filter(|n| is_backup_file(n, PRE_IMPORT)).count(),
            1
        );
        assert!(!paths[0].exists());

        let latest = paths.last().unwrap();
        assert!(latest.to_string_lossy().ends_with("-007.json"));
        let restored = transfer::parse_import(&utils::read(latest).await.unwrap()).unwrap();
        assert_eq!(restored, expenses);
    }
}
