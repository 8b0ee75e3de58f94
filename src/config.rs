//! Configuration file handling for the budget tracker.
//!
//! The configuration file is stored at `$BUDGET_HOME/config.json` and names the expense data file,
//! the storage quota and how many backup copies to keep.

use crate::backup::Backup;
use crate::storage::{self, FileStorage};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "budget";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const EXPENSES_JSON: &str = "expenses.json";

/// The default storage quota, matching the space a browser gives local storage.
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$BUDGET_HOME` and from there it loads `$BUDGET_HOME/config.json`. It provides
/// paths to the other items that live in the budget home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory and:
    /// - writes an initial `config.json` with the given settings
    /// - writes an empty expense data file, unless one is already there
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory, e.g. `$HOME/budget`
    /// - `backup_copies` - How many backups to keep per kind of destructive operation
    /// - `quota_bytes` - The largest expense data file that will be written, `None` for no limit
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        backup_copies: u32,
        quota_bytes: Option<u64>,
    ) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the budget home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            backup_copies,
            quota_bytes,
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        let config = Self {
            root,
            backups,
            config_path,
            config_file,
        };

        let storage_path = config.storage_path();
        if !storage_path.is_file() {
            let empty = storage::encode(&[])?;
            utils::write(&storage_path, empty)
                .await
                .context("Unable to create the expense data file")?;
        }
        Ok(config)
    }

    /// This will
    /// - validate that `budget_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub async fn load(budget_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = budget_home.into();
        let root = utils::canonicalize(&maybe_relative).await?;

        let _ = utils::read_dir(&root)
            .await
            .context("Budget Home is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root: root.clone(),
            backups: root.join(BACKUPS),
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    pub fn quota_bytes(&self) -> Option<u64> {
        self.config_file.quota_bytes
    }

    /// The expense data file. A relative `storage_file` is resolved against the home directory.
    pub fn storage_path(&self) -> PathBuf {
        let p = &self.config_file.storage_file;
        if p.is_absolute() {
            return p.clone();
        }
        self.root.join(p)
    }

    /// The persistence adapter for the expense data file.
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(self.storage_path(), self.quota_bytes())
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "budget",
///   "config_version": 1,
///   "storage_file": "expenses.json",
///   "quota_bytes": 5242880,
///   "backup_copies": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "budget"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The expense data file, relative to the home directory or absolute
    #[serde(default = "default_storage_file")]
    storage_file: PathBuf,

    /// The largest expense data file that will be written. Absent means no limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quota_bytes: Option<u64>,

    /// Number of backup copies to keep
    backup_copies: u32,
}

fn default_storage_file() -> PathBuf {
    PathBuf::from(EXPENSES_JSON)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            storage_file: default_storage_file(),
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
            backup_copies: BACKUP_COPIES,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("budget_home");

        let config = Config::create(&home_dir, 3, Some(1024)).await.unwrap();

        assert!(config.backups().is_dir());
        assert!(config.config_path().is_file());
        assert_eq!(config.backup_copies(), 3);
        assert_eq!(config.quota_bytes(), Some(1024));
        assert_eq!(config.storage_path(), config.root().join(EXPENSES_JSON));
        assert!(config.storage_path().is_file());
        assert!(config.storage().load().is_empty());
    }

    #[tokio::test]
    async fn test_create_keeps_existing_data() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().to_owned();
        utils::write(
            home_dir.join(EXPENSES_JSON),
            r#"[{"id":"1","date":"2025-08-01","amount":1500,"category":"housing"}]"#,
        )
        .await
        .unwrap();

        let config = Config::create(&home_dir, 5, None).await.unwrap();
        assert_eq!(config.storage().load().len(), 1);
    }

    #[tokio::test]
    async fn test_config_load() {
        let dir = TempDir::new().unwrap();
        let created = Config::create(dir.path(), 5, None).await.unwrap();
        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(created.root(), loaded.root());
        assert_eq!(loaded.quota_bytes(), None);
        assert_eq!(loaded.backup_copies(), 5);
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("nope")).await.is_err());
    }

    #[tokio::test]
    async fn test_config_load_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path()).await;
        assert!(result.unwrap_err().to_string().contains("config file is missing"));
    }

    #[test]
    fn test_config_file_default() {
        let config = ConfigFile::default();
        assert_eq!(config.app_name, "budget");
        assert_eq!(config.storage_file, PathBuf::from(EXPENSES_JSON));
        assert_eq!(config.quota_bytes, Some(DEFAULT_QUOTA_BYTES));
        assert_eq!(config.backup_copies, 5);
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let original = ConfigFile {
            storage_file: PathBuf::from("/var/data/expenses.json"),
            quota_bytes: None,
            backup_copies: 7,
            ..ConfigFile::default()
        };
        original.save(&config_path).await.unwrap();
        let loaded = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "budget",
            "config_version": 1,
            "backup_copies": 3
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.storage_file, PathBuf::from(EXPENSES_JSON));
        assert_eq!(config.quota_bytes, None);
        assert_eq!(config.backup_copies, 3);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "ledger",
            "config_version": 1,
            "backup_copies": 5
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_no_quota() {
        let config = ConfigFile {
            quota_bytes: None,
            ..ConfigFile::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("quota_bytes"));
    }
}
