use crate::error::StorageError;
use crate::model::Expense;
use crate::storage::{check_quota, decode, encode, Storage, StorageInfo};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Keeps the expenses in a single JSON file. Writes go to a temporary sibling file which is then
/// renamed over the original, so a failed write leaves the previous data intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    quota: Option<u64>,
}

impl FileStorage {
    /// `quota` is the largest document, in bytes, that will be written. `None` means no limit.
    pub fn new(path: impl Into<PathBuf>, quota: Option<u64>) -> Self {
        Self {
            path: path.into(),
            quota,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    /// Where the stored document is copied when some or all of it could not be read, before the
    /// next save replaces it.
    pub fn unreadable_path(&self) -> PathBuf {
        self.sibling(".unreadable")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn preserve(&self, data: &str) {
        let copy = self.unreadable_path();
        match std::fs::write(&copy, data) {
            Ok(()) => warn!(
                "Kept a copy of the unreadable expense data at {}",
                copy.display()
            ),
            Err(e) => error!(
                "Unable to keep a copy of the expense data at {}: {e}",
                copy.display()
            ),
        }
    }

    fn read(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Some(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No expense data at {}", self.path.display());
                None
            }
            Err(e) => {
                error!("Failed to read expenses from {}: {e}", self.path.display());
                None
            }
        }
    }
}

impl Storage for FileStorage {
    fn load(&self) -> Vec<Expense> {
        let Some(data) = self.read() else {
            return Vec::new();
        };
        match decode(&data) {
            Ok(decoded) => {
                debug!(
                    "Loaded {} expenses from {}",
                    decoded.expenses.len(),
                    self.path.display()
                );
                if decoded.skipped > 0 {
                    error!(
                        "Skipped {} unreadable expenses in {}",
                        decoded.skipped,
                        self.path.display()
                    );
                    self.preserve(&data);
                }
                decoded.expenses
            }
            Err(e) => {
                error!("Failed to load expenses from {}: {e:#}", self.path.display());
                self.preserve(&data);
                Vec::new()
            }
        }
    }

    fn save(&mut self, expenses: &[Expense]) -> Result<(), StorageError> {
        let data = encode(expenses).map_err(|e| StorageError::Unavailable(format!("{e:#}")))?;
        check_quota(data.len(), self.quota)?;

        let tmp = self.tmp_path();
        let unavailable = |e: std::io::Error, p: &Path| {
            StorageError::Unavailable(format!("unable to write {}: {e}", p.display()))
        };
        std::fs::write(&tmp, data.as_bytes()).map_err(|e| unavailable(e, &tmp))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| unavailable(e, &self.path))?;

        debug!("Saved {} expenses to {}", expenses.len(), self.path.display());
        Ok(())
    }

    fn info(&self) -> StorageInfo {
        let size_bytes = std::fs::metadata(&self.path)
            .map(|m| m.len())
            .unwrap_or_default();
        StorageInfo {
            item_count: self.load().len(),
            size_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, ExpenseId, NewExpense};
    use chrono::NaiveDate;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn expense(id: &str, amount: &str) -> Expense {
        NewExpense::new(
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            "Rent Payment",
            Amount::from_str(amount).unwrap(),
            "housing",
        )
        .into_expense(ExpenseId::new(id))
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("expenses.json"), None);
        assert!(storage.load().is_empty());
        assert_eq!(storage.info(), StorageInfo::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.json");
        let mut storage = FileStorage::new(&path, None);
        let expenses = vec![expense("1", "1500"), expense("2", "24.58")];
        storage.save(&expenses).unwrap();

        assert!(!storage.tmp_path().exists());
        let reopened = FileStorage::new(&path, None);
        assert_eq!(reopened.load(), expenses);
        let info = reopened.info();
        assert_eq!(info.item_count, 2);
        assert!(info.size_bytes > 0);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.json");
        std::fs::write(&path, "{not json").unwrap();
        let storage = FileStorage::new(&path, None);
        assert!(storage.load().is_empty());
        assert_eq!(
            std::fs::read_to_string(storage.unreadable_path()).unwrap(),
            "{not json"
        );
    }

    #[test]
    fn test_invalid_record_does_not_cost_the_others() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.json");
        let raw = r#"{"version":"1.0","expenses":[
            {"id":"1","date":"2025-08-01","description":"Rent Payment","amount":1500,"category":"housing"},
            {"id":"2","date":"2025-08-02","description":"Coffee","amount":null,"category":"dining"}
        ]}"#;
        std::fs::write(&path, raw).unwrap();

        let mut storage = FileStorage::new(&path, None);
        let mut expenses = storage.load();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].id().as_str(), "1");
        assert_eq!(std::fs::read_to_string(storage.unreadable_path()).unwrap(), raw);

        expenses.push(expense("3", "24.58"));
        storage.save(&expenses).unwrap();
        let reloaded = FileStorage::new(&path, None).load();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded[0].amount(), Amount::from_str("1500").unwrap());
    }

    #[test]
    fn test_valid_file_keeps_no_copy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.json");
        let mut storage = FileStorage::new(&path, None);
        storage.save(&[expense("1", "1500")]).unwrap();
        assert_eq!(storage.load().len(), 1);
        assert!(!storage.unreadable_path().exists());
    }

    #[test]
    fn test_legacy_array_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.json");
        std::fs::write(
            &path,
            r#"[{"id":"9","date":"2025-09-01","description":"Loblaws","amount":124.56,"category":"groceries"}]"#,
        )
        .unwrap();
        let expenses = FileStorage::new(&path, None).load();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].id().as_str(), "9");
    }

    #[test]
    fn test_quota_exceeded_keeps_previous_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.json");
        let mut storage = FileStorage::new(&path, Some(200));
        storage.save(&[expense("1", "1")]).unwrap();

        let many: Vec<Expense> = (0..20).map(|i| expense(&i.to_string(), "5")).collect();
        let err = storage.save(&many).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 200, .. }));
        assert_eq!(storage.load().len(), 1);
    }

    #[test]
    fn test_unwritable_location_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("expenses.json");
        let mut storage = FileStorage::new(path, None);
        let err = storage.save(&[expense("1", "1")]).unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
