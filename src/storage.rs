use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

/* ===============================
Snapshot keys, one JSON file each
=============================== */
pub const EMPLOYEES: &str = "accupay_employees";
pub const PAYROLL_PERIODS: &str = "accupay_payroll_periods";
pub const PAYROLL_ENTRIES: &str = "accupay_payroll_entries";
pub const PAYROLL_SUMMARIES: &str = "accupay_payroll_summaries";
pub const TIME_ENTRIES: &str = "accupay_time_entries";
pub const TIMESHEETS: &str = "accupay_timesheets";
pub const LEAVE_REQUESTS: &str = "accupay_leave_requests";
pub const USERS: &str = "accupay_users";
pub const COMPANY: &str = "accupay_company";
pub const DEPARTMENTS: &str = "accupay_departments";
pub const POSITIONS: &str = "accupay_positions";

pub const ALL_KEYS: [&str; 11] = [
    EMPLOYEES,
    PAYROLL_PERIODS,
    PAYROLL_ENTRIES,
    PAYROLL_SUMMARIES,
    TIME_ENTRIES,
    TIMESHEETS,
    LEAVE_REQUESTS,
    USERS,
    COMPANY,
    DEPARTMENTS,
    POSITIONS,
];

/// Best-effort JSON snapshot store. Every failure is logged and swallowed so
/// the in-memory tables keep working when the disk does not.
#[derive(Clone, Debug, Default)]
pub struct Storage {
    dir: Option<PathBuf>,
}

impl Storage {
    /// Storage that never touches the disk.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            error!(error = %e, dir = %dir.display(), "Failed to create data directory");
        }
        Self { dir: Some(dir) }
    }

    pub fn from_config(dir: Option<&Path>) -> Self {
        match dir {
            Some(d) => Self::new(d),
            None => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    fn path(&self, key: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(format!("{key}.json")))
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, data: &T) {
        let Some(path) = self.path(key) else {
            return;
        };

        let bytes = match serde_json::to_vec_pretty(data) {
            Ok(b) => b,
            Err(e) => {
                error!(error = %e, key, "Failed to serialize snapshot");
                return;
            }
        };

        // write then rename so a crash never leaves half a file behind
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, &path)) {
            error!(error = %e, key, "Failed to save snapshot");
            return;
        }

        debug!(key, "Snapshot saved");
    }

    /// Returns the stored value for `key`, or `default` when storage is
    /// disabled, the file is missing, or its content does not parse.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(path) = self.path(key) else {
            return default;
        };

        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return default,
            Err(e) => {
                error!(error = %e, key, "Failed to read snapshot");
                return default;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                debug!(key, "Snapshot loaded");
                value
            }
            Err(e) => {
                warn!(error = %e, key, "Snapshot is corrupt, using defaults");
                default
            }
        }
    }

    pub fn remove(&self, key: &str) {
        let Some(path) = self.path(key) else {
            return;
        };

        match fs::remove_file(&path) {
            Ok(()) => debug!(key, "Snapshot removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => error!(error = %e, key, "Failed to remove snapshot"),
        }
    }

    pub fn clear_all(&self) {
        for key in ALL_KEYS {
            self.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_then_load_returns_stored_value() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path());

        storage.save(EMPLOYEES, &vec![1u64, 2, 3]);
        let loaded: Vec<u64> = storage.load(EMPLOYEES, vec![]);

        assert_eq!(loaded, vec![1, 2, 3]);
        assert!(dir.path().join("accupay_employees.json").exists());
    }

    #[test]
    fn load_falls_back_on_missing_or_corrupt_file() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path());

        let missing: Vec<u64> = storage.load(USERS, vec![7]);
        assert_eq!(missing, vec![7]);

        fs::write(dir.path().join("accupay_users.json"), b"{not json").unwrap();
        let corrupt: Vec<u64> = storage.load(USERS, vec![9]);
        assert_eq!(corrupt, vec![9]);
    }

    #[test]
    fn clear_all_removes_every_snapshot() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path());

        storage.save(COMPANY, &"acme");
        storage.save(TIMESHEETS, &Vec::<u64>::new());
        storage.clear_all();

        assert!(!dir.path().join("accupay_company.json").exists());
        assert!(!dir.path().join("accupay_timesheets.json").exists());
    }

    #[test]
    fn disabled_storage_is_a_no_op() {
        let storage = Storage::disabled();
        storage.save(EMPLOYEES, &vec![1u64]);

        let loaded: Vec<u64> = storage.load(EMPLOYEES, vec![]);
        assert!(loaded.is_empty());
        assert!(!storage.is_enabled());
    }
}
