use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::storage::Storage;

/// A row kept in a [`Table`], addressed by a numeric id.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Snapshot file the table mirrors to.
    const STORAGE_KEY: &'static str;
    /// Used in "not found" messages.
    const NAME: &'static str;

    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);

    /// Sets creation and modification time on insert.
    fn stamp_created(&mut self, _now: DateTime<Utc>) {}
    /// Sets modification time on update.
    fn stamp_updated(&mut self, _now: DateTime<Utc>) {}
}

/// Implements [`Record`] for types with `id`, `created_at` and `updated_at` fields.
macro_rules! timestamped_record {
    ($ty:ty, $key:expr, $name:expr) => {
        impl $crate::store::table::Record for $ty {
            const STORAGE_KEY: &'static str = $key;
            const NAME: &'static str = $name;

            fn id(&self) -> u64 {
                self.id
            }

            fn set_id(&mut self, id: u64) {
                self.id = id;
            }

            fn stamp_created(&mut self, now: chrono::DateTime<chrono::Utc>) {
                self.created_at = now;
                self.updated_at = now;
            }

            fn stamp_updated(&mut self, now: chrono::DateTime<chrono::Utc>) {
                self.updated_at = now;
            }
        }
    };
}

pub(crate) use timestamped_record;

/// In-memory table mirrored to a JSON snapshot after every mutation.
///
/// The write lock is held while the snapshot is written, so the file on disk
/// never lags behind a change another reader has already observed.
pub struct Table<T: Record> {
    rows: RwLock<Vec<T>>,
    storage: Storage,
}

impl<T: Record> Table<T> {
    /// Loads the table from its snapshot, falling back to `seed`.
    pub fn load(storage: Storage, seed: Vec<T>) -> Self {
        let rows = storage.load(T::STORAGE_KEY, seed);
        Self {
            rows: RwLock::new(rows),
            storage,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, rows: &[T]) {
        self.storage.save(T::STORAGE_KEY, rows);
    }

    pub fn all(&self) -> Vec<T> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn find(&self, id: u64) -> Option<T> {
        self.read().iter().find(|r| r.id() == id).cloned()
    }

    /// Like [`Table::find`] but maps a miss to a 404.
    pub fn get(&self, id: u64) -> Result<T, AppError> {
        self.find(id).ok_or_else(|| AppError::not_found(T::NAME))
    }

    pub fn find_by<P>(&self, pred: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        self.read().iter().find(|r| pred(r)).cloned()
    }

    pub fn filter<P>(&self, pred: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.read().iter().filter(|r| pred(r)).cloned().collect()
    }

    pub fn count<P>(&self, pred: P) -> usize
    where
        P: Fn(&T) -> bool,
    {
        self.read().iter().filter(|r| pred(r)).count()
    }

    /// Inserts with the next free id (`max + 1`, or 1 for an empty table).
    pub fn insert(&self, mut record: T) -> T {
        let mut rows = self.write();
        let next_id = rows.iter().map(Record::id).max().unwrap_or(0) + 1;

        record.set_id(next_id);
        record.stamp_created(Utc::now());
        rows.push(record.clone());

        self.persist(&rows);
        record
    }

    /// Applies `f` to a copy of the row and commits it only if `f` succeeds.
    pub fn update<F>(&self, id: u64, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut T) -> Result<(), AppError>,
    {
        let mut rows = self.write();
        let slot = rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| AppError::not_found(T::NAME))?;

        let mut updated = slot.clone();
        f(&mut updated)?;
        updated.set_id(id);
        updated.stamp_updated(Utc::now());
        *slot = updated.clone();

        self.persist(&rows);
        Ok(updated)
    }

    /// Applies `f` to every row matching `pred`; returns how many changed.
    pub fn update_where<P, F>(&self, pred: P, mut f: F) -> usize
    where
        P: Fn(&T) -> bool,
        F: FnMut(&mut T),
    {
        let mut rows = self.write();
        let now = Utc::now();
        let mut changed = 0;

        for row in rows.iter_mut().filter(|r| pred(r)) {
            f(row);
            row.stamp_updated(now);
            changed += 1;
        }

        if changed > 0 {
            self.persist(&rows);
        }
        changed
    }

    /// Replaces the row with the same id, or appends it.
    pub fn upsert(&self, mut record: T) -> T {
        let mut rows = self.write();
        record.stamp_updated(Utc::now());

        match rows.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record.clone(),
            None => rows.push(record.clone()),
        }

        self.persist(&rows);
        record
    }

    pub fn remove(&self, id: u64) -> Option<T> {
        let mut rows = self.write();
        let index = rows.iter().position(|r| r.id() == id)?;
        let removed = rows.remove(index);

        self.persist(&rows);
        Some(removed)
    }

    pub fn reset(&self, seed: Vec<T>) {
        let mut rows = self.write();
        *rows = seed;
        self.persist(&rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: u64,
        text: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    }

    timestamped_record!(Note, "test_notes", "Note");

    fn note(id: u64, text: &str) -> Note {
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        Note {
            id,
            text: text.into(),
            created_at: epoch,
            updated_at: epoch,
        }
    }

    #[test]
    fn insert_assigns_next_id_and_stamps() {
        let table = Table::load(Storage::disabled(), vec![note(4, "a"), note(2, "b")]);

        let inserted = table.insert(note(0, "c"));
        assert_eq!(inserted.id, 5);
        assert!(inserted.created_at > DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(inserted.created_at, inserted.updated_at);

        let empty: Table<Note> = Table::load(Storage::disabled(), vec![]);
        assert_eq!(empty.insert(note(0, "first")).id, 1);
    }

    #[test]
    fn update_missing_row_is_not_found() {
        let table: Table<Note> = Table::load(Storage::disabled(), vec![]);
        let err = table.update(1, |_| Ok(())).unwrap_err();
        assert_eq!(err.to_string(), "Note not found");
    }

    #[test]
    fn failed_update_leaves_row_untouched() {
        let table = Table::load(Storage::disabled(), vec![note(1, "keep")]);

        let result = table.update(1, |n| {
            n.text = "changed".into();
            Err(AppError::BadRequest("nope".into()))
        });

        assert!(result.is_err());
        assert_eq!(table.find(1).unwrap().text, "keep");
    }

    #[test]
    fn mutations_are_mirrored_to_storage() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path());

        let table = Table::load(storage.clone(), vec![note(1, "seed")]);
        table.insert(note(0, "second"));
        table.update(1, |n| {
            n.text = "edited".into();
            Ok(())
        })
        .unwrap();

        let reloaded: Table<Note> = Table::load(storage, vec![]);
        let rows = reloaded.all();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "edited");
        assert_eq!(rows[1].text, "second");
    }

    #[test]
    fn update_where_touches_only_matching_rows() {
        let table = Table::load(
            Storage::disabled(),
            vec![note(1, "x"), note(2, "y"), note(3, "x")],
        );

        let changed = table.update_where(|n| n.text == "x", |n| n.text = "z".into());

        assert_eq!(changed, 2);
        assert_eq!(table.count(|n| n.text == "z"), 2);
        assert_eq!(table.find(2).unwrap().text, "y");
    }

    #[test]
    fn remove_and_reset() {
        let table = Table::load(Storage::disabled(), vec![note(1, "a"), note(2, "b")]);

        assert!(table.remove(1).is_some());
        assert!(table.remove(1).is_none());
        assert_eq!(table.len(), 1);

        table.reset(vec![note(9, "fresh")]);
        assert_eq!(table.all(), vec![note(9, "fresh")]);
    }
}
