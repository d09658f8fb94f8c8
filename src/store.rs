//! The ordered expense list and its persisted snapshot.
//!
//! Every mutating call writes the whole list back under [`EXPENSES_KEY`], so
//! the stored value always mirrors memory after a successful call.

use crate::errors::StoreError;
use crate::models::{Category, ExpenseRecord};
use crate::storage::KeyValueStore;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const EXPENSES_KEY: &str = "expenses";
pub const CORRUPT_KEY: &str = "expenses.corrupt";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    expenses: &'a [ExpenseRecord],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Versioned {
        version: u32,
        expenses: Vec<ExpenseRecord>,
    },
    // Bare array written before snapshots carried a version.
    Legacy(Vec<ExpenseRecord>),
}

fn decode(raw: &str) -> Result<Vec<ExpenseRecord>, StoreError> {
    match serde_json::from_str::<Snapshot>(raw) {
        Ok(Snapshot::Versioned { version, expenses }) if version <= SCHEMA_VERSION => Ok(expenses),
        Ok(Snapshot::Versioned { version, .. }) => Err(StoreError::UnsupportedVersion {
            found: version,
            supported: SCHEMA_VERSION,
        }),
        Ok(Snapshot::Legacy(expenses)) => {
            info!(count = expenses.len(), "migrating unversioned expense list");
            Ok(expenses)
        }
        Err(err) => Err(StoreError::Decode(err)),
    }
}

pub struct ExpenseStore {
    storage: Box<dyn KeyValueStore>,
    records: Vec<ExpenseRecord>,
    last_id: i64,
}

impl ExpenseStore {
    /// Reads the persisted list. A missing entry yields an empty store; an
    /// unreadable one is an error.
    pub fn load(storage: Box<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let records = match storage.get(EXPENSES_KEY)? {
            Some(raw) => decode(&raw)?,
            None => Vec::new(),
        };
        Ok(Self::with_records(storage, records))
    }

    /// Like [`ExpenseStore::load`], but starts empty when the entry cannot be
    /// decoded. The unreadable payload is kept under [`CORRUPT_KEY`].
    pub fn load_or_default(mut storage: Box<dyn KeyValueStore>) -> Self {
        let raw = match storage.get(EXPENSES_KEY) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("starting with no expenses: {err}");
                return Self::with_records(storage, Vec::new());
            }
        };

        let Some(raw) = raw else {
            return Self::with_records(storage, Vec::new());
        };

        match decode(&raw) {
            Ok(records) => Self::with_records(storage, records),
            Err(err) => {
                warn!("starting with no expenses: {err}");
                if let Err(err) = storage.set(CORRUPT_KEY, &raw) {
                    warn!("could not keep unreadable expenses: {err}");
                }
                Self::with_records(storage, Vec::new())
            }
        }
    }

    fn with_records(storage: Box<dyn KeyValueStore>, records: Vec<ExpenseRecord>) -> Self {
        let last_id = records.iter().map(|record| record.id).max().unwrap_or(0);
        Self {
            storage,
            records,
            last_id,
        }
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&ExpenseRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn add(
        &mut self,
        description: impl Into<String>,
        amount: Decimal,
        category: Category,
    ) -> Result<&ExpenseRecord, StoreError> {
        self.add_at(Utc::now().timestamp_millis(), description, amount, category)
    }

    /// Appends a record stamped no earlier than `now_ms`. Ids stay unique
    /// when several records land in the same millisecond.
    pub fn add_at(
        &mut self,
        now_ms: i64,
        description: impl Into<String>,
        amount: Decimal,
        category: Category,
    ) -> Result<&ExpenseRecord, StoreError> {
        let next = self
            .last_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted(self.last_id))?;
        let id = now_ms.max(next);
        self.last_id = id;
        self.records.push(ExpenseRecord {
            id,
            description: description.into(),
            amount,
            category,
        });
        self.persist()?;
        Ok(&self.records[self.records.len() - 1])
    }

    /// Drops the record with `id`. Returns `false` and writes nothing when no
    /// record matches.
    pub fn remove(&mut self, id: i64) -> Result<bool, StoreError> {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        if self.records.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn persist(&mut self) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&SnapshotRef {
            version: SCHEMA_VERSION,
            expenses: &self.records,
        })
        .map_err(StoreError::Encode)?;
        self.storage.set(EXPENSES_KEY, &payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StorageError;
    use crate::storage::MemoryStore;
    use std::collections::HashSet;
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    /// Memory storage whose contents outlive the store, to simulate a new session.
    #[derive(Clone, Default)]
    struct SharedStore(Arc<Mutex<MemoryStore>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.lock().unwrap().get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.lock().unwrap().set(key, value)
        }
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write {
                key: key.to_string(),
                source: std::io::Error::other("quota exceeded"),
            })
        }
    }

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn cat(label: &str) -> Category {
        Category::new(label).unwrap()
    }

    fn empty_store() -> ExpenseStore {
        ExpenseStore::load(Box::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn add_assigns_unique_ids_within_one_millisecond() {
        let mut store = empty_store();
        for n in 0..25 {
            store
                .add_at(1_700_000_000_000, format!("item {n}"), dec("1.00"), cat("Food"))
                .unwrap();
        }

        assert_eq!(store.len(), 25);
        let ids: HashSet<i64> = store.records().iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 25);
        assert!(store.records().windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn add_keeps_insertion_order() {
        let mut store = empty_store();
        store.add("Coffee", dec("3.50"), cat("Food")).unwrap();
        store.add("Bus", dec("2.00"), cat("Transport")).unwrap();

        let names: Vec<&str> = store.records().iter().map(|r| r.description.as_str()).collect();
        assert_eq!(names, ["Coffee", "Bus"]);
    }

    #[test]
    fn remove_twice_is_a_no_op_the_second_time() {
        let mut store = empty_store();
        let id = store.add("Coffee", dec("3.50"), cat("Food")).unwrap().id;
        store.add("Bus", dec("2.00"), cat("Transport")).unwrap();

        assert!(store.remove(id).unwrap());
        let after_first = store.records().to_vec();
        assert!(!store.remove(id).unwrap());
        assert_eq!(store.records(), after_first.as_slice());
        assert!(store.get(id).is_none());
    }

    #[test]
    fn persist_then_load_round_trips() {
        let shared = SharedStore::default();
        let mut store = ExpenseStore::load(Box::new(shared.clone())).unwrap();
        store.add("Coffee", dec("3.50"), cat("Food")).unwrap();
        store.add("Bus", dec("2.00"), cat("Transport")).unwrap();
        store.add("Lunch", dec("12.25"), cat("Food")).unwrap();
        let first = store.remove(store.records()[0].id).unwrap();
        assert!(first);

        let reloaded = ExpenseStore::load(Box::new(shared)).unwrap();
        assert_eq!(reloaded.records(), store.records());
    }

    #[test]
    fn ids_continue_after_reload() {
        let shared = SharedStore::default();
        let mut store = ExpenseStore::load(Box::new(shared.clone())).unwrap();
        let first = store.add_at(5_000, "a", dec("1"), cat("Food")).unwrap().id;

        let mut reloaded = ExpenseStore::load(Box::new(shared)).unwrap();
        let second = reloaded.add_at(10, "b", dec("1"), cat("Food")).unwrap().id;
        assert!(second > first);
    }

    #[test]
    fn legacy_array_is_accepted() {
        let mut memory = MemoryStore::new();
        memory
            .set(
                EXPENSES_KEY,
                r#"[{"id":1712,"description":"Tea","amount":2.5,"category":"Food"}]"#,
            )
            .unwrap();

        let store = ExpenseStore::load(Box::new(memory)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].amount, dec("2.5"));
        assert_eq!(store.records()[0].category, cat("Food"));
    }

    #[test]
    fn newer_schema_is_rejected() {
        let mut memory = MemoryStore::new();
        memory
            .set(EXPENSES_KEY, r#"{"version":9,"expenses":[]}"#)
            .unwrap();

        let err = ExpenseStore::load(Box::new(memory)).err().unwrap();
        assert!(matches!(
            err,
            StoreError::UnsupportedVersion { found: 9, supported: 1 }
        ));
    }

    #[test]
    fn stored_categories_are_normalised_on_load() {
        let mut memory = MemoryStore::new();
        memory
            .set(
                EXPENSES_KEY,
                r#"{"version":1,"expenses":[{"id":1,"description":"Tea","amount":"2.50","category":"  Food "}]}"#,
            )
            .unwrap();
        let store = ExpenseStore::load(Box::new(memory)).unwrap();
        assert_eq!(store.records()[0].category.as_str(), "Food");

        let mut memory = MemoryStore::new();
        memory
            .set(
                EXPENSES_KEY,
                r#"{"version":1,"expenses":[{"id":1,"description":"Tea","amount":"2.50","category":" "}]}"#,
            )
            .unwrap();
        let err = ExpenseStore::load(Box::new(memory)).err().unwrap();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn ids_are_never_reused_at_the_top_of_the_range() {
        let shared = SharedStore::default();
        let stored = format!(
            r#"{{"version":1,"expenses":[{{"id":{},"description":"Tea","amount":"2.50","category":"Food"}}]}}"#,
            i64::MAX
        );
        shared.0.lock().unwrap().set(EXPENSES_KEY, &stored).unwrap();

        let mut store = ExpenseStore::load(Box::new(shared.clone())).unwrap();
        let err = store.add("Cake", dec("4.00"), cat("Food")).err().unwrap();
        assert!(matches!(err, StoreError::IdsExhausted(i64::MAX)));
        assert_eq!(store.len(), 1);
        assert_eq!(shared.get(EXPENSES_KEY).unwrap().as_deref(), Some(stored.as_str()));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let mut memory = MemoryStore::new();
        memory.set(EXPENSES_KEY, "{not json").unwrap();

        let err = ExpenseStore::load(Box::new(memory)).err().unwrap();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn load_or_default_keeps_unreadable_payload() {
        let shared = SharedStore::default();
        shared.0.lock().unwrap().set(EXPENSES_KEY, "{not json").unwrap();

        let store = ExpenseStore::load_or_default(Box::new(shared.clone()));
        assert!(store.is_empty());
        assert_eq!(
            shared.get(CORRUPT_KEY).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn failed_write_surfaces_and_memory_keeps_the_record() {
        let mut store = ExpenseStore::load(Box::new(ReadOnlyStore)).unwrap();
        let err = store.add("Coffee", dec("3.50"), cat("Food")).err().unwrap();

        assert!(matches!(err, StoreError::Storage(StorageError::Write { .. })));
        assert_eq!(store.len(), 1);
    }
}
