//! The synchronous relational mapping layer DAOs are built on.
//!
//! `TableMapper` is the seam to whatever actually talks to the database.
//! Its calls block; [`DaoSupport`](crate::DaoSupport) never invokes them on
//! the caller's task.

use daogen_core::{DaogenError, DaogenResult, Interface};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};

/// Blocking CRUD access to one table, keyed by `K`, mapping rows to `V`.
///
/// `R` is the table's record type and only serves as part of the mapper's
/// identity when bound through a [`MapperComponent`](crate::MapperComponent).
pub trait TableMapper<R, V, K>: Interface
where
    R: 'static,
    V: 'static,
    K: 'static,
{
    /// Inserts a row and returns it as stored (including generated keys).
    fn insert(&self, value: &V) -> DaogenResult<V>;

    /// Fetches the row with the given key.
    fn fetch_by_id(&self, key: &K) -> DaogenResult<Option<V>>;

    /// Updates the row identified by the value's own key.
    fn update(&self, value: &V) -> DaogenResult<V>;

    /// Deletes the row with the given key, returning the number of rows removed.
    fn delete_by_id(&self, key: &K) -> DaogenResult<u64>;

    /// Fetches every row of the table.
    fn fetch_all(&self) -> DaogenResult<Vec<V>>;

    /// Counts the rows of the table.
    fn count(&self) -> DaogenResult<u64> {
        Ok(self.fetch_all()?.len() as u64)
    }
}

/// Assigns a freshly generated identity to a value and returns its key.
pub type IdentityAssigner<V, K> = fn(&mut V, i64) -> K;

/// In-memory table, ordered by key.
///
/// Stands in for a real mapping layer in tests and examples.
pub struct InMemoryTable<R, V, K> {
    name: String,
    rows: RwLock<BTreeMap<K, V>>,
    key_of: fn(&V) -> Option<K>,
    identity: Option<IdentityAssigner<V, K>>,
    next_identity: AtomicI64,
    _record: PhantomData<fn() -> R>,
}

impl<R, V, K> InMemoryTable<R, V, K>
where
    V: Clone,
    K: Ord + Clone,
{
    /// Creates an empty table whose keys are read from values with `key_of`.
    #[must_use]
    pub fn new(name: impl Into<String>, key_of: fn(&V) -> Option<K>) -> Self {
        Self {
            name: name.into(),
            rows: RwLock::new(BTreeMap::new()),
            key_of,
            identity: None,
            next_identity: AtomicI64::new(1),
            _record: PhantomData,
        }
    }

    /// Generates keys for inserted values that carry none.
    #[must_use]
    pub fn with_identity(mut self, assign: IdentityAssigner<V, K>) -> Self {
        self.identity = Some(assign);
        self
    }

    /// Seeds the table with existing rows.
    #[must_use]
    pub fn with_rows(self, rows: impl IntoIterator<Item = V>) -> Self {
        {
            let mut table = self.rows.write();
            for row in rows {
                if let Some(key) = (self.key_of)(&row) {
                    table.insert(key, row);
                }
            }
        }
        self
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns true if no rows are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl<R, V, K> TableMapper<R, V, K> for InMemoryTable<R, V, K>
where
    R: 'static,
    V: Clone + Send + Sync + 'static,
    K: Ord + Clone + Send + Sync + 'static,
{
    fn insert(&self, value: &V) -> DaogenResult<V> {
        let mut row = value.clone();
        let key = match ((self.key_of)(&row), self.identity) {
            (Some(key), _) => key,
            (None, Some(assign)) => assign(&mut row, self.next_identity.fetch_add(1, Ordering::SeqCst)),
            (None, None) => return Err(DaogenError::KeyNotSet(self.name.clone())),
        };

        let mut rows = self.rows.write();
        if rows.contains_key(&key) {
            return Err(DaogenError::data_access(&self.name, "duplicate primary key"));
        }
        rows.insert(key, row.clone());
        Ok(row)
    }

    fn fetch_by_id(&self, key: &K) -> DaogenResult<Option<V>> {
        Ok(self.rows.read().get(key).cloned())
    }

    fn update(&self, value: &V) -> DaogenResult<V> {
        let key = (self.key_of)(value).ok_or_else(|| DaogenError::KeyNotSet(self.name.clone()))?;
        let mut rows = self.rows.write();
        match rows.get_mut(&key) {
            Some(row) => {
                *row = value.clone();
                Ok(value.clone())
            }
            None => Err(DaogenError::data_access(&self.name, "update matched no row")),
        }
    }

    fn delete_by_id(&self, key: &K) -> DaogenResult<u64> {
        Ok(u64::from(self.rows.write().remove(key).is_some()))
    }

    fn fetch_all(&self) -> DaogenResult<Vec<V>> {
        Ok(self.rows.read().values().cloned().collect())
    }

    fn count(&self) -> DaogenResult<u64> {
        Ok(self.rows.read().len() as u64)
    }
}
