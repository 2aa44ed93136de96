//! Shared implementation behind every generated DAO.

use crate::{BlockingExecutor, TableMapper};
use daogen_core::{DaogenError, DaogenResult};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Reads the primary key out of a value, `None` while it is unset.
pub type KeyExtractor<V, K> = fn(&V) -> Option<K>;

/// Asynchronous CRUD over one table.
///
/// Each operation hands the blocking [`TableMapper`] call to the
/// [`BlockingExecutor`] and awaits its single outcome. Safe to share
/// between concurrent callers.
pub struct DaoSupport<R, V, K>
where
    R: 'static,
    V: 'static,
    K: 'static,
{
    table: &'static str,
    mapper: Arc<dyn TableMapper<R, V, K>>,
    executor: BlockingExecutor,
    key_of: KeyExtractor<V, K>,
    _record: PhantomData<fn() -> R>,
}

impl<R, V, K> DaoSupport<R, V, K>
where
    R: 'static,
    V: Send + 'static,
    K: Send + 'static,
{
    /// Creates DAO support for `table`.
    #[must_use]
    pub fn new(
        table: &'static str,
        mapper: Arc<dyn TableMapper<R, V, K>>,
        executor: BlockingExecutor,
        key_of: KeyExtractor<V, K>,
    ) -> Self {
        Self {
            table,
            mapper,
            executor,
            key_of,
            _record: PhantomData,
        }
    }

    /// Returns the table name.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        self.table
    }

    /// Returns the key of `value`, if set.
    #[must_use]
    pub fn key_of(&self, value: &V) -> Option<K> {
        (self.key_of)(value)
    }

    /// Inserts a new row. Completes with the stored value.
    pub async fn insert(&self, value: V) -> DaogenResult<V> {
        let mapper = Arc::clone(&self.mapper);
        self.executor
            .execute("insert", self.table, move || mapper.insert(&value))
            .await
    }

    /// Finds a row by key. A missing row is `Ok(None)`.
    pub async fn find_by_id(&self, key: K) -> DaogenResult<Option<V>> {
        let mapper = Arc::clone(&self.mapper);
        self.executor
            .execute("find_by_id", self.table, move || mapper.fetch_by_id(&key))
            .await
    }

    /// Finds every row whose key is in `keys`, in the order of `keys`.
    /// Keys without a row are left out.
    pub async fn find_by_ids(&self, keys: Vec<K>) -> DaogenResult<Vec<V>> {
        let mapper = Arc::clone(&self.mapper);
        self.executor
            .execute("find_by_ids", self.table, move || {
                let mut found = Vec::with_capacity(keys.len());
                for key in &keys {
                    if let Some(value) = mapper.fetch_by_id(key)? {
                        found.push(value);
                    }
                }
                Ok(found)
            })
            .await
    }

    /// Checks whether a row with the key exists.
    pub async fn exists_by_id(&self, key: K) -> DaogenResult<bool> {
        let mapper = Arc::clone(&self.mapper);
        self.executor
            .execute("exists_by_id", self.table, move || {
                mapper.fetch_by_id(&key).map(|found| found.is_some())
            })
            .await
    }

    /// Fetches every row of the table.
    pub async fn find_all(&self) -> DaogenResult<Vec<V>> {
        let mapper = Arc::clone(&self.mapper);
        self.executor
            .execute("find_all", self.table, move || mapper.fetch_all())
            .await
    }

    /// Counts the rows of the table.
    pub async fn count(&self) -> DaogenResult<u64> {
        let mapper = Arc::clone(&self.mapper);
        self.executor
            .execute("count", self.table, move || mapper.count())
            .await
    }

    /// Updates the row identified by the value's own key.
    ///
    /// Fails with [`DaogenError::KeyNotSet`] before dispatch when the key is unset.
    pub async fn update(&self, value: V) -> DaogenResult<V> {
        if self.key_of(&value).is_none() {
            return Err(DaogenError::KeyNotSet(self.table.to_string()));
        }
        let mapper = Arc::clone(&self.mapper);
        self.executor
            .execute("update", self.table, move || mapper.update(&value))
            .await
    }

    /// Deletes the row with the key. Deleting a missing key succeeds.
    pub async fn delete_by_id(&self, key: K) -> DaogenResult<()> {
        let mapper = Arc::clone(&self.mapper);
        let removed = self
            .executor
            .execute("delete_by_id", self.table, move || mapper.delete_by_id(&key))
            .await?;
        if removed == 0 {
            debug!(table = self.table, "delete_by_id matched no row");
        }
        Ok(())
    }

    /// Deletes every row whose key is in `keys`. Missing keys are ignored.
    pub async fn delete_by_ids(&self, keys: Vec<K>) -> DaogenResult<()> {
        let mapper = Arc::clone(&self.mapper);
        let requested = keys.len();
        let removed = self
            .executor
            .execute("delete_by_ids", self.table, move || {
                let mut removed = 0;
                for key in &keys {
                    removed += mapper.delete_by_id(key)?;
                }
                Ok(removed)
            })
            .await?;
        debug!(table = self.table, requested, removed, "delete_by_ids completed");
        Ok(())
    }
}

impl<R, V, K> fmt::Debug for DaoSupport<R, V, K>
where
    R: 'static,
    V: 'static,
    K: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaoSupport")
            .field("table", &self.table)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}
