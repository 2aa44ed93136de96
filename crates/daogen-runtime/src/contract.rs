//! The asynchronous DAO contract.
//!
//! ```text
//! caller ──► AsyncDao<R, V, K> ──► DaoSupport ──► BlockingExecutor ──► TableMapper (blocking)
//!                                                      │
//! caller ◄──────── exactly one Ok / Err ◄── oneshot ───┘
//! ```
//!
//! Generated DAOs implement [`SupportedDao`] (and [`InterfaceView`] when
//! the table has an interface type); the blanket impls below turn those
//! into [`AsyncDao`] and [`InterfaceDao`].

use crate::DaoSupport;
use async_trait::async_trait;
use daogen_core::{DaogenResult, Interface};

/// Asynchronous CRUD over one table, keyed by ⟨Record, Value, Key⟩.
///
/// No operation blocks the caller, and each completes with exactly one
/// outcome.
#[async_trait]
pub trait AsyncDao<R, V, K>: Interface
where
    R: 'static,
    V: Send + 'static,
    K: Send + 'static,
{
    /// Persists a new row; completes with the stored value.
    async fn insert(&self, value: V) -> DaogenResult<V>;

    /// Finds a row by key. No matching row is a successful `None`.
    async fn find_by_id(&self, key: K) -> DaogenResult<Option<V>>;

    /// Finds the rows for several keys; keys without a row are left out.
    async fn find_by_ids(&self, keys: Vec<K>) -> DaogenResult<Vec<V>>;

    /// Checks whether a row with the key exists.
    async fn exists_by_id(&self, key: K) -> DaogenResult<bool>;

    /// Fetches every row; unordered unless the mapping layer defines an order.
    async fn find_all(&self) -> DaogenResult<Vec<V>>;

    /// Counts the rows.
    async fn count(&self) -> DaogenResult<u64>;

    /// Updates the row identified by the value's own key; fails if the key is unset.
    async fn update(&self, value: V) -> DaogenResult<V>;

    /// Deletes a row by key. Idempotent.
    async fn delete_by_id(&self, key: K) -> DaogenResult<()>;

    /// Deletes the rows for several keys. Idempotent.
    async fn delete_by_ids(&self, keys: Vec<K>) -> DaogenResult<()>;
}

/// Narrower DAO view exposing values only through the interface type `I`,
/// usually a trait object such as `dyn ISomething`.
///
/// Since the concrete value type is hidden, the view can read and delete
/// but not insert or update.
#[async_trait]
pub trait InterfaceDao<R, I, K>: Interface
where
    R: 'static,
    I: ?Sized + 'static,
    K: Send + 'static,
{
    /// Finds a row by key.
    async fn find_by_id(&self, key: K) -> DaogenResult<Option<Box<I>>>;

    /// Fetches every row.
    async fn find_all(&self) -> DaogenResult<Vec<Box<I>>>;

    /// Deletes a row by key. Idempotent.
    async fn delete_by_id(&self, key: K) -> DaogenResult<()>;
}

/// A DAO backed by [`DaoSupport`].
pub trait SupportedDao<R, V, K>: Interface
where
    R: 'static,
    V: Send + 'static,
    K: Send + 'static,
{
    /// Returns the support doing the actual work.
    fn support(&self) -> &DaoSupport<R, V, K>;
}

/// A DAO that can present its values as the interface type `I`.
pub trait InterfaceView<R, I, K>: Interface
where
    R: 'static,
    I: ?Sized + 'static,
    K: Send + 'static,
{
    /// The concrete value type.
    type Value: Send + 'static;

    /// Returns the support doing the actual work.
    fn view_support(&self) -> &DaoSupport<R, Self::Value, K>;

    /// Converts a concrete value into its interface view.
    fn view(value: Self::Value) -> Box<I>;
}

#[async_trait]
impl<T, R, V, K> AsyncDao<R, V, K> for T
where
    T: SupportedDao<R, V, K>,
    R: 'static,
    V: Send + 'static,
    K: Send + 'static,
{
    async fn insert(&self, value: V) -> DaogenResult<V> {
        self.support().insert(value).await
    }

    async fn find_by_id(&self, key: K) -> DaogenResult<Option<V>> {
        self.support().find_by_id(key).await
    }

    async fn find_by_ids(&self, keys: Vec<K>) -> DaogenResult<Vec<V>> {
        self.support().find_by_ids(keys).await
    }

    async fn exists_by_id(&self, key: K) -> DaogenResult<bool> {
        self.support().exists_by_id(key).await
    }

    async fn find_all(&self) -> DaogenResult<Vec<V>> {
        self.support().find_all().await
    }

    async fn count(&self) -> DaogenResult<u64> {
        self.support().count().await
    }

    async fn update(&self, value: V) -> DaogenResult<V> {
        self.support().update(value).await
    }

    async fn delete_by_id(&self, key: K) -> DaogenResult<()> {
        self.support().delete_by_id(key).await
    }

    async fn delete_by_ids(&self, keys: Vec<K>) -> DaogenResult<()> {
        self.support().delete_by_ids(keys).await
    }
}

#[async_trait]
impl<T, R, I, K> InterfaceDao<R, I, K> for T
where
    T: InterfaceView<R, I, K>,
    R: 'static,
    I: ?Sized + 'static,
    K: Send + 'static,
{
    async fn find_by_id(&self, key: K) -> DaogenResult<Option<Box<I>>> {
        let found = self.view_support().find_by_id(key).await?;
        Ok(found.map(T::view))
    }

    async fn find_all(&self) -> DaogenResult<Vec<Box<I>>> {
        let rows = self.view_support().find_all().await?;
        Ok(rows.into_iter().map(T::view).collect())
    }

    async fn delete_by_id(&self, key: K) -> DaogenResult<()> {
        self.view_support().delete_by_id(key).await
    }
}
