//! Shaku components every generated DAO is built from.
//!
//! A generated DAO injects its table's mapper and the shared executor:
//!
//! ```text
//! DaoModule ──► SomethingDao ──► dyn TableMapper<R, V, K>   (MapperComponent)
//!                     │
//!                     └─────────► BlockingExecutor           (ExecutorConfig parameters)
//! ```
//!
//! Applications hand both in through the module builder:
//!
//! ```text
//! DaoModule::builder()
//!     .with_component_parameters::<MapperComponent<R, V, K>>(MapperParameters::new(table))
//!     .with_component_parameters::<BlockingExecutor>(ExecutorConfig { max_in_flight: 16 })
//!     .build()
//! ```

use crate::{BlockingExecutor, ExecutorConfig, TableMapper};
use daogen_core::{DaogenError, DaogenResult};
use shaku::{Component, Module, ModuleBuildContext};
use std::any::type_name;
use std::marker::PhantomData;
use tracing::{debug, warn};

impl<M: Module> Component<M> for BlockingExecutor {
    type Interface = BlockingExecutor;
    type Parameters = ExecutorConfig;

    fn build(_: &mut ModuleBuildContext<M>, config: ExecutorConfig) -> Box<BlockingExecutor> {
        debug!(max_in_flight = config.max_in_flight, "Building blocking executor");
        Box::new(BlockingExecutor::new(config))
    }
}

/// Binds an application-supplied [`TableMapper`] as `dyn TableMapper<R, V, K>`.
///
/// Only the type is used; the mapper itself arrives as [`MapperParameters`].
pub struct MapperComponent<R, V, K> {
    _types: PhantomData<fn() -> (R, V, K)>,
}

/// The mapper a [`MapperComponent`] is built from.
pub struct MapperParameters<R, V, K>
where
    R: 'static,
    V: 'static,
    K: 'static,
{
    mapper: Option<Box<dyn TableMapper<R, V, K>>>,
}

impl<R, V, K> MapperParameters<R, V, K>
where
    R: 'static,
    V: 'static,
    K: 'static,
{
    #[must_use]
    pub fn new(mapper: impl TableMapper<R, V, K>) -> Self {
        Self {
            mapper: Some(Box::new(mapper)),
        }
    }
}

impl<R, V, K> Default for MapperParameters<R, V, K>
where
    R: 'static,
    V: 'static,
    K: 'static,
{
    fn default() -> Self {
        Self { mapper: None }
    }
}

impl<M, R, V, K> Component<M> for MapperComponent<R, V, K>
where
    M: Module,
    R: 'static,
    V: 'static,
    K: 'static,
{
    type Interface = dyn TableMapper<R, V, K>;
    type Parameters = MapperParameters<R, V, K>;

    fn build(_: &mut ModuleBuildContext<M>, params: Self::Parameters) -> Box<dyn TableMapper<R, V, K>> {
        params.mapper.unwrap_or_else(|| {
            warn!(mapper = type_name::<Self>(), "No mapper supplied; calls through it will fail");
            Box::new(UnboundMapper::<R, V, K> { _types: PhantomData })
        })
    }
}

/// Stands in for a mapper the module was built without.
struct UnboundMapper<R, V, K> {
    _types: PhantomData<fn() -> (R, V, K)>,
}

impl<R, V, K> UnboundMapper<R, V, K>
where
    R: 'static,
    V: 'static,
    K: 'static,
{
    fn unbound<T>() -> DaogenResult<T> {
        Err(DaogenError::Unbound(type_name::<dyn TableMapper<R, V, K>>().to_string()))
    }
}

impl<R, V, K> TableMapper<R, V, K> for UnboundMapper<R, V, K>
where
    R: 'static,
    V: 'static,
    K: 'static,
{
    fn insert(&self, _: &V) -> DaogenResult<V> {
        Self::unbound()
    }

    fn fetch_by_id(&self, _: &K) -> DaogenResult<Option<V>> {
        Self::unbound()
    }

    fn update(&self, _: &V) -> DaogenResult<V> {
        Self::unbound()
    }

    fn delete_by_id(&self, _: &K) -> DaogenResult<u64> {
        Self::unbound()
    }

    fn fetch_all(&self) -> DaogenResult<Vec<V>> {
        Self::unbound()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryTable;
    use shaku::{module, HasComponent};
    use std::sync::Arc;

    struct NoteRecord;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: Option<i64>,
    }

    type NoteMapper = MapperComponent<NoteRecord, Note, i64>;

    module! {
        NoteModule {
            components = [NoteMapper, BlockingExecutor],
            providers = [],
        }
    }

    fn notes() -> InMemoryTable<NoteRecord, Note, i64> {
        InMemoryTable::new("note", |n: &Note| n.id).with_rows([Note { id: Some(1) }])
    }

    #[test]
    fn test_supplied_mapper_is_resolved() {
        let module = NoteModule::builder()
            .with_component_parameters::<NoteMapper>(MapperParameters::new(notes()))
            .build();

        let mapper: Arc<dyn TableMapper<NoteRecord, Note, i64>> = module.resolve();
        assert_eq!(mapper.fetch_by_id(&1).unwrap(), Some(Note { id: Some(1) }));
        assert_eq!(mapper.count().unwrap(), 1);
    }

    #[test]
    fn test_missing_mapper_fails_per_call() {
        let module = NoteModule::builder().build();

        let mapper: Arc<dyn TableMapper<NoteRecord, Note, i64>> = module.resolve();
        let err = mapper.fetch_all().unwrap_err();
        assert_eq!(err.error_code(), "UNBOUND_INTERFACE");
        assert!(err.to_string().contains("TableMapper"));
    }

    #[test]
    fn test_executor_parameters() {
        let module = NoteModule::builder()
            .with_component_parameters::<BlockingExecutor>(ExecutorConfig { max_in_flight: 3 })
            .build();

        let executor: &BlockingExecutor = module.resolve_ref();
        assert_eq!(executor.config().max_in_flight, 3);
        assert_eq!(executor.available_permits(), 3);
    }

    #[test]
    fn test_executor_defaults() {
        let module = NoteModule::builder().build();
        let first: Arc<BlockingExecutor> = module.resolve();
        let second: Arc<BlockingExecutor> = module.resolve();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.config().max_in_flight, ExecutorConfig::default().max_in_flight);
    }
}
