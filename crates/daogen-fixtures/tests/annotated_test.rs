//! The asynchronous DAO contract, exercised through DAOs and a module
//! generated with default switches.

use daogen_fixtures::annotated::vertx::tables::daos::{SomethingDao, SomethingcompositeDao, SomethingcompositeKey};
use daogen_fixtures::annotated::vertx::tables::modules::DaoModule;
use daogen_fixtures::model::interfaces::ISomething;
use daogen_fixtures::model::pojos::{Something, Somethingcomposite};
use daogen_fixtures::model::records::{SomethingRecord, SomethingcompositeRecord};
use daogen_runtime::{
    AsyncDao, BlockingExecutor, ExecutorConfig, HasComponent, InMemoryTable, InterfaceDao, MapperComponent,
    MapperParameters,
};
use std::collections::HashSet;
use std::sync::Arc;

type SomethingAsync = dyn AsyncDao<SomethingRecord, Something, i32>;
type SomethingView = dyn InterfaceDao<SomethingRecord, dyn ISomething, i32>;
type CompositeAsync = dyn AsyncDao<SomethingcompositeRecord, Somethingcomposite, SomethingcompositeKey>;

fn something_table() -> InMemoryTable<SomethingRecord, Something, i32> {
    InMemoryTable::new("something", SomethingDao::key_of).with_identity(|value, next| {
        let id = i32::try_from(next).unwrap_or(i32::MAX);
        value.someid = Some(id);
        id
    })
}

fn composite_table() -> InMemoryTable<SomethingcompositeRecord, Somethingcomposite, SomethingcompositeKey> {
    InMemoryTable::new("somethingcomposite", SomethingcompositeDao::key_of)
}

fn module() -> DaoModule {
    DaoModule::builder()
        .with_component_parameters::<MapperComponent<SomethingRecord, Something, i32>>(MapperParameters::new(
            something_table(),
        ))
        .with_component_parameters::<MapperComponent<SomethingcompositeRecord, Somethingcomposite, SomethingcompositeKey>>(
            MapperParameters::new(composite_table()),
        )
        .build()
}

fn something_dao() -> Arc<SomethingAsync> {
    module().resolve()
}

fn new_something(text: &str) -> Something {
    Something {
        someid: None,
        somestring: Some(text.to_string()),
        somehugenumber: Some(1_000_000_000_000),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_insert_then_find_by_id() {
    let dao = something_dao();

    let inserted = dao.insert(new_something("first")).await.unwrap();
    let id = inserted.someid.unwrap();

    let found = dao.find_by_id(id).await.unwrap();
    assert_eq!(found, Some(inserted));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_find_by_id_not_found_is_success() {
    let dao = something_dao();
    assert_eq!(dao.find_by_id(404).await.unwrap(), None);
    assert!(!dao.exists_by_id(404).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_update_existing_row() {
    let dao = something_dao();
    let mut row = dao.insert(new_something("before")).await.unwrap();

    row.somestring = Some("after".to_string());
    dao.update(row.clone()).await.unwrap();

    let found = dao.find_by_id(row.someid.unwrap()).await.unwrap().unwrap();
    assert_eq!(found.somestring.as_deref(), Some("after"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_update_without_key_fails() {
    let dao = something_dao();
    let err = dao.update(new_something("keyless")).await.unwrap_err();
    assert_eq!(err.error_code(), "KEY_NOT_SET");
    assert_eq!(dao.count().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_delete_by_id_is_idempotent() {
    let dao = something_dao();
    let id = dao.insert(new_something("doomed")).await.unwrap().someid.unwrap();

    dao.delete_by_id(id).await.unwrap();
    dao.delete_by_id(id).await.unwrap();
    dao.delete_by_id(12_345).await.unwrap();

    assert!(!dao.exists_by_id(id).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_batch_operations() {
    let dao = something_dao();
    for text in ["a", "b", "c"] {
        dao.insert(new_something(text)).await.unwrap();
    }

    assert_eq!(dao.find_all().await.unwrap().len(), 3);
    let found = dao.find_by_ids(vec![3, 99, 1]).await.unwrap();
    let ids: Vec<Option<i32>> = found.iter().map(|s| s.someid).collect();
    assert_eq!(ids, vec![Some(3), Some(1)]);

    dao.delete_by_ids(vec![1, 2, 99]).await.unwrap();
    assert_eq!(dao.count().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_mapping_failure_surfaces_once() {
    let dao = something_dao();
    let row = dao.insert(new_something("unique")).await.unwrap();

    let err = dao.insert(row).await.unwrap_err();
    assert_eq!(err.error_code(), "DATA_ACCESS_ERROR");
    assert!(!err.is_retriable());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_dao() {
    let dao = something_dao();

    let inserts = (0..32).map(|i| {
        let dao = Arc::clone(&dao);
        async move { dao.insert(new_something(&format!("row-{i}"))).await }
    });
    let rows = futures::future::join_all(inserts).await;

    let ids: HashSet<i32> = rows.into_iter().map(|r| r.unwrap().someid.unwrap()).collect();
    assert_eq!(ids.len(), 32);
    assert_eq!(dao.count().await.unwrap(), 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_interface_binding_shares_the_singleton() {
    let module = module();
    let concrete: Arc<SomethingAsync> = module.resolve();
    let view: Arc<SomethingView> = module.resolve();
    let again: Arc<SomethingAsync> = module.resolve();

    assert_eq!(Arc::as_ptr(&concrete).cast::<()>(), Arc::as_ptr(&view).cast::<()>());
    assert_eq!(Arc::as_ptr(&concrete).cast::<()>(), Arc::as_ptr(&again).cast::<()>());

    // A write through one binding is visible through the other.
    let id = concrete.insert(new_something("shared")).await.unwrap().someid.unwrap();
    let seen = view.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(seen.someid(), Some(id));
    assert_eq!(seen.somestring(), Some("shared"));

    view.delete_by_id(id).await.unwrap();
    assert_eq!(concrete.find_by_id(id).await.unwrap(), None);
}

#[test]
fn test_daos_share_the_module_executor() {
    let module = DaoModule::builder()
        .with_component_parameters::<BlockingExecutor>(ExecutorConfig { max_in_flight: 2 })
        .build();

    let executor: &BlockingExecutor = module.resolve_ref();
    assert_eq!(executor.config().max_in_flight, 2);
    assert_eq!(executor.available_permits(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_mapper_fails_per_call() {
    let module = DaoModule::builder()
        .with_component_parameters::<MapperComponent<SomethingRecord, Something, i32>>(MapperParameters::new(
            something_table(),
        ))
        .build();

    let something: Arc<SomethingAsync> = module.resolve();
    assert_eq!(something.count().await.unwrap(), 0);

    let composite: Arc<CompositeAsync> = module.resolve();
    let err = composite.find_all().await.unwrap_err();
    assert_eq!(err.error_code(), "UNBOUND_INTERFACE");
}

#[test]
fn test_composite_key_value_semantics() {
    let a = SomethingcompositeKey::new(1, 2);
    assert_eq!(a, SomethingcompositeKey::new(1, 2));
    assert_ne!(a, SomethingcompositeKey::new(1, 3));
    assert_ne!(a, SomethingcompositeKey::new(2, 2));
    assert!(SomethingcompositeKey::new(1, 9) < SomethingcompositeKey::new(2, 0));
    assert_eq!((*a.someid(), *a.somesecondid()), (1, 2));

    let partial = Somethingcomposite {
        someid: Some(1),
        ..Somethingcomposite::default()
    };
    assert_eq!(SomethingcompositeDao::key_of(&partial), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_composite_key_dao() {
    let dao: Arc<CompositeAsync> = module().resolve();
    let row = Somethingcomposite {
        someid: Some(1),
        somesecondid: Some(2),
        somejsonobject: Some("{}".to_string()),
    };

    dao.insert(row.clone()).await.unwrap();

    assert_eq!(dao.find_by_id(SomethingcompositeKey::new(1, 2)).await.unwrap(), Some(row));
    assert_eq!(dao.find_by_id(SomethingcompositeKey::new(2, 1)).await.unwrap(), None);

    let keyless = Somethingcomposite {
        someid: Some(1),
        ..Somethingcomposite::default()
    };
    assert_eq!(dao.update(keyless).await.unwrap_err().error_code(), "KEY_NOT_SET");
}
