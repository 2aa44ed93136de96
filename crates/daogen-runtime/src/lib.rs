//! # Daogen Runtime
//!
//! What daogen-generated DAOs and modules are compiled against.
//!
//! ```text
//! generated DaoModule (shaku) ──► Arc<dyn AsyncDao<R, V, K>>
//!                                           │
//!                       generated SomethingDao (SupportedDao, Component)
//!                                           │
//!                       DaoSupport ──► BlockingExecutor ──► TableMapper
//! ```
//!
//! ## Structure
//!
//! ```text
//! src/
//!   contract.rs   ← AsyncDao / InterfaceDao and their blanket impls
//!   support.rs    ← DaoSupport, the shared DAO implementation
//!   executor.rs   ← BlockingExecutor, single-outcome blocking dispatch
//!   mapper.rs     ← TableMapper (blocking seam) and InMemoryTable
//!   component.rs  ← shaku components for mappers and the executor
//!   metrics.rs    ← per-operation counters and histograms
//! ```

pub mod component;
pub mod contract;
pub mod executor;
pub mod mapper;
pub mod metrics;
pub mod support;

pub use component::*;
pub use contract::*;
pub use executor::*;
pub use mapper::*;
pub use support::*;

// Generated code names these through the runtime crate only
pub use daogen_core::{DaogenError, DaogenResult, Interface};
pub use shaku::{Component, HasComponent, Module, ModuleBuildContext, ModuleBuilder};
