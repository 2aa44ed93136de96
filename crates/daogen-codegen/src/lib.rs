//! # Daogen Codegen
//!
//! Turns relational schema metadata into asynchronous per-table DAOs and
//! one injection module per schema.
//!
//! ```text
//! Catalog ──► GeneratorDriver ──► KeyResolver ──► DaoEmitter ──────► <schema>/tables/daos/*.rs
//!                    │                 │
//!                    │                 └─(no key)─► skipped, reported
//!                    │
//!                    └──► BindingGenerator ──► ModuleEmitter ──► <schema>/tables/modules/dao_module.rs
//! ```
//!
//! Generated code compiles against `daogen-runtime`.

pub mod binding;
pub mod dao;
pub mod driver;
pub mod key;
pub mod module;
pub mod schema;
pub mod strategy;
pub mod writer;

pub use binding::*;
pub use dao::*;
pub use driver::*;
pub use key::*;
pub use module::*;
pub use schema::*;
pub use strategy::*;
pub use writer::*;
