//! # Daogen Core
//!
//! Error definitions, result aliases and logging setup shared by the
//! generator, the DAO runtime and the command line front end.

pub mod error;
pub mod result;
pub mod telemetry;

pub use error::*;
pub use result::*;
pub use telemetry::*;

// Re-export shaku's marker trait for injectable interfaces
pub use shaku::Interface;
