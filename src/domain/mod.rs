//! Domain layer for vaspflow
//!
//! Run records, node specs, actions and workflow graphs, plus the port
//! traits implemented by infrastructure adapters.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
