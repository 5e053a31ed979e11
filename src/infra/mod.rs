//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub(crate) mod lock;
pub mod memory;
pub mod sanitize;
pub mod telemetry;
