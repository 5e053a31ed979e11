//! Application services: the Markdown engine and the host contracts it
//! drives.

pub mod engine;
pub mod error;
pub mod registry;
pub mod remote;
pub mod render;
pub mod repos;
pub mod revisions;
pub mod sync;
