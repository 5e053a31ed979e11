//! Reference host kept entirely in memory. Backs the CLI and the
//! integration tests; real deployments implement the traits in
//! [`crate::application::repos`] over their own storage.

mod cache;
mod store;

pub use cache::MemoryObjectCache;
pub use store::MemoryHost;
