//! Contact storage.
//!
//! [`ContactStore`] defines the per-user store contract; the in-memory
//! backend is provided by [`InMemoryContactStore`].

mod memory;
mod traits;

pub use memory::InMemoryContactStore;
pub use traits::{ContactStore, SearchParams, DEFAULT_COUNT};
