pub mod memory;
pub mod sql;

pub use memory::InMemoryMenuStore;
pub use sql::SqlMenuStore;

use menuwise_core::errors::StoreError;

/// Core error surface has no sqlx dependency, so driver failures cross the
/// seam as backend messages.
pub(crate) fn backend(error: sqlx::Error) -> StoreError {
    StoreError::Backend(error.to_string())
}
