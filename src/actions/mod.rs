//! Actions Module
//!
//! The catalog of user-triggerable actions and their default shortcuts.
//!
//! ## Module Structure
//! - `types`: The immutable `Action` value
//! - `catalog`: XML loading, OS filtering and duplicate validation

mod catalog;
mod types;

// Re-export public API
pub use catalog::{ActionCatalog, CatalogError, CatalogLoader};
pub use types::{Action, ID_SEPARATOR};
