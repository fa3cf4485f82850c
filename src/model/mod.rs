//! Domain model types (pure).
//!
//! All types in this module are plain data with smart constructors.

pub mod entry;
pub mod error;
pub mod identifiers;
pub mod query;

// Re-export for convenience
pub use entry::CatalogEntry;
pub use error::{AppError, CatalogError, FetchError, PaginationError, RegistryError};
pub use identifiers::{DisplayName, InvalidDisplayName, TaskId, TaskSequence};
pub use query::{Category, CategorySet, ListQuery, QueryMode, Source, UPLOADER_PREFIX};
