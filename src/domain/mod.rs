//! Domain layer - Identifiers, documents and paging rules.

pub mod id;
pub mod models;
pub mod pagination;

pub use id::Id;
