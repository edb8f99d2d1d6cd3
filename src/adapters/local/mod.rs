//! Local adapters for monolith deployment.

pub mod fs;

pub use fs::FsMediaStorage;
