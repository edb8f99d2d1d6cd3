//! AWS adapters.

pub mod s3;

pub use s3::S3MediaStorage;
