//! Adapters - Concrete implementations of ports.

pub mod http;
pub mod jwt;
pub mod memory;

#[cfg(feature = "aws")]
pub mod aws;

#[cfg(feature = "local")]
pub mod local;

#[cfg(feature = "redis")]
pub mod redis;
