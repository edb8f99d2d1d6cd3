//! Ports - Trait definitions for the collaborators the core talks to.

pub mod auth;
pub mod media;
pub mod store;
