//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the object storage client.

pub mod storage;
