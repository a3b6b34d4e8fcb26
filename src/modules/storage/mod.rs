//! Storage module for object management
//!
//! Provides the [`ObjectStore`] seam and its S3-compatible implementation.

mod object_store;
mod s3_client;

pub use object_store::ObjectStore;
pub use s3_client::S3Client;
