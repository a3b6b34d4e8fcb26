//! Object operations against the configured bucket
//!
//! `services` talks to storage, `handlers` turns CLI actions into console output.

pub mod handlers;
pub mod services;

pub use handlers::handle_action;
pub use services::BucketService;
