//! Request handler module
//!
//! Routes `/files` to the collection listing and `/files/{name}` to the
//! single file handler.

pub mod collection;
pub mod resource;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
