//! HTTP protocol layer module
//!
//! Content-type lookup and response builders, independent of the storage
//! handlers that use them.

pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_405_response, build_413_response, build_500_response,
    build_empty_response, RESOURCE_METHODS,
};
