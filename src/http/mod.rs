//! HTTP protocol layer module
//!
//! Content-type detection and response builders, decoupled from mount
//! resolution.

pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_404_response, build_405_response, build_file_response, build_options_response,
    build_status_response,
};
