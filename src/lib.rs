//! Development server for the gridchen components
//!
//! Serves component packages and the project directory under URL prefixes,
//! with longest-prefix mount selection and traversal-safe resolution.

pub mod browser;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod mount;
pub mod resolve;
pub mod server;
