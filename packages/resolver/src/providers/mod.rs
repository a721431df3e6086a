//! Provider implementations.

pub mod http;

pub use http::HttpDirectory;
