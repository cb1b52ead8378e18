//! HTTP handlers for the access request API.

pub mod access_requests;
pub mod catalog;

pub use access_requests::*;
pub use catalog::*;
