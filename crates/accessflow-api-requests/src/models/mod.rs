//! Request and response models for the access request API.

pub mod access_request;
pub mod catalog;

pub use access_request::*;
pub use catalog::*;
