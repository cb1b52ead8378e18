//! Row models.

pub mod access_request;

pub use access_request::AccessRequestRow;
