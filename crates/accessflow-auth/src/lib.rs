//! Bearer token verification for accessflow.
//!
//! This crate provides:
//! - HS256 JWT encoding and decoding with standard and custom claims
//! - Resolution of verified claims into a [`Principal`] carrying an explicit [`Role`]
//!
//! # Example
//!
//! ```rust,ignore
//! use accessflow_auth::{decode_token, encode_token, JwtClaims, RolePolicy};
//!
//! let claims = JwtClaims::builder()
//!     .subject("user-123")
//!     .email("ama@example.com")
//!     .roles(vec!["access-approver"])
//!     .expires_in_secs(3600)
//!     .build();
//!
//! let token = encode_token(&claims, secret)?;
//! let decoded = decode_token(&token, secret)?;
//! let principal = RolePolicy::new("access-approver").resolve(&decoded)?;
//! ```

mod claims;
mod error;
mod jwt;
mod principal;

pub use claims::{JwtClaims, JwtClaimsBuilder};
pub use error::AuthError;
pub use jwt::{decode_token, decode_token_with_config, encode_token, ValidationConfig};
pub use principal::{Principal, Role, RolePolicy};
