//! Credential handling
//!
//! This module covers the credential side of the system:
//! - Ordered discovery of service-account key files on disk
//! - Parsing a key file into its usable fields
//! - Exchanging a signed JWT assertion for a scoped bearer token

mod source;
mod token;

pub use source::CredentialSource;
pub use token::{exchange_token, ServiceAccountKey};
