//! Browser shell security features.
//!
//! This crate implements:
//! - An ephemeral credential vault
//! - Domain blocklist request filtering

pub mod blocklist;
pub mod vault;

pub use blocklist::{Blocklist, RequestFilter, DEFAULT_AD_DOMAINS};
pub use vault::{CredentialVault, VaultError};
