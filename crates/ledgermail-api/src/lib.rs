//! HTTP client for the local sending service
//!
//! Implements the ledgermail-core collaborator traits on top of the
//! service's REST API.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::MailchainClient;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use types::*;
