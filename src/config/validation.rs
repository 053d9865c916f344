//! Probe configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every upstream URL parses into a supported proxy endpoint
//! - Validate value ranges (attempts > 0, known network)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Breaker query parameters are not validated here; they fall back to defaults

use thiserror::Error;

use crate::config::schema::ProbeConfig;
use crate::net::{Network, ProxyEndpoint};

/// A single semantic problem in a [`ProbeConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no upstream proxies configured")]
    NoProxies,

    #[error("proxy {url:?} is invalid: {reason}")]
    InvalidProxy { url: String, reason: String },

    #[error("target address is empty")]
    EmptyTarget,

    #[error("unknown network {0:?}")]
    UnknownNetwork(String),

    #[error("attempts must be greater than zero")]
    ZeroAttempts,
}

/// Check a probe configuration, collecting every problem found.
pub fn validate_config(config: &ProbeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.proxies.is_empty() {
        errors.push(ValidationError::NoProxies);
    }
    for url in &config.proxies {
        if let Err(e) = ProxyEndpoint::parse(url) {
            errors.push(ValidationError::InvalidProxy {
                url: url.clone(),
                reason: e.to_string(),
            });
        }
    }

    if config.target.trim().is_empty() {
        errors.push(ValidationError::EmptyTarget);
    }
    if config.network.parse::<Network>().is_err() {
        errors.push(ValidationError::UnknownNetwork(config.network.clone()));
    }
    if config.attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
