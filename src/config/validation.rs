//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, endpoint URLs and limits
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{GatewayConfig, ObjectStoreConfig};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("invalid {field} URL '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("listener.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    let valid = Url::parse(value)
        .map(|url| !url.cannot_be_a_base())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.routes.path.trim().is_empty() {
        errors.push(ValidationError::Empty("routes.path"));
    }

    match &config.object_store {
        ObjectStoreConfig::Fs { root } if root.is_empty() => {
            errors.push(ValidationError::Empty("object_store.root"));
        }
        ObjectStoreConfig::Fs { .. } => {}
        ObjectStoreConfig::Http { .. } => {
            if let Some(base) = config.object_store.base_url() {
                check_url("object_store", &base, &mut errors);
            }
        }
    }

    check_url("invoker", &config.invoker.base_url(), &mut errors);
    if config.invoker.api_version.is_empty() {
        errors.push(ValidationError::Empty("invoker.api_version"));
    }

    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
