//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Parse the subnet and header name exactly once, for both validation and policy build
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FilterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use http::HeaderName;
use ipnet::IpNet;
use thiserror::Error;

use crate::config::schema::FilterConfig;

/// A single semantic problem in the filter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("allowedSubnet '{value}' is not valid CIDR notation")]
    InvalidSubnet { value: String },

    #[error("requiredHeader must not be empty")]
    EmptyHeaderName,

    #[error("requiredHeader '{0}' is not a valid HTTP header name")]
    InvalidHeaderName(String),

    #[error("requiredValue must not be empty")]
    EmptyHeaderValue,
}

/// Validate a filter configuration, collecting every error.
pub fn validate_config(config: &FilterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = parse_subnet(&config.allowed_subnet) {
        errors.push(e);
    }
    if let Err(e) = parse_header_name(&config.required_header) {
        errors.push(e);
    }
    if config.required_value.is_empty() {
        errors.push(ValidationError::EmptyHeaderValue);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse a CIDR string. Host bits are cleared ("10.1.0.0/8" becomes "10.0.0.0/8").
pub fn parse_subnet(value: &str) -> Result<IpNet, ValidationError> {
    value
        .trim()
        .parse::<IpNet>()
        .map(|net| net.trunc())
        .map_err(|_| ValidationError::InvalidSubnet {
            value: value.to_string(),
        })
}

/// Parse the required header name. Names are stored lowercase.
pub fn parse_header_name(value: &str) -> Result<HeaderName, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyHeaderName);
    }
    HeaderName::from_bytes(trimmed.as_bytes())
        .map_err(|_| ValidationError::InvalidHeaderName(value.to_string()))
}
