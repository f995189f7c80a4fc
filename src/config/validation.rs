//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempt ceilings >= 1)
//! - Check that every configured endpoint is a parseable URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: MigratorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use url::Url;

use crate::config::schema::MigratorConfig;

/// A single semantic problem found in a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A field that must be a URL did not parse.
    InvalidUrl { field: String, value: String },
    /// A numeric field is outside its accepted range.
    OutOfRange { field: String, reason: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidUrl { field, value } => {
                write!(f, "{field}: not a valid URL: {value:?}")
            }
            ValidationError::OutOfRange { field, reason } => write!(f, "{field}: {reason}"),
        }
    }
}

fn require_positive(errors: &mut Vec<ValidationError>, field: &str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::OutOfRange {
            field: field.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
}

fn require_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if Url::parse(value).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

/// Semantic validation over a deserialized config.
pub fn validate_config(config: &MigratorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    require_url(&mut errors, "wallet.rpc_url", &config.wallet.rpc_url);
    require_positive(
        &mut errors,
        "wallet.request_timeout_secs",
        config.wallet.request_timeout_secs,
    );

    require_positive(
        &mut errors,
        "discovery.rpc_timeout_secs",
        config.discovery.rpc_timeout_secs,
    );
    require_positive(
        &mut errors,
        "discovery.probe_parallelism",
        config.discovery.probe_parallelism as u64,
    );

    require_positive(&mut errors, "retry.max_attempts", u64::from(config.retry.max_attempts));
    require_positive(&mut errors, "retry.base_delay_ms", config.retry.base_delay_ms);
    if config.retry.max_delay_ms < config.retry.base_delay_ms {
        errors.push(ValidationError::OutOfRange {
            field: "retry.max_delay_ms".to_string(),
            reason: "must be at least retry.base_delay_ms".to_string(),
        });
    }

    require_positive(
        &mut errors,
        "execution.confirmation_timeout_secs",
        config.execution.confirmation_timeout_secs,
    );
    require_positive(
        &mut errors,
        "execution.confirmation_poll_ms",
        config.execution.confirmation_poll_ms,
    );
    require_positive(
        &mut errors,
        "execution.default_gas_price_gwei",
        config.execution.default_gas_price_gwei,
    );

    for (network, over) in &config.networks {
        for endpoint in &over.rpc_endpoints {
            require_url(&mut errors, &format!("networks.{network}.rpc_endpoints"), endpoint);
        }
        if let Some(indexer) = &over.indexer_endpoint {
            require_url(&mut errors, &format!("networks.{network}.indexer_endpoint"), indexer);
        }
        if let Some(indexer) = &over.secondary_indexer_endpoint {
            require_url(
                &mut errors,
                &format!("networks.{network}.secondary_indexer_endpoint"),
                indexer,
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&MigratorConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = MigratorConfig::default();
        config.wallet.rpc_url = "not a url".to_string();
        config.retry.max_attempts = 0;
        config.execution.confirmation_poll_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_backoff_cap_below_base_rejected() {
        let mut config = MigratorConfig::default();
        config.retry.base_delay_ms = 5_000;
        config.retry.max_delay_ms = 1_000;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::OutOfRange { field, .. } if field == "retry.max_delay_ms")));
    }

    #[test]
    fn test_bad_override_endpoint_rejected() {
        let mut config = MigratorConfig::default();
        config.networks.insert(
            "sepolia".to_string(),
            crate::config::schema::NetworkOverride {
                rpc_endpoints: vec!["::garbage::".to_string()],
                indexer_endpoint: None,
                secondary_indexer_endpoint: None,
            },
        );

        assert!(validate_config(&config).is_err());
    }
}
