//! Configuration schema definitions.
//!
//! Field names inside the `filter` table keep the camelCase keys the filter has
//! always been configured with (`disallowedIPs`, `allowedSubnet`, ...). A flat
//! plugin document without the `filter` wrapper is accepted by the loader.
//!
//! Unknown keys are rejected at every level: a misspelled `disallowedIps` must not
//! silently leave the blocklist empty.

use serde::{Deserialize, Serialize};

/// Root configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AccessFilterConfig {
    /// Access rules.
    pub filter: FilterConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Access rules as supplied by the host.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterConfig {
    /// Exact IP literals that are always rejected.
    #[serde(rename = "disallowedIPs")]
    pub disallowed_ips: Vec<String>,

    /// Subnet in CIDR notation (e.g. "10.0.0.0/8").
    pub allowed_subnet: String,

    /// How `allowed_subnet` combines with the header check.
    pub subnet_policy: SubnetPolicy,

    /// Header name to look up (case-insensitive).
    pub required_header: String,

    /// Value the header must carry (byte-exact).
    pub required_value: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            disallowed_ips: Vec::new(),
            allowed_subnet: "10.0.0.0/8".to_string(),
            subnet_policy: SubnetPolicy::default(),
            required_header: "X-Custom-Header".to_string(),
            required_value: "ExpectedValue".to_string(),
        }
    }
}

/// Relationship between subnet membership and the header check.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubnetPolicy {
    /// Subnet is validated but never consulted.
    #[default]
    Ignore,
    /// Addresses inside the subnet are allowed without the header.
    Bypass,
    /// Addresses outside the subnet are denied; inside, the header is still required.
    Require,
}

impl std::fmt::Display for SubnetPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SubnetPolicy::Ignore => "ignore",
            SubnetPolicy::Bypass => "bypass",
            SubnetPolicy::Require => "require",
        };
        f.write_str(name)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Emit decision counters through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_plugin_defaults() {
        let config = FilterConfig::default();
        assert!(config.disallowed_ips.is_empty());
        assert_eq!(config.allowed_subnet, "10.0.0.0/8");
        assert_eq!(config.required_header, "X-Custom-Header");
        assert_eq!(config.required_value, "ExpectedValue");
        assert_eq!(config.subnet_policy, SubnetPolicy::Ignore);
    }

    #[test]
    fn test_plugin_field_names() {
        let config: FilterConfig = serde_json::from_str(
            r#"{"disallowedIPs": ["1.2.3.4"], "requiredHeader": "X-Token", "subnetPolicy": "bypass"}"#,
        )
        .unwrap();

        assert_eq!(config.disallowed_ips, vec!["1.2.3.4".to_string()]);
        assert_eq!(config.required_header, "X-Token");
        assert_eq!(config.subnet_policy, SubnetPolicy::Bypass);
        // Unset fields keep their defaults
        assert_eq!(config.required_value, "ExpectedValue");
        assert_eq!(config.allowed_subnet, "10.0.0.0/8");
    }

    #[test]
    fn test_misspelled_key_rejected() {
        let err = serde_json::from_str::<FilterConfig>(r#"{"disallowedIps": ["1.2.3.4"]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("disallowedIps"));

        let toml_doc = "[observability]\nlog-level = \"debug\"\n";
        assert!(toml::from_str::<AccessFilterConfig>(toml_doc).is_err());
    }
}
