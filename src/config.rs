use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Read from the process environment, after loading an optional `.env` file.
// Missing variables fall back to the defaults below; malformed numbers are
// errors rather than silently defaulted.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Comma-separated `host:port` list
    pub scylla_nodes: Vec<String>,
    pub scylla_keyspace: String,
    pub redpanda_brokers: String,
    pub customer_events_topic: String,
    pub mfa_events_topic: String,
    pub metrics_port: u16,
    /// Attempts per command when saves hit concurrency conflicts
    pub command_max_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scylla_nodes: vec!["127.0.0.1:9042".to_string()],
            scylla_keyspace: "accounts_ks".to_string(),
            redpanda_brokers: "127.0.0.1:9092".to_string(),
            customer_events_topic: "customer-events".to_string(),
            mfa_events_topic: "mfa-events".to_string(),
            metrics_port: 9090,
            command_max_attempts: 3,
        }
    }
}

impl AppConfig {
    /// Load from the environment (and `.env` when present)
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; used by `from_env` and tests
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        let scylla_nodes = match lookup("SCYLLA_NODES") {
            Some(raw) => {
                let nodes: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect();
                if nodes.is_empty() {
                    defaults.scylla_nodes.clone()
                } else {
                    nodes
                }
            }
            None => defaults.scylla_nodes.clone(),
        };

        let config = Self {
            scylla_nodes,
            scylla_keyspace: text("SCYLLA_KEYSPACE", defaults.scylla_keyspace),
            redpanda_brokers: text("REDPANDA_BROKERS", defaults.redpanda_brokers),
            customer_events_topic: text("CUSTOMER_EVENTS_TOPIC", defaults.customer_events_topic),
            mfa_events_topic: text("MFA_EVENTS_TOPIC", defaults.mfa_events_topic),
            metrics_port: parse_number(&lookup, "METRICS_PORT", defaults.metrics_port)?,
            command_max_attempts: parse_number(&lookup, "COMMAND_MAX_ATTEMPTS", defaults.command_max_attempts)?,
        };

        if config.command_max_attempts == 0 {
            anyhow::bail!("COMMAND_MAX_ATTEMPTS must be at least 1");
        }

        Ok(config)
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(config_from(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SCYLLA_NODES", "10.0.0.1:9042, 10.0.0.2:9042"),
            ("SCYLLA_KEYSPACE", "prod_accounts"),
            ("METRICS_PORT", "9191"),
            ("COMMAND_MAX_ATTEMPTS", "5"),
        ])
        .unwrap();

        assert_eq!(config.scylla_nodes, vec!["10.0.0.1:9042", "10.0.0.2:9042"]);
        assert_eq!(config.scylla_keyspace, "prod_accounts");
        assert_eq!(config.metrics_port, 9191);
        assert_eq!(config.command_max_attempts, 5);
        assert_eq!(config.customer_events_topic, "customer-events");
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        let err = config_from(&[("METRICS_PORT", "ninety")]).unwrap_err();
        assert!(err.to_string().contains("METRICS_PORT"));

        assert!(config_from(&[("COMMAND_MAX_ATTEMPTS", "0")]).is_err());
        assert!(config_from(&[("METRICS_PORT", "70000")]).is_err());
    }
}
