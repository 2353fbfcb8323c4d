//! Runtime configuration.
//!
//! Defaults match the paths and ports used by the deployment manifests and
//! can be overridden with environment variables.

use std::str::FromStr;

use tracing::debug;

use crate::error::WebhookError;

/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 9443;
/// Default health server port
pub const HEALTH_PORT: u16 = 8080;

/// Webhook process configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// PEM certificate served by the webhook
    pub cert_path: String,
    /// PEM private key for `cert_path`
    pub key_path: String,
    /// Port of the TLS admission listener
    pub webhook_port: u16,
    /// Port of the probe and metrics listener
    pub health_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cert_path: WEBHOOK_CERT_PATH.to_string(),
            key_path: WEBHOOK_KEY_PATH.to_string(),
            webhook_port: WEBHOOK_PORT,
            health_port: HEALTH_PORT,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, WebhookError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WebhookError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            cert_path: lookup("WEBHOOK_CERT_PATH").unwrap_or(defaults.cert_path),
            key_path: lookup("WEBHOOK_KEY_PATH").unwrap_or(defaults.key_path),
            webhook_port: parse_var(&lookup, "WEBHOOK_PORT", defaults.webhook_port)?,
            health_port: parse_var(&lookup, "HEALTH_PORT", defaults.health_port)?,
        };
        debug!(?config, "Loaded configuration");
        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, WebhookError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| WebhookError::Config(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}
