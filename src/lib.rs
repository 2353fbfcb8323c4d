//! machineset-webhook library crate
//!
//! Validating admission webhook that keeps MachineSet resources immutable
//! once created, except for topology dry-run requests.

pub mod config;
pub mod crd;
pub mod error;
pub mod health;
pub mod webhooks;

pub use config::{Config, HEALTH_PORT, WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT};
pub use error::{AdmissionError, WebhookError};
pub use health::HealthState;
pub use webhooks::{MachineSetWebhook, WebhookManager, run_webhook_server, webhook_exit_error};
