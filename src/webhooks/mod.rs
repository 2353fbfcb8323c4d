//! Webhook module for validating admission requests.
//!
//! - `validator`: the `CustomValidator` capability (create, update, delete)
//! - `machineset`: the MachineSet immutability validator
//! - `registration`: mounting validators on a `WebhookManager`
//! - `server`: AdmissionReview handling and the TLS listener

pub mod context;
pub mod machineset;
pub mod object;
pub mod registration;
mod server;
pub mod topology;
pub mod validator;

pub use context::{ContextError, RequestContext, RequestMetadata, request_from_context};
pub use machineset::MachineSetWebhook;
pub use object::AdmissionObject;
pub use registration::{Registration, WebhookManager, validation_path};
pub use server::{admit, run_webhook_server, webhook_exit_error};
pub use topology::{
    BypassPolicy, TOPOLOGY_DRY_RUN_ANNOTATION, TopologyDryRun, should_skip_immutability_checks,
};
pub use validator::CustomValidator;

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
