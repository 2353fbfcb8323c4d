//! Admission webhook server.
//!
//! Provides the HTTP endpoints behind every registered validator.
//!
//! To enable the webhook:
//! 1. Issue a serving certificate (e.g. with cert-manager or the service CA operator)
//! 2. Mount it into the pod at /etc/webhook/certs/
//! 3. Apply a ValidatingWebhookConfiguration rendered from the registrations
//!
//! The server refuses to start without certificates: the API server only
//! calls webhooks over TLS.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse};
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::WebhookError;
use crate::health::HealthState;
use crate::webhooks::context::RequestContext;
use crate::webhooks::object::AdmissionObject;
use crate::webhooks::registration::operation_name;
use crate::webhooks::validator::CustomValidator;

/// Shared state for the handler of one registered validator
pub struct ValidatorState {
    /// Kind the validator is registered for, used in logs and metrics
    pub kind: String,
    pub validator: Arc<dyn CustomValidator>,
    pub health: Option<Arc<HealthState>>,
}

/// Reason and code of a request the webhook could not interpret
const INVALID_REQUEST_REASON: &str = "InvalidRequest";
const INVALID_REQUEST_CODE: u16 = 400;

/// Create a denial response carrying reason and code.
/// kube-rs deny() only sets status.message, so the status is filled in here
/// and the message keeps the "[reason] message" form.
fn deny_with_reason(
    request: &AdmissionRequest<DynamicObject>,
    message: &str,
    reason: &str,
    code: u16,
) -> AdmissionResponse {
    let full_message = format!("[{}] {}", reason, message);
    let mut response = AdmissionResponse::from(request).deny(full_message);
    response.result.reason = reason.to_string();
    response.result.code = code;
    response
}

/// Handle one AdmissionReview for a registered validator
pub async fn validate_handler(
    State(state): State<Arc<ValidatorState>>,
    Json(review): Json<AdmissionReview<DynamicObject>>,
) -> impl IntoResponse {
    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to extract admission request");
            return (
                StatusCode::BAD_REQUEST,
                Json(
                    AdmissionResponse::invalid(format!("Invalid AdmissionReview: {}", e))
                        .into_review(),
                ),
            );
        }
    };

    let started = Instant::now();
    let response = admit(state.validator.as_ref(), &request);

    if let Some(health) = &state.health {
        health.metrics.record_admission(
            &state.kind,
            operation_name(&request.operation),
            response.allowed,
            started.elapsed().as_secs_f64(),
        );
    }

    (StatusCode::OK, Json(response.into_review()))
}

/// Run a validator against a decoded admission request.
///
/// Every outcome is an admission response; validator errors become denials.
pub fn admit(
    validator: &dyn CustomValidator,
    request: &AdmissionRequest<DynamicObject>,
) -> AdmissionResponse {
    let uid = &request.uid;
    debug!(
        uid = %uid,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = %request.name,
        "Processing admission request"
    );

    let ctx = RequestContext::from(request);

    let object = match decode(request.object.clone()) {
        Ok(obj) => obj,
        Err(message) => return reject_malformed(request, &message),
    };
    let old_object = match decode(request.old_object.clone()) {
        Ok(obj) => obj,
        Err(message) => return reject_malformed(request, &message),
    };

    let result = match request.operation {
        Operation::Create => match &object {
            Some(obj) => validator.validate_create(&ctx, obj),
            None => return reject_malformed(request, "Missing object in request"),
        },
        Operation::Update => match (&old_object, &object) {
            (Some(old), Some(new)) => validator.validate_update(&ctx, old, new),
            _ => return reject_malformed(request, "Missing object or oldObject in request"),
        },
        Operation::Delete => match &old_object {
            Some(obj) => validator.validate_delete(&ctx, obj),
            None => return reject_malformed(request, "Missing oldObject in request"),
        },
        Operation::Connect => {
            debug!(uid = %uid, "Admission request allowed (CONNECT)");
            return AdmissionResponse::from(request);
        }
    };

    match result {
        Ok(()) => {
            info!(uid = %uid, operation = ?request.operation, "Admission request allowed");
            AdmissionResponse::from(request)
        }
        Err(e) => {
            let message = e.to_string();
            warn!(
                uid = %uid,
                operation = ?request.operation,
                reason = e.reason(),
                message = %message,
                "Admission request denied"
            );
            deny_with_reason(request, &message, e.reason(), e.code())
        }
    }
}

fn decode(obj: Option<DynamicObject>) -> Result<Option<AdmissionObject>, String> {
    obj.map(AdmissionObject::from_dynamic)
        .transpose()
        .map_err(|e| format!("Failed to decode object: {}", e))
}

fn reject_malformed(request: &AdmissionRequest<DynamicObject>, message: &str) -> AdmissionResponse {
    error!(uid = %request.uid, message = %message, "Malformed admission request");
    deny_with_reason(request, message, INVALID_REQUEST_REASON, INVALID_REQUEST_CODE)
}

/// Run the webhook server with TLS
///
/// Binds to 0.0.0.0 on the configured webhook port and serves every route
/// of `router`. TLS certificates are loaded from the configured paths.
pub async fn run_webhook_server(
    router: Router,
    config: &Config,
    health: Option<Arc<HealthState>>,
) -> Result<(), WebhookError> {
    let tls = RustlsConfig::from_pem_file(
        PathBuf::from(&config.cert_path),
        PathBuf::from(&config.key_path),
    )
    .await
    .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.webhook_port));
    info!(port = config.webhook_port, "Starting webhook server with TLS");

    let handle = Handle::new();
    if let Some(health) = health {
        tokio::spawn(mark_ready_when_listening(handle.clone(), health));
    }

    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .map_err(|e| WebhookError::Server(e.to_string()))?;

    Ok(())
}

/// Error for a finished webhook server task.
///
/// The server only returns when it failed or stopped, and both end the process.
pub fn webhook_exit_error(
    result: Result<Result<(), WebhookError>, tokio::task::JoinError>,
) -> WebhookError {
    match result {
        Ok(Ok(())) => WebhookError::Server("webhook server stopped unexpectedly".to_string()),
        Ok(Err(e)) => e,
        Err(e) => WebhookError::Server(format!("webhook server task failed: {}", e)),
    }
}

/// Flip readiness once the listener behind `handle` is bound.
///
/// Readiness stays false if binding fails.
async fn mark_ready_when_listening(handle: Handle, health: Arc<HealthState>) {
    match handle.listening().await {
        Some(addr) => {
            info!(%addr, "Webhook server listening with TLS");
            health.set_ready(true).await;
        }
        None => warn!("Webhook listener failed to bind, staying not ready"),
    }
}
