//! Webhook registration.
//!
//! Validators are registered against a resource kind through
//! [`WebhookManager::webhook_managed_by`]. Each registration mounts one POST
//! route on the manager's router and records what the hosting cluster needs
//! to know to call it.
//!
//! ```ignore
//! let mut mgr = WebhookManager::new();
//! mgr.webhook_managed_by()
//!     .for_resource::<MachineSet>()
//!     .with_validator(MachineSetWebhook::new())
//!     .complete()?;
//! ```

use std::sync::Arc;

use axum::{Router, routing::post};
use k8s_openapi::api::admissionregistration::v1::{
    RuleWithOperations, ServiceReference, ValidatingWebhook, WebhookClientConfig,
};
use kube::Resource;
use kube::core::admission::Operation;
use tracing::info;

use crate::error::WebhookError;
use crate::health::HealthState;
use crate::webhooks::server::{ValidatorState, validate_handler};
use crate::webhooks::validator::CustomValidator;

/// A validator registered for one resource kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
    /// Route the admission review is POSTed to
    pub path: String,
    /// Operations the validator wants to see
    pub operations: Vec<Operation>,
}

impl Registration {
    fn for_resource<K: Resource<DynamicType = ()>>() -> Self {
        let group = K::group(&()).to_string();
        let version = K::version(&()).to_string();
        let kind = K::kind(&()).to_string();
        Self {
            path: validation_path(&group, &version, &kind),
            plural: K::plural(&()).to_string(),
            group,
            version,
            kind,
            operations: vec![Operation::Create, Operation::Update, Operation::Delete],
        }
    }

    /// Webhook name, e.g. `vmachineset.machine.openshift.io`
    pub fn webhook_name(&self) -> String {
        format!("v{}.{}", self.kind.to_lowercase(), self.group)
    }

    /// Render the entry for a ValidatingWebhookConfiguration that routes
    /// this registration to the given in-cluster service.
    pub fn validating_webhook(
        &self,
        service_name: &str,
        service_namespace: &str,
        port: u16,
    ) -> ValidatingWebhook {
        ValidatingWebhook {
            name: self.webhook_name(),
            admission_review_versions: vec!["v1".to_string()],
            client_config: WebhookClientConfig {
                service: Some(ServiceReference {
                    name: service_name.to_string(),
                    namespace: service_namespace.to_string(),
                    path: Some(self.path.clone()),
                    port: Some(i32::from(port)),
                }),
                ..Default::default()
            },
            rules: Some(vec![RuleWithOperations {
                api_groups: Some(vec![self.group.clone()]),
                api_versions: Some(vec![self.version.clone()]),
                operations: Some(
                    self.operations
                        .iter()
                        .map(|op| operation_name(op).to_string())
                        .collect(),
                ),
                resources: Some(vec![self.plural.clone()]),
                ..Default::default()
            }]),
            failure_policy: Some("Fail".to_string()),
            side_effects: "None".to_string(),
            ..Default::default()
        }
    }
}

/// Route for validating a kind: `/validate-<group>-<version>-<kind>` with
/// dots in the group replaced by dashes and the kind lowercased.
pub fn validation_path(group: &str, version: &str, kind: &str) -> String {
    format!(
        "/validate-{}-{}-{}",
        group.replace('.', "-"),
        version,
        kind.to_lowercase()
    )
}

pub(crate) fn operation_name(op: &Operation) -> &'static str {
    match op {
        Operation::Create => "CREATE",
        Operation::Update => "UPDATE",
        Operation::Delete => "DELETE",
        Operation::Connect => "CONNECT",
    }
}

/// Collects validator registrations and serves them from one router
pub struct WebhookManager {
    router: Router,
    registrations: Vec<Registration>,
    health: Option<Arc<HealthState>>,
}

impl Default for WebhookManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookManager {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            registrations: Vec::new(),
            health: None,
        }
    }

    /// Record admission metrics into the given health state
    pub fn with_health(mut self, health: Arc<HealthState>) -> Self {
        self.health = Some(health);
        self
    }

    /// Start registering a validator
    pub fn webhook_managed_by(&mut self) -> WebhookBuilder<'_> {
        WebhookBuilder {
            mgr: self,
            registration: None,
            validator: None,
        }
    }

    /// Everything registered so far
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Router serving every registered validator
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    fn register(
        &mut self,
        registration: Registration,
        validator: Arc<dyn CustomValidator>,
    ) -> Result<(), WebhookError> {
        if self.registrations.iter().any(|r| r.path == registration.path) {
            return Err(WebhookError::Registration(format!(
                "a validator is already registered at {}",
                registration.path
            )));
        }

        let state = Arc::new(ValidatorState {
            kind: registration.kind.clone(),
            validator,
            health: self.health.clone(),
        });
        let route = Router::new()
            .route(&registration.path, post(validate_handler))
            .with_state(state);
        self.router = std::mem::replace(&mut self.router, Router::new()).merge(route);

        info!(
            kind = %registration.kind,
            path = %registration.path,
            "Registered validating webhook"
        );
        self.registrations.push(registration);
        Ok(())
    }
}

/// Builder returned by [`WebhookManager::webhook_managed_by`]
pub struct WebhookBuilder<'a> {
    mgr: &'a mut WebhookManager,
    registration: Option<Registration>,
    validator: Option<Arc<dyn CustomValidator>>,
}

impl WebhookBuilder<'_> {
    /// Resource kind the validator handles
    pub fn for_resource<K: Resource<DynamicType = ()>>(mut self) -> Self {
        self.registration = Some(Registration::for_resource::<K>());
        self
    }

    /// Validator invoked for create, update and delete
    pub fn with_validator<V: CustomValidator + 'static>(mut self, validator: V) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Mount the validator on the manager
    pub fn complete(self) -> Result<(), WebhookError> {
        let registration = self.registration.ok_or_else(|| {
            WebhookError::Registration("no resource kind given to register for".to_string())
        })?;
        let validator = self.validator.ok_or_else(|| {
            WebhookError::Registration(format!("no validator given for {}", registration.kind))
        })?;
        self.mgr.register(registration, validator)
    }
}
