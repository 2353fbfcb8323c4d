//! Test fixtures and builder patterns for MachineSet.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use machineset_webhook::crd::{MachineSet, MachineSetSpec, MachineSetStatus};
use machineset_webhook::webhooks::{Operation, RequestContext, RequestMetadata};
use serde_json::{Value, json};

/// Builder for creating MachineSet test fixtures.
///
/// # Example
/// ```
/// let ms = MachineSetBuilder::new("workers")
///     .namespace("openshift-machine-api")
///     .replicas(3)
///     .instance_type("m6i.xlarge")
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct MachineSetBuilder {
    name: String,
    namespace: Option<String>,
    replicas: Option<i32>,
    instance_type: String,
    labels: BTreeMap<String, String>,
    annotations: BTreeMap<String, String>,
    status_replicas: Option<i32>,
}

impl MachineSetBuilder {
    /// Create a new builder with the given MachineSet name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            replicas: Some(1),
            instance_type: "m6i.xlarge".to_string(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            status_replicas: None,
        }
    }

    /// Set the namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the desired replica count.
    pub fn replicas(mut self, replicas: i32) -> Self {
        self.replicas = Some(replicas);
        self
    }

    /// Set the provider instance type in the machine template.
    pub fn instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = instance_type.into();
        self
    }

    /// Add a label to the MachineSet.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Add an annotation to the MachineSet.
    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Set the observed replica count in status.
    pub fn status_replicas(mut self, replicas: i32) -> Self {
        self.status_replicas = Some(replicas);
        self
    }

    /// Build the MachineSet.
    pub fn build(self) -> MachineSet {
        let selector_labels = BTreeMap::from([(
            "machine.openshift.io/cluster-api-machineset".to_string(),
            self.name.clone(),
        )]);

        let mut spec = MachineSetSpec {
            replicas: self.replicas,
            selector: LabelSelector {
                match_labels: Some(selector_labels.clone()),
                ..Default::default()
            },
            ..Default::default()
        };
        spec.template.metadata.labels = Some(selector_labels);
        spec.template.spec.provider_spec.value =
            Some(json!({ "instanceType": self.instance_type }));

        MachineSet {
            metadata: ObjectMeta {
                name: Some(self.name),
                namespace: self.namespace,
                labels: if self.labels.is_empty() {
                    None
                } else {
                    Some(self.labels)
                },
                annotations: if self.annotations.is_empty() {
                    None
                } else {
                    Some(self.annotations)
                },
                ..Default::default()
            },
            spec,
            status: self.status_replicas.map(|replicas| MachineSetStatus {
                replicas,
                ..Default::default()
            }),
        }
    }
}

impl Default for MachineSetBuilder {
    fn default() -> Self {
        Self::new("workers")
    }
}

/// Invocation context for an UPDATE request.
pub fn update_context(dry_run: bool) -> RequestContext {
    RequestContext::with_request(RequestMetadata::new(Operation::Update).dry_run(dry_run))
}

/// An AdmissionReview document as the API server would send it.
pub fn admission_review(
    operation: &str,
    object: Option<Value>,
    old_object: Option<Value>,
    dry_run: bool,
) -> Value {
    let mut request = json!({
        "uid": "0d3b6a1e-7f5c-4c5e-9b43-2f1e3c0a9d11",
        "kind": {"group": "machine.openshift.io", "version": "v1beta1", "kind": "MachineSet"},
        "resource": {"group": "machine.openshift.io", "version": "v1beta1", "resource": "machinesets"},
        "name": "workers",
        "namespace": "openshift-machine-api",
        "operation": operation,
        "userInfo": {"username": "system:admin", "groups": ["system:masters"]},
        "dryRun": dry_run
    });
    if let (Some(obj), Some(map)) = (object, request.as_object_mut()) {
        map.insert("object".to_string(), obj);
    }
    if let (Some(obj), Some(map)) = (old_object, request.as_object_mut()) {
        map.insert("oldObject".to_string(), obj);
    }
    json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": request
    })
}

/// Serialize a MachineSet the way it appears inside an AdmissionReview.
pub fn to_payload(ms: &MachineSet) -> Value {
    serde_json::to_value(ms).unwrap_or(Value::Null)
}
