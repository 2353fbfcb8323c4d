//! MachineSet resource definition.
//!
//! Mirrors the `machine.openshift.io/v1beta1` MachineSet API closely enough
//! to decode admission payloads and compare them structurally. Every type
//! derives `PartialEq`, which is the equality the immutability webhook uses.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Taint;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, OwnerReference};
use kube::CustomResource;
use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use serde::{Deserialize, Serialize};

/// MachineSet ensures that a specified number of machines replicas are
/// running at any given time.
///
/// Example:
/// ```yaml
/// apiVersion: machine.openshift.io/v1beta1
/// kind: MachineSet
/// metadata:
///   name: worker-us-east-1a
///   namespace: openshift-machine-api
/// spec:
///   replicas: 3
///   selector:
///     matchLabels:
///       machine.openshift.io/cluster-api-machineset: worker-us-east-1a
///   template:
///     metadata:
///       labels:
///         machine.openshift.io/cluster-api-machineset: worker-us-east-1a
///     spec:
///       providerSpec:
///         value:
///           instanceType: m6i.xlarge
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "machine.openshift.io",
    version = "v1beta1",
    kind = "MachineSet",
    plural = "machinesets",
    status = "MachineSetStatus",
    namespaced,
    derive = "PartialEq",
    printcolumn = r#"{"name":"Desired", "type":"integer", "jsonPath":".spec.replicas"}"#,
    printcolumn = r#"{"name":"Current", "type":"integer", "jsonPath":".status.replicas"}"#,
    printcolumn = r#"{"name":"Ready", "type":"integer", "jsonPath":".status.readyReplicas"}"#,
    printcolumn = r#"{"name":"Available", "type":"integer", "jsonPath":".status.availableReplicas"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MachineSetSpec {
    /// Number of desired replicas. Defaults to 1 when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Minimum number of seconds a new machine should be ready before it is
    /// considered available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_ready_seconds: Option<i32>,

    /// Policy used to choose machines on scale down: Random, Newest or Oldest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_policy: Option<String>,

    /// Label query over machines that should match the replica count.
    #[serde(default)]
    pub selector: LabelSelector,

    /// Object that describes the machine created when not enough replicas
    /// are observed.
    #[serde(default)]
    pub template: MachineTemplateSpec,

    /// Which API is authoritative for the machines (MachineAPI or ClusterAPI).
    #[serde(rename = "authoritativeAPI", skip_serializing_if = "Option::is_none")]
    pub authoritative_api: Option<String>,
}

/// Template used to stamp out machines.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineTemplateSpec {
    /// Metadata applied to every machine created from this template.
    #[serde(default)]
    pub metadata: TemplateObjectMeta,

    /// Specification of the desired machine.
    #[serde(default)]
    pub spec: MachineSpec,
}

/// Subset of ObjectMeta carried by machine templates.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateObjectMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_references: Option<Vec<OwnerReference>>,
}

/// Desired state of a single machine.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    /// Metadata propagated to the node backing this machine.
    #[serde(default)]
    pub metadata: TemplateObjectMeta,

    /// Hooks that pause machine lifecycle operations.
    #[serde(default)]
    pub lifecycle_hooks: LifecycleHooks,

    /// Taints registered on the node once it joins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taints: Option<Vec<Taint>>,

    /// Provider-specific configuration.
    #[serde(default)]
    pub provider_spec: ProviderSpec,

    /// Identifier assigned by the infrastructure provider.
    #[serde(rename = "providerID", skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    /// Which API is authoritative for this machine.
    #[serde(rename = "authoritativeAPI", skip_serializing_if = "Option::is_none")]
    pub authoritative_api: Option<String>,
}

/// Lifecycle hooks for a machine.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleHooks {
    /// Hooks blocking node drain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_drain: Option<Vec<LifecycleHook>>,

    /// Hooks blocking instance termination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_terminate: Option<Vec<LifecycleHook>>,
}

/// A named hook owned by some controller.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct LifecycleHook {
    pub name: String,
    pub owner: String,
}

/// Opaque provider configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct ProviderSpec {
    /// Inline provider configuration, stored as an arbitrary document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub value: Option<serde_json::Value>,
}

/// Observed state of a MachineSet.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineSetStatus {
    /// Most recently observed number of replicas.
    #[serde(default)]
    pub replicas: i32,

    /// Number of replicas with labels matching the template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fully_labeled_replicas: Option<i32>,

    /// Number of ready replicas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_replicas: Option<i32>,

    /// Number of available replicas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_replicas: Option<i32>,

    /// Generation observed by the controller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Terminal problem reconciling the MachineSet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,

    /// Human readable description of the terminal problem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Current service state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

/// Condition describes the state of a MachineSet at a certain point.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition.
    pub r#type: String,
    /// Status of the condition ("True", "False", "Unknown").
    pub status: String,
    /// Severity when status is False: Error, Warning or Info.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Last time the condition transitioned from one status to another.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn preserve_unknown_fields(_: &mut SchemaGenerator) -> Schema {
    let mut schema = SchemaObject {
        instance_type: Some(InstanceType::Object.into()),
        ..Default::default()
    };
    schema.extensions.insert(
        "x-kubernetes-preserve-unknown-fields".to_string(),
        serde_json::Value::Bool(true),
    );
    Schema::Object(schema)
}
