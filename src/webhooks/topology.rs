//! Bypass policy for immutability checks.
//!
//! The topology controller dry-runs changes to managed objects in order to
//! compute diffs. Those requests must pass immutability validation, so they
//! are marked with [`TOPOLOGY_DRY_RUN_ANNOTATION`] and sent with `dryRun`.

use kube::ResourceExt;

use crate::crd::MachineSet;
use crate::webhooks::context::RequestMetadata;

/// Annotation set by the topology controller on objects it dry-runs.
pub const TOPOLOGY_DRY_RUN_ANNOTATION: &str = "topology.cluster.x-k8s.io/dry-run";

/// Decides whether immutability enforcement is skipped for a request
pub trait BypassPolicy: Send + Sync {
    fn should_skip(&self, request: &RequestMetadata, obj: &MachineSet) -> bool;
}

impl<F> BypassPolicy for F
where
    F: Fn(&RequestMetadata, &MachineSet) -> bool + Send + Sync,
{
    fn should_skip(&self, request: &RequestMetadata, obj: &MachineSet) -> bool {
        self(request, obj)
    }
}

/// Skip only topology dry-run requests
#[derive(Clone, Copy, Debug, Default)]
pub struct TopologyDryRun;

impl BypassPolicy for TopologyDryRun {
    fn should_skip(&self, request: &RequestMetadata, obj: &MachineSet) -> bool {
        should_skip_immutability_checks(request, obj)
    }
}

/// True when the request is a dry-run and the object carries the topology
/// dry-run annotation (its value is ignored).
pub fn should_skip_immutability_checks(request: &RequestMetadata, obj: &MachineSet) -> bool {
    if !request.dry_run {
        return false;
    }
    obj.annotations().contains_key(TOPOLOGY_DRY_RUN_ANNOTATION)
}
