//! Objects delivered to validators.
//!
//! The server decodes admission payloads generically. Before a validator
//! sees them they are sorted into [`AdmissionObject`]: either one of the
//! kinds this crate knows, or an opaque `Other` arm that keeps the payload
//! around so the observed type can be reported.

use kube::Resource;
use kube::core::DynamicObject;

use crate::crd::MachineSet;
use crate::error::AdmissionError;

/// Closed set of objects a validator may receive
#[derive(Clone, Debug)]
pub enum AdmissionObject {
    /// A decoded MachineSet
    MachineSet(Box<MachineSet>),
    /// Any other kind, left undecoded
    Other(DynamicObject),
}

impl AdmissionObject {
    /// Sort a generically decoded object by its apiVersion and kind.
    ///
    /// Fails only when the object claims to be a known kind but its body
    /// does not decode as that kind.
    pub fn from_dynamic(obj: DynamicObject) -> Result<Self, serde_json::Error> {
        let is_machine_set = obj.types.as_ref().is_some_and(|t| {
            t.api_version == MachineSet::api_version(&()) && t.kind == MachineSet::kind(&())
        });

        if is_machine_set {
            let value = serde_json::to_value(&obj)?;
            let machine_set: MachineSet = serde_json::from_value(value)?;
            return Ok(AdmissionObject::MachineSet(Box::new(machine_set)));
        }

        Ok(AdmissionObject::Other(obj))
    }

    /// Observed type, rendered the way Kubernetes prints a GroupVersionKind
    pub fn type_name(&self) -> String {
        match self {
            AdmissionObject::MachineSet(_) => gvk_string(
                &MachineSet::api_version(&()),
                &MachineSet::kind(&()),
            ),
            AdmissionObject::Other(obj) => match &obj.types {
                Some(types) => gvk_string(&types.api_version, &types.kind),
                None => "<unknown>".to_string(),
            },
        }
    }

    /// Narrow to a MachineSet, failing with `TypeMismatch` otherwise
    pub fn as_machine_set(&self) -> Result<&MachineSet, AdmissionError> {
        match self {
            AdmissionObject::MachineSet(ms) => Ok(ms.as_ref()),
            AdmissionObject::Other(_) => Err(AdmissionError::TypeMismatch {
                expected: "MachineSet",
                actual: self.type_name(),
            }),
        }
    }
}

impl From<MachineSet> for AdmissionObject {
    fn from(ms: MachineSet) -> Self {
        AdmissionObject::MachineSet(Box::new(ms))
    }
}

impl From<DynamicObject> for AdmissionObject {
    fn from(obj: DynamicObject) -> Self {
        AdmissionObject::Other(obj)
    }
}

fn gvk_string(api_version: &str, kind: &str) -> String {
    format!("{}, Kind={}", api_version, kind)
}
