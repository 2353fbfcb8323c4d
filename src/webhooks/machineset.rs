//! Immutability webhook for MachineSets.
//!
//! Once created, a MachineSet may not change. The only exception is a
//! request the bypass policy exempts, by default a topology dry-run.

use tracing::debug;

use crate::crd::MachineSet;
use crate::error::{AdmissionError, Result, WebhookError};
use crate::webhooks::context::{RequestContext, request_from_context};
use crate::webhooks::object::AdmissionObject;
use crate::webhooks::registration::WebhookManager;
use crate::webhooks::topology::{BypassPolicy, TopologyDryRun};
use crate::webhooks::validator::CustomValidator;

const KIND: &str = "MachineSet";

/// Rejects any update to a MachineSet unless the bypass policy applies
#[derive(Clone, Debug, Default)]
pub struct MachineSetWebhook<P = TopologyDryRun> {
    bypass: P,
}

impl MachineSetWebhook {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: BypassPolicy + 'static> MachineSetWebhook<P> {
    /// Use a custom bypass policy instead of the topology dry-run check
    pub fn with_bypass(bypass: P) -> Self {
        Self { bypass }
    }

    /// Register this webhook for MachineSet create, update and delete
    pub fn setup_webhook_with_manager(
        self,
        mgr: &mut WebhookManager,
    ) -> std::result::Result<(), WebhookError> {
        mgr.webhook_managed_by()
            .for_resource::<MachineSet>()
            .with_validator(self)
            .complete()
    }
}

impl<P: BypassPolicy> CustomValidator for MachineSetWebhook<P> {
    fn validate_create(&self, _ctx: &RequestContext, _obj: &AdmissionObject) -> Result<()> {
        Ok(())
    }

    fn validate_update(
        &self,
        ctx: &RequestContext,
        old: &AdmissionObject,
        new: &AdmissionObject,
    ) -> Result<()> {
        let old = old.as_machine_set()?;
        let new = new.as_machine_set()?;
        let request = request_from_context(ctx)?;

        if self.bypass.should_skip(request, new) {
            debug!(uid = %request.uid, "Skipping MachineSet immutability check");
            return Ok(());
        }

        if old != new {
            return Err(AdmissionError::ImmutableFieldChanged { kind: KIND });
        }

        Ok(())
    }

    fn validate_delete(&self, _ctx: &RequestContext, _obj: &AdmissionObject) -> Result<()> {
        Ok(())
    }
}
