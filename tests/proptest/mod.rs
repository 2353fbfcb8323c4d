// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for machineset-webhook.
//!
//! Uses proptest to generate random MachineSets and request contexts and
//! verify the immutability rules hold for all of them.

#[path = "../common/mod.rs"]
mod common;

use proptest::prelude::*;

use common::fixtures::{MachineSetBuilder, update_context};
use machineset_webhook::AdmissionError;
use machineset_webhook::crd::MachineSet;
use machineset_webhook::webhooks::{
    AdmissionObject, CustomValidator, MachineSetWebhook, RequestContext, RequestMetadata,
};

/// Strategy for generating MachineSets with varied spec, labels and status.
fn any_machine_set() -> impl Strategy<Value = MachineSet> {
    (
        0..=20i32,
        "[a-z0-9]{1,8}\\.[a-z0-9]{1,8}",
        prop::option::of(("[a-z]{1,6}", "[a-z0-9]{0,6}")),
        prop::option::of(0..=20i32),
    )
        .prop_map(|(replicas, instance_type, label, status_replicas)| {
            let mut builder = MachineSetBuilder::new("workers")
                .namespace("openshift-machine-api")
                .replicas(replicas)
                .instance_type(instance_type);
            if let Some((key, value)) = label {
                builder = builder.label(key, value);
            }
            if let Some(replicas) = status_replicas {
                builder = builder.status_replicas(replicas);
            }
            builder.build()
        })
}

/// Validator whose bypass predicate always answers `bypass`.
fn webhook(
    bypass: bool,
) -> MachineSetWebhook<impl Fn(&RequestMetadata, &MachineSet) -> bool + Send + Sync + 'static> {
    MachineSetWebhook::with_bypass(move |_: &RequestMetadata, _: &MachineSet| bypass)
}

proptest! {
    /// Property: CREATE is always allowed.
    #[test]
    fn test_create_always_allowed(ms in any_machine_set(), dry_run in any::<bool>()) {
        let obj = AdmissionObject::from(ms);
        prop_assert!(MachineSetWebhook::new().validate_create(&update_context(dry_run), &obj).is_ok());
        prop_assert!(MachineSetWebhook::new().validate_create(&RequestContext::background(), &obj).is_ok());
    }

    /// Property: DELETE is always allowed.
    #[test]
    fn test_delete_always_allowed(ms in any_machine_set(), dry_run in any::<bool>()) {
        let obj = AdmissionObject::from(ms);
        prop_assert!(MachineSetWebhook::new().validate_delete(&update_context(dry_run), &obj).is_ok());
    }

    /// Property: equal objects pass regardless of the bypass decision.
    #[test]
    fn test_equal_objects_pass(ms in any_machine_set(), bypass in any::<bool>(), dry_run in any::<bool>()) {
        let old = AdmissionObject::from(ms.clone());
        let new = AdmissionObject::from(ms);
        prop_assert!(webhook(bypass).validate_update(&update_context(dry_run), &old, &new).is_ok());
    }

    /// Property: differing objects pass when the bypass applies.
    #[test]
    fn test_bypass_allows_any_change(a in any_machine_set(), b in any_machine_set()) {
        prop_assume!(a != b);
        let old = AdmissionObject::from(a);
        let new = AdmissionObject::from(b);
        prop_assert!(webhook(true).validate_update(&update_context(false), &old, &new).is_ok());
    }

    /// Property: differing objects are rejected when the bypass does not apply.
    #[test]
    fn test_change_without_bypass_rejected(a in any_machine_set(), b in any_machine_set()) {
        prop_assume!(a != b);
        let old = AdmissionObject::from(a);
        let new = AdmissionObject::from(b);
        let result = webhook(false).validate_update(&update_context(true), &old, &new);
        prop_assert_eq!(result, Err(AdmissionError::ImmutableFieldChanged { kind: "MachineSet" }));
    }

    /// Property: without an admission request every update is rejected.
    #[test]
    fn test_missing_context_rejected(a in any_machine_set(), b in any_machine_set(), bypass in any::<bool>()) {
        let old = AdmissionObject::from(a);
        let new = AdmissionObject::from(b);
        let result = webhook(bypass).validate_update(&RequestContext::background(), &old, &new);
        prop_assert!(matches!(result, Err(AdmissionError::ContextMissing(_))));
    }

    /// Property: repeated validation of the same update yields the same result.
    #[test]
    fn test_update_is_deterministic(a in any_machine_set(), b in any_machine_set()) {
        let webhook = MachineSetWebhook::new();
        let old = AdmissionObject::from(a);
        let new = AdmissionObject::from(b);
        let ctx = update_context(false);
        let first = webhook.validate_update(&ctx, &old, &new);
        for _ in 0..3 {
            prop_assert_eq!(&webhook.validate_update(&ctx, &old, &new), &first);
        }
    }

    /// Property: MachineSets survive the JSON trip through an admission payload
    /// without changing their equality.
    #[test]
    fn test_payload_decoding_preserves_equality(ms in any_machine_set()) {
        let payload = serde_json::to_value(&ms).unwrap();
        let dynamic = serde_json::from_value(payload).unwrap();
        let decoded = AdmissionObject::from_dynamic(dynamic).unwrap();
        prop_assert_eq!(decoded.as_machine_set().unwrap(), &ms);
    }
}
