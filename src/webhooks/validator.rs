//! Validator capability implemented by every admission webhook in this crate.

use crate::error::Result;
use crate::webhooks::context::RequestContext;
use crate::webhooks::object::AdmissionObject;

/// Validation hooks invoked once per admission request.
///
/// Implementations must be stateless across calls: the server shares one
/// instance between all in-flight requests.
pub trait CustomValidator: Send + Sync {
    /// Validate an object on CREATE
    fn validate_create(&self, ctx: &RequestContext, obj: &AdmissionObject) -> Result<()>;

    /// Validate a transition from `old` to `new` on UPDATE
    fn validate_update(
        &self,
        ctx: &RequestContext,
        old: &AdmissionObject,
        new: &AdmissionObject,
    ) -> Result<()>;

    /// Validate an object on DELETE
    fn validate_delete(&self, ctx: &RequestContext, obj: &AdmissionObject) -> Result<()>;
}
