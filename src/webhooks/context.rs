//! Invocation context handed to validators.
//!
//! The server attaches the metadata of the in-flight admission request to a
//! [`RequestContext`]; validators read it back with [`request_from_context`].
//! A context built without a request (e.g. when a validator is driven
//! directly) yields [`ContextError::RequestNotFound`].

use k8s_openapi::api::authentication::v1::UserInfo;
use kube::Resource;
use kube::core::admission::{AdmissionRequest, Operation};
use thiserror::Error;

/// Failure to resolve the admission request from a context
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("admission request not found in context")]
    RequestNotFound,
}

/// Metadata about the in-flight admission request
#[derive(Clone, Debug, PartialEq)]
pub struct RequestMetadata {
    /// Request UID, echoed back in the response
    pub uid: String,
    /// Operation being admitted
    pub operation: Operation,
    /// Whether the request will not be persisted
    pub dry_run: bool,
    /// Subresource targeted by the request, if any
    pub sub_resource: Option<String>,
    /// Identity of the requesting user
    pub user_info: UserInfo,
    /// Namespace of the object
    pub namespace: Option<String>,
    /// Name of the object (may be empty on CREATE with generateName)
    pub name: String,
}

impl RequestMetadata {
    /// Create metadata for an operation with every other field empty
    pub fn new(operation: Operation) -> Self {
        Self {
            uid: String::new(),
            operation,
            dry_run: false,
            sub_resource: None,
            user_info: UserInfo::default(),
            namespace: None,
            name: String::new(),
        }
    }

    /// Mark the request as a dry-run
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl<T: Resource> From<&AdmissionRequest<T>> for RequestMetadata {
    fn from(request: &AdmissionRequest<T>) -> Self {
        Self {
            uid: request.uid.clone(),
            operation: request.operation.clone(),
            dry_run: request.dry_run,
            sub_resource: request.sub_resource.clone(),
            user_info: request.user_info.clone(),
            namespace: request.namespace.clone(),
            name: request.name.clone(),
        }
    }
}

/// Context passed to every validator invocation
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    request: Option<RequestMetadata>,
}

impl RequestContext {
    /// A context carrying no admission request
    pub fn background() -> Self {
        Self::default()
    }

    /// A context carrying the given admission request
    pub fn with_request(request: RequestMetadata) -> Self {
        Self {
            request: Some(request),
        }
    }

    /// Resolve the admission request attached to this context
    pub fn admission_request(&self) -> Result<&RequestMetadata, ContextError> {
        self.request.as_ref().ok_or(ContextError::RequestNotFound)
    }
}

impl<T: Resource> From<&AdmissionRequest<T>> for RequestContext {
    fn from(request: &AdmissionRequest<T>) -> Self {
        Self::with_request(RequestMetadata::from(request))
    }
}

/// Resolve the admission request carried by `ctx`
pub fn request_from_context(ctx: &RequestContext) -> Result<&RequestMetadata, ContextError> {
    ctx.admission_request()
}
