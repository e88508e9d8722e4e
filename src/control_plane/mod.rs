//! # Control-Plane Client
//!
//! Capability the execution unit uses to authenticate, enumerate instances,
//! request a power transition, and observe a single instance. The unit only
//! sees the [`ControlPlane`] trait; [`OpenStackClient`] is the production
//! implementation (Keystone v3 + Nova).

pub mod errors;
pub mod openstack;

pub use errors::{ControlPlaneError, ControlPlaneResult};
pub use openstack::OpenStackClient;

use crate::models::{InstanceObservation, TargetState};
use async_trait::async_trait;
use std::fmt;

/// Opaque credential issued by [`ControlPlane::authenticate`]
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Stateless control-plane capability, safe to share across execution units
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Obtain a credential for the calls below
    async fn authenticate(&self) -> ControlPlaneResult<AuthToken>;

    /// Every instance visible to the credential
    async fn list_instances(&self, token: &AuthToken)
        -> ControlPlaneResult<Vec<InstanceObservation>>;

    /// Fresh observation of one instance
    async fn get_instance(
        &self,
        token: &AuthToken,
        instance_id: &str,
    ) -> ControlPlaneResult<InstanceObservation>;

    /// Ask the control plane to move the instance toward `target`.
    /// Returns once the request is accepted, not once it is observable.
    async fn request_transition(
        &self,
        token: &AuthToken,
        instance_id: &str,
        target: TargetState,
    ) -> ControlPlaneResult<()>;
}
