// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Event Guard
//!
//! Per-kind precondition checks run before an event is appended. All
//! functions are pure: they take the relevant projection context as
//! plain data and return a detailed result, so they are trivially
//! testable without a store.
//!
//! # Rule Categories
//!
//! 1. **Structural**: required fields present (business timestamps for
//!    the metric-bearing kinds)
//! 2. **Ownership**: Allocate/Deallocate/Receive against the current
//!    owner set
//! 3. **Composition**: Add/Remove against the current parent relation
//!
//! Failures are user-correctable and never appended; a multi-component
//! event fails as a whole on the first violating component.

use chrono::{DateTime, Utc};

use crate::domain::{AgentUserId, DeviceId};
use crate::events::EventKind;

/// Validation result for guard checks
pub type GuardResult = Result<(), PreconditionError>;

/// Guard rule violation
///
/// Each variant names the specific rule that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    /// Allocate of an owner already in the owner set
    #[error("owner '{owner}' is already allocated to device {device}")]
    AlreadyAllocated { device: DeviceId, owner: String },

    /// Deallocate of an owner not in the owner set
    #[error("owner '{owner}' is not allocated to device {device}")]
    NotAllocated { device: DeviceId, owner: String },

    /// Receive by a user outside the owner set
    #[error("receiver '{user}' is not allocated to device {device}")]
    ReceiverNotOwner { device: DeviceId, user: String },

    /// Add of a component already attached somewhere
    #[error("device {component} already has a parent ({parent})")]
    AlreadyAttached {
        component: DeviceId,
        parent: DeviceId,
    },

    /// Remove of a component not attached to the target
    #[error("device {component} is not a component of {device}")]
    NotAComponent { device: DeviceId, component: DeviceId },
}

/// Malformed input, rejected before any rule is evaluated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Hardware id does not match the required shape
    #[error(transparent)]
    HardwareId(#[from] crate::domain::HardwareIdError),

    /// Device URL is not an http(s) URL
    #[error("device url must be an http(s) URL: '{0}'")]
    InvalidUrl(String),

    /// Metric-bearing event without a business timestamp
    #[error("{kind} event requires a business timestamp")]
    MissingTimestamp { kind: EventKind },

    /// Agent name already registered
    #[error("agent name '{0}' is already taken")]
    DuplicateAgentName(String),
}

/// Validate an Allocate against the current owner set
///
/// # Rules
/// - The proposed owner must not already be in `owners(device)`
pub fn validate_allocate(
    device: DeviceId,
    owner: AgentUserId,
    owner_url: &str,
    current_owners: &[AgentUserId],
) -> GuardResult {
    if current_owners.contains(&owner) {
        return Err(PreconditionError::AlreadyAllocated {
            device,
            owner: owner_url.to_string(),
        });
    }
    Ok(())
}

/// Validate a Deallocate against the current owner set
///
/// # Rules
/// - The proposed owner must be in `owners(device)`
pub fn validate_deallocate(
    device: DeviceId,
    owner: Option<AgentUserId>,
    owner_url: &str,
    current_owners: &[AgentUserId],
) -> Result<AgentUserId, PreconditionError> {
    match owner {
        Some(id) if current_owners.contains(&id) => Ok(id),
        _ => Err(PreconditionError::NotAllocated {
            device,
            owner: owner_url.to_string(),
        }),
    }
}

/// Validate a Receive against the current owner set
///
/// # Rules
/// - The acting user (the receiver) must currently own the device
pub fn validate_receive(
    device: DeviceId,
    by_user: &str,
    current_owner_urls: &[String],
) -> GuardResult {
    if !current_owner_urls.iter().any(|u| u == by_user) {
        return Err(PreconditionError::ReceiverNotOwner {
            device,
            user: by_user.to_string(),
        });
    }
    Ok(())
}

/// Validate attaching a component
///
/// # Rules
/// - The component must not currently have a parent
pub fn validate_attach(
    component: DeviceId,
    current_parent: Option<DeviceId>,
) -> GuardResult {
    if let Some(parent) = current_parent {
        return Err(PreconditionError::AlreadyAttached { component, parent });
    }
    Ok(())
}

/// Validate detaching a component
///
/// # Rules
/// - The component's current parent must be the target device
pub fn validate_detach(
    device: DeviceId,
    component: DeviceId,
    current_parent: Option<DeviceId>,
) -> GuardResult {
    if current_parent != Some(device) {
        return Err(PreconditionError::NotAComponent { device, component });
    }
    Ok(())
}

/// Validate presence of the business timestamp where a metric consumes it
///
/// UsageProof/StopUsage feed the running-time accounting and Recycle
/// feeds durability, so these kinds must carry `occurred_at`.
pub fn validate_business_timestamp(
    kind: EventKind,
    occurred_at: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    let required = matches!(
        kind,
        EventKind::UsageProof | EventKind::StopUsage | EventKind::Recycle
    );
    if required && occurred_at.is_none() {
        return Err(ValidationError::MissingTimestamp { kind });
    }
    Ok(())
}
