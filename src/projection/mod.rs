// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Projection Engine
//!
//! Every derived view of a device — composition, custody, ownership,
//! usage metrics — is a pure fold over an explicitly fetched, ordered
//! event sequence. No cached or mutable derived field exists anywhere:
//! callers fetch a sequence from the store once and fold it, which makes
//! cost visible and replay trivial.
//!
//! ```text
//! events_for(device)        ──fold──▶ components / holder / owners /
//!                                      running_time / durability
//! events_related_to(device) ──fold──▶ parent
//! ```
//!
//! All folds order by the store-assigned sequence number. Business
//! timestamps only enter the two metrics (`running_time`, `durability`),
//! which consume them as data, not as ordering.

use crate::domain::DeviceId;

pub mod device;
pub mod views;

pub use device::{
    components, durability, holder, owners, parent, running_time, running_time_at,
};
pub use views::{
    ComponentsView, DeviceView, DurabilityView, HolderView, MetricsView, OwnersView,
    ParentView, RunningTimeView,
};

/// A projection the device's history cannot answer yet
///
/// Distinct from a crash: callers handle these as "operation not yet
/// meaningful" for the device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainInvariantError {
    /// Durability asked for a device with no Recycle event
    #[error("device {0} has not been recycled yet")]
    NotRecycled(DeviceId),

    /// Durability asked for a device with neither a manufacture date nor
    /// a Register event
    #[error("device {0} has no manufacture date and no register history")]
    ProductionYearUnknown(DeviceId),

    /// Holder asked for a device that was only ever registered as a
    /// component. Inheriting custody from the parent device is a known
    /// gap, deliberately unimplemented pending a product decision.
    #[error(
        "device {0} has no register or migrate history; \
         holder inheritance from the parent device is not implemented"
    )]
    HolderNotDerivable(DeviceId),
}
