// Copyright (c) 2025 - Cowboy AI, Inc.
//! Lifecycle events
//!
//! All lifecycle changes to a device are represented as immutable
//! events. Events follow event sourcing principles:
//!
//! 1. **Immutable**: once recorded, an event never changes — corrections
//!    are new compensating events, not edits
//! 2. **Ordered**: projection order is the store-assigned sequence, not
//!    the caller-supplied business timestamp
//! 3. **Typed payloads**: each event kind owns a payload variant, so the
//!    compiler checks exhaustiveness instead of a string→string map
//!
//! # Event Flow
//!
//! ```text
//! Request → Registry (resolve refs) → Guard → EventStore → Projections
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::{AgentId, AgentUserId, DeviceId};

/// Unique event identifier (UUID v7 for time ordering)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Create a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of lifecycle event
///
/// Variant names are the wire-stable strings. The enumeration is fixed
/// by the domain; new kinds are an extension point, not a redesign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Register,
    Add,
    Remove,
    Recycle,
    Collect,
    Migrate,
    Allocate,
    Deallocate,
    Receive,
    Locate,
    UsageProof,
    StopUsage,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Register => "Register",
            EventKind::Add => "Add",
            EventKind::Remove => "Remove",
            EventKind::Recycle => "Recycle",
            EventKind::Collect => "Collect",
            EventKind::Migrate => "Migrate",
            EventKind::Allocate => "Allocate",
            EventKind::Deallocate => "Deallocate",
            EventKind::Receive => "Receive",
            EventKind::Locate => "Locate",
            EventKind::UsageProof => "UsageProof",
            EventKind::StopUsage => "StopUsage",
        };
        write!(f, "{}", name)
    }
}

/// Kind of party receiving a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiverType {
    FinalUser,
    CollectionPoint,
    RecyclingPoint,
}

/// Geographic point (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Typed per-kind event payload
///
/// Chosen via the event kind tag; payload-less kinds carry no data
/// beyond the shared record fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    Register,
    Add,
    Remove,
    Recycle,
    Collect,
    Migrate {
        /// Agent taking over custody
        to: AgentId,
    },
    Allocate {
        /// Owner reference the device is allocated to
        owner: AgentUserId,
    },
    Deallocate {
        /// Owner reference the device is deallocated from
        owner: AgentUserId,
    },
    Receive {
        /// URL of the party receiving the device
        receiver: String,
        receiver_type: ReceiverType,
    },
    Locate {
        point: GeoPoint,
    },
    UsageProof,
    StopUsage,
}

impl EventPayload {
    /// The kind tag of this payload
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Register => EventKind::Register,
            EventPayload::Add => EventKind::Add,
            EventPayload::Remove => EventKind::Remove,
            EventPayload::Recycle => EventKind::Recycle,
            EventPayload::Collect => EventKind::Collect,
            EventPayload::Migrate { .. } => EventKind::Migrate,
            EventPayload::Allocate { .. } => EventKind::Allocate,
            EventPayload::Deallocate { .. } => EventKind::Deallocate,
            EventPayload::Receive { .. } => EventKind::Receive,
            EventPayload::Locate { .. } => EventKind::Locate,
            EventPayload::UsageProof => EventKind::UsageProof,
            EventPayload::StopUsage => EventKind::StopUsage,
        }
    }
}

/// Immutable lifecycle event record
///
/// Built by the service layer after reference resolution, validated by
/// the guard, then handed to the event store. The store envelope — the
/// monotonic sequence number and the server-assigned `recorded_at` —
/// lives on [`crate::event_store::StoredEvent`], never here: ordering is
/// never caller-supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceEvent {
    /// Unique event identifier
    pub id: EventId,

    /// Device the event targets
    pub device: DeviceId,

    /// Agent recording the event
    pub agent: AgentId,

    /// External identifier of the user performing the event
    pub by_user: String,

    /// Devices affected as components of the target
    #[serde(default)]
    pub components: Vec<DeviceId>,

    /// Business timestamp supplied by the caller, informational only
    pub occurred_at: Option<DateTime<Utc>>,

    /// Typed per-kind payload
    pub payload: EventPayload,

    /// Where the event happened, when reported
    pub location: Option<GeoPoint>,
}

impl DeviceEvent {
    /// Create an event with the shared fields and a payload
    pub fn new(
        device: DeviceId,
        agent: AgentId,
        by_user: impl Into<String>,
        payload: EventPayload,
    ) -> Self {
        Self {
            id: EventId::new(),
            device,
            agent,
            by_user: by_user.into(),
            components: Vec::new(),
            occurred_at: None,
            payload,
            location: None,
        }
    }

    /// Attach the component device set
    pub fn with_components(mut self, components: Vec<DeviceId>) -> Self {
        self.components = components;
        self
    }

    /// Attach the business timestamp
    pub fn with_occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    /// Attach the reported location
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    /// The kind tag of this event
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}
