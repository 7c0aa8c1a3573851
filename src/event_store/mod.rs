// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Store Abstraction
//!
//! Append-only storage for lifecycle events. The store is the single
//! source of truth: every projection is recomputed from the sequences it
//! returns.
//!
//! # Store Requirements
//!
//! 1. **Append-Only**: no update or delete operation exists
//! 2. **Ordered**: a global monotonic sequence number is assigned at
//!    append time and is the only ordering key — wall clocks are
//!    informational
//! 3. **Atomic**: an append is fully visible or not at all; the
//!    `expected_version` check and the append happen under one critical
//!    section, which gives the guard its append-if-still-valid
//!    transaction
//! 4. **Replay**: `events_for` and `events_related_to` return stable
//!    snapshots a fold can run over while writers keep appending

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DeviceId;
use crate::events::{DeviceEvent, EventKind};

pub mod memory;

pub use memory::MemoryEventStore;

/// Errors raised by the event store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventStoreError {
    /// The device's history changed between guard and append
    #[error(
        "version conflict on device {device}: expected {expected}, actual {actual}"
    )]
    VersionConflict {
        device: DeviceId,
        expected: u64,
        actual: u64,
    },
}

/// An event as persisted, wrapped in the store envelope
///
/// `sequence` and `recorded_at` are assigned by the store on append and
/// never by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Global monotonic sequence number, the ordering key
    pub sequence: u64,

    /// Server-assigned record timestamp
    pub recorded_at: DateTime<Utc>,

    /// The event record as appended
    pub event: DeviceEvent,
}

impl StoredEvent {
    /// The kind tag of the wrapped event
    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }

    /// Business timestamp, falling back to the record timestamp
    ///
    /// Metrics consume the caller-supplied business time; kinds that do
    /// not require one fall back to when the store recorded the event.
    pub fn business_time(&self) -> DateTime<Utc> {
        self.event.occurred_at.unwrap_or(self.recorded_at)
    }
}

/// Append-only event storage
///
/// Implementations must keep appends atomic and sequences gap-free and
/// monotonic. Reads return snapshots ordered by sequence.
pub trait EventStore: Send + Sync {
    /// Append an event, optionally insisting on the device's current version
    ///
    /// `expected_version` is the number of events already targeting the
    /// event's device as observed by the caller. When supplied and stale,
    /// the append fails with [`EventStoreError::VersionConflict`] and
    /// nothing is written. This is how a guard decision is made atomic
    /// with its append.
    fn append(
        &self,
        event: DeviceEvent,
        expected_version: Option<u64>,
    ) -> Result<StoredEvent, EventStoreError>;

    /// Events targeting the device, in sequence order
    fn events_for(&self, device: DeviceId) -> Vec<StoredEvent>;

    /// Events targeting the device or listing it as a component
    ///
    /// Each event appears exactly once even if it matches both ways, in
    /// sequence order.
    fn events_related_to(&self, device: DeviceId) -> Vec<StoredEvent>;

    /// Number of events targeting the device, `None` when it has none
    fn version(&self, device: DeviceId) -> Option<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AgentId;
    use crate::events::EventPayload;

    #[test]
    fn test_business_time_falls_back_to_recorded_at() {
        let recorded = Utc::now();
        let stored = StoredEvent {
            sequence: 1,
            recorded_at: recorded,
            event: DeviceEvent::new(
                DeviceId::new(),
                AgentId::new(),
                "https://u.example/1",
                EventPayload::Register,
            ),
        };
        assert_eq!(stored.business_time(), recorded);

        let occurred = recorded - chrono::Duration::hours(2);
        let stored = StoredEvent {
            event: stored.event.with_occurred_at(occurred),
            ..stored
        };
        assert_eq!(stored.business_time(), occurred);
    }
}
