// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-Memory Event Store
//!
//! Reference implementation of [`EventStore`] backed by a single
//! append log under a `parking_lot` read-write lock. Sequence numbers
//! are assigned inside the write critical section, so they are gap-free,
//! monotonic and stable under concurrent appends. Per-device indices
//! keep the read paths linear in the size of the answer rather than the
//! whole log.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::DeviceId;
use crate::events::DeviceEvent;

use super::{EventStore, EventStoreError, StoredEvent};

#[derive(Default)]
struct StoreInner {
    /// Append log, index = sequence - 1
    log: Vec<StoredEvent>,

    /// Log indices of events targeting a device
    by_target: HashMap<DeviceId, Vec<usize>>,

    /// Log indices of events listing a device as component
    by_component: HashMap<DeviceId, Vec<usize>>,
}

/// In-memory [`EventStore`]
#[derive(Default)]
pub struct MemoryEventStore {
    inner: RwLock<StoreInner>,
}

impl MemoryEventStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of events across all devices
    pub fn len(&self) -> usize {
        self.inner.read().log.len()
    }

    /// Whether the store holds no events
    pub fn is_empty(&self) -> bool {
        self.inner.read().log.is_empty()
    }
}

impl EventStore for MemoryEventStore {
    fn append(
        &self,
        event: DeviceEvent,
        expected_version: Option<u64>,
    ) -> Result<StoredEvent, EventStoreError> {
        let mut inner = self.inner.write();

        let actual = inner
            .by_target
            .get(&event.device)
            .map(|idx| idx.len() as u64)
            .unwrap_or(0);
        if let Some(expected) = expected_version {
            if expected != actual {
                return Err(EventStoreError::VersionConflict {
                    device: event.device,
                    expected,
                    actual,
                });
            }
        }

        let index = inner.log.len();
        let stored = StoredEvent {
            sequence: index as u64 + 1,
            recorded_at: Utc::now(),
            event,
        };

        inner
            .by_target
            .entry(stored.event.device)
            .or_default()
            .push(index);
        for component in &stored.event.components {
            inner.by_component.entry(*component).or_default().push(index);
        }
        inner.log.push(stored.clone());

        debug!(
            kind = %stored.kind(),
            device = %stored.event.device,
            sequence = stored.sequence,
            "event appended"
        );
        Ok(stored)
    }

    fn events_for(&self, device: DeviceId) -> Vec<StoredEvent> {
        let inner = self.inner.read();
        inner
            .by_target
            .get(&device)
            .map(|indices| indices.iter().map(|&i| inner.log[i].clone()).collect())
            .unwrap_or_default()
    }

    fn events_related_to(&self, device: DeviceId) -> Vec<StoredEvent> {
        let inner = self.inner.read();

        // BTreeSet both deduplicates an event matching as target and as
        // component and restores sequence order across the two indices.
        let mut indices = BTreeSet::new();
        if let Some(targets) = inner.by_target.get(&device) {
            indices.extend(targets.iter().copied());
        }
        if let Some(components) = inner.by_component.get(&device) {
            indices.extend(components.iter().copied());
        }

        indices.into_iter().map(|i| inner.log[i].clone()).collect()
    }

    fn version(&self, device: DeviceId) -> Option<u64> {
        let inner = self.inner.read();
        inner
            .by_target
            .get(&device)
            .map(|indices| indices.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AgentId;
    use crate::events::EventPayload;

    fn event(device: DeviceId, payload: EventPayload) -> DeviceEvent {
        DeviceEvent::new(device, AgentId::new(), "https://u.example/1", payload)
    }

    #[test]
    fn test_append_assigns_monotonic_sequences() {
        let store = MemoryEventStore::new();
        let device = DeviceId::new();

        let first = store.append(event(device, EventPayload::Register), None).unwrap();
        let second = store.append(event(device, EventPayload::Recycle), None).unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(store.version(device), Some(2));
    }

    #[test]
    fn test_expected_version_mismatch_appends_nothing() {
        let store = MemoryEventStore::new();
        let device = DeviceId::new();

        store.append(event(device, EventPayload::Register), Some(0)).unwrap();
        let err = store
            .append(event(device, EventPayload::Recycle), Some(0))
            .unwrap_err();

        assert_eq!(
            err,
            EventStoreError::VersionConflict {
                device,
                expected: 0,
                actual: 1
            }
        );
        assert_eq!(store.version(device), Some(1));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_events_for_returns_only_target_events() {
        let store = MemoryEventStore::new();
        let laptop = DeviceId::new();
        let ram = DeviceId::new();

        store
            .append(
                event(laptop, EventPayload::Register).with_components(vec![ram]),
                None,
            )
            .unwrap();
        store.append(event(ram, EventPayload::Register), None).unwrap();

        let history = store.events_for(laptop);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event.device, laptop);
    }

    #[test]
    fn test_events_related_to_dedups_and_keeps_order() {
        let store = MemoryEventStore::new();
        let laptop = DeviceId::new();
        let ram = DeviceId::new();

        // ram appears as a component, then as a target, then as a
        // component again.
        store
            .append(
                event(laptop, EventPayload::Register).with_components(vec![ram]),
                None,
            )
            .unwrap();
        store.append(event(ram, EventPayload::Register), None).unwrap();
        store
            .append(
                event(laptop, EventPayload::Remove).with_components(vec![ram]),
                None,
            )
            .unwrap();

        let related = store.events_related_to(ram);
        let sequences: Vec<u64> = related.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[test]
    fn test_unknown_device_has_no_version() {
        let store = MemoryEventStore::new();
        assert_eq!(store.version(DeviceId::new()), None);
        assert!(store.events_for(DeviceId::new()).is_empty());
        assert!(store.events_related_to(DeviceId::new()).is_empty());
    }
}
