// Copyright (c) 2025 - Cowboy AI, Inc.
//! Device projection folds
//!
//! Inputs are sequences as returned by the store, already in sequence
//! order: `history` means `events_for(device)` (events targeting the
//! device), `related` means `events_related_to(device)`.
//!
//! The folds assume a history the guard accepted. When replaying data
//! that predates a guard rule they degrade gracefully (skip and warn)
//! rather than panic.

use chrono::{DateTime, Datelike, Utc};
use tracing::warn;

use crate::domain::{AgentId, AgentUserId, DeviceId};
use crate::event_store::StoredEvent;
use crate::events::{EventKind, EventPayload};

use super::DomainInvariantError;

/// Current component set of a device
///
/// Base set = the component list of the *latest* Register event (a
/// device can have several Register events — snapshots — and the latest
/// one resets the base). All Add and Remove events are then replayed in
/// sequence order on top: Add unions, Remove subtracts. The replay is
/// deliberately not clipped to events after the chosen Register; this
/// matches the historical behaviour the rest of the system depends on.
///
/// Returns an empty set (never an error) for a device registered only
/// as someone else's component.
pub fn components(history: &[StoredEvent]) -> Vec<DeviceId> {
    let mut set: Vec<DeviceId> = history
        .iter()
        .rev()
        .find(|e| e.kind() == EventKind::Register)
        .map(|e| e.event.components.clone())
        .unwrap_or_default();

    // Add and Remove interleave; the order of operations affects the
    // final result.
    for stored in history {
        match stored.kind() {
            EventKind::Add => {
                for component in &stored.event.components {
                    if !set.contains(component) {
                        set.push(*component);
                    }
                }
            }
            EventKind::Remove => {
                set.retain(|c| !stored.event.components.contains(c));
            }
            _ => {}
        }
    }

    set
}

/// Current parent of a device, derived from the relational events
///
/// Looks at Register/Add/Remove events where the device appears as a
/// *component* and takes the latest: a Remove detaches (no parent),
/// anything else attaches to that event's target.
pub fn parent(related: &[StoredEvent], device: DeviceId) -> Option<DeviceId> {
    let last = related
        .iter()
        .rev()
        .filter(|e| {
            matches!(
                e.kind(),
                EventKind::Register | EventKind::Add | EventKind::Remove
            )
        })
        .find(|e| e.event.components.contains(&device))?;

    match last.kind() {
        EventKind::Remove => None,
        _ => Some(last.event.device),
    }
}

/// Agent currently holding custody of the device
///
/// The `to` agent of the latest Migrate event wins; without migrations,
/// custody stays with the agent that recorded the latest Register.
///
/// # Errors
///
/// [`DomainInvariantError::HolderNotDerivable`] for a device registered
/// only as a component — custody inheritance from the parent is a
/// documented gap, not silently answered wrong.
pub fn holder(
    history: &[StoredEvent],
    device: DeviceId,
) -> Result<AgentId, DomainInvariantError> {
    for stored in history.iter().rev() {
        if let EventPayload::Migrate { to } = &stored.event.payload {
            return Ok(*to);
        }
    }

    history
        .iter()
        .rev()
        .find(|e| e.kind() == EventKind::Register)
        .map(|e| e.event.agent)
        .ok_or(DomainInvariantError::HolderNotDerivable(device))
}

/// Current owner set of the device (allocation tracking)
///
/// Ordered replay of Allocate/Deallocate. The guard rejects a
/// Deallocate of a non-present owner at append time; one encountered in
/// historical data is skipped with a warning.
pub fn owners(history: &[StoredEvent]) -> Vec<AgentUserId> {
    let mut set: Vec<AgentUserId> = Vec::new();

    for stored in history {
        match &stored.event.payload {
            EventPayload::Allocate { owner } => set.push(*owner),
            EventPayload::Deallocate { owner } => {
                if let Some(pos) = set.iter().position(|o| o == owner) {
                    set.remove(pos);
                } else {
                    warn!(
                        device = %stored.event.device,
                        sequence = stored.sequence,
                        "deallocate of non-present owner during replay"
                    );
                }
            }
            _ => {}
        }
    }

    set
}

/// Total usage time of the device in seconds, as of now
///
/// Live metric: an interval left open by a dangling UsageProof with no
/// Recycle event is closed at the current wall clock, so the value grows
/// over time by design. Use [`running_time_at`] for deterministic tests.
pub fn running_time(history: &[StoredEvent]) -> f64 {
    running_time_at(history, Utc::now())
}

/// Total usage time of the device in seconds, evaluated at `now`
///
/// Each UsageProof opens an interval at its business timestamp; each
/// StopUsage closes the most recently opened one. A dangling interval
/// is closed at the Recycle event's business timestamp when one exists,
/// otherwise at `now`.
pub fn running_time_at(history: &[StoredEvent], now: DateTime<Utc>) -> f64 {
    let mut open: Option<DateTime<Utc>> = None;
    let mut seconds = 0.0;

    for stored in history {
        match stored.kind() {
            EventKind::UsageProof => open = Some(stored.business_time()),
            EventKind::StopUsage => {
                if let Some(start) = open.take() {
                    seconds += seconds_between(start, stored.business_time());
                } else {
                    warn!(
                        device = %stored.event.device,
                        sequence = stored.sequence,
                        "stop-usage without an open interval during replay"
                    );
                }
            }
            _ => {}
        }
    }

    if let Some(start) = open {
        let end = history
            .iter()
            .find(|e| e.kind() == EventKind::Recycle)
            .map(|e| e.business_time())
            .unwrap_or(now);
        seconds += seconds_between(start, end);
    }

    seconds
}

/// Device lifetime in whole years, from production to recycling
///
/// Production year is the manufacture date's year when known, otherwise
/// the year of the earliest Register event by business timestamp (note:
/// earliest, unlike every other fold here).
///
/// # Errors
///
/// - [`DomainInvariantError::NotRecycled`] without a Recycle event
/// - [`DomainInvariantError::ProductionYearUnknown`] without either a
///   manufacture date or a Register event
pub fn durability(
    history: &[StoredEvent],
    device: DeviceId,
    manufacture_date: Option<chrono::NaiveDate>,
) -> Result<i32, DomainInvariantError> {
    let recycled_on = history
        .iter()
        .find(|e| e.kind() == EventKind::Recycle)
        .map(|e| e.business_time().year())
        .ok_or(DomainInvariantError::NotRecycled(device))?;

    let produced_on = match manufacture_date {
        Some(date) => date.year(),
        None => history
            .iter()
            .filter(|e| e.kind() == EventKind::Register)
            .min_by_key(|e| e.business_time())
            .map(|e| e.business_time().year())
            .ok_or(DomainInvariantError::ProductionYearUnknown(device))?,
    };

    Ok(recycled_on - produced_on)
}

fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 1000.0
}
