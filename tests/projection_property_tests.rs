// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Projection Folds
//!
//! Verify properties that must hold for all event sequences: folds are
//! deterministic, the component set never leaves the referenced pool,
//! and the ownership fold agrees with an independent reference model.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use device_ledger::domain::{AgentId, AgentUserId, DeviceId};
use device_ledger::event_store::StoredEvent;
use device_ledger::events::{DeviceEvent, EventPayload};
use device_ledger::projection;

/// Symbolic operation over a small pool of components and owners
#[derive(Debug, Clone)]
enum Op {
    Register(Vec<usize>),
    Add(Vec<usize>),
    Remove(Vec<usize>),
    Allocate(usize),
    Deallocate(usize),
}

const POOL: usize = 6;
const OWNERS: usize = 4;

fn subset() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..POOL, 0..POOL)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        subset().prop_map(Op::Register),
        subset().prop_map(Op::Add),
        subset().prop_map(Op::Remove),
        (0..OWNERS).prop_map(Op::Allocate),
        (0..OWNERS).prop_map(Op::Deallocate),
    ]
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op(), 0..40)
}

struct World {
    device: DeviceId,
    pool: Vec<DeviceId>,
    owners: Vec<AgentUserId>,
}

impl World {
    fn new() -> Self {
        Self {
            device: DeviceId::new(),
            pool: (0..POOL).map(|_| DeviceId::new()).collect(),
            owners: (0..OWNERS).map(|_| AgentUserId::new()).collect(),
        }
    }

    /// Materialize symbolic operations into a stored history
    fn history(&self, ops: &[Op]) -> Vec<StoredEvent> {
        let agent = AgentId::new();
        ops.iter()
            .enumerate()
            .map(|(i, op)| {
                let (payload, components) = match op {
                    Op::Register(set) => (EventPayload::Register, self.devices(set)),
                    Op::Add(set) => (EventPayload::Add, self.devices(set)),
                    Op::Remove(set) => (EventPayload::Remove, self.devices(set)),
                    Op::Allocate(o) => (
                        EventPayload::Allocate {
                            owner: self.owners[*o],
                        },
                        vec![],
                    ),
                    Op::Deallocate(o) => (
                        EventPayload::Deallocate {
                            owner: self.owners[*o],
                        },
                        vec![],
                    ),
                };
                StoredEvent {
                    sequence: i as u64 + 1,
                    recorded_at: Utc::now(),
                    event: DeviceEvent::new(self.device, agent, "https://u.example/1", payload)
                        .with_components(components),
                }
            })
            .collect()
    }

    fn devices(&self, indices: &[usize]) -> Vec<DeviceId> {
        let mut out = Vec::new();
        for &i in indices {
            if !out.contains(&self.pool[i]) {
                out.push(self.pool[i]);
            }
        }
        out
    }
}

/// Reference model of the composition rules, independent of the fold
///
/// Base = the last Register's component list; every Add/Remove is then
/// replayed in order on top, including ones predating that Register —
/// the historical semantics the projection must preserve.
fn components_model(world: &World, ops: &[Op]) -> Vec<DeviceId> {
    let mut set: Vec<DeviceId> = ops
        .iter()
        .rev()
        .find_map(|op| match op {
            Op::Register(s) => Some(world.devices(s)),
            _ => None,
        })
        .unwrap_or_default();

    for op in ops {
        match op {
            Op::Add(s) => {
                for d in world.devices(s) {
                    if !set.contains(&d) {
                        set.push(d);
                    }
                }
            }
            Op::Remove(s) => {
                let removed = world.devices(s);
                set.retain(|d| !removed.contains(d));
            }
            _ => {}
        }
    }
    set
}

/// Reference model of the ownership rules, independent of the fold
fn owners_model(world: &World, ops: &[Op]) -> Vec<AgentUserId> {
    let mut set: Vec<AgentUserId> = Vec::new();
    for op in ops {
        match op {
            Op::Allocate(o) => set.push(world.owners[*o]),
            Op::Deallocate(o) => {
                if let Some(pos) = set.iter().position(|x| *x == world.owners[*o]) {
                    set.remove(pos);
                }
            }
            _ => {}
        }
    }
    set
}

proptest! {
    /// Folding the same sequence twice yields identical projections.
    #[test]
    fn prop_folds_are_deterministic(ops in ops()) {
        let world = World::new();
        let history = world.history(&ops);

        prop_assert_eq!(
            projection::components(&history),
            projection::components(&history)
        );
        prop_assert_eq!(projection::owners(&history), projection::owners(&history));
        let now = Utc::now();
        prop_assert_eq!(
            projection::running_time_at(&history, now),
            projection::running_time_at(&history, now)
        );
    }

    /// The component set only ever contains referenced devices, without
    /// duplicates.
    #[test]
    fn prop_components_stay_within_the_referenced_pool(ops in ops()) {
        let world = World::new();
        let history = world.history(&ops);

        let components = projection::components(&history);
        for c in &components {
            prop_assert!(world.pool.contains(c));
        }
        let mut deduped = components.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(components.len(), deduped.len());
    }

    /// The ownership fold agrees with an independent replay of the rules.
    #[test]
    fn prop_owners_match_reference_model(ops in ops()) {
        let world = World::new();
        let history = world.history(&ops);

        prop_assert_eq!(projection::owners(&history), owners_model(&world, &ops));
    }

    /// The composition fold agrees with an independent replay of the
    /// latest-snapshot-plus-all-adds-and-removes rule.
    #[test]
    fn prop_components_match_reference_model(ops in ops()) {
        let world = World::new();
        let history = world.history(&ops);

        prop_assert_eq!(
            projection::components(&history),
            components_model(&world, &ops)
        );
    }

    /// With no Add/Remove in the history, the component set is exactly
    /// the last Register's list: a snapshot replaces, never unions.
    #[test]
    fn prop_trailing_register_wins(sets in prop::collection::vec(subset(), 1..6)) {
        let world = World::new();
        let ops: Vec<Op> = sets.iter().cloned().map(Op::Register).collect();
        let history = world.history(&ops);

        let last = sets.last().unwrap();
        prop_assert_eq!(projection::components(&history), world.devices(last));
    }

    /// Usage accounting sums exactly the closed intervals when proofs
    /// and stops alternate with increasing timestamps.
    #[test]
    fn prop_running_time_sums_closed_intervals(gaps in prop::collection::vec((1i64..3600, 1i64..3600), 0..10)) {
        let device = DeviceId::new();
        let agent = AgentId::new();
        let mut t = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
        let mut history = Vec::new();
        let mut expected = 0.0;

        for (i, (run, idle)) in gaps.iter().enumerate() {
            let start = t;
            let stop = start + Duration::seconds(*run);
            t = stop + Duration::seconds(*idle);
            expected += *run as f64;

            for (j, (payload, at)) in [
                (EventPayload::UsageProof, start),
                (EventPayload::StopUsage, stop),
            ]
            .into_iter()
            .enumerate()
            {
                history.push(StoredEvent {
                    sequence: (i * 2 + j) as u64 + 1,
                    recorded_at: Utc::now(),
                    event: DeviceEvent::new(device, agent, "https://u.example/1", payload)
                        .with_occurred_at(at),
                });
            }
        }

        prop_assert_eq!(projection::running_time_at(&history, t), expected);
    }
}
