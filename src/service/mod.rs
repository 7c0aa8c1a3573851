// Copyright (c) 2025 - Cowboy AI, Inc.
//! Ledger Service Layer
//!
//! Application service coordinating the write path for lifecycle events:
//!
//! ```text
//! Request → Registry (resolve refs) → Projections (context)
//!         → Guard → EventStore::append(expected_version)
//! ```
//!
//! # Transaction Semantics
//!
//! Each write method is a transaction: load the device's history, run
//! the guard against projections of that snapshot, then append with
//! `expected_version` set to the snapshot's length. A writer that lost
//! the race gets a retryable version conflict instead of a phantom
//! append past a stale guard decision.
//!
//! The version check serializes writers per target device only. Guard
//! rules that read *another* device's history (attach/detach consult
//! the component's parent) are not covered by it: two concurrent adds
//! attaching the same component to different targets can both pass.

pub mod ledger;
pub mod requests;

pub use ledger::Ledger;
pub use requests::{DeviceDraft, EventContext, RegisterRequest};
