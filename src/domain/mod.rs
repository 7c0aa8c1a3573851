// Copyright (c) 2025 - Cowboy AI, Inc.
//! Traceability Domain Models
//!
//! Core domain concepts for the device ledger: identity records and the
//! value objects with validation invariants.
//!
//! # Value Objects with Invariants
//!
//! - [`HardwareId`] - externally derived hardware identifier
//!   (`word-word-word` shape)
//!
//! # Identity Records
//!
//! - [`Device`] - physical device identity; lifecycle state is derived,
//!   never stored
//! - [`Agent`] - organization recording events
//! - [`AgentUser`] - external identity used for allocation tracking
//!
//! # Guard
//!
//! [`invariants`] holds the pure per-event-kind precondition checks run
//! before an append.

pub mod agent;
pub mod device;
pub mod hardware_id;
pub mod invariants;

// Re-export value objects and records
pub use agent::{Agent, AgentId, AgentUser, AgentUserId};
pub use device::{Device, DeviceId, DeviceKind};
pub use hardware_id::{HardwareId, HardwareIdError};
pub use invariants::{GuardResult, PreconditionError, ValidationError};
