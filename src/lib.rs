//! Event-sourced traceability ledger for devices and their components
//!
//! Records immutable lifecycle events (register, add/remove component,
//! migrate, allocate, recycle, ...) for physical devices across
//! organizations, and derives every piece of current state — component
//! graph, custody, ownership, usage metrics — purely by folding the
//! ordered event history. No lifecycle field is ever stored or mutated.
//!
//! # Architecture
//!
//! ```text
//! Request → Registry → Guard → EventStore → Projections
//!  (refs)   (resolve) (rules)  (append)     (pure folds)
//! ```
//!
//! - [`domain`] — identity records and validated value objects, plus the
//!   pure guard rules in [`domain::invariants`]
//! - [`events`] — immutable event records with typed per-kind payloads
//! - [`event_store`] — append-only storage, ordering by store-assigned
//!   sequence numbers
//! - [`projection`] — pure folds deriving the read views
//! - [`registry`] — identity resolution and lazy device creation
//! - [`service`] — the [`service::Ledger`] application service tying the
//!   write and read paths together
//!
//! # Example
//!
//! ```rust
//! use device_ledger::service::{DeviceDraft, EventContext, Ledger, RegisterRequest};
//! use device_ledger::domain::DeviceKind;
//!
//! let ledger = Ledger::in_memory();
//! let agent = ledger.register_agent("ereuse", "recycler network").unwrap();
//!
//! ledger
//!     .register(RegisterRequest {
//!         device: DeviceDraft {
//!             url: "https://devicehub.example/devices/1".to_string(),
//!             hid: Some("dell-xps13-SN001".to_string()),
//!             kind: DeviceKind::Laptop,
//!             manufacture_date: None,
//!         },
//!         components: vec![],
//!         context: EventContext::new(agent.id, "https://devicehub.example/users/1"),
//!     })
//!     .unwrap();
//!
//! let view = ledger.device_view("dell-xps13-SN001").unwrap();
//! assert!(view.components.is_empty());
//! ```

pub mod domain;
pub mod errors;
pub mod event_store;
pub mod events;
pub mod projection;
pub mod registry;
pub mod service;

// Re-export commonly used types
pub use domain::{Agent, AgentId, AgentUser, AgentUserId, Device, DeviceId, DeviceKind, HardwareId};
pub use errors::{LedgerError, LedgerResult};
pub use event_store::{EventStore, MemoryEventStore, StoredEvent};
pub use events::{DeviceEvent, EventKind, EventPayload, GeoPoint, ReceiverType};
pub use service::Ledger;
