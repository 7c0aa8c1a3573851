// Copyright (c) 2025 - Cowboy AI, Inc.
//! Device and Agent Registries
//!
//! Identity resolution: external references (hardware id, external URI,
//! internal id) map to canonical records. Devices are created lazily on
//! first reference — a Register may list components nobody has seen
//! before, and re-registering a known hardware id must reuse the
//! existing record instead of creating a duplicate.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::info;

use crate::domain::{
    Agent, AgentId, AgentUser, AgentUserId, Device, DeviceId, DeviceKind, HardwareId,
    ValidationError,
};
use chrono::NaiveDate;

/// A referenced entity could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    /// No device matches the lookup token
    #[error("no device matches '{0}'")]
    Device(String),

    /// Unknown agent
    #[error("unknown agent {0}")]
    Agent(AgentId),

    /// Unknown owner reference
    #[error("unknown owner reference '{0}'")]
    AgentUser(String),
}

/// Identity fields of a device about to be referenced
///
/// When the hardware id (or URL) is already known, the existing record
/// wins and the remaining fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    pub url: String,
    pub hardware_id: Option<HardwareId>,
    pub kind: DeviceKind,
    pub manufacture_date: Option<NaiveDate>,
}

#[derive(Default)]
struct DeviceIndex {
    devices: HashMap<DeviceId, Device>,
    by_hardware_id: HashMap<HardwareId, DeviceId>,
    by_url: HashMap<String, DeviceId>,
}

/// Canonical device records with lookup indices
#[derive(Default)]
pub struct DeviceRegistry {
    inner: RwLock<DeviceIndex>,
}

impl DeviceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an identity to an existing device or create one
    ///
    /// Resolution order: hardware id, then URL. A hit returns the
    /// existing record unchanged — registration never mutates identity
    /// fields, it only appends events.
    pub fn resolve_or_create(&self, draft: NewDevice) -> Device {
        let mut inner = self.inner.write();

        if let Some(hid) = &draft.hardware_id {
            if let Some(id) = inner.by_hardware_id.get(hid) {
                return inner.devices[id].clone();
            }
        }
        if let Some(id) = inner.by_url.get(&draft.url) {
            return inner.devices[id].clone();
        }

        let device = Device {
            id: DeviceId::new(),
            url: draft.url,
            hardware_id: draft.hardware_id,
            kind: draft.kind,
            manufacture_date: draft.manufacture_date,
        };
        if let Some(hid) = &device.hardware_id {
            inner.by_hardware_id.insert(hid.clone(), device.id);
        }
        inner.by_url.insert(device.url.clone(), device.id);
        inner.devices.insert(device.id, device.clone());

        info!(device = %device, url = %device.url, "device created");
        device
    }

    /// Get a device by internal id
    pub fn get(&self, id: DeviceId) -> Option<Device> {
        self.inner.read().devices.get(&id).cloned()
    }

    /// Resolve a lookup token to a device
    ///
    /// A token may be an internal id, an escaped external URI (`!`
    /// stands in for `/`, a transport workaround), or a hardware id of
    /// the `word-word-word` shape — tried in that order.
    pub fn lookup(&self, token: &str) -> Result<Device, NotFoundError> {
        let inner = self.inner.read();
        let miss = || NotFoundError::Device(token.to_string());

        if let Some(id) = DeviceId::parse(token) {
            return inner.devices.get(&id).cloned().ok_or_else(miss);
        }

        let unescaped = token.replace('!', "/");
        if unescaped.starts_with("http://") || unescaped.starts_with("https://") {
            return inner
                .by_url
                .get(&unescaped)
                .and_then(|id| inner.devices.get(id).cloned())
                .ok_or_else(miss);
        }

        if let Ok(hid) = HardwareId::new(token) {
            return inner
                .by_hardware_id
                .get(&hid)
                .and_then(|id| inner.devices.get(id).cloned())
                .ok_or_else(miss);
        }

        Err(miss())
    }
}

#[derive(Default)]
struct AgentIndex {
    agents: HashMap<AgentId, Agent>,
    by_name: HashMap<String, AgentId>,
}

/// Registered recording agents, unique by name
#[derive(Default)]
pub struct AgentRegistry {
    inner: RwLock<AgentIndex>,
}

impl AgentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new agent with a unique name
    pub fn register(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Agent, ValidationError> {
        let name = name.into();
        let mut inner = self.inner.write();

        if inner.by_name.contains_key(&name) {
            return Err(ValidationError::DuplicateAgentName(name));
        }

        let agent = Agent {
            id: AgentId::new(),
            name: name.clone(),
            description: description.into(),
        };
        inner.by_name.insert(name, agent.id);
        inner.agents.insert(agent.id, agent.clone());

        info!(agent = %agent, "agent registered");
        Ok(agent)
    }

    /// Get an agent by id
    pub fn get(&self, id: AgentId) -> Result<Agent, NotFoundError> {
        self.inner
            .read()
            .agents
            .get(&id)
            .cloned()
            .ok_or(NotFoundError::Agent(id))
    }

    /// Find an agent by its unique name
    pub fn find_by_name(&self, name: &str) -> Option<Agent> {
        let inner = self.inner.read();
        inner
            .by_name
            .get(name)
            .and_then(|id| inner.agents.get(id).cloned())
    }
}

#[derive(Default)]
struct AgentUserIndex {
    users: HashMap<AgentUserId, AgentUser>,
    by_url: HashMap<String, AgentUserId>,
}

/// External owner references, deduplicated by URL
#[derive(Default)]
pub struct AgentUserRegistry {
    inner: RwLock<AgentUserIndex>,
}

impl AgentUserRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the reference for a URL, creating it on first sight
    pub fn get_or_create(&self, url: impl Into<String>) -> AgentUser {
        let url = url.into();
        let mut inner = self.inner.write();

        if let Some(id) = inner.by_url.get(&url) {
            return inner.users[id].clone();
        }

        let user = AgentUser {
            id: AgentUserId::new(),
            url: url.clone(),
        };
        inner.by_url.insert(url, user.id);
        inner.users.insert(user.id, user.clone());
        user
    }

    /// Find an existing reference by URL
    pub fn find_by_url(&self, url: &str) -> Option<AgentUser> {
        let inner = self.inner.read();
        inner
            .by_url
            .get(url)
            .and_then(|id| inner.users.get(id).cloned())
    }

    /// Get a reference by id
    pub fn get(&self, id: AgentUserId) -> Option<AgentUser> {
        self.inner.read().users.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(url: &str, hid: Option<&str>) -> NewDevice {
        NewDevice {
            url: url.to_string(),
            hardware_id: hid.map(|h| HardwareId::new(h).unwrap()),
            kind: DeviceKind::Computer,
            manufacture_date: None,
        }
    }

    #[test]
    fn test_resolve_or_create_reuses_by_hardware_id() {
        let registry = DeviceRegistry::new();
        let first = registry.resolve_or_create(draft("https://a.example/d/1", Some("a-b-c")));
        // Different URL, same hardware id: existing record wins.
        let second = registry.resolve_or_create(draft("https://b.example/d/9", Some("a-b-c")));

        assert_eq!(first.id, second.id);
        assert_eq!(second.url, "https://a.example/d/1");
    }

    #[test]
    fn test_resolve_or_create_reuses_by_url() {
        let registry = DeviceRegistry::new();
        let first = registry.resolve_or_create(draft("https://a.example/d/1", None));
        let second = registry.resolve_or_create(draft("https://a.example/d/1", None));

        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_lookup_by_all_token_shapes() {
        let registry = DeviceRegistry::new();
        let device = registry.resolve_or_create(draft("https://a.example/d/1", Some("a-b-c")));

        // Internal id
        assert_eq!(
            registry.lookup(&device.id.to_string()).unwrap().id,
            device.id
        );
        // Escaped external URI
        assert_eq!(
            registry.lookup("https:!!a.example!d!1").unwrap().id,
            device.id
        );
        // Hardware id
        assert_eq!(registry.lookup("a-b-c").unwrap().id, device.id);
    }

    #[test]
    fn test_lookup_miss() {
        let registry = DeviceRegistry::new();
        assert_eq!(
            registry.lookup("x-y-z"),
            Err(NotFoundError::Device("x-y-z".to_string()))
        );
    }

    #[test]
    fn test_agent_names_are_unique() {
        let registry = AgentRegistry::new();
        registry.register("ereuse", "recycler network").unwrap();

        let err = registry.register("ereuse", "impostor").unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateAgentName("ereuse".to_string())
        );
    }

    #[test]
    fn test_agent_user_dedup_by_url() {
        let registry = AgentUserRegistry::new();
        let a = registry.get_or_create("https://u.example/alice");
        let b = registry.get_or_create("https://u.example/alice");

        assert_eq!(a.id, b.id);
        assert_eq!(registry.find_by_url("https://u.example/alice").unwrap().id, a.id);
        assert!(registry.find_by_url("https://u.example/bob").is_none());
    }
}
