// Copyright (c) 2025 - Cowboy AI, Inc.
//! Agents and agent users
//!
//! An `Agent` is the organization recording events — every event has
//! exactly one. An `AgentUser` is a lightweight external identity used
//! only for allocation tracking; it is not a full agent account.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a recording agent (organization)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AgentId(Uuid);

impl AgentId {
    /// Create a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Organization or custodian responsible for recording events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Internal identifier
    pub id: AgentId,

    /// Unique agent name
    pub name: String,

    /// Free-form description
    pub description: String,
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Identifier of an external owner reference
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AgentUserId(Uuid);

impl AgentUserId {
    /// Create a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AgentUserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External identity a device can be allocated to
///
/// Deduplicated by URL: allocating twice to the same URL references the
/// same record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentUser {
    /// Internal identifier
    pub id: AgentUserId,

    /// URL pointing to a user or an organization, unique
    pub url: String,
}

impl fmt::Display for AgentUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_display_is_name() {
        let agent = Agent {
            id: AgentId::new(),
            name: "ereuse".to_string(),
            description: "Recycler network".to_string(),
        };
        assert_eq!(format!("{}", agent), "ereuse");
    }

    #[test]
    fn test_agent_user_display_is_url() {
        let user = AgentUser {
            id: AgentUserId::new(),
            url: "https://example.org/users/alice".to_string(),
        };
        assert_eq!(format!("{}", user), "https://example.org/users/alice");
    }
}
