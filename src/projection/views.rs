// Copyright (c) 2025 - Cowboy AI, Inc.
//! Serializable projection views
//!
//! Plain data handed to the caller's API layer. Each view is the result
//! of one or more folds from [`super::device`], resolved to external
//! references (URLs) where the caller expects them.

use serde::{Deserialize, Serialize};

use crate::domain::{AgentId, DeviceId, DeviceKind, HardwareId};

/// Current component set of a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentsView {
    pub device: DeviceId,
    pub components: Vec<DeviceId>,
}

/// Current parent of a device, if attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentView {
    pub device: DeviceId,
    pub parent: Option<DeviceId>,
}

/// Agent currently holding custody
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderView {
    pub device: DeviceId,
    pub holder: AgentId,
}

/// External parties the device is currently allocated to, by URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnersView {
    pub device: DeviceId,
    pub owners: Vec<String>,
}

/// Accumulated usage time in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningTimeView {
    pub device: DeviceId,
    pub seconds: f64,
}

/// Lifetime in whole years, production to recycling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurabilityView {
    pub device: DeviceId,
    pub years: i32,
}

/// Usage metrics of a device
///
/// `durability` is absent until the device has a Recycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsView {
    pub device: DeviceId,
    pub running_time: f64,
    pub durability: Option<i32>,
}

/// Device identity together with its derived composition and ownership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceView {
    pub id: DeviceId,
    pub url: String,
    pub hardware_id: Option<HardwareId>,
    pub kind: DeviceKind,
    pub components: Vec<DeviceId>,
    pub owners: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_serialize_as_plain_data() {
        let view = ParentView {
            device: DeviceId::new(),
            parent: None,
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"parent\":null"));

        let metrics = MetricsView {
            device: DeviceId::new(),
            running_time: 1500.0,
            durability: None,
        };
        let json = serde_json::to_string(&metrics).unwrap();
        assert!(json.contains("\"running_time\":1500.0"));
    }
}
