// Copyright (c) 2025 - Cowboy AI, Inc.
//! Device identity record
//!
//! A `Device` holds identity only. Composition, custody, ownership and
//! usage metrics are never stored on the record — they are derived by
//! folding the device's event history (see [`crate::projection`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::hardware_id::HardwareId;

/// Opaque internal device identifier, assigned at registration
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DeviceId(Uuid);

impl DeviceId {
    /// Create a fresh identifier (UUID v7 for time ordering)
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse an identifier from its string form
    pub fn parse(token: &str) -> Option<Self> {
        Uuid::parse_str(token).ok().map(Self)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of physical device
///
/// The enumeration is fixed by the domain; variant names are the
/// wire-stable strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    Computer,
    Laptop,
    Mobile,
    Monitor,
    Peripheral,
    GraphicCard,
    HardDrive,
    Motherboard,
    NetworkAdapter,
    OpticalDrive,
    Processor,
    RamModule,
    SoundCard,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceKind::Computer => "Computer",
            DeviceKind::Laptop => "Laptop",
            DeviceKind::Mobile => "Mobile",
            DeviceKind::Monitor => "Monitor",
            DeviceKind::Peripheral => "Peripheral",
            DeviceKind::GraphicCard => "GraphicCard",
            DeviceKind::HardDrive => "HardDrive",
            DeviceKind::Motherboard => "Motherboard",
            DeviceKind::NetworkAdapter => "NetworkAdapter",
            DeviceKind::OpticalDrive => "OpticalDrive",
            DeviceKind::Processor => "Processor",
            DeviceKind::RamModule => "RamModule",
            DeviceKind::SoundCard => "SoundCard",
        };
        write!(f, "{}", name)
    }
}

/// Device identity record
///
/// Created once, at the first event that references the device (either
/// as registration target or as somebody's component), and never
/// deleted. Re-registering with a known hardware id reuses the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Internal identifier
    pub id: DeviceId,

    /// Canonical external reference (URI provided by the agent), unique
    pub url: String,

    /// Externally derived hardware identifier, unique when present
    pub hardware_id: Option<HardwareId>,

    /// Kind of device
    pub kind: DeviceKind,

    /// Manufacture date, when known
    pub manufacture_date: Option<NaiveDate>,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_is_time_ordered() {
        let a = DeviceId::new();
        let b = DeviceId::new();
        assert!(a < b);
    }

    #[test]
    fn test_device_id_parse_round_trip() {
        let id = DeviceId::new();
        let parsed = DeviceId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(DeviceId::parse("not-a-uuid").is_none());
    }

    #[test]
    fn test_device_kind_wire_strings() {
        let json = serde_json::to_string(&DeviceKind::RamModule).unwrap();
        assert_eq!(json, "\"RamModule\"");

        let kind: DeviceKind = serde_json::from_str("\"GraphicCard\"").unwrap();
        assert_eq!(kind, DeviceKind::GraphicCard);
    }
}
