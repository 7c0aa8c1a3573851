// Copyright (c) 2025 - Cowboy AI, Inc.
//! Typed request structs at the service boundary
//!
//! Callers (the excluded API layer) build these from validated wire
//! payloads; the service resolves the references they carry before any
//! guard runs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AgentId, DeviceKind, HardwareId, ValidationError};
use crate::events::GeoPoint;
use crate::registry::NewDevice;

/// Identity of a device as supplied by a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDraft {
    /// Canonical external reference
    pub url: String,

    /// Raw hardware identifier, validated on resolution
    pub hid: Option<String>,

    /// Kind of device
    pub kind: DeviceKind,

    /// Manufacture date, when known
    pub manufacture_date: Option<NaiveDate>,
}

impl DeviceDraft {
    /// Validate the draft into registry input
    ///
    /// # Errors
    /// - Bad hardware id shape
    /// - URL without an http(s) scheme
    pub fn into_new_device(self) -> Result<NewDevice, ValidationError> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl(self.url));
        }
        let hardware_id = self.hid.map(HardwareId::new).transpose()?;

        Ok(NewDevice {
            url: self.url,
            hardware_id,
            kind: self.kind,
            manufacture_date: self.manufacture_date,
        })
    }
}

/// Shared fields every recorded event carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    /// Agent recording the event
    pub agent: AgentId,

    /// External identifier of the user performing the event
    pub by_user: String,

    /// Business timestamp, when the caller knows it
    pub occurred_at: Option<DateTime<Utc>>,

    /// Where the event happened, when reported
    pub location: Option<GeoPoint>,
}

impl EventContext {
    /// Context with just the required fields
    pub fn new(agent: AgentId, by_user: impl Into<String>) -> Self {
        Self {
            agent,
            by_user: by_user.into(),
            occurred_at: None,
            location: None,
        }
    }

    /// Attach the business timestamp
    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    /// Attach the reported location
    pub fn located(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }
}

/// Registration of a device together with its component inventory
///
/// A repeated registration of a known device is a snapshot: it reuses
/// the device record and appends a fresh Register event whose component
/// list becomes the new base set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// The device being registered
    pub device: DeviceDraft,

    /// Its components, created on the fly when unknown
    pub components: Vec<DeviceDraft>,

    /// Shared event fields
    pub context: EventContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_validation() {
        let draft = DeviceDraft {
            url: "https://a.example/d/1".to_string(),
            hid: Some("a-b-c".to_string()),
            kind: DeviceKind::Laptop,
            manufacture_date: None,
        };
        let new_device = draft.into_new_device().unwrap();
        assert_eq!(new_device.hardware_id.unwrap().as_str(), "a-b-c");
    }

    #[test]
    fn test_draft_rejects_bad_url() {
        let draft = DeviceDraft {
            url: "ftp://a.example/d/1".to_string(),
            hid: None,
            kind: DeviceKind::Laptop,
            manufacture_date: None,
        };
        assert!(matches!(
            draft.into_new_device(),
            Err(ValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_draft_rejects_bad_hardware_id() {
        let draft = DeviceDraft {
            url: "https://a.example/d/1".to_string(),
            hid: Some("nope".to_string()),
            kind: DeviceKind::Laptop,
            manufacture_date: None,
        };
        assert!(matches!(
            draft.into_new_device(),
            Err(ValidationError::HardwareId(_))
        ));
    }
}
