// MIT License - Copyright (c) 2026 Peter Wright
// Decoded SIA events

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ADM_CID_EVENT_QUALIFIER_CLOSE, ADM_CID_EVENT_QUALIFIER_OPEN, ADM_CID_PIMA_ZONE_STATUS_CODE,
};

/// A SIA ADM-CID event as decoded by the listener.
///
/// Only the three fields the bridge looks at are carried. `zone_reference`
/// is the raw "ri" field and is expected to hold a decimal zone number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiaEvent {
    pub event_type: String,
    pub event_qualifier: String,
    #[serde(default, alias = "ri")]
    pub zone_reference: Option<String>,
}

/// A zone open/close report extracted from an accepted [`SiaEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneReport {
    pub zone: u32,
    pub is_open: bool,
}

impl SiaEvent {
    pub fn new(
        event_type: impl Into<String>,
        event_qualifier: impl Into<String>,
        zone_reference: Option<&str>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            event_qualifier: event_qualifier.into(),
            zone_reference: zone_reference.map(str::to_string),
        }
    }

    /// Zone open report for `zone`.
    pub fn zone_open(zone: u32) -> Self {
        Self::new(
            ADM_CID_PIMA_ZONE_STATUS_CODE,
            ADM_CID_EVENT_QUALIFIER_OPEN,
            Some(&zone.to_string()),
        )
    }

    /// Zone close report for `zone`.
    pub fn zone_close(zone: u32) -> Self {
        Self::new(
            ADM_CID_PIMA_ZONE_STATUS_CODE,
            ADM_CID_EVENT_QUALIFIER_CLOSE,
            Some(&zone.to_string()),
        )
    }

    /// Extract a zone report, or `None` when the event is not a zone status
    /// change this bridge understands.
    pub fn zone_report(&self) -> Option<ZoneReport> {
        if self.event_type != ADM_CID_PIMA_ZONE_STATUS_CODE {
            return None;
        }
        let is_open = match self.event_qualifier.as_str() {
            ADM_CID_EVENT_QUALIFIER_OPEN => true,
            ADM_CID_EVENT_QUALIFIER_CLOSE => false,
            _ => return None,
        };
        let reference = self.zone_reference.as_deref()?;
        if reference.is_empty() || !reference.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // All-digit references only fail to parse on overflow
        let zone = reference.parse().ok()?;
        Some(ZoneReport { zone, is_open })
    }
}

/// Callback the listener invokes once per decoded event.
pub type EventCallback = Arc<dyn Fn(SiaEvent) + Send + Sync>;
