// MIT License - Copyright (c) 2026 Peter Wright
// Protocol and integration constants

/// Integration domain, used as the entity id prefix and device identifier namespace.
pub const DOMAIN: &str = "pima_force";
/// Human-readable integration title; entries are titled `"<TITLE> <port>"`.
pub const TITLE: &str = "Pima Force";

/// Default port the SIA listener accepts panel connections on.
pub const DEFAULT_LISTENING_PORT: u16 = 10001;

pub const DEVICE_NAME: &str = "Pima Force";
pub const DEVICE_MANUFACTURER: &str = "Pima";
pub const DEVICE_MODEL: &str = "Force";
/// Zones are presented as door sensors.
pub const DEVICE_CLASS_DOOR: &str = "door";

/// Published state labels.
pub const STATE_ON: &str = "on";
pub const STATE_OFF: &str = "off";

/// Zone attribute keys.
pub const ATTR_LAST_OPEN: &str = "last_open";
pub const ATTR_LAST_CLOSE: &str = "last_close";
pub const ATTR_LAST_TOGGLE: &str = "last_toggle";
pub const ATTR_ZONE: &str = "zone";

/// Response qualifier Pima panels expect in the ACK to keep the link open.
pub const SIA_PIMA_KEEP_CONNECTED_QUALIFIER: &str = "KC";

/// ADM-CID event code Pima uses for zone open/close reports.
pub const ADM_CID_PIMA_ZONE_STATUS_CODE: &str = "760";
/// ADM-CID qualifier for a zone that opened.
pub const ADM_CID_EVENT_QUALIFIER_OPEN: &str = "1";
/// ADM-CID qualifier for a zone that closed.
pub const ADM_CID_EVENT_QUALIFIER_CLOSE: &str = "3";

/// Capacity of the in-process decoded event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;
