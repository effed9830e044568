// Schema validation tests for the zone state JSON lines
//
// Most tests construct JSON values directly (independent of Rust structs)
// and validate them against schemas/zone_state.schema.json. The last few
// drive real sensors and validate what they publish.

use std::io::Write;
use std::sync::{Arc, Mutex};

use chrono::DateTime;
use serde_json::json;

use pima_force_bridge::{
    FixedClock, JsonLinesPublisher, MemoryRestoreStore, RestoredState, ZoneAttributes,
    ZoneSensor, ZoneTracker,
};

fn load_schema() -> serde_json::Value {
    let path = format!("{}/schemas/zone_state.schema.json", env!("CARGO_MANIFEST_DIR"));
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read schema {path}: {e}"));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("Failed to parse schema {path}: {e}"))
}

fn build_validator() -> jsonschema::Validator {
    jsonschema::validator_for(&load_schema())
        .unwrap_or_else(|e| panic!("Failed to compile zone state schema: {e}"))
}

fn validate(instance: &serde_json::Value) {
    let validator = build_validator();
    let errors: Vec<_> = validator.iter_errors(instance).collect();
    if !errors.is_empty() {
        let msgs: Vec<String> = errors.iter().map(|e| format!("  - {e}")).collect();
        panic!(
            "Schema validation failed:\n{}\nInstance: {}",
            msgs.join("\n"),
            serde_json::to_string_pretty(instance).unwrap()
        );
    }
}

fn validate_fails(instance: &serde_json::Value) {
    let validator = build_validator();
    assert!(
        !validator.is_valid(instance),
        "Expected schema validation to fail, but it passed.\nInstance: {}",
        serde_json::to_string_pretty(instance).unwrap()
    );
}

fn open_zone() -> serde_json::Value {
    json!({
        "entity_id": "binary_sensor.pima_force_10001_zone2",
        "unique_id": "pima_force_10001_2",
        "name": "Front Door",
        "device_class": "door",
        "state": "on",
        "attributes": {
            "last_open": "2026-03-01T08:15:00+02:00",
            "last_close": null,
            "last_toggle": "2026-03-01T08:15:00+02:00",
            "zone": 2
        }
    })
}

// =========================================================================
// Hand-built payloads
// =========================================================================

#[test]
fn zone_state_open() {
    validate(&open_zone());
}

#[test]
fn zone_state_never_toggled() {
    validate(&json!({
        "entity_id": "binary_sensor.pima_force_10001_zone1",
        "unique_id": "pima_force_10001_1",
        "name": "Hall",
        "device_class": "door",
        "state": "off",
        "attributes": {
            "last_open": null,
            "last_close": null,
            "last_toggle": null,
            "zone": 1
        }
    }));
}

#[test]
fn zone_state_fractional_seconds() {
    let mut instance = open_zone();
    instance["attributes"]["last_close"] = json!("2026-03-01T08:16:02.123456Z");
    validate(&instance);
}

#[test]
fn zone_state_unknown_state() {
    let mut instance = open_zone();
    instance["state"] = json!("open");
    validate_fails(&instance);
}

#[test]
fn zone_state_wrong_device_class() {
    let mut instance = open_zone();
    instance["device_class"] = json!("window");
    validate_fails(&instance);
}

#[test]
fn zone_state_zone_zero() {
    let mut instance = open_zone();
    instance["attributes"]["zone"] = json!(0);
    validate_fails(&instance);
}

#[test]
fn zone_state_numeric_timestamp() {
    let mut instance = open_zone();
    instance["attributes"]["last_open"] = json!(1772345700);
    validate_fails(&instance);
}

#[test]
fn zone_state_missing_attributes() {
    let mut instance = open_zone();
    instance.as_object_mut().unwrap().remove("attributes");
    validate_fails(&instance);
}

#[test]
fn zone_state_extra_field() {
    let mut instance = open_zone();
    instance["extra"] = json!(true);
    validate_fails(&instance);
}

// =========================================================================
// Published by real sensors
// =========================================================================

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn lines(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

fn sensor(buffer: &SharedBuffer, zone: u32, name: &str) -> ZoneSensor {
    let now = DateTime::parse_from_rfc3339("2026-03-01T08:15:00+02:00").unwrap();
    ZoneSensor::new(
        "pima_force_10001",
        10001,
        zone,
        name,
        Arc::new(FixedClock(now)),
        Arc::new(JsonLinesPublisher::new(buffer.clone())),
    )
}

#[test]
fn published_states_match_schema() {
    let buffer = SharedBuffer::default();
    let sensor = sensor(&buffer, 3, "Back Door");
    sensor.attach(&MemoryRestoreStore::new());

    let mut tracker = ZoneTracker::new();
    tracker.set(3, true);
    assert!(sensor.handle_update(&tracker));
    tracker.set(3, false);
    assert!(sensor.handle_update(&tracker));

    let lines = buffer.lines();
    assert_eq!(lines.len(), 3);
    for line in &lines {
        validate(line);
    }
    assert_eq!(lines[0]["state"], "off");
    assert_eq!(lines[1]["state"], "on");
    assert_eq!(lines[2]["state"], "off");
    assert_eq!(lines[2]["attributes"]["zone"], 3);
}

#[test]
fn restored_state_matches_schema() {
    let buffer = SharedBuffer::default();
    let sensor = sensor(&buffer, 5, "Garage");
    let opened = DateTime::parse_from_rfc3339("2026-02-27T22:01:09-05:00").unwrap();
    let store = MemoryRestoreStore::new();
    store.save(
        sensor.entity_id(),
        RestoredState::new(
            "on",
            ZoneAttributes {
                last_open: Some(opened),
                last_close: None,
                last_toggle: Some(opened),
            },
        ),
    );
    sensor.attach(&store);

    let lines = buffer.lines();
    assert_eq!(lines.len(), 1);
    validate(&lines[0]);
    assert_eq!(lines[0]["state"], "on");
    assert!(lines[0]["attributes"]["last_close"].is_null());
}
