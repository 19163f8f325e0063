//! Versioned upgrade chain for the persisted state blob. Each step maps one
//! stored schema version to the next and is applied sequentially, so any
//! supported older version walks forward to the current layout.
//!
//! Version history:
//! - v1: notes carry a single combined `label` string ("Base: context")
//! - v2: notes split into `baseLabel` + optional `context`
//! - v3: sessions carry their own `buttonLabels`; root carries `dimLevel`

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};

pub const SCHEMA_VERSION: u32 = 3;

pub fn migrate(mut state: Value, from_version: u32) -> Result<Value> {
    if from_version > SCHEMA_VERSION {
        bail!(
            "stored version ({}) is newer than supported schema ({})",
            from_version,
            SCHEMA_VERSION
        );
    }
    let mut version = from_version;
    while version < SCHEMA_VERSION {
        let next_version = version + 1;
        state = apply_migration(state, next_version)
            .with_context(|| format!("migration to version {next_version} failed"))?;
        version = next_version;
    }
    Ok(state)
}

fn apply_migration(state: Value, version: u32) -> Result<Value> {
    match version {
        2 => Ok(split_combined_labels(state)),
        3 => Ok(add_per_session_settings(state)),
        _ => bail!("unknown migration target version: {version}"),
    }
}

/// v1 -> v2: split each note's combined `label` on the first colon into
/// `baseLabel` and optional `context`, and drop the derived `elapsedHMS`
/// field that v1 stored alongside the timecode.
fn split_combined_labels(mut state: Value) -> Value {
    for_each_session(&mut state, |session| {
        let Some(notes) = session.get_mut("notes").and_then(Value::as_array_mut) else {
            return;
        };
        for note in notes {
            let Some(fields) = note.as_object_mut() else {
                continue;
            };
            fields.remove("elapsedHMS");
            if fields.contains_key("baseLabel") {
                continue;
            }
            let Some(label) = fields.remove("label").and_then(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            }) else {
                continue;
            };
            match label.split_once(':') {
                Some((base, context)) if !context.trim().is_empty() => {
                    fields.insert("baseLabel".to_string(), json!(base.trim()));
                    fields.insert("context".to_string(), json!(context.trim()));
                }
                _ => {
                    fields.insert("baseLabel".to_string(), json!(label.trim()));
                }
            }
        }
    });
    state
}

/// v2 -> v3: sessions gain their own `buttonLabels` (seeded from the root
/// set) and the root gains `dimLevel`.
fn add_per_session_settings(mut state: Value) -> Value {
    let root_labels = state.get("buttonLabels").cloned().unwrap_or(json!([]));
    for_each_session(&mut state, |session| {
        let Some(fields) = session.as_object_mut() else {
            return;
        };
        fields
            .entry("buttonLabels")
            .or_insert_with(|| root_labels.clone());
    });
    if let Some(root) = state.as_object_mut() {
        root.entry("dimLevel").or_insert(json!(0));
    }
    state
}

/// Ceiling for stored elapsed values. Keeps anything a hand-edited or mangled
/// blob carries representable as a `Duration` downstream.
const MAX_ELAPSED_SECONDS: f64 = 1.0e12;

/// Defensive numeric coercion applied on every load, independent of the
/// migration chain: numbers stored as strings are parsed, unparsable values
/// fall back to defaults instead of failing the whole load. Elapsed values
/// are clamped to `0..=MAX_ELAPSED_SECONDS`; elapsed time is never negative.
pub fn coerce_numeric_fields(mut state: Value) -> Value {
    if let Some(root) = state.as_object_mut() {
        coerce_number(root, "fps", 24.0);
        let dim = root
            .get("dimLevel")
            .and_then(as_f64_lossy)
            .unwrap_or(0.0)
            .clamp(0.0, 85.0);
        root.insert("dimLevel".to_string(), json!(dim as u64));
    }
    for_each_session(&mut state, |session| {
        let Some(fields) = session.as_object_mut() else {
            return;
        };
        coerce_elapsed(fields);
        let Some(notes) = fields.get_mut("notes").and_then(Value::as_array_mut) else {
            return;
        };
        for note in notes {
            if let Some(note_fields) = note.as_object_mut() {
                coerce_elapsed(note_fields);
            }
        }
    });
    state
}

fn coerce_number(fields: &mut serde_json::Map<String, Value>, key: &str, fallback: f64) {
    if let Some(value) = fields.get(key) {
        let coerced = as_f64_lossy(value).filter(|n| n.is_finite()).unwrap_or(fallback);
        fields.insert(key.to_string(), json!(coerced));
    }
}

fn coerce_elapsed(fields: &mut serde_json::Map<String, Value>) {
    if let Some(value) = fields.get("elapsedSeconds") {
        let coerced = as_f64_lossy(value)
            .filter(|n| n.is_finite())
            .unwrap_or(0.0)
            .clamp(0.0, MAX_ELAPSED_SECONDS);
        fields.insert("elapsedSeconds".to_string(), json!(coerced));
    }
}

fn as_f64_lossy(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn for_each_session(state: &mut Value, mut f: impl FnMut(&mut Value)) {
    if let Some(active) = state.get_mut("activeSession") {
        if !active.is_null() {
            f(active);
        }
    }
    if let Some(history) = state.get_mut("sessionHistory").and_then(Value::as_array_mut) {
        for session in history {
            f(session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1_blob() -> Value {
        json!({
            "activeSession": {
                "id": "1700000000000",
                "name": "Rough Cut",
                "createdAt": "2024-01-05T20:00:00.000Z",
                "notes": [
                    {
                        "label": "Other: scene 4: too dark",
                        "elapsedSeconds": "65.2",
                        "elapsedHMS": "00:01:05",
                        "timecode": "00:01:05:04",
                        "deviceTimestamp": "2024-01-05T20:01:05.200Z"
                    },
                    {
                        "label": "Music",
                        "elapsedSeconds": 70.0,
                        "elapsedHMS": "00:01:10",
                        "timecode": "00:01:10:00",
                        "deviceTimestamp": "2024-01-05T20:01:10.000Z"
                    }
                ]
            },
            "sessionHistory": [],
            "fps": 24,
            "buttonLabels": ["edit", "music", "other"],
            "genre": "default",
            "screeningName": "Rough Cut",
            "setupComplete": true
        })
    }

    #[test]
    fn v1_labels_split_on_first_colon_only() {
        let migrated = migrate(v1_blob(), 1).unwrap();
        let notes = &migrated["activeSession"]["notes"];
        assert_eq!(notes[0]["baseLabel"], "Other");
        assert_eq!(notes[0]["context"], "scene 4: too dark");
        assert!(notes[0].get("label").is_none());
        assert!(notes[0].get("elapsedHMS").is_none());

        assert_eq!(notes[1]["baseLabel"], "Music");
        assert!(notes[1].get("context").is_none());
    }

    #[test]
    fn v2_to_v3_seeds_session_labels_and_dim_level() {
        let migrated = migrate(v1_blob(), 1).unwrap();
        assert_eq!(
            migrated["activeSession"]["buttonLabels"],
            json!(["edit", "music", "other"])
        );
        assert_eq!(migrated["dimLevel"], 0);
    }

    #[test]
    fn migration_steps_are_independently_applicable() {
        let v2 = apply_migration(v1_blob(), 2).unwrap();
        assert_eq!(v2["activeSession"]["notes"][0]["baseLabel"], "Other");
        assert!(v2["activeSession"].get("buttonLabels").is_none());

        let v3 = apply_migration(v2, 3).unwrap();
        assert!(v3["activeSession"].get("buttonLabels").is_some());
    }

    #[test]
    fn newer_stored_version_is_rejected() {
        assert!(migrate(v1_blob(), SCHEMA_VERSION + 1).is_err());
    }

    #[test]
    fn coercion_parses_string_numbers_and_clamps_dim() {
        let state = json!({
            "activeSession": null,
            "sessionHistory": [],
            "fps": "29.97",
            "dimLevel": 200
        });
        let coerced = coerce_numeric_fields(state);
        assert_eq!(coerced["fps"], 29.97);
        assert_eq!(coerced["dimLevel"], 85);
    }

    #[test]
    fn coercion_defaults_unparsable_elapsed_to_zero() {
        let state = json!({
            "activeSession": {
                "id": "x",
                "elapsedSeconds": "not a number",
                "notes": [{ "elapsedSeconds": "oops" }]
            }
        });
        let coerced = coerce_numeric_fields(state);
        assert_eq!(coerced["activeSession"]["elapsedSeconds"], 0.0);
        assert_eq!(coerced["activeSession"]["notes"][0]["elapsedSeconds"], 0.0);
    }

    #[test]
    fn coercion_clamps_elapsed_into_a_sane_range() {
        let state = json!({
            "activeSession": {
                "id": "x",
                "elapsedSeconds": -5.0,
                "notes": [
                    { "elapsedSeconds": -0.25 },
                    { "elapsedSeconds": 1e20 }
                ]
            },
            "sessionHistory": [{ "id": "y", "elapsedSeconds": "-12.5", "notes": [] }]
        });
        let coerced = coerce_numeric_fields(state);
        assert_eq!(coerced["activeSession"]["elapsedSeconds"], 0.0);
        assert_eq!(coerced["activeSession"]["notes"][0]["elapsedSeconds"], 0.0);
        assert_eq!(
            coerced["activeSession"]["notes"][1]["elapsedSeconds"],
            MAX_ELAPSED_SECONDS
        );
        assert_eq!(coerced["sessionHistory"][0]["elapsedSeconds"], 0.0);
    }
}
