use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timestamped observation within a session. Immutable once recorded
/// except for `context`/`base_label` via an explicit edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub base_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub elapsed_seconds: f64,
    pub timecode: String,
    pub device_timestamp: DateTime<Utc>,
}

impl Note {
    /// `"base: context"` when free text was attached, otherwise just the base.
    pub fn display_label(&self) -> String {
        match &self.context {
            Some(context) => format!("{}: {}", self.base_label, context),
            None => self.base_label.clone(),
        }
    }
}

/// Canonical display form of a button label: title-case per word, with the
/// acronym "VFX" preserved uppercase regardless of input case.
pub fn canonical_label(label: &str) -> String {
    label
        .split(' ')
        .map(|word| {
            if word.eq_ignore_ascii_case("vfx") {
                "VFX".to_string()
            } else {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn vfx_is_preserved_uppercase_in_any_case() {
        assert_eq!(canonical_label("vfx"), "VFX");
        assert_eq!(canonical_label("Vfx"), "VFX");
        assert_eq!(canonical_label("VFX"), "VFX");
        assert_eq!(canonical_label("vfx glitch"), "VFX Glitch");
    }

    #[test]
    fn multi_word_labels_are_title_cased() {
        assert_eq!(canonical_label("not funny"), "Not Funny");
        assert_eq!(canonical_label("TIMING WEIRD"), "Timing Weird");
        assert_eq!(canonical_label("music"), "Music");
    }

    #[test]
    fn display_label_joins_context_with_colon() {
        let mut note = Note {
            base_label: "Other".to_string(),
            context: None,
            elapsed_seconds: 1.0,
            timecode: "00:00:01:00".to_string(),
            device_timestamp: Utc::now(),
        };
        assert_eq!(note.display_label(), "Other");
        note.context = Some("projector flicker".to_string());
        assert_eq!(note.display_label(), "Other: projector flicker");
    }
}
