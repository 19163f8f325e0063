use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::note::Note;

/// Preset category selecting a default set of note button labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Genre {
    Default,
    Comedy,
    Action,
    Documentary,
}

impl Default for Genre {
    fn default() -> Self {
        Genre::Default
    }
}

impl Genre {
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Default => "default",
            Genre::Comedy => "comedy",
            Genre::Action => "action",
            Genre::Documentary => "documentary",
        }
    }

    /// The button-label preset installed when a screening of this genre is set up.
    pub fn button_labels(&self) -> Vec<String> {
        let labels: &[&str] = match self {
            Genre::Default => &[
                "edit",
                "music",
                "performance",
                "sound",
                "color",
                "VFX",
                "story",
                "other",
            ],
            Genre::Comedy => &[
                "funny",
                "not funny",
                "timing weird",
                "performance",
                "music",
                "other",
            ],
            Genre::Action => &[
                "VFX",
                "performance",
                "too long",
                "confusing",
                "music",
                "other",
            ],
            Genre::Documentary => &[
                "too long",
                "needs context",
                "re-order",
                "confusing",
                "story",
                "other",
            ],
        };
        labels.iter().map(|label| label.to_string()).collect()
    }
}

impl std::str::FromStr for Genre {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Genre::Default),
            "comedy" => Ok(Genre::Comedy),
            "action" => Ok(Genre::Action),
            "documentary" => Ok(Genre::Documentary),
            other => Err(crate::error::Error::Validation(format!(
                "unknown genre: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub genre: Genre,
    /// Elapsed-time snapshot taken at last save; the live value is owned by the
    /// timer while the session is active.
    #[serde(default)]
    pub elapsed_seconds: f64,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub button_labels: Vec<String>,
}

impl Session {
    pub fn new(name: String, genre: Genre, button_labels: Vec<String>) -> Self {
        Self {
            id: new_session_id(),
            name,
            created_at: Utc::now(),
            notes: Vec::new(),
            genre,
            elapsed_seconds: 0.0,
            is_running: false,
            button_labels,
        }
    }
}

/// Time-derived unique id. The random suffix keeps two sessions created within
/// the same millisecond from colliding.
pub fn new_session_id() -> String {
    format!(
        "{}-{:04x}",
        Utc::now().timestamp_millis(),
        rand::random::<u16>()
    )
}
