use serde::{Deserialize, Serialize};

use super::session::Genre;
use crate::store::SessionStore;

pub const DEFAULT_FPS: f64 = 24.0;
pub const MAX_DIM_LEVEL: u8 = 85;
pub const MIN_BUTTON_LABELS: usize = 3;
pub const MAX_BUTTON_LABELS: usize = 10;

/// The persisted root: everything the app knows, serialized as one JSON blob
/// after every mutating operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    #[serde(flatten)]
    pub sessions: SessionStore,
    #[serde(default = "default_fps")]
    pub fps: f64,
    #[serde(default = "default_button_labels")]
    pub button_labels: Vec<String>,
    #[serde(default)]
    pub dim_level: u8,
    #[serde(default)]
    pub genre: Option<Genre>,
    #[serde(default)]
    pub screening_name: String,
    #[serde(default)]
    pub setup_complete: bool,
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self {
            sessions: SessionStore::default(),
            fps: DEFAULT_FPS,
            button_labels: default_button_labels(),
            dim_level: 0,
            genre: None,
            screening_name: String::new(),
            setup_complete: false,
        }
    }
}

impl ApplicationState {
    /// The state handed out when storage is missing, unreadable, or from an
    /// unknown schema version: everything zeroed, setup forced.
    pub fn setup_required() -> Self {
        Self::default()
    }

    /// Defensive reconciliation against partially-written or hand-edited
    /// storage. Applied on every load, independent of schema migrations.
    pub fn reconcile(&mut self) {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            self.fps = DEFAULT_FPS;
        }
        self.dim_level = self.dim_level.min(MAX_DIM_LEVEL);
        if self.button_labels.len() < MIN_BUTTON_LABELS
            || self.button_labels.len() > MAX_BUTTON_LABELS
        {
            self.button_labels = match self.genre {
                Some(genre) => genre.button_labels(),
                None => default_button_labels(),
            };
        }
        // setupComplete is trusted only when genre and name are both present.
        if self.genre.is_none() || self.screening_name.trim().is_empty() {
            self.setup_complete = false;
        }
        // A loaded session never resumes its timer automatically.
        if let Some(active) = self.sessions.active_mut() {
            active.is_running = false;
        }
    }
}

pub fn default_button_labels() -> Vec<String> {
    (1..=6).map(|n| format!("Note {n}")).collect()
}

fn default_fps() -> f64 {
    DEFAULT_FPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_complete_is_untrusted_without_genre_and_name() {
        let mut state = ApplicationState {
            setup_complete: true,
            ..ApplicationState::default()
        };
        state.reconcile();
        assert!(!state.setup_complete);

        state.genre = Some(Genre::Comedy);
        state.screening_name = "Preview 2".to_string();
        state.setup_complete = true;
        state.reconcile();
        assert!(state.setup_complete);
    }

    #[test]
    fn reconcile_repairs_out_of_range_fields() {
        let mut state = ApplicationState::default();
        state.fps = f64::NAN;
        state.dim_level = 100;
        state.button_labels = vec!["one".to_string()];
        state.reconcile();
        assert_eq!(state.fps, DEFAULT_FPS);
        assert_eq!(state.dim_level, MAX_DIM_LEVEL);
        assert_eq!(state.button_labels, default_button_labels());
    }

    #[test]
    fn reconcile_uses_genre_preset_when_labels_are_invalid() {
        let mut state = ApplicationState::default();
        state.genre = Some(Genre::Action);
        state.button_labels.clear();
        state.reconcile();
        assert_eq!(state.button_labels, Genre::Action.button_labels());
    }
}
