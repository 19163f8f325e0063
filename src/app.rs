//! Application controller: an explicitly owned state container wiring the
//! timer, the session store, and the persistence gateway. Every mutating
//! operation persists afterwards; saves are fire-and-forget.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::export;
use crate::models::{
    ApplicationState, Genre, Note, Session, MAX_BUTTON_LABELS, MIN_BUTTON_LABELS,
};
use crate::persist::PersistenceGateway;
use crate::recorder;
use crate::timer::{TimerController, TimerSnapshot, TimerStatus};

pub struct App {
    state: ApplicationState,
    timer: TimerController,
    gateway: PersistenceGateway,
}

impl App {
    /// Loads persisted state from `data_dir` and hydrates the timer from the
    /// active session's elapsed snapshot (always paused, never auto-running).
    pub async fn open(data_dir: impl Into<PathBuf>) -> Self {
        let gateway = PersistenceGateway::new(data_dir);
        let state = gateway.load();
        let timer = TimerController::new();
        if let Some(active) = state.sessions.active() {
            timer.restore(active.elapsed_seconds).await;
        }
        Self {
            state,
            timer,
            gateway,
        }
    }

    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    pub fn timer(&self) -> &TimerController {
        &self.timer
    }

    pub fn setup_required(&self) -> bool {
        !self.state.setup_complete
    }

    /// Finishes first-run setup: installs the genre's button preset, names the
    /// screening (empty defaults to "Untitled Screening"), and opens a fresh
    /// session.
    pub async fn complete_setup(&mut self, screening_name: &str, genre: Genre) -> Session {
        let name = screening_name.trim();
        let name = if name.is_empty() {
            "Untitled Screening".to_string()
        } else {
            name.to_string()
        };
        self.state.screening_name = name.clone();
        self.state.genre = Some(genre);
        self.state.button_labels = genre.button_labels();
        self.state.setup_complete = true;
        let session =
            self.state
                .sessions
                .create_session(&name, genre, self.state.button_labels.clone());
        self.timer.reset().await;
        self.persist().await;
        session
    }

    pub async fn toggle_timer(&mut self) {
        self.timer.toggle().await;
        self.persist().await;
    }

    pub async fn start_timer(&mut self) {
        self.timer.start().await;
        self.persist().await;
    }

    pub async fn pause_timer(&mut self) {
        self.timer.pause().await;
        self.persist().await;
    }

    pub async fn timer_snapshot(&self) -> TimerSnapshot {
        self.timer.snapshot().await
    }

    /// Stamps a note with the timer's elapsed value at this instant.
    pub async fn record_note(&mut self, label: &str, context: Option<&str>) -> Result<Note> {
        let elapsed = self.timer.elapsed_seconds().await;
        let fps = self.state.fps;
        let Some(active) = self.state.sessions.active_mut() else {
            return Err(Error::InvalidOperation("no active session"));
        };
        let note = recorder::record(active, label, context, elapsed, fps);
        self.persist().await;
        Ok(note)
    }

    pub async fn edit_note(&mut self, index: usize, new_context: Option<&str>) {
        if let Some(active) = self.state.sessions.active_mut() {
            recorder::edit(active, index, new_context);
            self.persist().await;
        }
    }

    pub async fn delete_note(&mut self, index: usize) {
        if let Some(active) = self.state.sessions.active_mut() {
            recorder::delete(active, index);
            self.persist().await;
        }
    }

    pub async fn undo_last_note(&mut self) -> Option<Note> {
        let undone = self.state.sessions.active_mut().and_then(recorder::undo_last);
        if undone.is_some() {
            self.persist().await;
        }
        undone
    }

    pub async fn clear_notes(&mut self) {
        if let Some(active) = self.state.sessions.active_mut() {
            recorder::clear(active);
            self.persist().await;
        }
    }

    pub fn note_summary(&self) -> Vec<(String, usize)> {
        self.state
            .sessions
            .active()
            .map(recorder::summary)
            .unwrap_or_default()
    }

    /// Opens a new session under the current genre and button set, archiving
    /// the old one if it has notes. Resets the timer. Refused until first-run
    /// setup has picked a genre and named the screening.
    pub async fn new_session(&mut self, name: &str) -> Result<Session> {
        if !self.state.setup_complete {
            return Err(Error::InvalidOperation("setup has not been completed"));
        }
        let genre = self.state.genre.unwrap_or_default();
        let session =
            self.state
                .sessions
                .create_session(name, genre, self.state.button_labels.clone());
        self.timer.reset().await;
        self.persist().await;
        Ok(session)
    }

    /// Switches to a stored session; restores its button labels and elapsed
    /// snapshot (paused).
    pub async fn load_session(&mut self, id: &str) -> Result<Session> {
        let session = self.state.sessions.load_session(id)?;
        if !session.button_labels.is_empty() {
            self.state.button_labels = session.button_labels.clone();
        }
        self.state.genre = Some(session.genre);
        self.timer.restore(session.elapsed_seconds).await;
        self.persist().await;
        Ok(session)
    }

    pub async fn rename_session(&mut self, id: &str, new_name: &str) -> Result<()> {
        self.state.sessions.rename_session(id, new_name)?;
        self.persist().await;
        Ok(())
    }

    pub async fn delete_session(&mut self, id: &str) -> Result<()> {
        self.state.sessions.delete_session(id)?;
        self.persist().await;
        Ok(())
    }

    /// Replaces the button set. Counts outside 3-10 are rejected. Labels are
    /// stored lowercase (VFX excepted) and capitalized for display.
    pub async fn set_button_labels(&mut self, labels: Vec<String>) -> Result<()> {
        let labels: Vec<String> = labels
            .iter()
            .map(|label| label.trim())
            .filter(|label| !label.is_empty())
            .map(|label| {
                if label.eq_ignore_ascii_case("vfx") {
                    "VFX".to_string()
                } else {
                    label.to_lowercase()
                }
            })
            .collect();
        if labels.len() < MIN_BUTTON_LABELS || labels.len() > MAX_BUTTON_LABELS {
            return Err(Error::Validation(format!(
                "expected {MIN_BUTTON_LABELS} to {MAX_BUTTON_LABELS} button labels, got {}",
                labels.len()
            )));
        }
        self.state.button_labels = labels.clone();
        if let Some(active) = self.state.sessions.active_mut() {
            active.button_labels = labels;
        }
        self.persist().await;
        Ok(())
    }

    pub async fn set_fps(&mut self, fps: f64) -> Result<()> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(Error::Validation(format!("fps must be positive, got {fps}")));
        }
        self.state.fps = fps;
        self.persist().await;
        Ok(())
    }

    pub async fn set_dim_level(&mut self, level: u8) {
        self.state.dim_level = level.min(crate::models::MAX_DIM_LEVEL);
        self.persist().await;
    }

    pub fn export_csv(&self) -> Result<String> {
        let session = self.exportable_session()?;
        Ok(export::to_csv(session, self.state.fps))
    }

    pub fn export_text(&self) -> Result<String> {
        Ok(export::to_plain_text(self.exportable_session()?))
    }

    pub fn export_email(&self) -> Result<String> {
        Ok(export::to_email(self.exportable_session()?))
    }

    fn exportable_session(&self) -> Result<&Session> {
        self.state
            .sessions
            .active()
            .filter(|session| !session.notes.is_empty())
            .ok_or(Error::InvalidOperation("no notes to export"))
    }

    /// Snapshots the live timer into the active session, then saves. Storage
    /// failures are logged inside the gateway, never surfaced here.
    async fn persist(&mut self) {
        let snapshot = self.timer.snapshot().await;
        if let Some(active) = self.state.sessions.active_mut() {
            active.elapsed_seconds = snapshot.elapsed_seconds;
            active.is_running = snapshot.status == TimerStatus::Running;
        }
        self.gateway.save(&self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::tempdir;

    #[tokio::test]
    async fn setup_installs_genre_preset_and_opens_a_session() {
        let dir = tempdir().unwrap();
        let mut app = App::open(dir.path()).await;
        assert!(app.setup_required());

        app.complete_setup("  ", Genre::Comedy).await;
        assert!(!app.setup_required());
        assert_eq!(app.state().screening_name, "Untitled Screening");
        assert_eq!(app.state().button_labels, Genre::Comedy.button_labels());
        assert!(app.state().sessions.active().is_some());
    }

    #[tokio::test]
    async fn record_without_a_session_is_an_invalid_operation() {
        let dir = tempdir().unwrap();
        let mut app = App::open(dir.path()).await;
        let err = app.record_note("music", None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn recorded_note_carries_canonical_label_and_timer_elapsed() {
        let dir = tempdir().unwrap();
        let mut app = App::open(dir.path()).await;
        app.complete_setup("Night One", Genre::Action).await;
        app.start_timer().await;

        let note = app.record_note("vfx", None).await.unwrap();
        assert_eq!(note.base_label, "VFX");
        assert!(note.elapsed_seconds >= 0.0);
        app.pause_timer().await;
    }

    #[tokio::test]
    async fn button_label_count_is_validated_to_3_through_10() {
        let dir = tempdir().unwrap();
        let mut app = App::open(dir.path()).await;
        app.complete_setup("Night One", Genre::Default).await;

        let two = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(
            app.set_button_labels(two).await,
            Err(Error::Validation(_))
        ));

        let three: Vec<String> = (0..3).map(|n| format!("label {n}")).collect();
        app.set_button_labels(three).await.unwrap();

        let ten: Vec<String> = (0..10).map(|n| format!("label {n}")).collect();
        app.set_button_labels(ten).await.unwrap();
        assert_eq!(app.state().button_labels.len(), 10);

        let eleven: Vec<String> = (0..11).map(|n| format!("label {n}")).collect();
        assert!(app.set_button_labels(eleven).await.is_err());
    }

    #[tokio::test]
    async fn labels_are_stored_lowercase_except_vfx() {
        let dir = tempdir().unwrap();
        let mut app = App::open(dir.path()).await;
        app.complete_setup("Night One", Genre::Default).await;

        app.set_button_labels(vec![
            "Funny".to_string(),
            "vfx".to_string(),
            "Too Long".to_string(),
        ])
        .await
        .unwrap();
        assert_eq!(app.state().button_labels, vec!["funny", "VFX", "too long"]);
    }

    #[tokio::test]
    async fn reopening_restores_the_session_paused() {
        let dir = tempdir().unwrap();
        {
            let mut app = App::open(dir.path()).await;
            app.complete_setup("Night One", Genre::Default).await;
            app.start_timer().await;
            app.record_note("music", None).await.unwrap();
        }

        let app = App::open(dir.path()).await;
        assert!(!app.setup_required());
        let active = app.state().sessions.active().unwrap();
        assert_eq!(active.notes.len(), 1);
        assert!(!active.is_running);
        assert_ne!(
            app.timer_snapshot().await.status,
            TimerStatus::Running
        );
    }

    #[tokio::test]
    async fn opening_with_an_oversized_stored_elapsed_stays_sane() {
        let dir = tempdir().unwrap();
        {
            let mut app = App::open(dir.path()).await;
            app.complete_setup("Night One", Genre::Default).await;
        }
        // Mangle the stored blob directly, the way a hand edit would.
        let state_path = dir.path().join("state.json");
        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&state_path).unwrap()).unwrap();
        value["activeSession"]["elapsedSeconds"] = serde_json::json!(1e20);
        std::fs::write(&state_path, value.to_string()).unwrap();

        let app = App::open(dir.path()).await;
        let snapshot = app.timer_snapshot().await;
        assert!(snapshot.elapsed_seconds.is_finite());
        assert!(snapshot.elapsed_seconds >= 0.0);
        assert_ne!(snapshot.status, TimerStatus::Running);
    }

    #[tokio::test]
    async fn loading_a_session_restores_its_button_labels() {
        let dir = tempdir().unwrap();
        let mut app = App::open(dir.path()).await;
        app.complete_setup("Night One", Genre::Comedy).await;
        app.record_note("funny", None).await.unwrap();
        let first_id = app.state().sessions.active().unwrap().id.clone();

        app.new_session("Second Pass").await.unwrap();
        app.set_button_labels((0..4).map(|n| format!("alt {n}")).collect())
            .await
            .unwrap();

        app.load_session(&first_id).await.unwrap();
        assert_eq!(app.state().button_labels, Genre::Comedy.button_labels());
    }

    #[tokio::test]
    async fn new_session_is_refused_before_setup() {
        let dir = tempdir().unwrap();
        let mut app = App::open(dir.path()).await;
        assert!(app.setup_required());

        let err = app.new_session("Sneaky").await.unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
        assert!(app.state().sessions.active().is_none());

        app.complete_setup("Night One", Genre::Default).await;
        app.new_session("After Setup").await.unwrap();
        assert_eq!(app.state().sessions.active().unwrap().name, "After Setup");
    }

    #[tokio::test]
    async fn exports_require_at_least_one_note() {
        let dir = tempdir().unwrap();
        let mut app = App::open(dir.path()).await;
        app.complete_setup("Night One", Genre::Default).await;
        assert!(app.export_csv().is_err());

        app.record_note("music", None).await.unwrap();
        let csv = app.export_csv().unwrap();
        assert!(csv.lines().count() == 2);
        assert!(app.export_text().unwrap().contains("Music"));
        assert!(app.export_email().unwrap().contains("1. "));
    }

    #[tokio::test]
    async fn undo_after_record_restores_the_previous_list() {
        let dir = tempdir().unwrap();
        let mut app = App::open(dir.path()).await;
        app.complete_setup("Night One", Genre::Default).await;
        app.record_note("music", None).await.unwrap();
        let before = app.state().sessions.active().unwrap().notes.clone();

        app.record_note("story", Some("slow start")).await.unwrap();
        let undone = app.undo_last_note().await.unwrap();
        assert_eq!(undone.base_label, "Story");
        assert_eq!(app.state().sessions.active().unwrap().notes, before);
    }
}
