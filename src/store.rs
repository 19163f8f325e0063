//! Ownership of the active session and the bounded history of past sessions.
//! Exactly one session is active at a time; sessions move into history only
//! once they carry at least one note.

use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Genre, Session};

/// Completed sessions kept before the oldest is evicted.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStore {
    pub active_session: Option<Session>,
    #[serde(default)]
    pub session_history: Vec<Session>,
}

impl SessionStore {
    pub fn active(&self) -> Option<&Session> {
        self.active_session.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut Session> {
        self.active_session.as_mut()
    }

    pub fn history(&self) -> &[Session] {
        &self.session_history
    }

    pub fn find(&self, id: &str) -> Option<&Session> {
        self.active_session
            .as_ref()
            .filter(|session| session.id == id)
            .or_else(|| self.session_history.iter().find(|session| session.id == id))
    }

    /// Archives the current session (if it has notes), then installs a fresh
    /// one with a new id and zeroed elapsed time. An empty or whitespace-only
    /// name resolves to a dated default rather than erroring.
    pub fn create_session(
        &mut self,
        name: &str,
        genre: Genre,
        button_labels: Vec<String>,
    ) -> Session {
        self.archive_active();
        let name = resolve_session_name(name);
        let session = Session::new(name, genre, button_labels);
        info!("created session {} ({})", session.id, session.name);
        self.active_session = Some(session.clone());
        session
    }

    /// Archives the current session, then replaces it with a copy of the
    /// session matching `id`. The copy always comes back paused; a loaded
    /// session never resumes its timer automatically.
    pub fn load_session(&mut self, id: &str) -> Result<Session> {
        self.archive_active();
        let mut session = self
            .find(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        session.is_running = false;
        info!("loaded session {} ({})", session.id, session.name);
        self.active_session = Some(session.clone());
        Ok(session)
    }

    /// Renames wherever the session currently lives (active slot and any
    /// history entry). Whitespace-only names are rejected as a no-op.
    pub fn rename_session(&mut self, id: &str, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Ok(());
        }
        let mut found = false;
        if let Some(active) = self.active_session.as_mut().filter(|s| s.id == id) {
            active.name = new_name.to_string();
            found = true;
        }
        for session in self.session_history.iter_mut().filter(|s| s.id == id) {
            session.name = new_name.to_string();
            found = true;
        }
        if found {
            Ok(())
        } else {
            Err(Error::NotFound(id.to_string()))
        }
    }

    /// Removes a session from history. Deleting the in-use session is refused;
    /// deleting an id that is not there is a no-op.
    pub fn delete_session(&mut self, id: &str) -> Result<()> {
        if self
            .active_session
            .as_ref()
            .is_some_and(|active| active.id == id)
        {
            return Err(Error::InvalidOperation("cannot delete the active session"));
        }
        self.session_history.retain(|session| session.id != id);
        Ok(())
    }

    /// Upserts a copy of the active session into history when it has at least
    /// one note, then evicts the oldest entries beyond the limit. Sessions
    /// without notes never land in history. The active slot itself is left in
    /// place until a replacement is installed.
    fn archive_active(&mut self) {
        let Some(active) = self.active_session.as_ref() else {
            return;
        };
        if active.notes.is_empty() {
            return;
        }
        let mut snapshot = active.clone();
        snapshot.is_running = false;
        match self
            .session_history
            .iter_mut()
            .find(|session| session.id == snapshot.id)
        {
            Some(existing) => *existing = snapshot,
            None => self.session_history.push(snapshot),
        }
        while self.session_history.len() > HISTORY_LIMIT {
            let oldest = self
                .session_history
                .iter()
                .enumerate()
                .min_by_key(|(_, session)| session.created_at)
                .map(|(index, _)| index);
            match oldest {
                Some(index) => {
                    let evicted = self.session_history.remove(index);
                    info!("evicted session {} from history", evicted.id);
                }
                None => break,
            }
        }
    }
}

fn resolve_session_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        format!("Session {}", Utc::now().format("%Y-%m-%d %H:%M"))
    } else {
        name.to_string()
    }
}
