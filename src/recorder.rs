//! Note recording against the active session: append-only in real time, with
//! index-based edit/delete and a last-note undo. Out-of-range indices are
//! silent no-ops so a stale tap on an already-deleted row cannot fail loudly.

use chrono::Utc;
use log::info;

use crate::models::{canonical_label, Note, Session};
use crate::timecode::format_timecode;

/// Appends a note stamped with the timer's elapsed value at call time (not at
/// any later render time) and returns it for immediate inline use.
pub fn record(
    session: &mut Session,
    label: &str,
    context: Option<&str>,
    elapsed_seconds: f64,
    fps: f64,
) -> Note {
    let context = context
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);
    let note = Note {
        base_label: canonical_label(label),
        context,
        elapsed_seconds,
        timecode: format_timecode(elapsed_seconds, fps),
        device_timestamp: Utc::now(),
    };
    info!(
        "recorded note '{}' at {}",
        note.display_label(),
        note.timecode
    );
    session.notes.push(note.clone());
    note
}

/// Replaces the context of the note at `index`, leaving its label, elapsed
/// value, timecode, and timestamp untouched.
pub fn edit(session: &mut Session, index: usize, new_context: Option<&str>) {
    if let Some(note) = session.notes.get_mut(index) {
        note.context = new_context
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
    }
}

pub fn delete(session: &mut Session, index: usize) {
    if index < session.notes.len() {
        session.notes.remove(index);
    }
}

/// Removes and returns the most recently appended note.
pub fn undo_last(session: &mut Session) -> Option<Note> {
    session.notes.pop()
}

/// Empties the note list. Irreversible.
pub fn clear(session: &mut Session) {
    session.notes.clear();
}

/// Display-label tally in first-seen order, then sorted by count descending.
pub fn summary(session: &Session) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for note in &session.notes {
        let label = note.display_label();
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
