//! Pure string formatters for getting an annotated timeline out of the app.
//! The column layout and escaping rules here are a compatibility contract;
//! downstream spreadsheets already parse these exports.

use chrono::SecondsFormat;

use crate::models::Session;

/// CSV with one row per note. Fields containing commas, quotes, or newlines
/// are quoted with doubled internal quotes; elapsed time always carries three
/// decimal places.
pub fn to_csv(session: &Session, fps: f64) -> String {
    let mut lines = vec!["SessionName,Date,Label,ElapsedTime,Timecode,FPS,DeviceTimestamp".to_string()];
    for note in &session.notes {
        lines.push(
            [
                escape_csv(&session.name),
                escape_csv(&session.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
                escape_csv(&note.display_label()),
                format!("{:.3}", note.elapsed_seconds),
                escape_csv(&note.timecode),
                format!("{fps}"),
                escape_csv(
                    &note
                        .device_timestamp
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                ),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

/// One line per note: timecode, two spaces, label.
pub fn to_plain_text(session: &Session) -> String {
    session
        .notes
        .iter()
        .map(|note| format!("{}  {}", note.timecode, note.display_label()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered list with a header block, suitable for pasting into an email or
/// notes app.
pub fn to_email(session: &Session) -> String {
    let mut lines = vec![
        session.name.clone(),
        session.created_at.format("%B %e, %Y").to_string(),
        String::new(),
    ];
    for (n, note) in session.notes.iter().enumerate() {
        lines.push(format!("{}. {} - {}", n + 1, note.timecode, note.display_label()));
    }
    lines.join("\n")
}

/// Session name sanitized for use as an export filename.
pub fn export_filename(session_name: &str, extension: &str) -> String {
    let stem: String = session_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}.{extension}")
}

fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
