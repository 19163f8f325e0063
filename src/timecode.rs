//! Elapsed-time formatting: `HH:MM:SS` for display, `HH:MM:SS:FF` for
//! frame-accurate timecodes at a configurable frame rate.

/// Formats elapsed seconds as `HH:MM:SS`, truncating fractional seconds.
pub fn format_elapsed(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// Formats elapsed seconds as `HH:MM:SS:FF` where the frame count is the
/// fractional second scaled by `fps` and truncated.
pub fn format_timecode(seconds: f64, fps: f64) -> String {
    let seconds = seconds.max(0.0);
    let frames = (seconds.fract() * fps.max(0.0)) as u64;
    format!("{}:{frames:02}", format_elapsed(seconds))
}
