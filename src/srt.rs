//! Artifact writer for plain-text transcripts and SRT subtitle files.

use std::fs;
use std::path::Path;

use crate::error::{Result, ScribeError};
use crate::stamp::SourceStamp;
use crate::transcribe::Transcription;

/// Write the transcript as UTF-8 plain text with a trailing newline.
pub fn write_transcript(result: &Transcription, path: &Path) -> Result<()> {
    let mut text = result.text.trim().to_string();
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

/// Write numbered subtitle blocks preceded by the source stamp header.
pub fn write_srt(result: &Transcription, path: &Path, stamp: &SourceStamp) -> Result<()> {
    if result.segments.is_empty() {
        return Err(ScribeError::Transcription(
            "no segments to write subtitles from".to_string(),
        ));
    }

    let mut out = String::new();
    for line in stamp.header_lines() {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');

    for (i, segment) in result.segments.iter().enumerate() {
        let start = segment.start.max(0.0);
        let end = segment.end.max(start);
        out.push_str(&format!("{}\n", i + 1));
        out.push_str(&format!(
            "{} --> {}\n",
            format_timestamp(start),
            format_timestamp(end)
        ));
        out.push_str(segment.text.trim());
        out.push_str("\n\n");
    }

    fs::write(path, out)?;
    Ok(())
}

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Rounded to the millisecond, clamped non-negative.
pub fn format_timestamp(seconds: f64) -> String {
    let clamped = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let total_ms = (clamped * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;

    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, ms)
}
