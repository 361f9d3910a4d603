//! Decides whether existing local artifacts make re-download and
//! re-transcription unnecessary.
//!
//! A download plus transcription is expensive; the subtitle file's source
//! stamp makes the whole pipeline idempotent on a cheap metadata comparison
//! instead of a content hash that would require downloading first.

use std::path::{Path, PathBuf};

use crate::models::FileMetadata;
use crate::stamp::SourceStamp;

/// Outcome of the skip check.
#[derive(Debug, Clone)]
pub struct SkipDecision {
    pub skip: bool,
    pub reason: String,
}

impl SkipDecision {
    fn skip(reason: impl Into<String>) -> Self {
        Self {
            skip: true,
            reason: reason.into(),
        }
    }

    fn work(reason: impl Into<String>) -> Self {
        Self {
            skip: false,
            reason: reason.into(),
        }
    }
}

/// Expected subtitle path next to a video path.
pub fn srt_path_for(video_path: &Path) -> PathBuf {
    video_path.with_extension("srt")
}

/// Decide whether work for `video_path` can be skipped.
///
/// Skips iff a subtitle file exists next to the expected video path, its
/// stamp matches the current remote owner and modified time exactly, and
/// `force` was not given.
pub fn should_skip(video_path: &Path, metadata: &FileMetadata, force: bool) -> SkipDecision {
    if force {
        return SkipDecision::work("--force given");
    }

    let srt_path = srt_path_for(video_path);
    if !srt_path.exists() {
        return SkipDecision::work(format!("no subtitle file at {}", srt_path.display()));
    }

    match SourceStamp::read_from_file(&srt_path) {
        None => SkipDecision::work("subtitle file has no readable source header"),
        Some(stamp) if stamp.matches(metadata) => SkipDecision::skip(format!(
            "subtitles already current for revision modified {}",
            stamp.modified
        )),
        Some(_) => SkipDecision::work("subtitle header does not match current metadata"),
    }
}
