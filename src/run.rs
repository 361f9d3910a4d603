//! Sequential orchestration of download and transcription targets.
//!
//! Each target moves through resolve → metadata → {skip | download →
//! [transcribe → write artifacts]}. Single-file mode propagates the first
//! fatal error; folder mode is best-effort and reports a summary.

use std::path::{Path, PathBuf};

use crate::client::MediaProvider;
use crate::error::{Result, ScribeError};
use crate::models::FileMetadata;
use crate::skip::{self, srt_path_for};
use crate::srt;
use crate::stamp::SourceStamp;
use crate::transcribe::SpeechToText;

/// Options governing one run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overwrite existing files and bypass the skip check.
    pub force: bool,
    /// Write a plain-text transcript.
    pub transcribe: bool,
    /// Write an SRT subtitle file with the source stamp header.
    pub srt: bool,
    /// Explicit destination for single-file mode; ignored in folder mode.
    pub output: Option<PathBuf>,
    /// Directory for downloads when no explicit destination is given.
    pub output_dir: PathBuf,
    /// Transcript path override for single-file mode.
    pub transcript_output: Option<PathBuf>,
    /// Subtitle path override for single-file mode.
    pub srt_output: Option<PathBuf>,
}

impl RunOptions {
    fn wants_transcription(&self) -> bool {
        self.transcribe || self.srt
    }
}

/// Terminal state of one target.
#[derive(Debug)]
pub enum Outcome {
    Completed {
        video: PathBuf,
        transcript: Option<PathBuf>,
        subtitles: Option<PathBuf>,
    },
    Skipped {
        video: PathBuf,
        reason: String,
    },
}

/// Batch counters for folder mode.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn all_ok(&self) -> bool {
        self.failed == 0
    }
}

/// Process a single file target by ID.
pub async fn run_single<P, T>(
    provider: &P,
    transcriber: &T,
    file_id: &str,
    opts: &RunOptions,
) -> Result<Outcome>
where
    P: MediaProvider + ?Sized,
    T: SpeechToText + ?Sized,
{
    let metadata = provider.get_metadata(file_id).await?;
    let video_path = single_target_path(&metadata, opts);
    ensure_parent_dir(&video_path)?;
    process_target(provider, transcriber, &metadata, &video_path, opts).await
}

/// Process every video file in a folder, continuing past per-target errors.
pub async fn run_folder<P, T>(
    provider: &P,
    transcriber: &T,
    folder_id: &str,
    opts: &RunOptions,
) -> Result<BatchSummary>
where
    P: MediaProvider + ?Sized,
    T: SpeechToText + ?Sized,
{
    let videos = provider.list_videos(folder_id).await?;

    let mut summary = BatchSummary::default();
    if videos.is_empty() {
        println!("No video files found in folder.");
        return Ok(summary);
    }

    std::fs::create_dir_all(&opts.output_dir)?;

    // Path overrides only make sense for a single target
    let per_target = RunOptions {
        output: None,
        transcript_output: None,
        srt_output: None,
        ..opts.clone()
    };

    println!("Processing {} video file(s)...", videos.len());

    for (idx, metadata) in videos.iter().enumerate() {
        println!("[{}/{}] {}", idx + 1, videos.len(), metadata.name);
        let video_path = opts.output_dir.join(&metadata.name);

        match process_target(provider, transcriber, metadata, &video_path, &per_target).await {
            Ok(Outcome::Completed { .. }) => summary.completed += 1,
            Ok(Outcome::Skipped { .. }) => summary.skipped += 1,
            Err(e) => {
                summary.failed += 1;
                tracing::error!(name = %metadata.name, error = %e, "target failed");
            }
        }
    }

    println!(
        "Done. {} completed, {} skipped, {} failed.",
        summary.completed, summary.skipped, summary.failed
    );
    Ok(summary)
}

/// Drive one target through skip check, download, transcription and writes.
pub async fn process_target<P, T>(
    provider: &P,
    transcriber: &T,
    metadata: &FileMetadata,
    video_path: &Path,
    opts: &RunOptions,
) -> Result<Outcome>
where
    P: MediaProvider + ?Sized,
    T: SpeechToText + ?Sized,
{
    // The skip check only pays off when transcription work was requested.
    // A negative decision there means the artifacts are stale, so the
    // download may overwrite them; a plain download is governed by the
    // overwrite guard instead.
    if opts.wants_transcription() {
        let decision = skip::should_skip(video_path, metadata, opts.force);
        if decision.skip {
            println!("Skipping '{}': {}", metadata.name, decision.reason);
            return Ok(Outcome::Skipped {
                video: video_path.to_path_buf(),
                reason: decision.reason,
            });
        }
        tracing::debug!(name = %metadata.name, reason = %decision.reason, "not skipping");
    } else if video_path.exists() && !opts.force {
        return Err(ScribeError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!(
                "refusing to overwrite existing file: {} (use --force)",
                video_path.display()
            ),
        )));
    }

    provider.download(metadata, video_path).await?;
    println!("Saved to {}", video_path.display());

    if !opts.wants_transcription() {
        return Ok(Outcome::Completed {
            video: video_path.to_path_buf(),
            transcript: None,
            subtitles: None,
        });
    }

    let result = transcriber.transcribe(video_path).await?;

    let transcript = if opts.transcribe {
        let path = opts
            .transcript_output
            .clone()
            .unwrap_or_else(|| video_path.with_extension("txt"));
        srt::write_transcript(&result, &path)?;
        println!("Transcript saved to {}", path.display());
        Some(path)
    } else {
        None
    };

    let subtitles = if opts.srt {
        let path = opts
            .srt_output
            .clone()
            .unwrap_or_else(|| srt_path_for(video_path));
        let stamp = SourceStamp::from_metadata(metadata);
        srt::write_srt(&result, &path, &stamp)?;
        println!("Subtitles saved to {}", path.display());
        Some(path)
    } else {
        None
    };

    Ok(Outcome::Completed {
        video: video_path.to_path_buf(),
        transcript,
        subtitles,
    })
}

/// Destination for single-file mode: `--output` wins (a directory appends
/// the remote name), otherwise the output directory plus the remote name.
fn single_target_path(metadata: &FileMetadata, opts: &RunOptions) -> PathBuf {
    match &opts.output {
        Some(output) if output.is_dir() => output.join(&metadata.name),
        Some(output) => output.clone(),
        None => opts.output_dir.join(&metadata.name),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
