//! drive_scribe CLI - Download Google Drive videos and transcribe them locally.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drive_scribe::run::{run_folder, run_single, RunOptions};
use drive_scribe::url_parser::{parse_ref, RefKind};
use drive_scribe::{Authenticator, DriveClient, ModelSize, WhisperTranscriber};

/// Download a Google Drive video via OAuth user login, optionally
/// transcribing it with a local Whisper model.
#[derive(Parser)]
#[command(name = "drive_scribe")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("source").required(true)))]
struct Cli {
    /// Full Google Drive URL of the video.
    #[arg(long, group = "source")]
    url: Option<String>,

    /// Drive file ID of the video.
    #[arg(long, group = "source")]
    file_id: Option<String>,

    /// Full Google Drive folder URL to process all video files inside.
    #[arg(long, group = "source")]
    folder_url: Option<String>,

    /// Drive folder ID to process all video files inside.
    #[arg(long, group = "source")]
    folder_id: Option<String>,

    /// Output file path. If omitted, the Drive filename is saved inside
    /// --output-dir. Ignored in folder mode.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Directory to save downloads into.
    #[arg(long, default_value = "out")]
    output_dir: PathBuf,

    /// Path to OAuth client secrets JSON.
    #[arg(long, env = "GOOGLE_OAUTH_CLIENT_SECRETS", default_value = "credentials.json")]
    client_secrets: PathBuf,

    /// Path to the persisted OAuth token.
    #[arg(long, env = "GOOGLE_OAUTH_TOKEN", default_value = "token.json")]
    token: PathBuf,

    /// Overwrite existing files and redo up-to-date work.
    #[arg(long)]
    force: bool,

    /// Transcribe the downloaded media with Whisper.
    #[arg(long)]
    transcribe: bool,

    /// Whisper model size.
    #[arg(long, value_enum, default_value = "small")]
    whisper_model: ModelSize,

    /// Language spoken in the media. Auto-detected when omitted.
    #[arg(long)]
    language: Option<String>,

    /// Path to write the transcript .txt (defaults to the video basename).
    #[arg(long)]
    transcript_output: Option<PathBuf>,

    /// Also write an .srt subtitle file from Whisper segments.
    #[arg(long)]
    srt: bool,

    /// Path to write the .srt in single-file mode (defaults to the video basename).
    #[arg(long)]
    srt_output: Option<PathBuf>,
}

impl Cli {
    /// The source input plus the kind a raw ID should be taken as.
    fn source(&self) -> Option<(&str, RefKind)> {
        if let Some(url) = self.url.as_deref() {
            Some((url, RefKind::File))
        } else if let Some(id) = self.file_id.as_deref() {
            Some((id, RefKind::File))
        } else if let Some(url) = self.folder_url.as_deref() {
            Some((url, RefKind::Folder))
        } else {
            self.folder_id.as_deref().map(|id| (id, RefKind::Folder))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drive_scribe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let (input, assumed_kind) = cli.source().context("No Drive reference provided")?;
    let remote = parse_ref(input, assumed_kind)
        .with_context(|| format!("Invalid Drive URL or ID: {}", input))?;

    let auth = Authenticator::from_files(&cli.client_secrets, &cli.token)
        .with_context(|| format!("Failed to load credentials from {:?}", cli.client_secrets))?;
    let client = DriveClient::new(auth);
    let transcriber = WhisperTranscriber::new(cli.whisper_model, cli.language.clone());

    let opts = RunOptions {
        force: cli.force,
        transcribe: cli.transcribe,
        srt: cli.srt,
        output: cli.output.clone(),
        output_dir: cli.output_dir.clone(),
        transcript_output: cli.transcript_output.clone(),
        srt_output: cli.srt_output.clone(),
    };

    match remote.kind {
        RefKind::File => {
            run_single(&client, &transcriber, &remote.id, &opts)
                .await
                .with_context(|| format!("Failed to process file: {}", remote.id))?;
        }
        RefKind::Folder => {
            let summary = run_folder(&client, &transcriber, &remote.id, &opts)
                .await
                .with_context(|| format!("Failed to process folder: {}", remote.id))?;
            if !summary.all_ok() {
                anyhow::bail!("{} target(s) failed", summary.failed);
            }
        }
    }

    Ok(())
}
