//! drive_scribe - Download Google Drive videos and transcribe them locally.
//!
//! This library provides functionality to:
//! - Resolve Drive file/folder references from URLs or raw IDs
//! - Authenticate with user OAuth (installed-app flow) and cache the token
//! - Download one video or every video file in a folder
//! - Transcribe media with a local Whisper model into transcript and subtitle files
//! - Skip targets whose subtitles are already current for the remote revision
//!
//! # Example
//!
//! ```no_run
//! use drive_scribe::{Authenticator, DriveClient, MediaProvider};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let auth = Authenticator::from_files("credentials.json", "token.json")?;
//!     let client = DriveClient::new(auth);
//!
//!     let metadata = client.get_metadata("file-id").await?;
//!     println!("{}", metadata);
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod run;
pub mod skip;
pub mod srt;
pub mod stamp;
pub mod transcribe;
pub mod url_parser;

// Re-exports for convenience
pub use auth::{Authenticator, FileTokenStore, MemoryTokenStore, TokenStore};
pub use client::{DriveClient, MediaProvider};
pub use error::{Result, ScribeError};
pub use models::FileMetadata;
pub use run::{run_folder, run_single, BatchSummary, Outcome, RunOptions};
pub use skip::{should_skip, SkipDecision};
pub use stamp::SourceStamp;
pub use transcribe::{ModelSize, SpeechToText, Transcription, WhisperTranscriber};
pub use url_parser::{parse_ref, RefKind, RemoteRef};
