//! Local speech-to-text using whisper.cpp.
//!
//! Media files are decoded to 16 kHz mono PCM by invoking `ffmpeg`, then run
//! through a ggml whisper model. Model files are cached under the user cache
//! directory and fetched on first use.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clap::ValueEnum;
use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::error::{Result, ScribeError};

/// Where ggml model files are fetched from.
const MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Whisper model sizes.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelSize {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl ModelSize {
    /// File name of the ggml model for this size.
    pub fn file_name(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "ggml-tiny.bin",
            ModelSize::Base => "ggml-base.bin",
            ModelSize::Small => "ggml-small.bin",
            ModelSize::Medium => "ggml-medium.bin",
            ModelSize::Large => "ggml-large-v3.bin",
        }
    }
}

impl std::fmt::Display for ModelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        };
        write!(f, "{}", name)
    }
}

/// A time-bounded span of transcribed speech.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    pub text: String,
}

/// Full transcription of one media file.
#[derive(Debug, Clone, Default)]
pub struct Transcription {
    pub text: String,
    pub segments: Vec<Segment>,
}

/// Narrow capability interface over the speech-to-text backend.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, media: &Path) -> Result<Transcription>;
}

/// Transcriber backed by whisper.cpp via whisper-rs.
pub struct WhisperTranscriber {
    model: ModelSize,
    language: Option<String>,
    model_dir: PathBuf,
    // Loaded lazily once, then reused across files in folder mode.
    context: Mutex<Option<Arc<WhisperContext>>>,
}

impl WhisperTranscriber {
    /// Create a transcriber using the default model cache directory.
    pub fn new(model: ModelSize, language: Option<String>) -> Self {
        Self::with_model_dir(model, language, default_model_dir())
    }

    /// Create a transcriber with an explicit model directory.
    pub fn with_model_dir(model: ModelSize, language: Option<String>, model_dir: PathBuf) -> Self {
        Self {
            model,
            language,
            model_dir,
            context: Mutex::new(None),
        }
    }

    /// Path to the model file, downloading it on first use.
    async fn ensure_model(&self) -> Result<PathBuf> {
        let path = self.model_dir.join(self.model.file_name());
        if path.exists() {
            return Ok(path);
        }

        std::fs::create_dir_all(&self.model_dir)?;
        let url = format!("{}/{}", MODEL_BASE_URL, self.model.file_name());
        tracing::info!(model = %self.model, url = %url, "downloading whisper model");

        let response = reqwest::get(&url)
            .await
            .map_err(|e| ScribeError::Transcription(format!("model download failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScribeError::Transcription(format!(
                "model download failed ({}): {}",
                status, url
            )));
        }

        // Download to a partial file first so an aborted fetch is never
        // mistaken for a complete model.
        let partial = path.with_extension("bin.part");
        let mut out = File::create(&partial).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| ScribeError::Transcription(format!("model download failed: {}", e)))?;
            out.write_all(&chunk).await?;
        }
        out.flush().await?;
        std::fs::rename(&partial, &path)?;

        tracing::info!(path = %path.display(), "whisper model ready");
        Ok(path)
    }

    fn load_context(&self, model_path: &Path) -> Result<Arc<WhisperContext>> {
        let mut guard = self.context.lock().unwrap();
        if let Some(ctx) = guard.as_ref() {
            return Ok(ctx.clone());
        }

        let path_str = model_path
            .to_str()
            .ok_or_else(|| ScribeError::Transcription("non-UTF-8 model path".to_string()))?;

        tracing::info!(path = %model_path.display(), "loading whisper model");
        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| ScribeError::Transcription(format!("failed to load model: {}", e)))?;

        let ctx = Arc::new(ctx);
        *guard = Some(ctx.clone());
        Ok(ctx)
    }

    fn run_model(&self, ctx: &WhisperContext, samples: &[f32]) -> Result<Transcription> {
        let mut state = ctx
            .create_state()
            .map_err(|e| ScribeError::Transcription(format!("failed to create state: {}", e)))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        if let Some(lang) = self.language.as_deref() {
            params.set_language(Some(lang));
        }

        state
            .full(params, samples)
            .map_err(|e| ScribeError::Transcription(format!("inference failed: {}", e)))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| ScribeError::Transcription(format!("inference failed: {}", e)))?;

        let mut segments = Vec::with_capacity(n_segments as usize);
        for i in 0..n_segments {
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| ScribeError::Transcription(format!("bad segment {}: {}", i, e)))?;
            let t0 = state
                .full_get_segment_t0(i)
                .map_err(|e| ScribeError::Transcription(format!("bad segment {}: {}", i, e)))?;
            let t1 = state
                .full_get_segment_t1(i)
                .map_err(|e| ScribeError::Transcription(format!("bad segment {}: {}", i, e)))?;

            // whisper timestamps are centiseconds
            segments.push(Segment {
                start: t0 as f64 / 100.0,
                end: t1 as f64 / 100.0,
                text: text.trim().to_string(),
            });
        }

        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        Ok(Transcription { text, segments })
    }
}

#[async_trait]
impl SpeechToText for WhisperTranscriber {
    async fn transcribe(&self, media: &Path) -> Result<Transcription> {
        if !media.exists() {
            return Err(ScribeError::NotFound(media.display().to_string()));
        }

        let model_path = self.ensure_model().await?;
        let samples = decode_pcm(media).await?;
        let ctx = self.load_context(&model_path)?;

        tracing::info!(media = %media.display(), model = %self.model, "transcribing");
        self.run_model(&ctx, &samples)
    }
}

/// Default directory for cached ggml models.
pub fn default_model_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("drive_scribe")
        .join("models")
}

/// Decode a media file to 16 kHz mono f32 PCM via ffmpeg.
async fn decode_pcm(media: &Path) -> Result<Vec<f32>> {
    let output = Command::new("ffmpeg")
        .args(["-nostdin", "-hide_banner", "-loglevel", "error", "-i"])
        .arg(media)
        .args(["-f", "s16le", "-ac", "1", "-ar", "16000", "-"])
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ScribeError::Transcription(
                "ffmpeg not found in PATH; install ffmpeg to enable transcription".to_string(),
            ),
            _ => ScribeError::Io(e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScribeError::Transcription(format!(
            "ffmpeg could not decode {}: {}",
            media.display(),
            stderr.trim()
        )));
    }

    Ok(pcm_to_f32(&output.stdout))
}

/// Convert little-endian s16 PCM bytes to normalized f32 samples.
fn pcm_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
        .collect()
}
