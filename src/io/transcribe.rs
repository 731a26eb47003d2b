use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::DeepgramResponse;

const LISTEN_URL: &str = "https://api.deepgram.com/v1/listen";
const DEFAULT_MODEL: &str = "nova-2";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Failure to turn an audio file into text
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("Audio file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("Failed to read audio file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Transcription request failed: {0}")]
    Transport(String),
    #[error("Unexpected transcription response: {0}")]
    Format(String),
}

/// Something that turns a recorded call into transcript text
pub trait Transcriber {
    fn transcribe(
        &self,
        audio_path: &Path,
    ) -> impl Future<Output = Result<String, TranscribeError>> + Send;
}

/// Configuration for the Deepgram transcription client
#[derive(Debug, Clone)]
pub struct DeepgramConfig {
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl DeepgramConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("DEEPGRAM_API_KEY")
            .context("DEEPGRAM_API_KEY environment variable not set")?;
        let model =
            std::env::var("DEEPGRAM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = match std::env::var("TRANSCRIBE_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("TRANSCRIBE_TIMEOUT_SECS is not a number: {raw}"))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Deepgram pre-recorded transcription with diarization
pub struct DeepgramTranscriber {
    client: Client,
    config: DeepgramConfig,
}

impl DeepgramTranscriber {
    pub fn new(config: DeepgramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client for Deepgram API")?;
        Ok(Self { client, config })
    }
}

impl Transcriber for DeepgramTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscribeError> {
        let audio = match tokio::fs::read(audio_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TranscribeError::NotFound(audio_path.to_path_buf()));
            }
            Err(source) => {
                return Err(TranscribeError::Io {
                    path: audio_path.to_path_buf(),
                    source,
                });
            }
        };
        info!("Transcribing {:?} ({} bytes)", audio_path, audio.len());

        let response = self
            .client
            .post(LISTEN_URL)
            .query(&[
                ("model", self.config.model.as_str()),
                ("diarize", "true"),
                ("punctuate", "true"),
                ("smart_format", "true"),
            ])
            .header("Authorization", format!("Token {}", self.config.api_key))
            .header("Content-Type", content_type_for(audio_path))
            .body(audio)
            .send()
            .await
            .map_err(|e| TranscribeError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranscribeError::Transport(format!(
                "Deepgram API error: {} - {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranscribeError::Transport(e.to_string()))?;
        transcript_from_body(&body)
    }
}

/// Extract the transcript from a listen response body.
///
/// Diarized responses are rendered one speaker turn per line.
pub fn transcript_from_body(body: &str) -> Result<String, TranscribeError> {
    let response: DeepgramResponse =
        serde_json::from_str(body).map_err(|e| TranscribeError::Format(e.to_string()))?;

    let transcript = response
        .transcript()
        .ok_or_else(|| TranscribeError::Format("no transcript field".to_string()))?;

    match response.speaker_segments() {
        Some(segments) => {
            debug!("Rendered diarized transcript");
            Ok(segments)
        }
        None => Ok(transcript.to_string()),
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp3") | Some("mpeg") => "audio/mpeg",
        Some("wav") => "audio/wav",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_transcript() {
        let body = r#"{"results": {"channels": [{"alternatives": [{"transcript": "hello world", "words": []}]}]}}"#;
        assert_eq!(transcript_from_body(body).unwrap(), "hello world");
    }

    #[test]
    fn test_diarized_transcript() {
        let body = r#"{"results": {"channels": [{"alternatives": [{
            "transcript": "hi hello",
            "words": [
                {"word": "hi", "start": 0.1, "end": 0.3, "speaker": 0},
                {"word": "hello", "start": 0.5, "end": 0.9, "speaker": 1}
            ]
        }]}]}}"#;
        assert_eq!(
            transcript_from_body(body).unwrap(),
            "Speaker 0: hi\nSpeaker 1: hello"
        );
    }

    #[test]
    fn test_missing_transcript_is_format_error() {
        let body = r#"{"results": {"channels": [{"alternatives": [{"words": []}]}]}}"#;
        assert!(matches!(
            transcript_from_body(body),
            Err(TranscribeError::Format(_))
        ));

        assert!(matches!(
            transcript_from_body(r#"{"err_code": "INVALID_AUTH"}"#),
            Err(TranscribeError::Format(_))
        ));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("call.MP3")), "audio/mpeg");
        assert_eq!(content_type_for(Path::new("call.mpeg")), "audio/mpeg");
        assert_eq!(content_type_for(Path::new("call.wav")), "audio/wav");
        assert_eq!(content_type_for(Path::new("call")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let config = DeepgramConfig {
            api_key: "unused".to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(1),
        };
        let transcriber = DeepgramTranscriber::new(config).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let err = transcriber
            .transcribe(&dir.path().join("absent.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscribeError::NotFound(_)));
    }
}
