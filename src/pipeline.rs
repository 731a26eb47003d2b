use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::io::{ERROR_PREFIX, TranscribeError, Transcriber, retrieve_policies};
use crate::llm::Generator;
use crate::models::{AnalysisReport, ReportMetadata, TenantConfig};
use crate::stages::{Analyzer, score};

/// Where the pipeline finds audio and policy text
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub files_dir: PathBuf,
    pub policies_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            files_dir: PathBuf::from("files"),
            policies_path: PathBuf::from("policies.txt"),
        }
    }
}

/// Errors that abort a request. Everything after transcription degrades instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscribeError),
}

/// Transcribe → retrieve policies → analyze → score, for one audio file per call
pub struct Pipeline<T, G> {
    transcriber: T,
    analyzer: Analyzer<G>,
    config: PipelineConfig,
}

impl<T: Transcriber, G: Generator> Pipeline<T, G> {
    pub fn new(transcriber: T, analyzer: Analyzer<G>, config: PipelineConfig) -> Self {
        Self {
            transcriber,
            analyzer,
            config,
        }
    }

    /// Analyze one audio file from the files directory.
    ///
    /// `audio_filename` must already be a bare file name.
    pub async fn handle_analysis_request(
        &self,
        audio_filename: &str,
        tenant: &TenantConfig,
    ) -> Result<AnalysisReport, PipelineError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("analysis_request", %request_id, file = audio_filename);

        async {
            let audio_path = self.config.files_dir.join(audio_filename);

            info!("Stage 1: Transcribing...");
            let transcript = self.transcriber.transcribe(&audio_path).await?;
            info!("Transcript: {} chars", transcript.len());

            info!("Stage 2: Retrieving policies...");
            let policies = self.policies_for(&transcript).await;

            info!("Stage 3: Analyzing transcript...");
            let analysis = self.analyzer.analyze(&transcript, &policies, tenant).await;
            if analysis.is_error() {
                warn!("Analysis degraded to an error record; signals default to empty");
            }

            info!("Stage 4: Scoring risk...");
            let risk_analysis = score(&analysis, tenant);
            info!(
                "Risk score {} ({}), compliance level {}",
                risk_analysis.risk_score, risk_analysis.risk_level, analysis.compliance_risk_level
            );

            Ok::<_, PipelineError>(AnalysisReport {
                analysis,
                risk_analysis,
                metadata: ReportMetadata {
                    request_id,
                    audio_file: audio_filename.to_string(),
                    analyzed_at: Utc::now(),
                    policies_applied: !policies.is_empty(),
                },
            })
        }
        .instrument(span)
        .await
    }

    /// Policy text for the prompt; retrieval failures become an empty string
    async fn policies_for(&self, transcript: &str) -> String {
        let policies = retrieve_policies(transcript, &self.config.policies_path).await;
        if policies.starts_with(ERROR_PREFIX) {
            warn!("Failed to load policies; proceeding without policies. {}", policies);
            return String::new();
        }
        policies
    }
}
