use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::llm::{API_KEY_VAR, Generator, GeneratorError, build_prompt, parse_model_json};
use crate::models::{AnalysisRecord, TenantConfig};
use crate::stages::normalize;

/// Reasons an analysis degrades to an error record
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0} not set in environment")]
    CredentialMissing(&'static str),
    #[error("API request failed: {0}")]
    Transport(String),
    #[error("Failed to parse JSON from model response")]
    Decode,
    #[error("Unexpected response shape: {0}")]
    UnexpectedResponseShape(String),
}

impl From<GeneratorError> for AnalysisError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::UnexpectedResponseShape(detail) => Self::UnexpectedResponseShape(detail),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl AnalysisError {
    /// Normalized record carrying this error and default values elsewhere
    pub fn into_record(self) -> AnalysisRecord {
        normalize(&json!({ "error": self.to_string() }))
    }
}

/// Runs prompt → generator → decode → normalize for one transcript.
///
/// `generator` is `None` when no credential was configured.
pub struct Analyzer<G> {
    generator: Option<G>,
}

impl<G: Generator> Analyzer<G> {
    pub fn new(generator: Option<G>) -> Self {
        Self { generator }
    }

    /// Analyze a transcript against policy text.
    ///
    /// Never fails: every failure is reported through the record's `error`.
    pub async fn analyze(
        &self,
        transcript: &str,
        policies: &str,
        config: &TenantConfig,
    ) -> AnalysisRecord {
        match self.try_analyze(transcript, policies, config).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Analysis failed: {}", e);
                e.into_record()
            }
        }
    }

    async fn try_analyze(
        &self,
        transcript: &str,
        policies: &str,
        config: &TenantConfig,
    ) -> Result<AnalysisRecord, AnalysisError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or(AnalysisError::CredentialMissing(API_KEY_VAR))?;

        let prompt = build_prompt(transcript, policies, config);
        debug!("Prompt built: {} chars", prompt.len());

        let raw = generator.generate(&prompt).await?;
        info!("Model responded with {} chars", raw.len());

        let decoded = parse_model_json(&raw).ok_or(AnalysisError::Decode)?;
        Ok(normalize(&decoded))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::models::RiskLevel;

    /// Replays a canned reply and remembers the prompt it was given
    struct ScriptedGenerator {
        reply: Result<String, String>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn shape_error(detail: &str) -> Self {
            Self {
                reply: Err(detail.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Generator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
            self.seen.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(GeneratorError::UnexpectedResponseShape)
        }
    }

    fn defaults_with_error(record: &AnalysisRecord) -> bool {
        AnalysisRecord {
            error: None,
            ..record.clone()
        } == AnalysisRecord::default()
    }

    #[tokio::test]
    async fn test_missing_credential_skips_generator() {
        let analyzer: Analyzer<ScriptedGenerator> = Analyzer::new(None);
        let record = analyzer
            .analyze("hello", "", &TenantConfig::default())
            .await;

        assert_eq!(
            record.error.as_deref(),
            Some("ANTHROPIC_API_KEY not set in environment")
        );
        assert!(defaults_with_error(&record));
    }

    #[tokio::test]
    async fn test_clean_json_reply() {
        let generator = ScriptedGenerator::replying(
            r#"{"summary": "Lost card", "compliance_risk_level": "medium", "agent_score": "9"}"#,
        );
        let analyzer = Analyzer::new(Some(generator));
        let record = analyzer
            .analyze("Speaker 1: I lost my card", "policy text", &TenantConfig::default())
            .await;

        assert!(record.error.is_none());
        assert_eq!(record.summary, "Lost card");
        assert_eq!(record.compliance_risk_level, RiskLevel::Medium);
        assert_eq!(record.agent_score, 9);
    }

    #[tokio::test]
    async fn test_prompt_reaches_generator() {
        let generator = ScriptedGenerator::replying("{}");
        let analyzer = Analyzer::new(Some(generator));
        let config = TenantConfig::default();
        analyzer.analyze("the transcript", "the policies", &config).await;

        let seen = analyzer
            .generator
            .as_ref()
            .unwrap()
            .seen
            .lock()
            .unwrap()
            .clone();
        assert_eq!(seen, vec![build_prompt("the transcript", "the policies", &config)]);
    }

    #[tokio::test]
    async fn test_reply_wrapped_in_prose() {
        let generator = ScriptedGenerator::replying(
            r#"Here is the result: {"summary": "Refund delayed", "threat_detected": true} Thanks!"#,
        );
        let record = Analyzer::new(Some(generator))
            .analyze("t", "", &TenantConfig::default())
            .await;

        assert!(record.error.is_none());
        assert_eq!(record.summary, "Refund delayed");
        assert!(record.threat_detected);
    }

    #[tokio::test]
    async fn test_reply_without_json() {
        let generator = ScriptedGenerator::replying("Sorry, I cannot help with that.");
        let record = Analyzer::new(Some(generator))
            .analyze("t", "", &TenantConfig::default())
            .await;

        assert_eq!(
            record.error.as_deref(),
            Some("Failed to parse JSON from model response")
        );
        assert!(defaults_with_error(&record));
    }

    #[tokio::test]
    async fn test_malformed_reply_with_valid_nested_item() {
        let generator = ScriptedGenerator::replying(
            r#"Here you go: {"threat_detected": True, "compliance_violations": ["kyc skipped"], "key_entities": [{"name": "HDFC"}]}"#,
        );
        let record = Analyzer::new(Some(generator))
            .analyze("t", "", &TenantConfig::default())
            .await;

        assert_eq!(
            record.error.as_deref(),
            Some("Failed to parse JSON from model response")
        );
        assert!(defaults_with_error(&record));
    }

    #[tokio::test]
    async fn test_truncated_reply() {
        let generator = ScriptedGenerator::replying(
            r#"{"summary": "Threat to close account", "threat_detected": true, "sentiment_timeline": [{"segment": "opening", "customer_sentiment": "calm"}, {"segment": "mid"#,
        );
        let record = Analyzer::new(Some(generator))
            .analyze("t", "", &TenantConfig::default())
            .await;

        assert_eq!(
            record.error.as_deref(),
            Some("Failed to parse JSON from model response")
        );
        assert!(defaults_with_error(&record));
    }

    #[tokio::test]
    async fn test_shape_error_becomes_record() {
        let generator = ScriptedGenerator::shape_error("no text content in response");
        let record = Analyzer::new(Some(generator))
            .analyze("t", "", &TenantConfig::default())
            .await;

        assert_eq!(
            record.error.as_deref(),
            Some("Unexpected response shape: no text content in response")
        );
        assert!(defaults_with_error(&record));
    }

    #[test]
    fn test_transport_error_message() {
        let err = AnalysisError::from(GeneratorError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "upstream down".to_string(),
        });
        let record = err.into_record();

        assert_eq!(
            record.error.as_deref(),
            Some("API request failed: Anthropic API error: 502 Bad Gateway - upstream down")
        );
        assert!(defaults_with_error(&record));
    }
}
