use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::RiskVerdict;

/// Three-level risk classification shared by the model's compliance field and
/// the deterministic risk band
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Exact, case-sensitive match against the three wire values
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical slice of the conversation with the customer's mood in it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSegment {
    pub segment: String,
    pub customer_sentiment: String,
}

/// Normalized analysis of a single call.
///
/// Every field is always present once a record leaves the normalizer. When a
/// pipeline step fails, `error` is set and the remaining fields hold defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub language: String,
    pub summary: String,
    pub customer_sentiment: String,
    pub primary_intent: String,
    /// Amounts, organizations, products; items may be plain strings or objects
    pub key_entities: Vec<serde_json::Value>,
    pub compliance_violations: Vec<serde_json::Value>,
    pub agent_score: i64,
    pub foul_language_detected: bool,
    pub foul_language_examples: Vec<String>,
    pub threat_detected: bool,
    pub threat_examples: Vec<String>,
    pub compliance_risk_level: RiskLevel,
    /// One of resolved, escalated, unresolved, dropped; passed through unchecked
    pub call_outcome: String,
    pub sentiment_timeline: Vec<SentimentSegment>,
    pub explainability: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisRecord {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Per-request bookkeeping attached to a report. Never feeds prompting or scoring.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub request_id: Uuid,
    pub audio_file: String,
    pub analyzed_at: DateTime<Utc>,
    pub policies_applied: bool,
}

/// Final response body: the analysis fields at top level plus the derived verdict
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub analysis: AnalysisRecord,
    pub risk_analysis: RiskVerdict,
    pub metadata: ReportMetadata,
}
