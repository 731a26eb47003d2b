use std::path::Path;

use thiserror::Error;
use tracing::debug;

/// Marker that a retrieval result is a failure message rather than policy text
pub const ERROR_PREFIX: &str = "Error:";

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("{0:?} not found. Please add a policies file with policy sections separated by blank lines.")]
    NotFound(std::path::PathBuf),
    #[error("failed to read policies file: {0}")]
    Read(#[from] std::io::Error),
}

/// A topic that pulls one policy chunk into the prompt when the call mentions it
struct PolicyTopic {
    header: &'static str,
    /// Lowercase substrings of the transcript that select this topic
    triggers: &'static [&'static str],
    /// Lowercase substrings that identify the matching chunk
    keywords: &'static [&'static str],
    missing: &'static str,
}

const TOPICS: &[PolicyTopic] = &[
    PolicyTopic {
        header: "Fraud Policy",
        triggers: &["fraud"],
        keywords: &["fraud"],
        missing: "Fraud policy not found in policies file.",
    },
    PolicyTopic {
        header: "Refund / SLA Policy",
        triggers: &["refund"],
        keywords: &["refund", "refund sla", "refund policy"],
        missing: "Refund SLA policy not found in policies file.",
    },
    PolicyTopic {
        header: "Escalation / RBI / Legal Policy",
        triggers: &["rbi", "legal"],
        keywords: &["rbi", "legal", "escalation"],
        missing: "Escalation policy (RBI/Legal) not found in policies file.",
    },
];

const GENERAL_HEADER: &str = "General Compliance Rule";
const GENERAL_KEYWORDS: &[&str] = &["compliance", "general", "policy"];

/// Policy document split into blank-line separated chunks
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    chunks: Vec<String>,
}

impl PolicyStore {
    pub async fn load(path: &Path) -> Result<Self, PolicyError> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PolicyError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self::from_text(&text))
    }

    pub fn from_text(text: &str) -> Self {
        let chunks = text
            .split("\n\n")
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        Self { chunks }
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Select the policy chunks relevant to a transcript.
    ///
    /// Each mentioned topic contributes its chunk under a `--- header ---`
    /// line. When no topic matches, a general compliance chunk is used.
    pub fn retrieve(&self, transcript: &str) -> String {
        let transcript = transcript.to_lowercase();

        let mut selected: Vec<String> = TOPICS
            .iter()
            .filter(|topic| topic.triggers.iter().any(|t| transcript.contains(t)))
            .map(|topic| {
                let chunk = self.find_chunk(topic.keywords).unwrap_or(topic.missing);
                format!("--- {} ---\n{}", topic.header, chunk)
            })
            .collect();

        if selected.is_empty() {
            let general = self
                .find_chunk(GENERAL_KEYWORDS)
                .or_else(|| self.chunks.first().map(String::as_str))
                .unwrap_or("No policies available in policies file.");
            selected.push(format!("--- {} ---\n{}", GENERAL_HEADER, general));
        }

        selected.join("\n\n")
    }

    /// First chunk containing any keyword, case-insensitively
    fn find_chunk(&self, keywords: &[&str]) -> Option<&str> {
        self.chunks
            .iter()
            .find(|chunk| {
                let lower = chunk.to_lowercase();
                keywords.iter().any(|k| lower.contains(k))
            })
            .map(String::as_str)
    }
}

/// Best-effort retrieval; failures come back as text starting with `Error:`
pub async fn retrieve_policies(transcript: &str, path: &Path) -> String {
    match PolicyStore::load(path).await {
        Ok(store) => {
            debug!("Loaded {} policy chunks from {:?}", store.chunks().len(), path);
            store.retrieve(transcript)
        }
        Err(e) => format!("{} {}", ERROR_PREFIX, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const POLICIES: &str = "General policy: agents must verify identity before sharing account details.

Fraud: block the card immediately and explain the fraud escalation steps.

Refund SLA: refunds are processed within 7 working days.

Escalation: complaints mentioning the RBI or legal action go to the grievance officer.";

    #[test]
    fn test_chunks_split_on_blank_lines() {
        let store = PolicyStore::from_text("a\n\n\n\nb\n\n  \n\nc");
        assert_eq!(store.chunks(), &["a", "b", "c"]);
    }

    #[test]
    fn test_fraud_topic() {
        let store = PolicyStore::from_text(POLICIES);
        let text = store.retrieve("I think there is FRAUD on my account");
        assert_eq!(
            text,
            "--- Fraud Policy ---\nFraud: block the card immediately and explain the fraud escalation steps."
        );
    }

    #[test]
    fn test_multiple_topics_in_order() {
        let store = PolicyStore::from_text(POLICIES);
        let text = store.retrieve("where is my refund, I will take legal action");

        assert!(text.starts_with("--- Refund / SLA Policy ---\nRefund SLA"));
        assert!(text.contains("\n\n--- Escalation / RBI / Legal Policy ---\n"));
        assert!(!text.contains("Fraud Policy"));
    }

    #[test]
    fn test_escalation_keyword_falls_through_to_first_match() {
        // the fraud chunk mentions "escalation" before the escalation chunk does
        let store = PolicyStore::from_text(POLICIES);
        let text = store.retrieve("I will complain to the RBI");
        assert!(text.contains("Fraud: block the card"));
    }

    #[test]
    fn test_general_rule_when_nothing_matches() {
        let store = PolicyStore::from_text(POLICIES);
        let text = store.retrieve("I want to update my address");
        assert!(text.starts_with("--- General Compliance Rule ---\nGeneral policy"));
    }

    #[test]
    fn test_missing_topic_chunk_placeholder() {
        let store = PolicyStore::from_text("Dress code applies in branches.");
        let text = store.retrieve("this is fraud");
        assert_eq!(
            text,
            "--- Fraud Policy ---\nFraud policy not found in policies file."
        );

        let text = store.retrieve("hello");
        assert_eq!(
            text,
            "--- General Compliance Rule ---\nDress code applies in branches."
        );
    }

    #[test]
    fn test_empty_store() {
        let text = PolicyStore::default().retrieve("hello");
        assert!(text.ends_with("No policies available in policies file."));
    }

    #[tokio::test]
    async fn test_retrieve_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", POLICIES).unwrap();

        let text = retrieve_policies("refund please", file.path()).await;
        assert!(text.starts_with("--- Refund / SLA Policy ---"));
    }

    #[tokio::test]
    async fn test_missing_file_reports_error_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policies.txt");

        assert!(matches!(
            PolicyStore::load(&path).await,
            Err(PolicyError::NotFound(_))
        ));
        let text = retrieve_policies("fraud", &path).await;
        assert!(text.starts_with(ERROR_PREFIX));
    }

    #[tokio::test]
    async fn test_directory_path_reports_error_text() {
        let dir = tempfile::tempdir().unwrap();
        let text = retrieve_policies("fraud", dir.path()).await;
        assert!(text.starts_with(ERROR_PREFIX));
    }
}
