use serde::{Deserialize, Serialize};

/// Root response from the Deepgram pre-recorded listen API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramResponse {
    pub results: DeepgramResults,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramResults {
    #[serde(default)]
    pub channels: Vec<DeepgramChannel>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramChannel {
    #[serde(default)]
    pub alternatives: Vec<DeepgramAlternative>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramAlternative {
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub words: Vec<DeepgramWord>,
}

/// A single recognized word, with a speaker label when diarization ran
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeepgramWord {
    pub word: String,
    /// Start timestamp in seconds
    #[serde(default)]
    pub start: f64,
    /// End timestamp in seconds
    #[serde(default)]
    pub end: f64,
    #[serde(default)]
    pub speaker: Option<u32>,
    #[serde(default)]
    pub punctuated_word: Option<String>,
}

impl DeepgramResponse {
    fn first_alternative(&self) -> Option<&DeepgramAlternative> {
        self.results
            .channels
            .first()
            .and_then(|c| c.alternatives.first())
    }

    /// Plain transcript of the first channel's first alternative
    pub fn transcript(&self) -> Option<&str> {
        self.first_alternative()
            .and_then(|a| a.transcript.as_deref())
    }

    pub fn words(&self) -> &[DeepgramWord] {
        self.first_alternative()
            .map(|a| a.words.as_slice())
            .unwrap_or(&[])
    }

    /// Render the call as one `Speaker N: ...` line per speaker turn.
    ///
    /// Returns `None` when the words carry no speaker labels.
    pub fn speaker_segments(&self) -> Option<String> {
        let words = self.words();
        if words.is_empty() || words.iter().any(|w| w.speaker.is_none()) {
            return None;
        }

        let mut lines: Vec<String> = Vec::new();
        let mut current_speaker: Option<u32> = None;
        let mut current_words: Vec<&str> = Vec::new();

        for word in words {
            if current_speaker.is_some() && current_speaker != word.speaker {
                if let Some(speaker) = current_speaker {
                    lines.push(format!("Speaker {}: {}", speaker, current_words.join(" ")));
                }
                current_words.clear();
            }
            current_speaker = word.speaker;
            current_words.push(word.punctuated_word.as_deref().unwrap_or(&word.word));
        }

        if let Some(speaker) = current_speaker {
            lines.push(format!("Speaker {}: {}", speaker, current_words.join(" ")));
        }

        Some(lines.join("\n"))
    }
}
