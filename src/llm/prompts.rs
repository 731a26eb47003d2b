use crate::models::TenantConfig;

/// Categories the model must choose `call_outcome` from
pub const CALL_OUTCOMES: [&str; 4] = ["resolved", "escalated", "unresolved", "dropped"];

const SECTION_RULE: &str = "==============================";

/// Literal shape the model is asked to return
pub const RESPONSE_SCHEMA: &str = r#"{
  "language": "",
  "summary": "",
  "customer_sentiment": "",
  "primary_intent": "",
  "key_entities": [],
  "compliance_violations": [],
  "agent_score": 0,
  "foul_language_detected": false,
  "foul_language_examples": [],
  "threat_detected": false,
  "threat_examples": [],
  "compliance_risk_level": "low",
  "call_outcome": "",
  "sentiment_timeline": [
    {
      "segment": "",
      "customer_sentiment": ""
    }
  ],
  "explainability": []
}"#;

/// Build the analysis prompt for one call.
///
/// The output depends only on the arguments, so identical inputs give
/// byte-identical prompts.
pub fn build_prompt(transcript: &str, policies: &str, config: &TenantConfig) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are an Enterprise Conversation Intelligence Engine.\n\n");
    prompt.push_str(&format!("Domain: {}\n", config.domain()));
    prompt.push_str(&format!("Risk Threshold: {}\n", config.risk_threshold()));
    prompt.push_str(&format!(
        "Compliance Triggers: [{}]\n\n",
        config
            .compliance_triggers()
            .iter()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(", ")
    ));

    prompt.push_str("You MUST analyze the transcript strictly according to the provided policies.\n");
    prompt.push_str("If something is not mentioned in the policies, do NOT treat it as a violation.\n");
    prompt.push_str("If no policies are provided, report no compliance violations.\n\n");

    push_section(&mut prompt, "POLICIES (Authoritative)");
    prompt.push_str(policies);
    prompt.push_str("\n\n");

    push_section(&mut prompt, "TRANSCRIPT");
    prompt.push_str("\"\"\"\n");
    prompt.push_str(transcript);
    prompt.push_str("\n\"\"\"\n\n");

    push_section(&mut prompt, "TASK");
    prompt.push_str("1. Detect language.\n");
    prompt.push_str("2. Generate a concise summary.\n");
    prompt.push_str("3. Detect overall customer sentiment.\n");
    prompt.push_str("4. Identify primary intent.\n");
    prompt.push_str("5. Extract key entities (amounts, organizations, products).\n");
    prompt.push_str("6. Detect compliance violations ONLY based on the policies above.\n");
    prompt.push_str("7. Score agent performance (1-10) based on empathy, accuracy, compliance.\n");
    prompt.push_str("8. Detect foul or abusive language.\n");
    prompt.push_str("9. Detect threats (legal action, regulator complaint, account closure).\n");
    prompt.push_str("10. Classify call_outcome as exactly one of:\n");
    for outcome in CALL_OUTCOMES {
        prompt.push_str(&format!("   - {}\n", outcome));
    }
    prompt.push_str("11. Divide the conversation into 3-5 logical segments.\n");
    prompt.push_str("    For each segment, provide customer sentiment.\n");
    prompt.push_str("    Return this as \"sentiment_timeline\".\n");
    prompt.push_str(
        "12. Provide explainability reasons (3-5 short bullet points explaining risk assessment).\n\n",
    );

    push_section(&mut prompt, "STRICT OUTPUT RULES");
    prompt.push_str("- Return ONLY valid JSON.\n");
    prompt.push_str("- No explanation.\n");
    prompt.push_str("- No markdown.\n");
    prompt.push_str("- No backticks.\n");
    prompt.push_str("- JSON must start with { and end with }.\n\n");

    prompt.push_str("Return this exact JSON schema:\n\n");
    prompt.push_str(RESPONSE_SCHEMA);
    prompt.push('\n');

    prompt
}

fn push_section(prompt: &mut String, title: &str) {
    prompt.push_str(SECTION_RULE);
    prompt.push('\n');
    prompt.push_str(title);
    prompt.push('\n');
    prompt.push_str(SECTION_RULE);
    prompt.push('\n');
}
