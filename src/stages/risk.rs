use crate::models::{AnalysisRecord, RiskLevel, RiskVerdict, TenantConfig};

pub const THREAT_POINTS: u32 = 25;
pub const VIOLATION_POINTS: u32 = 30;
pub const NEGATIVE_SENTIMENT_POINTS: u32 = 20;
pub const FOUL_LANGUAGE_POINTS: u32 = 15;
pub const MAX_RISK_SCORE: u32 = 100;

/// Customer sentiments that add to the score, compared case-insensitively
pub const NEGATIVE_SENTIMENTS: [&str; 2] = ["angry", "very negative"];

/// Compute the deterministic risk verdict for a normalized record.
///
/// Rules are additive and all of them are evaluated:
/// - threat detected: +25
/// - any compliance violation: +30
/// - negative customer sentiment: +20
/// - foul language detected: +15
///
/// The total is capped at 100 and banded against the tenant's threshold.
pub fn score(record: &AnalysisRecord, config: &TenantConfig) -> RiskVerdict {
    let mut total = 0;
    let mut reasoning = Vec::new();

    let mut apply = |fired: bool, points: u32, reason: &str| {
        if fired {
            total += points;
            reasoning.push(format!("{} (+{})", reason, points));
        }
    };

    apply(record.threat_detected, THREAT_POINTS, "threat detected");
    apply(
        !record.compliance_violations.is_empty(),
        VIOLATION_POINTS,
        "compliance violations present",
    );
    apply(
        is_negative_sentiment(&record.customer_sentiment),
        NEGATIVE_SENTIMENT_POINTS,
        "negative customer sentiment",
    );
    apply(
        record.foul_language_detected,
        FOUL_LANGUAGE_POINTS,
        "foul language detected",
    );

    let risk_score = total.min(MAX_RISK_SCORE);

    RiskVerdict {
        risk_score,
        risk_level: band_for(risk_score, config.risk_threshold()),
        risk_reasoning: reasoning,
    }
}

/// Band a score against threshold T: >= T is high, >= 0.6*T is medium
pub fn band_for(score: u32, threshold: u32) -> RiskLevel {
    // 5*score >= 3*T is the exact integer form of score >= 0.6*T
    if score >= threshold {
        RiskLevel::High
    } else if u64::from(score) * 5 >= u64::from(threshold) * 3 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn is_negative_sentiment(sentiment: &str) -> bool {
    let sentiment = sentiment.trim().to_lowercase();
    NEGATIVE_SENTIMENTS.contains(&sentiment.as_str())
}
