use serde::Serialize;

use super::RiskLevel;

/// Deterministic verdict derived from an analysis record and a tenant config
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskVerdict {
    /// 0-100
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    /// One line per rule that fired, in rule order
    pub risk_reasoning: Vec<String>,
}
