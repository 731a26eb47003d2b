use serde::{Deserialize, Serialize};

pub const DEFAULT_DOMAIN: &str = "banking";
pub const DEFAULT_RISK_THRESHOLD: u32 = 70;
pub const DEFAULT_COMPLIANCE_TRIGGERS: [&str; 3] =
    ["RBI complaint", "legal action", "fraud allegation"];

/// Caller-supplied tenant options; every field may be missing or null
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantConfigInput {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub risk_threshold: Option<i64>,
    #[serde(default)]
    pub compliance_triggers: Option<Vec<String>>,
}

/// Per-request tenant settings consumed by prompt building and risk scoring.
///
/// Fields are private so a config cannot change once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TenantConfigInput")]
pub struct TenantConfig {
    domain: String,
    risk_threshold: u32,
    compliance_triggers: Vec<String>,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            compliance_triggers: DEFAULT_COMPLIANCE_TRIGGERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl From<TenantConfigInput> for TenantConfig {
    fn from(input: TenantConfigInput) -> Self {
        let defaults = Self::default();
        Self {
            domain: input.domain.unwrap_or(defaults.domain),
            risk_threshold: input
                .risk_threshold
                .map(|t| t.clamp(0, 100) as u32)
                .unwrap_or(defaults.risk_threshold),
            compliance_triggers: input
                .compliance_triggers
                .unwrap_or(defaults.compliance_triggers),
        }
    }
}

impl TenantConfig {
    /// Build from explicit values; the threshold is clamped to 0..=100
    pub fn new(
        domain: impl Into<String>,
        risk_threshold: u32,
        compliance_triggers: Vec<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            risk_threshold: risk_threshold.min(100),
            compliance_triggers,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn risk_threshold(&self) -> u32 {
        self.risk_threshold
    }

    pub fn compliance_triggers(&self) -> &[String] {
        &self.compliance_triggers
    }
}
