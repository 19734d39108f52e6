use serde::{Deserialize, Serialize};

/// Assessed likelihood for one condition.
///
/// The wire form is the human-readable label (`"Not Detected"`), which is
/// what the analysis service is instructed to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Minimal,
    #[serde(rename = "Not Detected")]
    NotDetected,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Minimal => "Minimal",
            RiskLevel::NotDetected => "Not Detected",
        };
        f.write_str(label)
    }
}

/// One analyzed condition in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionReport {
    pub condition_name: String,
    pub risk_level: RiskLevel,
    pub explanation: String,
    pub symptoms: Vec<String>,
}

/// The structured response of the analysis boundary.
///
/// Treated as opaque past schema shape: the service enforces the schema,
/// we only require that it deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: String,
    pub conditions: Vec<ConditionReport>,
}
