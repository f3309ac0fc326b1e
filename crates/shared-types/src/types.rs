use std::fmt;

/// The only media type accepted for user uploads
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A file accepted by upload intake. Content is never inspected.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: String,
    pub size_bytes: u64, // 0 for built-in samples
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size_bytes,
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }
}

/// Extracted terms for one credit agreement.
///
/// Produced in one piece when the analysis pipeline completes and never
/// updated afterwards; a new upload replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub borrower: String,
    pub loan_amount: String,    // e.g., "$500,000,000"
    pub interest_rate: String,  // e.g., "SOFR + 325 bps"
    pub maturity: String,       // e.g., "December 15, 2029"
    pub leverage: String,       // e.g., "5.5x EBITDA"
    pub covenants: Vec<Covenant>,
    pub risks: Vec<RiskFinding>,
    pub compliance: ComplianceScores,
}

impl AnalysisResult {
    /// Risk findings at the given severity, in document order
    pub fn risks_with_severity(
        &self,
        severity: RiskSeverity,
    ) -> impl Iterator<Item = &RiskFinding> {
        self.risks.iter().filter(move |r| r.severity == severity)
    }

    /// Covenants flagged as high risk
    pub fn high_risk_covenants(&self) -> impl Iterator<Item = &Covenant> {
        self.covenants
            .iter()
            .filter(|c| c.status == CovenantStatus::HighRisk)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Covenant {
    pub name: String,
    pub value: String,
    pub status: CovenantStatus,
    pub benchmark: String, // e.g., "4.0x market avg"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CovenantStatus {
    LowRisk,
    MediumRisk,
    HighRisk,
}

impl CovenantStatus {
    /// Badge text shown next to the covenant
    pub fn label(&self) -> &'static str {
        match self {
            CovenantStatus::LowRisk => "LOW RISK",
            CovenantStatus::MediumRisk => "MEDIUM RISK",
            CovenantStatus::HighRisk => "HIGH RISK",
        }
    }
}

impl fmt::Display for CovenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CovenantStatus::LowRisk => write!(f, "low-risk"),
            CovenantStatus::MediumRisk => write!(f, "medium-risk"),
            CovenantStatus::HighRisk => write!(f, "high-risk"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RiskFinding {
    pub severity: RiskSeverity,
    pub finding: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskSeverity::Low => write!(f, "low"),
            RiskSeverity::Medium => write!(f, "medium"),
            RiskSeverity::High => write!(f, "high"),
        }
    }
}

/// Percentage scores, each 0-100
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceScores {
    pub lma_standard: u8,
    pub regulatory_compliance: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
