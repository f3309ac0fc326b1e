pub mod types;

pub use types::{
    AnalysisResult, ComplianceScores, ConversationMessage, Covenant, CovenantStatus, RiskFinding,
    RiskSeverity, Role, UploadedFile, PDF_MEDIA_TYPE,
};
