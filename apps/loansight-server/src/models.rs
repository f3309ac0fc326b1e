//! Request and response bodies for the LoanSight API

use analysis_engine::insights::ComplianceBadges;
use analysis_engine::pipeline::stage_index_for_progress;
use analysis_engine::{Session, SessionPhase, Stage, STAGES};
use serde::{Deserialize, Serialize};
use shared_types::{AnalysisResult, ConversationMessage, RiskSeverity, UploadedFile};
use uuid::Uuid;

/// Stage indicator shown while a document is processing
#[derive(Debug, Clone, Serialize)]
pub struct StageIndicator {
    pub progress: u8,
    pub label: &'static str,
    pub reached: bool,
}

/// Display labels and counts for the results dashboard
#[derive(Debug, Clone, Serialize)]
pub struct ResultSummary {
    /// Badge text per covenant, in covenant order
    pub covenant_badges: Vec<&'static str>,
    pub high_risk_covenants: Vec<String>,
    pub high_risks: usize,
    pub medium_risks: usize,
    pub low_risks: usize,
    pub lma_standard: &'static str,
    pub regulatory_compliance: &'static str,
}

impl From<&AnalysisResult> for ResultSummary {
    fn from(result: &AnalysisResult) -> Self {
        let badges = ComplianceBadges::from(&result.compliance);
        Self {
            covenant_badges: result.covenants.iter().map(|c| c.status.label()).collect(),
            high_risk_covenants: result
                .high_risk_covenants()
                .map(|c| c.name.clone())
                .collect(),
            high_risks: result.risks_with_severity(RiskSeverity::High).count(),
            medium_risks: result.risks_with_severity(RiskSeverity::Medium).count(),
            low_risks: result.risks_with_severity(RiskSeverity::Low).count(),
            lma_standard: badges.lma_standard.label(),
            regulatory_compliance: badges.regulatory_compliance.label(),
        }
    }
}

/// Snapshot of one session
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub phase: &'static str,
    pub progress: u8,
    /// Stage currently displayed; only set while processing
    pub stage: Option<Stage>,
    pub stage_index: Option<usize>,
    pub stages: Vec<StageIndicator>,
    pub file: Option<UploadedFile>,
    pub result: Option<AnalysisResult>,
    pub compliance_badges: Option<ComplianceBadges>,
    pub summary: Option<ResultSummary>,
    pub messages: Vec<ConversationMessage>,
}

impl SessionView {
    pub fn new(id: Uuid, session: &Session) -> Self {
        let progress = session.progress();
        let (phase, stage_index) = match session.phase() {
            SessionPhase::AwaitingUpload => ("awaiting_upload", None),
            SessionPhase::Processing { progress } => {
                ("processing", Some(stage_index_for_progress(*progress)))
            }
            SessionPhase::Ready { .. } => ("ready", None),
        };
        let stages = if stage_index.is_some() {
            STAGES
                .iter()
                .map(|s| StageIndicator {
                    progress: s.progress,
                    label: s.label,
                    reached: s.is_reached(progress),
                })
                .collect()
        } else {
            Vec::new()
        };
        let result = session.result().cloned();

        Self {
            id,
            phase,
            progress,
            stage: stage_index.map(|i| STAGES[i]),
            stage_index,
            stages,
            file: session.file().cloned(),
            compliance_badges: result.as_ref().map(|r| ComplianceBadges::from(&r.compliance)),
            summary: result.as_ref().map(ResultSummary::from),
            result,
            messages: session.conversation().messages().to_vec(),
        }
    }
}

/// One file in an upload request
#[derive(Debug, Clone, Deserialize)]
pub struct UploadFilePayload {
    pub name: String,
    pub media_type: String,
    /// File bytes; only their length is used
    #[serde(default)]
    pub content_base64: Option<String>,
}

/// Upload request: a drop or browse selection
#[derive(Debug, Clone, Deserialize)]
pub struct UploadApiRequest {
    #[serde(default)]
    pub files: Vec<UploadFilePayload>,
}

/// Response to an accepted upload or sample selection
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: &'static str,
    pub file: UploadedFile,
    pub session: SessionView,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub success: bool,
    /// None when the question was blank or the document was replaced
    pub answer: Option<ConversationMessage>,
    pub message_count: usize,
}

/// Sample catalogue entry
#[derive(Debug, Clone, Serialize)]
pub struct SampleInfo {
    pub id: &'static str,
    pub file_name: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
}
