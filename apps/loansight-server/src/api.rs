//! API handlers for the LoanSight server
//!
//! Provides REST endpoints for:
//! - Session lifecycle (create, inspect, reset, delete)
//! - Document upload and sample selection
//! - Question answering over the analyzed document
//! - Static dashboard data (stages, samples, ROI, insights)

use std::io;

use analysis_engine::insights::{dashboard_insights, DashboardInsights};
use analysis_engine::intake::UPLOAD_ACCEPTED_NOTICE;
use analysis_engine::resolver::SUGGESTED_QUESTIONS;
use analysis_engine::roi::{format_bps, format_usd, group_thousands, RoiInputs, RoiReport};
use analysis_engine::session::RunTicket;
use analysis_engine::{
    submit, FileDescriptor, MockPipeline, SampleDocument, Stage, TokioScheduler,
    UploadCandidate, STAGES,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, read::DecoderReader};
use serde::Serialize;
use shared_types::UploadedFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ServerError;
use crate::models::{
    AnswerResponse, QuestionRequest, SampleInfo, SessionView, UploadApiRequest, UploadFilePayload,
    UploadResponse,
};
use crate::state::SessionProgress;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub active_sessions: usize,
}

/// Handler: GET /health
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "loansight-server",
        version: env!("CARGO_PKG_VERSION"),
        active_sessions: state.sessions.count().await,
    })
}

/// Handler: POST /api/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    (StatusCode::CREATED, Json(state.sessions.create().await))
}

/// Handler: GET /api/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ServerError> {
    state
        .sessions
        .view(id)
        .await
        .map(Json)
        .ok_or(ServerError::SessionNotFound(id))
}

/// Handler: DELETE /api/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::SessionNotFound(id))
    }
}

/// Handler: POST /api/sessions/:id/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UploadApiRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ServerError> {
    let Json(req) = payload?;
    info!("Upload request: session={}, files={}", id, req.files.len());
    ensure_session(&state, id).await?;

    // Only the first file of a drop counts; the rest are never read
    let (candidate, content) = match req.files.into_iter().next() {
        Some(UploadFilePayload {
            name,
            media_type,
            content_base64,
        }) => (
            UploadCandidate::Files(vec![FileDescriptor::new(name, media_type, 0)]),
            content_base64,
        ),
        None => (UploadCandidate::Files(Vec::new()), None),
    };

    let mut file = submit(candidate)?;
    if let Some(content) = content {
        file.size_bytes = decoded_len(&file.name, &content)?;
        debug!("Upload '{}' is {} bytes", file.name, file.size_bytes);
    }

    start_analysis(&state, id, file).await
}

/// Handler: POST /api/sessions/:id/samples/:sample
pub async fn handle_select_sample(
    State(state): State<AppState>,
    Path((id, sample)): Path<(Uuid, String)>,
) -> Result<(StatusCode, Json<UploadResponse>), ServerError> {
    let sample: SampleDocument = sample.parse()?;
    info!("Sample request: session={}, sample={}", id, sample);
    ensure_session(&state, id).await?;

    let file = submit(UploadCandidate::Sample(sample))?;
    start_analysis(&state, id, file).await
}

async fn ensure_session(state: &AppState, id: Uuid) -> Result<(), ServerError> {
    match state.sessions.view(id).await {
        Some(_) => Ok(()),
        None => Err(ServerError::SessionNotFound(id)),
    }
}

/// Length of base64 content once decoded. The decoded bytes are streamed
/// into a sink, never buffered.
fn decoded_len(name: &str, content: &str) -> Result<u64, ServerError> {
    let mut decoder = DecoderReader::new(content.as_bytes(), &BASE64);
    io::copy(&mut decoder, &mut io::sink()).map_err(|e| {
        ServerError::InvalidRequest(format!("Invalid base64 content for '{}': {}", name, e))
    })
}

/// Hand an accepted file to the session and kick off the pipeline for it
async fn start_analysis(
    state: &AppState,
    id: Uuid,
    file: UploadedFile,
) -> Result<(StatusCode, Json<UploadResponse>), ServerError> {
    let ticket = state
        .sessions
        .update(id, |session| session.begin_upload(file.clone()))
        .await
        .ok_or(ServerError::SessionNotFound(id))?;

    spawn_pipeline(state, id, ticket, file.clone());

    let session = state
        .sessions
        .view(id)
        .await
        .ok_or(ServerError::SessionNotFound(id))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(UploadResponse {
            success: true,
            message: UPLOAD_ACCEPTED_NOTICE,
            file,
            session,
        }),
    ))
}

/// Run the pipeline in the background and install its result if the run is
/// still current when it finishes
fn spawn_pipeline(state: &AppState, id: Uuid, ticket: RunTicket, file: UploadedFile) {
    let store = state.sessions.clone();
    let pipeline = MockPipeline::new(TokioScheduler).with_stage_delay(state.stage_delay);
    debug!(
        "Session {} pipeline starting, {:?} per stage",
        id,
        pipeline.stage_delay()
    );

    tokio::spawn(async move {
        let mut progress = SessionProgress {
            store: store.clone(),
            id,
            ticket,
        };
        let result = pipeline.run(&file, &mut progress).await;

        match store
            .update(id, |session| session.complete(ticket, result))
            .await
        {
            Some(true) => info!("Session {} analysis ready", id),
            Some(false) => debug!("Session {} moved on; result discarded", id),
            None => debug!("Session {} gone; result discarded", id),
        }
    });
}

/// Handler: POST /api/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ServerError> {
    state
        .sessions
        .update(id, |session| session.reset())
        .await
        .ok_or(ServerError::SessionNotFound(id))?;
    info!("Session {} reset", id);

    state
        .sessions
        .view(id)
        .await
        .map(Json)
        .ok_or(ServerError::SessionNotFound(id))
}

/// Handler: POST /api/sessions/:id/questions
pub async fn handle_ask(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ServerError> {
    let Json(req) = payload?;
    debug!("Question for session {}: {:?}", id, req.question);

    let pending = state
        .sessions
        .update(id, |session| session.pose_question(&req.question))
        .await
        .ok_or(ServerError::SessionNotFound(id))??;

    let answer = match pending {
        Some(pending) => {
            tokio::time::sleep(state.answer_delay).await;
            state
                .sessions
                .update(id, |session| session.deliver_answer(pending).cloned())
                .await
                .ok_or(ServerError::SessionNotFound(id))?
        }
        None => None,
    };

    if answer.is_none() {
        debug!("Session {}: question produced no answer", id);
    }

    let message_count = state
        .sessions
        .update(id, |session| session.conversation().len())
        .await
        .ok_or(ServerError::SessionNotFound(id))?;

    Ok(Json(AnswerResponse {
        success: true,
        answer,
        message_count,
    }))
}

/// Handler: GET /api/pipeline/stages
pub async fn handle_list_stages() -> Json<&'static [Stage]> {
    Json(STAGES)
}

/// Handler: GET /api/samples
pub async fn handle_list_samples() -> Json<Vec<SampleInfo>> {
    Json(
        SampleDocument::ALL
            .iter()
            .map(|s| SampleInfo {
                id: s.slug(),
                file_name: s.file_name(),
                title: s.title(),
                subtitle: s.subtitle(),
            })
            .collect(),
    )
}

/// Handler: GET /api/questions/suggested
pub async fn handle_suggested_questions() -> Json<&'static [&'static str]> {
    Json(SUGGESTED_QUESTIONS)
}

/// ROI report plus display strings
#[derive(Serialize)]
pub struct RoiResponse {
    pub success: bool,
    pub report: RoiReport,
    pub display: RoiDisplay,
}

#[derive(Serialize)]
pub struct RoiDisplay {
    pub manual_cost: String,
    pub automated_cost: String,
    pub savings_per_document: String,
    pub cost_reduction: String,
    pub annual_savings: String,
    pub hours_saved: String,
    pub productivity_gain: String,
}

impl From<RoiReport> for RoiResponse {
    fn from(report: RoiReport) -> Self {
        let display = RoiDisplay {
            manual_cost: format_usd(i64::try_from(report.manual.total_cents).unwrap_or(i64::MAX)),
            automated_cost: format_usd(
                i64::try_from(report.automated.total_cents).unwrap_or(i64::MAX),
            ),
            savings_per_document: format_usd(report.savings_per_document_cents),
            cost_reduction: format_bps(report.cost_reduction_bps),
            annual_savings: format_usd(report.annual.total_savings_cents),
            hours_saved: format!("{} hours", group_thousands(report.annual.hours_saved)),
            productivity_gain: format!("{}%", report.annual.productivity_gain_percent),
        };
        Self {
            success: true,
            report,
            display,
        }
    }
}

/// Handler: GET /api/roi
pub async fn handle_roi() -> Json<RoiResponse> {
    Json(RoiInputs::default().report().into())
}

/// Handler: POST /api/roi
pub async fn handle_roi_custom(
    payload: Result<Json<RoiInputs>, JsonRejection>,
) -> Result<Json<RoiResponse>, ServerError> {
    let Json(inputs) = payload?;
    debug!("ROI inputs: {:?}", inputs);
    Ok(Json(inputs.report().into()))
}

/// Dashboard data plus the headline tiles as display strings
#[derive(Serialize)]
pub struct InsightsResponse {
    #[serde(flatten)]
    pub insights: DashboardInsights,
    pub headline_display: Vec<String>,
}

/// Handler: GET /api/insights
pub async fn handle_insights() -> Json<InsightsResponse> {
    let insights = dashboard_insights();
    let headline_display = insights
        .headline_stats
        .iter()
        .map(|stat| stat.display())
        .collect();
    Json(InsightsResponse {
        insights,
        headline_display,
    })
}
