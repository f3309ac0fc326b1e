//! Per-user session state
//!
//! A session moves through `AwaitingUpload -> Processing -> Ready` and back
//! to `AwaitingUpload` on reset. Each accepted upload is issued a
//! [`RunTicket`]; only the holder of the current ticket may report progress
//! or install a result, so a pipeline abandoned by a reset or a newer upload
//! can never surface its output.

use serde::Serialize;
use shared_types::{AnalysisResult, ConversationMessage, UploadedFile};
use thiserror::Error;
use tracing::{debug, info};

use crate::resolver;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No analysis is ready for this session")]
    NotReady,
}

/// Token identifying one pipeline run within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RunTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    AwaitingUpload,
    Processing { progress: u8 },
    Ready { result: AnalysisResult },
}

/// Ordered chat history for the current document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ConversationMessage>,
}

impl Conversation {
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    fn push(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    fn clear(&mut self) {
        self.messages.clear();
    }
}

/// An answer computed for a question but not yet appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnswer {
    ticket: RunTicket,
    content: String,
}

impl PendingAnswer {
    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    phase: SessionPhase,
    file: Option<UploadedFile>,
    conversation: Conversation,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::AwaitingUpload,
            file: None,
            conversation: Conversation::default(),
            generation: 0,
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.phase {
            SessionPhase::Ready { result } => Some(result),
            _ => None,
        }
    }

    /// Progress as shown on the progress bar
    pub fn progress(&self) -> u8 {
        match self.phase {
            SessionPhase::AwaitingUpload => 0,
            SessionPhase::Processing { progress } => progress,
            SessionPhase::Ready { .. } => 100,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.phase, SessionPhase::Processing { .. })
    }

    /// Start processing an accepted file. Invalidates any earlier run and
    /// starts a fresh conversation.
    pub fn begin_upload(&mut self, file: UploadedFile) -> RunTicket {
        self.generation += 1;
        info!("Processing '{}' (run {})", file.name, self.generation);
        self.file = Some(file);
        self.conversation.clear();
        self.phase = SessionPhase::Processing { progress: 0 };
        RunTicket(self.generation)
    }

    pub fn is_current(&self, ticket: RunTicket) -> bool {
        ticket.0 == self.generation && self.is_processing()
    }

    /// Record a stage transition. Returns false if the ticket is stale.
    pub fn record_progress(&mut self, ticket: RunTicket, progress: u8) -> bool {
        if !self.is_current(ticket) {
            debug!("Dropping progress {} from stale run {}", progress, ticket.0);
            return false;
        }
        self.phase = SessionPhase::Processing { progress };
        true
    }

    /// Install the finished analysis and open the conversation with a
    /// greeting. A stale ticket discards the result and returns false.
    pub fn complete(&mut self, ticket: RunTicket, result: AnalysisResult) -> bool {
        if !self.is_current(ticket) {
            debug!("Discarding result from stale run {}", ticket.0);
            return false;
        }
        self.conversation
            .push(ConversationMessage::assistant(resolver::greeting(&result)));
        self.phase = SessionPhase::Ready { result };
        true
    }

    /// Back to the upload screen
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = SessionPhase::AwaitingUpload;
        self.file = None;
        self.conversation.clear();
    }

    /// Append the user's question and compute the answer without appending it.
    ///
    /// Returns `Ok(None)` for blank questions, which are ignored.
    pub fn pose_question(&mut self, question: &str) -> Result<Option<PendingAnswer>, SessionError> {
        let result = self.result().ok_or(SessionError::NotReady)?;
        if question.trim().is_empty() {
            return Ok(None);
        }

        let content = resolver::resolve(question, result);
        self.conversation.push(ConversationMessage::user(question));
        Ok(Some(PendingAnswer {
            ticket: RunTicket(self.generation),
            content,
        }))
    }

    /// Append a pending answer. Dropped if the document changed in between.
    pub fn deliver_answer(&mut self, pending: PendingAnswer) -> Option<&ConversationMessage> {
        if pending.ticket.0 != self.generation || self.result().is_none() {
            debug!("Dropping answer for a replaced document");
            return None;
        }
        self.conversation
            .push(ConversationMessage::assistant(pending.content));
        self.conversation.last()
    }

    /// Question and answer in one step
    pub fn ask(&mut self, question: &str) -> Result<Option<&ConversationMessage>, SessionError> {
        match self.pose_question(question)? {
            Some(pending) => Ok(self.deliver_answer(pending)),
            None => Ok(None),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::SampleDocument;
    use crate::mock::sample_analysis;
    use pretty_assertions::assert_eq;
    use shared_types::Role;

    fn ready_session() -> Session {
        let mut session = Session::new();
        let ticket = session.begin_upload(SampleDocument::CreditAgreement.to_uploaded_file());
        assert!(session.complete(ticket, sample_analysis()));
        session
    }

    #[test]
    fn test_new_session_awaits_upload() {
        let session = Session::new();
        assert_eq!(session.phase(), &SessionPhase::AwaitingUpload);
        assert_eq!(session.progress(), 0);
        assert!(session.result().is_none());
        assert!(session.conversation().is_empty());
    }

    #[test]
    fn test_upload_lifecycle() {
        let mut session = Session::new();
        let ticket = session.begin_upload(SampleDocument::LeveragedLoan.to_uploaded_file());
        assert_eq!(session.phase(), &SessionPhase::Processing { progress: 0 });

        for p in [20, 40, 60, 80, 100] {
            assert!(session.record_progress(ticket, p));
            assert_eq!(session.progress(), p);
            assert!(session.result().is_none());
        }

        assert!(session.complete(ticket, sample_analysis()));
        assert_eq!(session.result(), Some(&sample_analysis()));
        assert_eq!(session.file().unwrap().name, "sample-leveraged-loan.pdf");
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(session.conversation().messages()[0].role, Role::Assistant);
    }

    #[test]
    fn test_stale_ticket_cannot_install_result() {
        let mut session = Session::new();
        let first = session.begin_upload(SampleDocument::CreditAgreement.to_uploaded_file());
        let second = session.begin_upload(SampleDocument::LeveragedLoan.to_uploaded_file());

        assert!(!session.record_progress(first, 80));
        assert!(!session.complete(first, sample_analysis()));
        assert_eq!(session.phase(), &SessionPhase::Processing { progress: 0 });

        assert!(session.complete(second, sample_analysis()));
        assert!(!session.complete(second, sample_analysis()));
    }

    #[test]
    fn test_reset_abandons_in_flight_run() {
        let mut session = Session::new();
        let ticket = session.begin_upload(SampleDocument::CreditAgreement.to_uploaded_file());
        session.record_progress(ticket, 40);
        session.reset();

        assert!(!session.complete(ticket, sample_analysis()));
        assert_eq!(session.phase(), &SessionPhase::AwaitingUpload);
        assert!(session.file().is_none());
    }

    #[test]
    fn test_ask_appends_user_then_assistant() {
        let mut session = ready_session();
        let answer = session.ask("What's the leverage ratio?").unwrap().unwrap();
        assert_eq!(answer.role, Role::Assistant);
        assert!(answer.content.contains("5.5x EBITDA"));

        let messages = session.conversation().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], ConversationMessage::user("What's the leverage ratio?"));
        assert_eq!(messages[2].role, Role::Assistant);
    }

    #[test]
    fn test_blank_question_ignored() {
        let mut session = ready_session();
        assert_eq!(session.ask("   ").unwrap(), None);
        assert_eq!(session.conversation().len(), 1);
    }

    #[test]
    fn test_ask_before_ready_fails() {
        let mut session = Session::new();
        assert_eq!(session.ask("leverage"), Err(SessionError::NotReady));
        session.begin_upload(SampleDocument::CreditAgreement.to_uploaded_file());
        assert_eq!(session.ask("leverage"), Err(SessionError::NotReady));
    }

    #[test]
    fn test_new_upload_clears_conversation() {
        let mut session = ready_session();
        session.ask("collateral?").unwrap();
        assert_eq!(session.conversation().len(), 3);

        let ticket = session.begin_upload(SampleDocument::LeveragedLoan.to_uploaded_file());
        assert!(session.conversation().is_empty());
        session.complete(ticket, sample_analysis());
        assert_eq!(session.conversation().len(), 1);
    }

    #[test]
    fn test_pending_answer_dropped_after_reset() {
        let mut session = ready_session();
        let pending = session.pose_question("default terms?").unwrap().unwrap();
        assert!(pending.content().starts_with("Events of Default"));
        session.reset();
        assert!(session.deliver_answer(pending).is_none());
        assert!(session.conversation().is_empty());
    }

    #[test]
    fn test_phase_serialization_is_tagged() {
        let value = serde_json::to_value(SessionPhase::Processing { progress: 40 }).unwrap();
        assert_eq!(value, serde_json::json!({"phase": "processing", "progress": 40}));
    }
}
