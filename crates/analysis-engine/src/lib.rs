pub mod insights;
pub mod intake;
pub mod mock;
pub mod pipeline;
pub mod resolver;
pub mod roi;
pub mod session;

pub use intake::{submit, FileDescriptor, IntakeError, SampleDocument, UploadCandidate};
pub use pipeline::{
    stage_for_progress, ImmediateScheduler, MockPipeline, ProgressSink, Scheduler, Stage,
    TokioScheduler, DEFAULT_STAGE_DELAY, STAGES,
};
pub use resolver::{resolve, DEFAULT_ANSWER_DELAY, FALLBACK_ANSWER};
pub use session::{Session, SessionError, SessionPhase};
