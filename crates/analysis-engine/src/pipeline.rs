//! Mock analysis pipeline
//!
//! Walks a fixed table of stages, waiting one delay before each, and then
//! yields the canned [`AnalysisResult`]. The stage table is plain data; the
//! waiting is delegated to a [`Scheduler`] so tests can run without a clock.

use std::future::{self, Future};
use std::time::Duration;

use serde::Serialize;
use shared_types::{AnalysisResult, UploadedFile};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::mock;

/// Delay before each stage fires
pub const DEFAULT_STAGE_DELAY: Duration = Duration::from_millis(600);

/// One step of the processing animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub progress: u8,
    pub label: &'static str,
}

impl Stage {
    /// Whether a progress value has reached this stage's threshold
    pub fn is_reached(&self, progress: u8) -> bool {
        progress >= self.progress
    }
}

pub const STAGES: &[Stage] = &[
    Stage {
        progress: 20,
        label: "Parsing document...",
    },
    Stage {
        progress: 40,
        label: "Extracting key terms...",
    },
    Stage {
        progress: 60,
        label: "Analyzing covenants...",
    },
    Stage {
        progress: 80,
        label: "Calculating risk scores...",
    },
    Stage {
        progress: 100,
        label: "Complete!",
    },
];

/// Index into [`STAGES`] of the stage to display for `progress`.
///
/// Picks the first stage whose threshold is at or above `progress`, falling
/// back to the last stage when `progress` is past every threshold.
pub fn stage_index_for_progress(progress: u8) -> usize {
    STAGES
        .iter()
        .position(|s| s.progress >= progress)
        .unwrap_or(STAGES.len() - 1)
}

pub fn stage_for_progress(progress: u8) -> &'static Stage {
    &STAGES[stage_index_for_progress(progress)]
}

/// Source of the delays between stages
pub trait Scheduler {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn delay(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
        future::ready(())
    }
}

/// Receives each progress value as its stage fires
pub trait ProgressSink {
    fn report(&mut self, progress: u8) -> impl Future<Output = ()> + Send;
}

impl ProgressSink for Vec<u8> {
    fn report(&mut self, progress: u8) -> impl Future<Output = ()> + Send {
        self.push(progress);
        future::ready(())
    }
}

impl ProgressSink for watch::Sender<u8> {
    fn report(&mut self, progress: u8) -> impl Future<Output = ()> + Send {
        // No receivers left just means nobody is watching
        let _ = self.send(progress);
        future::ready(())
    }
}

/// The staged mock pipeline
#[derive(Debug, Clone)]
pub struct MockPipeline<S> {
    scheduler: S,
    stage_delay: Duration,
}

impl<S: Scheduler> MockPipeline<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            stage_delay: DEFAULT_STAGE_DELAY,
        }
    }

    pub fn with_stage_delay(mut self, stage_delay: Duration) -> Self {
        self.stage_delay = stage_delay;
        self
    }

    pub fn stage_delay(&self) -> Duration {
        self.stage_delay
    }

    /// Run every stage in order and return the analysis.
    ///
    /// The file is only used for logging. Dropping the returned future before
    /// it resolves yields nothing, so no partial result can escape.
    pub async fn run<P>(&self, file: &UploadedFile, progress: &mut P) -> AnalysisResult
    where
        P: ProgressSink + Send,
    {
        info!("Analyzing '{}' ({} bytes)", file.name, file.size_bytes);

        for stage in STAGES {
            self.scheduler.delay(self.stage_delay).await;
            debug!("Stage {}%: {}", stage.progress, stage.label);
            progress.report(stage.progress).await;
        }

        info!("Analysis of '{}' complete", file.name);
        mock::sample_analysis()
    }
}

impl Default for MockPipeline<TokioScheduler> {
    fn default() -> Self {
        Self::new(TokioScheduler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::SampleDocument;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    /// Records requested delays without waiting
    #[derive(Default, Clone)]
    struct RecordingScheduler {
        delays: Arc<Mutex<Vec<Duration>>>,
    }

    impl Scheduler for RecordingScheduler {
        fn delay(&self, duration: Duration) -> impl Future<Output = ()> + Send {
            self.delays.lock().unwrap().push(duration);
            future::ready(())
        }
    }

    #[test]
    fn test_stage_table_is_strictly_increasing_and_ends_at_100() {
        assert!(STAGES.windows(2).all(|w| w[0].progress < w[1].progress));
        assert_eq!(STAGES.last().unwrap().progress, 100);
        assert_eq!(STAGES.len(), 5);
    }

    #[test]
    fn test_stage_lookup_exact_thresholds() {
        for stage in STAGES {
            assert_eq!(stage_for_progress(stage.progress), stage);
        }
    }

    #[test]
    fn test_stage_lookup_between_thresholds() {
        assert_eq!(stage_for_progress(45).label, "Analyzing covenants...");
        assert_eq!(stage_for_progress(0).label, "Parsing document...");
        assert_eq!(stage_for_progress(21).label, "Extracting key terms...");
        assert_eq!(stage_for_progress(99).label, "Complete!");
    }

    #[test]
    fn test_stage_lookup_past_all_thresholds_selects_last() {
        assert_eq!(stage_index_for_progress(101), STAGES.len() - 1);
        assert_eq!(stage_for_progress(u8::MAX).label, "Complete!");
    }

    #[test]
    fn test_stage_reached() {
        let stage = stage_for_progress(60);
        assert!(stage.is_reached(60));
        assert!(stage.is_reached(80));
        assert!(!stage.is_reached(59));
    }

    #[tokio::test]
    async fn test_run_emits_every_stage_in_order() {
        let pipeline = MockPipeline::new(ImmediateScheduler);
        let mut progress = Vec::new();
        let file = SampleDocument::CreditAgreement.to_uploaded_file();

        let result = pipeline.run(&file, &mut progress).await;

        assert_eq!(progress, vec![20, 40, 60, 80, 100]);
        assert_eq!(result, mock::sample_analysis());
    }

    #[tokio::test]
    async fn test_run_waits_one_delay_per_stage() {
        let scheduler = RecordingScheduler::default();
        let pipeline = MockPipeline::new(scheduler.clone());
        let file = UploadedFile::new("deal.pdf", "application/pdf", 10);

        pipeline.run(&file, &mut Vec::new()).await;

        let delays = scheduler.delays.lock().unwrap().clone();
        assert_eq!(delays, vec![DEFAULT_STAGE_DELAY; STAGES.len()]);
    }

    #[tokio::test]
    async fn test_custom_stage_delay() {
        let scheduler = RecordingScheduler::default();
        let pipeline =
            MockPipeline::new(scheduler.clone()).with_stage_delay(Duration::from_millis(5));
        assert_eq!(pipeline.stage_delay(), Duration::from_millis(5));

        pipeline
            .run(&SampleDocument::LeveragedLoan.to_uploaded_file(), &mut Vec::new())
            .await;

        assert!(scheduler
            .delays
            .lock()
            .unwrap()
            .iter()
            .all(|d| *d == Duration::from_millis(5)));
    }

    #[tokio::test]
    async fn test_watch_sink_ends_at_100() {
        let (tx, rx) = watch::channel(0u8);
        let mut tx = tx;
        MockPipeline::new(ImmediateScheduler)
            .run(&SampleDocument::CreditAgreement.to_uploaded_file(), &mut tx)
            .await;
        assert_eq!(*rx.borrow(), 100);
    }

    #[tokio::test]
    async fn test_result_is_independent_of_input() {
        let pipeline = MockPipeline::new(ImmediateScheduler);
        let a = pipeline
            .run(&SampleDocument::CreditAgreement.to_uploaded_file(), &mut Vec::new())
            .await;
        let b = pipeline
            .run(&SampleDocument::LeveragedLoan.to_uploaded_file(), &mut Vec::new())
            .await;
        let c = pipeline
            .run(
                &UploadedFile::new("huge.pdf", "application/pdf", 900_000_000),
                &mut Vec::new(),
            )
            .await;
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_takes_five_stage_delays() {
        let start = tokio::time::Instant::now();
        MockPipeline::default()
            .run(&SampleDocument::CreditAgreement.to_uploaded_file(), &mut Vec::new())
            .await;
        assert!(start.elapsed() >= DEFAULT_STAGE_DELAY * STAGES.len() as u32);
    }

    proptest! {
        /// Property: the displayed stage is the first one at or above progress
        #[test]
        fn stage_lookup_picks_first_threshold_at_or_above(progress in 0u8..=255) {
            let stage = stage_for_progress(progress);
            if progress <= 100 {
                prop_assert!(stage.progress >= progress);
                let earlier_match = STAGES
                    .iter()
                    .take_while(|s| *s != stage)
                    .any(|s| s.progress >= progress);
                prop_assert!(!earlier_match);
            } else {
                prop_assert_eq!(stage, STAGES.last().unwrap());
            }
        }
    }
}
