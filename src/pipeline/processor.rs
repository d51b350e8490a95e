//! Act pipeline: fetch, summarize each act, report.
//!
//! **Core invariant: one act's failure never aborts the run.**
//! Summarization errors are caught at the per-act boundary and replaced with
//! [`FALLBACK_SUMMARY`].
//!
//! Flow:
//! 1. Fetching → registry search (once)
//! 2. NoActsFound → "no acts" notice, or Iterating → one summary per act
//! 3. Reporting → one digest notification
//! 4. Done

use std::sync::Arc;

use tracing::{Instrument, info, info_span, warn};

use crate::channels::{Notification, Notifier};
use crate::error::PipelineError;
use crate::pipeline::report;
use crate::pipeline::state::{DispatchOutcome, FALLBACK_SUMMARY, RunState, Stage};
use crate::registry::{ActSource, Period, SearchFilter};
use crate::summarizer::Summarizer;

/// Drives one digest run from registry query to notification.
pub struct ActPipeline {
    source: Arc<dyn ActSource>,
    summarizer: Arc<dyn Summarizer>,
    notifier: Arc<dyn Notifier>,
}

impl ActPipeline {
    pub fn new(
        source: Arc<dyn ActSource>,
        summarizer: Arc<dyn Summarizer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            summarizer,
            notifier,
        }
    }

    /// Run to completion. The returned state is always in `Stage::Done`.
    pub async fn run(
        &self,
        filter: SearchFilter,
        period: Period,
    ) -> Result<RunState, PipelineError> {
        let mut state = RunState::new(filter, period);
        let span = info_span!("digest_run", run_id = %state.run_id);

        async move {
            self.fetch(&mut state).await;

            if state.acts.is_empty() {
                state.transition_to(Stage::NoActsFound)?;
                let notice = report::no_acts_notification(&state.period, &state.filter.keywords);
                self.dispatch(&mut state, &notice).await;
                state.transition_to(Stage::Done)?;
                info!("No acts found, run complete");
                return Ok(state);
            }

            state.transition_to(Stage::Iterating)?;
            while !state.is_exhausted() {
                self.process_current(&mut state).await;
                state.advance();
            }

            state.transition_to(Stage::Reporting)?;
            let digest =
                report::digest_notification(&state.period, &state.filter.keywords, &state.acts);
            self.dispatch(&mut state, &digest).await;
            state.transition_to(Stage::Done)?;

            let summary = state.summary();
            info!(
                total = summary.total,
                summarized = summary.summarized,
                fallbacks = summary.fallbacks,
                "Digest run complete"
            );
            Ok::<_, PipelineError>(state)
        }
        .instrument(span)
        .await
    }

    async fn fetch(&self, state: &mut RunState) {
        info!(
            keywords = ?state.filter.keywords,
            range = ?state.filter.date_range,
            "Fetching acts from registry"
        );
        let acts = self.source.search(&state.filter).await;
        info!(count = acts.len(), "Acts discovered");
        state.load_acts(acts);
    }

    /// Summarize the act under the cursor, falling back on any failure.
    async fn process_current(&self, state: &mut RunState) {
        let index = state.cursor;
        let total = state.acts.len();
        let Some(act) = state.current_act_mut() else {
            return;
        };

        let span = info_span!("act", index = index + 1, total, title = %act.title);
        let result = self
            .summarizer
            .summarize(act.document_url())
            .instrument(span.clone())
            .await;

        let _guard = span.enter();
        match result {
            Ok(summary) => {
                info!(chars = summary.chars().count(), "Act summarized");
                act.summary = summary;
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed, using fallback");
                act.summary = FALLBACK_SUMMARY.to_string();
            }
        }
    }

    /// Send the run's notification. Failures are recorded, never retried.
    async fn dispatch(&self, state: &mut RunState, notification: &Notification) {
        info!(
            channel = self.notifier.name(),
            subject = %notification.subject,
            "Dispatching notification"
        );
        state.dispatch = match self.notifier.send(notification).await {
            Ok(status) => DispatchOutcome::Delivered(status),
            Err(e) => {
                warn!(channel = self.notifier.name(), error = %e, "Notification dispatch failed");
                DispatchOutcome::Failed(e.to_string())
            }
        };
    }
}
