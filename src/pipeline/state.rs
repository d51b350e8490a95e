//! Run state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::channels::DeliveryStatus;
use crate::error::PipelineError;
use crate::registry::{ActRecord, Period, SearchFilter};

/// Placeholder summary for an act whose summarization failed.
pub const FALLBACK_SUMMARY: &str = "Nie udało się przygotować podsumowania tego aktu.";

/// Stage of a digest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Querying the registry.
    Fetching,
    /// The query returned nothing; sending the "no acts" notice.
    NoActsFound,
    /// Summarizing acts one at a time.
    Iterating,
    /// Rendering and dispatching the digest.
    Reporting,
    /// Finished. No further action.
    Done,
}

impl Stage {
    /// Check if this stage allows transitioning to another stage.
    pub fn can_transition_to(&self, target: Stage) -> bool {
        use Stage::*;

        matches!(
            (self, target),
            (Fetching, NoActsFound)
                | (Fetching, Iterating)
                | (Iterating, Reporting)
                | (NoActsFound, Done)
                | (Reporting, Done)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Fetching => "fetching",
            Self::NoActsFound => "no_acts_found",
            Self::Iterating => "iterating",
            Self::Reporting => "reporting",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// A stage transition event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTransition {
    pub from: Stage,
    pub to: Stage,
    pub timestamp: DateTime<Utc>,
}

/// What happened to the run's single notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    NotAttempted,
    Delivered(DeliveryStatus),
    Failed(String),
}

/// Per-run counts, logged when the run finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub summarized: usize,
    pub fallbacks: usize,
}

/// Working memory of one pipeline run.
///
/// Invariant: `cursor <= acts.len()`; iteration is finished when they are
/// equal.
#[derive(Debug, Clone)]
pub struct RunState {
    pub run_id: Uuid,
    pub filter: SearchFilter,
    pub period: Period,
    pub acts: Vec<ActRecord>,
    pub cursor: usize,
    pub stage: Stage,
    pub transitions: Vec<StageTransition>,
    pub dispatch: DispatchOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunState {
    pub fn new(filter: SearchFilter, period: Period) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            filter,
            period,
            acts: Vec::new(),
            cursor: 0,
            stage: Stage::Fetching,
            transitions: Vec::new(),
            dispatch: DispatchOutcome::NotAttempted,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Transition to a new stage.
    pub fn transition_to(&mut self, next: Stage) -> Result<(), PipelineError> {
        if !self.stage.can_transition_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.stage.to_string(),
                to: next.to_string(),
            });
        }

        self.transitions.push(StageTransition {
            from: self.stage,
            to: next,
            timestamp: Utc::now(),
        });
        self.stage = next;

        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Replace the act list and rewind the cursor.
    pub fn load_acts(&mut self, acts: Vec<ActRecord>) {
        self.acts = acts;
        self.cursor = 0;
    }

    /// The act under the cursor, if iteration is not finished.
    pub fn current_act_mut(&mut self) -> Option<&mut ActRecord> {
        self.acts.get_mut(self.cursor)
    }

    /// Move past the current act. Never moves beyond the end.
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1).min(self.acts.len());
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.acts.len()
    }

    pub fn summary(&self) -> RunSummary {
        let fallbacks = self
            .acts
            .iter()
            .filter(|a| a.summary == FALLBACK_SUMMARY)
            .count();
        let summarized = self
            .acts
            .iter()
            .filter(|a| a.is_summarized() && a.summary != FALLBACK_SUMMARY)
            .count();
        RunSummary {
            total: self.acts.len(),
            summarized,
            fallbacks,
        }
    }
}
