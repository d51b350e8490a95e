//! Act-processing pipeline.
//!
//! One run flows through:
//! 1. `ActSource::search()`: registry query, failures absorbed
//! 2. `Summarizer::summarize()`: once per act, in discovery order
//! 3. `report`: "no acts" notice or the full digest table
//! 4. `Notifier::send()`: exactly one notification per run

pub mod processor;
pub mod report;
pub mod state;

pub use processor::ActPipeline;
pub use state::{DispatchOutcome, FALLBACK_SUMMARY, RunState, RunSummary, Stage};
