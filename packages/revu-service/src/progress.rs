//! Progress reporting for full runs.
//!
//! The caller hands a [`ProgressSink`] to the orchestrator for the duration of one run; events are
//! delivered synchronously, in order, from the task driving the run.

use serde::Serialize;

use revu_domain::AnalysisType;

use crate::{RunSummary, TypeOutcome};

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
	RunStarted { total: usize },
	TypeStarted { analysis_type: AnalysisType, index: usize },
	TypeFinished { analysis_type: AnalysisType, outcome: TypeOutcome },
	RunFinished { summary: RunSummary },
}

pub trait ProgressSink
where
	Self: Send + Sync,
{
	fn report(&self, event: ProgressEvent);
}

pub struct NoopProgress;
impl ProgressSink for NoopProgress {
	fn report(&self, _event: ProgressEvent) {}
}
