//! In-process registry of background full runs.
//!
//! A submitted run takes the product's processing flag before the caller gets its ticket, so a
//! second submission for the same product fails fast with a conflict. Progress is kept in memory
//! and polled by run id.

use std::{
	collections::HashMap,
	sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::Serialize;
use uuid::Uuid;

use revu_domain::AnalysisType;

use crate::{
	AnalysisStatusSummary, ProgressEvent, ProgressSink, Result, RevuService, RunSummary,
	TypeOutcome,
};

type Runs = Arc<Mutex<HashMap<Uuid, RunEntry>>>;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunProgress {
	pub total: usize,
	pub started: usize,
	pub current: Option<AnalysisType>,
	pub completed: usize,
	pub failed: usize,
	pub skipped: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
	Running { progress: RunProgress },
	Finished { summary: RunSummary },
	/// The run aborted before it could walk the plan.
	Failed { error: String },
}
impl RunState {
	pub fn is_running(&self) -> bool {
		matches!(self, Self::Running { .. })
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct RunTicket {
	pub run_id: Uuid,
	pub product_id: Uuid,
}

struct RunEntry {
	product_id: Uuid,
	user_id: Uuid,
	state: RunState,
}

#[derive(Clone)]
pub struct RunRegistry {
	service: Arc<RevuService>,
	// TODO: evict finished runs once they are older than a retention window.
	runs: Runs,
}
impl RunRegistry {
	pub fn new(service: Arc<RevuService>) -> Self {
		Self { service, runs: Arc::new(Mutex::new(HashMap::new())) }
	}

	pub fn service(&self) -> &Arc<RevuService> {
		&self.service
	}

	/// Starts a full run in the background and returns once the processing flag is held.
	pub async fn submit(&self, product_id: Uuid, user_id: Uuid) -> Result<RunTicket> {
		let claim = self.service.begin_full_run(product_id, user_id).await?;
		let started_at = claim.started_at;
		let run_id = Uuid::new_v4();

		lock(&self.runs).insert(
			run_id,
			RunEntry {
				product_id,
				user_id,
				state: RunState::Running { progress: RunProgress::default() },
			},
		);

		let service = self.service.clone();
		let runs = self.runs.clone();
		let run = tokio::spawn({
			let service = service.clone();
			let sink = RegistrySink { run_id, runs: runs.clone() };

			async move { service.execute_full_run(claim, &sink).await }
		});

		// Supervises the run so a panic still ends in a terminal state and frees the flag.
		tokio::spawn(async move {
			let state = match run.await {
				Ok(Ok(summary)) => RunState::Finished { summary },
				Ok(Err(err)) => RunState::Failed { error: err.to_string() },
				Err(err) => {
					tracing::error!(
						run_id = %run_id,
						product_id = %product_id,
						error = %err,
						"Analysis run task died."
					);

					service.release_processing(product_id, started_at).await;

					RunState::Failed { error: format!("Analysis run task died: {err}") }
				},
			};

			if let Some(entry) = lock(&runs).get_mut(&run_id) {
				entry.state = state;
			}
		});

		tracing::info!(run_id = %run_id, product_id = %product_id, "Analysis run submitted.");

		Ok(RunTicket { run_id, product_id })
	}

	/// State of a run submitted by `user_id`. Runs of other callers are reported as unknown.
	pub fn run(&self, run_id: Uuid, user_id: Uuid) -> Option<RunState> {
		lock(&self.runs)
			.get(&run_id)
			.filter(|entry| entry.user_id == user_id)
			.map(|entry| entry.state.clone())
	}

	pub fn active_run(&self, product_id: Uuid) -> Option<Uuid> {
		lock(&self.runs)
			.iter()
			.find(|(_, entry)| entry.product_id == product_id && entry.state.is_running())
			.map(|(run_id, _)| *run_id)
	}

	/// Persisted status plus the id of the tracked run still in flight, if any.
	pub async fn status(&self, product_id: Uuid, user_id: Uuid) -> Result<AnalysisStatusSummary> {
		let mut summary = self.service.analysis_status(product_id, user_id).await?;

		summary.active_run_id = self.active_run(product_id);

		Ok(summary)
	}
}

struct RegistrySink {
	run_id: Uuid,
	runs: Runs,
}
impl ProgressSink for RegistrySink {
	fn report(&self, event: ProgressEvent) {
		let mut runs = lock(&self.runs);
		let Some(RunEntry { state: RunState::Running { progress }, .. }) = runs.get_mut(&self.run_id)
		else {
			return;
		};

		match event {
			ProgressEvent::RunStarted { total } => progress.total = total,
			ProgressEvent::TypeStarted { analysis_type, .. } => {
				progress.started += 1;
				progress.current = Some(analysis_type);
			},
			ProgressEvent::TypeFinished { outcome, .. } => {
				match outcome {
					TypeOutcome::Completed => progress.completed += 1,
					TypeOutcome::Failed { .. } => progress.failed += 1,
					TypeOutcome::Skipped { .. } => progress.skipped += 1,
				}

				progress.current = None;
			},
			ProgressEvent::RunFinished { .. } => {},
		}
	}
}

fn lock(runs: &Runs) -> MutexGuard<'_, HashMap<Uuid, RunEntry>> {
	runs.lock().unwrap_or_else(PoisonError::into_inner)
}
