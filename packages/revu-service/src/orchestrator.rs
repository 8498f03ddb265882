//! Full analysis runs and single-type reprocessing.
//!
//! A full run walks the planned types in declared order. Every type ends in exactly one
//! persisted record (`completed` or `failed`) unless its required types are not completed, in
//! which case it is skipped without a record. Per-type failures never abort the run.

use std::{collections::BTreeMap, time::Duration as StdDuration};

use futures::{StreamExt, stream};
use serde::Serialize;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use revu_domain::{
	AnalysisFocus, AnalysisInput, AnalysisRecord, AnalysisStatus, AnalysisType, Competitor,
	Product, SubAnalysis, planned_types,
	result::{self, AnalysisPayload},
};
use revu_providers::analysis::{AnalysisRequest, CompetitorAnalyses, CompetitorReviews};

use crate::{Error, ProgressEvent, ProgressSink, Result, RevuService, ReviewScope};

pub const NO_REVIEWS_FOUND: &str = "No reviews found.";
pub const NO_COMPETITOR_ANALYSES: &str = "No competitor analyses available.";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TypeOutcome {
	Completed,
	Failed { error: String },
	/// Required types were not completed; nothing was recorded.
	Skipped { reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeError {
	pub analysis_type: AnalysisType,
	pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunSummary {
	/// At least one type completed.
	pub success: bool,
	pub completed_types: Vec<AnalysisType>,
	pub skipped_types: Vec<AnalysisType>,
	pub errors: Vec<TypeError>,
}
impl RunSummary {
	fn record(&mut self, analysis_type: AnalysisType, outcome: &TypeOutcome) {
		match outcome {
			TypeOutcome::Completed => self.completed_types.push(analysis_type),
			TypeOutcome::Failed { error } =>
				self.errors.push(TypeError { analysis_type, message: error.clone() }),
			TypeOutcome::Skipped { .. } => self.skipped_types.push(analysis_type),
		}

		self.success = !self.completed_types.is_empty();
	}
}

/// A product whose processing flag this run holds.
#[derive(Clone, Debug)]
pub struct RunClaim {
	pub product: Product,
	/// Holder token handed back when releasing the flag.
	pub started_at: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReprocessOutcome {
	pub success: bool,
	pub error: Option<String>,
}

impl RevuService {
	pub async fn process_all_analyses(
		&self,
		product_id: Uuid,
		user_id: Uuid,
		sink: &dyn ProgressSink,
	) -> Result<RunSummary> {
		let claim = self.begin_full_run(product_id, user_id).await?;

		self.execute_full_run(claim, sink).await
	}

	/// Checks ownership and takes the product's processing flag.
	///
	/// Fails with [`Error::Conflict`] while another live run holds the flag. On success the caller
	/// must follow up with [`RevuService::execute_full_run`], which releases it.
	pub async fn begin_full_run(&self, product_id: Uuid, user_id: Uuid) -> Result<RunClaim> {
		let product = self.authorized_product(product_id, user_id).await?;
		let lease = Duration::seconds(self.cfg.orchestration.lock_lease_seconds);
		let Some(started_at) =
			self.store.try_begin_processing(product_id, OffsetDateTime::now_utc(), lease).await?
		else {
			return Err(Error::Conflict {
				message: format!("Product {product_id} already has an analysis run in progress."),
			});
		};

		tracing::info!(product_id = %product_id, "Analysis run started.");

		Ok(RunClaim { product, started_at })
	}

	pub async fn execute_full_run(
		&self,
		claim: RunClaim,
		sink: &dyn ProgressSink,
	) -> Result<RunSummary> {
		let RunClaim { product, started_at } = claim;
		let result = self.run_plan(&product, sink).await;

		self.release_processing(product.product_id, started_at).await;

		match &result {
			Ok(summary) => tracing::info!(
				product_id = %product.product_id,
				completed = summary.completed_types.len(),
				failed = summary.errors.len(),
				skipped = summary.skipped_types.len(),
				"Analysis run finished."
			),
			Err(err) => tracing::error!(
				product_id = %product.product_id,
				error = %err,
				"Analysis run aborted."
			),
		}

		result
	}

	/// Best-effort release of a processing flag taken at `started_at`.
	pub async fn release_processing(&self, product_id: Uuid, started_at: OffsetDateTime) {
		match self.store.end_processing(product_id, started_at).await {
			Ok(true) => {},
			Ok(false) => tracing::warn!(
				product_id = %product_id,
				"Processing flag was taken over by a newer run. Leaving it in place."
			),
			Err(err) => tracing::error!(
				product_id = %product_id,
				error = %err,
				"Failed to clear processing flag."
			),
		}
	}

	/// Re-runs one type and overwrites its record.
	///
	/// Does not take the processing flag and does not check that required types are completed;
	/// whatever prior analyses exist are used.
	pub async fn reprocess_analysis(
		&self,
		product_id: Uuid,
		analysis_type: AnalysisType,
		user_id: Uuid,
	) -> Result<ReprocessOutcome> {
		let product = self.authorized_product(product_id, user_id).await?;
		let competitors = self.store.list_competitors(product_id).await?;

		if !analysis_type.precondition().holds(competitors.len()) {
			return Err(Error::InvalidRequest {
				message: format!("{analysis_type} requires at least one competitor."),
			});
		}

		let missing = self.unmet_requirements(product_id, analysis_type).await?;

		if !missing.is_empty() {
			tracing::warn!(
				product_id = %product_id,
				analysis_type = %analysis_type,
				missing = %join_types(&missing),
				"Reprocessing without completed prerequisites."
			);
		}

		let outcome =
			self.run_type(&product, &competitors, analysis_type, OffsetDateTime::now_utc()).await;

		Ok(match outcome {
			TypeOutcome::Completed => ReprocessOutcome { success: true, error: None },
			TypeOutcome::Failed { error } | TypeOutcome::Skipped { reason: error } =>
				ReprocessOutcome { success: false, error: Some(error) },
		})
	}

	async fn run_plan(&self, product: &Product, sink: &dyn ProgressSink) -> Result<RunSummary> {
		let competitors = self.store.list_competitors(product.product_id).await?;
		let plan = planned_types(competitors.len());
		let mut summary = RunSummary::default();

		sink.report(ProgressEvent::RunStarted { total: plan.len() });

		for (index, &analysis_type) in plan.iter().enumerate() {
			sink.report(ProgressEvent::TypeStarted { analysis_type, index });

			let outcome = match self.unmet_requirements(product.product_id, analysis_type).await {
				Ok(missing) if !missing.is_empty() => {
					tracing::warn!(
						product_id = %product.product_id,
						analysis_type = %analysis_type,
						missing = %join_types(&missing),
						"Skipping analysis with incomplete prerequisites."
					);

					TypeOutcome::Skipped {
						reason: format!("Requires completed {}.", join_types(&missing)),
					}
				},
				Ok(_) =>
					self.run_type(product, &competitors, analysis_type, OffsetDateTime::now_utc())
						.await,
				Err(err) => {
					tracing::error!(
						product_id = %product.product_id,
						analysis_type = %analysis_type,
						error = %err,
						"Failed to read prerequisites."
					);

					TypeOutcome::Failed { error: err.to_string() }
				},
			};
			let skipped = matches!(outcome, TypeOutcome::Skipped { .. });

			summary.record(analysis_type, &outcome);
			sink.report(ProgressEvent::TypeFinished { analysis_type, outcome });

			if !skipped && index + 1 < plan.len() {
				self.pause().await;
			}
		}

		sink.report(ProgressEvent::RunFinished { summary: summary.clone() });

		Ok(summary)
	}

	async fn unmet_requirements(
		&self,
		product_id: Uuid,
		analysis_type: AnalysisType,
	) -> Result<Vec<AnalysisType>> {
		let required = analysis_type.requirements();

		if required.is_empty() {
			return Ok(Vec::new());
		}

		let records = self.store.list_analyses(product_id).await?;

		Ok(required
			.iter()
			.copied()
			.filter(|required| {
				!records.iter().any(|record| {
					record.analysis_type == *required && record.status == AnalysisStatus::Completed
				})
			})
			.collect())
	}

	/// Runs one type end to end and persists its record.
	async fn run_type(
		&self,
		product: &Product,
		competitors: &[Competitor],
		analysis_type: AnalysisType,
		now: OffsetDateTime,
	) -> TypeOutcome {
		let request = match analysis_type.input() {
			AnalysisInput::Reviews => self.reviews_request(product, analysis_type, now).await,
			AnalysisInput::ReviewsWithCompetitors =>
				self.head_to_head_request(product, competitors, analysis_type, now).await,
			AnalysisInput::Synthesis =>
				self.synthesis_request(product, competitors, analysis_type, now).await,
		};
		let payload = match request {
			Ok(request) => self.call_analysis(&request).await,
			Err(err) => Err(err),
		};
		let finished_at = OffsetDateTime::now_utc();
		let (record, outcome) = match payload {
			Ok(payload) => (
				AnalysisRecord::completed(
					product.product_id,
					analysis_type,
					payload.to_data(),
					finished_at,
				),
				TypeOutcome::Completed,
			),
			Err(err) => {
				let message = err.to_string();

				tracing::error!(
					product_id = %product.product_id,
					analysis_type = %analysis_type,
					error = %message,
					"Analysis failed."
				);

				(
					AnalysisRecord::failed(
						product.product_id,
						analysis_type,
						message.clone(),
						finished_at,
					),
					TypeOutcome::Failed { error: message },
				)
			},
		};

		if let Err(err) = self.store.upsert_analysis(&record).await {
			tracing::error!(
				product_id = %product.product_id,
				analysis_type = %analysis_type,
				error = %err,
				"Failed to persist analysis record."
			);

			return TypeOutcome::Failed { error: err.to_string() };
		}

		outcome
	}

	async fn reviews_request(
		&self,
		product: &Product,
		analysis_type: AnalysisType,
		now: OffsetDateTime,
	) -> Result<AnalysisRequest> {
		let reviews = self
			.select_reviews(
				product.product_id,
				ReviewScope::Product,
				product.reviews_count,
				analysis_type,
				Some(&product.name),
				now,
			)
			.await?;

		if reviews.is_empty() {
			return Err(Error::EmptySelection { message: NO_REVIEWS_FOUND.to_string() });
		}

		let mut request = AnalysisRequest::new(analysis_type, AnalysisFocus::Full, &product.name);

		request.reviews = reviews;

		Ok(request)
	}

	async fn head_to_head_request(
		&self,
		product: &Product,
		competitors: &[Competitor],
		analysis_type: AnalysisType,
		now: OffsetDateTime,
	) -> Result<AnalysisRequest> {
		let mut request = self.reviews_request(product, analysis_type, now).await?;

		for competitor in competitors {
			let selected = self
				.select_reviews(
					product.product_id,
					ReviewScope::Competitor(competitor.competitor_id),
					competitor.reviews_count,
					analysis_type,
					Some(&competitor.name),
					now,
				)
				.await;

			match selected {
				Ok(reviews) if !reviews.is_empty() => request.competitor_reviews.push(
					CompetitorReviews {
						competitor_id: competitor.competitor_id,
						name: competitor.name.clone(),
						reviews,
					},
				),
				Ok(_) => tracing::warn!(
					product_id = %product.product_id,
					competitor_id = %competitor.competitor_id,
					"Competitor has no usable reviews."
				),
				Err(err) => tracing::warn!(
					product_id = %product.product_id,
					competitor_id = %competitor.competitor_id,
					error = %err,
					"Competitor review selection failed."
				),
			}
		}

		Ok(request)
	}

	async fn synthesis_request(
		&self,
		product: &Product,
		competitors: &[Competitor],
		analysis_type: AnalysisType,
		now: OffsetDateTime,
	) -> Result<AnalysisRequest> {
		let required = analysis_type.requirements();
		let prior_analyses = self
			.store
			.list_analyses(product.product_id)
			.await?
			.into_iter()
			.filter(|record| {
				record.status == AnalysisStatus::Completed
					&& required.contains(&record.analysis_type)
			})
			.map(|record| (record.analysis_type, record.data))
			.collect::<BTreeMap<_, _>>();
		let competitor_analyses =
			self.competitor_fan_out(product, competitors, analysis_type, now).await;

		if competitor_analyses.is_empty() {
			return Err(Error::EmptySelection { message: NO_COMPETITOR_ANALYSES.to_string() });
		}

		let mut request = AnalysisRequest::new(analysis_type, AnalysisFocus::Full, &product.name);

		request.prior_analyses = prior_analyses;
		request.competitor_analyses = competitor_analyses;

		Ok(request)
	}

	/// Runs the reduced sub-analysis pipeline for every competitor, a few competitors at a time.
	///
	/// Competitors with no successful sub-analysis are left out. Output order follows `competitors`.
	async fn competitor_fan_out(
		&self,
		product: &Product,
		competitors: &[Competitor],
		analysis_type: AnalysisType,
		now: OffsetDateTime,
	) -> Vec<CompetitorAnalyses> {
		let subanalyses = analysis_type.competitor_subanalyses();
		let concurrency = self.cfg.orchestration.competitor_concurrency.max(1) as usize;
		let results = stream::iter(competitors.to_vec())
			.map(|competitor| self.competitor_subanalyses(product, competitor, subanalyses, now))
			.buffered(concurrency)
			.collect::<Vec<_>>()
			.await;

		results
			.into_iter()
			.filter_map(|(competitor_id, result)| match result {
				Ok(analyses) => Some(analyses),
				Err(err) => {
					tracing::warn!(
						product_id = %product.product_id,
						competitor_id = %competitor_id,
						error = %err,
						"Competitor sub-analyses failed."
					);

					None
				},
			})
			.collect()
	}

	/// Runs every sub-analysis for one competitor in order.
	///
	/// A failed sub-analysis is left out of the result and the rest still run. The competitor
	/// only fails when none of its sub-analyses succeed.
	async fn competitor_subanalyses(
		&self,
		product: &Product,
		competitor: Competitor,
		subanalyses: &'static [SubAnalysis],
		now: OffsetDateTime,
	) -> (Uuid, Result<CompetitorAnalyses>) {
		let competitor_id = competitor.competitor_id;
		let mut analyses = BTreeMap::new();
		let mut last_error = None;

		for (index, sub) in subanalyses.iter().enumerate() {
			if index > 0 {
				self.pause().await;
			}

			match self.competitor_subanalysis(product, &competitor, sub, now).await {
				Ok(payload) => {
					analyses.insert(sub.analysis_type, payload.to_data());
				},
				Err(err) => {
					tracing::warn!(
						product_id = %product.product_id,
						competitor_id = %competitor_id,
						analysis_type = %sub.analysis_type,
						error = %err,
						"Competitor sub-analysis failed."
					);

					last_error = Some(err);
				},
			}
		}

		if analyses.is_empty() {
			let err = last_error.unwrap_or_else(|| Error::EmptySelection {
				message: NO_REVIEWS_FOUND.to_string(),
			});

			return (competitor_id, Err(err));
		}

		(competitor_id, Ok(CompetitorAnalyses { competitor_id, name: competitor.name, analyses }))
	}

	async fn competitor_subanalysis(
		&self,
		product: &Product,
		competitor: &Competitor,
		sub: &SubAnalysis,
		now: OffsetDateTime,
	) -> Result<AnalysisPayload> {
		let reviews = self
			.select_reviews(
				product.product_id,
				ReviewScope::Competitor(competitor.competitor_id),
				competitor.reviews_count,
				sub.analysis_type,
				Some(&competitor.name),
				now,
			)
			.await?;

		if reviews.is_empty() {
			return Err(Error::EmptySelection { message: NO_REVIEWS_FOUND.to_string() });
		}

		let mut request = AnalysisRequest::new(sub.analysis_type, sub.focus, &competitor.name);

		request.reviews = reviews;

		self.call_analysis(&request).await
	}

	async fn call_analysis(&self, request: &AnalysisRequest) -> Result<AnalysisPayload> {
		let value =
			self.providers.analysis.analyze(&self.cfg.providers.analysis, request).await?;

		Ok(result::validate_result(request.analysis_type, request.focus, value)?)
	}

	async fn pause(&self) {
		let delay_ms = self.cfg.orchestration.inter_call_delay_ms;

		if delay_ms > 0 {
			tokio::time::sleep(StdDuration::from_millis(delay_ms)).await;
		}
	}
}

fn join_types(types: &[AnalysisType]) -> String {
	types.iter().map(|analysis_type| analysis_type.as_str()).collect::<Vec<_>>().join(", ")
}
