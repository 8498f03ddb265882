//! Review indexer: drains `review_indexing_outbox` into the Qdrant review collection.

use std::{collections::HashMap, time::Duration as StdDuration};

use qdrant_client::{
	client::Payload,
	qdrant::{PointStruct, UpsertPointsBuilder, Value},
};
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};
use tokio::time as tokio_time;

use revu_config::EmbeddingProviderConfig;
use revu_providers::embedding;
use revu_storage::{
	db::Db,
	models::{ReviewIndexingOutboxEntry, ReviewRow},
	outbox,
	qdrant::{
		PAYLOAD_COMPETITOR_ID, PAYLOAD_PRODUCT_ID, PAYLOAD_RATING, PAYLOAD_REVIEW_DATE,
		PAYLOAD_REVIEW_ID, PAYLOAD_SOURCE, PAYLOAD_TEXT, PAYLOAD_WORD_COUNT, QdrantStore,
		SOURCE_COMPETITOR, SOURCE_PRODUCT,
	},
	queries,
};

use crate::{Error, Result};

const POLL_INTERVAL_MS: i64 = 500;
const CLAIM_LEASE_SECONDS: i64 = 30;
const BASE_BACKOFF_MS: i64 = 500;
const MAX_BACKOFF_MS: i64 = 30_000;
const MAX_OUTBOX_ERROR_CHARS: usize = 1_024;

pub struct WorkerState {
	pub db: Db,
	pub qdrant: QdrantStore,
	pub embedding: EmbeddingProviderConfig,
}

pub async fn run_worker(state: WorkerState) -> Result<()> {
	loop {
		match process_review_outbox_once(&state).await {
			// Drain the backlog without sleeping between jobs.
			Ok(true) => continue,
			Ok(false) => {},
			Err(err) => tracing::error!(error = %err, "Review outbox processing failed."),
		}

		tokio_time::sleep(to_std_duration(Duration::milliseconds(POLL_INTERVAL_MS))).await;
	}
}

/// Handles at most one due job. Returns whether a job was claimed.
pub async fn process_review_outbox_once(state: &WorkerState) -> Result<bool> {
	let now = OffsetDateTime::now_utc();
	let Some(job) =
		outbox::claim_review_job(&state.db, now, Duration::seconds(CLAIM_LEASE_SECONDS)).await?
	else {
		return Ok(false);
	};

	match index_review(state, &job).await {
		Ok(()) => {
			outbox::mark_review_job_done(&state.db.pool, job.outbox_id, OffsetDateTime::now_utc())
				.await?;

			tracing::debug!(outbox_id = %job.outbox_id, review_id = %job.review_id, "Review indexed.");
		},
		Err(err) => {
			mark_failed(&state.db, &job, &err).await?;

			tracing::error!(
				error = %err,
				outbox_id = %job.outbox_id,
				review_id = %job.review_id,
				"Review indexing job failed."
			);
		},
	}

	Ok(true)
}

async fn index_review(state: &WorkerState, job: &ReviewIndexingOutboxEntry) -> Result<()> {
	let Some(review) = queries::fetch_review(&state.db.pool, job.review_id).await? else {
		tracing::info!(review_id = %job.review_id, "Review missing for outbox job. Marking done.");

		return Ok(());
	};

	if review.text.trim().is_empty() {
		tracing::info!(review_id = %review.review_id, "Review has no text. Skipping index.");

		return Ok(());
	}

	let vector = embedding::embed(&state.embedding, std::slice::from_ref(&review.text))
		.await?
		.pop()
		.ok_or_else(|| Error::Validation("Embedding provider returned no vector.".to_string()))?;

	validate_vector_dim(&vector, state.qdrant.vector_dim)?;

	let payload = Payload::from(review_payload(&review)?);
	let point = PointStruct::new(review.review_id.to_string(), vector, payload);
	let upsert = UpsertPointsBuilder::new(state.qdrant.collection.clone(), vec![point]).wait(true);

	state.qdrant.client.upsert_points(upsert).await?;

	Ok(())
}

async fn mark_failed(db: &Db, job: &ReviewIndexingOutboxEntry, err: &Error) -> Result<()> {
	let attempts = job.attempts.saturating_add(1);
	let now = OffsetDateTime::now_utc();
	let error_text = sanitize_outbox_error(&err.to_string());

	outbox::mark_review_job_failed(
		&db.pool,
		job.outbox_id,
		attempts,
		&error_text,
		now + backoff_for_attempt(attempts),
		now,
	)
	.await?;

	Ok(())
}

fn review_payload(review: &ReviewRow) -> Result<HashMap<String, Value>> {
	let mut payload = HashMap::new();
	let source = if review.competitor_id.is_some() { SOURCE_COMPETITOR } else { SOURCE_PRODUCT };

	payload.insert(PAYLOAD_REVIEW_ID.to_string(), Value::from(review.review_id.to_string()));
	payload.insert(PAYLOAD_PRODUCT_ID.to_string(), Value::from(review.product_id.to_string()));
	payload.insert(PAYLOAD_SOURCE.to_string(), Value::from(source.to_string()));
	payload.insert(PAYLOAD_WORD_COUNT.to_string(), Value::from(i64::from(review.word_count)));
	payload.insert(PAYLOAD_TEXT.to_string(), Value::from(review.text.clone()));

	if let Some(competitor_id) = review.competitor_id {
		payload.insert(PAYLOAD_COMPETITOR_ID.to_string(), Value::from(competitor_id.to_string()));
	}
	if let Some(rating) = review.rating {
		payload.insert(PAYLOAD_RATING.to_string(), Value::from(f64::from(rating)));
	}
	if let Some(review_date) = review.review_date {
		payload.insert(PAYLOAD_REVIEW_DATE.to_string(), Value::from(review_date.format(&Rfc3339)?));
	}

	Ok(payload)
}

fn validate_vector_dim(vec: &[f32], expected_dim: u32) -> Result<()> {
	if vec.len() != expected_dim as usize {
		return Err(Error::Validation(format!(
			"Embedding dimension {} does not match configured vector_dim {}.",
			vec.len(),
			expected_dim
		)));
	}

	Ok(())
}

fn sanitize_outbox_error(text: &str) -> String {
	let mut parts = Vec::new();
	let mut redact_next = false;

	for raw in text.split_whitespace() {
		let mut word = raw.to_string();

		if redact_next {
			word = "[REDACTED]".to_string();
			redact_next = false;
		}
		if raw.eq_ignore_ascii_case("bearer") {
			redact_next = true;
		}

		let lowered = raw.to_ascii_lowercase();

		for key in ["api_key", "apikey", "password", "secret", "token"] {
			if lowered.contains(key) && (lowered.contains('=') || lowered.contains(':')) {
				let sep = if raw.contains('=') { '=' } else { ':' };
				let prefix = raw.split(sep).next().unwrap_or(raw);

				word = format!("{prefix}{sep}[REDACTED]");

				break;
			}
		}

		parts.push(word);
	}

	let mut out = parts.join(" ");

	if out.chars().count() > MAX_OUTBOX_ERROR_CHARS {
		out = out.chars().take(MAX_OUTBOX_ERROR_CHARS).collect();
		out.push_str("...");
	}

	out
}

fn backoff_for_attempt(attempt: i32) -> Duration {
	let attempts = attempt.max(1) as u32;
	let exp = attempts.saturating_sub(1).min(6);
	let base = BASE_BACKOFF_MS.saturating_mul(1 << exp);

	Duration::milliseconds(base.min(MAX_BACKOFF_MS))
}

fn to_std_duration(duration: Duration) -> StdDuration {
	let millis = duration.whole_milliseconds();

	if millis <= 0 {
		return StdDuration::from_millis(0);
	}

	StdDuration::from_millis(millis as u64)
}
