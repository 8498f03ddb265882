use sqlx::PgExecutor;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Result, db::Db, models::ReviewIndexingOutboxEntry};

pub async fn enqueue_review_indexing<'e, E>(executor: E, review_id: Uuid) -> Result<Uuid>
where
	E: PgExecutor<'e>,
{
	let outbox_id = Uuid::new_v4();

	sqlx::query(
		"INSERT INTO review_indexing_outbox (outbox_id, review_id, status) VALUES ($1, $2, 'PENDING')",
	)
	.bind(outbox_id)
	.bind(review_id)
	.execute(executor)
	.await?;

	Ok(outbox_id)
}

/// Claims the oldest due job and pushes its `available_at` out by `lease`.
///
/// A worker that dies mid-job leaves the row claimable again once the lease runs out.
pub async fn claim_review_job(
	db: &Db,
	now: OffsetDateTime,
	lease: Duration,
) -> Result<Option<ReviewIndexingOutboxEntry>> {
	let mut tx = db.pool.begin().await?;
	let row = sqlx::query_as::<_, ReviewIndexingOutboxEntry>(
		"\
SELECT
	outbox_id,
	review_id,
	status,
	attempts,
	last_error,
	available_at,
	created_at,
	updated_at
FROM review_indexing_outbox
WHERE status IN ('PENDING','FAILED') AND available_at <= $1
ORDER BY available_at ASC
LIMIT 1
FOR UPDATE SKIP LOCKED",
	)
	.bind(now)
	.fetch_optional(&mut *tx)
	.await?;
	let job = if let Some(mut job) = row {
		let lease_until = now + lease;

		sqlx::query(
			"UPDATE review_indexing_outbox SET available_at = $1, updated_at = $2 WHERE outbox_id = $3",
		)
		.bind(lease_until)
		.bind(now)
		.bind(job.outbox_id)
		.execute(&mut *tx)
		.await?;

		job.available_at = lease_until;
		job.updated_at = now;

		Some(job)
	} else {
		None
	};

	tx.commit().await?;

	Ok(job)
}

pub async fn mark_review_job_done<'e, E>(
	executor: E,
	outbox_id: Uuid,
	now: OffsetDateTime,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"UPDATE review_indexing_outbox SET status = 'DONE', updated_at = $1 WHERE outbox_id = $2",
	)
	.bind(now)
	.bind(outbox_id)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn mark_review_job_failed<'e, E>(
	executor: E,
	outbox_id: Uuid,
	attempts: i32,
	last_error: &str,
	available_at: OffsetDateTime,
	now: OffsetDateTime,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
UPDATE review_indexing_outbox
SET status = 'FAILED',
	attempts = $1,
	last_error = $2,
	available_at = $3,
	updated_at = $4
WHERE outbox_id = $5",
	)
	.bind(attempts)
	.bind(last_error)
	.bind(available_at)
	.bind(now)
	.bind(outbox_id)
	.execute(executor)
	.await?;

	Ok(())
}
