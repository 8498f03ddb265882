use sqlx::PgExecutor;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
	Result,
	db::Db,
	models::{AnalysisRecordRow, CompetitorRow, ProductRow, ReviewRow},
	outbox,
};

pub async fn insert_brand<'e, E>(executor: E, brand_id: Uuid, user_id: Uuid, name: &str) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("INSERT INTO brands (brand_id, user_id, name) VALUES ($1, $2, $3)")
		.bind(brand_id)
		.bind(user_id)
		.bind(name)
		.execute(executor)
		.await?;

	Ok(())
}

pub async fn insert_product<'e, E>(
	executor: E,
	product_id: Uuid,
	brand_id: Uuid,
	name: &str,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("INSERT INTO products (product_id, brand_id, name) VALUES ($1, $2, $3)")
		.bind(product_id)
		.bind(brand_id)
		.bind(name)
		.execute(executor)
		.await?;

	Ok(())
}

pub async fn insert_competitor<'e, E>(
	executor: E,
	competitor_id: Uuid,
	product_id: Uuid,
	name: &str,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("INSERT INTO competitors (competitor_id, product_id, name) VALUES ($1, $2, $3)")
		.bind(competitor_id)
		.bind(product_id)
		.bind(name)
		.execute(executor)
		.await?;

	Ok(())
}

/// Stores a review, bumps the owning review count and queues the review for indexing, atomically.
pub async fn insert_review(db: &Db, review: &ReviewRow) -> Result<Uuid> {
	let mut tx = db.pool.begin().await?;

	sqlx::query(
		"\
INSERT INTO reviews (
	review_id,
	product_id,
	competitor_id,
	text,
	rating,
	review_date,
	word_count,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
	)
	.bind(review.review_id)
	.bind(review.product_id)
	.bind(review.competitor_id)
	.bind(review.text.as_str())
	.bind(review.rating)
	.bind(review.review_date)
	.bind(review.word_count)
	.bind(review.created_at)
	.execute(&mut *tx)
	.await?;

	match review.competitor_id {
		Some(competitor_id) => {
			sqlx::query(
				"UPDATE competitors SET reviews_count = reviews_count + 1 WHERE competitor_id = $1",
			)
			.bind(competitor_id)
			.execute(&mut *tx)
			.await?;
		},
		None => {
			sqlx::query(
				"UPDATE products SET reviews_count = reviews_count + 1 WHERE product_id = $1",
			)
			.bind(review.product_id)
			.execute(&mut *tx)
			.await?;
		},
	}

	let outbox_id = outbox::enqueue_review_indexing(&mut *tx, review.review_id).await?;

	tx.commit().await?;

	Ok(outbox_id)
}

pub async fn fetch_review<'e, E>(executor: E, review_id: Uuid) -> Result<Option<ReviewRow>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, ReviewRow>(
		"\
SELECT
	review_id,
	product_id,
	competitor_id,
	text,
	rating,
	review_date,
	word_count,
	created_at
FROM reviews
WHERE review_id = $1",
	)
	.bind(review_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn get_product<'e, E>(executor: E, product_id: Uuid) -> Result<Option<ProductRow>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, ProductRow>(
		"\
SELECT
	p.product_id,
	p.brand_id,
	b.user_id AS owner_user_id,
	p.name,
	p.reviews_count,
	p.is_processing,
	p.processing_started_at
FROM products p
JOIN brands b ON b.brand_id = p.brand_id
WHERE p.product_id = $1",
	)
	.bind(product_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn list_competitors<'e, E>(executor: E, product_id: Uuid) -> Result<Vec<CompetitorRow>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, CompetitorRow>(
		"\
SELECT competitor_id, product_id, name, reviews_count
FROM competitors
WHERE product_id = $1
ORDER BY created_at ASC, competitor_id ASC",
	)
	.bind(product_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn list_analysis_records<'e, E>(
	executor: E,
	product_id: Uuid,
) -> Result<Vec<AnalysisRecordRow>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, AnalysisRecordRow>(
		"\
SELECT product_id, analysis_type, status, data, error, updated_at
FROM analysis_records
WHERE product_id = $1
ORDER BY analysis_type ASC",
	)
	.bind(product_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn upsert_analysis_record<'e, E>(executor: E, record: &AnalysisRecordRow) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO analysis_records (product_id, analysis_type, status, data, error, updated_at)
VALUES ($1, $2, $3, $4, $5, $6)
ON CONFLICT (product_id, analysis_type) DO UPDATE
SET status = EXCLUDED.status,
	data = EXCLUDED.data,
	error = EXCLUDED.error,
	updated_at = EXCLUDED.updated_at",
	)
	.bind(record.product_id)
	.bind(record.analysis_type.as_str())
	.bind(record.status.as_str())
	.bind(&record.data)
	.bind(record.error.as_deref())
	.bind(record.updated_at)
	.execute(executor)
	.await?;

	Ok(())
}

/// Marks the product as processing unless a live run already holds it.
///
/// A run whose `processing_started_at` is older than `lease` is considered abandoned and may be
/// taken over. Returns the stored `processing_started_at`, which identifies this holder when
/// releasing, or `None` when the product is held by another run or does not exist.
pub async fn try_begin_processing<'e, E>(
	executor: E,
	product_id: Uuid,
	now: OffsetDateTime,
	lease: Duration,
) -> Result<Option<OffsetDateTime>>
where
	E: PgExecutor<'e>,
{
	let stale_before = now - lease;
	let started_at = sqlx::query_scalar::<_, OffsetDateTime>(
		"\
UPDATE products
SET is_processing = TRUE,
	processing_started_at = $2
WHERE product_id = $1
	AND (
		is_processing = FALSE
		OR processing_started_at IS NULL
		OR processing_started_at < $3
	)
RETURNING processing_started_at",
	)
	.bind(product_id)
	.bind(now)
	.bind(stale_before)
	.fetch_optional(executor)
	.await?;

	Ok(started_at)
}

/// Clears the processing flag if `started_at` still identifies the holder.
///
/// Returns `false` when another run has taken the flag over in the meantime; it is left untouched.
pub async fn end_processing<'e, E>(
	executor: E,
	product_id: Uuid,
	started_at: OffsetDateTime,
) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let released = sqlx::query(
		"\
UPDATE products
SET is_processing = FALSE,
	processing_started_at = NULL
WHERE product_id = $1 AND processing_started_at = $2",
	)
	.bind(product_id)
	.bind(started_at)
	.execute(executor)
	.await?
	.rows_affected();

	Ok(released > 0)
}
