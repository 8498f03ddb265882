use uuid::Uuid;

use revu_domain::{RATING_BUCKETS, Review};

use crate::{Result, ReviewIndex, ReviewQuery, ReviewScope};

/// Draws up to `pool_size` reviews spread evenly over the five star buckets.
///
/// `pool_size` is clamped to `max_pool` and the result never exceeds it. Each bucket is queried
/// separately and empty buckets are not backfilled. Reviews whose rounded rating falls outside the queried bucket, and reviews
/// outside `scope`, are dropped.
pub async fn build_pool(
	index: &dyn ReviewIndex,
	product_id: Uuid,
	scope: ReviewScope,
	pool_size: usize,
	max_pool: usize,
) -> Result<Vec<Review>> {
	let pool_size = pool_size.min(max_pool);
	let per_bucket = pool_size.div_ceil(RATING_BUCKETS.len());
	let mut pool = Vec::with_capacity(per_bucket * RATING_BUCKETS.len());

	if per_bucket == 0 {
		return Ok(pool);
	}

	for bucket in RATING_BUCKETS {
		let query = ReviewQuery { product_id, scope, rating: Some(bucket), limit: per_bucket };
		let hits = index.query_reviews(&query).await?;

		pool.extend(
			hits.into_iter()
				.filter(|review| {
					review.product_id == product_id
						&& scope.matches(review)
						&& review.rating_bucket() == Some(bucket)
				})
				.take(per_bucket),
		);
	}

	// Rounding the bucket quota up can overshoot by up to four reviews.
	pool.truncate(pool_size);

	Ok(pool)
}
