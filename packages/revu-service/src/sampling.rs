//! Review selection for one analysis: stratified pool, relevance scoring, balanced pick.

pub mod pool;
pub mod scoring;
pub mod selection;

use time::OffsetDateTime;
use uuid::Uuid;

use revu_domain::{AnalysisType, Review, sizing};

use crate::{Result, RevuService, ReviewScope};

impl RevuService {
	/// Picks the reviews one analysis of `analysis_type` should see.
	///
	/// `total_reviews` is the size of the scoped corpus and drives the sample size. An empty result
	/// means nothing usable was found.
	pub async fn select_reviews(
		&self,
		product_id: Uuid,
		scope: ReviewScope,
		total_reviews: u64,
		analysis_type: AnalysisType,
		product_name: Option<&str>,
		now: OffsetDateTime,
	) -> Result<Vec<Review>> {
		let total = usize::try_from(total_reviews).unwrap_or(usize::MAX);
		let limit = sizing::target_sample_size(analysis_type, total);

		if limit == 0 {
			return Ok(Vec::new());
		}

		let sampling = &self.cfg.sampling;
		let max_pool = sampling.max_pool_size as usize;
		let pool_size = sizing::pool_size(limit, sampling.pool_multiplier as usize, max_pool);
		let pool =
			pool::build_pool(self.index.as_ref(), product_id, scope, pool_size, max_pool).await?;

		if pool.is_empty() {
			return Ok(Vec::new());
		}

		let pool_len = pool.len();
		let scored = scoring::score_reviews(
			self.providers.embedding.as_ref(),
			&self.cfg.providers.embedding,
			pool,
			analysis_type,
			product_name,
			now,
			sampling.embedding_batch_size as usize,
		)
		.await?;
		let selected = selection::select_balanced(scored, limit);

		tracing::debug!(
			product_id = %product_id,
			analysis_type = %analysis_type,
			limit,
			pool = pool_len,
			selected = selected.len(),
			"Selected reviews."
		);

		Ok(selected)
	}
}
