use crate::AnalysisType;

const SMALL_CORPUS: usize = 500;
const MEDIUM_CORPUS: usize = 2_000;
const LARGE_CORPUS: usize = 10_000;
const MEDIUM_SHARE: f64 = 0.25;
const LARGE_SHARE: f64 = 0.12;
const HUGE_SHARE: f64 = 0.08;
const HUGE_CEILING: usize = 2_000;
const BREADTH_FACTOR: f64 = 1.5;
const BREADTH_CEILING: usize = 3_000;

/// Number of reviews an analysis should see, scaled to the size of the corpus.
pub fn target_sample_size(analysis_type: AnalysisType, total_reviews: usize) -> usize {
	let base = analysis_type.base_sample_size();
	let scaled = if total_reviews <= SMALL_CORPUS {
		base.min(total_reviews)
	} else if total_reviews <= MEDIUM_CORPUS {
		base.max(share(total_reviews, MEDIUM_SHARE))
	} else if total_reviews <= LARGE_CORPUS {
		base.max(share(total_reviews, LARGE_SHARE))
	} else {
		base.max(share(total_reviews, HUGE_SHARE).min(HUGE_CEILING))
	};

	if analysis_type.is_breadth_sensitive() {
		return share(scaled, BREADTH_FACTOR).min(BREADTH_CEILING);
	}

	scaled
}

/// Candidate pool drawn before scoring: an over-sample of the target, bounded by `max_pool`.
pub fn pool_size(limit: usize, multiplier: usize, max_pool: usize) -> usize {
	limit.saturating_mul(multiplier).min(max_pool)
}

fn share(total: usize, ratio: f64) -> usize {
	(total as f64 * ratio).floor() as usize
}
