use revu_domain::{RATING_BUCKETS, Review};

use crate::sampling::scoring::{self, ScoredReview};

/// Picks up to `limit` reviews from a scored pool while keeping every star bucket represented.
///
/// Every bucket first receives its best reviews up to `floor(limit / 10)`; the rest of the quota
/// goes to the highest scores overall, with no bucket exceeding `ceil(limit / 3)`. The output is
/// ordered by score, highest first.
pub fn select_balanced(mut scored: Vec<ScoredReview>, limit: usize) -> Vec<Review> {
	scoring::rank(&mut scored);

	let min_per_bucket = limit / 10;
	let max_per_bucket = limit.div_ceil(3);
	let mut counts = [0_usize; RATING_BUCKETS.len()];
	let mut taken = vec![false; scored.len()];
	let mut selected = 0;
	let bucket_slot = |item: &ScoredReview| {
		item.review.rating_bucket().map(|bucket| usize::from(bucket) - 1)
	};

	for (idx, item) in scored.iter().enumerate() {
		if selected == limit {
			break;
		}

		let Some(slot) = bucket_slot(item) else { continue };

		if counts[slot] < min_per_bucket {
			counts[slot] += 1;
			taken[idx] = true;
			selected += 1;
		}
	}

	for (idx, item) in scored.iter().enumerate() {
		if selected == limit {
			break;
		}
		if taken[idx] {
			continue;
		}

		let Some(slot) = bucket_slot(item) else { continue };

		if counts[slot] < max_per_bucket {
			counts[slot] += 1;
			taken[idx] = true;
			selected += 1;
		}
	}

	scored
		.into_iter()
		.zip(taken)
		.filter_map(|(item, keep)| keep.then_some(item.review))
		.collect()
}
