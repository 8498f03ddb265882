use serde::Serialize;
use time::OffsetDateTime;

use revu_config::EmbeddingProviderConfig;
use revu_domain::{
	AnalysisType, Review,
	scoring::{self, ScoreBreakdown, ScoringProfile},
};

use crate::{EmbeddingProvider, Error, Result};

#[derive(Clone, Debug, Serialize)]
pub struct ScoredReview {
	pub review: Review,
	pub score: ScoreBreakdown,
}

/// Scores every pooled review against the relevance query of `analysis_type`.
///
/// The query is embedded once and reviews in batches of `batch_size`. The result is ordered by
/// total score, highest first, with ties broken on review id.
pub async fn score_reviews(
	embedding: &dyn EmbeddingProvider,
	cfg: &EmbeddingProviderConfig,
	pool: Vec<Review>,
	analysis_type: AnalysisType,
	product_name: Option<&str>,
	now: OffsetDateTime,
	batch_size: usize,
) -> Result<Vec<ScoredReview>> {
	let profile = ScoringProfile::for_type(analysis_type);
	let query = vec![profile.query_text(product_name)];
	let Some(query_vec) = embed_exact(embedding, cfg, &query).await?.pop() else {
		return Err(Error::ExternalService {
			message: "Embedding provider returned no query vector.".to_string(),
		});
	};
	let texts = pool.iter().map(|review| review.text.clone()).collect::<Vec<_>>();
	let mut vectors = Vec::with_capacity(texts.len());

	for batch in texts.chunks(batch_size.max(1)) {
		vectors.extend(embed_exact(embedding, cfg, batch).await?);
	}

	let mut scored = pool
		.into_iter()
		.zip(vectors)
		.map(|(review, vector)| {
			let similarity = cosine_similarity(&query_vec, &vector);
			let score = score_review(&review, similarity, &profile, now);

			ScoredReview { review, score }
		})
		.collect::<Vec<_>>();

	rank(&mut scored);

	Ok(scored)
}

pub fn score_review(
	review: &Review,
	similarity: Option<f32>,
	profile: &ScoringProfile,
	now: OffsetDateTime,
) -> ScoreBreakdown {
	ScoreBreakdown::combine(
		scoring::semantic_score(similarity),
		scoring::length_fitness(review.word_count, profile.length),
		scoring::recency_score(review.date, now),
		scoring::rating_relevance(review.rating, profile.rating_regime),
		scoring::keyword_score(&review.text, profile.keywords),
	)
}

pub fn rank(scored: &mut [ScoredReview]) {
	scored.sort_by(|lhs, rhs| {
		rhs.score
			.total
			.total_cmp(&lhs.score.total)
			.then_with(|| lhs.review.review_id.cmp(&rhs.review.review_id))
	});
}

pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> Option<f32> {
	if lhs.is_empty() || lhs.len() != rhs.len() {
		return None;
	}

	let mut dot = 0.0_f32;
	let mut lhs_norm = 0.0_f32;
	let mut rhs_norm = 0.0_f32;

	for (l, r) in lhs.iter().zip(rhs.iter()) {
		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm <= f32::EPSILON || rhs_norm <= f32::EPSILON {
		return None;
	}

	Some((dot / (lhs_norm.sqrt() * rhs_norm.sqrt())).clamp(-1.0, 1.0))
}

async fn embed_exact(
	embedding: &dyn EmbeddingProvider,
	cfg: &EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let vectors = embedding.embed(cfg, texts).await?;

	if vectors.len() != texts.len() {
		return Err(Error::ExternalService {
			message: format!(
				"Embedding provider returned {} vectors for {} texts.",
				vectors.len(),
				texts.len()
			),
		});
	}
	if let Some(vector) = vectors.iter().find(|vector| vector.len() != cfg.dimensions as usize) {
		return Err(Error::ExternalService {
			message: format!(
				"Embedding dimension {} does not match configured dimensions {}.",
				vector.len(),
				cfg.dimensions
			),
		});
	}

	Ok(vectors)
}

#[cfg(test)]
mod tests {
	use time::Duration;
	use uuid::Uuid;

	use super::*;

	fn review(id: u128, text: &str, rating: f32) -> Review {
		Review {
			review_id: Uuid::from_u128(id),
			product_id: Uuid::nil(),
			competitor_id: None,
			text: text.to_string(),
			rating: Some(rating),
			date: None,
			word_count: revu_domain::count_words(text),
		}
	}

	#[test]
	fn cosine_similarity_handles_degenerate_vectors() {
		assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), Some(1.0));
		assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), Some(-1.0));
		assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), None);
		assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), None);
	}

	#[test]
	fn undated_review_gets_neutral_recency() {
		let profile = ScoringProfile::for_type(AnalysisType::Sentiment);
		let now = OffsetDateTime::UNIX_EPOCH + Duration::days(4_000);
		let undated = review(1, "I love it", 5.0);
		let mut fresh = undated.clone();
		let mut stale = undated.clone();

		fresh.date = Some(now - Duration::days(30));
		stale.date = Some(now - Duration::days(800));

		let undated = score_review(&undated, Some(0.5), &profile, now);
		let fresh = score_review(&fresh, Some(0.5), &profile, now);
		let stale = score_review(&stale, Some(0.5), &profile, now);

		assert_eq!(undated.recency, 50.0);
		assert!(stale.total < undated.total && undated.total < fresh.total);
	}

	#[test]
	fn ranking_is_descending_with_id_tie_break() {
		let profile = ScoringProfile::for_type(AnalysisType::Description);
		let now = OffsetDateTime::UNIX_EPOCH;
		let mut scored = [(3, 0.2), (1, 0.9), (2, 0.2)]
			.into_iter()
			.map(|(id, similarity)| {
				let review = review(id, "solid build quality", 4.0);
				let score = score_review(&review, Some(similarity), &profile, now);

				ScoredReview { review, score }
			})
			.collect::<Vec<_>>();

		rank(&mut scored);

		let order = scored.iter().map(|item| item.review.review_id.as_u128()).collect::<Vec<_>>();

		assert_eq!(order, vec![1, 2, 3]);
	}
}
