//! Qdrant implementation of [`ReviewIndex`].
//!
//! All reviews live in one collection. Products are told apart by the `product_id` payload and
//! competitor reviews by `source` and `competitor_id`; rating buckets are payload range filters.

use std::collections::HashMap;

use qdrant_client::qdrant::{
	Condition, Filter, QueryPointsBuilder, Range, ScoredPoint, Value, point_id::PointIdOptions,
	value::Kind,
};
use uuid::Uuid;

use revu_domain::Review;
use revu_storage::qdrant::{
	PAYLOAD_COMPETITOR_ID, PAYLOAD_PRODUCT_ID, PAYLOAD_RATING, PAYLOAD_REVIEW_DATE,
	PAYLOAD_REVIEW_ID, PAYLOAD_SOURCE, PAYLOAD_TEXT, PAYLOAD_WORD_COUNT, QdrantStore,
	SOURCE_COMPETITOR, SOURCE_PRODUCT,
};

use crate::{BoxFuture, Result, ReviewIndex, ReviewQuery, ReviewScope};

pub struct QdrantReviewIndex {
	qdrant: QdrantStore,
}
impl QdrantReviewIndex {
	pub fn new(qdrant: QdrantStore) -> Self {
		Self { qdrant }
	}
}
impl ReviewIndex for QdrantReviewIndex {
	fn query_reviews<'a>(&'a self, query: &'a ReviewQuery) -> BoxFuture<'a, Result<Vec<Review>>> {
		Box::pin(async move {
			if query.limit == 0 {
				return Ok(Vec::new());
			}

			let search = QueryPointsBuilder::new(self.qdrant.collection.clone())
				.filter(review_filter(query))
				.limit(query.limit as u64)
				.with_payload(true);
			let response = self.qdrant.client.query(search).await?;
			let mut reviews = Vec::with_capacity(response.result.len());

			for point in response.result {
				match review_from_point(query.product_id, &point) {
					Some(review) => reviews.push(review),
					None => tracing::warn!(
						product_id = %query.product_id,
						"Skipping review point with incomplete payload."
					),
				}
			}

			Ok(reviews)
		})
	}
}

pub fn review_filter(query: &ReviewQuery) -> Filter {
	let mut must = vec![Condition::matches(PAYLOAD_PRODUCT_ID, query.product_id.to_string())];

	match query.scope {
		ReviewScope::Product => {
			must.push(Condition::matches(PAYLOAD_SOURCE, SOURCE_PRODUCT.to_string()));
		},
		ReviewScope::Competitor(competitor_id) => {
			must.push(Condition::matches(PAYLOAD_SOURCE, SOURCE_COMPETITOR.to_string()));
			must.push(Condition::matches(PAYLOAD_COMPETITOR_ID, competitor_id.to_string()));
		},
	}

	if let Some(bucket) = query.rating {
		let center = f64::from(bucket);

		must.push(Condition::range(
			PAYLOAD_RATING,
			Range { gte: Some(center - 0.5), lt: Some(center + 0.5), ..Default::default() },
		));
	}

	Filter::must(must)
}

fn review_from_point(product_id: Uuid, point: &ScoredPoint) -> Option<Review> {
	let payload = &point.payload;
	let review_id = point
		.id
		.as_ref()
		.and_then(point_id_to_uuid)
		.or_else(|| payload_uuid(payload, PAYLOAD_REVIEW_ID))?;
	let text = payload_str(payload, PAYLOAD_TEXT)?.to_string();
	let word_count = payload_i64(payload, PAYLOAD_WORD_COUNT)
		.and_then(|count| u32::try_from(count).ok())
		.unwrap_or_else(|| revu_domain::count_words(&text));

	Some(Review {
		review_id,
		product_id,
		competitor_id: payload_uuid(payload, PAYLOAD_COMPETITOR_ID),
		rating: payload_f64(payload, PAYLOAD_RATING).map(|rating| rating as f32),
		date: payload_str(payload, PAYLOAD_REVIEW_DATE).and_then(revu_domain::time_serde::parse),
		word_count,
		text,
	})
}

fn point_id_to_uuid(point_id: &qdrant_client::qdrant::PointId) -> Option<Uuid> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Uuid::parse_str(id).ok(),
		_ => None,
	}
}

fn payload_str<'a>(payload: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
	match &payload.get(key)?.kind {
		Some(Kind::StringValue(text)) => Some(text.as_str()),
		_ => None,
	}
}

fn payload_uuid(payload: &HashMap<String, Value>, key: &str) -> Option<Uuid> {
	payload_str(payload, key).and_then(|text| Uuid::parse_str(text).ok())
}

fn payload_f64(payload: &HashMap<String, Value>, key: &str) -> Option<f64> {
	match &payload.get(key)?.kind {
		Some(Kind::DoubleValue(value)) => Some(*value),
		Some(Kind::IntegerValue(value)) => Some(*value as f64),
		_ => None,
	}
}

fn payload_i64(payload: &HashMap<String, Value>, key: &str) -> Option<i64> {
	match &payload.get(key)?.kind {
		Some(Kind::IntegerValue(value)) => Some(*value),
		Some(Kind::DoubleValue(value)) if value.fract() == 0.0 => Some(*value as i64),
		_ => None,
	}
}
