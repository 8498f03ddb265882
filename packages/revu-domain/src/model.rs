use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{AnalysisType, Error};

pub const RATING_BUCKETS: [u8; 5] = [1, 2, 3, 4, 5];

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Review {
	pub review_id: Uuid,
	pub product_id: Uuid,
	pub competitor_id: Option<Uuid>,
	pub text: String,
	pub rating: Option<f32>,
	#[serde(default, with = "crate::time_serde::option")]
	pub date: Option<OffsetDateTime>,
	pub word_count: u32,
}
impl Review {
	/// Rating rounded to its star bucket. Reviews without a usable rating have no bucket.
	pub fn rating_bucket(&self) -> Option<u8> {
		self.rating.and_then(rating_bucket)
	}
}

pub fn rating_bucket(rating: f32) -> Option<u8> {
	if !rating.is_finite() {
		return None;
	}

	let rounded = rating.round();

	if !(1.0..=5.0).contains(&rounded) {
		return None;
	}

	Some(rounded as u8)
}

pub fn count_words(text: &str) -> u32 {
	text.split_whitespace().count().min(u32::MAX as usize) as u32
}

#[derive(Clone, Debug)]
pub struct Product {
	pub product_id: Uuid,
	pub brand_id: Uuid,
	/// Owner of the brand the product belongs to.
	pub owner_user_id: Uuid,
	pub name: String,
	pub reviews_count: u64,
	pub is_processing: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Competitor {
	pub competitor_id: Uuid,
	pub product_id: Uuid,
	pub name: String,
	pub reviews_count: u64,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
	Pending,
	Completed,
	Failed,
}
impl AnalysisStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Completed => "completed",
			Self::Failed => "failed",
		}
	}
}
impl fmt::Display for AnalysisStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for AnalysisStatus {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw {
			"pending" => Ok(Self::Pending),
			"completed" => Ok(Self::Completed),
			"failed" => Ok(Self::Failed),
			other => Err(Error::UnknownStatus { value: other.to_string() }),
		}
	}
}

/// Persisted outcome of one analysis type for one product.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AnalysisRecord {
	pub product_id: Uuid,
	pub analysis_type: AnalysisType,
	pub status: AnalysisStatus,
	pub data: Value,
	pub error: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}
impl AnalysisRecord {
	pub fn completed(
		product_id: Uuid,
		analysis_type: AnalysisType,
		data: Value,
		now: OffsetDateTime,
	) -> Self {
		Self {
			product_id,
			analysis_type,
			status: AnalysisStatus::Completed,
			data,
			error: None,
			updated_at: now,
		}
	}

	pub fn failed(
		product_id: Uuid,
		analysis_type: AnalysisType,
		error: impl Into<String>,
		now: OffsetDateTime,
	) -> Self {
		Self {
			product_id,
			analysis_type,
			status: AnalysisStatus::Failed,
			data: Value::Null,
			error: Some(error.into()),
			updated_at: now,
		}
	}
}
