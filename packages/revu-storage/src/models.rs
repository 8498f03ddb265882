use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

/// A product joined with the user that owns its brand.
#[derive(Debug, sqlx::FromRow)]
pub struct ProductRow {
	pub product_id: Uuid,
	pub brand_id: Uuid,
	pub owner_user_id: Uuid,
	pub name: String,
	pub reviews_count: i64,
	pub is_processing: bool,
	pub processing_started_at: Option<OffsetDateTime>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct CompetitorRow {
	pub competitor_id: Uuid,
	pub product_id: Uuid,
	pub name: String,
	pub reviews_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ReviewRow {
	pub review_id: Uuid,
	pub product_id: Uuid,
	pub competitor_id: Option<Uuid>,
	pub text: String,
	pub rating: Option<f32>,
	pub review_date: Option<OffsetDateTime>,
	pub word_count: i32,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct AnalysisRecordRow {
	pub product_id: Uuid,
	pub analysis_type: String,
	pub status: String,
	pub data: Value,
	pub error: Option<String>,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ReviewIndexingOutboxEntry {
	pub outbox_id: Uuid,
	pub review_id: Uuid,
	pub status: String,
	pub attempts: i32,
	pub last_error: Option<String>,
	pub available_at: OffsetDateTime,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
