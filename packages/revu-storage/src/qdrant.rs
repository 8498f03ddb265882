pub const PAYLOAD_REVIEW_ID: &str = "review_id";
pub const PAYLOAD_PRODUCT_ID: &str = "product_id";
pub const PAYLOAD_COMPETITOR_ID: &str = "competitor_id";
pub const PAYLOAD_SOURCE: &str = "source";
pub const PAYLOAD_RATING: &str = "rating";
pub const PAYLOAD_REVIEW_DATE: &str = "review_date";
pub const PAYLOAD_WORD_COUNT: &str = "word_count";
pub const PAYLOAD_TEXT: &str = "text";

/// `source` payload value for reviews of the product itself.
pub const SOURCE_PRODUCT: &str = "product";
pub const SOURCE_COMPETITOR: &str = "competitor";

use crate::Result;

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &revu_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}
}
