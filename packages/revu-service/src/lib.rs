pub mod index;
pub mod orchestrator;
pub mod progress;
pub mod runs;
pub mod sampling;
pub mod status;
pub mod store;

mod error;

pub use error::{Error, Result};
pub use orchestrator::{ReprocessOutcome, RunClaim, RunSummary, TypeError, TypeOutcome};
pub use progress::{NoopProgress, ProgressEvent, ProgressSink};
pub use runs::{RunProgress, RunRegistry, RunState, RunTicket};
pub use status::{AnalysisStatusSummary, TypeStatus};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use revu_config::{AnalysisProviderConfig, Config, EmbeddingProviderConfig};
use revu_domain::{AnalysisRecord, Competitor, Product, Review};
use revu_providers::{analysis, analysis::AnalysisRequest, embedding};
use revu_storage::{db::Db, qdrant::QdrantStore};

use crate::{index::QdrantReviewIndex, store::PgAnalysisStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait AnalysisProvider
where
	Self: Send + Sync,
{
	fn analyze<'a>(
		&'a self,
		cfg: &'a AnalysisProviderConfig,
		request: &'a AnalysisRequest,
	) -> BoxFuture<'a, color_eyre::Result<Value>>;
}

/// Which reviews of a product a query covers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReviewScope {
	/// Reviews of the product itself, excluding competitor reviews.
	Product,
	Competitor(Uuid),
}
impl ReviewScope {
	pub fn matches(self, review: &Review) -> bool {
		match self {
			Self::Product => review.competitor_id.is_none(),
			Self::Competitor(competitor_id) => review.competitor_id == Some(competitor_id),
		}
	}
}

#[derive(Clone, Debug)]
pub struct ReviewQuery {
	pub product_id: Uuid,
	pub scope: ReviewScope,
	/// Star bucket the reviews must fall into.
	pub rating: Option<u8>,
	pub limit: usize,
}

/// Metadata-filtered lookup over indexed reviews, without semantic ranking.
pub trait ReviewIndex
where
	Self: Send + Sync,
{
	fn query_reviews<'a>(&'a self, query: &'a ReviewQuery) -> BoxFuture<'a, Result<Vec<Review>>>;
}

pub trait AnalysisStore
where
	Self: Send + Sync,
{
	fn get_product(&self, product_id: Uuid) -> BoxFuture<'_, Result<Option<Product>>>;

	fn list_competitors(&self, product_id: Uuid) -> BoxFuture<'_, Result<Vec<Competitor>>>;

	fn list_analyses(&self, product_id: Uuid) -> BoxFuture<'_, Result<Vec<AnalysisRecord>>>;

	fn upsert_analysis<'a>(&'a self, record: &'a AnalysisRecord) -> BoxFuture<'a, Result<()>>;

	/// Compare-and-set on the product's processing flag.
	///
	/// Returns the holder's start time, which is the token for [`AnalysisStore::end_processing`],
	/// or `None` while another live run holds the flag.
	fn try_begin_processing(
		&self,
		product_id: Uuid,
		now: OffsetDateTime,
		lease: Duration,
	) -> BoxFuture<'_, Result<Option<OffsetDateTime>>>;

	/// Releases the flag only if `started_at` still identifies the holder. `false` means the run
	/// was taken over and the flag was left alone.
	fn end_processing(
		&self,
		product_id: Uuid,
		started_at: OffsetDateTime,
	) -> BoxFuture<'_, Result<bool>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub analysis: Arc<dyn AnalysisProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, analysis: Arc<dyn AnalysisProvider>) -> Self {
		Self { embedding, analysis }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), analysis: provider }
	}
}

pub struct RevuService {
	pub cfg: Config,
	pub providers: Providers,
	pub index: Arc<dyn ReviewIndex>,
	pub store: Arc<dyn AnalysisStore>,
}
impl RevuService {
	pub fn new(cfg: Config, db: Db, qdrant: QdrantStore) -> Self {
		Self {
			cfg,
			providers: Providers::default(),
			index: Arc::new(QdrantReviewIndex::new(qdrant)),
			store: Arc::new(PgAnalysisStore::new(db)),
		}
	}

	pub fn with_backends(
		cfg: Config,
		providers: Providers,
		index: Arc<dyn ReviewIndex>,
		store: Arc<dyn AnalysisStore>,
	) -> Self {
		Self { cfg, providers, index, store }
	}

	/// Loads the product and checks that its brand belongs to `user_id`.
	pub async fn authorized_product(&self, product_id: Uuid, user_id: Uuid) -> Result<Product> {
		let Some(product) = self.store.get_product(product_id).await? else {
			return Err(Error::NotFound { message: format!("Product {product_id} does not exist.") });
		};

		if product.owner_user_id != user_id {
			return Err(Error::Unauthorized {
				message: format!("Product {product_id} does not belong to the caller."),
			});
		}

		Ok(product)
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}
impl AnalysisProvider for DefaultProviders {
	fn analyze<'a>(
		&'a self,
		cfg: &'a AnalysisProviderConfig,
		request: &'a AnalysisRequest,
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(async move { Ok(analysis::analyze(cfg, request).await?) })
	}
}
