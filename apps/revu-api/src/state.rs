use std::sync::Arc;

use revu_service::{RevuService, RunRegistry};
use revu_storage::{db::Db, qdrant::QdrantStore};

#[derive(Clone)]
pub struct AppState {
	pub runs: RunRegistry,
}
impl AppState {
	pub async fn new(config: revu_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&config.storage.qdrant)?;
		let service = RevuService::new(config, db, qdrant);

		Ok(Self::from_service(Arc::new(service)))
	}

	pub fn from_service(service: Arc<RevuService>) -> Self {
		Self { runs: RunRegistry::new(service) }
	}

	pub fn service(&self) -> &RevuService {
		self.runs.service()
	}
}
