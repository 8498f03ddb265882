use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub sampling: Sampling,
	#[serde(default)]
	pub orchestration: Orchestration,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	/// One collection holds every product's reviews; products are partitioned by payload.
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub analysis: AnalysisProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	/// Attempts per call when the service answers with content that is not JSON.
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sampling {
	pub pool_multiplier: u32,
	pub max_pool_size: u32,
	pub embedding_batch_size: u32,
}
impl Default for Sampling {
	fn default() -> Self {
		Self { pool_multiplier: 3, max_pool_size: 500, embedding_batch_size: 64 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Orchestration {
	/// Pause between consecutive analysis service calls.
	pub inter_call_delay_ms: u64,
	pub competitor_concurrency: u32,
	/// A processing flag older than this is treated as abandoned by a crashed run.
	pub lock_lease_seconds: i64,
}
impl Default for Orchestration {
	fn default() -> Self {
		Self { inter_call_delay_ms: 2_000, competitor_concurrency: 2, lock_lease_seconds: 3_600 }
	}
}

fn default_max_attempts() -> u32 {
	3
}
