mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	AnalysisProviderConfig, Config, EmbeddingProviderConfig, Orchestration, Postgres, Providers,
	Qdrant, Sampling, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("analysis", &cfg.providers.analysis.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	let temperature = cfg.providers.analysis.temperature;

	if !temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.analysis.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&temperature) {
		return Err(Error::Validation {
			message: "providers.analysis.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if cfg.providers.analysis.max_attempts == 0 {
		return Err(Error::Validation {
			message: "providers.analysis.max_attempts must be greater than zero.".to_string(),
		});
	}
	if cfg.sampling.pool_multiplier == 0 {
		return Err(Error::Validation {
			message: "sampling.pool_multiplier must be greater than zero.".to_string(),
		});
	}
	// Five rating buckets need at least one slot each.
	if cfg.sampling.max_pool_size < 5 {
		return Err(Error::Validation {
			message: "sampling.max_pool_size must be at least 5.".to_string(),
		});
	}
	if cfg.sampling.embedding_batch_size == 0 {
		return Err(Error::Validation {
			message: "sampling.embedding_batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.orchestration.competitor_concurrency == 0 {
		return Err(Error::Validation {
			message: "orchestration.competitor_concurrency must be greater than zero.".to_string(),
		});
	}
	if cfg.orchestration.lock_lease_seconds <= 0 {
		return Err(Error::Validation {
			message: "orchestration.lock_lease_seconds must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let embedding_base = cfg.providers.embedding.api_base.trim_end_matches('/').to_string();
	let analysis_base = cfg.providers.analysis.api_base.trim_end_matches('/').to_string();

	cfg.providers.embedding.api_base = embedding_base;
	cfg.providers.analysis.api_base = analysis_base;
}
