pub mod worker;

mod error;

pub use error::{Error, Result};

use clap::Parser;

use revu_cli::ConfigArgs;
use revu_storage::{db::Db, qdrant::QdrantStore};

#[derive(Debug, Parser)]
#[command(
	version = revu_cli::VERSION,
	rename_all = "kebab",
	styles = revu_cli::styles(),
)]
pub struct Args {
	#[command(flatten)]
	pub config: ConfigArgs,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = revu_config::load(&args.config.config)?;

	revu_cli::init_tracing(&config.service.log_level);

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let qdrant = QdrantStore::new(&config.storage.qdrant)?;
	let state = worker::WorkerState { db, qdrant, embedding: config.providers.embedding };

	tracing::info!(collection = %state.qdrant.collection, "Review indexer started.");

	worker::run_worker(state).await?;

	Ok(())
}
