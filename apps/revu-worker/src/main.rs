use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = revu_worker::Args::parse();

	revu_worker::run(args).await
}
