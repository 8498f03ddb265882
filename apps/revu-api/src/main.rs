use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = revu_api::Args::parse();

	revu_api::run(args).await
}
