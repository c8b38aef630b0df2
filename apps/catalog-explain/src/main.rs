use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = catalog_explain::Args::parse();
	catalog_explain::run(args).await
}
