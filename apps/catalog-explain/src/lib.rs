use std::{fs, path::PathBuf};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::WrapErr;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use catalog_query::{CatalogFilters, CatalogQueryCompiler, NftFilters, Statement};
use catalog_service::CatalogService;
use catalog_storage::{db::Db, executor};

#[derive(Debug, Parser)]
#[command(
	version = catalog_cli::VERSION,
	rename_all = "kebab",
	styles = catalog_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON file holding the filter specification.
	#[arg(long, short = 'f', value_name = "FILE")]
	pub filters: PathBuf,
	#[arg(long, short = 'k', value_enum, default_value_t = Kind::Catalog)]
	pub kind: Kind,
	/// Run the statement and print the rows instead of the SQL.
	#[arg(long)]
	pub execute: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Kind {
	Catalog,
	Search,
	Nfts,
}

enum Filters {
	Catalog(CatalogFilters),
	Nfts(NftFilters),
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = catalog_config::load(&args.config)?;

	init_tracing(&config)?;

	let raw = fs::read_to_string(&args.filters)
		.wrap_err_with(|| format!("Failed to read filters from {:?}.", args.filters))?;
	let filters = parse_filters(args.kind, &raw)?;

	if !args.execute {
		let compiler = CatalogQueryCompiler::from_config(&config);

		return print_json(&compile(&compiler, args.kind, &filters)?);
	}

	tracing::info!(kind = ?args.kind, "Executing filters against Postgres.");

	let db = Db::connect(&config.storage.postgres).await?;
	let service = CatalogService::new(config, db);

	match (args.kind, filters) {
		(Kind::Search, Filters::Catalog(filters)) => {
			let statement = service.compiler.compile_search(&filters)?;

			print_json(&executor::fetch_search_candidates(&service.db, &statement).await?)
		},
		(_, Filters::Catalog(filters)) => print_json(&service.catalog(filters).await?),
		(_, Filters::Nfts(filters)) => print_json(&service.nfts(filters).await?),
	}
}

fn parse_filters(kind: Kind, raw: &str) -> color_eyre::Result<Filters> {
	let filters = match kind {
		Kind::Catalog | Kind::Search => Filters::Catalog(serde_json::from_str(raw)?),
		Kind::Nfts => Filters::Nfts(serde_json::from_str(raw)?),
	};

	Ok(filters)
}

fn compile(
	compiler: &CatalogQueryCompiler,
	kind: Kind,
	filters: &Filters,
) -> color_eyre::Result<Statement> {
	let statement = match (kind, filters) {
		(Kind::Search, Filters::Catalog(filters)) => compiler.compile_search(filters)?,
		(_, Filters::Catalog(filters)) => compiler.compile_catalog(filters)?,
		(_, Filters::Nfts(filters)) => compiler.compile_nfts(filters)?,
	};

	Ok(statement)
}

fn print_json<T>(value: &T) -> color_eyre::Result<()>
where
	T: Serialize,
{
	println!("{}", serde_json::to_string_pretty(value)?);

	Ok(())
}

fn init_tracing(config: &catalog_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	Ok(())
}
