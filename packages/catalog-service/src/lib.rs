pub mod catalog;
pub mod nfts;

mod error;

pub use catalog::{CatalogResponse, apply_ranked_ids};
pub use error::{Error, Result};
pub use nfts::NftsResponse;

use catalog_config::Config;
use catalog_query::CatalogQueryCompiler;
use catalog_storage::db::Db;

pub struct CatalogService {
	pub cfg: Config,
	pub db: Db,
	pub compiler: CatalogQueryCompiler,
}
impl CatalogService {
	pub fn new(cfg: Config, db: Db) -> Self {
		let compiler = CatalogQueryCompiler::from_config(&cfg);

		Self { cfg, db, compiler }
	}
}
