use serde::Serialize;
use serde_json::Value;

use catalog_query::{Network, NftFilters};
use catalog_storage::executor::{self, NFT_TOTAL_COLUMN};

use crate::{CatalogService, Result};

#[derive(Clone, Debug, Default, Serialize)]
pub struct NftsResponse {
	pub data: Vec<Value>,
	pub total: i64,
}

impl CatalogService {
	pub async fn nfts(&self, filters: NftFilters) -> Result<NftsResponse> {
		let statement = self.compiler.compile_nfts(&filters)?;
		let page = executor::fetch_page(&self.db, &statement, NFT_TOTAL_COLUMN).await?;

		Ok(NftsResponse { data: page.rows, total: page.total })
	}

	pub async fn nft_by_token_id(
		&self,
		contract_address: &str,
		token_id: &str,
		network: Network,
	) -> Result<Option<Value>> {
		let statement = self.compiler.compile_nft_by_token_id(contract_address, token_id, network)?;
		let rows = executor::fetch_json_rows(&self.db, &statement).await?;

		Ok(rows.into_iter().next())
	}
}
