use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub schemas: Schemas,
	pub marketplace: Marketplace,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Physical schema names the compiled statements are qualified with.
///
/// Each value is spliced into SQL text, so `validate` only accepts plain identifiers.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Schemas {
	/// Indexed marketplace data: items, nfts, orders, metadata, accounts, land, ENS.
	#[serde(default = "default_marketplace_schema")]
	pub marketplace: String,
	/// Curator data: utility descriptions and curated tags.
	#[serde(default = "default_builder_server_schema")]
	pub builder_server: String,
	/// Off-chain trade ledger written by the API.
	#[serde(default = "default_trades_schema")]
	pub trades: String,
	/// On-chain trade settlement and signature indexes.
	#[serde(default = "default_squid_trades_schema")]
	pub squid_trades: String,
}
impl Default for Schemas {
	fn default() -> Self {
		Self {
			marketplace: default_marketplace_schema(),
			builder_server: default_builder_server_schema(),
			trades: default_trades_schema(),
			squid_trades: default_squid_trades_schema(),
		}
	}
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Marketplace {
	/// Off-chain marketplace contract on Ethereum.
	pub ethereum_offchain_marketplace: String,
	/// Off-chain marketplace contract on Polygon.
	pub polygon_offchain_marketplace: String,
}
impl Marketplace {
	pub fn offchain_marketplaces(&self) -> Vec<String> {
		vec![
			self.ethereum_offchain_marketplace.to_lowercase(),
			self.polygon_offchain_marketplace.to_lowercase(),
		]
	}
}

fn default_marketplace_schema() -> String {
	"squid_marketplace".to_string()
}

fn default_builder_server_schema() -> String {
	"builder_server".to_string()
}

fn default_trades_schema() -> String {
	"marketplace".to_string()
}

fn default_squid_trades_schema() -> String {
	"squid_trades".to_string()
}
