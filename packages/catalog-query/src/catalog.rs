use catalog_config::{Config, Schemas};

use crate::{
	Result,
	cte,
	filters::{CatalogFilters, Network},
	joins::{self, JoinPlan},
	nfts::{self, NftFilters},
	predicates::{self, BASE_PREDICATE, wearable_item_types_sql},
	search,
	sort,
	sql::{Fragment, Statement},
	validate,
};

/// Compiles filter specifications into parameterized statements.
///
/// Holds only configuration, so one instance can be shared across requests and threads.
#[derive(Clone, Debug)]
pub struct CatalogQueryCompiler {
	schemas: Schemas,
	marketplace_addresses: Vec<String>,
}
impl CatalogQueryCompiler {
	pub fn new(schemas: Schemas, marketplace_addresses: Vec<String>) -> Self {
		Self { schemas, marketplace_addresses }
	}

	pub fn from_config(cfg: &Config) -> Self {
		Self::new(cfg.schemas.clone(), cfg.marketplace.offchain_marketplaces())
	}

	pub fn schemas(&self) -> &Schemas {
		&self.schemas
	}

	/// Compiles the catalog listing statement.
	///
	/// Rows carry a `total_rows` window count so one round-trip yields both the page and the total.
	pub fn compile_catalog(&self, filters: &CatalogFilters) -> Result<Statement> {
		validate::validate_catalog_filters(filters)?;

		let plan = JoinPlan::for_filters(filters);
		let mut ctes = vec![cte::unified_trades(&self.schemas, &self.marketplace_addresses)];

		if plan.search_candidates
			&& let Some(search) = filters.search_term()
		{
			ctes.extend(search::search_ctes(&self.schemas, search));
			ctes.push(cte::search_candidates(&self.schemas, filters.network, search));
		}

		let mut fragment = cte::with_clause(ctes).unwrap_or_default();

		fragment.push("\n").push_fragment(self.projection(filters, plan));
		fragment.push(format!("\nFROM {}.item AS items", self.schemas.marketplace));

		for join in joins::planned_joins(&self.schemas, filters, plan) {
			fragment.push("\n").push_fragment(join);
		}

		fragment.push("\n").push_fragment(where_clause(filters));

		if let Some(order_by) = sort::order_by(filters, plan.search_candidates) {
			fragment.push("\n").push_fragment(order_by);
		}
		if let Some(pagination) = sort::pagination(filters.limit, filters.offset) {
			fragment.push("\n").push_fragment(pagination);
		}

		let statement = Statement::new(fragment);

		tracing::debug!(
			owners_count = plan.owners_count,
			search_candidates = plan.search_candidates,
			params = statement.params().len(),
			"Compiled catalog query."
		);

		Ok(statement)
	}

	/// Compiles the standalone ranking statement for `filters.search`.
	pub fn compile_search(&self, filters: &CatalogFilters) -> Result<Statement> {
		let statement = search::ranked_statement(&self.schemas, filters)?;

		tracing::debug!(params = statement.params().len(), "Compiled search ranking query.");

		Ok(statement)
	}

	/// Compiles the NFT listing statement.
	pub fn compile_nfts(&self, filters: &NftFilters) -> Result<Statement> {
		let statement = nfts::nfts_statement(&self.schemas, &self.marketplace_addresses, filters)?;

		tracing::debug!(params = statement.params().len(), "Compiled NFT query.");

		Ok(statement)
	}

	pub fn compile_nft_by_token_id(
		&self,
		contract_address: &str,
		token_id: &str,
		network: Network,
	) -> Result<Statement> {
		self.compile_nfts(&NftFilters::by_token_id(contract_address, token_id, network))
	}

	fn projection(&self, filters: &CatalogFilters, plan: JoinPlan) -> Fragment {
		let mut fragment = Fragment::sql(format!(
			"\
SELECT
	COUNT(*) OVER() AS total_rows,
	items.id,
	items.blockchain_id,
	items.search_is_collection_approved,
	to_json(
		CASE WHEN items.item_type IN {wearable_types} THEN metadata_wearable
		ELSE metadata_emote
		END
	) AS metadata,
	items.image,
	items.collection_id,
	items.rarity,
	items.item_type::text,
	items.price,
	items.available,
	items.search_is_store_minter,
	items.creator,
	items.beneficiary,
	items.created_at,
	items.updated_at,
	items.reviewed_at,
	items.sold_at,
	items.network,
	items.first_listed_at,
	items.urn,
	LEAST(offchain_orders.min_order_amount_received, nfts_with_orders.min_price) AS min_listing_price,
	nfts_with_orders.min_price AS min_onchain_price,
	GREATEST(offchain_orders.max_order_amount_received, nfts_with_orders.max_price) AS max_listing_price,
	nfts_with_orders.max_price AS max_onchain_price,
	COALESCE(nfts_with_orders.listings_count, 0) + COALESCE(offchain_orders.count, 0) AS listings_count,
	COALESCE(offchain_orders.count, 0) AS offchain_listings_count,
	COALESCE(nfts_with_orders.listings_count, 0) AS onchain_listings_count,
	GREATEST(
		ROUND(EXTRACT(EPOCH FROM offchain_orders.max_created_at)),
		nfts_with_orders.max_order_created_at
	) AS max_order_created_at,",
			wearable_types = wearable_item_types_sql(),
		));

		if plan.owners_count {
			fragment.push("\n\tnfts.owners_count,");
		}

		fragment.push("\n\t").push_fragment(price_case(
			"min_price",
			"items.price >= ",
			filters.min_price.as_deref(),
			"LEAST(items.price, nfts_with_orders.min_price)",
		));
		fragment.push(",\n\t").push_fragment(price_case(
			"max_price",
			"items.price <= ",
			filters.max_price.as_deref(),
			"GREATEST(items.price, nfts_with_orders.max_price)",
		));

		fragment
	}
}

/// Store price and order price merged into one column. The store price only counts while the item
/// is mintable and, when a bound is given, inside it.
fn price_case(alias: &str, comparison: &str, bound: Option<&str>, merged: &str) -> Fragment {
	let mut fragment =
		Fragment::sql("CASE WHEN items.available > 0 AND items.search_is_store_minter = true");

	if let Some(bound) = bound {
		fragment.push(" AND ").push(comparison).push_bind(bound).push("::numeric");
	}

	fragment.push(format!(" THEN {merged} ELSE nfts_with_orders.{alias} END AS {alias}"));

	fragment
}

fn where_clause(filters: &CatalogFilters) -> Fragment {
	let mut fragment = Fragment::sql(format!("WHERE {BASE_PREDICATE}"));

	for (_, predicate) in predicates::catalog_predicates(filters) {
		fragment.push("\n\tAND ").push_fragment(predicate);
	}

	fragment
}
