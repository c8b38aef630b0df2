use catalog_config::Schemas;

use crate::{
	cte::{SEARCH_CANDIDATES, UNIFIED_TRADES},
	filters::CatalogFilters,
	predicates::{EMOTE_ITEM_TYPE, WEARABLE_ITEM_TYPES},
	sql::Fragment,
};

/// Orders whose expiry does not fit a Postgres timestamp are ignored.
pub const MAX_ORDER_TIMESTAMP: i64 = 253_378_408_747_000;

/// Which optional joins a catalog statement needs.
///
/// Metadata, on-chain order, and off-chain trade aggregations are always joined and carry no flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinPlan {
	/// Distinct owner counts, only shown for items that are not on sale.
	pub owners_count: bool,
	/// Inline search ranking, used when no pre-ranked ids were supplied.
	pub search_candidates: bool,
}
impl JoinPlan {
	pub fn for_filters(filters: &CatalogFilters) -> Self {
		Self {
			owners_count: filters.is_on_sale == Some(false),
			search_candidates: filters.search_term().is_some() && filters.ids.is_empty(),
		}
	}
}

pub fn owners_join(schemas: &Schemas) -> Fragment {
	Fragment::sql(format!(
		"\
LEFT JOIN (
	SELECT item, COUNT(DISTINCT owner) AS owners_count
	FROM {marketplace}.nft AS nfts
	GROUP BY nfts.item
) AS nfts ON nfts.item = items.id",
		marketplace = schemas.marketplace,
	))
}

/// Open, unexpired on-chain orders aggregated per item.
///
/// Expiry is stored in milliseconds for newer orders and in seconds for older ones; the digit count
/// tells them apart. When a price range is requested only orders inside it are aggregated.
pub fn nfts_with_orders_join(schemas: &Schemas, filters: &CatalogFilters) -> Fragment {
	let mut fragment = Fragment::sql(format!(
		"\
LEFT JOIN (
	SELECT
		orders.item_id,
		COUNT(orders.id) AS listings_count,
		MIN(orders.price) AS min_price,
		MAX(orders.price) AS max_price,
		MAX(orders.created_at) AS max_order_created_at
	FROM {marketplace}.order AS orders
	WHERE orders.status = 'open'
		AND orders.expires_at < {MAX_ORDER_TIMESTAMP}
		AND ((LENGTH(orders.expires_at::text) = 13 AND TO_TIMESTAMP(orders.expires_at / 1000.0) > NOW())
			OR (LENGTH(orders.expires_at::text) = 10 AND TO_TIMESTAMP(orders.expires_at) > NOW()))",
		marketplace = schemas.marketplace,
	));

	if let Some(min) = filters.min_price.as_deref() {
		fragment.push("\n\t\tAND orders.price >= ").push_bind(min).push("::numeric");
	}
	if let Some(max) = filters.max_price.as_deref() {
		fragment.push("\n\t\tAND orders.price <= ").push_bind(max).push("::numeric");
	}

	fragment.push(
		"
	GROUP BY orders.item_id
) AS nfts_with_orders ON nfts_with_orders.item_id = items.id",
	);

	fragment
}

/// Wearable and emote metadata, each joined only for items of its own type.
pub fn metadata_joins(schemas: &Schemas) -> Fragment {
	let marketplace = &schemas.marketplace;
	let wearable_types = WEARABLE_ITEM_TYPES
		.iter()
		.map(|item_type| format!("items.item_type = '{item_type}'"))
		.collect::<Vec<_>>()
		.join(" OR ");

	Fragment::sql(format!(
		"\
LEFT JOIN (
	SELECT
		metadata.id AS metadata_id,
		wearable.description,
		wearable.category,
		wearable.body_shapes,
		wearable.rarity,
		wearable.name
	FROM {marketplace}.wearable AS wearable
	JOIN {marketplace}.metadata AS metadata ON metadata.wearable_id = wearable.id
) AS metadata_wearable ON metadata_wearable.metadata_id = items.metadata_id AND ({wearable_types})
LEFT JOIN (
	SELECT
		metadata.id AS metadata_id,
		emote.description,
		emote.category,
		emote.body_shapes,
		emote.rarity,
		emote.name,
		emote.loop,
		emote.has_sound,
		emote.has_geometry
	FROM {marketplace}.emote AS emote
	JOIN {marketplace}.metadata AS metadata ON metadata.emote_id = emote.id
) AS metadata_emote ON metadata_emote.metadata_id = items.metadata_id AND items.item_type = '{EMOTE_ITEM_TYPE}'"
	))
}

/// Open off-chain trades aggregated per collection contract.
pub fn offchain_orders_join() -> Fragment {
	Fragment::sql(format!(
		"\
LEFT JOIN (
	SELECT
		COUNT(id) AS count,
		contract_address_sent,
		MIN(order_amount_received) AS min_order_amount_received,
		MAX(order_amount_received) AS max_order_amount_received,
		MIN(item_amount) AS item_amount,
		MAX(token_id) AS token_id,
		MAX(item_id) AS item_id,
		MAX(created_at) AS max_created_at,
		json_agg(assets) AS aggregated_assets
	FROM {UNIFIED_TRADES}
	WHERE status = 'open'
	GROUP BY contract_address_sent
) AS offchain_orders ON offchain_orders.contract_address_sent = items.collection_id"
	))
}

pub fn search_candidates_join() -> Fragment {
	Fragment::sql(format!(
		"JOIN {SEARCH_CANDIDATES} ON {SEARCH_CANDIDATES}.id = items.id::text"
	))
}

/// Renders every join the plan and filters call for, in statement order.
pub fn planned_joins(schemas: &Schemas, filters: &CatalogFilters, plan: JoinPlan) -> Vec<Fragment> {
	let mut joins = Vec::with_capacity(5);

	if plan.owners_count {
		joins.push(owners_join(schemas));
	}

	joins.push(nfts_with_orders_join(schemas, filters));
	joins.push(metadata_joins(schemas));
	joins.push(offchain_orders_join());

	if plan.search_candidates {
		joins.push(search_candidates_join());
	}

	joins
}
