//! Common table expressions shared by the catalog, search, and NFT statements.
//!
//! Every builder returns the `name AS (...)` body only; the assembler owns the leading `WITH` and
//! the separators between entries.

use catalog_config::Schemas;

use crate::{filters::Network, search, sql::Fragment};

pub(crate) const LATEST_METADATA: &str = "latest_metadata";
pub(crate) const UNIFIED_TRADES: &str = "unified_trades";
pub(crate) const BUILDER_SERVER_ITEMS: &str = "builder_server_items";
pub(crate) const SEARCH_CANDIDATES: &str = "search_candidates";

/// Prefixes the entries with `WITH` and separates them with commas.
pub fn with_clause<I>(ctes: I) -> Option<Fragment>
where
	I: IntoIterator<Item = Fragment>,
{
	Fragment::join(ctes, ",\n").map(|body| Fragment::sql("WITH ").append(body))
}

/// Newest metadata row per wearable or emote.
pub fn latest_metadata(schemas: &Schemas) -> Fragment {
	Fragment::sql(format!(
		"\
{LATEST_METADATA} AS (
	SELECT DISTINCT ON (wearable_id) wearable_id AS item_id, id AS latest_metadata_id, item_type, wearable_id, emote_id
	FROM {marketplace}.metadata
	ORDER BY wearable_id DESC
)",
		marketplace = schemas.marketplace,
	))
}

/// Joins `latest_metadata` onto `items`.
///
/// Ethereum items were indexed with the metadata reference in `items.metadata` while every other
/// network keys metadata by the item id. Both variants stay until the indexer is made consistent.
pub fn latest_metadata_join(network: Option<Network>) -> Fragment {
	match network {
		Some(Network::Ethereum) => Fragment::sql(format!(
			"LEFT JOIN {LATEST_METADATA} ON {LATEST_METADATA}.item_id = items.metadata"
		)),
		_ => Fragment::sql(format!(
			"LEFT JOIN {LATEST_METADATA} ON {LATEST_METADATA}.item_id = items.id"
		)),
	}
}

/// Curated tags that equal the search term, ignoring case.
pub fn builder_server_items(schemas: &Schemas, search: &str) -> Fragment {
	Fragment::sql(format!(
		"\
{BUILDER_SERVER_ITEMS} AS (
	SELECT item_id, tag
	FROM {builder_server}.mv_builder_server_items
	WHERE LOWER(tag) = LOWER(",
		builder_server = schemas.builder_server,
	))
	.bind(search)
	.text("))")
}

/// One row per off-chain trade, with its assets folded into a JSON object keyed by direction and
/// its status resolved against the on-chain settlement and signature indexes.
///
/// `marketplace_addresses` are the off-chain marketplace contracts whose signature index can
/// invalidate every trade on its network.
pub fn unified_trades(schemas: &Schemas, marketplace_addresses: &[String]) -> Fragment {
	let trades = &schemas.trades;
	let marketplace = &schemas.marketplace;
	let squid_trades = &schemas.squid_trades;
	let addresses =
		marketplace_addresses.iter().map(|address| address.to_lowercase()).collect::<Vec<_>>();

	Fragment::sql(format!(
		"\
{UNIFIED_TRADES} AS (
	SELECT
		t.id,
		t.type,
		t.signer,
		t.created_at,
		MAX(CASE WHEN assets_with_values.direction = 'sent' THEN assets_with_values.contract_address END) AS contract_address_sent,
		MAX(CASE WHEN t.type = 'public_nft_order' AND assets_with_values.direction = 'received' THEN assets_with_values.amount END) AS order_amount_received,
		MIN(CASE WHEN t.type = 'public_item_order' AND assets_with_values.direction = 'received' THEN assets_with_values.amount END) AS item_amount,
		MAX(CASE WHEN t.type = 'public_item_order' THEN assets_with_values.item_id END) AS item_id,
		MAX(CASE WHEN t.type = 'public_nft_order' THEN assets_with_values.token_id END) AS token_id,
		json_object_agg(
			assets_with_values.direction,
			json_build_object(
				'contract_address', assets_with_values.contract_address,
				'direction', assets_with_values.direction,
				'beneficiary', assets_with_values.beneficiary,
				'extra', assets_with_values.extra,
				'token_id', assets_with_values.token_id,
				'item_id', assets_with_values.item_id,
				'amount', assets_with_values.amount,
				'creator', assets_with_values.creator,
				'owner', assets_with_values.owner_id
			)
		) AS assets,
		CASE
			WHEN trade_status.status = 'cancelled' THEN 'cancelled'
			WHEN COALESCE(signer_signature_index.index, 0) != (t.checks ->> 'signerSignatureIndex')::int THEN 'cancelled'
			WHEN COALESCE(contract_signature_index.index, 0) != (t.checks ->> 'contractSignatureIndex')::int THEN 'cancelled'
			WHEN trade_status.uses >= (t.checks ->> 'uses')::int THEN 'sold'
			ELSE 'open'
		END AS status
	FROM {trades}.trades AS t
	JOIN (
		SELECT
			ta.id,
			ta.trade_id,
			ta.contract_address,
			ta.direction,
			ta.beneficiary,
			ta.extra,
			erc721_asset.token_id,
			item_asset.item_id,
			erc20_asset.amount,
			item.creator,
			nft.owner_id
		FROM {trades}.trade_assets AS ta
		LEFT JOIN {trades}.trade_assets_erc721 AS erc721_asset ON ta.id = erc721_asset.asset_id
		LEFT JOIN {trades}.trade_assets_erc20 AS erc20_asset ON ta.id = erc20_asset.asset_id
		LEFT JOIN {trades}.trade_assets_item AS item_asset ON ta.id = item_asset.asset_id
		LEFT JOIN {marketplace}.item AS item ON (ta.contract_address = item.collection_id AND item_asset.item_id = item.blockchain_id::text)
		LEFT JOIN {marketplace}.nft AS nft ON (ta.contract_address = nft.contract_address AND erc721_asset.token_id = nft.token_id::text)
	) AS assets_with_values ON t.id = assets_with_values.trade_id
	LEFT JOIN {squid_trades}.trade AS trade_status ON trade_status.signature = t.hashed_signature
	LEFT JOIN {squid_trades}.signature_index AS signer_signature_index ON LOWER(signer_signature_index.address) = LOWER(t.signer)
	LEFT JOIN (
		SELECT *
		FROM {squid_trades}.signature_index AS signature_index
		WHERE LOWER(signature_index.address) = ANY("
	))
	.bind(addresses)
	.text(
		"\
)
	) AS contract_signature_index ON t.network = contract_signature_index.network
	GROUP BY t.id, t.type, t.signer, t.created_at, t.checks, trade_status.status, trade_status.uses, contract_signature_index.index, signer_signature_index.index
)",
	)
}

/// Inline ranker candidates, one row per item id with its best similarity.
pub fn search_candidates(schemas: &Schemas, network: Option<Network>, search: &str) -> Fragment {
	Fragment::sql(format!(
		"\
{SEARCH_CANDIDATES} AS (
	SELECT id, MAX(word_similarity) AS word_similarity
	FROM "
	))
	.append(search::candidate_union(schemas, network, search))
	.text(
		"
	GROUP BY id
)",
	)
}
