//! NFT listing statement.
//!
//! Prices here come from the NFT's own order or an open public NFT trade signed by its owner. The
//! catalog path prices items differently (store mints plus per-item order aggregates); the two are
//! kept separate on purpose.

use catalog_config::Schemas;
use serde::{Deserialize, Serialize};

use crate::{
	Error, Result,
	cte::{self, UNIFIED_TRADES},
	filters::{
		self, Creator, EmoteCategory, EmotePlayMode, GenderFilterOption, Network, NftCategory, Rarity,
		WearableCategory, is_set,
	},
	predicates::{SMART_WEARABLE_ITEM_TYPE, body_shapes_predicate},
	sql::{Fragment, Statement},
	validate,
};

pub const DEFAULT_FIRST: u32 = 100;

/// NFT filter specification. Same conventions as [`filters::CatalogFilters`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NftFilters {
	pub category: Option<NftCategory>,
	pub owner: Option<String>,
	pub token_id: Option<String>,
	pub item_id: Option<String>,
	pub network: Option<Network>,
	pub emote_has_sound: Option<bool>,
	pub emote_has_geometry: Option<bool>,
	pub min_estate_size: Option<i64>,
	pub max_estate_size: Option<i64>,
	pub wearable_category: Option<WearableCategory>,
	pub emote_category: Option<EmoteCategory>,
	pub is_wearable_head: Option<bool>,
	pub is_land: Option<bool>,
	pub is_wearable_accessory: Option<bool>,
	pub is_wearable_smart: Option<bool>,
	pub contract_addresses: Vec<String>,
	pub search: Option<String>,
	pub min_distance_to_plaza: Option<i64>,
	pub max_distance_to_plaza: Option<i64>,
	pub adjacent_to_road: Option<bool>,
	pub emote_play_mode: Vec<EmotePlayMode>,
	pub emote_genders: Vec<GenderFilterOption>,
	pub wearable_genders: Vec<GenderFilterOption>,
	pub creator: Option<Creator>,
	pub ids: Vec<String>,
	pub item_rarities: Vec<Rarity>,
	pub min_price: Option<String>,
	pub max_price: Option<String>,
	pub is_on_sale: Option<bool>,
	/// Page size; zero or absent means [`DEFAULT_FIRST`].
	pub first: Option<u32>,
	pub skip: Option<u32>,
}
impl NftFilters {
	pub fn by_token_id(contract_address: &str, token_id: &str, network: Network) -> Self {
		Self {
			token_id: Some(token_id.to_string()),
			network: Some(network),
			contract_addresses: vec![contract_address.to_string()],
			..Default::default()
		}
	}
}

type NftPredicateFn = fn(&NftFilters) -> Option<Fragment>;

const NFT_PREDICATES: [(&str, NftPredicateFn); 29] = [
	("category", category),
	("owner", owner),
	("tokenId", token_id),
	("itemId", item_id),
	("network", network),
	("emoteHasSound", emote_has_sound),
	("emoteHasGeometry", emote_has_geometry),
	("minEstateSize", min_estate_size),
	("maxEstateSize", max_estate_size),
	("emoteCategory", emote_category),
	("wearableCategory", wearable_category),
	("isWearableHead", is_wearable_head),
	("isLand", is_land),
	("isWearableAccessory", is_wearable_accessory),
	("isWearableSmart", is_wearable_smart),
	("contractAddresses", contract_addresses),
	("search", search),
	("minDistanceToPlaza", min_distance_to_plaza),
	("maxDistanceToPlaza", max_distance_to_plaza),
	("adjacentToRoad", adjacent_to_road),
	("emotePlayMode", emote_play_mode),
	("emoteGenders", emote_genders),
	("wearableGenders", wearable_genders),
	("creator", creator),
	("ids", ids),
	("itemRarities", item_rarities),
	("minPrice", min_price),
	("maxPrice", max_price),
	("isOnSale", is_on_sale),
];

pub fn nft_predicates(filters: &NftFilters) -> Vec<(&'static str, Fragment)> {
	NFT_PREDICATES
		.iter()
		.filter_map(|(dimension, build)| build(filters).map(|fragment| (*dimension, fragment)))
		.collect()
}

pub fn validate_nft_filters(filters: &NftFilters) -> Result<()> {
	if let Some(creator) = filters.creator.as_ref() {
		validate::require_non_blank("creator", creator.values())?;
	}

	validate::require_non_blank("contractAddresses", &filters.contract_addresses)?;
	validate::require_non_blank("ids", &filters.ids)?;
	validate::validate_price_range(filters.min_price.as_deref(), filters.max_price.as_deref())?;

	if let Some(token_id) = filters.token_id.as_deref()
		&& (token_id.is_empty() || !token_id.bytes().all(|b| b.is_ascii_digit()))
	{
		return Err(Error::invalid("tokenId", "tokenId must be a decimal integer."));
	}

	require_ordered("minEstateSize", filters.min_estate_size, filters.max_estate_size)?;
	require_ordered("minDistanceToPlaza", filters.min_distance_to_plaza, filters.max_distance_to_plaza)?;

	Ok(())
}

fn require_ordered(field: &'static str, min: Option<i64>, max: Option<i64>) -> Result<()> {
	if let (Some(min), Some(max)) = (min, max)
		&& min > max
	{
		return Err(Error::invalid(field, format!("{field} must not exceed its upper bound.")));
	}

	Ok(())
}

pub(crate) fn nfts_statement(
	schemas: &Schemas,
	marketplace_addresses: &[String],
	filters: &NftFilters,
) -> Result<Statement> {
	validate_nft_filters(filters)?;

	let mut fragment = cte::with_clause([cte::unified_trades(schemas, marketplace_addresses)])
		.unwrap_or_default();

	fragment.push("\n").push(projection(schemas));

	if let Some(predicates) =
		Fragment::join(nft_predicates(filters).into_iter().map(|(_, fragment)| fragment), "\n\tAND ")
	{
		fragment.push("\nWHERE ").push_fragment(predicates);
	}

	let first = filters.first.filter(|first| *first > 0).unwrap_or(DEFAULT_FIRST);
	let skip = filters.skip.unwrap_or(0);

	fragment.push(format!("\nLIMIT {first} OFFSET {skip}"));

	Ok(Statement::new(fragment))
}

fn projection(schemas: &Schemas) -> String {
	let marketplace = &schemas.marketplace;

	format!(
		"\
SELECT
	COUNT(*) OVER() AS count,
	nft.id,
	nft.contract_address,
	nft.token_id,
	nft.network,
	nft.created_at,
	nft.token_uri AS url,
	nft.updated_at,
	nft.sold_at,
	nft.urn,
	account.address AS owner,
	nft.image,
	nft.issued_id,
	nft.item_id,
	nft.category,
	COALESCE(wearable.rarity, emote.rarity) AS rarity,
	COALESCE(wearable.name, emote.name, land_data.\"name\", ens.subdomain) AS name,
	parcel.x,
	parcel.y,
	wearable.body_shapes,
	nft.item_type,
	emote.loop,
	emote.has_sound,
	emote.has_geometry,
	estate.estate_parcels,
	estate.size AS size,
	parcel.parcel_estate_token_id,
	parcel.parcel_estate_name,
	parcel.estate_id AS parcel_estate_id,
	COALESCE(wearable.description, emote.description, land_data.description) AS description,
	trades.id AS trade_id,
	trades.assets -> 'received' ->> 'amount' AS trade_price
FROM {marketplace}.nft AS nft
LEFT JOIN {marketplace}.metadata AS metadata ON nft.metadata_id = metadata.id
LEFT JOIN {marketplace}.wearable AS wearable ON metadata.wearable_id = wearable.id
LEFT JOIN {marketplace}.emote AS emote ON metadata.emote_id = emote.id
LEFT JOIN (
	SELECT par.*, par_est.token_id AS parcel_estate_token_id, est_data.name AS parcel_estate_name
	FROM {marketplace}.parcel AS par
	LEFT JOIN {marketplace}.estate AS par_est ON par.estate_id = par_est.id
	LEFT JOIN {marketplace}.data AS est_data ON par_est.data_id = est_data.id
) AS parcel ON nft.id = parcel.id
LEFT JOIN (
	SELECT est.id, est.token_id, est.size, est.data_id, array_agg(json_build_object('x', est_parcel.x, 'y', est_parcel.y)) AS estate_parcels
	FROM {marketplace}.estate AS est
	LEFT JOIN {marketplace}.parcel AS est_parcel ON est.id = est_parcel.estate_id
	GROUP BY est.id, est.token_id, est.size, est.data_id
) AS estate ON nft.id = estate.id
LEFT JOIN {marketplace}.data AS land_data ON (estate.data_id = land_data.id OR parcel.id = land_data.id)
LEFT JOIN {marketplace}.ens AS ens ON ens.id = nft.ens_id
LEFT JOIN {marketplace}.account AS account ON nft.owner_id = account.id
LEFT JOIN {marketplace}.item AS item ON item.id = nft.item_id
LEFT JOIN {UNIFIED_TRADES} AS trades ON trades.type = 'public_nft_order'
	AND trades.assets -> 'sent' ->> 'token_id' = nft.token_id::text
	AND trades.assets -> 'sent' ->> 'contract_address' = nft.contract_address
	AND trades.status = 'open'
	AND trades.signer = account.address"
	)
}

fn category(filters: &NftFilters) -> Option<Fragment> {
	let category = filters.category?;

	Some(Fragment::sql("LOWER(nft.category) = ").bind(category.as_str()))
}

fn owner(filters: &NftFilters) -> Option<Fragment> {
	let owner = filters.owner.as_deref()?;

	Some(Fragment::sql("LOWER(account.address) = LOWER(").bind(owner).text(")"))
}

fn token_id(filters: &NftFilters) -> Option<Fragment> {
	let token_id = filters.token_id.as_deref()?;

	Some(Fragment::sql("nft.token_id = ").bind(token_id).text("::numeric"))
}

fn item_id(filters: &NftFilters) -> Option<Fragment> {
	let item_id = filters.item_id.as_deref()?;

	Some(Fragment::sql("LOWER(nft.item_id) = LOWER(").bind(item_id).text(")"))
}

fn network(filters: &NftFilters) -> Option<Fragment> {
	let network = filters.network?;

	Some(Fragment::sql("nft.network = ANY(").bind(network.db_networks()).text(")"))
}

fn emote_has_sound(filters: &NftFilters) -> Option<Fragment> {
	is_set(filters.emote_has_sound).then(|| Fragment::sql("emote.has_sound = true"))
}

fn emote_has_geometry(filters: &NftFilters) -> Option<Fragment> {
	is_set(filters.emote_has_geometry).then(|| Fragment::sql("emote.has_geometry = true"))
}

fn min_estate_size(filters: &NftFilters) -> Option<Fragment> {
	let size = filters.min_estate_size?;

	Some(Fragment::sql("estate.size >= ").bind(size))
}

fn max_estate_size(filters: &NftFilters) -> Option<Fragment> {
	let size = filters.max_estate_size?;

	Some(Fragment::sql("estate.size <= ").bind(size))
}

fn emote_category(filters: &NftFilters) -> Option<Fragment> {
	let category = filters.emote_category?;

	Some(Fragment::sql("emote.category = ").bind(category.as_str()))
}

fn wearable_category(filters: &NftFilters) -> Option<Fragment> {
	let category = filters.wearable_category?;

	Some(Fragment::sql("wearable.category = ").bind(category.as_str()))
}

fn is_wearable_head(filters: &NftFilters) -> Option<Fragment> {
	is_set(filters.is_wearable_head).then(|| Fragment::sql("nft.search_is_wearable_head = true"))
}

fn is_land(filters: &NftFilters) -> Option<Fragment> {
	is_set(filters.is_land).then(|| Fragment::sql("nft.search_is_land = true"))
}

fn is_wearable_accessory(filters: &NftFilters) -> Option<Fragment> {
	is_set(filters.is_wearable_accessory)
		.then(|| Fragment::sql("nft.search_is_wearable_accessory = true"))
}

fn is_wearable_smart(filters: &NftFilters) -> Option<Fragment> {
	is_set(filters.is_wearable_smart)
		.then(|| Fragment::sql(format!("nft.item_type = '{SMART_WEARABLE_ITEM_TYPE}'")))
}

fn contract_addresses(filters: &NftFilters) -> Option<Fragment> {
	if filters.contract_addresses.is_empty() {
		return None;
	}

	Some(Fragment::sql("nft.contract_address = ANY(").bind(filters.contract_addresses.clone()).text(")"))
}

fn search(filters: &NftFilters) -> Option<Fragment> {
	let search = filters.search.as_deref().map(str::trim).filter(|search| !search.is_empty())?;

	Some(Fragment::sql("nft.search_text % ").bind(search))
}

fn min_distance_to_plaza(filters: &NftFilters) -> Option<Fragment> {
	let distance = filters.min_distance_to_plaza?;

	Some(Fragment::sql("nft.search_distance_to_plaza >= ").bind(distance))
}

fn max_distance_to_plaza(filters: &NftFilters) -> Option<Fragment> {
	let distance = filters.max_distance_to_plaza?;

	Some(Fragment::sql("nft.search_distance_to_plaza <= ").bind(distance))
}

fn adjacent_to_road(filters: &NftFilters) -> Option<Fragment> {
	is_set(filters.adjacent_to_road).then(|| Fragment::sql("nft.search_adjacent_to_road = true"))
}

fn emote_play_mode(filters: &NftFilters) -> Option<Fragment> {
	let is_loop = filters::single_play_mode(&filters.emote_play_mode)?;

	Some(Fragment::sql("nft.search_emote_loop = ").bind(is_loop))
}

fn emote_genders(filters: &NftFilters) -> Option<Fragment> {
	body_shapes_predicate("nft.search_emote_body_shapes", &filters.emote_genders)
}

fn wearable_genders(filters: &NftFilters) -> Option<Fragment> {
	body_shapes_predicate("nft.search_wearable_body_shapes", &filters.wearable_genders)
}

fn creator(filters: &NftFilters) -> Option<Fragment> {
	let creators = filters
		.creator
		.as_ref()?
		.values()
		.iter()
		.map(|creator| creator.to_lowercase())
		.collect::<Vec<_>>();

	if creators.is_empty() {
		return None;
	}

	Some(Fragment::sql("LOWER(item.creator) = ANY(").bind(creators).text(")"))
}

fn ids(filters: &NftFilters) -> Option<Fragment> {
	if filters.ids.is_empty() {
		return None;
	}

	Some(Fragment::sql("nft.id = ANY(").bind(filters.ids.clone()).text(")"))
}

fn item_rarities(filters: &NftFilters) -> Option<Fragment> {
	if filters.item_rarities.is_empty() {
		return None;
	}

	let rarities =
		filters.item_rarities.iter().map(|rarity| rarity.as_str().to_string()).collect::<Vec<_>>();

	Some(
		Fragment::sql("(nft.search_wearable_rarity = ANY(")
			.bind(rarities.clone())
			.text(") OR nft.search_emote_rarity = ANY(")
			.bind(rarities)
			.text("))"),
	)
}

fn min_price(filters: &NftFilters) -> Option<Fragment> {
	let min = filters.min_price.as_deref()?;

	Some(
		Fragment::sql("(nft.search_order_price >= ")
			.bind(min)
			.text("::numeric OR (trades.assets -> 'received' ->> 'amount')::numeric >= ")
			.bind(min)
			.text("::numeric)"),
	)
}

fn max_price(filters: &NftFilters) -> Option<Fragment> {
	let max = filters.max_price.as_deref()?;

	Some(
		Fragment::sql("(nft.search_order_price <= ")
			.bind(max)
			.text("::numeric OR (trades.assets -> 'received' ->> 'amount')::numeric <= ")
			.bind(max)
			.text("::numeric)"),
	)
}

fn is_on_sale(filters: &NftFilters) -> Option<Fragment> {
	is_set(filters.is_on_sale)
		.then(|| Fragment::sql("(trades.id IS NOT NULL OR nft.search_order_status = 'open')"))
}
