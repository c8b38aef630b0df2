//! Catalog WHERE predicates, one builder per filter dimension.
//!
//! A builder returns `None` when its dimension is unconstrained. [`CATALOG_PREDICATES`] fixes the
//! order in which present predicates are ANDed after the collection-approved base clause.

use crate::{
	filters::{self, CatalogFilters, NftCategory, is_set},
	sql::Fragment,
};

pub(crate) const WEARABLE_ITEM_TYPES: [&str; 3] = ["wearable_v1", "wearable_v2", "smart_wearable_v1"];
pub(crate) const SMART_WEARABLE_ITEM_TYPE: &str = "smart_wearable_v1";
pub(crate) const EMOTE_ITEM_TYPE: &str = "emote_v1";

pub type PredicateFn = fn(&CatalogFilters) -> Option<Fragment>;

pub const BASE_PREDICATE: &str = "items.search_is_collection_approved = true";

pub const CATALOG_PREDICATES: [(&str, PredicateFn); 22] = [
	("category", category),
	("rarities", rarities),
	("creator", creator),
	("isSoldOut", is_sold_out),
	("isOnSale", is_on_sale),
	("isWearableHead", is_wearable_head),
	("isWearableAccessory", is_wearable_accessory),
	("wearableCategory", wearable_category),
	("wearableGenders", wearable_genders),
	("emoteCategory", emote_category),
	("emotePlayMode", emote_play_mode),
	("emoteGenders", emote_genders),
	("contractAddresses", contract_addresses),
	("minPrice", min_price),
	("maxPrice", max_price),
	("onlyListing", only_listing),
	("onlyMinting", only_minting),
	("ids", ids),
	("emoteHasSound", emote_has_sound),
	("emoteHasGeometry", emote_has_geometry),
	("urns", urns),
	("network", network),
];

/// Evaluates every builder in declaration order and keeps the present predicates.
pub fn catalog_predicates(filters: &CatalogFilters) -> Vec<(&'static str, Fragment)> {
	CATALOG_PREDICATES
		.iter()
		.filter_map(|(dimension, build)| build(filters).map(|fragment| (*dimension, fragment)))
		.collect()
}

pub(crate) fn wearable_item_types_sql() -> String {
	let quoted = WEARABLE_ITEM_TYPES.iter().map(|item_type| format!("'{item_type}'")).collect::<Vec<_>>();

	format!("({})", quoted.join(", "))
}

pub fn category(filters: &CatalogFilters) -> Option<Fragment> {
	match filters.category? {
		NftCategory::Wearable if is_set(filters.is_wearable_smart) =>
			Some(Fragment::sql(format!("items.item_type = '{SMART_WEARABLE_ITEM_TYPE}'"))),
		NftCategory::Wearable =>
			Some(Fragment::sql(format!("items.item_type IN {}", wearable_item_types_sql()))),
		NftCategory::Emote => Some(Fragment::sql(format!("items.item_type = '{EMOTE_ITEM_TYPE}'"))),
		_ => None,
	}
}

pub fn rarities(filters: &CatalogFilters) -> Option<Fragment> {
	if filters.rarities.is_empty() {
		return None;
	}

	let rarities = filters.rarities.iter().map(|rarity| rarity.as_str().to_string()).collect::<Vec<_>>();

	Some(Fragment::sql("items.rarity = ANY(").bind(rarities).text(")"))
}

pub fn creator(filters: &CatalogFilters) -> Option<Fragment> {
	match filters.creator.as_ref()?.values() {
		[] => None,
		[one] => Some(Fragment::sql("items.creator = ").bind(one.as_str())),
		many => Some(Fragment::sql("items.creator = ANY(").bind(many.to_vec()).text(")")),
	}
}

pub fn is_sold_out(filters: &CatalogFilters) -> Option<Fragment> {
	is_set(filters.is_sold_out).then(|| Fragment::sql("items.available = 0"))
}

pub fn is_on_sale(filters: &CatalogFilters) -> Option<Fragment> {
	let sql = match filters.is_on_sale? {
		true =>
			"((items.search_is_store_minter = true AND items.available > 0) OR nfts_with_orders.listings_count IS NOT NULL)",
		false =>
			"((items.search_is_store_minter = false OR items.available = 0) AND nfts_with_orders.listings_count IS NULL)",
	};

	Some(Fragment::sql(sql))
}

pub fn is_wearable_head(filters: &CatalogFilters) -> Option<Fragment> {
	is_set(filters.is_wearable_head).then(|| Fragment::sql("items.search_is_wearable_head = true"))
}

pub fn is_wearable_accessory(filters: &CatalogFilters) -> Option<Fragment> {
	is_set(filters.is_wearable_accessory)
		.then(|| Fragment::sql("items.search_is_wearable_accessory = true"))
}

pub fn wearable_category(filters: &CatalogFilters) -> Option<Fragment> {
	let category = filters.wearable_category?;

	Some(Fragment::sql("metadata_wearable.category = ").bind(category.as_str()))
}

pub fn wearable_genders(filters: &CatalogFilters) -> Option<Fragment> {
	body_shapes_predicate("items.search_wearable_body_shapes", &filters.wearable_genders)
}

pub fn emote_category(filters: &CatalogFilters) -> Option<Fragment> {
	let category = filters.emote_category?;

	Some(Fragment::sql("metadata_emote.category = ").bind(category.as_str()))
}

pub fn emote_play_mode(filters: &CatalogFilters) -> Option<Fragment> {
	let is_loop = filters::single_play_mode(&filters.emote_play_mode)?;

	Some(Fragment::sql("metadata_emote.loop = ").bind(is_loop))
}

pub fn emote_genders(filters: &CatalogFilters) -> Option<Fragment> {
	body_shapes_predicate("items.search_emote_body_shapes", &filters.emote_genders)
}

pub fn contract_addresses(filters: &CatalogFilters) -> Option<Fragment> {
	if filters.contract_addresses.is_empty() {
		return None;
	}

	Some(Fragment::sql("items.collection_id = ANY(").bind(filters.contract_addresses.clone()).text(")"))
}

/// Matches either regime: secondary-market orders at or above the bound, or a store mint at or
/// above the bound while stock remains.
pub fn min_price(filters: &CatalogFilters) -> Option<Fragment> {
	let min = filters.min_price.as_deref()?;

	Some(
		Fragment::sql("(nfts_with_orders.min_price >= ")
			.bind(min)
			.text("::numeric OR (items.price >= ")
			.bind(min)
			.text("::numeric AND items.available > 0 AND items.search_is_store_minter = true))"),
	)
}

pub fn max_price(filters: &CatalogFilters) -> Option<Fragment> {
	let max = filters.max_price.as_deref()?;

	Some(
		Fragment::sql("(nfts_with_orders.max_price <= ")
			.bind(max)
			.text("::numeric OR (items.price <= ")
			.bind(max)
			.text("::numeric AND items.available > 0 AND items.search_is_store_minter = true))"),
	)
}

pub fn only_listing(filters: &CatalogFilters) -> Option<Fragment> {
	is_set(filters.only_listing).then(|| {
		Fragment::sql(
			"(items.search_is_store_minter = false OR (items.search_is_store_minter = true AND items.available = 0)) AND nfts_with_orders.listings_count > 0",
		)
	})
}

pub fn only_minting(filters: &CatalogFilters) -> Option<Fragment> {
	is_set(filters.only_minting)
		.then(|| Fragment::sql("items.search_is_store_minter = true AND items.available > 0"))
}

pub fn ids(filters: &CatalogFilters) -> Option<Fragment> {
	if filters.ids.is_empty() {
		return None;
	}

	Some(Fragment::sql("items.id = ANY(").bind(filters.ids.clone()).text(")"))
}

pub fn emote_has_sound(filters: &CatalogFilters) -> Option<Fragment> {
	is_set(filters.emote_has_sound).then(|| Fragment::sql("items.search_emote_has_sound = true"))
}

pub fn emote_has_geometry(filters: &CatalogFilters) -> Option<Fragment> {
	is_set(filters.emote_has_geometry)
		.then(|| Fragment::sql("items.search_emote_has_geometry = true"))
}

pub fn urns(filters: &CatalogFilters) -> Option<Fragment> {
	if filters.urns.is_empty() {
		return None;
	}

	Some(Fragment::sql("items.urn = ANY(").bind(filters.urns.clone()).text(")"))
}

pub fn network(filters: &CatalogFilters) -> Option<Fragment> {
	let network = filters.network?;

	Some(Fragment::sql("items.network = ANY(").bind(network.db_networks()).text(")"))
}

pub(crate) fn body_shapes_predicate(
	column: &str,
	genders: &[filters::GenderFilterOption],
) -> Option<Fragment> {
	let shapes = filters::body_shapes(genders);

	if shapes.is_empty() {
		return None;
	}

	Some(Fragment::sql(format!("{column} @> (")).bind(shapes).text(")"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		filters::{Creator, EmotePlayMode, GenderFilterOption, Rarity, WearableCategory},
		sql::SqlParam,
	};

	fn only_params(fragment: &Fragment) -> Vec<SqlParam> {
		fragment.params().cloned().collect()
	}

	#[test]
	fn empty_filters_produce_no_predicates() {
		assert!(catalog_predicates(&CatalogFilters::default()).is_empty());
	}

	#[test]
	fn wearable_category_lists_every_wearable_type() {
		let filters =
			CatalogFilters { category: Some(NftCategory::Wearable), ..Default::default() };
		let fragment = category(&filters).expect("Expected a category predicate.");

		assert_eq!(
			fragment.render(),
			"items.item_type IN ('wearable_v1', 'wearable_v2', 'smart_wearable_v1')"
		);
		assert_eq!(fragment.param_count(), 0);
	}

	#[test]
	fn smart_wearable_narrows_the_category() {
		let filters = CatalogFilters {
			category: Some(NftCategory::Wearable),
			is_wearable_smart: Some(true),
			..Default::default()
		};

		assert_eq!(
			category(&filters).map(|fragment| fragment.render()),
			Some("items.item_type = 'smart_wearable_v1'".to_string())
		);
	}

	#[test]
	fn land_category_has_no_item_predicate() {
		let filters = CatalogFilters { category: Some(NftCategory::Land), ..Default::default() };

		assert!(category(&filters).is_none());
	}

	#[test]
	fn rarities_bind_a_text_array() {
		let filters =
			CatalogFilters { rarities: vec![Rarity::Rare, Rarity::Mythic], ..Default::default() };
		let fragment = rarities(&filters).expect("Expected a rarity predicate.");

		assert_eq!(fragment.render(), "items.rarity = ANY($1)");
		assert_eq!(
			only_params(&fragment),
			vec![SqlParam::TextArray(vec!["rare".to_string(), "mythic".to_string()])]
		);
	}

	#[test]
	fn single_creator_uses_equality() {
		let filters =
			CatalogFilters { creator: Some(Creator::One("0xabc".to_string())), ..Default::default() };
		let fragment = creator(&filters).expect("Expected a creator predicate.");

		assert_eq!(fragment.render(), "items.creator = $1");
		assert_eq!(only_params(&fragment), vec![SqlParam::Text("0xabc".to_string())]);
	}

	#[test]
	fn single_element_creator_list_uses_equality() {
		let filters = CatalogFilters {
			creator: Some(Creator::Many(vec!["0xabc".to_string()])),
			..Default::default()
		};

		assert_eq!(
			creator(&filters).map(|fragment| fragment.render()),
			Some("items.creator = $1".to_string())
		);
	}

	#[test]
	fn many_creators_use_set_membership() {
		let filters = CatalogFilters {
			creator: Some(Creator::Many(vec!["0xa".to_string(), "0xb".to_string()])),
			..Default::default()
		};
		let fragment = creator(&filters).expect("Expected a creator predicate.");

		assert_eq!(fragment.render(), "items.creator = ANY($1)");
		assert_eq!(
			only_params(&fragment),
			vec![SqlParam::TextArray(vec!["0xa".to_string(), "0xb".to_string()])]
		);
	}

	#[test]
	fn on_sale_is_tri_state() {
		let on_sale = CatalogFilters { is_on_sale: Some(true), ..Default::default() };
		let not_on_sale = CatalogFilters { is_on_sale: Some(false), ..Default::default() };

		assert!(
			is_on_sale(&on_sale)
				.expect("Expected an on-sale predicate.")
				.render()
				.contains("listings_count IS NOT NULL")
		);
		assert!(
			is_on_sale(&not_on_sale)
				.expect("Expected a not-on-sale predicate.")
				.render()
				.contains("listings_count IS NULL")
		);
		assert!(is_on_sale(&CatalogFilters::default()).is_none());
	}

	#[test]
	fn false_flags_do_not_constrain() {
		let filters = CatalogFilters {
			is_sold_out: Some(false),
			is_wearable_head: Some(false),
			emote_has_sound: Some(false),
			..Default::default()
		};

		assert!(catalog_predicates(&filters).is_empty());
	}

	#[test]
	fn female_gender_contains_only_base_female() {
		let filters = CatalogFilters {
			wearable_genders: vec![GenderFilterOption::Female],
			..Default::default()
		};
		let fragment = wearable_genders(&filters).expect("Expected a gender predicate.");

		assert_eq!(fragment.render(), "items.search_wearable_body_shapes @> ($1)");
		assert_eq!(
			only_params(&fragment),
			vec![SqlParam::TextArray(vec!["BaseFemale".to_string()])]
		);
	}

	#[test]
	fn both_genders_contain_both_body_shapes() {
		let filters = CatalogFilters {
			wearable_genders: vec![GenderFilterOption::Male, GenderFilterOption::Female],
			..Default::default()
		};
		let fragment = wearable_genders(&filters).expect("Expected a gender predicate.");

		assert_eq!(
			only_params(&fragment),
			vec![SqlParam::TextArray(vec!["BaseMale".to_string(), "BaseFemale".to_string()])]
		);
	}

	#[test]
	fn min_price_binds_the_bound_once_per_branch() {
		let filters = CatalogFilters { min_price: Some("100".to_string()), ..Default::default() };
		let fragment = min_price(&filters).expect("Expected a min price predicate.");

		assert_eq!(
			fragment.render(),
			"(nfts_with_orders.min_price >= $1::numeric OR (items.price >= $2::numeric AND items.available > 0 AND items.search_is_store_minter = true))"
		);
		assert_eq!(
			only_params(&fragment),
			vec![SqlParam::Text("100".to_string()), SqlParam::Text("100".to_string())]
		);
		assert!(max_price(&filters).is_none());
	}

	#[test]
	fn emote_play_mode_binds_loop_flag() {
		let filters =
			CatalogFilters { emote_play_mode: vec![EmotePlayMode::Once], ..Default::default() };
		let fragment = emote_play_mode(&filters).expect("Expected a play mode predicate.");

		assert_eq!(fragment.render(), "metadata_emote.loop = $1");
		assert_eq!(only_params(&fragment), vec![SqlParam::Bool(false)]);

		let both = CatalogFilters {
			emote_play_mode: vec![EmotePlayMode::Loop, EmotePlayMode::Once],
			..Default::default()
		};

		assert!(emote_play_mode(&both).is_none());
	}

	#[test]
	fn wearable_category_is_bound_not_inlined() {
		let filters = CatalogFilters {
			wearable_category: Some(WearableCategory::UpperBody),
			..Default::default()
		};
		let fragment = wearable_category(&filters).expect("Expected a wearable category predicate.");

		assert_eq!(fragment.render(), "metadata_wearable.category = $1");
		assert_eq!(only_params(&fragment), vec![SqlParam::Text("upper_body".to_string())]);
	}

	#[test]
	fn predicates_follow_declaration_order() {
		let filters = CatalogFilters {
			urns: vec!["urn:a".to_string()],
			category: Some(NftCategory::Emote),
			is_on_sale: Some(true),
			..Default::default()
		};
		let dimensions =
			catalog_predicates(&filters).into_iter().map(|(dimension, _)| dimension).collect::<Vec<_>>();

		assert_eq!(dimensions, vec!["category", "isOnSale", "urns"]);
	}
}
