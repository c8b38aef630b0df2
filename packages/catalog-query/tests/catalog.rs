use catalog_config::Schemas;
use catalog_query::{
	CatalogFilters, CatalogQueryCompiler, NftFilters, SqlParam, Statement,
	filters::{CatalogSortBy, Creator, GenderFilterOption, NftCategory, Rarity},
};

const MARKETPLACE: &str = "0x0000000000000000000000000000000000000001";

fn compiler() -> CatalogQueryCompiler {
	CatalogQueryCompiler::new(Schemas::default(), vec![MARKETPLACE.to_string()])
}

fn filters(raw: serde_json::Value) -> CatalogFilters {
	serde_json::from_value(raw).expect("Expected valid catalog filters.")
}

fn compile(raw: serde_json::Value) -> Statement {
	compiler().compile_catalog(&filters(raw)).expect("Expected a catalog statement.")
}

/// Placeholder numbers in the order they appear in the text.
fn placeholders(sql: &str) -> Vec<usize> {
	let mut out = Vec::new();
	let mut chars = sql.char_indices().peekable();

	while let Some((_, ch)) = chars.next() {
		if ch != '$' {
			continue;
		}

		let mut digits = String::new();

		while let Some((_, next)) = chars.peek() {
			if !next.is_ascii_digit() {
				break;
			}

			digits.push(*next);
			chars.next();
		}

		if let Ok(index) = digits.parse() {
			out.push(index);
		}
	}

	out
}

fn assert_placeholders_match(statement: &Statement) {
	let expected = (1..=statement.params().len()).collect::<Vec<_>>();

	assert_eq!(placeholders(statement.sql()), expected, "{}", statement.sql());
}

#[test]
fn no_search_means_no_search_cte_or_similarity_order() {
	let statement = compile(serde_json::json!({
		"category": "emote",
		"sortBy": "newest",
		"sortDirection": "desc"
	}));

	assert!(!statement.sql().contains("search_candidates"));
	assert!(!statement.sql().contains("builder_server_items"));
	assert!(!statement.sql().contains("similarity("));
	assert!(statement.sql().ends_with("ORDER BY first_listed_at DESC NULLS LAST"));
}

#[test]
fn placeholders_are_numbered_in_text_order() {
	let cases = [
		serde_json::json!({}),
		serde_json::json!({
			"category": "wearable",
			"rarities": ["rare", "epic"],
			"creator": ["0xa", "0xb"],
			"wearableCategory": "hat",
			"wearableGenders": ["unisex"],
			"emotePlayMode": ["loop"],
			"contractAddresses": ["0xc"],
			"minPrice": "100",
			"maxPrice": "2000",
			"urns": ["urn:decentraland:matic:collections-v2:0xc:0"],
			"network": "MATIC",
			"sortBy": "cheapest",
			"sortDirection": "asc",
			"limit": 24,
			"offset": 48
		}),
		serde_json::json!({ "search": "dragon", "limit": 5, "offset": 0 }),
		serde_json::json!({ "search": "dragon", "ids": ["2", "1"], "sortBy": "recently_sold" }),
		serde_json::json!({ "isOnSale": false, "emoteGenders": ["female"] }),
	];

	for raw in cases {
		assert_placeholders_match(&compile(raw));
	}
}

#[test]
fn compilation_is_idempotent() {
	let raw = serde_json::json!({
		"category": "wearable",
		"search": "utility hat",
		"minPrice": "1",
		"isOnSale": true,
		"sortBy": "most_expensive",
		"sortDirection": "desc"
	});

	assert_eq!(compile(raw.clone()), compile(raw));
}

#[test]
fn not_on_sale_overrides_the_requested_sort() {
	let statement = compile(serde_json::json!({
		"isOnSale": false,
		"sortBy": "cheapest",
		"sortDirection": "asc"
	}));

	assert!(statement.sql().ends_with("ORDER BY first_listed_at DESC NULLS LAST"));
	assert!(!statement.sql().contains("min_price ASC"));
}

#[test]
fn gender_filters_bind_body_shapes() {
	let female = compile(serde_json::json!({ "wearableGenders": ["female"] }));

	assert!(female.sql().contains("items.search_wearable_body_shapes @> ($2)"));
	assert_eq!(female.params()[1], SqlParam::TextArray(vec!["BaseFemale".to_string()]));

	let both = compile(serde_json::json!({ "wearableGenders": ["male", "female"] }));

	assert_eq!(
		both.params()[1],
		SqlParam::TextArray(vec!["BaseMale".to_string(), "BaseFemale".to_string()])
	);
}

#[test]
fn min_price_predicate_binds_the_value_twice() {
	let statement = compile(serde_json::json!({ "minPrice": "100" }));
	let sql = statement.sql();
	let predicate = sql.find("(nfts_with_orders.min_price >= $").expect("Expected a min price predicate.");
	let where_tail = &sql[predicate..];

	assert_eq!(placeholders(where_tail).len(), 2);

	for index in placeholders(where_tail) {
		assert_eq!(statement.params()[index - 1], SqlParam::from("100"));
	}
}

#[test]
fn utility_search_keeps_every_utility_item() {
	let utility = compiler()
		.compile_search(&filters(serde_json::json!({ "search": "wearables with utility" })))
		.expect("Expected a search statement.");
	let plain = compiler()
		.compile_search(&filters(serde_json::json!({ "search": "dragon" })))
		.expect("Expected a search statement.");

	assert!(utility.sql().contains("GREATEST(similarity(utility.utility, $2) * 0.5, 0.01)"));
	assert!(!utility.sql().contains("utility.utility %"));
	assert!(plain.sql().contains("similarity(utility.utility, $2) * 0.5 AS word_similarity"));
	assert!(plain.sql().contains("WHERE utility.utility % $3"));
	assert_placeholders_match(&utility);
	assert_placeholders_match(&plain);
}

#[test]
fn ranked_ids_lead_the_order() {
	let statement = compile(serde_json::json!({
		"search": "dragon",
		"ids": ["9", "3"],
		"sortBy": "cheapest",
		"sortDirection": "asc"
	}));
	let sql = statement.sql();
	let order = sql.find("ORDER BY array_position(").expect("Expected id ordering.");
	let sort = sql.find("min_price ASC").expect("Expected the requested sort.");

	assert!(order < sort);
	assert!(!sql.contains("search_candidates"));
	assert_eq!(
		statement.params().last(),
		Some(&SqlParam::TextArray(vec!["9".to_string(), "3".to_string()]))
	);
}

#[test]
fn ranked_ids_order_the_page_without_a_requested_sort() {
	let statement = compile(serde_json::json!({
		"search": "dragon",
		"ids": ["9", "3", "5"],
		"limit": 10,
		"offset": 0
	}));
	let sql = statement.sql();

	assert!(sql.contains("ORDER BY array_position("));
	assert!(sql.ends_with("::text[], items.id::text)\nLIMIT 10 OFFSET 0"));
	assert!(!sql.contains("first_listed_at DESC NULLS LAST"));
	assert_eq!(
		statement.params().last(),
		Some(&SqlParam::TextArray(vec!["9".to_string(), "3".to_string(), "5".to_string()]))
	);
	assert_placeholders_match(&statement);
}

#[test]
fn inline_search_joins_candidates_and_ranks_by_similarity() {
	let statement = compile(serde_json::json!({ "search": "dragon", "network": "ETHEREUM" }));
	let sql = statement.sql();

	assert!(sql.starts_with("WITH unified_trades AS ("));
	assert!(sql.contains(",\nlatest_metadata AS ("));
	assert!(sql.contains(",\nbuilder_server_items AS ("));
	assert!(sql.contains(",\nsearch_candidates AS ("));
	assert!(sql.contains("latest_metadata.item_id = items.metadata"));
	assert!(sql.contains("JOIN search_candidates ON search_candidates.id = items.id::text"));
	assert!(sql.ends_with("ORDER BY search_candidates.word_similarity DESC"));
	assert_placeholders_match(&statement);
}

#[test]
fn catalog_end_to_end() {
	let statement = compile(serde_json::json!({
		"category": "wearable",
		"rarities": ["rare"],
		"isOnSale": true,
		"limit": 10,
		"offset": 0
	}));
	let sql = statement.sql();

	assert!(sql.starts_with("WITH unified_trades AS ("));
	assert!(sql.ends_with(
		"\
WHERE items.search_is_collection_approved = true
	AND items.item_type IN ('wearable_v1', 'wearable_v2', 'smart_wearable_v1')
	AND items.rarity = ANY($2)
	AND ((items.search_is_store_minter = true AND items.available > 0) OR nfts_with_orders.listings_count IS NOT NULL)
LIMIT 10 OFFSET 0"
	));
	assert!(!sql.contains("ORDER BY"));
	assert!(!sql.contains("owners_count"));
	assert_eq!(
		statement.params(),
		&[
			SqlParam::TextArray(vec![MARKETPLACE.to_string()]),
			SqlParam::TextArray(vec!["rare".to_string()]),
		]
	);
}

#[test]
fn user_values_never_reach_the_text() {
	let hostile = "x'); DROP TABLE items; --";
	let statement = compiler()
		.compile_catalog(&CatalogFilters {
			creator: Some(Creator::One(hostile.to_string())),
			search: Some(hostile.to_string()),
			ids: vec![hostile.to_string()],
			..Default::default()
		})
		.expect("Expected a catalog statement.");

	assert!(!statement.sql().contains("DROP TABLE"));
	assert!(statement.params().contains(&SqlParam::from(hostile)));
}

#[test]
fn struct_filters_match_json_filters() {
	let typed = CatalogFilters {
		category: Some(NftCategory::Wearable),
		rarities: vec![Rarity::Rare],
		wearable_genders: vec![GenderFilterOption::Female],
		sort_by: Some(CatalogSortBy::Newest),
		..Default::default()
	};
	let from_json = filters(serde_json::json!({
		"category": "wearable",
		"rarities": ["rare"],
		"wearableGenders": ["female"],
		"sortBy": "newest"
	}));

	assert_eq!(typed, from_json);
}

#[test]
fn nft_statement_numbers_placeholders_in_order() {
	let nft_filters: NftFilters = serde_json::from_value(serde_json::json!({
		"category": "wearable",
		"owner": "0xOwner",
		"itemRarities": ["mythic"],
		"minPrice": "5",
		"maxPrice": "50",
		"wearableGenders": ["male"],
		"isOnSale": true,
		"first": 10,
		"skip": 30
	}))
	.expect("Expected valid NFT filters.");
	let statement = compiler().compile_nfts(&nft_filters).expect("Expected an NFT statement.");

	assert_placeholders_match(&statement);
	assert!(statement.sql().ends_with("LIMIT 10 OFFSET 30"));
}
