//! Free-text search ranking.
//!
//! Candidates come from two sources unioned with set semantics: items whose curated utility text
//! resembles the term, and items whose name words or curated tags resemble it. Both branches expose
//! `id, match_type, word, word_similarity, first_listed_at` so the union stays column-compatible.

use catalog_config::Schemas;

use crate::{
	Result,
	cte::{self, BUILDER_SERVER_ITEMS, LATEST_METADATA},
	error::Error,
	filters::{CatalogFilters, Network},
	predicates::{EMOTE_ITEM_TYPE, wearable_item_types_sql},
	sql::{Fragment, Statement},
	validate,
};

/// Utility similarity is halved so it does not overshadow name and tag matches.
const UTILITY_WEIGHT: &str = "0.5";
/// Score floor that keeps every utility-tagged item visible when the user searches for utility.
const UTILITY_FLOOR: &str = "0.01";

pub(crate) fn mentions_utility(search: &str) -> bool {
	search.to_lowercase().contains("utility")
}

pub fn utility_branch(schemas: &Schemas, search: &str) -> Fragment {
	let builder_server = &schemas.builder_server;
	let score = Fragment::sql("similarity(utility.utility, ")
		.bind(search)
		.text(format!(") * {UTILITY_WEIGHT}"));
	let mut fragment = Fragment::sql("SELECT utility.item_id::text AS id, 'utility' AS match_type, '' AS word, ");

	if mentions_utility(search) {
		fragment.push("GREATEST(").push_fragment(score).push(format!(", {UTILITY_FLOOR})"));
	} else {
		fragment.push_fragment(score);
	}

	fragment.push(format!(
		" AS word_similarity, items.first_listed_at
FROM {builder_server}.mv_builder_server_items_utility AS utility
LEFT JOIN {marketplace}.item AS items ON items.id = utility.item_id",
		marketplace = schemas.marketplace,
	));

	if !mentions_utility(search) {
		fragment.push("\nWHERE utility.utility % ").push_bind(search);
	}

	fragment
}

pub fn tag_or_name_branch(schemas: &Schemas, network: Option<Network>, search: &str) -> Fragment {
	let marketplace = &schemas.marketplace;

	Fragment::sql(format!(
		"\
SELECT
	items.id::text AS id,
	CASE WHEN {BUILDER_SERVER_ITEMS}.item_id IS NULL THEN 'name' ELSE 'tag' END AS match_type,
	word.text AS word,
	similarity(word.text, "
	))
	.bind(search)
	.text(format!(
		"\
) AS word_similarity,
	items.first_listed_at
FROM {marketplace}.item AS items
"
	))
	.append(cte::latest_metadata_join(network))
	.text(format!(
		"
LEFT JOIN (
	SELECT metadata.id, COALESCE(wearable.name, emote.name) AS name
	FROM {marketplace}.metadata AS metadata
	LEFT JOIN {marketplace}.wearable AS wearable ON metadata.wearable_id = wearable.id AND metadata.item_type IN {wearable_types}
	LEFT JOIN {marketplace}.emote AS emote ON metadata.emote_id = emote.id AND metadata.item_type = '{EMOTE_ITEM_TYPE}'
) AS metadata ON metadata.id = {LATEST_METADATA}.latest_metadata_id
JOIN LATERAL (
	SELECT unnest(string_to_array(metadata.name, ' ')) AS text
	UNION
	SELECT tag AS text FROM {BUILDER_SERVER_ITEMS} WHERE {BUILDER_SERVER_ITEMS}.item_id = items.id::text
) AS word ON TRUE
LEFT JOIN {BUILDER_SERVER_ITEMS} ON {BUILDER_SERVER_ITEMS}.item_id = items.id::text
WHERE word.text % ",
		wearable_types = wearable_item_types_sql(),
	))
	.bind(search)
}

/// `((utility) UNION (tag_or_name)) AS items_found`. Needs the latest-metadata and curated-tags
/// CTEs in scope.
pub fn candidate_union(schemas: &Schemas, network: Option<Network>, search: &str) -> Fragment {
	Fragment::sql("((")
		.append(utility_branch(schemas, search))
		.text(") UNION (")
		.append(tag_or_name_branch(schemas, network, search))
		.text(")) AS items_found")
}

/// CTEs the candidate union reads from.
pub fn search_ctes(schemas: &Schemas, search: &str) -> Vec<Fragment> {
	vec![cte::latest_metadata(schemas), cte::builder_server_items(schemas, search)]
}

/// Builds the standalone ranking statement whose rows feed the catalog query as ordered ids.
pub fn ranked_statement(schemas: &Schemas, filters: &CatalogFilters) -> Result<Statement> {
	let Some(search) = filters.search_term() else {
		return Err(Error::invalid("search", "A search term is required to rank candidates."));
	};

	validate::require_non_blank("ids", &filters.ids)?;

	let mut fragment = cte::with_clause(search_ctes(schemas, search)).unwrap_or_default();

	fragment
		.push("\nSELECT id, word_similarity::float8 AS word_similarity, match_type, word\nFROM ")
		.push_fragment(candidate_union(schemas, filters.network, search))
		.push("\nORDER BY ");

	if !filters.ids.is_empty() {
		fragment.push("array_position(").push_bind(filters.ids.clone()).push("::text[], id), ");
	}

	fragment.push("word_similarity DESC, first_listed_at DESC NULLS LAST");

	Ok(Statement::new(fragment))
}
