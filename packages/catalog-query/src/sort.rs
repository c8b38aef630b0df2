use crate::{
	cte::SEARCH_CANDIDATES,
	filters::{CatalogFilters, CatalogSortBy, SortDirection},
	sql::Fragment,
};

/// Sort key and direction after defaults and the not-on-sale rule are applied.
pub fn effective_sort(filters: &CatalogFilters) -> (CatalogSortBy, SortDirection) {
	let sort_by = match filters.is_on_sale {
		// Not-for-sale browsing only sorts by newest.
		Some(false) => CatalogSortBy::Newest,
		_ => filters.sort_by.unwrap_or(CatalogSortBy::Newest),
	};

	(sort_by, filters.sort_direction.unwrap_or_default())
}

pub fn sort_key(sort_by: CatalogSortBy, direction: SortDirection) -> String {
	match sort_by {
		CatalogSortBy::Newest => "first_listed_at DESC NULLS LAST".to_string(),
		CatalogSortBy::MostExpensive => "max_price DESC".to_string(),
		CatalogSortBy::RecentlyListed =>
			"GREATEST(max_order_created_at, first_listed_at) DESC".to_string(),
		CatalogSortBy::RecentlySold => "sold_at DESC".to_string(),
		CatalogSortBy::Cheapest => "min_price ASC, first_listed_at DESC".to_string(),
		CatalogSortBy::Other => format!("first_listed_at {}", direction.as_sql()),
	}
}

/// Builds the ORDER BY clause, or `None` when nothing asks for an ordering.
///
/// Pre-ranked ids (a search term together with `ids`) always order the result, ahead of any
/// requested sort. Inline search ranks by similarity first.
pub fn order_by(filters: &CatalogFilters, inline_search: bool) -> Option<Fragment> {
	let requested = filters.sort_by.is_some() || filters.sort_direction.is_some();
	let ranked_ids = filters.search_term().is_some() && !filters.ids.is_empty();

	if !requested && !inline_search && !ranked_ids {
		return None;
	}

	let mut fragment = Fragment::sql("ORDER BY ");
	let mut keys = 0;

	if ranked_ids {
		fragment
			.push("array_position(")
			.push_bind(filters.ids.clone())
			.push("::text[], items.id::text)");

		keys += 1;
	}
	if inline_search {
		if keys > 0 {
			fragment.push(", ");
		}

		fragment.push(format!("{SEARCH_CANDIDATES}.word_similarity DESC"));

		keys += 1;
	}
	if requested || keys == 0 {
		if keys > 0 {
			fragment.push(", ");
		}

		let (sort_by, direction) = effective_sort(filters);

		fragment.push(sort_key(sort_by, direction));
	}

	Some(fragment)
}

/// `LIMIT`/`OFFSET` are only applied together.
pub fn pagination(limit: Option<u32>, offset: Option<u32>) -> Option<Fragment> {
	let (limit, offset) = (limit?, offset?);

	Some(Fragment::sql(format!("LIMIT {limit} OFFSET {offset}")))
}
