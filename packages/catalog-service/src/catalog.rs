use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use catalog_query::CatalogFilters;
use catalog_storage::{
	executor::{self, CATALOG_TOTAL_COLUMN},
	models::SearchCandidate,
};

use crate::{CatalogService, Result};

#[derive(Clone, Debug, Default, Serialize)]
pub struct CatalogResponse {
	pub data: Vec<Value>,
	pub total: i64,
}

impl CatalogService {
	/// Lists catalog items.
	///
	/// A search term without explicit ids is ranked first; the ranked ids then restrict and order
	/// the catalog query. No candidates means an empty page without a catalog round-trip.
	pub async fn catalog(&self, filters: CatalogFilters) -> Result<CatalogResponse> {
		let mut filters = filters;

		if filters.search_term().is_some() && filters.ids.is_empty() {
			let statement = self.compiler.compile_search(&filters)?;
			let candidates = executor::fetch_search_candidates(&self.db, &statement).await?;

			if candidates.is_empty() {
				tracing::info!(
					search = filters.search_term().unwrap_or_default(),
					"Search returned no candidates."
				);

				return Ok(CatalogResponse::default());
			}

			filters = apply_ranked_ids(filters, &candidates);
		}

		let statement = self.compiler.compile_catalog(&filters)?;
		let page = executor::fetch_page(&self.db, &statement, CATALOG_TOTAL_COLUMN).await?;

		Ok(CatalogResponse { data: page.rows, total: page.total })
	}
}

/// Replaces `filters.ids` with candidate ids in rank order, keeping each id's best position.
pub fn apply_ranked_ids(filters: CatalogFilters, candidates: &[SearchCandidate]) -> CatalogFilters {
	let mut seen = HashSet::with_capacity(candidates.len());
	let ids = candidates
		.iter()
		.filter(|candidate| seen.insert(candidate.id.as_str()))
		.map(|candidate| candidate.id.clone())
		.collect();

	CatalogFilters { ids, ..filters }
}
