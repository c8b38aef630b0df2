use serde::Serialize;
use serde_json::Value;

/// One ranked search hit. Only `id` and its position feed the catalog query.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct SearchCandidate {
	pub id: String,
	pub word_similarity: f64,
	pub match_type: String,
	pub word: String,
}

/// A page of rows decoded as JSON objects plus the window total carried on each row.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Page {
	pub rows: Vec<Value>,
	pub total: i64,
}
