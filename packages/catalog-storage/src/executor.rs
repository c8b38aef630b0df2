//! Runs compiled statements against Postgres.
//!
//! Segments are replayed onto a [`QueryBuilder`], which numbers placeholders in the same text order
//! the compiler rendered them in.

use std::time::{Duration, Instant};

use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};

use catalog_query::{Segment, SqlParam, Statement};

use crate::{
	Error, Result,
	db::Db,
	models::{Page, SearchCandidate},
};

/// Window-count column of catalog statements.
pub const CATALOG_TOTAL_COLUMN: &str = "total_rows";
/// Window-count column of NFT statements.
pub const NFT_TOTAL_COLUMN: &str = "count";

/// Appends the statement's text and binds onto `builder`.
pub fn push_statement(builder: &mut QueryBuilder<'static, Postgres>, statement: &Statement) {
	for segment in statement.segments() {
		match segment {
			Segment::Sql(text) => {
				builder.push(text);
			},
			Segment::Param(SqlParam::Text(value)) => {
				builder.push_bind(value.clone());
			},
			Segment::Param(SqlParam::TextArray(values)) => {
				builder.push_bind(values.clone());
			},
			Segment::Param(SqlParam::Bool(value)) => {
				builder.push_bind(*value);
			},
			Segment::Param(SqlParam::Int(value)) => {
				builder.push_bind(*value);
			},
		}
	}
}

/// Wraps the statement so each row comes back as one JSON object, keeping the statement's order.
pub fn json_rows_builder(statement: &Statement) -> Result<QueryBuilder<'static, Postgres>> {
	ensure_not_empty(statement)?;

	let mut builder = QueryBuilder::new("SELECT to_jsonb(catalog_rows) AS row FROM (\n");

	push_statement(&mut builder, statement);
	builder.push("\n) AS catalog_rows");

	Ok(builder)
}

pub async fn fetch_json_rows(db: &Db, statement: &Statement) -> Result<Vec<Value>> {
	let started = Instant::now();
	let mut builder = json_rows_builder(statement)?;
	let rows: Vec<Value> = builder.build_query_scalar().fetch_all(&db.pool).await?;

	tracing::info!(
		rows = rows.len(),
		params = statement.params().len(),
		elapsed_ms = elapsed_ms(started.elapsed()),
		"Fetched rows."
	);

	Ok(rows)
}

/// Fetches a page and reads the total from `total_column` of its first row.
pub async fn fetch_page(db: &Db, statement: &Statement, total_column: &str) -> Result<Page> {
	let rows = fetch_json_rows(db, statement).await?;
	let total = page_total(&rows, total_column)?;

	Ok(Page { rows, total })
}

pub async fn fetch_search_candidates(
	db: &Db,
	statement: &Statement,
) -> Result<Vec<SearchCandidate>> {
	ensure_not_empty(statement)?;

	let started = Instant::now();
	let mut builder = QueryBuilder::new("");

	push_statement(&mut builder, statement);

	let candidates: Vec<SearchCandidate> = builder.build_query_as().fetch_all(&db.pool).await?;

	tracing::info!(
		candidates = candidates.len(),
		elapsed_ms = elapsed_ms(started.elapsed()),
		"Fetched search candidates."
	);

	Ok(candidates)
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub fn elapsed_ms(elapsed: Duration) -> u64 {
	u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Total rows across all pages; zero for an empty page.
pub fn page_total(rows: &[Value], total_column: &str) -> Result<i64> {
	let Some(first) = rows.first() else {
		return Ok(0);
	};

	match first.get(total_column) {
		Some(Value::Number(number)) => number.as_i64().ok_or_else(|| Error::Decode {
			column: total_column.to_string(),
			message: format!("{number} is not an integer."),
		}),
		Some(other) => Err(Error::Decode {
			column: total_column.to_string(),
			message: format!("Expected a number, got {other}."),
		}),
		None => Err(Error::Decode {
			column: total_column.to_string(),
			message: "Column is missing from the row.".to_string(),
		}),
	}
}

fn ensure_not_empty(statement: &Statement) -> Result<()> {
	if statement.sql().trim().is_empty() {
		return Err(Error::InvalidArgument("Statement has no SQL text.".to_string()));
	}

	Ok(())
}
