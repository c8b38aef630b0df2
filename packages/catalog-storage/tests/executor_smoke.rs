use catalog_config::{Postgres, Schemas};
use catalog_query::{CatalogFilters, CatalogQueryCompiler};
use catalog_storage::{
	db::Db,
	executor::{self, CATALOG_TOTAL_COLUMN},
};
use catalog_testkit::TestDatabase;

const SCHEMA: &str = include_str!("fixtures/catalog_schema.sql");

fn compiler() -> CatalogQueryCompiler {
	CatalogQueryCompiler::new(
		Schemas::default(),
		vec!["0x0000000000000000000000000000000000000001".to_string()],
	)
}

async fn seeded_db(test_db: &TestDatabase) -> Db {
	test_db.apply_script(SCHEMA).await.expect("Failed to apply fixture schema.");

	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };

	Db::connect(&cfg).await.expect("Failed to connect to Postgres.")
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set CATALOG_PG_DSN to run."]
async fn catalog_page_returns_approved_items_with_total() {
	let Some(base_dsn) = catalog_testkit::env_dsn() else {
		eprintln!("Skipping catalog_page_returns_approved_items_with_total; set CATALOG_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = seeded_db(&test_db).await;
	let filters: CatalogFilters = serde_json::from_value(serde_json::json!({
		"category": "wearable",
		"isOnSale": true,
		"limit": 10,
		"offset": 0
	}))
	.expect("Expected valid filters.");
	let statement = compiler().compile_catalog(&filters).expect("Expected a catalog statement.");
	let page = executor::fetch_page(&db, &statement, CATALOG_TOTAL_COLUMN)
		.await
		.expect("Failed to fetch catalog page.");

	assert_eq!(page.total, 1);
	assert_eq!(page.rows.len(), 1);
	assert_eq!(page.rows[0]["id"], "item-1");
	assert_eq!(page.rows[0]["metadata"]["category"], "hat");

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set CATALOG_PG_DSN to run."]
async fn search_ranks_tagged_items() {
	let Some(base_dsn) = catalog_testkit::env_dsn() else {
		eprintln!("Skipping search_ranks_tagged_items; set CATALOG_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = seeded_db(&test_db).await;
	let filters = CatalogFilters { search: Some("dragon".to_string()), ..Default::default() };
	let statement = compiler().compile_search(&filters).expect("Expected a search statement.");
	let candidates = executor::fetch_search_candidates(&db, &statement)
		.await
		.expect("Failed to fetch search candidates.");

	assert_eq!(candidates.first().map(|candidate| candidate.id.as_str()), Some("item-1"));
	assert!(candidates.iter().any(|candidate| candidate.match_type == "tag"));

	db.pool.close().await;
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
