use revu_config::Postgres;
use revu_storage::db::Db;
use revu_testkit::TestDatabase;

#[tokio::test]
#[ignore = "Requires external Postgres. Set REVU_PG_DSN to run."]
async fn db_connects_and_bootstraps() {
	let Some(base_dsn) = revu_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps; set REVU_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");
	// A second bootstrap must be a no-op.
	db.ensure_schema().await.expect("Failed to re-run schema bootstrap.");

	for table in ["brands", "products", "competitors", "reviews", "analysis_records"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "Missing table {table}.");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
