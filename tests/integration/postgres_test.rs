//! PostgreSQL integration tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable to run them.

use nerium_contrib::config::BackendConfig;
use nerium_contrib::db::QueryParams;
use nerium_contrib::queryable::{Queryable, TakeiQueryable};
use serde_json::json;
use std::sync::Arc;

/// Helper to create a queryable with DATABASE_URL as the `pgsql` backend.
fn get_test_queryable() -> Option<TakeiQueryable> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let config = BackendConfig::default().with_backend("pgsql", url);
    Some(TakeiQueryable::new(Arc::new(config)))
}

#[tokio::test]
async fn test_postgres_select_with_parameters() {
    let Some(queryable) = get_test_queryable() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let params = json!({"n": 41, "label": "answer"}).as_object().cloned().unwrap();
    let rows = queryable
        .results(
            "x.pg.sql",
            "SELECT (:n)::bigint + 1 AS value, (:label)::text AS label, :n::bigint AS again",
            &params,
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["value"], json!(42));
    assert_eq!(rows[0]["label"], json!("answer"));
    assert_eq!(rows[0]["again"], json!(41));
}

#[tokio::test]
async fn test_postgres_table_list_matches_catalog() {
    let Some(queryable) = get_test_queryable() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let tables = queryable.get_table_list("x.pg.sql").await.unwrap();
    let catalog = queryable
        .results(
            "x.pg.sql",
            "SELECT table_name::text AS name FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE' ORDER BY table_name",
            &QueryParams::new(),
        )
        .await
        .unwrap();

    let catalog: Vec<String> = catalog
        .iter()
        .filter_map(|row| row["name"].as_str().map(str::to_string))
        .collect();
    assert_eq!(tables, catalog);
}

#[tokio::test]
async fn test_postgres_numeric_and_uuid_columns() {
    let Some(queryable) = get_test_queryable() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let rows = queryable
        .results(
            "x.pg.sql",
            "SELECT SUM(x) AS total, 1.50::numeric AS price, \
             'a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11'::uuid AS id \
             FROM (VALUES (1::bigint), (2), (3)) AS t(x)",
            &QueryParams::new(),
        )
        .await
        .unwrap();

    assert_eq!(rows[0]["total"], json!(6));
    assert_eq!(rows[0]["price"], json!(1.5));
    assert_eq!(rows[0]["id"], json!("a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11"));
}
