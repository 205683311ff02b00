//! Queryable adapter integration tests.
//!
//! Runs queries through `TakeiQueryable` against SQLite fixture databases.

use super::common::Fixture;
use nerium_contrib::config::BackendConfig;
use nerium_contrib::db::QueryParams;
use nerium_contrib::queryable::{load_query, Queryable, TakeiQueryable};
use nerium_contrib::NeriumError;
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlx::{Connection, SqliteConnection};
use std::collections::BTreeSet;
use std::sync::Arc;

#[tokio::test]
async fn test_select_literal_returns_declared_columns() {
    let fixture = Fixture::new();

    let rows = fixture
        .queryable
        .results("x.pg.sql", "SELECT 1 AS one, 'two' AS two", &QueryParams::new())
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    let columns: Vec<_> = rows[0].keys().cloned().collect();
    assert_eq!(columns, vec!["one", "two"]);
    assert_eq!(rows[0]["one"], json!(1));
    assert_eq!(rows[0]["two"], json!("two"));
}

#[tokio::test]
async fn test_select_from_table_materializes_all_rows() {
    let fixture = Fixture::seeded().await;

    let rows = fixture
        .queryable
        .results(
            "reports/users.pg.sql",
            "SELECT id, name, score, avatar FROM users ORDER BY id",
            &QueryParams::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        json!(rows),
        json!([
            {"id": 1, "name": "Alice", "score": 9.5, "avatar": [1, 2]},
            {"id": 2, "name": "Bob", "score": null, "avatar": null}
        ])
    );
}

#[tokio::test]
async fn test_named_parameters_are_bound() {
    let fixture = Fixture::seeded().await;
    let params = json!({"min_id": 2}).as_object().cloned().unwrap();

    let rows = fixture
        .queryable
        .results(
            "users.pg.sql",
            "SELECT name FROM users WHERE id >= :min_id",
            &params,
        )
        .await
        .unwrap();

    assert_eq!(json!(rows), json!([{"name": "Bob"}]));
}

#[tokio::test]
async fn test_missing_parameter_is_query_error() {
    let fixture = Fixture::seeded().await;

    let err = fixture
        .queryable
        .results("users.pg.sql", "SELECT * FROM users WHERE id = :id", &QueryParams::new())
        .await
        .unwrap_err();

    assert!(matches!(err, NeriumError::Query(_)));
}

#[tokio::test]
async fn test_malformed_query_propagates_database_error() {
    let fixture = Fixture::new();

    let err = fixture
        .queryable
        .results("x.pg.sql", "SELECT * FROM missing_table", &QueryParams::new())
        .await
        .unwrap_err();

    assert!(matches!(err, NeriumError::Database(_)));
}

#[tokio::test]
async fn test_unconfigured_backend_fails_on_connect() {
    let queryable = TakeiQueryable::new(Arc::new(BackendConfig::default()));

    assert_eq!(queryable.backend_lookup("pgsql"), "NO BACKEND");

    let err = queryable
        .results("x.pg.sql", "SELECT 1", &QueryParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, NeriumError::Connection(_)));
}

#[tokio::test]
async fn test_missing_database_file_propagates_database_error() {
    let config = BackendConfig::default().with_backend("pgsql", "sqlite:////nonexistent/nerium/test.db");
    let queryable = TakeiQueryable::new(Arc::new(config));

    let err = queryable
        .results("x.pg.sql", "SELECT 1", &QueryParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, NeriumError::Database(_)));
}

#[tokio::test]
async fn test_table_list_matches_catalog() {
    let fixture = Fixture::seeded().await;

    let tables = fixture.queryable.get_table_list("any.pg.sql").await.unwrap();

    let mut conn = SqliteConnection::connect(&fixture.sqlx_url()).await.unwrap();
    let catalog: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )
    .fetch_all(&mut conn)
    .await
    .unwrap();
    conn.close().await.unwrap();

    assert_eq!(
        tables.iter().cloned().collect::<BTreeSet<_>>(),
        catalog.into_iter().collect::<BTreeSet<_>>()
    );
    assert_eq!(tables, vec!["orders", "users"]);
}

#[tokio::test]
async fn test_backend_code_selects_database() {
    let fixture = Fixture::seeded().await;
    let other = Fixture::new();
    other.execute("CREATE TABLE only_here (id INTEGER)").await;

    let config = BackendConfig::from_vars([
        ("PGSQL_BACKEND", super::common::sqlalchemy_url(&fixture.db_path)),
        ("LITESQL_BACKEND", super::common::sqlalchemy_url(&other.db_path)),
    ]);
    let queryable = TakeiQueryable::new(Arc::new(config));

    assert_eq!(
        queryable.get_table_list("a/b.pg.sql").await.unwrap(),
        vec!["orders", "users"]
    );
    assert_eq!(
        queryable.get_table_list("a/b.lite.sql").await.unwrap(),
        vec!["only_here"]
    );
}

#[tokio::test]
async fn test_query_file_on_disk() {
    let fixture = Fixture::seeded().await;
    let dir = tempfile::tempdir().unwrap();
    let query_file = dir.path().join("totals.pg.sql");
    std::fs::write(&query_file, "SELECT user_id, total FROM orders WHERE user_id = :user").unwrap();

    let sql = load_query(&query_file).unwrap();
    let params = json!({"user": 1}).as_object().cloned().unwrap();
    let rows = fixture
        .queryable
        .results(&query_file.to_string_lossy(), &sql, &params)
        .await
        .unwrap();

    assert_eq!(json!(rows), json!([{"user_id": 1, "total": 25.0}]));
}

#[tokio::test]
async fn test_missing_database_file_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested-missing.db");
    let config = BackendConfig::default().with_backend("pgsql", super::common::sqlalchemy_url(&db_path));
    let queryable = TakeiQueryable::new(Arc::new(config));

    let rows = queryable
        .results("x.pg.sql", "SELECT 1 AS one", &QueryParams::new())
        .await
        .unwrap();

    assert_eq!(rows, vec![json!({"one": 1}).as_object().cloned().unwrap()]);
    assert!(db_path.exists());
}
