//! Shared fixtures for integration tests.

use nerium_contrib::config::BackendConfig;
use nerium_contrib::db::QueryParams;
use nerium_contrib::queryable::{Queryable, TakeiQueryable};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A SQLite database file in a temporary directory, registered as the
/// `pgsql` backend (query files named `*.pg.sql`).
pub struct Fixture {
    _dir: TempDir,
    pub db_path: PathBuf,
    pub queryable: TakeiQueryable,
}

impl Fixture {
    /// Creates an empty fixture database.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("fixture.db");
        std::fs::File::create(&db_path).unwrap();

        let config = BackendConfig::from_vars([("PGSQL_BACKEND", sqlalchemy_url(&db_path))]);
        let queryable = TakeiQueryable::new(Arc::new(config));

        Self {
            _dir: dir,
            db_path,
            queryable,
        }
    }

    /// Creates a fixture with `users` and `orders` tables populated.
    pub async fn seeded() -> Self {
        let fixture = Self::new();
        for sql in [
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, score REAL, avatar BLOB)",
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER, total REAL)",
            "INSERT INTO users (id, name, score, avatar) VALUES (1, 'Alice', 9.5, x'0102')",
            "INSERT INTO users (id, name, score, avatar) VALUES (2, 'Bob', NULL, NULL)",
            "INSERT INTO orders (id, user_id, total) VALUES (10, 1, 25.0)",
        ] {
            fixture.execute(sql).await;
        }
        fixture
    }

    /// Runs a statement through the queryable.
    pub async fn execute(&self, sql: &str) {
        self.queryable
            .results("setup.pg.sql", sql, &QueryParams::new())
            .await
            .unwrap();
    }

    /// sqlx URL for direct access to the fixture database.
    pub fn sqlx_url(&self) -> String {
        format!("sqlite://{}", self.db_path.display())
    }
}

/// SQLAlchemy-style URL for an absolute path (`sqlite:////abs/path`).
pub fn sqlalchemy_url(path: &Path) -> String {
    format!("sqlite:///{}", path.display())
}
