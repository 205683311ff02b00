//! Formatter integration tests.
//!
//! Formats rows fetched from a fixture database.

use super::common::Fixture;
use chrono::NaiveDate;
use nerium_contrib::db::QueryParams;
use nerium_contrib::formatter::{
    AffixFormatter, Clock, DefaultFormatter, FixedClock, RequestContext, ResultFormatter,
};
use nerium_contrib::queryable::Queryable;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn fixed_clock() -> Arc<dyn Clock> {
    let ts = NaiveDate::from_ymd_opt(2023, 12, 31)
        .unwrap()
        .and_hms_micro_opt(23, 59, 58, 250_000)
        .unwrap();
    Arc::new(FixedClock(ts))
}

#[tokio::test]
async fn test_affix_wraps_query_rows() {
    let fixture = Fixture::seeded().await;
    let rows = fixture
        .queryable
        .results("users.pg.sql", "SELECT id, name FROM users ORDER BY id", &QueryParams::new())
        .await
        .unwrap();

    let request = RequestContext::from_query_string("format=affix&limit=2");
    let envelope = AffixFormatter::new(rows.clone())
        .with_clock(fixed_clock())
        .format_results(&request);

    assert!(!envelope.error);
    assert_eq!(envelope.response, rows);
    assert_eq!(
        serde_json::to_value(&envelope).unwrap(),
        json!({
            "error": false,
            "response": [{"id": 1, "name": "Alice"}, {"id": 2, "name": "Bob"}],
            "metadata": {
                "executed": "2023-12-31T23:59:58.250000",
                "params": {"format": "affix", "limit": "2"}
            }
        })
    );
}

#[test]
fn test_affix_error_flag_is_always_false() {
    for rows in [Vec::new(), vec![json!({"x": null}).as_object().cloned().unwrap()]] {
        let envelope = AffixFormatter::new(rows).format_results(&RequestContext::default());
        assert!(!envelope.error);
    }
}

#[test]
fn test_default_formatter_matches_rows() {
    let rows = vec![json!({"a": 1, "b": "two"}).as_object().cloned().unwrap()];
    let output = DefaultFormatter::new(rows).format_results(&RequestContext::default());
    assert_eq!(json!(output), json!([{"a": 1, "b": "two"}]));
}
