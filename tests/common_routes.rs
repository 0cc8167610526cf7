mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn health_and_version_need_no_database() {
    let db = ScriptedDatabase::new();
    let (status, body) = json_body(send(state(&db, settings_with_provider(None)), get("/health")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = json_body(send(state(&db, settings_with_provider(None)), get("/version")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "entity-gateway");
    assert_eq!(db.acquired(), 0);
}

#[tokio::test]
async fn ready_reports_database_state() {
    let db = ScriptedDatabase::new();
    let pg = || settings_with_provider(Some("postgres"));
    db.rows(vec![]);
    let (status, body) = json_body(send(state(&db, pg()), get("/ready")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "database": "ok", "provider": "ok"}));
    assert_eq!(db.executed()[0].sql, "SELECT 1");

    db.fail("57P01", "terminating connection due to administrator command");
    let (status, body) = json_body(send(state(&db, pg()), get("/ready")).await).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "unavailable");
    assert_eq!(db.acquired(), db.released());
}

#[tokio::test]
async fn ready_is_degraded_without_a_provider() {
    let db = ScriptedDatabase::new();
    db.rows(vec![]);
    let (status, body) = json_body(send(state(&db, settings_with_provider(None)), get("/ready")).await).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["provider"], "unconfigured");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn info_reports_identifier_style() {
    let db = ScriptedDatabase::new();
    let (_, body) = json_body(send(state(&db, settings_with_provider(None)), get("/info")).await).await;
    assert_eq!(body["identifier_style"], "verbatim");
}
