mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_endpoint_reports_db_and_teams() -> Result<()> {
    let t = common::spawn().await?;

    let (status, v) = t.send("GET", "/api/health", None, None).await?;
    assert_eq!(status, StatusCode::OK, "health endpoint did not return 200");

    let db_ok = v.get("db_ok").and_then(Value::as_bool).unwrap_or(false);
    assert!(db_ok, "expected db_ok: true, got: {}", v);
    assert_eq!(v.get("teams_ok").and_then(Value::as_bool), Some(true));

    Ok(())
}

#[tokio::test]
async fn health_flags_missing_team_even_with_other_rows() -> Result<()> {
    let t = common::spawn().await?;

    sqlx::query("UPDATE teams SET name = 'Marketing team' WHERE name = 'Support team'")
        .execute(&t.pool)
        .await?;
    sqlx::query("INSERT INTO teams (name) VALUES ('Legal team')").execute(&t.pool).await?;

    let (status, v) = t.send("GET", "/api/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v.get("db_ok").and_then(Value::as_bool), Some(true));
    assert_eq!(v.get("teams_ok").and_then(Value::as_bool), Some(false), "got: {}", v);

    Ok(())
}
