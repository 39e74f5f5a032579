mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use crm_backend::authz::Team;

#[tokio::test]
async fn me_reports_flags_and_teams() -> Result<()> {
    let t = common::spawn().await?;
    t.user("both@example.com", &[Team::Support, Team::Selling]).await?;
    let token = t.login("both@example.com").await?;

    let (status, body) = t.send("GET", "/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "both@example.com");
    assert_eq!(body["is_staff"], true);
    assert_eq!(body["teams"], json!(["selling", "support"]));

    Ok(())
}

#[tokio::test]
async fn wrong_password_and_inactive_accounts_are_rejected() -> Result<()> {
    let t = common::spawn().await?;
    let id = t.user("jane@example.com", &[Team::Selling]).await?;

    let (status, _) = t
        .send("POST", "/auth/login", None, Some(json!({ "email": "jane@example.com", "password": "nope-nope" })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = t.login("jane@example.com").await?;
    sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?").bind(id).execute(&t.pool).await?;

    let (status, _) = t.send("GET", "/client", Some(&token), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = t
        .send("POST", "/auth/login", None, Some(json!({ "email": "jane@example.com", "password": common::PASSWORD })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}
