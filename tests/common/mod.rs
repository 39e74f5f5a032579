#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

use crm_backend::app::{router, AppState};
use crm_backend::authz::Team;
use crm_backend::db::{self, bootstrap, users};
use crm_backend::jwt::JwtConfig;
use crm_backend::models::user::NewUser;

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    _dir: TempDir,
}

/// Fresh database with migrations applied and teams bootstrapped
pub async fn spawn() -> Result<TestApp> {
    let dir = tempfile::tempdir().context("failed to create tempdir")?;
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let pool = db::connect(&url).await?;
    db::run_migrations(&pool).await?;
    bootstrap::ensure_teams(&pool).await?;

    let state = AppState::new(pool.clone(), JwtConfig::new("test-secret", 1));
    Ok(TestApp {
        app: router(state),
        pool,
        _dir: dir,
    })
}

impl TestApp {
    pub async fn user(&self, email: &str, teams: &[Team]) -> Result<i64> {
        self.create_user(email, true, false, teams).await
    }

    pub async fn superuser(&self, email: &str) -> Result<i64> {
        self.create_user(email, true, true, &[]).await
    }

    pub async fn non_staff(&self, email: &str, teams: &[Team]) -> Result<i64> {
        self.create_user(email, false, false, teams).await
    }

    async fn create_user(&self, email: &str, staff: bool, superuser: bool, teams: &[Team]) -> Result<i64> {
        let user = users::create_user(
            &self.pool,
            NewUser {
                email: email.to_string(),
                password: PASSWORD.to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                mobile: Some("0612345678".to_string()),
                is_staff: staff,
                is_superuser: superuser,
                teams: teams.to_vec(),
                ..NewUser::default()
            },
        )
        .await?;
        Ok(user.id)
    }

    /// Logs in through the API and returns the bearer token
    pub async fn login(&self, email: &str) -> Result<String> {
        let (status, body) = self
            .send("POST", "/auth/login", None, Some(json!({ "email": email, "password": PASSWORD })))
            .await?;
        if status != StatusCode::OK {
            panic!("login failed: {} - {}", status, body);
        }
        Ok(body.get("token").and_then(Value::as_str).context("missing token")?.to_string())
    }

    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let resp = self.app.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = body::to_bytes(resp.into_body(), 10_485_760).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }

    /// Sends a request that must succeed with `expected`, returning the created/updated id
    pub async fn expect_id(&self, method: &str, uri: &str, token: &str, body: Value, expected: StatusCode) -> Result<i64> {
        let (status, value) = self.send(method, uri, Some(token), Some(body)).await?;
        if status != expected {
            panic!("{} {} failed: {} - {}", method, uri, status, value);
        }
        value.get("id").and_then(Value::as_i64).context("missing id")
    }

    pub async fn create_client(&self, token: &str, contact: i64) -> Result<i64> {
        self.expect_id(
            "POST",
            "/client/",
            token,
            json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@analytical.example",
                "phone": "0123456789",
                "company_name": "Analytical Engines",
                "contact": contact
            }),
            StatusCode::CREATED,
        )
        .await
    }

    pub async fn create_contract(&self, token: &str, client: i64) -> Result<i64> {
        self.expect_id(
            "POST",
            "/contract/",
            token,
            json!({ "client": client, "amount": 1500.0, "payment_due": "2030-01-31T00:00:00Z" }),
            StatusCode::CREATED,
        )
        .await
    }

    pub async fn create_event(&self, token: &str, contract: i64, support_contact: i64) -> Result<i64> {
        self.expect_id(
            "POST",
            "/event/",
            token,
            json!({
                "contract": contract,
                "support_contact": support_contact,
                "attendees": 40,
                "date": "2030-06-01T18:00:00Z",
                "note": "launch party"
            }),
            StatusCode::CREATED,
        )
        .await
    }
}
