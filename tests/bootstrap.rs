mod common;

use anyhow::Result;

use crm_backend::authz::{teams, Team};
use crm_backend::db::bootstrap;

#[tokio::test]
async fn bootstrap_is_idempotent() -> Result<()> {
    let t = common::spawn().await?;

    // spawn already ran it once
    bootstrap::ensure_teams(&t.pool).await?;
    bootstrap::ensure_teams(&t.pool).await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM teams").fetch_one(&t.pool).await?;
    assert_eq!(count, 2);

    for team in Team::ALL {
        let stored = bootstrap::team_permissions(&t.pool, team).await?;
        let mut expected: Vec<String> = teams::permissions_for(team).iter().map(|c| c.to_string()).collect();
        expected.sort();
        assert_eq!(stored, expected);
    }

    Ok(())
}

#[tokio::test]
async fn bootstrap_keeps_memberships_and_drops_stale_permissions() -> Result<()> {
    let t = common::spawn().await?;
    let id = t.user("seller@example.com", &[Team::Selling]).await?;

    sqlx::query(
        "INSERT INTO team_permissions (team_id, codename) SELECT id, 'delete_client' FROM teams WHERE name = 'Selling team'",
    )
    .execute(&t.pool)
    .await?;

    bootstrap::ensure_teams(&t.pool).await?;

    let stored = bootstrap::team_permissions(&t.pool, Team::Selling).await?;
    assert!(!stored.iter().any(|c| c == "delete_client"));
    assert!(crm_backend::db::users::is_team_member(&t.pool, id, Team::Selling).await?);

    Ok(())
}
