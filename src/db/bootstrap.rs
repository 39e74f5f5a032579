//! Idempotent creation of the fixed teams and their permission codenames.

use sqlx::SqlitePool;

use crate::authz::{teams, Team};
use crate::errors::AppResult;

/// Upserts both teams and syncs their permission codenames.
///
/// Missing rows are inserted, existing ones kept, stale codenames removed.
pub async fn ensure_teams(pool: &SqlitePool) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    for team in Team::ALL {
        sqlx::query("INSERT OR IGNORE INTO teams (name) VALUES (?)")
            .bind(team.name())
            .execute(&mut *tx)
            .await?;

        let team_id: i64 = sqlx::query_scalar("SELECT id FROM teams WHERE name = ?")
            .bind(team.name())
            .fetch_one(&mut *tx)
            .await?;

        let codenames = teams::permissions_for(team);
        for codename in codenames {
            sqlx::query("INSERT OR IGNORE INTO team_permissions (team_id, codename) VALUES (?, ?)")
                .bind(team_id)
                .bind(*codename)
                .execute(&mut *tx)
                .await?;
        }

        let existing: Vec<String> = sqlx::query_scalar("SELECT codename FROM team_permissions WHERE team_id = ?")
            .bind(team_id)
            .fetch_all(&mut *tx)
            .await?;

        for stale in existing.iter().filter(|c| !codenames.contains(&c.as_str())) {
            sqlx::query("DELETE FROM team_permissions WHERE team_id = ? AND codename = ?")
                .bind(team_id)
                .bind(stale.as_str())
                .execute(&mut *tx)
                .await?;
            tracing::info!(team = %team, codename = %stale, "removed stale team permission");
        }
    }

    tx.commit().await?;
    tracing::info!("teams bootstrapped");
    Ok(())
}

/// Permission codenames currently stored for a team
pub async fn team_permissions(pool: &SqlitePool, team: Team) -> AppResult<Vec<String>> {
    let codenames = sqlx::query_scalar(
        "SELECT tp.codename FROM team_permissions tp JOIN teams t ON t.id = tp.team_id WHERE t.name = ? ORDER BY tp.codename",
    )
    .bind(team.name())
    .fetch_all(pool)
    .await?;

    Ok(codenames)
}
