use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::authz::{Identity, Team, UserId};
use crate::errors::{AppError, AppResult};
use crate::models::user::{DbUser, NewUser, User};
use crate::utils::{hash_password, normalize_email, utc_now};
use crate::validation;

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, phone, mobile, is_active, is_staff, is_superuser, created_at, updated_at";

pub async fn fetch_user(pool: &SqlitePool, user_id: UserId) -> AppResult<Option<DbUser>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    let user = sqlx::query_as::<_, DbUser>(&sql).bind(user_id).fetch_optional(pool).await?;
    Ok(user)
}

pub async fn fetch_user_by_email(pool: &SqlitePool, email: &str) -> AppResult<Option<DbUser>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
    let user = sqlx::query_as::<_, DbUser>(&sql)
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Teams the user belongs to
pub async fn team_memberships(pool: &SqlitePool, user_id: UserId) -> AppResult<HashSet<Team>> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT t.name FROM user_teams ut JOIN teams t ON t.id = ut.team_id WHERE ut.user_id = ?",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(names.iter().filter_map(|name| Team::from_name(name)).collect())
}

pub async fn is_team_member(pool: &SqlitePool, user_id: UserId, team: Team) -> AppResult<bool> {
    Ok(team_memberships(pool, user_id).await?.contains(&team))
}

/// Loads the identity of an active user; `None` when missing or inactive
pub async fn load_identity(pool: &SqlitePool, user_id: UserId) -> AppResult<Option<Identity>> {
    let user = match fetch_user(pool, user_id).await? {
        Some(user) if user.is_active => user,
        _ => return Ok(None),
    };

    let teams = team_memberships(pool, user.id).await?;

    Ok(Some(Identity {
        id: user.id,
        is_superuser: user.is_superuser,
        is_staff: user.is_staff,
        teams,
    }))
}

pub async fn to_user(pool: &SqlitePool, db_user: DbUser) -> AppResult<User> {
    let teams = Identity::new(db_user.id)
        .with_teams(team_memberships(pool, db_user.id).await?)
        .sorted_teams();
    Ok(db_user.into_user(teams))
}

/// Creates a team member. Superusers are always staff.
pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> AppResult<User> {
    let email = normalize_email(&new_user.email);
    if !validation::is_valid_email(&email) {
        return Err(AppError::validation("email must be a valid address"));
    }
    if !new_user.is_superuser {
        validation::phone_or_mobile(new_user.phone.as_deref(), new_user.mobile.as_deref())?;
    }

    if fetch_user_by_email(pool, &email).await?.is_some() {
        return Err(AppError::conflict("email already in use"));
    }

    let password_hash = hash_password(&new_user.password)?;
    let now = utc_now();
    let is_staff = new_user.is_staff || new_user.is_superuser;

    let user_id: UserId = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, first_name, last_name, phone, mobile, is_active, is_staff, is_superuser, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&email)
    .bind(password_hash)
    .bind(&new_user.first_name)
    .bind(&new_user.last_name)
    .bind(&new_user.phone)
    .bind(&new_user.mobile)
    .bind(is_staff)
    .bind(new_user.is_superuser)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    for team in &new_user.teams {
        assign_team(pool, user_id, *team).await?;
    }

    tracing::info!(user_id, email = %email, is_staff, is_superuser = new_user.is_superuser, "user created");

    let db_user = fetch_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::internal("created user vanished"))?;
    to_user(pool, db_user).await
}

async fn team_id(pool: &SqlitePool, team: Team) -> AppResult<i64> {
    sqlx::query_scalar("SELECT id FROM teams WHERE name = ?")
        .bind(team.name())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::configuration(format!("team '{}' missing; run the team bootstrap first", team)))
}

pub async fn assign_team(pool: &SqlitePool, user_id: UserId, team: Team) -> AppResult<()> {
    let team_id = team_id(pool, team).await?;

    sqlx::query("INSERT OR IGNORE INTO user_teams (user_id, team_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(team_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn remove_team(pool: &SqlitePool, user_id: UserId, team: Team) -> AppResult<()> {
    let team_id = team_id(pool, team).await?;

    sqlx::query("DELETE FROM user_teams WHERE user_id = ? AND team_id = ?")
        .bind(user_id)
        .bind(team_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn list_users(pool: &SqlitePool) -> AppResult<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY email");
    let rows = sqlx::query_as::<_, DbUser>(&sql).fetch_all(pool).await?;

    let mut users = Vec::with_capacity(rows.len());
    for row in rows {
        users.push(to_user(pool, row).await?);
    }
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{bootstrap, connect, run_migrations};

    async fn pool() -> (tempfile::TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("users.db").display());
        let pool = connect(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        bootstrap::ensure_teams(&pool).await.unwrap();
        (dir, pool)
    }

    fn seller(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password: "password123".to_string(),
            phone: Some("0123456789".to_string()),
            is_staff: true,
            teams: vec![Team::Selling],
            ..NewUser::default()
        }
    }

    #[tokio::test]
    async fn identity_carries_flags_and_teams() {
        let (_dir, pool) = pool().await;
        let user = create_user(&pool, seller("seller@example.com")).await.unwrap();
        assign_team(&pool, user.id, Team::Support).await.unwrap();

        let identity = load_identity(&pool, user.id).await.unwrap().unwrap();
        assert!(identity.is_staff());
        assert!(!identity.is_superuser());
        assert!(identity.in_team(Team::Selling));
        assert!(identity.in_team(Team::Support));

        remove_team(&pool, user.id, Team::Support).await.unwrap();
        assert!(!is_team_member(&pool, user.id, Team::Support).await.unwrap());
    }

    #[tokio::test]
    async fn user_teams_listed_in_stable_order() {
        let (_dir, pool) = pool().await;
        let mut support_first = seller("both@example.com");
        support_first.teams = vec![Team::Support, Team::Selling];
        let user = create_user(&pool, support_first).await.unwrap();
        assert_eq!(user.teams, vec![Team::Selling, Team::Support]);

        let db_user = fetch_user(&pool, user.id).await.unwrap().unwrap();
        let listed = to_user(&pool, db_user).await.unwrap();
        assert_eq!(listed.teams, vec![Team::Selling, Team::Support]);
    }

    #[tokio::test]
    async fn inactive_user_has_no_identity() {
        let (_dir, pool) = pool().await;
        let user = create_user(&pool, seller("gone@example.com")).await.unwrap();
        sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(user.id)
            .execute(&pool)
            .await
            .unwrap();

        assert!(load_identity(&pool, user.id).await.unwrap().is_none());
        assert!(load_identity(&pool, 9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let (_dir, pool) = pool().await;
        create_user(&pool, seller("dup@example.com")).await.unwrap();
        let err = create_user(&pool, seller("dup@EXAMPLE.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn superuser_is_always_staff() {
        let (_dir, pool) = pool().await;
        let user = create_user(
            &pool,
            NewUser {
                email: "root@example.com".to_string(),
                password: "password123".to_string(),
                is_superuser: true,
                ..NewUser::default()
            },
        )
        .await
        .unwrap();

        assert!(user.is_staff);
        assert!(user.is_superuser);
        assert!(user.teams.is_empty());
    }
}
