use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub mod bootstrap;
pub mod graph;
pub mod users;

pub async fn init() -> anyhow::Result<SqlitePool> {
	let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;

	let pool = connect(&database_url).await?;
	run_migrations(&pool).await?;

	Ok(pool)
}

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
	let options = SqliteConnectOptions::from_str(database_url)
		.with_context(|| format!("invalid DATABASE_URL '{database_url}'"))?
		.create_if_missing(true)
		.foreign_keys(true);

	SqlitePoolOptions::new()
		.max_connections(10)
		.min_connections(1)
		.acquire_timeout(Duration::from_secs(10))
		.connect_with(options)
		.await
		.context("failed to connect to database")
}

pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
	sqlx::migrate!()
		.run(pool)
		.await
		.context("failed to run migrations")
}

/// Whether a row with `id` exists in `table`
pub(crate) async fn exists(pool: &SqlitePool, table: &'static str, id: i64) -> Result<bool, sqlx::Error> {
	let sql = format!("SELECT COUNT(1) FROM {table} WHERE id = ?");
	let count: i64 = sqlx::query_scalar(&sql).bind(id).fetch_one(pool).await?;
	Ok(count > 0)
}
