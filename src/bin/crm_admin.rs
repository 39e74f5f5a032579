use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sqlx::SqlitePool;

use crm_backend::authz::Team;
use crm_backend::db::{self, bootstrap, users};
use crm_backend::models::user::NewUser;

#[derive(Parser, Debug)]
#[command(author, version, about = "CRM administration tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending migrations
    Migrate,
    /// Create the Selling and Support teams and their permissions (safe to rerun)
    Bootstrap,
    /// Create a team member
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        mobile: Option<String>,
        /// Grant staff status (required for any API access)
        #[arg(long)]
        staff: bool,
        /// Grant superuser status (implies staff)
        #[arg(long)]
        superuser: bool,
        /// Team membership, repeatable: selling or support
        #[arg(long = "team")]
        teams: Vec<Team>,
    },
    /// Add a user to a team
    AssignTeam {
        #[arg(long)]
        email: String,
        #[arg(long)]
        team: Team,
    },
    /// Remove a user from a team
    RemoveTeam {
        #[arg(long)]
        email: String,
        #[arg(long)]
        team: Team,
    },
    /// List users with their flags and teams
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(crate_env);
    }

    let cli = Cli::parse();
    let pool = get_pool().await?;

    match cli.command {
        Commands::Migrate => {
            db::run_migrations(&pool).await?;
            println!("Migrations applied");
        }
        Commands::Bootstrap => {
            db::run_migrations(&pool).await?;
            bootstrap::ensure_teams(&pool).await?;
            for team in Team::ALL {
                let codenames = bootstrap::team_permissions(&pool, team).await?;
                println!("{}: {}", team, codenames.join(", "));
            }
        }
        Commands::CreateUser {
            email,
            password,
            first_name,
            last_name,
            phone,
            mobile,
            staff,
            superuser,
            teams,
        } => {
            let user = users::create_user(
                &pool,
                NewUser {
                    email,
                    password,
                    first_name,
                    last_name,
                    phone,
                    mobile,
                    is_staff: staff,
                    is_superuser: superuser,
                    teams,
                },
            )
            .await?;
            println!("Created user {} ({})", user.id, user.email);
        }
        Commands::AssignTeam { email, team } => {
            let user_id = user_id_for(&pool, &email).await?;
            users::assign_team(&pool, user_id, team).await?;
            println!("Added {} to {}", email, team);
        }
        Commands::RemoveTeam { email, team } => {
            let user_id = user_id_for(&pool, &email).await?;
            users::remove_team(&pool, user_id, team).await?;
            println!("Removed {} from {}", email, team);
        }
        Commands::ListUsers => {
            println!("{:<6} {:<32} {:<6} {:<6} {:<6} {}", "Id", "Email", "Active", "Staff", "Super", "Teams");
            for user in users::list_users(&pool).await? {
                let teams: Vec<String> = user.teams.iter().map(ToString::to_string).collect();
                println!(
                    "{:<6} {:<32} {:<6} {:<6} {:<6} {}",
                    user.id,
                    user.email,
                    user.is_active,
                    user.is_staff,
                    user.is_superuser,
                    teams.join(", ")
                );
            }
        }
    }

    Ok(())
}

async fn get_pool() -> anyhow::Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    db::connect(&database_url).await
}

async fn user_id_for(pool: &SqlitePool, email: &str) -> anyhow::Result<i64> {
    let user = users::fetch_user_by_email(pool, email)
        .await?
        .with_context(|| format!("no user with email {email}"))?;
    Ok(user.id)
}
