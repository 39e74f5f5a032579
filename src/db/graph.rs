//! Loads resource instances together with their whole ownership chain.
//!
//! Every link is fetched through a LEFT JOIN, so a dangling or null
//! reference comes back as a `None` link instead of an error.

use sqlx::{FromRow, SqlitePool};

use crate::authz::{ClientNode, ContractNode, ContractStatusNode, EventNode, IdentityRef, Instance, ResourceKind};
use crate::errors::AppResult;

#[derive(Debug, FromRow)]
struct ChainRow {
    id: i64,
    contract_id: Option<i64>,
    client_id: Option<i64>,
    contact_id: Option<i64>,
    support_contact_id: Option<i64>,
}

const CLIENT_CHAIN: &str = "SELECT c.id AS id, CAST(NULL AS INTEGER) AS contract_id, c.id AS client_id, \
     u.id AS contact_id, CAST(NULL AS INTEGER) AS support_contact_id \
     FROM clients c LEFT JOIN users u ON u.id = c.contact_id WHERE c.id = ?";

const CONTRACT_CHAIN: &str = "SELECT k.id AS id, k.id AS contract_id, c.id AS client_id, \
     u.id AS contact_id, CAST(NULL AS INTEGER) AS support_contact_id \
     FROM contracts k \
     LEFT JOIN clients c ON c.id = k.client_id \
     LEFT JOIN users u ON u.id = c.contact_id \
     WHERE k.id = ?";

const CONTRACT_STATUS_CHAIN: &str = "SELECT s.id AS id, k.id AS contract_id, c.id AS client_id, \
     u.id AS contact_id, CAST(NULL AS INTEGER) AS support_contact_id \
     FROM contract_statuses s \
     LEFT JOIN contracts k ON k.id = s.contract_id \
     LEFT JOIN clients c ON c.id = k.client_id \
     LEFT JOIN users u ON u.id = c.contact_id \
     WHERE s.id = ?";

const EVENT_CHAIN: &str = "SELECT e.id AS id, k.id AS contract_id, c.id AS client_id, \
     u.id AS contact_id, su.id AS support_contact_id \
     FROM events e \
     LEFT JOIN contracts k ON k.id = e.contract_id \
     LEFT JOIN clients c ON c.id = k.client_id \
     LEFT JOIN users u ON u.id = c.contact_id \
     LEFT JOIN users su ON su.id = e.support_contact_id \
     WHERE e.id = ?";

/// Fetches a hydrated instance; `None` when no row has that id
pub async fn fetch_instance(pool: &SqlitePool, kind: ResourceKind, id: i64) -> AppResult<Option<Instance>> {
    let sql = match kind {
        ResourceKind::Client => CLIENT_CHAIN,
        ResourceKind::Contract => CONTRACT_CHAIN,
        ResourceKind::ContractStatus => CONTRACT_STATUS_CHAIN,
        ResourceKind::Event => EVENT_CHAIN,
    };

    let row = sqlx::query_as::<_, ChainRow>(sql).bind(id).fetch_optional(pool).await?;

    Ok(row.map(|row| hydrate(kind, row)))
}

fn hydrate(kind: ResourceKind, row: ChainRow) -> Instance {
    let client = row.client_id.map(|id| ClientNode {
        id,
        contact: row.contact_id.map(|id| IdentityRef { id }),
    });
    let contract = row.contract_id.map(|id| ContractNode { id, client: client.clone() });

    match kind {
        ResourceKind::Client => Instance::Client(ClientNode {
            id: row.id,
            contact: row.contact_id.map(|id| IdentityRef { id }),
        }),
        ResourceKind::Contract => Instance::Contract(ContractNode { id: row.id, client }),
        ResourceKind::ContractStatus => Instance::ContractStatus(ContractStatusNode { id: row.id, contract }),
        ResourceKind::Event => Instance::Event(EventNode {
            id: row.id,
            contract,
            support_contact: row.support_contact_id.map(|id| IdentityRef { id }),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::{owns, owns_via_selling, owns_via_support, Identity};
    use crate::db::{connect, run_migrations};

    async fn pool() -> (tempfile::TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("graph.db").display());
        let pool = connect(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (dir, pool)
    }

    async fn seed(pool: &SqlitePool) {
        let now = chrono::Utc::now();
        for (id, email) in [(7_i64, "seller@example.com"), (20, "support@example.com")] {
            sqlx::query(
                "INSERT INTO users (id, email, password_hash, is_staff, created_at, updated_at) VALUES (?, ?, 'x', 1, ?, ?)",
            )
            .bind(id)
            .bind(email)
            .bind(now)
            .bind(now)
            .execute(pool)
            .await
            .unwrap();
        }
        sqlx::query(
            "INSERT INTO clients (id, first_name, last_name, email, phone, company_name, contact_id, created_at, updated_at) \
             VALUES (3, 'Ada', 'Lovelace', 'ada@example.com', '0123456789', 'AE', 7, ?, ?)",
        )
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO contracts (id, client_id, amount, payment_due, date_created, date_updated) VALUES (10, 3, 100.0, ?, ?, ?)")
            .bind(now)
            .bind(now)
            .bind(now)
            .execute(pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO contract_statuses (id, contract_id, is_accepted, state, created_at, updated_at) VALUES (1, 10, 1, 'S', ?, ?)",
        )
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO events (id, contract_id, support_contact_id, attendees, date, created_at, updated_at) VALUES (5, 10, 20, 30, ?, ?, ?)",
        )
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn hydrates_full_chain() {
        let (_dir, pool) = pool().await;
        seed(&pool).await;

        let status = fetch_instance(&pool, ResourceKind::ContractStatus, 1).await.unwrap().unwrap();
        assert!(owns_via_selling(&Identity::new(7), &status));
        assert!(!owns(&Identity::new(20), &status));

        let event = fetch_instance(&pool, ResourceKind::Event, 5).await.unwrap().unwrap();
        assert_eq!(event.kind(), ResourceKind::Event);
        assert!(owns_via_selling(&Identity::new(7), &event));
        assert!(owns_via_support(&Identity::new(20), &event));
        assert!(!owns_via_selling(&Identity::new(20), &event));

        assert!(fetch_instance(&pool, ResourceKind::Contract, 99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn removed_contact_breaks_the_chain() {
        let (_dir, pool) = pool().await;
        seed(&pool).await;

        sqlx::query("DELETE FROM users WHERE id = 7").execute(&pool).await.unwrap();

        let contract = fetch_instance(&pool, ResourceKind::Contract, 10).await.unwrap().unwrap();
        assert_eq!(
            contract,
            Instance::Contract(ContractNode {
                id: 10,
                client: Some(ClientNode { id: 3, contact: None }),
            })
        );
        assert!(!crate::authz::owns(&crate::authz::Identity::new(7), &contract));
    }
}
