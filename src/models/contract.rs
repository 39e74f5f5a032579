use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Contract {
    pub id: i64,
    pub client: i64,
    pub amount: f64,
    pub payment_due: DateTime<Utc>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbContract {
    pub id: i64,
    pub client_id: i64,
    pub amount: f64,
    pub payment_due: DateTime<Utc>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

impl From<DbContract> for Contract {
    fn from(db: DbContract) -> Self {
        Contract {
            id: db.id,
            client: db.client_id,
            amount: db.amount,
            payment_due: db.payment_due,
            date_created: db.date_created,
            date_updated: db.date_updated,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContractCreateRequest {
    pub client: i64,
    #[schema(example = 12500.5)]
    pub amount: f64,
    #[schema(example = "2025-12-31T00:00:00Z")]
    pub payment_due: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContractUpdateRequest {
    pub client: Option<i64>,
    pub amount: Option<f64>,
    pub payment_due: Option<DateTime<Utc>>,
}
