use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::errors::AppError;

/// Lifecycle state of a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ContractState {
    #[serde(rename = "S")]
    Started,
    #[serde(rename = "P")]
    Paused,
    #[serde(rename = "E")]
    Ended,
}

impl ContractState {
    pub fn code(&self) -> &'static str {
        match self {
            ContractState::Started => "S",
            ContractState::Paused => "P",
            ContractState::Ended => "E",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(ContractState::Started),
            "P" => Some(ContractState::Paused),
            "E" => Some(ContractState::Ended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContractStatus {
    pub id: i64,
    pub contract: i64,
    pub is_accepted: bool,
    pub acceptance_note: String,
    pub state: ContractState,
    pub state_note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbContractStatus {
    pub id: i64,
    pub contract_id: i64,
    pub is_accepted: bool,
    pub acceptance_note: String,
    pub state: String,
    pub state_note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbContractStatus> for ContractStatus {
    type Error = AppError;

    fn try_from(value: DbContractStatus) -> Result<Self, Self::Error> {
        let state = ContractState::from_code(&value.state)
            .ok_or_else(|| AppError::internal(format!("invalid contract state '{}'", value.state)))?;

        Ok(ContractStatus {
            id: value.id,
            contract: value.contract_id,
            is_accepted: value.is_accepted,
            acceptance_note: value.acceptance_note,
            state,
            state_note: value.state_note,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContractStatusCreateRequest {
    pub contract: i64,
    pub is_accepted: bool,
    #[serde(default)]
    #[schema(example = "Signed during the kickoff meeting")]
    pub acceptance_note: String,
    pub state: ContractState,
    #[serde(default)]
    pub state_note: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContractStatusUpdateRequest {
    pub contract: Option<i64>,
    pub is_accepted: Option<bool>,
    pub acceptance_note: Option<String>,
    pub state: Option<ContractState>,
    pub state_note: Option<String>,
}
