//! Field and cross-field checks applied at the write boundary.
//!
//! Failures here are `AppError::Validation` (400), never `Forbidden`.

use sqlx::SqlitePool;

use crate::authz::{Team, UserId};
use crate::db::{self, users};
use crate::errors::{AppError, AppResult};

pub const NAME_MAX_LEN: usize = 50;
pub const NOTE_MAX_LEN: usize = 2000;
/// Nine digits with two decimal places
pub const AMOUNT_LIMIT: f64 = 10_000_000.0;

pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

/// `0` followed by nine digits
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.starts_with('0') && phone.chars().all(|c| c.is_ascii_digit())
}

pub fn phone_or_mobile(phone: Option<&str>, mobile: Option<&str>) -> AppResult<()> {
    if phone.is_none() && mobile.is_none() {
        return Err(AppError::validation("at least one of the two fields 'phone' or 'mobile' must be set"));
    }
    for (field, value) in [("phone", phone), ("mobile", mobile)] {
        if let Some(value) = value {
            if !is_valid_phone(value) {
                return Err(AppError::validation(format!("'{field}' must be a 0 followed by 9 digits")));
            }
        }
    }
    Ok(())
}

pub fn required_text(field: &str, value: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("'{field}' must not be empty")));
    }
    max_text(field, value, max_len)
}

pub fn max_text(field: &str, value: &str, max_len: usize) -> AppResult<()> {
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!("'{field}' must be at most {max_len} characters")));
    }
    Ok(())
}

pub fn amount(value: f64) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 || value >= AMOUNT_LIMIT {
        return Err(AppError::validation("'amount' must be between 0 and 9999999.99"));
    }
    Ok(())
}

pub fn attendees(value: i64) -> AppResult<()> {
    if value < 0 {
        return Err(AppError::validation("'attendees' must not be negative"));
    }
    Ok(())
}

/// The referenced row must exist
pub async fn reference_exists(pool: &SqlitePool, table: &'static str, field: &str, id: i64) -> AppResult<()> {
    if db::exists(pool, table, id).await? {
        Ok(())
    } else {
        Err(AppError::validation(format!("'{field}' references unknown id {id}")))
    }
}

/// A client's contact must be a Selling team member
pub async fn selling_contact(pool: &SqlitePool, user_id: UserId) -> AppResult<()> {
    team_member(pool, user_id, Team::Selling, "contact").await
}

/// An event's support contact must be a Support team member
pub async fn support_contact(pool: &SqlitePool, user_id: UserId) -> AppResult<()> {
    team_member(pool, user_id, Team::Support, "support_contact").await
}

async fn team_member(pool: &SqlitePool, user_id: UserId, team: Team, field: &str) -> AppResult<()> {
    if users::is_team_member(pool, user_id, team).await? {
        Ok(())
    } else {
        Err(AppError::validation(format!("the '{field}' must be a {team} member")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_format() {
        assert!(is_valid_phone("0123456789"));
        assert!(!is_valid_phone("1123456789"));
        assert!(!is_valid_phone("012345678"));
        assert!(!is_valid_phone("01234567a9"));
    }

    #[test]
    fn phone_or_mobile_required() {
        assert!(matches!(phone_or_mobile(None, None), Err(AppError::Validation(_))));
        assert!(phone_or_mobile(None, Some("0612345678")).is_ok());
        assert!(phone_or_mobile(Some("12"), Some("0612345678")).is_err());
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("ada@example.com"));
        assert!(!is_valid_email("ada.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@localhost"));
    }

    #[test]
    fn text_and_number_bounds() {
        assert!(required_text("company_name", "  ", NAME_MAX_LEN).is_err());
        assert!(required_text("company_name", "ACME", NAME_MAX_LEN).is_ok());
        assert!(max_text("note", &"x".repeat(NOTE_MAX_LEN + 1), NOTE_MAX_LEN).is_err());
        assert!(amount(9_999_999.99).is_ok());
        assert!(amount(10_000_000.0).is_err());
        assert!(amount(-1.0).is_err());
        assert!(attendees(0).is_ok());
        assert!(attendees(-3).is_err());
    }
}
