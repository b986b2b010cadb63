use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A registration awaiting email verification.
///
/// Keyed by email: re-registering upserts this row, so only the most
/// recently issued verification code is ever valid for a given address.
/// The row is deleted when the registration is promoted to a `users` row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pending_users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub email: String,

    /// Hash carried over verbatim when the account is created
    pub password_hash: String,

    pub verification_code: String,

    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this registration is still within its validity window at `now`.
    ///
    /// Expiry is purely computed; expired rows stay in place until
    /// overwritten by a re-registration.
    pub fn is_valid_at(&self, window_secs: i64, now: NaiveDateTime) -> bool {
        now < self.created_at + Duration::seconds(window_secs)
    }

    /// Whether this registration is still within its validity window.
    pub fn is_valid(&self, window_secs: i64) -> bool {
        self.is_valid_at(window_secs, Utc::now().naive_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(created_at: NaiveDateTime) -> Model {
        Model {
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
            verification_code: "abcDEF1234".to_string(),
            created_at,
        }
    }

    #[test]
    fn valid_within_window() {
        let now = Utc::now().naive_utc();
        let p = pending(now - Duration::seconds(100));
        assert!(p.is_valid_at(1800, now));
    }

    #[test]
    fn invalid_past_window() {
        let now = Utc::now().naive_utc();
        let p = pending(now - Duration::seconds(1801));
        assert!(!p.is_valid_at(1800, now));
    }

    #[test]
    fn boundary_is_exclusive() {
        let now = Utc::now().naive_utc();
        let p = pending(now - Duration::seconds(1800));
        assert!(!p.is_valid_at(1800, now));
    }
}
