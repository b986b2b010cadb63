use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Token purpose for password resets. The `tokens` table carries a
/// `token_type` column so further one-time-credential kinds can share it.
pub const PASSWORD_RESET: &str = "password_reset";

/// One-time credential bound to an account.
///
/// At most one live token exists per `(user_id, token_type)` pair — issuing
/// a new one overwrites the stored value and timestamp, which implicitly
/// invalidates the old value (lookup is by current stored value only).
/// Consumed tokens are deleted; expired ones are left in place and simply
/// fail lookup until overwritten.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub token_type: String,

    /// The raw token value sent to the user
    pub token: String,

    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this token is still within its validity window at `now`.
    pub fn is_valid_at(&self, window_secs: i64, now: NaiveDateTime) -> bool {
        now < self.created_at + Duration::seconds(window_secs)
    }

    /// Whether this token is still within its validity window.
    pub fn is_valid(&self, window_secs: i64) -> bool {
        self.is_valid_at(window_secs, Utc::now().naive_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_expiry_is_lazy_predicate() {
        let now = Utc::now().naive_utc();
        let token = Model {
            id: 1,
            user_id: 1,
            token_type: PASSWORD_RESET.to_string(),
            token: "x".repeat(20),
            created_at: now - Duration::seconds(3599),
        };
        assert!(token.is_valid_at(3600, now));
        assert!(!token.is_valid_at(3600, now + Duration::seconds(2)));
    }
}
