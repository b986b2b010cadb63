//! Password-reset token issuance, validation and confirmation.
//!
//! Reset tokens live in the `tokens` table under the `password_reset` type.
//! Issuance upserts on `(user_id, token_type)`, so a repeat request
//! replaces the stored value and the old link stops matching. Expiry is
//! lazy: an expired token stays in its row and simply fails lookup until
//! the next request overwrites it.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::auth::codes::{random_string, RESET_TOKEN_LEN};
use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::models::{token, user};

/// Issue a password-reset token for the account behind `email`.
///
/// Fails with `NotFound` when no account matches. Returns the account and
/// the freshly stored token row; the raw value goes into the reset link.
pub async fn request_reset(
    db: &DatabaseConnection,
    email: &str,
) -> Result<(user::Model, token::Model), AppError> {
    let email = email.trim().to_lowercase();

    let account = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Email not found".to_string()))?;

    let value = random_string(RESET_TOKEN_LEN);
    let now = Utc::now().naive_utc();

    let existing = token::Entity::find()
        .filter(token::Column::UserId.eq(account.id))
        .filter(token::Column::TokenType.eq(token::PASSWORD_RESET))
        .one(db)
        .await?;

    // Upsert on (user_id, token_type): the prior value is overwritten, not
    // kept alongside, so only the newest link ever matches.
    let stored = match existing {
        Some(prior) => {
            let mut active: token::ActiveModel = prior.into();
            active.token = Set(value);
            active.created_at = Set(now);
            active.update(db).await?
        }
        None => {
            let active = token::ActiveModel {
                user_id: Set(account.id),
                token_type: Set(token::PASSWORD_RESET.to_string()),
                token: Set(value),
                created_at: Set(now),
                ..Default::default()
            };
            active.insert(db).await?
        }
    };

    Ok((account, stored))
}

/// Check whether a reset link is currently usable. Read-only — gates the
/// reset form without consuming the token.
pub async fn validate_reset_link(
    db: &DatabaseConnection,
    email: &str,
    token_value: &str,
    window_secs: i64,
) -> Result<bool, AppError> {
    Ok(find_reset_token(db, email, token_value)
        .await?
        .map(|t| t.is_valid(window_secs))
        .unwrap_or(false))
}

/// Set a new password using a reset token.
///
/// The token is re-fetched and re-checked here regardless of any earlier
/// `validate_reset_link` call, since time may have passed between showing
/// the form and submitting it. A password mismatch does not consume the
/// token; a successful reset deletes it.
pub async fn confirm_reset(
    db: &DatabaseConnection,
    email: &str,
    token_value: &str,
    password1: &str,
    password2: &str,
    window_secs: i64,
) -> Result<user::Model, AppError> {
    if email.trim().is_empty() || token_value.is_empty() {
        return Err(AppError::Validation(
            "Missing email or token".to_string(),
        ));
    }

    if password1.is_empty() || password2.is_empty() {
        return Err(AppError::Validation(
            "Both password fields are required".to_string(),
        ));
    }

    if password1 != password2 {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }

    let stored = find_reset_token(db, email, token_value)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid or expired link".to_string()))?;

    if !stored.is_valid(window_secs) {
        return Err(AppError::BadRequest("Link expired".to_string()));
    }

    let account = user::Entity::find_by_id(stored.user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Internal("Token owner missing".to_string()))?;

    let mut active: user::ActiveModel = account.into();
    active.password_hash = Set(hash_password(password1)?);
    active.updated_at = Set(Utc::now().naive_utc());
    let account = active.update(db).await?;

    // Single-use: the consumed token row is removed
    token::Entity::delete_by_id(stored.id).exec(db).await?;

    tracing::info!(email = %account.email, "password reset");

    Ok(account)
}

/// Exact-match lookup of a reset token by owner email and stored value.
async fn find_reset_token(
    db: &DatabaseConnection,
    email: &str,
    token_value: &str,
) -> Result<Option<token::Model>, AppError> {
    let email = email.trim().to_lowercase();

    let account = match user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(db)
        .await?
    {
        Some(u) => u,
        None => return Ok(None),
    };

    Ok(token::Entity::find()
        .filter(token::Column::UserId.eq(account.id))
        .filter(token::Column::TokenType.eq(token::PASSWORD_RESET))
        .filter(token::Column::Token.eq(token_value))
        .one(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::auth::registration;
    use crate::migrations::Migrator;
    use chrono::Duration;
    use sea_orm::PaginatorTrait;
    use sea_orm_migration::MigratorTrait;

    const WINDOW: i64 = 3600;

    async fn setup_db_with_account(email: &str, password: &str) -> DatabaseConnection {
        let db = crate::db::connect_in_memory()
            .await
            .expect("Failed to open in-memory database");
        Migrator::up(&db, None).await.expect("Failed to migrate");

        let (_, code) = registration::register(&db, email, password).await.unwrap();
        registration::verify(&db, email, &code, 1800).await.unwrap();
        db
    }

    async fn token_count(db: &DatabaseConnection) -> u64 {
        token::Entity::find().count(db).await.unwrap()
    }

    #[tokio::test]
    async fn request_reset_unknown_email_fails() {
        let db = setup_db_with_account("a@x.com", "pw").await;

        let err = request_reset(&db, "nobody@x.com").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(token_count(&db).await, 0);
    }

    #[tokio::test]
    async fn request_reset_issues_token() {
        let db = setup_db_with_account("a@x.com", "pw").await;

        let (account, stored) = request_reset(&db, "A@X.com").await.unwrap();
        assert_eq!(account.email, "a@x.com");
        assert_eq!(stored.token.len(), RESET_TOKEN_LEN);
        assert_eq!(stored.token_type, token::PASSWORD_RESET);
        assert_eq!(token_count(&db).await, 1);
    }

    #[tokio::test]
    async fn reissue_overwrites_prior_token() {
        let db = setup_db_with_account("a@x.com", "pw").await;

        let (_, first) = request_reset(&db, "a@x.com").await.unwrap();
        let (_, second) = request_reset(&db, "a@x.com").await.unwrap();

        assert_eq!(token_count(&db).await, 1);
        assert_ne!(first.token, second.token);

        assert!(!validate_reset_link(&db, "a@x.com", &first.token, WINDOW)
            .await
            .unwrap());
        assert!(validate_reset_link(&db, "a@x.com", &second.token, WINDOW)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn validate_does_not_consume() {
        let db = setup_db_with_account("a@x.com", "pw").await;
        let (_, stored) = request_reset(&db, "a@x.com").await.unwrap();

        for _ in 0..3 {
            assert!(validate_reset_link(&db, "a@x.com", &stored.token, WINDOW)
                .await
                .unwrap());
        }
        assert_eq!(token_count(&db).await, 1);
    }

    #[tokio::test]
    async fn confirm_rejects_missing_fields() {
        let db = setup_db_with_account("a@x.com", "pw").await;

        let err = confirm_reset(&db, "", "tok", "new", "new", WINDOW)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = confirm_reset(&db, "a@x.com", "tok", "", "", WINDOW)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn password_mismatch_does_not_consume_token() {
        let db = setup_db_with_account("a@x.com", "pw").await;
        let (_, stored) = request_reset(&db, "a@x.com").await.unwrap();

        let err = confirm_reset(&db, "a@x.com", &stored.token, "new1", "new2", WINDOW)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Same token still works with a matching pair
        let account = confirm_reset(&db, "a@x.com", &stored.token, "new-pw", "new-pw", WINDOW)
            .await
            .unwrap();
        assert!(verify_password("new-pw", &account.password_hash).unwrap());
    }

    #[tokio::test]
    async fn confirm_is_single_use() {
        let db = setup_db_with_account("a@x.com", "pw").await;
        let (_, stored) = request_reset(&db, "a@x.com").await.unwrap();

        confirm_reset(&db, "a@x.com", &stored.token, "new-pw", "new-pw", WINDOW)
            .await
            .unwrap();
        assert_eq!(token_count(&db).await, 0);

        let err = confirm_reset(&db, "a@x.com", &stored.token, "other", "other", WINDOW)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn confirm_changes_the_password() {
        let db = setup_db_with_account("a@x.com", "old-pw").await;
        let (_, stored) = request_reset(&db, "a@x.com").await.unwrap();

        let account = confirm_reset(&db, "a@x.com", &stored.token, "new-pw", "new-pw", WINDOW)
            .await
            .unwrap();

        assert!(verify_password("new-pw", &account.password_hash).unwrap());
        assert!(!verify_password("old-pw", &account.password_hash).unwrap());
    }

    #[tokio::test]
    async fn expired_token_fails_but_row_persists() {
        let db = setup_db_with_account("a@x.com", "pw").await;
        let (_, stored) = request_reset(&db, "a@x.com").await.unwrap();

        let mut active: token::ActiveModel = stored.clone().into();
        active.created_at = Set(Utc::now().naive_utc() - Duration::seconds(WINDOW + 1));
        active.update(&db).await.unwrap();

        assert!(!validate_reset_link(&db, "a@x.com", &stored.token, WINDOW)
            .await
            .unwrap());

        let err = confirm_reset(&db, "a@x.com", &stored.token, "new", "new", WINDOW)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        // Lazy expiry: the stale row remains until the next request_reset
        assert_eq!(token_count(&db).await, 1);

        let (_, fresh) = request_reset(&db, "a@x.com").await.unwrap();
        assert_eq!(token_count(&db).await, 1);
        assert!(validate_reset_link(&db, "a@x.com", &fresh.token, WINDOW)
            .await
            .unwrap());
    }
}
