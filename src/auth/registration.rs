//! Pending-registration management and account verification.
//!
//! Registration does not create an account directly. It stores a pending
//! row keyed by email together with a hashed password and a one-time
//! verification code, and the account is only created once the code is
//! confirmed. Re-registering with the same email replaces the pending row,
//! which silently invalidates any previously issued code.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::auth::codes::{random_string, VERIFICATION_CODE_LEN};
use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::models::{pending_user, user};

/// Start (or restart) a registration for `email`.
///
/// Rejects emails that already belong to a confirmed account. On success
/// the pending row holds the argon2 hash and a fresh verification code,
/// which is returned for delivery to the user.
pub async fn register(
    db: &DatabaseConnection,
    email: &str,
    raw_password: &str,
) -> Result<(pending_user::Model, String), AppError> {
    let email = email.trim().to_lowercase();

    if email.is_empty() || raw_password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_password(raw_password)?;
    let code = random_string(VERIFICATION_CODE_LEN);
    let now = Utc::now().naive_utc();

    // Upsert keyed by email: a second registration replaces the hash, the
    // code and the timestamp, restarting the flow.
    let pending = match pending_user::Entity::find_by_id(email.as_str()).one(db).await? {
        Some(prior) => {
            let mut active: pending_user::ActiveModel = prior.into();
            active.password_hash = Set(password_hash);
            active.verification_code = Set(code.clone());
            active.created_at = Set(now);
            active.update(db).await?
        }
        None => {
            let active = pending_user::ActiveModel {
                email: Set(email),
                password_hash: Set(password_hash),
                verification_code: Set(code.clone()),
                created_at: Set(now),
            };
            active.insert(db).await?
        }
    };

    Ok((pending, code))
}

/// Confirm a registration with its verification code and promote it to an
/// account.
///
/// Lookup is by exact `(email, code)` match. A stale code (superseded by
/// re-registration), an unknown email and an expired pending row all fail
/// the same way. On success the stored hash is carried over verbatim and
/// the pending row is deleted, making the code single-use.
pub async fn verify(
    db: &DatabaseConnection,
    email: &str,
    code: &str,
    window_secs: i64,
) -> Result<user::Model, AppError> {
    let email = email.trim().to_lowercase();

    let pending = pending_user::Entity::find()
        .filter(pending_user::Column::Email.eq(&email))
        .filter(pending_user::Column::VerificationCode.eq(code))
        .one(db)
        .await?;

    let pending = match pending {
        Some(p) if p.is_valid(window_secs) => p,
        _ => {
            return Err(AppError::BadRequest(
                "Invalid or expired verification code".to_string(),
            ))
        }
    };

    let now = Utc::now().naive_utc();
    let account = user::ActiveModel {
        email: Set(pending.email.clone()),
        password_hash: Set(pending.password_hash.clone()),
        is_staff: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let account = account.insert(db).await?;

    pending_user::Entity::delete_by_id(pending.email.as_str())
        .exec(db)
        .await?;

    tracing::info!(email = %account.email, "account verified");

    Ok(account)
}
