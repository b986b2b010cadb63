use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{self, registration, reset};
use crate::email::send_fire_and_forget;
use crate::error::AppError;
use crate::models::user::{self, Entity as User, UserResponse};
use crate::response::ApiResponse;

use super::AppState;

// ── Request / Response types ──

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    /// Normalized (lower-cased) email the code was sent to
    pub email: String,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetRequestPayload {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetLinkQuery {
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResetLinkResponse {
    pub valid: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetConfirmRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify", post(verify))
        .route("/login", post(login))
        .route("/password-reset/request", post(password_reset_request))
        .route("/password-reset/validate", get(password_reset_validate))
        .route("/password-reset/confirm", post(password_reset_confirm))
}

// ── Handlers ──

/// Start a registration: store a pending user and email the verification
/// code.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Verification code sent", body = ApiResponse<RegisterResponse>),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Missing email or password")
    ),
    tag = "accounts"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<ApiResponse<RegisterResponse>, AppError> {
    let (pending, code) = registration::register(&state.db, &payload.email, &payload.password).await?;

    // Fire-and-forget: a failed send is logged, never surfaced as a failed
    // registration
    send_fire_and_forget(
        state.mailer.as_ref(),
        &pending.email,
        "Verify Your Account",
        &format!("Your verification code is: {}", code),
    )
    .await;

    Ok(ApiResponse::success(RegisterResponse {
        message: format!("Verification code sent to {}", pending.email),
        email: pending.email,
    }))
}

/// Confirm a registration code and log the new account in.
#[utoipa::path(
    post,
    path = "/api/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Account verified and logged in", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Invalid or expired verification code")
    ),
    tag = "accounts"
)]
pub async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    let account = registration::verify(
        &state.db,
        &payload.email,
        &payload.code,
        state.config.verification_code_expiry_secs,
    )
    .await?;

    let token = auth::create_token(
        account.id,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    Ok(ApiResponse::success(AuthResponse {
        access_token: token,
        user: UserResponse::from(account),
    }))
}

/// Log in with existing credentials.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "accounts"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    let email = payload.email.trim().to_lowercase();

    let account = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !auth::verify_password(&payload.password, &account.password_hash)? {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = auth::create_token(
        account.id,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    Ok(ApiResponse::success(AuthResponse {
        access_token: token,
        user: UserResponse::from(account),
    }))
}

/// Issue a password-reset token and email the reset link.
#[utoipa::path(
    post,
    path = "/api/auth/password-reset/request",
    request_body = ResetRequestPayload,
    responses(
        (status = 200, description = "Reset link sent", body = ApiResponse<MessageResponse>),
        (status = 404, description = "No account for that email")
    ),
    tag = "accounts"
)]
pub async fn password_reset_request(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequestPayload>,
) -> Result<ApiResponse<MessageResponse>, AppError> {
    let (account, stored) = reset::request_reset(&state.db, &payload.email).await?;

    let reset_link = format!(
        "{}/auth/reset-password-confirm/?email={}&token={}",
        state.config.public_base_url, account.email, stored.token
    );

    send_fire_and_forget(
        state.mailer.as_ref(),
        &account.email,
        "Your Password Reset Link",
        &format!(
            "Click the link below to reset your password:\n{}",
            reset_link
        ),
    )
    .await;

    Ok(ApiResponse::success(MessageResponse {
        message: "Reset link sent to your email".to_string(),
    }))
}

/// Check whether a reset link is still usable (gates the reset form).
/// Read-only — the token is not consumed.
#[utoipa::path(
    get,
    path = "/api/auth/password-reset/validate",
    params(
        ("email" = String, Query, description = "Account email"),
        ("token" = String, Query, description = "Reset token from the link")
    ),
    responses(
        (status = 200, description = "Link validity", body = ApiResponse<ResetLinkResponse>)
    ),
    tag = "accounts"
)]
pub async fn password_reset_validate(
    State(state): State<AppState>,
    Query(query): Query<ResetLinkQuery>,
) -> Result<ApiResponse<ResetLinkResponse>, AppError> {
    let valid = reset::validate_reset_link(
        &state.db,
        &query.email,
        &query.token,
        state.config.password_reset_expiry_secs,
    )
    .await?;

    Ok(ApiResponse::success(ResetLinkResponse { valid }))
}

/// Set a new password using a reset token.
#[utoipa::path(
    post,
    path = "/api/auth/password-reset/confirm",
    request_body = ResetConfirmRequest,
    responses(
        (status = 200, description = "Password reset", body = ApiResponse<MessageResponse>),
        (status = 400, description = "Invalid or expired link"),
        (status = 422, description = "Missing fields or password mismatch")
    ),
    tag = "accounts"
)]
pub async fn password_reset_confirm(
    State(state): State<AppState>,
    Json(payload): Json<ResetConfirmRequest>,
) -> Result<ApiResponse<MessageResponse>, AppError> {
    reset::confirm_reset(
        &state.db,
        &payload.email,
        &payload.token,
        &payload.password1,
        &payload.password2,
        state.config.password_reset_expiry_secs,
    )
    .await?;

    Ok(ApiResponse::success(MessageResponse {
        message: "Password reset successfully. Please log in.".to_string(),
    }))
}
