use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::email::send_fire_and_forget;
use crate::error::AppError;
use crate::extractors::{AuthUser, Pagination};
use crate::models::job_application::{self, status};
use crate::models::user::{self, Entity as User};
use crate::models::{job_advert, job_application::Entity as JobApplication};
use crate::response::ApiResponse;

use super::accounts::MessageResponse;
use super::AppState;

// ── Request / Response types ──

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdvertPayload {
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub description: String,
    pub expires_at: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecideRequest {
    /// One of: applied, interview, rejected
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub keyword: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationsResponse {
    /// Applications with a decision the applicant has not viewed yet
    pub unseen_decisions: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_users: u64,
    pub total_employers: u64,
    pub total_job_adverts: u64,
    pub total_applications: u64,
    /// Share of applications that reached the interview stage, in percent
    pub success_rate: u64,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(create_advert).get(list_adverts))
        .route("/jobs/search", get(search))
        .route("/jobs/{id}", get(get_advert))
        .route("/jobs/{id}", put(update_advert))
        .route("/jobs/{id}", delete(delete_advert))
        .route("/jobs/{id}/apply", post(apply))
        .route("/jobs/{id}/applications", get(advert_applications))
        .route("/applications/{id}/decide", post(decide))
        .route("/me/jobs", get(my_jobs))
        .route("/me/applications", get(my_applications))
        .route("/me/notifications", get(notifications))
        .route("/stats", get(stats))
}

// ── Helpers ──

async fn find_advert(state: &AppState, advert_id: i32) -> Result<job_advert::Model, AppError> {
    job_advert::Entity::find_by_id(advert_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Job advert not found".to_string()))
}

fn validate_advert(payload: &AdvertPayload) -> Result<(), AppError> {
    if payload.title.trim().is_empty()
        || payload.company_name.trim().is_empty()
        || payload.location.trim().is_empty()
        || payload.description.trim().is_empty()
    {
        return Err(AppError::Validation(
            "Title, company name, location and description are required".to_string(),
        ));
    }
    Ok(())
}

// ── Handlers ──

/// Create a new job advert owned by the caller.
#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = AdvertPayload,
    responses(
        (status = 200, description = "Advert created", body = ApiResponse<job_advert::Model>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn create_advert(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AdvertPayload>,
) -> Result<ApiResponse<job_advert::Model>, AppError> {
    validate_advert(&payload)?;

    let now = Utc::now().naive_utc();
    let advert = job_advert::ActiveModel {
        title: Set(payload.title),
        company_name: Set(payload.company_name),
        location: Set(payload.location),
        description: Set(payload.description),
        expires_at: Set(payload.expires_at),
        created_by: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let advert = advert.insert(&state.db).await?;

    Ok(ApiResponse::success(advert))
}

/// List job adverts, newest first.
#[utoipa::path(
    get,
    path = "/api/jobs",
    params(Pagination),
    responses(
        (status = 200, description = "Job adverts", body = ApiResponse<Vec<job_advert::Model>>)
    ),
    tag = "jobs"
)]
pub async fn list_adverts(
    State(state): State<AppState>,
    pagination: Pagination,
) -> Result<ApiResponse<Vec<job_advert::Model>>, AppError> {
    let adverts = job_advert::Entity::find()
        .order_by_desc(job_advert::Column::CreatedAt)
        .offset(pagination.offset)
        .limit(pagination.limit)
        .all(&state.db)
        .await?;

    Ok(ApiResponse::success(adverts))
}

/// Fetch a single job advert.
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(("id" = i32, Path, description = "Advert ID")),
    responses(
        (status = 200, description = "Job advert", body = ApiResponse<job_advert::Model>),
        (status = 404, description = "Not found")
    ),
    tag = "jobs"
)]
pub async fn get_advert(
    State(state): State<AppState>,
    Path(advert_id): Path<i32>,
) -> Result<ApiResponse<job_advert::Model>, AppError> {
    let advert = find_advert(&state, advert_id).await?;
    Ok(ApiResponse::success(advert))
}

/// Update an advert. Owner only.
#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    params(("id" = i32, Path, description = "Advert ID")),
    request_body = AdvertPayload,
    responses(
        (status = 200, description = "Advert updated", body = ApiResponse<job_advert::Model>),
        (status = 403, description = "Not the advert owner")
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn update_advert(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(advert_id): Path<i32>,
    Json(payload): Json<AdvertPayload>,
) -> Result<ApiResponse<job_advert::Model>, AppError> {
    let advert = find_advert(&state, advert_id).await?;
    if advert.created_by != user_id {
        return Err(AppError::Forbidden(
            "You can only update an advert created by you".to_string(),
        ));
    }

    validate_advert(&payload)?;

    let mut active: job_advert::ActiveModel = advert.into();
    active.title = Set(payload.title);
    active.company_name = Set(payload.company_name);
    active.location = Set(payload.location);
    active.description = Set(payload.description);
    active.expires_at = Set(payload.expires_at);
    active.updated_at = Set(Utc::now().naive_utc());
    let advert = active.update(&state.db).await?;

    Ok(ApiResponse::success(advert))
}

/// Delete an advert. Owner only.
#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    params(("id" = i32, Path, description = "Advert ID")),
    responses(
        (status = 200, description = "Advert deleted", body = ApiResponse<MessageResponse>),
        (status = 403, description = "Not the advert owner")
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn delete_advert(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(advert_id): Path<i32>,
) -> Result<ApiResponse<MessageResponse>, AppError> {
    let advert = find_advert(&state, advert_id).await?;
    if advert.created_by != user_id {
        return Err(AppError::Forbidden(
            "You can only delete an advert created by you".to_string(),
        ));
    }

    job_advert::Entity::delete_by_id(advert_id)
        .exec(&state.db)
        .await?;

    Ok(ApiResponse::success(MessageResponse {
        message: "Advert deleted successfully".to_string(),
    }))
}

/// Apply to a job advert. One application per email per advert.
#[utoipa::path(
    post,
    path = "/api/jobs/{id}/apply",
    params(("id" = i32, Path, description = "Advert ID")),
    request_body = ApplyRequest,
    responses(
        (status = 200, description = "Application submitted", body = ApiResponse<job_application::Model>),
        (status = 404, description = "Advert not found"),
        (status = 409, description = "Already applied")
    ),
    tag = "jobs"
)]
pub async fn apply(
    State(state): State<AppState>,
    Path(advert_id): Path<i32>,
    Json(payload): Json<ApplyRequest>,
) -> Result<ApiResponse<job_application::Model>, AppError> {
    let advert = find_advert(&state, advert_id).await?;

    let email = payload.email.trim().to_lowercase();
    if payload.name.trim().is_empty() || email.is_empty() {
        return Err(AppError::Validation(
            "Name and email are required".to_string(),
        ));
    }

    let already_applied = JobApplication::find()
        .filter(job_application::Column::JobAdvertId.eq(advert.id))
        .filter(job_application::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .is_some();
    if already_applied {
        return Err(AppError::Conflict(
            "You have already applied for this position".to_string(),
        ));
    }

    let application = job_application::ActiveModel {
        job_advert_id: Set(advert.id),
        name: Set(payload.name),
        email: Set(email),
        status: Set(status::APPLIED.to_string()),
        decision_seen: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    let application = application.insert(&state.db).await?;

    Ok(ApiResponse::success(application))
}

/// List applications for an advert. Owner only.
#[utoipa::path(
    get,
    path = "/api/jobs/{id}/applications",
    params(("id" = i32, Path, description = "Advert ID"), Pagination),
    responses(
        (status = 200, description = "Applications", body = ApiResponse<Vec<job_application::Model>>),
        (status = 403, description = "Not the advert owner")
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn advert_applications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(advert_id): Path<i32>,
    pagination: Pagination,
) -> Result<ApiResponse<Vec<job_application::Model>>, AppError> {
    let advert = find_advert(&state, advert_id).await?;
    if advert.created_by != user_id {
        return Err(AppError::Forbidden(
            "You can only see applications for an advert created by you".to_string(),
        ));
    }

    let applications = JobApplication::find()
        .filter(job_application::Column::JobAdvertId.eq(advert.id))
        .order_by_desc(job_application::Column::CreatedAt)
        .offset(pagination.offset)
        .limit(pagination.limit)
        .all(&state.db)
        .await?;

    Ok(ApiResponse::success(applications))
}

/// Decide on an application. Owner of the advert only. A rejection sends
/// an outcome email to the applicant.
#[utoipa::path(
    post,
    path = "/api/applications/{id}/decide",
    params(("id" = i32, Path, description = "Application ID")),
    request_body = DecideRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<job_application::Model>),
        (status = 403, description = "Not the advert owner"),
        (status = 422, description = "Unknown status")
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn decide(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(application_id): Path<i32>,
    Json(payload): Json<DecideRequest>,
) -> Result<ApiResponse<job_application::Model>, AppError> {
    if !status::ALL.contains(&payload.status.as_str()) {
        return Err(AppError::Validation(format!(
            "Unknown application status: {}",
            payload.status
        )));
    }

    let application = JobApplication::find_by_id(application_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    let advert = find_advert(&state, application.job_advert_id).await?;
    if advert.created_by != user_id {
        return Err(AppError::Forbidden(
            "You can only decide on an advert created by you".to_string(),
        ));
    }

    let mut active: job_application::ActiveModel = application.into();
    active.status = Set(payload.status.clone());
    // A fresh decision becomes an unseen notification (except a move back
    // to applied)
    if payload.status != status::APPLIED {
        active.decision_seen = Set(false);
    }
    let application = active.update(&state.db).await?;

    if payload.status == status::REJECTED {
        send_fire_and_forget(
            state.mailer.as_ref(),
            &application.email,
            &format!("Application Outcome for {}", advert.title),
            &format!(
                "Dear {},\n\nThank you for your interest in the {} position at {}.\n\
                 After careful consideration we have decided not to move forward \
                 with your application.\n",
                application.name, advert.title, advert.company_name
            ),
        )
        .await;
    }

    Ok(ApiResponse::success(application))
}

/// List the caller's adverts.
#[utoipa::path(
    get,
    path = "/api/me/jobs",
    params(Pagination),
    responses(
        (status = 200, description = "My adverts", body = ApiResponse<Vec<job_advert::Model>>)
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn my_jobs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    pagination: Pagination,
) -> Result<ApiResponse<Vec<job_advert::Model>>, AppError> {
    let adverts = job_advert::Entity::find()
        .filter(job_advert::Column::CreatedBy.eq(user_id))
        .order_by_desc(job_advert::Column::CreatedAt)
        .offset(pagination.offset)
        .limit(pagination.limit)
        .all(&state.db)
        .await?;

    Ok(ApiResponse::success(adverts))
}

/// List the caller's applications (matched by account email) and mark
/// decided ones as seen.
#[utoipa::path(
    get,
    path = "/api/me/applications",
    params(Pagination),
    responses(
        (status = 200, description = "My applications", body = ApiResponse<Vec<job_application::Model>>)
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn my_applications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    pagination: Pagination,
) -> Result<ApiResponse<Vec<job_application::Model>>, AppError> {
    let account = User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let applications = JobApplication::find()
        .filter(job_application::Column::Email.eq(&account.email))
        .order_by_desc(job_application::Column::CreatedAt)
        .offset(pagination.offset)
        .limit(pagination.limit)
        .all(&state.db)
        .await?;

    // Viewing the list clears the notification badge
    JobApplication::update_many()
        .col_expr(job_application::Column::DecisionSeen, Expr::value(true))
        .filter(job_application::Column::Email.eq(&account.email))
        .filter(job_application::Column::DecisionSeen.eq(false))
        .filter(job_application::Column::Status.ne(status::APPLIED))
        .exec(&state.db)
        .await?;

    Ok(ApiResponse::success(applications))
}

/// Count of decided-but-unseen applications for the caller.
#[utoipa::path(
    get,
    path = "/api/me/notifications",
    responses(
        (status = 200, description = "Notification count", body = ApiResponse<NotificationsResponse>)
    ),
    tag = "jobs",
    security(("bearer_auth" = []))
)]
pub async fn notifications(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<NotificationsResponse>, AppError> {
    let account = User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let unseen = JobApplication::find()
        .filter(job_application::Column::Email.eq(&account.email))
        .filter(job_application::Column::DecisionSeen.eq(false))
        .filter(job_application::Column::Status.ne(status::APPLIED))
        .count(&state.db)
        .await?;

    Ok(ApiResponse::success(NotificationsResponse {
        unseen_decisions: unseen,
    }))
}

/// Keyword and location search over adverts.
#[utoipa::path(
    get,
    path = "/api/jobs/search",
    params(
        ("keyword" = Option<String>, Query, description = "Matches title, description or company"),
        ("location" = Option<String>, Query, description = "Matches location"),
        Pagination
    ),
    responses(
        (status = 200, description = "Matching adverts", body = ApiResponse<Vec<job_advert::Model>>)
    ),
    tag = "jobs"
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    pagination: Pagination,
) -> Result<ApiResponse<Vec<job_advert::Model>>, AppError> {
    let mut condition = Condition::all();

    // Case-insensitive on every backend: LIKE is case-sensitive on
    // Postgres, so both sides are lowered explicitly.
    let contains = |column: job_advert::Column, needle: &str| {
        Expr::expr(Func::lower(Expr::col(column)))
            .like(format!("%{}%", needle.to_lowercase()))
    };

    if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(contains(job_advert::Column::Title, keyword))
                .add(contains(job_advert::Column::Description, keyword))
                .add(contains(job_advert::Column::CompanyName, keyword)),
        );
    }

    if let Some(location) = query.location.as_deref().filter(|l| !l.trim().is_empty()) {
        condition = condition.add(contains(job_advert::Column::Location, location));
    }

    let adverts = job_advert::Entity::find()
        .filter(condition)
        .order_by_desc(job_advert::Column::CreatedAt)
        .offset(pagination.offset)
        .limit(pagination.limit)
        .all(&state.db)
        .await?;

    Ok(ApiResponse::success(adverts))
}

/// Site-wide statistics for the landing page.
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Site statistics", body = ApiResponse<StatsResponse>)
    ),
    tag = "jobs"
)]
pub async fn stats(State(state): State<AppState>) -> Result<ApiResponse<StatsResponse>, AppError> {
    let total_users = User::find().count(&state.db).await?;
    let total_employers = User::find()
        .filter(user::Column::IsStaff.eq(true))
        .count(&state.db)
        .await?;
    let total_job_adverts = job_advert::Entity::find().count(&state.db).await?;
    let total_applications = JobApplication::find().count(&state.db).await?;

    let interviews = JobApplication::find()
        .filter(job_application::Column::Status.eq(status::INTERVIEW))
        .count(&state.db)
        .await?;
    let success_rate = if total_applications > 0 {
        (interviews * 100 + total_applications / 2) / total_applications
    } else {
        0
    };

    Ok(ApiResponse::success(StatsResponse {
        total_users,
        total_employers,
        total_job_adverts,
        total_applications,
        success_rate,
    }))
}
