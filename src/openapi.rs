use utoipa::OpenApi;

use crate::controllers::accounts::{
    AuthResponse, LoginRequest, MessageResponse, RegisterRequest, RegisterResponse,
    ResetConfirmRequest, ResetLinkResponse, ResetRequestPayload, VerifyRequest,
};
use crate::controllers::jobs::{
    AdvertPayload, ApplyRequest, DecideRequest, NotificationsResponse, StatsResponse,
};
use crate::models::user::UserResponse;

/// Auto-generated OpenAPI documentation for TalentBase.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TalentBase API",
        version = "0.1.0",
        description = "Job board with verified accounts: email verification codes, \
                       password resets, job adverts and applications."
    ),
    paths(
        crate::controllers::accounts::register,
        crate::controllers::accounts::verify,
        crate::controllers::accounts::login,
        crate::controllers::accounts::password_reset_request,
        crate::controllers::accounts::password_reset_validate,
        crate::controllers::accounts::password_reset_confirm,
        crate::controllers::jobs::create_advert,
        crate::controllers::jobs::list_adverts,
        crate::controllers::jobs::get_advert,
        crate::controllers::jobs::update_advert,
        crate::controllers::jobs::delete_advert,
        crate::controllers::jobs::apply,
        crate::controllers::jobs::advert_applications,
        crate::controllers::jobs::decide,
        crate::controllers::jobs::my_jobs,
        crate::controllers::jobs::my_applications,
        crate::controllers::jobs::notifications,
        crate::controllers::jobs::search,
        crate::controllers::jobs::stats,
    ),
    components(
        schemas(
            RegisterRequest,
            RegisterResponse,
            VerifyRequest,
            LoginRequest,
            AuthResponse,
            ResetRequestPayload,
            ResetLinkResponse,
            ResetConfirmRequest,
            MessageResponse,
            UserResponse,
            AdvertPayload,
            ApplyRequest,
            DecideRequest,
            NotificationsResponse,
            StatsResponse,
        )
    ),
    tags(
        (name = "accounts", description = "Registration, verification, login and password reset"),
        (name = "jobs", description = "Job adverts and applications")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add JWT Bearer security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
