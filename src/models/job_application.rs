use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Application lifecycle statuses.
pub mod status {
    pub const APPLIED: &str = "applied";
    pub const INTERVIEW: &str = "interview";
    pub const REJECTED: &str = "rejected";

    /// All statuses an employer can set.
    pub const ALL: [&str; 3] = [APPLIED, INTERVIEW, REJECTED];
}

/// An application submitted against a job advert.
///
/// Applications are keyed to the applicant's email, not an account —
/// visitors may apply without registering. `decision_seen` drives the
/// notification badge: it is cleared whenever an employer changes the
/// status away from `applied`, and set again once the applicant views
/// their applications.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "job_applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub job_advert_id: i32,

    pub name: String,

    pub email: String,

    pub status: String,

    pub decision_seen: bool,

    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
