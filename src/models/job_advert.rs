use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A job advert posted by an employer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "job_adverts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    pub company_name: String,

    pub location: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Optional closing date; adverts past it are still listed but shown
    /// as expired by clients
    pub expires_at: Option<NaiveDateTime>,

    /// Owning user — only the creator may update, delete or review
    /// applications
    pub created_by: i32,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
