use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ── Create job_adverts table ──
        manager
            .create_table(
                Table::create()
                    .table(JobAdverts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobAdverts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobAdverts::Title).string().not_null())
                    .col(ColumnDef::new(JobAdverts::CompanyName).string().not_null())
                    .col(ColumnDef::new(JobAdverts::Location).string().not_null())
                    .col(ColumnDef::new(JobAdverts::Description).text().not_null())
                    .col(ColumnDef::new(JobAdverts::ExpiresAt).timestamp().null())
                    .col(ColumnDef::new(JobAdverts::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(JobAdverts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(JobAdverts::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ── Create job_applications table ──
        manager
            .create_table(
                Table::create()
                    .table(JobApplications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobApplications::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(JobApplications::JobAdvertId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(JobApplications::Name).string().not_null())
                    .col(ColumnDef::new(JobApplications::Email).string().not_null())
                    .col(
                        ColumnDef::new(JobApplications::Status)
                            .string()
                            .not_null()
                            .default("applied"),
                    )
                    .col(
                        ColumnDef::new(JobApplications::DecisionSeen)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(JobApplications::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_job_applications_advert_id")
                    .table(JobApplications::Table)
                    .col(JobApplications::JobAdvertId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobApplications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobAdverts::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum JobAdverts {
    Table,
    Id,
    Title,
    CompanyName,
    Location,
    Description,
    ExpiresAt,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum JobApplications {
    Table,
    Id,
    JobAdvertId,
    Name,
    Email,
    Status,
    DecisionSeen,
    CreatedAt,
}
