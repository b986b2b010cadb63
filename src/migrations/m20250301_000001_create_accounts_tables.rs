use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ── Create users table ──
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::IsStaff)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ── Create pending_users table (one row per email, replaced on
        //    re-registration) ──
        manager
            .create_table(
                Table::create()
                    .table(PendingUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PendingUsers::Email)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PendingUsers::PasswordHash)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingUsers::VerificationCode)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PendingUsers::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ── Create tokens table ──
        manager
            .create_table(
                Table::create()
                    .table(Tokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tokens::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tokens::UserId).integer().not_null())
                    .col(ColumnDef::new(Tokens::TokenType).string().not_null())
                    .col(ColumnDef::new(Tokens::Token).string().not_null())
                    .col(ColumnDef::new(Tokens::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // One live token per (user, type) — reissuing replaces the row
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tokens_user_id_token_type")
                    .table(Tokens::Table)
                    .col(Tokens::UserId)
                    .col(Tokens::TokenType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PendingUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    IsStaff,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum PendingUsers {
    Table,
    Email,
    PasswordHash,
    VerificationCode,
    CreatedAt,
}

#[derive(Iden)]
enum Tokens {
    Table,
    Id,
    UserId,
    TokenType,
    Token,
    CreatedAt,
}
