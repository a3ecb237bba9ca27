//! Initial schema: identities, one-time codes, sessions, tenancy and articles.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_identities(manager).await?;
        create_magic_links(manager).await?;
        create_sessions(manager).await?;
        create_accounts(manager).await?;
        create_users(manager).await?;
        create_subscriptions(manager).await?;
        create_articles(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Articles::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subscriptions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MagicLinks::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Identities::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

async fn create_identities(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Identities::Table)
                .if_not_exists()
                .col(ColumnDef::new(Identities::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Identities::EmailAddress).string().not_null())
                .col(
                    ColumnDef::new(Identities::Staff)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(timestamp(Identities::CreatedAt))
                .col(timestamp(Identities::UpdatedAt))
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_identities_email_address")
                .table(Identities::Table)
                .col(Identities::EmailAddress)
                .unique()
                .to_owned(),
        )
        .await
}

async fn create_magic_links(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(MagicLinks::Table)
                .if_not_exists()
                .col(ColumnDef::new(MagicLinks::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(MagicLinks::IdentityId).uuid().not_null())
                .col(ColumnDef::new(MagicLinks::Code).string_len(6).not_null())
                .col(
                    ColumnDef::new(MagicLinks::Purpose)
                        .string()
                        .not_null()
                        .default("sign_in"),
                )
                .col(timestamp(MagicLinks::ExpiresAt))
                .col(timestamp(MagicLinks::CreatedAt))
                .foreign_key(
                    ForeignKey::create()
                        .from(MagicLinks::Table, MagicLinks::IdentityId)
                        .to(Identities::Table, Identities::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    // Global uniqueness keeps lookup by code unambiguous.
    manager
        .create_index(
            Index::create()
                .name("idx_magic_links_code")
                .table(MagicLinks::Table)
                .col(MagicLinks::Code)
                .unique()
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_magic_links_expires_at")
                .table(MagicLinks::Table)
                .col(MagicLinks::ExpiresAt)
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_magic_links_identity")
                .table(MagicLinks::Table)
                .col(MagicLinks::IdentityId)
                .to_owned(),
        )
        .await
}

async fn create_sessions(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Sessions::Table)
                .if_not_exists()
                .col(ColumnDef::new(Sessions::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Sessions::IdentityId).uuid().not_null())
                .col(ColumnDef::new(Sessions::IpAddress).string())
                .col(ColumnDef::new(Sessions::UserAgent).string_len(500))
                .col(timestamp(Sessions::CreatedAt))
                .foreign_key(
                    ForeignKey::create()
                        .from(Sessions::Table, Sessions::IdentityId)
                        .to(Identities::Table, Identities::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_sessions_identity")
                .table(Sessions::Table)
                .col(Sessions::IdentityId)
                .to_owned(),
        )
        .await
}

async fn create_accounts(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Accounts::Table)
                .if_not_exists()
                .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Accounts::Name).string().not_null())
                .col(timestamp(Accounts::CreatedAt))
                .col(timestamp(Accounts::UpdatedAt))
                .to_owned(),
        )
        .await
}

async fn create_users(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Users::Table)
                .if_not_exists()
                .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Users::AccountId).uuid().not_null())
                .col(ColumnDef::new(Users::IdentityId).uuid())
                .col(ColumnDef::new(Users::Name).string().not_null())
                .col(
                    ColumnDef::new(Users::Role)
                        .string()
                        .not_null()
                        .default("member"),
                )
                .col(
                    ColumnDef::new(Users::Active)
                        .boolean()
                        .not_null()
                        .default(true),
                )
                .col(timestamp(Users::CreatedAt))
                .col(timestamp(Users::UpdatedAt))
                .foreign_key(
                    ForeignKey::create()
                        .from(Users::Table, Users::AccountId)
                        .to(Accounts::Table, Accounts::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .from(Users::Table, Users::IdentityId)
                        .to(Identities::Table, Identities::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                )
                .to_owned(),
        )
        .await?;

    // NULL identity ids (deactivated rows) never collide.
    manager
        .create_index(
            Index::create()
                .name("idx_users_account_identity")
                .table(Users::Table)
                .col(Users::AccountId)
                .col(Users::IdentityId)
                .unique()
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_users_account_role")
                .table(Users::Table)
                .col(Users::AccountId)
                .col(Users::Role)
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_users_identity")
                .table(Users::Table)
                .col(Users::IdentityId)
                .to_owned(),
        )
        .await
}

async fn create_subscriptions(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Subscriptions::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Subscriptions::Id)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(Subscriptions::AccountId).uuid().not_null())
                .col(
                    ColumnDef::new(Subscriptions::Status)
                        .string()
                        .not_null()
                        .default("trialing"),
                )
                .col(
                    ColumnDef::new(Subscriptions::Plan)
                        .string()
                        .not_null()
                        .default("individual"),
                )
                .col(
                    ColumnDef::new(Subscriptions::SeatLimit)
                        .integer()
                        .not_null()
                        .default(1)
                        .check(Expr::col(Subscriptions::SeatLimit).gt(0)),
                )
                .col(
                    ColumnDef::new(Subscriptions::SeatsUsed)
                        .integer()
                        .not_null()
                        .default(1)
                        .check(Expr::col(Subscriptions::SeatsUsed).gte(0)),
                )
                .col(ColumnDef::new(Subscriptions::TrialEndsAt).timestamp_with_time_zone())
                .col(ColumnDef::new(Subscriptions::CurrentPeriodEndsAt).timestamp_with_time_zone())
                .col(timestamp(Subscriptions::CreatedAt))
                .col(timestamp(Subscriptions::UpdatedAt))
                .foreign_key(
                    ForeignKey::create()
                        .from(Subscriptions::Table, Subscriptions::AccountId)
                        .to(Accounts::Table, Accounts::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_subscriptions_account")
                .table(Subscriptions::Table)
                .col(Subscriptions::AccountId)
                .unique()
                .to_owned(),
        )
        .await
}

async fn create_articles(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Articles::Table)
                .if_not_exists()
                .col(ColumnDef::new(Articles::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Articles::AccountId).uuid().not_null())
                .col(ColumnDef::new(Articles::UserId).uuid().not_null())
                .col(ColumnDef::new(Articles::Title).string().not_null())
                .col(ColumnDef::new(Articles::Body).text().not_null())
                .col(
                    ColumnDef::new(Articles::Published)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(ColumnDef::new(Articles::PublishedAt).timestamp_with_time_zone())
                .col(timestamp(Articles::CreatedAt))
                .col(timestamp(Articles::UpdatedAt))
                .foreign_key(
                    ForeignKey::create()
                        .from(Articles::Table, Articles::AccountId)
                        .to(Accounts::Table, Accounts::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .from(Articles::Table, Articles::UserId)
                        .to(Users::Table, Users::Id),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_articles_account_created")
                .table(Articles::Table)
                .col(Articles::AccountId)
                .col(Articles::CreatedAt)
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_articles_account_published")
                .table(Articles::Table)
                .col(Articles::AccountId)
                .col(Articles::Published)
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum Identities {
    Table,
    Id,
    EmailAddress,
    Staff,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MagicLinks {
    Table,
    Id,
    IdentityId,
    Code,
    Purpose,
    ExpiresAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Sessions {
    Table,
    Id,
    IdentityId,
    IpAddress,
    UserAgent,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    AccountId,
    IdentityId,
    Name,
    Role,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    Id,
    AccountId,
    Status,
    Plan,
    SeatLimit,
    SeatsUsed,
    TrialEndsAt,
    CurrentPeriodEndsAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Articles {
    Table,
    Id,
    AccountId,
    UserId,
    Title,
    Body,
    Published,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}
