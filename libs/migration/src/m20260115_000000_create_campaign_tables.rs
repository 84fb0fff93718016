use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the campaigns table
        manager
            .create_table(
                Table::create()
                    .table(Campaigns::Table)
                    .if_not_exists()
                    .col(pk_uuid(Campaigns::Id))
                    .col(
                        ColumnDef::new(Campaigns::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Campaigns::SubjectTemplate)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(text(Campaigns::BodyTemplate))
                    .col(
                        ColumnDef::new(Campaigns::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Campaigns::TotalRecipients)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Campaigns::SentCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Campaigns::FailedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp_with_time_zone_null(Campaigns::StartedAt))
                    .col(timestamp_with_time_zone_null(Campaigns::CompletedAt))
                    .col(
                        timestamp_with_time_zone(Campaigns::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create the campaign_sends table
        manager
            .create_table(
                Table::create()
                    .table(CampaignSends::Table)
                    .if_not_exists()
                    .col(pk_uuid(CampaignSends::Id))
                    .col(ColumnDef::new(CampaignSends::CampaignId).uuid().not_null())
                    .col(
                        ColumnDef::new(CampaignSends::Email)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CampaignSends::Name)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CampaignSends::Variant)
                            .string_len(8)
                            .not_null()
                            .default("a"),
                    )
                    .col(
                        ColumnDef::new(CampaignSends::CorrelationId)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CampaignSends::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(text_null(CampaignSends::ProviderMessageId))
                    .col(text_null(CampaignSends::ErrorMessage))
                    .col(
                        timestamp_with_time_zone(CampaignSends::SentAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_campaign_sends_campaign")
                            .from(CampaignSends::Table, CampaignSends::CampaignId)
                            .to(Campaigns::Table, Campaigns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One ledger row per recipient per campaign, so re-delivery of a
        // chunk after a crash overwrites instead of duplicating.
        manager
            .create_index(
                Index::create()
                    .name("uq_campaign_sends_campaign_email")
                    .table(CampaignSends::Table)
                    .col(CampaignSends::CampaignId)
                    .col(CampaignSends::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_campaign_sends_campaign_id")
                    .table(CampaignSends::Table)
                    .col(CampaignSends::CampaignId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_campaign_sends_status")
                    .table(CampaignSends::Table)
                    .col(CampaignSends::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_campaigns_status")
                    .table(Campaigns::Table)
                    .col(Campaigns::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_campaigns_created_at")
                    .table(Campaigns::Table)
                    .col(Campaigns::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CampaignSends::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Campaigns::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Campaigns {
    Table,
    Id,
    Name,
    SubjectTemplate,
    BodyTemplate,
    Status,
    TotalRecipients,
    SentCount,
    FailedCount,
    StartedAt,
    CompletedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CampaignSends {
    Table,
    Id,
    CampaignId,
    Email,
    Name,
    Variant,
    CorrelationId,
    Status,
    ProviderMessageId,
    ErrorMessage,
    SentAt,
}
