use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::entity::{campaign, send};
use crate::error::{CampaignError, CampaignResult};
use crate::models::{Campaign, CampaignSend, CampaignStatus, NewCampaign, NewSend};
use crate::repository::CampaignRepository;

/// PostgreSQL-backed campaign ledger
pub struct PgCampaignRepository {
    db: DatabaseConnection,
}

impl PgCampaignRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CampaignRepository for PgCampaignRepository {
    async fn create(&self, input: NewCampaign) -> CampaignResult<Campaign> {
        let active_model: campaign::ActiveModel = input.into();
        let model = campaign::Entity::insert(active_model)
            .exec_with_returning(&self.db)
            .await?;

        tracing::info!(campaign_id = %model.id, total = model.total_recipients, "created campaign");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> CampaignResult<Option<Campaign>> {
        let model = campaign::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list_recent(&self, limit: u64) -> CampaignResult<Vec<Campaign>> {
        let models = campaign::Entity::find()
            .order_by_desc(campaign::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn mark_sending(&self, id: Uuid) -> CampaignResult<()> {
        let result = campaign::Entity::update_many()
            .col_expr(campaign::Column::Status, Expr::value(CampaignStatus::Sending))
            .col_expr(
                campaign::Column::StartedAt,
                Expr::value(Some(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now()))),
            )
            .filter(campaign::Column::Id.eq(id))
            .filter(campaign::Column::Status.eq(CampaignStatus::Pending))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(CampaignError::AlreadyFinished(id));
        }
        Ok(())
    }

    async fn update_counters(&self, id: Uuid, sent: i32, failed: i32) -> CampaignResult<()> {
        campaign::Entity::update_many()
            .col_expr(campaign::Column::SentCount, Expr::value(sent))
            .col_expr(campaign::Column::FailedCount, Expr::value(failed))
            .filter(campaign::Column::Id.eq(id))
            .filter(campaign::Column::Status.eq(CampaignStatus::Sending))
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn finalize(
        &self,
        id: Uuid,
        status: CampaignStatus,
        sent: i32,
        failed: i32,
    ) -> CampaignResult<()> {
        // Guarded on status so the terminal transition happens exactly once;
        // a campaign already terminal is never mutated again.
        let result = campaign::Entity::update_many()
            .col_expr(campaign::Column::Status, Expr::value(status))
            .col_expr(campaign::Column::SentCount, Expr::value(sent))
            .col_expr(campaign::Column::FailedCount, Expr::value(failed))
            .col_expr(
                campaign::Column::CompletedAt,
                Expr::value(Some(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now()))),
            )
            .filter(campaign::Column::Id.eq(id))
            .filter(campaign::Column::Status.eq(CampaignStatus::Sending))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(CampaignError::AlreadyFinished(id));
        }

        tracing::info!(campaign_id = %id, status = %status, sent, failed, "campaign finalized");
        Ok(())
    }

    async fn upsert_sends(&self, sends: Vec<NewSend>) -> CampaignResult<()> {
        if sends.is_empty() {
            return Ok(());
        }

        let models: Vec<send::ActiveModel> = sends.into_iter().map(Into::into).collect();

        send::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([send::Column::CampaignId, send::Column::Email])
                    .update_columns([
                        send::Column::Name,
                        send::Column::Variant,
                        send::Column::CorrelationId,
                        send::Column::Status,
                        send::Column::ProviderMessageId,
                        send::Column::ErrorMessage,
                        send::Column::SentAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn list_sends(&self, campaign_id: Uuid) -> CampaignResult<Vec<CampaignSend>> {
        let models = send::Entity::find()
            .filter(send::Column::CampaignId.eq(campaign_id))
            .order_by_asc(send::Column::SentAt)
            .order_by_asc(send::Column::Email)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
