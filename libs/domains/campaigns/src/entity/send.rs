use crate::models::{CampaignSend, NewSend, RecipientVariant, SendStatus};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the campaign_sends ledger table
///
/// One row per (campaign, recipient); the unique index on
/// `(campaign_id, email)` backs the idempotent upsert.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "campaign_sends")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub variant: RecipientVariant,
    pub correlation_id: Option<String>,
    pub status: SendStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub provider_message_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
    pub sent_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::campaign::Entity",
        from = "Column::CampaignId",
        to = "super::campaign::Column::Id"
    )]
    Campaign,
}

impl Related<super::campaign::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CampaignSend {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            campaign_id: model.campaign_id,
            email: model.email,
            name: model.name,
            variant: model.variant,
            correlation_id: model.correlation_id,
            status: model.status,
            provider_message_id: model.provider_message_id,
            error_message: model.error_message,
            sent_at: model.sent_at.into(),
        }
    }
}

impl From<NewSend> for ActiveModel {
    fn from(input: NewSend) -> Self {
        ActiveModel {
            id: Set(Uuid::now_v7()),
            campaign_id: Set(input.campaign_id),
            email: Set(input.email),
            name: Set(input.name),
            variant: Set(input.variant),
            correlation_id: Set(input.correlation_id),
            status: Set(input.status),
            provider_message_id: Set(input.provider_message_id),
            error_message: Set(input.error_message),
            sent_at: Set(chrono::Utc::now().into()),
        }
    }
}
