use crate::models::{Campaign, CampaignStatus, NewCampaign};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the campaigns table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub subject_template: String,
    #[sea_orm(column_type = "Text")]
    pub body_template: String,
    pub status: CampaignStatus,
    pub total_recipients: i32,
    pub sent_count: i32,
    pub failed_count: i32,
    pub started_at: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::send::Entity")]
    Sends,
}

impl Related<super::send::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sends.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Campaign {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            subject_template: model.subject_template,
            body_template: model.body_template,
            status: model.status,
            total_recipients: model.total_recipients,
            sent_count: model.sent_count,
            failed_count: model.failed_count,
            started_at: model.started_at.map(Into::into),
            completed_at: model.completed_at.map(Into::into),
            created_at: model.created_at.into(),
        }
    }
}

impl From<NewCampaign> for ActiveModel {
    fn from(input: NewCampaign) -> Self {
        ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            subject_template: Set(input.subject_template),
            body_template: Set(input.body_template),
            status: Set(CampaignStatus::Pending),
            total_recipients: Set(input.total_recipients),
            sent_count: Set(0),
            failed_count: Set(0),
            started_at: Set(None),
            completed_at: Set(None),
            created_at: Set(chrono::Utc::now().into()),
        }
    }
}
