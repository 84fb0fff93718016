use chrono::{DateTime, Utc};
use sea_orm::sea_query::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Campaign lifecycle status
///
/// `pending → sending → {completed | partial | failed}`, with `stopped`
/// reachable from `sending` only through operator cancellation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CampaignStatus {
    /// Created, dispatch loop not yet started
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Dispatch loop in progress
    #[sea_orm(string_value = "sending")]
    Sending,
    /// All recipients delivered, zero failures
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Some failures, but at or below the systemic-failure threshold
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Majority failure, treated as systemic
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Halted by operator cancellation
    #[sea_orm(string_value = "stopped")]
    Stopped,
}

impl CampaignStatus {
    /// Terminal states are immutable: no further campaign mutation allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Partial | Self::Failed | Self::Stopped
        )
    }
}

/// Per-recipient delivery outcome
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SendStatus {
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Template variant tag carried per recipient
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecipientVariant {
    #[default]
    #[sea_orm(string_value = "a")]
    A,
    #[sea_orm(string_value = "b")]
    B,
    #[sea_orm(string_value = "c")]
    C,
}

/// Campaign aggregate - one logical bulk-send operation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Campaign {
    /// Unique identifier
    pub id: Uuid,
    /// Human-readable campaign name
    pub name: String,
    /// Subject line template ({{name}} / {{email}} placeholders)
    pub subject_template: String,
    /// Body template ({{name}} / {{email}} placeholders)
    pub body_template: String,
    /// Lifecycle status
    pub status: CampaignStatus,
    /// Size of the recipient list at creation
    pub total_recipients: i32,
    /// Recipients recorded as sent so far
    pub sent_count: i32,
    /// Recipients recorded as failed so far
    pub failed_count: i32,
    /// Set on transition to `sending`
    pub started_at: Option<DateTime<Utc>>,
    /// Set once on entering a terminal state
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// One entry of the recipient list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// Email address, unique per campaign (case-insensitive)
    pub email: String,
    /// Display name used for personalization
    #[serde(default)]
    pub name: Option<String>,
    /// Template variant tag
    #[serde(default)]
    pub variant: RecipientVariant,
    /// Optional correlation id for template personalization
    #[serde(default)]
    pub correlation_id: Option<String>,
}

/// Per-recipient delivery outcome record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSend {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub variant: RecipientVariant,
    pub correlation_id: Option<String>,
    pub status: SendStatus,
    /// Present only when the transport accepted the message
    pub provider_message_id: Option<String>,
    /// Present only when the send failed
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// DTO for creating a campaign row
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub name: String,
    pub subject_template: String,
    pub body_template: String,
    pub total_recipients: i32,
}

/// DTO for writing one send outcome to the ledger
#[derive(Debug, Clone)]
pub struct NewSend {
    pub campaign_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub variant: RecipientVariant,
    pub correlation_id: Option<String>,
    pub status: SendStatus,
    pub provider_message_id: Option<String>,
    pub error_message: Option<String>,
}

/// Request DTO for triggering a campaign
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartCampaign {
    #[validate(length(min = 1, max = 255))]
    pub campaign_name: String,
    #[validate(length(min = 1, max = 255))]
    pub subject_template: String,
    #[validate(length(min = 1))]
    pub body_template: String,
    pub recipients: Vec<Recipient>,
}

/// Immediate response to a campaign trigger, before dispatch completes
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartedCampaign {
    pub campaign_id: Uuid,
    pub status: CampaignStatus,
    pub total_recipients: i32,
}

/// Read-only progress view polled by operators
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignProgress {
    pub id: Uuid,
    pub name: String,
    pub status: CampaignStatus,
    pub sent_count: i32,
    pub failed_count: i32,
    pub total_recipients: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Campaign> for CampaignProgress {
    fn from(campaign: Campaign) -> Self {
        Self {
            id: campaign.id,
            name: campaign.name,
            status: campaign.status,
            sent_count: campaign.sent_count,
            failed_count: campaign.failed_count,
            total_recipients: campaign.total_recipients,
            started_at: campaign.started_at,
            completed_at: campaign.completed_at,
            created_at: campaign.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!CampaignStatus::Pending.is_terminal());
        assert!(!CampaignStatus::Sending.is_terminal());
        assert!(CampaignStatus::Completed.is_terminal());
        assert!(CampaignStatus::Partial.is_terminal());
        assert!(CampaignStatus::Failed.is_terminal());
        assert!(CampaignStatus::Stopped.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&CampaignStatus::Sending).unwrap();
        assert_eq!(json, "\"sending\"");
        assert_eq!(CampaignStatus::Partial.to_string(), "partial");
    }

    #[test]
    fn test_status_maps_to_database_strings() {
        use sea_orm::ActiveEnum;

        assert_eq!(CampaignStatus::Sending.to_value(), "sending");
        assert_eq!(
            CampaignStatus::try_from_value(&"stopped".to_string()).unwrap(),
            CampaignStatus::Stopped
        );
        assert_eq!(SendStatus::Failed.to_value(), "failed");
        assert_eq!(RecipientVariant::B.to_value(), "b");
    }

    #[test]
    fn test_recipient_defaults() {
        let recipient: Recipient =
            serde_json::from_str(r#"{"email": "anna@example.com"}"#).unwrap();
        assert_eq!(recipient.email, "anna@example.com");
        assert_eq!(recipient.variant, RecipientVariant::A);
        assert!(recipient.name.is_none());
        assert!(recipient.correlation_id.is_none());
    }
}
