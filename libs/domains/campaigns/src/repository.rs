use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CampaignResult;
use crate::models::{Campaign, CampaignSend, CampaignStatus, NewCampaign, NewSend};

/// Repository trait for the campaign ledger
///
/// One Campaign row per bulk send plus one Send row per recipient. While
/// a campaign is `sending` its rows are written only by the dispatcher
/// task driving that campaign, so no cross-task locking is needed here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Create a new campaign row in `pending` state
    async fn create(&self, input: NewCampaign) -> CampaignResult<Campaign>;

    /// Get a campaign by ID
    async fn get_by_id(&self, id: Uuid) -> CampaignResult<Option<Campaign>>;

    /// List the most recently created campaigns
    async fn list_recent(&self, limit: u64) -> CampaignResult<Vec<Campaign>>;

    /// Transition `pending → sending` and set `started_at`
    ///
    /// Fails with `AlreadyFinished` when the campaign is not `pending`.
    async fn mark_sending(&self, id: Uuid) -> CampaignResult<()>;

    /// Set the running counters while the campaign is `sending`
    async fn update_counters(&self, id: Uuid, sent: i32, failed: i32) -> CampaignResult<()>;

    /// Transition to a terminal status with final counters, exactly once
    ///
    /// Sets `completed_at`; fails with `AlreadyFinished` when the
    /// campaign is no longer `sending`.
    async fn finalize(
        &self,
        id: Uuid,
        status: CampaignStatus,
        sent: i32,
        failed: i32,
    ) -> CampaignResult<()>;

    /// Record send outcomes, idempotent on `(campaign_id, email)`
    async fn upsert_sends(&self, sends: Vec<NewSend>) -> CampaignResult<()>;

    /// List per-recipient outcomes for a campaign
    async fn list_sends(&self, campaign_id: Uuid) -> CampaignResult<Vec<CampaignSend>>;
}

#[async_trait]
impl<R: CampaignRepository + ?Sized> CampaignRepository for std::sync::Arc<R> {
    async fn create(&self, input: NewCampaign) -> CampaignResult<Campaign> {
        (**self).create(input).await
    }

    async fn get_by_id(&self, id: Uuid) -> CampaignResult<Option<Campaign>> {
        (**self).get_by_id(id).await
    }

    async fn list_recent(&self, limit: u64) -> CampaignResult<Vec<Campaign>> {
        (**self).list_recent(limit).await
    }

    async fn mark_sending(&self, id: Uuid) -> CampaignResult<()> {
        (**self).mark_sending(id).await
    }

    async fn update_counters(&self, id: Uuid, sent: i32, failed: i32) -> CampaignResult<()> {
        (**self).update_counters(id, sent, failed).await
    }

    async fn finalize(
        &self,
        id: Uuid,
        status: CampaignStatus,
        sent: i32,
        failed: i32,
    ) -> CampaignResult<()> {
        (**self).finalize(id, status, sent, failed).await
    }

    async fn upsert_sends(&self, sends: Vec<NewSend>) -> CampaignResult<()> {
        (**self).upsert_sends(sends).await
    }

    async fn list_sends(&self, campaign_id: Uuid) -> CampaignResult<Vec<CampaignSend>> {
        (**self).list_sends(campaign_id).await
    }
}
