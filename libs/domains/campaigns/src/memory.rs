use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{CampaignError, CampaignResult};
use crate::models::{Campaign, CampaignSend, CampaignStatus, NewCampaign, NewSend};
use crate::repository::CampaignRepository;

/// In-memory campaign ledger
///
/// Backs handler and integration tests without a running database, and
/// can inject upsert failures to exercise best-effort bookkeeping.
#[derive(Default)]
pub struct InMemoryCampaignRepository {
    campaigns: Mutex<HashMap<Uuid, Campaign>>,
    // Vec keeps ledger rows in write order for deterministic listings.
    sends: Mutex<Vec<CampaignSend>>,
    fail_next_upserts: AtomicUsize,
}

impl InMemoryCampaignRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` upsert_sends calls fail with a database error
    pub fn fail_next_upserts(&self, count: usize) {
        self.fail_next_upserts.store(count, Ordering::SeqCst);
    }

    /// Number of campaign rows currently stored
    pub async fn campaign_count(&self) -> usize {
        self.campaigns.lock().await.len()
    }
}

#[async_trait]
impl CampaignRepository for InMemoryCampaignRepository {
    async fn create(&self, input: NewCampaign) -> CampaignResult<Campaign> {
        let campaign = Campaign {
            id: Uuid::now_v7(),
            name: input.name,
            subject_template: input.subject_template,
            body_template: input.body_template,
            status: CampaignStatus::Pending,
            total_recipients: input.total_recipients,
            sent_count: 0,
            failed_count: 0,
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
        };

        self.campaigns
            .lock()
            .await
            .insert(campaign.id, campaign.clone());
        Ok(campaign)
    }

    async fn get_by_id(&self, id: Uuid) -> CampaignResult<Option<Campaign>> {
        Ok(self.campaigns.lock().await.get(&id).cloned())
    }

    async fn list_recent(&self, limit: u64) -> CampaignResult<Vec<Campaign>> {
        let mut campaigns: Vec<Campaign> =
            self.campaigns.lock().await.values().cloned().collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        campaigns.truncate(limit as usize);
        Ok(campaigns)
    }

    async fn mark_sending(&self, id: Uuid) -> CampaignResult<()> {
        let mut campaigns = self.campaigns.lock().await;
        let campaign = campaigns
            .get_mut(&id)
            .ok_or(CampaignError::NotFound(id))?;

        if campaign.status != CampaignStatus::Pending {
            return Err(CampaignError::AlreadyFinished(id));
        }

        campaign.status = CampaignStatus::Sending;
        campaign.started_at = Some(Utc::now());
        Ok(())
    }

    async fn update_counters(&self, id: Uuid, sent: i32, failed: i32) -> CampaignResult<()> {
        let mut campaigns = self.campaigns.lock().await;
        if let Some(campaign) = campaigns.get_mut(&id) {
            if campaign.status == CampaignStatus::Sending {
                campaign.sent_count = sent;
                campaign.failed_count = failed;
            }
        }
        Ok(())
    }

    async fn finalize(
        &self,
        id: Uuid,
        status: CampaignStatus,
        sent: i32,
        failed: i32,
    ) -> CampaignResult<()> {
        let mut campaigns = self.campaigns.lock().await;
        let campaign = campaigns
            .get_mut(&id)
            .ok_or(CampaignError::NotFound(id))?;

        if campaign.status != CampaignStatus::Sending {
            return Err(CampaignError::AlreadyFinished(id));
        }

        campaign.status = status;
        campaign.sent_count = sent;
        campaign.failed_count = failed;
        campaign.completed_at = Some(Utc::now());
        Ok(())
    }

    async fn upsert_sends(&self, sends: Vec<NewSend>) -> CampaignResult<()> {
        let remaining = self.fail_next_upserts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next_upserts.store(remaining - 1, Ordering::SeqCst);
            return Err(CampaignError::Database("injected upsert failure".into()));
        }

        let mut stored = self.sends.lock().await;
        for input in sends {
            let existing = stored
                .iter_mut()
                .find(|s| s.campaign_id == input.campaign_id && s.email == input.email);

            match existing {
                Some(row) => {
                    row.name = input.name;
                    row.variant = input.variant;
                    row.correlation_id = input.correlation_id;
                    row.status = input.status;
                    row.provider_message_id = input.provider_message_id;
                    row.error_message = input.error_message;
                    row.sent_at = Utc::now();
                }
                None => stored.push(CampaignSend {
                    id: Uuid::now_v7(),
                    campaign_id: input.campaign_id,
                    email: input.email,
                    name: input.name,
                    variant: input.variant,
                    correlation_id: input.correlation_id,
                    status: input.status,
                    provider_message_id: input.provider_message_id,
                    error_message: input.error_message,
                    sent_at: Utc::now(),
                }),
            }
        }
        Ok(())
    }

    async fn list_sends(&self, campaign_id: Uuid) -> CampaignResult<Vec<CampaignSend>> {
        Ok(self
            .sends
            .lock()
            .await
            .iter()
            .filter(|s| s.campaign_id == campaign_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecipientVariant, SendStatus};

    fn new_send(campaign_id: Uuid, email: &str, status: SendStatus) -> NewSend {
        NewSend {
            campaign_id,
            email: email.to_string(),
            name: None,
            variant: RecipientVariant::A,
            correlation_id: None,
            status,
            provider_message_id: None,
            error_message: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_recipient() {
        let repo = InMemoryCampaignRepository::new();
        let campaign_id = Uuid::now_v7();

        repo.upsert_sends(vec![new_send(campaign_id, "a@example.com", SendStatus::Sent)])
            .await
            .unwrap();
        repo.upsert_sends(vec![new_send(campaign_id, "a@example.com", SendStatus::Sent)])
            .await
            .unwrap();

        let sends = repo.list_sends(campaign_id).await.unwrap();
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].status, SendStatus::Sent);
    }

    #[tokio::test]
    async fn test_finalize_rejects_second_transition() {
        let repo = InMemoryCampaignRepository::new();
        let campaign = repo
            .create(NewCampaign {
                name: "n".into(),
                subject_template: "s".into(),
                body_template: "b".into(),
                total_recipients: 1,
            })
            .await
            .unwrap();

        repo.mark_sending(campaign.id).await.unwrap();
        repo.finalize(campaign.id, CampaignStatus::Completed, 1, 0)
            .await
            .unwrap();

        let err = repo
            .finalize(campaign.id, CampaignStatus::Failed, 0, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CampaignError::AlreadyFinished(_)));

        let stored = repo.get_by_id(campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Completed);
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let repo = InMemoryCampaignRepository::new();
        repo.fail_next_upserts(1);

        let campaign_id = Uuid::now_v7();
        let send = new_send(campaign_id, "a@example.com", SendStatus::Sent);

        assert!(repo.upsert_sends(vec![send.clone()]).await.is_err());
        assert!(repo.upsert_sends(vec![send]).await.is_ok());
        assert_eq!(repo.list_sends(campaign_id).await.unwrap().len(), 1);
    }
}
