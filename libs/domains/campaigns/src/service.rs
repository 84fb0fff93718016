use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::dispatch::{CampaignDispatcher, DispatchConfig, DispatchRegistry};
use crate::error::{CampaignError, CampaignResult};
use crate::models::{
    CampaignProgress, CampaignSend, CampaignStatus, NewCampaign, Recipient, StartCampaign,
    StartedCampaign,
};
use crate::repository::CampaignRepository;
use crate::transport::MailTransport;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Service layer for campaign dispatch
///
/// Validates trigger requests, creates the campaign row, and hands the
/// dispatch loop off to a detached task that outlives the request.
#[derive(Clone)]
pub struct CampaignService<R, T> {
    repository: Arc<R>,
    transport: Arc<T>,
    config: DispatchConfig,
    registry: DispatchRegistry,
}

impl<R, T> CampaignService<R, T>
where
    R: CampaignRepository + 'static,
    T: MailTransport + 'static,
{
    /// Create the service, checking the chunk size against the
    /// transport's batch ceiling once up front.
    pub fn new(repository: R, transport: T, config: DispatchConfig) -> CampaignResult<Self> {
        if config.chunk_size == 0 {
            return Err(CampaignError::Validation(
                "chunk size must be positive".to_string(),
            ));
        }

        let batch_limit = transport.batch_limit();
        if config.chunk_size > batch_limit {
            return Err(CampaignError::ChunkSizeTooLarge {
                chunk_size: config.chunk_size,
                batch_limit,
            });
        }

        Ok(Self {
            repository: Arc::new(repository),
            transport: Arc::new(transport),
            config,
            registry: DispatchRegistry::new(),
        })
    }

    /// Validate a trigger request and start dispatching in the background
    ///
    /// Returns as soon as the campaign row exists and the dispatch task
    /// is spawned; any validation failure rejects the request before a
    /// row is created.
    #[instrument(skip(self, input), fields(campaign_name = %input.campaign_name))]
    pub async fn start_campaign(&self, input: StartCampaign) -> CampaignResult<StartedCampaign> {
        input
            .validate()
            .map_err(|e| CampaignError::Validation(e.to_string()))?;

        let recipients = self.normalize_recipients(input.recipients)?;
        let total_recipients = recipients.len() as i32;

        let campaign = self
            .repository
            .create(NewCampaign {
                name: input.campaign_name,
                subject_template: input.subject_template.clone(),
                body_template: input.body_template.clone(),
                total_recipients,
            })
            .await?;

        let cancel_flag = self.registry.register(campaign.id);
        let dispatcher = CampaignDispatcher::new(
            Arc::clone(&self.repository),
            Arc::clone(&self.transport),
            self.config.clone(),
            campaign.id,
            input.subject_template,
            input.body_template,
            recipients,
            cancel_flag,
        );

        // Detached: the loop runs to a terminal state regardless of
        // what happens to the request that triggered it.
        let registry = self.registry.clone();
        let campaign_id = campaign.id;
        tokio::spawn(async move {
            dispatcher.run().await;
            registry.finish(campaign_id);
        });

        Ok(StartedCampaign {
            campaign_id: campaign.id,
            status: CampaignStatus::Sending,
            total_recipients,
        })
    }

    /// Progress view for one campaign
    #[instrument(skip(self), fields(campaign_id = %id))]
    pub async fn get_progress(&self, id: Uuid) -> CampaignResult<CampaignProgress> {
        self.repository
            .get_by_id(id)
            .await?
            .map(Into::into)
            .ok_or(CampaignError::NotFound(id))
    }

    /// Most recently created campaigns
    pub async fn list_campaigns(&self, limit: u64) -> CampaignResult<Vec<CampaignProgress>> {
        let campaigns = self.repository.list_recent(limit).await?;
        Ok(campaigns.into_iter().map(Into::into).collect())
    }

    /// Per-recipient outcomes for one campaign
    #[instrument(skip(self), fields(campaign_id = %id))]
    pub async fn list_sends(&self, id: Uuid) -> CampaignResult<Vec<CampaignSend>> {
        if self.repository.get_by_id(id).await?.is_none() {
            return Err(CampaignError::NotFound(id));
        }
        self.repository.list_sends(id).await
    }

    /// Request cancellation of a running campaign
    ///
    /// The dispatch loop observes the flag at its next chunk boundary;
    /// the in-flight chunk completes first.
    #[instrument(skip(self), fields(campaign_id = %id))]
    pub async fn cancel(&self, id: Uuid) -> CampaignResult<()> {
        if self.registry.cancel(id) {
            tracing::info!("cancellation requested");
            return Ok(());
        }

        match self.repository.get_by_id(id).await? {
            None => Err(CampaignError::NotFound(id)),
            Some(_) => Err(CampaignError::AlreadyFinished(id)),
        }
    }

    /// Normalize and validate the recipient list
    ///
    /// Emails are trimmed and lowercased; duplicates are rejected, not
    /// silently dropped, so the caller can fix their input.
    fn normalize_recipients(&self, raw: Vec<Recipient>) -> CampaignResult<Vec<Recipient>> {
        if raw.is_empty() {
            return Err(CampaignError::EmptyRecipients);
        }

        if raw.len() > self.config.max_recipients {
            return Err(CampaignError::TooManyRecipients {
                count: raw.len(),
                max: self.config.max_recipients,
            });
        }

        let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
        let mut recipients = Vec::with_capacity(raw.len());

        for recipient in raw {
            let email = recipient.email.trim().to_lowercase();

            if !EMAIL_RE.is_match(&email) {
                return Err(CampaignError::InvalidEmail(recipient.email));
            }
            if !seen.insert(email.clone()) {
                return Err(CampaignError::DuplicateEmail(email));
            }

            recipients.push(Recipient {
                email,
                name: recipient
                    .name
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty()),
                variant: recipient.variant,
                correlation_id: recipient.correlation_id,
            });
        }

        Ok(recipients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipientVariant;
    use crate::repository::MockCampaignRepository;
    use crate::transport::MockTransport;

    fn recipient(email: &str) -> Recipient {
        Recipient {
            email: email.to_string(),
            name: None,
            variant: RecipientVariant::A,
            correlation_id: None,
        }
    }

    fn start_request(recipients: Vec<Recipient>) -> StartCampaign {
        StartCampaign {
            campaign_name: "spring launch".to_string(),
            subject_template: "Hello {{name}}".to_string(),
            body_template: "<p>Hi {{name}}</p>".to_string(),
            recipients,
        }
    }

    fn service_with_mock_repo(
        repo: MockCampaignRepository,
        config: DispatchConfig,
    ) -> CampaignService<MockCampaignRepository, MockTransport> {
        CampaignService::new(repo, MockTransport::new(), config).unwrap()
    }

    #[test]
    fn test_chunk_size_must_fit_batch_limit() {
        let transport = MockTransport::new().with_batch_limit(50);
        let config = DispatchConfig {
            chunk_size: 100,
            ..DispatchConfig::default()
        };

        let err = CampaignService::new(MockCampaignRepository::new(), transport, config)
            .err()
            .unwrap();
        assert!(matches!(err, CampaignError::ChunkSizeTooLarge { .. }));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config = DispatchConfig {
            chunk_size: 0,
            ..DispatchConfig::default()
        };
        let result =
            CampaignService::new(MockCampaignRepository::new(), MockTransport::new(), config);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_recipient_list_creates_nothing() {
        let mut repo = MockCampaignRepository::new();
        repo.expect_create().times(0);
        let service = service_with_mock_repo(repo, DispatchConfig::default());

        let err = service
            .start_campaign(start_request(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, CampaignError::EmptyRecipients));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_case_insensitively() {
        let mut repo = MockCampaignRepository::new();
        repo.expect_create().times(0);
        let service = service_with_mock_repo(repo, DispatchConfig::default());

        let err = service
            .start_campaign(start_request(vec![
                recipient("Anna@Example.com"),
                recipient("anna@example.com "),
            ]))
            .await
            .unwrap_err();

        match err {
            CampaignError::DuplicateEmail(email) => assert_eq!(email, "anna@example.com"),
            other => panic!("expected DuplicateEmail, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let mut repo = MockCampaignRepository::new();
        repo.expect_create().times(0);
        let service = service_with_mock_repo(repo, DispatchConfig::default());

        for bad in ["not-an-email", "a b@example.com", "missing@tld", "@example.com"] {
            let err = service
                .start_campaign(start_request(vec![recipient(bad)]))
                .await
                .unwrap_err();
            assert!(
                matches!(err, CampaignError::InvalidEmail(_)),
                "expected InvalidEmail for {:?}",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_recipient_ceiling_enforced() {
        let mut repo = MockCampaignRepository::new();
        repo.expect_create().times(0);
        let config = DispatchConfig {
            max_recipients: 2,
            ..DispatchConfig::default()
        };
        let service = service_with_mock_repo(repo, config);

        let err = service
            .start_campaign(start_request(vec![
                recipient("a@example.com"),
                recipient("b@example.com"),
                recipient("c@example.com"),
            ]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CampaignError::TooManyRecipients { count: 3, max: 2 }
        ));
    }

    #[tokio::test]
    async fn test_missing_subject_rejected_before_create() {
        let mut repo = MockCampaignRepository::new();
        repo.expect_create().times(0);
        let service = service_with_mock_repo(repo, DispatchConfig::default());

        let mut request = start_request(vec![recipient("a@example.com")]);
        request.subject_template = String::new();

        let err = service.start_campaign(request).await.unwrap_err();
        assert!(matches!(err, CampaignError::Validation(_)));
    }

    #[tokio::test]
    async fn test_cancel_unknown_campaign_is_not_found() {
        let mut repo = MockCampaignRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        let service = service_with_mock_repo(repo, DispatchConfig::default());

        let err = service.cancel(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, CampaignError::NotFound(_)));
    }
}
