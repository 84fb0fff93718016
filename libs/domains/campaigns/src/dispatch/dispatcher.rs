use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{DispatchConfig, Pacer, split_into_chunks};
use crate::models::{CampaignStatus, NewSend, Recipient, SendStatus};
use crate::repository::CampaignRepository;
use crate::transport::{ChunkResult, MailTransport, MessageTag, OutboundEmail};

/// Drives one campaign's dispatch loop to completion
///
/// Owns the campaign's ledger rows for the duration of the run: chunks
/// are dispatched strictly in list order, outcomes recorded after every
/// transport call, and the terminal transition performed exactly once.
/// Runs on a detached task, independent of the triggering request.
pub struct CampaignDispatcher<R, T> {
    repository: Arc<R>,
    transport: Arc<T>,
    config: DispatchConfig,
    campaign_id: Uuid,
    subject_template: String,
    body_template: String,
    recipients: Vec<Recipient>,
    cancel_flag: Arc<AtomicBool>,
}

impl<R, T> CampaignDispatcher<R, T>
where
    R: CampaignRepository,
    T: MailTransport,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repository: Arc<R>,
        transport: Arc<T>,
        config: DispatchConfig,
        campaign_id: Uuid,
        subject_template: String,
        body_template: String,
        recipients: Vec<Recipient>,
        cancel_flag: Arc<AtomicBool>,
    ) -> Self {
        Self {
            repository,
            transport,
            config,
            campaign_id,
            subject_template,
            body_template,
            recipients,
            cancel_flag,
        }
    }

    /// Run the dispatch loop to a terminal state
    #[instrument(skip(self), fields(campaign_id = %self.campaign_id, transport = self.transport.name()))]
    pub async fn run(self) {
        let campaign_id = self.campaign_id;

        if let Err(e) = self.repository.mark_sending(campaign_id).await {
            error!(error = %e, "could not transition campaign to sending");
            return;
        }

        let chunks = split_into_chunks(&self.recipients, self.config.chunk_size);
        let chunk_total = chunks.len();
        info!(
            recipients = self.recipients.len(),
            chunks = chunk_total,
            "campaign dispatch started"
        );

        let mut pacer = Pacer::new(self.config.min_interval);
        let mut sent: i32 = 0;
        let mut failed: i32 = 0;

        for (index, chunk) in chunks.into_iter().enumerate() {
            pacer.pace().await;

            let messages: Vec<OutboundEmail> =
                chunk.iter().map(|r| self.render_message(r)).collect();

            pacer.mark_dispatch();
            let result = self.transport.send_chunk(&messages).await;

            let (records, chunk_sent, chunk_failed) = self.record_outcomes(chunk, result, index);
            sent += chunk_sent;
            failed += chunk_failed;

            // Bookkeeping is best effort: the transport result is the
            // truth for "was this sent", so a failed ledger write must
            // not abort delivery to the remaining chunks.
            if let Err(e) = self.repository.upsert_sends(records).await {
                error!(error = %e, chunk = index + 1, "failed to record send outcomes");
            }
            if let Err(e) = self.repository.update_counters(campaign_id, sent, failed).await {
                warn!(error = %e, "failed to update campaign counters");
            }

            if self.cancel_flag.load(Ordering::SeqCst) {
                info!(sent, failed, "cancellation observed, stopping campaign");
                if let Err(e) = self
                    .repository
                    .finalize(campaign_id, CampaignStatus::Stopped, sent, failed)
                    .await
                {
                    error!(error = %e, "failed to finalize stopped campaign");
                }
                return;
            }
        }

        let status = terminal_status(
            failed,
            self.recipients.len() as i32,
            self.config.failure_threshold,
        );

        if let Err(e) = self.repository.finalize(campaign_id, status, sent, failed).await {
            error!(error = %e, "failed to finalize campaign");
            return;
        }

        info!(status = %status, sent, failed, "campaign dispatch finished");
    }

    /// Turn one chunk's transport result into ledger rows and count deltas
    fn record_outcomes(
        &self,
        chunk: &[Recipient],
        result: ChunkResult,
        index: usize,
    ) -> (Vec<NewSend>, i32, i32) {
        match result {
            ChunkResult::Failed { reason } => {
                warn!(chunk = index + 1, reason = %reason, "chunk dispatch failed");
                let records = chunk
                    .iter()
                    .map(|r| self.new_send(r, SendStatus::Failed, None, Some(reason.clone())))
                    .collect();
                (records, 0, chunk.len() as i32)
            }
            ChunkResult::Accepted { message_ids } => {
                let mut chunk_sent = 0;
                let mut chunk_failed = 0;
                let records = chunk
                    .iter()
                    .enumerate()
                    .map(|(i, r)| {
                        match message_ids.get(i).cloned().flatten() {
                            Some(id) => {
                                chunk_sent += 1;
                                self.new_send(r, SendStatus::Sent, Some(id), None)
                            }
                            None => {
                                chunk_failed += 1;
                                self.new_send(
                                    r,
                                    SendStatus::Failed,
                                    None,
                                    Some("rejected by transport".to_string()),
                                )
                            }
                        }
                    })
                    .collect();
                (records, chunk_sent, chunk_failed)
            }
        }
    }

    fn new_send(
        &self,
        recipient: &Recipient,
        status: SendStatus,
        provider_message_id: Option<String>,
        error_message: Option<String>,
    ) -> NewSend {
        NewSend {
            campaign_id: self.campaign_id,
            email: recipient.email.clone(),
            name: recipient.name.clone(),
            variant: recipient.variant,
            correlation_id: recipient.correlation_id.clone(),
            status,
            provider_message_id,
            error_message,
        }
    }

    fn render_message(&self, recipient: &Recipient) -> OutboundEmail {
        OutboundEmail {
            to: recipient.email.clone(),
            subject: render_template(&self.subject_template, recipient),
            html: render_template(&self.body_template, recipient),
            tags: vec![
                MessageTag::new("campaign_id", self.campaign_id.to_string()),
                MessageTag::new("variant", recipient.variant.to_string()),
            ],
        }
    }
}

/// Substitute `{{name}}` and `{{email}}` placeholders for one recipient
///
/// A missing display name falls back to the email local part.
pub fn render_template(template: &str, recipient: &Recipient) -> String {
    let name = recipient
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| recipient.email.split('@').next().unwrap_or_default());

    template
        .replace("{{name}}", name)
        .replace("{{email}}", &recipient.email)
}

/// Terminal status from final counters
///
/// Zero failures completes cleanly; a failure rate strictly above the
/// threshold marks the run systemic (`failed`); anything in between is
/// `partial`. A rate of exactly the threshold stays `partial`.
pub fn terminal_status(failed: i32, total: i32, threshold: f64) -> CampaignStatus {
    if failed == 0 {
        CampaignStatus::Completed
    } else if total > 0 && f64::from(failed) / f64::from(total) > threshold {
        CampaignStatus::Failed
    } else {
        CampaignStatus::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecipientVariant;

    fn recipient(email: &str, name: Option<&str>) -> Recipient {
        Recipient {
            email: email.to_string(),
            name: name.map(String::from),
            variant: RecipientVariant::A,
            correlation_id: None,
        }
    }

    #[test]
    fn test_terminal_status_no_failures() {
        assert_eq!(terminal_status(0, 250, 0.5), CampaignStatus::Completed);
    }

    #[test]
    fn test_terminal_status_majority_failure() {
        assert_eq!(terminal_status(100, 100, 0.5), CampaignStatus::Failed);
        assert_eq!(terminal_status(51, 100, 0.5), CampaignStatus::Failed);
    }

    #[test]
    fn test_terminal_status_exactly_at_threshold_is_partial() {
        // 100/200 = 0.5 is not strictly greater than 0.5
        assert_eq!(terminal_status(100, 200, 0.5), CampaignStatus::Partial);
    }

    #[test]
    fn test_terminal_status_minority_failure() {
        assert_eq!(terminal_status(1, 100, 0.5), CampaignStatus::Partial);
    }

    #[test]
    fn test_terminal_status_respects_configured_threshold() {
        assert_eq!(terminal_status(30, 100, 0.25), CampaignStatus::Failed);
        assert_eq!(terminal_status(30, 100, 0.9), CampaignStatus::Partial);
    }

    #[test]
    fn test_render_replaces_name_and_email() {
        let r = recipient("anna@example.com", Some("Anna"));
        assert_eq!(render_template("Hi {{name}}!", &r), "Hi Anna!");
        assert_eq!(
            render_template("Sent to {{email}}", &r),
            "Sent to anna@example.com"
        );
    }

    #[test]
    fn test_render_falls_back_to_email_local_part() {
        let r = recipient("anna@example.com", None);
        assert_eq!(render_template("Hi {{name}}!", &r), "Hi anna!");

        let r = recipient("bela@example.com", Some(""));
        assert_eq!(render_template("Hi {{name}}!", &r), "Hi bela!");
    }

    #[test]
    fn test_render_leaves_plain_text_untouched() {
        let r = recipient("anna@example.com", Some("Anna"));
        assert_eq!(render_template("No placeholders", &r), "No placeholders");
    }
}
