//! Resend batch transport
//!
//! Sends chunks through the Resend batch API. One call carries at most
//! [`RESEND_BATCH_LIMIT`] messages; the published rate ceiling of
//! 2 requests/sec is what the dispatcher's pacer interval is derived from.

use async_trait::async_trait;
use eyre::{Result, eyre};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{ChunkResult, MailTransport, MessageTag, OutboundEmail};

/// Resend batch API endpoint
const RESEND_BATCH_URL: &str = "https://api.resend.com/emails/batch";

/// Maximum messages Resend accepts per batch call
pub const RESEND_BATCH_LIMIT: usize = 100;

/// Resend batch email transport
pub struct ResendTransport {
    api_key: String,
    from: String,
    client: Client,
}

impl ResendTransport {
    /// Create a new ResendTransport
    pub fn new(
        api_key: impl Into<String>,
        from_email: impl Into<String>,
        from_name: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            from: format!("{} <{}>", from_name.into(), from_email.into()),
            client: Client::new(),
        }
    }

    /// Create from environment variables
    ///
    /// Expects:
    /// - `RESEND_API_KEY`
    /// - `RESEND_FROM_EMAIL`
    /// - `RESEND_FROM_NAME` (optional)
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("RESEND_API_KEY").map_err(|_| eyre!("RESEND_API_KEY not set"))?;

        let from_email = std::env::var("RESEND_FROM_EMAIL")
            .map_err(|_| eyre!("RESEND_FROM_EMAIL not set"))?;

        let from_name =
            std::env::var("RESEND_FROM_NAME").unwrap_or_else(|_| "Campaigns".to_string());

        Ok(Self::new(api_key, from_email, from_name))
    }
}

/// One message of a Resend batch request
#[derive(Debug, Serialize)]
struct ResendMessage<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<&'a MessageTag>,
}

#[derive(Debug, Deserialize)]
struct ResendBatchResponse {
    data: Vec<ResendMessageId>,
}

#[derive(Debug, Deserialize)]
struct ResendMessageId {
    id: Option<String>,
}

#[async_trait]
impl MailTransport for ResendTransport {
    async fn send_chunk(&self, messages: &[OutboundEmail]) -> ChunkResult {
        let payload: Vec<ResendMessage> = messages
            .iter()
            .map(|m| ResendMessage {
                from: &self.from,
                to: vec![&m.to],
                subject: &m.subject,
                html: &m.html,
                tags: m.tags.iter().collect(),
            })
            .collect();

        debug!(count = messages.len(), "sending batch via Resend");

        let response = match self
            .client
            .post(RESEND_BATCH_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Resend request failed");
                return ChunkResult::Failed {
                    reason: format!("request failed: {}", e),
                };
            }
        };

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, error = %error_body, "Resend API error");

            let reason = match status.as_u16() {
                429 => "rate limit exceeded".to_string(),
                401 | 403 => "authentication failed".to_string(),
                _ => format!("Resend error ({}): {}", status, error_body),
            };
            return ChunkResult::Failed { reason };
        }

        match response.json::<ResendBatchResponse>().await {
            Ok(body) => {
                // One id per input message in input order; a short or
                // id-less entry marks that message rejected.
                let mut message_ids: Vec<Option<String>> =
                    body.data.into_iter().map(|m| m.id).collect();
                message_ids.resize(messages.len(), None);

                ChunkResult::Accepted { message_ids }
            }
            Err(e) => ChunkResult::Failed {
                reason: format!("invalid response body: {}", e),
            },
        }
    }

    fn batch_limit(&self) -> usize {
        RESEND_BATCH_LIMIT
    }

    async fn health_check(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(eyre!("Resend API key not configured"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialization() {
        let email = OutboundEmail {
            to: "anna@example.com".to_string(),
            subject: "Hello Anna".to_string(),
            html: "<p>Hi</p>".to_string(),
            tags: vec![MessageTag::new("variant", "a")],
        };

        let transport = ResendTransport::new("key", "noreply@example.com", "Campaigns");
        let message = ResendMessage {
            from: &transport.from,
            to: vec![&email.to],
            subject: &email.subject,
            html: &email.html,
            tags: email.tags.iter().collect(),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["from"], "Campaigns <noreply@example.com>");
        assert_eq!(json["to"][0], "anna@example.com");
        assert_eq!(json["tags"][0]["name"], "variant");
    }

    #[test]
    fn test_empty_tags_are_omitted() {
        let transport = ResendTransport::new("key", "noreply@example.com", "Campaigns");
        let message = ResendMessage {
            from: &transport.from,
            to: vec!["x@example.com"],
            subject: "s",
            html: "<p></p>",
            tags: Vec::new(),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert!(json.get("tags").is_none());
    }

    #[tokio::test]
    async fn test_health_check_requires_api_key() {
        let transport = ResendTransport::new("", "noreply@example.com", "Campaigns");
        assert!(transport.health_check().await.is_err());

        let transport = ResendTransport::new("key", "noreply@example.com", "Campaigns");
        assert!(transport.health_check().await.is_ok());
    }

    #[test]
    fn test_batch_response_parsing() {
        let body = r#"{"data": [{"id": "abc-1"}, {"id": null}]}"#;
        let parsed: ResendBatchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].id.as_deref(), Some("abc-1"));
        assert!(parsed.data[1].id.is_none());
    }
}
