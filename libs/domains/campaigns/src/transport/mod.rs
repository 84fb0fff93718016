//! Mail transport adapters
//!
//! A transport sends one chunk of fully-rendered messages and reports
//! either per-message outcomes or a chunk-level failure. Adapters never
//! retry; failure policy lives in the dispatcher.

pub mod mock;
pub mod resend;

pub use mock::{MockTransport, ScriptedOutcome};
pub use resend::ResendTransport;

use async_trait::async_trait;
use eyre::Result;

/// A fully-rendered message ready for one transport call
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub tags: Vec<MessageTag>,
}

/// Key/value metadata attached to an outbound message
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MessageTag {
    pub name: String,
    pub value: String,
}

impl MessageTag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Outcome of one chunk-level transport call
///
/// `Accepted` carries one entry per input message in input order; a
/// `None` entry means that message was rejected even though the call
/// itself succeeded. `Failed` means the whole chunk never reached the
/// transport (network, auth, 5xx) and is distinct from a per-message
/// rejection.
#[derive(Debug, Clone)]
pub enum ChunkResult {
    Accepted { message_ids: Vec<Option<String>> },
    Failed { reason: String },
}

/// Trait for batch email transports
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send one chunk of messages; never retries internally
    async fn send_chunk(&self, messages: &[OutboundEmail]) -> ChunkResult;

    /// Documented maximum messages per call
    fn batch_limit(&self) -> usize;

    /// Check if the transport is usable
    async fn health_check(&self) -> Result<()>;

    /// Transport name for logging
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: MailTransport + ?Sized> MailTransport for std::sync::Arc<T> {
    async fn send_chunk(&self, messages: &[OutboundEmail]) -> ChunkResult {
        (**self).send_chunk(messages).await
    }

    fn batch_limit(&self) -> usize {
        (**self).batch_limit()
    }

    async fn health_check(&self) -> Result<()> {
        (**self).health_check().await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
