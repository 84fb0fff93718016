//! Mock transport for testing

use async_trait::async_trait;
use eyre::Result;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

use super::{ChunkResult, MailTransport, OutboundEmail};

/// Outcome scripted for one chunk call, consumed in order
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Every message accepted with a generated provider id
    Accept,
    /// Whole chunk fails with the given reason
    FailChunk(String),
    /// Call succeeds but the messages at these positions are rejected
    Reject(Vec<usize>),
}

/// Mock transport that captures chunks and replays scripted outcomes
///
/// When the script runs out, remaining chunks are accepted.
pub struct MockTransport {
    outcomes: Mutex<VecDeque<ScriptedOutcome>>,
    chunks: Arc<Mutex<Vec<Vec<OutboundEmail>>>>,
    batch_limit: usize,
    gate: Option<Arc<Semaphore>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            chunks: Arc::new(Mutex::new(Vec::new())),
            batch_limit: 100,
            gate: None,
        }
    }

    /// Create a mock with a sequence of per-chunk outcomes
    pub fn scripted(outcomes: impl IntoIterator<Item = ScriptedOutcome>) -> Self {
        let mock = Self::new();
        *mock.outcomes.try_lock().expect("fresh mutex") = outcomes.into_iter().collect();
        mock
    }

    /// Create a mock where every chunk fails
    pub fn failing(reason: impl Into<String>) -> Self {
        let mock = Self::new();
        let reason = reason.into();
        let mut outcomes = mock.outcomes.try_lock().expect("fresh mutex");
        // Large enough that any realistic test exhausts its chunks first.
        for _ in 0..1024 {
            outcomes.push_back(ScriptedOutcome::FailChunk(reason.clone()));
        }
        drop(outcomes);
        mock
    }

    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit;
        self
    }

    /// Make every chunk call block until [`release_chunks`] grants it
    ///
    /// Lets tests step the dispatch loop one chunk at a time: the chunk
    /// is visible via [`chunk_count`] as soon as the call starts, but
    /// its outcome is only produced once released.
    ///
    /// [`release_chunks`]: Self::release_chunks
    /// [`chunk_count`]: Self::chunk_count
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Allow `count` gated chunk calls to proceed
    pub fn release_chunks(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// All chunks captured so far, in dispatch order
    pub async fn sent_chunks(&self) -> Vec<Vec<OutboundEmail>> {
        self.chunks.lock().await.clone()
    }

    pub async fn chunk_count(&self) -> usize {
        self.chunks.lock().await.len()
    }

    pub async fn total_messages(&self) -> usize {
        self.chunks.lock().await.iter().map(|c| c.len()).sum()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailTransport for MockTransport {
    async fn send_chunk(&self, messages: &[OutboundEmail]) -> ChunkResult {
        let chunk_index = {
            let mut chunks = self.chunks.lock().await;
            chunks.push(messages.to_vec());
            chunks.len() - 1
        };

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .expect("gate semaphore closed")
                .forget();
        }

        let outcome = self
            .outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or(ScriptedOutcome::Accept);

        match outcome {
            ScriptedOutcome::Accept => ChunkResult::Accepted {
                message_ids: (0..messages.len())
                    .map(|i| Some(format!("mock-{}-{}", chunk_index, i)))
                    .collect(),
            },
            ScriptedOutcome::FailChunk(reason) => ChunkResult::Failed { reason },
            ScriptedOutcome::Reject(positions) => ChunkResult::Accepted {
                message_ids: (0..messages.len())
                    .map(|i| {
                        if positions.contains(&i) {
                            None
                        } else {
                            Some(format!("mock-{}-{}", chunk_index, i))
                        }
                    })
                    .collect(),
            },
        }
    }

    fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutboundEmail {
        OutboundEmail {
            to: to.to_string(),
            subject: "s".to_string(),
            html: "<p></p>".to_string(),
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_accepts_by_default() {
        let transport = MockTransport::new();
        let result = transport.send_chunk(&[email("a@x.co"), email("b@x.co")]).await;

        match result {
            ChunkResult::Accepted { message_ids } => {
                assert_eq!(message_ids.len(), 2);
                assert!(message_ids.iter().all(|id| id.is_some()));
            }
            ChunkResult::Failed { .. } => panic!("expected accepted"),
        }
        assert_eq!(transport.chunk_count().await, 1);
    }

    #[tokio::test]
    async fn test_scripted_rejections() {
        let transport = MockTransport::scripted([ScriptedOutcome::Reject(vec![1])]);
        let result = transport
            .send_chunk(&[email("a@x.co"), email("b@x.co"), email("c@x.co")])
            .await;

        match result {
            ChunkResult::Accepted { message_ids } => {
                assert!(message_ids[0].is_some());
                assert!(message_ids[1].is_none());
                assert!(message_ids[2].is_some());
            }
            ChunkResult::Failed { .. } => panic!("expected accepted"),
        }
    }

    #[tokio::test]
    async fn test_failing_transport() {
        let transport = MockTransport::failing("connection refused");
        match transport.send_chunk(&[email("a@x.co")]).await {
            ChunkResult::Failed { reason } => assert_eq!(reason, "connection refused"),
            ChunkResult::Accepted { .. } => panic!("expected failure"),
        }
    }
}
