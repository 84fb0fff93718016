use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum delay between successive chunk dispatches
///
/// Per-dispatcher state: each campaign loop owns its own pacer, so one
/// campaign's pacing never blocks another's. The wait applies only
/// between dispatches, never before the first chunk.
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    last_dispatch: Option<Instant>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: None,
        }
    }

    /// Sleep for whatever remains of the interval since the last dispatch
    pub async fn pace(&self) {
        if let Some(last) = self.last_dispatch {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
    }

    /// Record that a chunk was just dispatched
    pub fn mark_dispatch(&mut self) {
        self.last_dispatch = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_before_first_dispatch() {
        let pacer = Pacer::new(Duration::from_millis(500));

        let start = Instant::now();
        pacer.pace().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_full_interval_after_dispatch() {
        let mut pacer = Pacer::new(Duration::from_millis(500));
        pacer.mark_dispatch();

        let start = Instant::now();
        pacer.pace().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_only_the_remainder() {
        let mut pacer = Pacer::new(Duration::from_millis(500));
        pacer.mark_dispatch();

        tokio::time::advance(Duration::from_millis(300)).await;

        let start = Instant::now();
        pacer.pace().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(200));
        assert!(waited < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_when_interval_already_elapsed() {
        let mut pacer = Pacer::new(Duration::from_millis(500));
        pacer.mark_dispatch();

        tokio::time::advance(Duration::from_millis(700)).await;

        let start = Instant::now();
        pacer.pace().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
