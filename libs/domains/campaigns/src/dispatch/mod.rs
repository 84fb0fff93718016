//! The campaign dispatch engine
//!
//! Splits the recipient list into transport-sized chunks, paces calls to
//! the transport's rate ceiling, and drives one sequential dispatch loop
//! per campaign on a detached task.

pub mod batcher;
pub mod dispatcher;
pub mod pacer;
pub mod registry;

pub use batcher::split_into_chunks;
pub use dispatcher::CampaignDispatcher;
pub use pacer::Pacer;
pub use registry::DispatchRegistry;

use core_config::{ConfigError, FromEnv, env_parse_or_default};
use std::time::Duration;

/// Tunables for the dispatch loop
///
/// Defaults follow the transport's published limits: 100 messages per
/// batch call and 2 requests/sec, hence the 500 ms minimum interval.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Messages per transport call; must not exceed the transport batch limit
    pub chunk_size: usize,

    /// Minimum delay between successive chunk dispatches
    pub min_interval: Duration,

    /// Maximum recipients accepted per campaign
    pub max_recipients: usize,

    /// Failure rate above which a finished campaign is `failed` rather
    /// than `partial`; compared strictly greater-than
    pub failure_threshold: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100,
            min_interval: Duration::from_millis(500),
            max_recipients: 200,
            failure_threshold: 0.5,
        }
    }
}

/// Load DispatchConfig from environment variables
///
/// - `CAMPAIGN_CHUNK_SIZE` (default: 100)
/// - `CAMPAIGN_MIN_INTERVAL_MS` (default: 500)
/// - `CAMPAIGN_MAX_RECIPIENTS` (default: 200)
/// - `CAMPAIGN_FAILURE_THRESHOLD` (default: 0.5)
impl FromEnv for DispatchConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            chunk_size: env_parse_or_default("CAMPAIGN_CHUNK_SIZE", "100")?,
            min_interval: Duration::from_millis(env_parse_or_default(
                "CAMPAIGN_MIN_INTERVAL_MS",
                "500",
            )?),
            max_recipients: env_parse_or_default("CAMPAIGN_MAX_RECIPIENTS", "200")?,
            failure_threshold: env_parse_or_default("CAMPAIGN_FAILURE_THRESHOLD", "0.5")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_transport_limits() {
        let config = DispatchConfig::default();
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.min_interval, Duration::from_millis(500));
        assert_eq!(config.max_recipients, 200);
        assert_eq!(config.failure_threshold, 0.5);
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("CAMPAIGN_CHUNK_SIZE", Some("10")),
                ("CAMPAIGN_MIN_INTERVAL_MS", Some("50")),
                ("CAMPAIGN_FAILURE_THRESHOLD", Some("0.9")),
            ],
            || {
                let config = DispatchConfig::from_env().unwrap();
                assert_eq!(config.chunk_size, 10);
                assert_eq!(config.min_interval, Duration::from_millis(50));
                assert_eq!(config.max_recipients, 200);
                assert_eq!(config.failure_threshold, 0.9);
            },
        );
    }
}
