//! Campaigns Domain
//!
//! Batch email campaign dispatch: takes a validated recipient list and a
//! message template, and delivers it through a rate-limited batch
//! transport on a detached task, tracking partial success and failure in
//! a per-recipient ledger.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP trigger / status / cancel
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, campaign creation, task hand-off
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │  Dispatcher │  ← Sequential chunk loop: batcher + pacer + transport
//! └──┬────────┬─┘
//! ┌──▼──────┐ ┌▼──────────┐
//! │ Ledger  │ │ Transport │  ← Repository trait / MailTransport trait
//! └─────────┘ └───────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_campaigns::{
//!     CampaignService, DispatchConfig, PgCampaignRepository, ResendTransport,
//! };
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://...").await?;
//!
//! let repository = PgCampaignRepository::new(db);
//! let transport = ResendTransport::from_env()?;
//! let service = CampaignService::new(repository, transport, DispatchConfig::default())?;
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod transport;

// Re-export commonly used types
pub use dispatch::{CampaignDispatcher, DispatchConfig, DispatchRegistry};
pub use error::{CampaignError, CampaignResult};
pub use handlers::ApiDoc;
pub use memory::InMemoryCampaignRepository;
pub use models::{
    Campaign, CampaignProgress, CampaignSend, CampaignStatus, NewCampaign, NewSend, Recipient,
    RecipientVariant, SendStatus, StartCampaign, StartedCampaign,
};
pub use postgres::PgCampaignRepository;
pub use repository::CampaignRepository;
pub use service::CampaignService;
pub use transport::{ChunkResult, MailTransport, MockTransport, OutboundEmail, ResendTransport};
