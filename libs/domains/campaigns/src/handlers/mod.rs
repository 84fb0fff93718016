mod direct;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{
    CampaignProgress, CampaignSend, CampaignStatus, Recipient, RecipientVariant, SendStatus,
    StartCampaign, StartedCampaign,
};
use crate::repository::CampaignRepository;
use crate::service::CampaignService;
use crate::transport::MailTransport;

/// OpenAPI documentation for the campaigns API
#[derive(OpenApi)]
#[openapi(
    paths(
        direct::start_campaign,
        direct::list_campaigns,
        direct::get_campaign,
        direct::list_sends,
        direct::cancel_campaign,
    ),
    components(
        schemas(
            StartCampaign,
            StartedCampaign,
            CampaignProgress,
            CampaignSend,
            CampaignStatus,
            SendStatus,
            Recipient,
            RecipientVariant,
        )
    ),
    tags(
        (name = "campaigns", description = "Batch campaign dispatch operations")
    )
)]
pub struct ApiDoc;

/// Create the campaigns router
pub fn router<R, T>(service: Arc<CampaignService<R, T>>) -> Router
where
    R: CampaignRepository + 'static,
    T: MailTransport + 'static,
{
    Router::new()
        .route(
            "/",
            get(direct::list_campaigns).post(direct::start_campaign),
        )
        .route("/{id}", get(direct::get_campaign))
        .route("/{id}/sends", get(direct::list_sends))
        .route("/{id}/cancel", post(direct::cancel_campaign))
        .with_state(service)
}
