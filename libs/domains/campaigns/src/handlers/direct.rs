use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_helpers::ValidatedJson;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{CampaignError, CampaignResult};
use crate::models::{CampaignProgress, CampaignSend, StartCampaign, StartedCampaign};
use crate::repository::CampaignRepository;
use crate::service::CampaignService;
use crate::transport::MailTransport;

const LIST_LIMIT: u64 = 50;

/// Trigger a new campaign
#[utoipa::path(
    post,
    path = "",
    tag = "campaigns",
    request_body = StartCampaign,
    responses(
        (status = 202, description = "Campaign accepted, dispatching in background", body = StartedCampaign),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn start_campaign<R: CampaignRepository + 'static, T: MailTransport + 'static>(
    State(service): State<Arc<CampaignService<R, T>>>,
    ValidatedJson(input): ValidatedJson<StartCampaign>,
) -> CampaignResult<impl IntoResponse> {
    let started = service.start_campaign(input).await?;
    Ok((StatusCode::ACCEPTED, Json(started)))
}

/// List recent campaigns
#[utoipa::path(
    get,
    path = "",
    tag = "campaigns",
    responses(
        (status = 200, description = "Recent campaigns", body = Vec<CampaignProgress>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_campaigns<R: CampaignRepository + 'static, T: MailTransport + 'static>(
    State(service): State<Arc<CampaignService<R, T>>>,
) -> CampaignResult<Json<Vec<CampaignProgress>>> {
    let campaigns = service.list_campaigns(LIST_LIMIT).await?;
    Ok(Json(campaigns))
}

/// Get campaign progress by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "campaigns",
    params(
        ("id" = String, Path, description = "Campaign ID")
    ),
    responses(
        (status = 200, description = "Campaign progress", body = CampaignProgress),
        (status = 400, description = "Invalid campaign ID"),
        (status = 404, description = "Campaign not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_campaign<R: CampaignRepository + 'static, T: MailTransport + 'static>(
    State(service): State<Arc<CampaignService<R, T>>>,
    Path(id): Path<String>,
) -> CampaignResult<Json<CampaignProgress>> {
    let campaign_id = parse_campaign_id(&id)?;
    let progress = service.get_progress(campaign_id).await?;
    Ok(Json(progress))
}

/// List per-recipient outcomes for a campaign
#[utoipa::path(
    get,
    path = "/{id}/sends",
    tag = "campaigns",
    params(
        ("id" = String, Path, description = "Campaign ID")
    ),
    responses(
        (status = 200, description = "Per-recipient send outcomes", body = Vec<CampaignSend>),
        (status = 400, description = "Invalid campaign ID"),
        (status = 404, description = "Campaign not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_sends<R: CampaignRepository + 'static, T: MailTransport + 'static>(
    State(service): State<Arc<CampaignService<R, T>>>,
    Path(id): Path<String>,
) -> CampaignResult<Json<Vec<CampaignSend>>> {
    let campaign_id = parse_campaign_id(&id)?;
    let sends = service.list_sends(campaign_id).await?;
    Ok(Json(sends))
}

/// Cancel a running campaign
///
/// The in-flight chunk completes; no further chunks are dispatched.
#[utoipa::path(
    post,
    path = "/{id}/cancel",
    tag = "campaigns",
    params(
        ("id" = String, Path, description = "Campaign ID")
    ),
    responses(
        (status = 202, description = "Cancellation requested"),
        (status = 400, description = "Invalid campaign ID"),
        (status = 404, description = "Campaign not found"),
        (status = 409, description = "Campaign is not running"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn cancel_campaign<R: CampaignRepository + 'static, T: MailTransport + 'static>(
    State(service): State<Arc<CampaignService<R, T>>>,
    Path(id): Path<String>,
) -> CampaignResult<impl IntoResponse> {
    let campaign_id = parse_campaign_id(&id)?;
    service.cancel(campaign_id).await?;
    Ok(StatusCode::ACCEPTED)
}

fn parse_campaign_id(raw: &str) -> CampaignResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| CampaignError::Validation(format!("invalid campaign ID: {}", raw)))
}
