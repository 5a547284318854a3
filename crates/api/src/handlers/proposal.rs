//! Handlers for the `/proposals` resource (quote negotiation and payment).
//!
//! The accept path is the money path: guard the proposal (conditional
//! `pending -> accepted`, so a double click loses), engage the request,
//! then create the gateway charge with an idempotency key derived from
//! the proposal id. The fee is computed once, from the configured
//! schedule, at proposal creation; accept never recomputes it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use wayside_core::error::CoreError;
use wayside_core::request_status::RequestStatus;
use wayside_core::types::DbId;
use wayside_db::models::proposal::{CreateProposal, Proposal};
use wayside_db::repositories::{ProposalRepo, ProviderStatsRepo, ServiceRequestRepo, UserRepo};
use wayside_events::PlatformEvent;
use wayside_payments::client::split_for;
use wayside_payments::ChargeRequest;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireClient, RequireProvider};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/proposals
///
/// Submit a priced proposal against an open request. Fee and total are
/// computed server-side from the configured schedule.
pub async fn create_proposal(
    RequireProvider(auth): RequireProvider,
    State(state): State<AppState>,
    Json(input): Json<CreateProposal>,
) -> AppResult<(StatusCode, Json<DataResponse<Proposal>>)> {
    // 1. The request must exist and still be open for quoting.
    let request = ServiceRequestRepo::find_by_id(&state.pool, input.service_request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ServiceRequest",
            id: input.service_request_id,
        }))?;

    let status = RequestStatus::parse(&request.status)?;
    if !matches!(status, RequestStatus::Pending | RequestStatus::Quoted) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Request is no longer open for quoting (status: {})",
            request.status
        ))));
    }

    // 2. Compute the split from the single configured schedule.
    let split = state.config.fees.split(input.amount_cents)?;

    // 3. Insert. One proposal per mechanic per request (uq constraint).
    let proposal = ProposalRepo::create(
        &state.pool,
        request.id,
        auth.user_id,
        request.requester_id,
        split.amount_cents,
        split.platform_fee_cents,
        split.total_cents,
    )
    .await?;

    // 4. First quote moves the request to `quoted`. A concurrent quote
    //    may have done it already; losing that race is fine.
    if status == RequestStatus::Pending {
        let _ = ServiceRequestRepo::set_status(
            &state.pool,
            request.id,
            RequestStatus::Pending,
            RequestStatus::Quoted,
        )
        .await?;
    }

    state.event_bus.publish(
        PlatformEvent::new("proposal.created")
            .with_source("proposal", proposal.id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "client_id": proposal.client_id,
                "service_request_id": proposal.service_request_id,
                "total_cents": proposal.total_cents,
            })),
    );
    state.dashboard_cache.invalidate(&proposal.client_id).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: proposal })))
}

/// GET /api/v1/proposals
///
/// List the authenticated mechanic's own proposals, newest first.
pub async fn list_my_proposals(
    RequireProvider(auth): RequireProvider,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Proposal>>>> {
    let limit = wayside_db::clamp_limit(params.limit);
    let offset = wayside_db::clamp_offset(params.offset);

    let proposals =
        ProposalRepo::list_for_mechanic(&state.pool, auth.user_id, limit, offset).await?;
    Ok(Json(DataResponse { data: proposals }))
}

/// GET /api/v1/requests/{id}/proposals
///
/// All proposals against a request. Visible to the requester; a provider
/// sees only their own entry filtered out of someone else's request.
pub async fn list_for_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Proposal>>>> {
    let request = ServiceRequestRepo::find_by_id(&state.pool, request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ServiceRequest",
            id: request_id,
        }))?;

    let mut proposals = ProposalRepo::list_for_request(&state.pool, request_id).await?;
    if request.requester_id != auth.user_id {
        proposals.retain(|p| p.mechanic_id == auth.user_id);
    }

    Ok(Json(DataResponse { data: proposals }))
}

/// POST /api/v1/proposals/{id}/accept
///
/// Accept a proposal: lock it in, engage the request, and charge the
/// client through the payment gateway.
pub async fn accept_proposal(
    RequireClient(auth): RequireClient,
    State(state): State<AppState>,
    Path(proposal_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Proposal>>> {
    // 1. Load and authorize.
    let proposal = load_proposal(&state, proposal_id).await?;
    if proposal.client_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the client on this proposal may accept it".into(),
        )));
    }

    // 2. The mechanic needs a linked payout account before any money moves.
    let mechanic = UserRepo::find_by_id(&state.pool, proposal.mechanic_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: proposal.mechanic_id,
        }))?;
    let provider_account = mechanic.gateway_account_id.ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Provider has not linked a payout account".into(),
        ))
    })?;

    // 3. The request must still be acceptable.
    let request = ServiceRequestRepo::find_by_id(&state.pool, proposal.service_request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ServiceRequest",
            id: proposal.service_request_id,
        }))?;
    let request_status = RequestStatus::parse(&request.status)?;
    request_status.ensure_transition(RequestStatus::Accepted)?;

    // 4. Conditional accept: a second accept of the same proposal (or a
    //    race with reject) affects zero rows and conflicts here.
    let accepted = ProposalRepo::accept(&state.pool, proposal_id, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Proposal is no longer pending".into(),
            ))
        })?;

    // 5. Engage the request with the winning provider and agreed price.
    let engaged = ServiceRequestRepo::accept(
        &state.pool,
        request.id,
        request_status,
        accepted.mechanic_id,
        accepted.total_cents,
    )
    .await?;
    if !engaged {
        return Err(AppError::Core(CoreError::Conflict(
            "Request was engaged by a concurrent accept".into(),
        )));
    }
    ProviderStatsRepo::record_assignment(&state.pool, accepted.mechanic_id).await?;

    // 6. Charge the client. The idempotency key is derived from the
    //    proposal id, so a retried accept cannot double-charge.
    let charge = state
        .payments
        .create_charge(
            &ChargeRequest {
                amount_cents: accepted.total_cents,
                currency: "BRL".to_string(),
                description: format!("Wayside service request #{}", accepted.service_request_id),
                split: split_for(
                    &provider_account,
                    &state.config.platform_gateway_account,
                    accepted.amount_cents,
                    accepted.total_cents,
                ),
            },
            &format!("proposal-{proposal_id}"),
        )
        .await?;

    ProposalRepo::set_external_payment(&state.pool, proposal_id, &charge.id).await?;

    state.event_bus.publish(
        PlatformEvent::new("proposal.accepted")
            .with_source("proposal", proposal_id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "mechanic_id": accepted.mechanic_id,
                "service_request_id": accepted.service_request_id,
                "charge_id": charge.id,
            })),
    );
    state.dashboard_cache.invalidate(&auth.user_id).await;
    state.dashboard_cache.invalidate(&accepted.mechanic_id).await;

    let proposal = load_proposal(&state, proposal_id).await?;
    Ok(Json(DataResponse { data: proposal }))
}

/// POST /api/v1/proposals/{id}/reject
///
/// Reject a pending proposal. Only the client on the proposal.
pub async fn reject_proposal(
    RequireClient(auth): RequireClient,
    State(state): State<AppState>,
    Path(proposal_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Proposal>>> {
    let proposal = load_proposal(&state, proposal_id).await?;
    if proposal.client_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the client on this proposal may reject it".into(),
        )));
    }

    let rejected = ProposalRepo::reject(&state.pool, proposal_id, auth.user_id).await?;
    if !rejected {
        return Err(AppError::Core(CoreError::Conflict(
            "Proposal is no longer pending".into(),
        )));
    }

    state.event_bus.publish(
        PlatformEvent::new("proposal.rejected")
            .with_source("proposal", proposal_id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "mechanic_id": proposal.mechanic_id,
                "service_request_id": proposal.service_request_id,
            })),
    );

    let proposal = load_proposal(&state, proposal_id).await?;
    Ok(Json(DataResponse { data: proposal }))
}

/// POST /api/v1/proposals/{id}/complete
///
/// Close out a settled proposal (`paid -> completed`). Only the mechanic.
pub async fn complete_proposal(
    RequireProvider(auth): RequireProvider,
    State(state): State<AppState>,
    Path(proposal_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Proposal>>> {
    let proposal = load_proposal(&state, proposal_id).await?;
    if proposal.mechanic_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the mechanic on this proposal may complete it".into(),
        )));
    }

    let completed = ProposalRepo::complete(&state.pool, proposal_id, auth.user_id).await?;
    if !completed {
        return Err(AppError::Core(CoreError::Conflict(
            "Proposal is not in the paid state".into(),
        )));
    }

    let proposal = load_proposal(&state, proposal_id).await?;
    Ok(Json(DataResponse { data: proposal }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a proposal or produce a typed 404.
async fn load_proposal(state: &AppState, proposal_id: DbId) -> AppResult<Proposal> {
    ProposalRepo::find_by_id(&state.pool, proposal_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id: proposal_id,
        }))
}
