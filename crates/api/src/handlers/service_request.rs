//! Handlers for the `/requests` resource (service-request lifecycle).
//!
//! Every status mutation follows the same shape: load the row, check the
//! actor, guard the transition through the core state machine (typed 409
//! on an illegal jump), then apply a conditional update so a concurrent
//! writer loses cleanly instead of overwriting.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use wayside_core::error::CoreError;
use wayside_core::geo::Coordinates;
use wayside_core::request_status::RequestStatus;
use wayside_core::roles::{is_provider_role, ROLE_CLIENT};
use wayside_core::types::DbId;
use wayside_db::models::service_request::{CreateServiceRequest, ServiceRequest};
use wayside_db::repositories::{ProviderStatsRepo, ServiceRequestRepo, VehicleRepo};
use wayside_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireClient, RequireProvider};
use crate::query::StatusFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /requests/{id}/cancel`.
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/requests
///
/// Open a service request against one of the caller's vehicles.
pub async fn create_request(
    RequireClient(auth): RequireClient,
    State(state): State<AppState>,
    Json(input): Json<CreateServiceRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ServiceRequest>>)> {
    // 1. The vehicle must belong to the requester.
    VehicleRepo::find_for_owner(&state.pool, input.vehicle_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vehicle",
            id: input.vehicle_id,
        }))?;

    // 2. Validate the breakdown location if one was supplied.
    if let (Some(lat), Some(lng)) = (input.lat, input.lng) {
        Coordinates::validated(lat, lng)?;
    }

    if input.description.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Description must not be empty".into(),
        )));
    }

    // 3. Insert in `pending` state.
    let request = ServiceRequestRepo::create(
        &state.pool,
        auth.user_id,
        input.vehicle_id,
        input.description.trim(),
        input.lat,
        input.lng,
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new("request.created")
            .with_source("service_request", request.id)
            .with_actor(auth.user_id),
    );
    state.dashboard_cache.invalidate(&auth.user_id).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/requests
///
/// List requests visible to the caller: clients see their own, providers
/// see their assignments. An optional `?status=` filter narrows the list.
pub async fn list_requests(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<StatusFilterParams>,
) -> AppResult<Json<DataResponse<Vec<ServiceRequest>>>> {
    let status = params
        .status
        .as_deref()
        .map(RequestStatus::parse)
        .transpose()?;
    let limit = wayside_db::clamp_limit(params.limit);
    let offset = wayside_db::clamp_offset(params.offset);

    let requests = if auth.role == ROLE_CLIENT {
        ServiceRequestRepo::list_for_requester(&state.pool, auth.user_id, status, limit, offset)
            .await?
    } else if is_provider_role(&auth.role) {
        ServiceRequestRepo::list_for_provider(&state.pool, auth.user_id, status, limit, offset)
            .await?
    } else {
        return Err(AppError::Core(CoreError::Forbidden(
            "No request listing for this role".into(),
        )));
    };

    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/requests/open
///
/// Requests still open for quoting, oldest first. Providers only.
pub async fn list_open_requests(
    RequireProvider(_auth): RequireProvider,
    State(state): State<AppState>,
    Query(params): Query<StatusFilterParams>,
) -> AppResult<Json<DataResponse<Vec<ServiceRequest>>>> {
    let limit = wayside_db::clamp_limit(params.limit);
    let offset = wayside_db::clamp_offset(params.offset);

    let requests = ServiceRequestRepo::list_open(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/requests/{id}
///
/// Visible to the requester, the assigned provider, and providers while
/// the request is still open for quoting.
pub async fn get_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ServiceRequest>>> {
    let request = load_request(&state, request_id).await?;

    let is_requester = request.requester_id == auth.user_id;
    let is_assigned = request.assigned_provider_id == Some(auth.user_id);
    let status = RequestStatus::parse(&request.status)?;
    let open_to_providers = is_provider_role(&auth.role)
        && matches!(status, RequestStatus::Pending | RequestStatus::Quoted);

    if !is_requester && !is_assigned && !open_to_providers {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not a party to this request".into(),
        )));
    }

    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/requests/{id}/cancel
///
/// Cancel a request. Only the requester may cancel, and only before a
/// provider has been engaged (`pending` or `quoted`).
pub async fn cancel_request(
    RequireClient(auth): RequireClient,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<CancelRequest>,
) -> AppResult<Json<DataResponse<ServiceRequest>>> {
    let request = load_request(&state, request_id).await?;
    if request.requester_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the requester may cancel".into(),
        )));
    }

    let current = RequestStatus::parse(&request.status)?;
    current.ensure_transition(RequestStatus::Cancelled)?;

    let updated = ServiceRequestRepo::cancel(
        &state.pool,
        request_id,
        auth.user_id,
        current,
        input.reason.as_deref(),
    )
    .await?;
    if !updated {
        return Err(AppError::Core(CoreError::Conflict(
            "Request was modified concurrently".into(),
        )));
    }

    state.event_bus.publish(
        PlatformEvent::new("request.cancelled")
            .with_source("service_request", request_id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "provider_id": request.assigned_provider_id,
            })),
    );
    state.dashboard_cache.invalidate(&auth.user_id).await;

    let request = load_request(&state, request_id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/requests/{id}/start
///
/// Begin work: `accepted -> in_progress`. Only the assigned provider.
pub async fn start_request(
    RequireProvider(auth): RequireProvider,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ServiceRequest>>> {
    let request = load_request(&state, request_id).await?;
    ensure_assigned(&request, auth.user_id)?;

    let current = RequestStatus::parse(&request.status)?;
    current.ensure_transition(RequestStatus::InProgress)?;

    let updated = ServiceRequestRepo::start(&state.pool, request_id, auth.user_id).await?;
    if !updated {
        return Err(AppError::Core(CoreError::Conflict(
            "Request was modified concurrently".into(),
        )));
    }

    state.event_bus.publish(
        PlatformEvent::new("request.started")
            .with_source("service_request", request_id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "requester_id": request.requester_id,
            })),
    );

    let request = load_request(&state, request_id).await?;
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/requests/{id}/complete
///
/// Finish work: `in_progress -> completed`. Only the assigned provider.
/// Also bumps the provider's completed-jobs counter.
pub async fn complete_request(
    RequireProvider(auth): RequireProvider,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ServiceRequest>>> {
    let request = load_request(&state, request_id).await?;
    ensure_assigned(&request, auth.user_id)?;

    let current = RequestStatus::parse(&request.status)?;
    current.ensure_transition(RequestStatus::Completed)?;

    let updated = ServiceRequestRepo::complete(&state.pool, request_id, auth.user_id).await?;
    if !updated {
        return Err(AppError::Core(CoreError::Conflict(
            "Request was modified concurrently".into(),
        )));
    }

    ProviderStatsRepo::record_completion(&state.pool, auth.user_id).await?;

    state.event_bus.publish(
        PlatformEvent::new("request.completed")
            .with_source("service_request", request_id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "requester_id": request.requester_id,
            })),
    );
    state.dashboard_cache.invalidate(&request.requester_id).await;
    state.dashboard_cache.invalidate(&auth.user_id).await;

    let request = load_request(&state, request_id).await?;
    Ok(Json(DataResponse { data: request }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a request or produce a typed 404.
async fn load_request(state: &AppState, request_id: DbId) -> AppResult<ServiceRequest> {
    ServiceRequestRepo::find_by_id(&state.pool, request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ServiceRequest",
            id: request_id,
        }))
}

/// Only the assigned provider may act on an engaged request.
fn ensure_assigned(request: &ServiceRequest, provider_id: DbId) -> Result<(), AppError> {
    if request.assigned_provider_id != Some(provider_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the assigned provider may act on this request".into(),
        )));
    }
    Ok(())
}
