use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    extractors::AuthenticatedEmployee,
    models::{CreateShiftSwapInput, ListShiftSwapsQuery, RespondShiftSwapInput, ShiftSwapRequest, SwapDashboard, SwapPage},
    AppResult, AppState,
};

/// POST /api/shift-swaps - Propose a swap of the caller's assignment
#[utoipa::path(
    post,
    path = "/api/shift-swaps",
    request_body = CreateShiftSwapInput,
    responses(
        (status = 200, description = "Swap request created in PENDING status", body = ShiftSwapRequest),
        (status = 400, description = "Target is the caller, slots are identical, or target slot is not held by the target"),
        (status = 403, description = "Requester slot is not the caller's active assignment"),
        (status = 404, description = "Shift assignment not found"),
        (status = 409, description = "Assignment already offered in a pending request"),
        (status = 422, description = "Text field too long")
    ),
    tag = "shift-swaps",
    security(("bearer_auth" = []))
)]
pub async fn create_shift_swap(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Json(input): Json<CreateShiftSwapInput>,
) -> AppResult<Json<ShiftSwapRequest>> {
    let swap = state.swaps.create(&auth, input).await?;
    Ok(Json(swap))
}

/// GET /api/shift-swaps?type=sent|received&page=&limit=&status=
#[utoipa::path(
    get,
    path = "/api/shift-swaps",
    params(ListShiftSwapsQuery),
    responses(
        (status = 200, description = "Page of swap requests sent or received by the caller, newest first", body = SwapPage),
        (status = 400, description = "Invalid paging parameters")
    ),
    tag = "shift-swaps",
    security(("bearer_auth" = []))
)]
pub async fn list_shift_swaps(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Query(query): Query<ListShiftSwapsQuery>,
) -> AppResult<Json<SwapPage>> {
    let page = state.swaps.list(&auth, query).await?;
    Ok(Json(page))
}

/// GET /api/shift-swaps/dashboard
#[utoipa::path(
    get,
    path = "/api/shift-swaps/dashboard",
    responses(
        (status = 200, description = "Pending request counts for the caller", body = SwapDashboard)
    ),
    tag = "shift-swaps",
    security(("bearer_auth" = []))
)]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
) -> AppResult<Json<SwapDashboard>> {
    let dashboard = state.swaps.dashboard(&auth).await?;
    Ok(Json(dashboard))
}

/// GET /api/shift-swaps/{id}
#[utoipa::path(
    get,
    path = "/api/shift-swaps/{id}",
    params(
        ("id" = Uuid, Path, description = "Swap request ID")
    ),
    responses(
        (status = 200, description = "The swap request", body = ShiftSwapRequest),
        (status = 403, description = "Caller is neither a participant nor a manager"),
        (status = 404, description = "Request not found")
    ),
    tag = "shift-swaps",
    security(("bearer_auth" = []))
)]
pub async fn get_shift_swap(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ShiftSwapRequest>> {
    let swap = state.swaps.get(&auth, id).await?;
    Ok(Json(swap))
}

/// PATCH /api/shift-swaps/{id}/respond - Target accepts or rejects
#[utoipa::path(
    patch,
    path = "/api/shift-swaps/{id}/respond",
    params(
        ("id" = Uuid, Path, description = "Swap request ID")
    ),
    request_body = RespondShiftSwapInput,
    responses(
        (status = 200, description = "Request accepted (assignments swapped) or rejected", body = ShiftSwapRequest),
        (status = 403, description = "You are not the target of this swap request"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending, or its assignments changed")
    ),
    tag = "shift-swaps",
    security(("bearer_auth" = []))
)]
pub async fn respond_to_shift_swap(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(input): Json<RespondShiftSwapInput>,
) -> AppResult<Json<ShiftSwapRequest>> {
    let swap = state.swaps.respond(&auth, id, input).await?;
    Ok(Json(swap))
}

/// PATCH /api/shift-swaps/{id}/cancel - Requester withdraws a pending request
#[utoipa::path(
    patch,
    path = "/api/shift-swaps/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Swap request ID")
    ),
    responses(
        (status = 200, description = "Request cancelled", body = ShiftSwapRequest),
        (status = 403, description = "You can only cancel your own swap requests"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending")
    ),
    tag = "shift-swaps",
    security(("bearer_auth" = []))
)]
pub async fn cancel_shift_swap(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ShiftSwapRequest>> {
    let swap = state.swaps.cancel(&auth, id).await?;
    Ok(Json(swap))
}

/// PATCH /api/shift-swaps/{id}/complete - Manager marks an accepted swap as carried out
#[utoipa::path(
    patch,
    path = "/api/shift-swaps/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Swap request ID")
    ),
    responses(
        (status = 200, description = "Request completed", body = ShiftSwapRequest),
        (status = 403, description = "Only managers can complete swap requests"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not ACCEPTED")
    ),
    tag = "shift-swaps",
    security(("bearer_auth" = []))
)]
pub async fn complete_shift_swap(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ShiftSwapRequest>> {
    let swap = state.swaps.complete(&auth, id).await?;
    Ok(Json(swap))
}
