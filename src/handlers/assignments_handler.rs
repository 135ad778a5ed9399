use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::{
    extractors::AuthenticatedEmployee,
    models::{ListAssignmentsQuery, ShiftAssignment},
    AppResult, AppState,
};

/// GET /api/shift-assignments?employeeId=
#[utoipa::path(
    get,
    path = "/api/shift-assignments",
    params(ListAssignmentsQuery),
    responses(
        (status = 200, description = "Active assignments of the employee (default: caller), ordered by date", body = Vec<ShiftAssignment>)
    ),
    tag = "shift-assignments",
    security(("bearer_auth" = []))
)]
pub async fn get_swappable_assignments(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Query(query): Query<ListAssignmentsQuery>,
) -> AppResult<Json<Vec<ShiftAssignment>>> {
    let assignments = state.swaps.swappable_assignments(&auth, query.employee_id).await?;
    tracing::debug!(employee_id = ?query.employee_id, count = assignments.len(), "Fetched swappable assignments");
    Ok(Json(assignments))
}
