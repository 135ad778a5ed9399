use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::shift_swap::SwapDirection;
use crate::lifecycle::{SwapDecision, SwapStatus};

/// Input for proposing a swap of the caller's assignment with a colleague's
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateShiftSwapInput {
    pub target_id: i32,
    pub requester_slot_id: Uuid,
    pub target_slot_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Input for the target employee's answer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespondShiftSwapInput {
    pub status: SwapDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListShiftSwapsQuery {
    #[serde(rename = "type")]
    #[param(rename = "type")]
    pub direction: SwapDirection,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<SwapStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListAssignmentsQuery {
    #[serde(rename = "employeeId")]
    #[param(rename = "employeeId")]
    pub employee_id: Option<i32>,
}
