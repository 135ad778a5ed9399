use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::lifecycle::SwapStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSwapRequest {
    pub id: Uuid,
    pub requester_id: i32,
    pub target_id: i32,
    pub requester_slot_id: Uuid,
    pub target_slot_id: Uuid,
    pub status: SwapStatus,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub response_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ShiftSwapRequest {
    pub fn involves(&self, employee_id: i32) -> bool {
        self.requester_id == employee_id || self.target_id == employee_id
    }
}

/// Database row; `status` is stored as TEXT.
#[derive(Debug, FromRow)]
pub struct ShiftSwapRow {
    pub id: Uuid,
    pub requester_id: i32,
    pub target_id: i32,
    pub requester_slot_id: Uuid,
    pub target_slot_id: Uuid,
    pub status: String,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub response_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ShiftSwapRow> for ShiftSwapRequest {
    type Error = String;

    fn try_from(row: ShiftSwapRow) -> Result<Self, Self::Error> {
        Ok(ShiftSwapRequest {
            id: row.id,
            requester_id: row.requester_id,
            target_id: row.target_id,
            requester_slot_id: row.requester_slot_id,
            target_slot_id: row.target_slot_id,
            status: row.status.parse()?,
            reason: row.reason,
            message: row.message,
            response_message: row.response_message,
            created_at: row.created_at,
            responded_at: row.responded_at,
            updated_at: row.updated_at,
        })
    }
}

/// Which side of a request the caller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SwapDirection {
    Sent,
    Received,
}

impl SwapDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapDirection::Sent => "sent",
            SwapDirection::Received => "received",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl PageMeta {
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let total_pages = if total <= 0 {
            0
        } else {
            ((total as u64 + limit as u64 - 1) / limit as u64) as u32
        };
        Self {
            total,
            page,
            limit,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SwapPage {
    pub data: Vec<ShiftSwapRequest>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwapDashboard {
    pub pending_sent: i64,
    pub pending_received: i64,
}
