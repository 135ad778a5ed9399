use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    lifecycle::SwapStatus,
    models::{ShiftAssignment, ShiftSwapRequest, SwapDashboard, SwapDirection},
    AppResult,
};

pub mod memory;
pub mod postgres;

pub use memory::MemorySwapStore;
pub use postgres::PgSwapStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapListFilter {
    pub employee_id: i32,
    pub direction: SwapDirection,
    pub status: Option<SwapStatus>,
    pub page: u32,
    pub limit: u32,
}

impl SwapListFilter {
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.limit as i64
    }

    pub fn matches(&self, swap: &ShiftSwapRequest) -> bool {
        let side = match self.direction {
            SwapDirection::Sent => swap.requester_id,
            SwapDirection::Received => swap.target_id,
        };
        side == self.employee_id && self.status.map_or(true, |s| s == swap.status)
    }
}

/// A compare-and-set status change. Applied only while the stored status
/// still equals `from`.
#[derive(Debug, Clone)]
pub struct Transition {
    pub from: SwapStatus,
    pub to: SwapStatus,
    pub at: DateTime<Utc>,
    pub response_message: Option<String>,
    /// Stamp `responded_at` with `at`.
    pub responded: bool,
    /// Hand each assignment to the other employee in the same atomic unit.
    pub exchange_assignments: bool,
}

#[async_trait]
pub trait SwapStore: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn find_assignment(&self, id: Uuid) -> AppResult<Option<ShiftAssignment>>;

    /// Active assignments held by the employee, ordered by date.
    async fn list_assignments(&self, employee_id: i32) -> AppResult<Vec<ShiftAssignment>>;

    /// Whether a PENDING request already offers this assignment.
    async fn has_pending_offer(&self, assignment_id: Uuid) -> AppResult<bool>;

    async fn insert_swap(&self, swap: &ShiftSwapRequest) -> AppResult<()>;

    async fn find_swap(&self, id: Uuid) -> AppResult<Option<ShiftSwapRequest>>;

    /// One page of matching requests, newest first, plus the total match count.
    async fn list_swaps(&self, filter: &SwapListFilter) -> AppResult<(Vec<ShiftSwapRequest>, i64)>;

    async fn count_pending(&self, employee_id: i32) -> AppResult<SwapDashboard>;

    /// Returns `Ok(None)` when the request is missing or no longer in
    /// `transition.from`. Fails with `Conflict` if an exchange is requested and
    /// either assignment has changed hands or been deactivated.
    async fn apply_transition(
        &self,
        id: Uuid,
        transition: &Transition,
    ) -> AppResult<Option<ShiftSwapRequest>>;
}
