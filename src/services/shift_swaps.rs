use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    extractors::AuthenticatedEmployee,
    lifecycle::{validate_transition, SwapDecision, SwapStatus},
    models::{
        CreateShiftSwapInput, ListShiftSwapsQuery, PageMeta, RespondShiftSwapInput, ShiftAssignment,
        ShiftSwapRequest, SwapDashboard, SwapPage,
    },
    store::{SwapListFilter, SwapStore, Transition},
    AppError, AppResult,
};

pub const MAX_TEXT_LEN: usize = 500;
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Owns the swap lifecycle: every status change goes through here and is
/// applied as a compare-and-set against the store.
pub struct ShiftSwapService {
    store: Arc<dyn SwapStore>,
    auto_complete: bool,
}

impl ShiftSwapService {
    pub fn new(store: Arc<dyn SwapStore>, auto_complete: bool) -> Self {
        Self { store, auto_complete }
    }

    pub fn store(&self) -> &Arc<dyn SwapStore> {
        &self.store
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedEmployee,
        input: CreateShiftSwapInput,
    ) -> AppResult<ShiftSwapRequest> {
        if input.target_id == actor.employee_id {
            return Err(AppError::BadRequest("You cannot request a swap with yourself".to_string()));
        }
        if input.requester_slot_id == input.target_slot_id {
            return Err(AppError::BadRequest(
                "requesterSlotId and targetSlotId must name different assignments".to_string(),
            ));
        }
        let reason = normalize_text("reason", input.reason)?;
        let message = normalize_text("message", input.message)?;

        let offered = self
            .store
            .find_assignment(input.requester_slot_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shift assignment {} not found", input.requester_slot_id)))?;

        if !offered.is_held_by(actor.employee_id) {
            tracing::warn!(
                employee_id = actor.employee_id,
                assignment_id = %offered.id,
                "Attempted to offer an assignment the employee does not hold"
            );
            return Err(AppError::Forbidden(
                "You can only offer your own active shift assignments".to_string(),
            ));
        }

        let wanted = self
            .store
            .find_assignment(input.target_slot_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shift assignment {} not found", input.target_slot_id)))?;

        if !wanted.is_held_by(input.target_id) {
            return Err(AppError::BadRequest(format!(
                "Shift assignment {} is not an active assignment of employee {}",
                wanted.id, input.target_id
            )));
        }

        if self.store.has_pending_offer(offered.id).await? {
            return Err(AppError::Conflict(
                "This assignment is already offered in a pending swap request".to_string(),
            ));
        }

        let now = Utc::now();
        let swap = ShiftSwapRequest {
            id: Uuid::new_v4(),
            requester_id: actor.employee_id,
            target_id: input.target_id,
            requester_slot_id: offered.id,
            target_slot_id: wanted.id,
            status: SwapStatus::Pending,
            reason,
            message,
            response_message: None,
            created_at: now,
            responded_at: None,
            updated_at: now,
        };

        self.store.insert_swap(&swap).await?;

        tracing::info!(
            swap_id = %swap.id,
            requester_id = swap.requester_id,
            target_id = swap.target_id,
            "Shift swap requested"
        );
        metrics::counter!("shift_swap_transitions_total", "to" => SwapStatus::Pending.as_str()).increment(1);

        Ok(swap)
    }

    pub async fn respond(
        &self,
        actor: &AuthenticatedEmployee,
        id: Uuid,
        input: RespondShiftSwapInput,
    ) -> AppResult<ShiftSwapRequest> {
        let swap = self.find(id).await?;

        if swap.target_id != actor.employee_id {
            return Err(AppError::Forbidden("You are not the target of this swap request".to_string()));
        }
        ensure_pending(&swap)?;

        let response_message = normalize_text("responseMessage", input.response_message)?;
        let to = SwapStatus::from(input.status);

        let updated = self
            .transition(
                &swap,
                Transition {
                    from: SwapStatus::Pending,
                    to,
                    at: Utc::now(),
                    response_message,
                    responded: true,
                    exchange_assignments: input.status == SwapDecision::Accepted,
                },
            )
            .await?;

        tracing::info!(swap_id = %id, target_id = actor.employee_id, status = %to, "Target responded to swap request");

        if to == SwapStatus::Accepted && self.auto_complete {
            return Ok(self.auto_complete(updated).await);
        }

        Ok(updated)
    }

    pub async fn cancel(&self, actor: &AuthenticatedEmployee, id: Uuid) -> AppResult<ShiftSwapRequest> {
        let swap = self.find(id).await?;

        if swap.requester_id != actor.employee_id {
            return Err(AppError::Forbidden("You can only cancel your own swap requests".to_string()));
        }
        ensure_pending(&swap)?;

        let updated = self
            .transition(&swap, Transition {
                from: SwapStatus::Pending,
                to: SwapStatus::Cancelled,
                at: Utc::now(),
                response_message: None,
                responded: false,
                exchange_assignments: false,
            })
            .await?;

        tracing::info!(swap_id = %id, requester_id = actor.employee_id, "Swap request cancelled");
        Ok(updated)
    }

    pub async fn complete(&self, actor: &AuthenticatedEmployee, id: Uuid) -> AppResult<ShiftSwapRequest> {
        if !actor.is_manager() {
            tracing::warn!(employee_id = actor.employee_id, swap_id = %id, "Non-manager attempted to complete swap");
            return Err(AppError::Forbidden("Only managers can complete swap requests".to_string()));
        }

        let swap = self.find(id).await?;
        if swap.status != SwapStatus::Accepted {
            return Err(AppError::Conflict(format!(
                "Only ACCEPTED requests can be completed, current status: {}",
                swap.status
            )));
        }

        let updated = self
            .transition(&swap, Transition {
                from: SwapStatus::Accepted,
                to: SwapStatus::Completed,
                at: Utc::now(),
                response_message: None,
                responded: false,
                exchange_assignments: false,
            })
            .await?;

        tracing::info!(swap_id = %id, manager_id = actor.employee_id, "Swap request completed");
        Ok(updated)
    }

    pub async fn get(&self, actor: &AuthenticatedEmployee, id: Uuid) -> AppResult<ShiftSwapRequest> {
        let swap = self.find(id).await?;
        if !swap.involves(actor.employee_id) && !actor.is_manager() {
            return Err(AppError::Forbidden("You are not a participant in this swap request".to_string()));
        }
        Ok(swap)
    }

    pub async fn list(&self, actor: &AuthenticatedEmployee, query: ListShiftSwapsQuery) -> AppResult<SwapPage> {
        let page = query.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::BadRequest("page must be at least 1".to_string()));
        }
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(AppError::BadRequest(format!("limit must be between 1 and {}", MAX_PAGE_LIMIT)));
        }

        let filter = SwapListFilter {
            employee_id: actor.employee_id,
            direction: query.direction,
            status: query.status,
            page,
            limit,
        };
        let (data, total) = self.store.list_swaps(&filter).await?;

        tracing::debug!(
            employee_id = actor.employee_id,
            direction = query.direction.as_str(),
            count = data.len(),
            total,
            "Listed swap requests"
        );

        Ok(SwapPage {
            data,
            meta: PageMeta::new(total, page, limit),
        })
    }

    pub async fn dashboard(&self, actor: &AuthenticatedEmployee) -> AppResult<SwapDashboard> {
        self.store.count_pending(actor.employee_id).await
    }

    pub async fn swappable_assignments(
        &self,
        actor: &AuthenticatedEmployee,
        employee_id: Option<i32>,
    ) -> AppResult<Vec<ShiftAssignment>> {
        self.store.list_assignments(employee_id.unwrap_or(actor.employee_id)).await
    }

    /// The accept is already committed here, so a failure to complete only
    /// downgrades the result to the freshest record available.
    async fn auto_complete(&self, accepted: ShiftSwapRequest) -> ShiftSwapRequest {
        let completion = Transition {
            from: SwapStatus::Accepted,
            to: SwapStatus::Completed,
            at: Utc::now(),
            response_message: None,
            responded: false,
            exchange_assignments: false,
        };

        match self.transition(&accepted, completion).await {
            Ok(completed) => {
                tracing::info!(swap_id = %accepted.id, "Swap auto-completed");
                completed
            }
            Err(e) => {
                tracing::warn!(swap_id = %accepted.id, error = %e, "Auto-complete not applied; accept stands");
                match self.store.find_swap(accepted.id).await {
                    Ok(Some(current)) => current,
                    Ok(None) => accepted,
                    Err(e) => {
                        tracing::error!(swap_id = %accepted.id, error = %e, "Failed to re-read swap after auto-complete");
                        accepted
                    }
                }
            }
        }
    }

    async fn find(&self, id: Uuid) -> AppResult<ShiftSwapRequest> {
        self.store
            .find_swap(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Swap request {} not found", id)))
    }

    async fn transition(&self, swap: &ShiftSwapRequest, transition: Transition) -> AppResult<ShiftSwapRequest> {
        validate_transition(transition.from, transition.to)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        match self.store.apply_transition(swap.id, &transition).await? {
            Some(updated) => {
                metrics::counter!("shift_swap_transitions_total", "to" => transition.to.as_str()).increment(1);
                Ok(updated)
            }
            None => {
                // Lost a race: someone else moved the request first.
                let current = self.find(swap.id).await?;
                tracing::info!(swap_id = %swap.id, status = %current.status, "Stale swap transition rejected");
                Err(stale_from(transition.from, &current))
            }
        }
    }
}

fn ensure_pending(swap: &ShiftSwapRequest) -> AppResult<()> {
    if swap.status == SwapStatus::Pending {
        Ok(())
    } else {
        Err(stale(swap))
    }
}

fn stale(swap: &ShiftSwapRequest) -> AppError {
    stale_from(SwapStatus::Pending, swap)
}

fn stale_from(expected: SwapStatus, swap: &ShiftSwapRequest) -> AppError {
    let expected = match expected {
        SwapStatus::Pending => "pending".to_string(),
        other => other.to_string(),
    };
    AppError::Conflict(format!(
        "Request is no longer {}, current status: {}",
        expected, swap.status
    ))
}

fn normalize_text(field: &str, value: Option<String>) -> AppResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::Validation(format!("{} must be at most {} characters", field, MAX_TEXT_LEN)));
    }
    Ok(Some(trimmed.to_string()))
}
