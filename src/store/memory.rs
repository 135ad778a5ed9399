use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{SwapListFilter, SwapStore, Transition};
use crate::{
    lifecycle::SwapStatus,
    models::{ShiftAssignment, ShiftSwapRequest, SwapDashboard},
    AppError, AppResult,
};

#[derive(Default)]
struct MemoryState {
    assignments: HashMap<Uuid, ShiftAssignment>,
    // Insertion sequence breaks ties between equal created_at values.
    swaps: HashMap<Uuid, (u64, ShiftSwapRequest)>,
    next_seq: u64,
}

/// Process-local store. A single lock guards assignments and requests so a
/// transition and its assignment exchange are observed together.
#[derive(Default)]
pub struct MemorySwapStore {
    state: RwLock<MemoryState>,
}

impl MemorySwapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_assignment(&self, assignment: ShiftAssignment) {
        let mut state = self.state.write().await;
        state.assignments.insert(assignment.id, assignment);
    }

    pub async fn set_assignment_active(&self, id: Uuid, active: bool) -> bool {
        let mut state = self.state.write().await;
        match state.assignments.get_mut(&id) {
            Some(assignment) => {
                assignment.active = active;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl SwapStore for MemorySwapStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_assignment(&self, id: Uuid) -> AppResult<Option<ShiftAssignment>> {
        Ok(self.state.read().await.assignments.get(&id).cloned())
    }

    async fn list_assignments(&self, employee_id: i32) -> AppResult<Vec<ShiftAssignment>> {
        let state = self.state.read().await;
        let mut assignments: Vec<ShiftAssignment> = state
            .assignments
            .values()
            .filter(|a| a.is_held_by(employee_id))
            .cloned()
            .collect();
        assignments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.shift_type.cmp(&b.shift_type)));
        Ok(assignments)
    }

    async fn has_pending_offer(&self, assignment_id: Uuid) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .swaps
            .values()
            .any(|(_, s)| s.status == SwapStatus::Pending && s.requester_slot_id == assignment_id))
    }

    async fn insert_swap(&self, swap: &ShiftSwapRequest) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.swaps.contains_key(&swap.id) {
            return Err(AppError::Conflict(format!("Swap request {} already exists", swap.id)));
        }
        // Mirrors the partial unique index on pending requester slots.
        let duplicate_offer = state.swaps.values().any(|(_, s)| {
            s.status == SwapStatus::Pending && s.requester_slot_id == swap.requester_slot_id
        });
        if swap.status == SwapStatus::Pending && duplicate_offer {
            return Err(AppError::Conflict(
                "This assignment is already offered in a pending swap request".to_string(),
            ));
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.swaps.insert(swap.id, (seq, swap.clone()));
        Ok(())
    }

    async fn find_swap(&self, id: Uuid) -> AppResult<Option<ShiftSwapRequest>> {
        Ok(self.state.read().await.swaps.get(&id).map(|(_, s)| s.clone()))
    }

    async fn list_swaps(&self, filter: &SwapListFilter) -> AppResult<(Vec<ShiftSwapRequest>, i64)> {
        let state = self.state.read().await;
        let mut matching: Vec<&(u64, ShiftSwapRequest)> =
            state.swaps.values().filter(|(_, s)| filter.matches(s)).collect();
        matching.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then_with(|| seq_b.cmp(seq_a))
        });

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .map(|(_, s)| s.clone())
            .collect();
        Ok((page, total))
    }

    async fn count_pending(&self, employee_id: i32) -> AppResult<SwapDashboard> {
        let state = self.state.read().await;
        let pending = state.swaps.values().map(|(_, s)| s).filter(|s| s.status == SwapStatus::Pending);
        let mut dashboard = SwapDashboard {
            pending_sent: 0,
            pending_received: 0,
        };
        for swap in pending {
            if swap.requester_id == employee_id {
                dashboard.pending_sent += 1;
            }
            if swap.target_id == employee_id {
                dashboard.pending_received += 1;
            }
        }
        Ok(dashboard)
    }

    async fn apply_transition(
        &self,
        id: Uuid,
        transition: &Transition,
    ) -> AppResult<Option<ShiftSwapRequest>> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let Some((_, swap)) = state.swaps.get_mut(&id) else {
            return Ok(None);
        };
        if swap.status != transition.from {
            return Ok(None);
        }

        if transition.exchange_assignments {
            let requester_holds = state
                .assignments
                .get(&swap.requester_slot_id)
                .is_some_and(|a| a.is_held_by(swap.requester_id));
            let target_holds = state
                .assignments
                .get(&swap.target_slot_id)
                .is_some_and(|a| a.is_held_by(swap.target_id));
            if !requester_holds || !target_holds {
                return Err(AppError::Conflict(
                    "The shift assignments in this request have changed and can no longer be swapped"
                        .to_string(),
                ));
            }
            if let Some(a) = state.assignments.get_mut(&swap.requester_slot_id) {
                a.employee_id = swap.target_id;
            }
            if let Some(a) = state.assignments.get_mut(&swap.target_slot_id) {
                a.employee_id = swap.requester_id;
            }
        }

        swap.status = transition.to;
        swap.updated_at = transition.at;
        if transition.responded {
            swap.responded_at = Some(transition.at);
        }
        if transition.response_message.is_some() {
            swap.response_message = transition.response_message.clone();
        }
        Ok(Some(swap.clone()))
    }
}
