use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{SwapListFilter, SwapStore, Transition};
use crate::{
    models::{ShiftAssignment, ShiftSwapRequest, ShiftSwapRow, SwapDashboard, SwapDirection},
    AppError, AppResult,
};

const SWAP_COLUMNS: &str = r#"
    id, requester_id, target_id, requester_slot_id, target_slot_id, status,
    reason, message, response_message, created_at, responded_at, updated_at
"#;

const ASSIGNMENT_BASE_QUERY: &str = r#"
    SELECT
        a.id,
        a.slot_id,
        a.employee_id,
        s.date,
        s.shift_type,
        a.active
    FROM shift_assignments a
    INNER JOIN shift_slots s ON a.slot_id = s.id
"#;

pub struct PgSwapStore {
    db: PgPool,
}

impl PgSwapStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn row_to_swap(row: ShiftSwapRow) -> AppResult<ShiftSwapRequest> {
    let id = row.id;
    ShiftSwapRequest::try_from(row).map_err(|e| {
        tracing::error!(error = %e, swap_id = %id, "Corrupt swap row");
        AppError::Internal(format!("Corrupt swap request {}: {}", id, e))
    })
}

#[async_trait]
impl SwapStore for PgSwapStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn find_assignment(&self, id: Uuid) -> AppResult<Option<ShiftAssignment>> {
        let assignment = sqlx::query_as::<_, ShiftAssignment>(&format!("{} WHERE a.id = $1", ASSIGNMENT_BASE_QUERY))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, assignment_id = %id, "Failed to fetch shift assignment");
                e
            })?;
        Ok(assignment)
    }

    async fn list_assignments(&self, employee_id: i32) -> AppResult<Vec<ShiftAssignment>> {
        let assignments = sqlx::query_as::<_, ShiftAssignment>(&format!(
            "{} WHERE a.employee_id = $1 AND a.active ORDER BY s.date, s.shift_type",
            ASSIGNMENT_BASE_QUERY
        ))
        .bind(employee_id)
        .fetch_all(&self.db)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch shift assignments");
            e
        })?;
        Ok(assignments)
    }

    async fn has_pending_offer(&self, assignment_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(SELECT 1 FROM shift_swap_requests WHERE requester_slot_id = $1 AND status = 'PENDING')"#,
        )
        .bind(assignment_id)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn insert_swap(&self, swap: &ShiftSwapRequest) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO shift_swap_requests (
                id, requester_id, target_id, requester_slot_id, target_slot_id, status,
                reason, message, response_message, created_at, responded_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(swap.id)
        .bind(swap.requester_id)
        .bind(swap.target_id)
        .bind(swap.requester_slot_id)
        .bind(swap.target_slot_id)
        .bind(swap.status.as_str())
        .bind(&swap.reason)
        .bind(&swap.message)
        .bind(&swap.response_message)
        .bind(swap.created_at)
        .bind(swap.responded_at)
        .bind(swap.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => AppError::Conflict(
                "This assignment is already offered in a pending swap request".to_string(),
            ),
            e => {
                tracing::error!(error = %e, swap_id = %swap.id, "Failed to insert swap request");
                AppError::Database(e)
            }
        })?;
        Ok(())
    }

    async fn find_swap(&self, id: Uuid) -> AppResult<Option<ShiftSwapRequest>> {
        let row = sqlx::query_as::<_, ShiftSwapRow>(&format!(
            "SELECT {} FROM shift_swap_requests WHERE id = $1",
            SWAP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(row_to_swap).transpose()
    }

    async fn list_swaps(&self, filter: &SwapListFilter) -> AppResult<(Vec<ShiftSwapRequest>, i64)> {
        let column = match filter.direction {
            SwapDirection::Sent => "requester_id",
            SwapDirection::Received => "target_id",
        };

        let mut where_clause = format!("WHERE {} = $1", column);
        let mut next_param = 2;
        if filter.status.is_some() {
            where_clause.push_str(" AND status = $2");
            next_param = 3;
        }

        let count_sql = format!("SELECT COUNT(*) FROM shift_swap_requests {}", where_clause);
        let list_sql = format!(
            "SELECT {} FROM shift_swap_requests {} ORDER BY created_at DESC, id LIMIT ${} OFFSET ${}",
            SWAP_COLUMNS,
            where_clause,
            next_param,
            next_param + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(filter.employee_id);
        let mut list_query = sqlx::query_as::<_, ShiftSwapRow>(&list_sql).bind(filter.employee_id);
        if let Some(status) = filter.status {
            count_query = count_query.bind(status.as_str());
            list_query = list_query.bind(status.as_str());
        }

        let total = count_query.fetch_one(&self.db).await?;
        let rows = list_query
            .bind(filter.limit as i64)
            .bind(filter.offset())
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, employee_id = filter.employee_id, direction = filter.direction.as_str(), "Failed to list swap requests");
                e
            })?;

        let swaps = rows.into_iter().map(row_to_swap).collect::<AppResult<Vec<_>>>()?;
        Ok((swaps, total))
    }

    async fn count_pending(&self, employee_id: i32) -> AppResult<SwapDashboard> {
        let (pending_sent, pending_received): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE requester_id = $1),
                COUNT(*) FILTER (WHERE target_id = $1)
            FROM shift_swap_requests
            WHERE status = 'PENDING' AND (requester_id = $1 OR target_id = $1)
            "#,
        )
        .bind(employee_id)
        .fetch_one(&self.db)
        .await?;

        Ok(SwapDashboard {
            pending_sent,
            pending_received,
        })
    }

    async fn apply_transition(
        &self,
        id: Uuid,
        transition: &Transition,
    ) -> AppResult<Option<ShiftSwapRequest>> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, ShiftSwapRow>(&format!(
            r#"
            UPDATE shift_swap_requests
            SET status = $1,
                response_message = COALESCE($2, response_message),
                responded_at = CASE WHEN $3 THEN $4 ELSE responded_at END,
                updated_at = $4
            WHERE id = $5 AND status = $6
            RETURNING {}
            "#,
            SWAP_COLUMNS
        ))
        .bind(transition.to.as_str())
        .bind(&transition.response_message)
        .bind(transition.responded)
        .bind(transition.at)
        .bind(id)
        .bind(transition.from.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let swap = row_to_swap(row)?;

        if transition.exchange_assignments {
            exchange_assignments(&mut tx, &swap).await?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!(error = %e, swap_id = %id, to = %transition.to, "Transaction rollback in apply_transition");
            AppError::Internal(format!("Failed to commit transition for swap request {}: {}", id, e))
        })?;

        Ok(Some(swap))
    }
}

/// Hands each assignment to the other employee, after locking both rows and
/// checking they are still held as the request states.
async fn exchange_assignments(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    swap: &ShiftSwapRequest,
) -> AppResult<()> {
    let held: Vec<(Uuid, i32, bool)> = sqlx::query_as(
        r#"SELECT id, employee_id, active FROM shift_assignments WHERE id = ANY($1) FOR UPDATE"#,
    )
    .bind(vec![swap.requester_slot_id, swap.target_slot_id])
    .fetch_all(&mut **tx)
    .await?;

    let holds = |assignment_id: Uuid, employee_id: i32| {
        held.iter()
            .any(|(id, owner, active)| *id == assignment_id && *owner == employee_id && *active)
    };

    if !holds(swap.requester_slot_id, swap.requester_id) || !holds(swap.target_slot_id, swap.target_id) {
        tracing::warn!(swap_id = %swap.id, "Swap assignments changed since the request was created");
        return Err(AppError::Conflict(
            "The shift assignments in this request have changed and can no longer be swapped".to_string(),
        ));
    }

    sqlx::query(r#"UPDATE shift_assignments SET employee_id = $1 WHERE id = $2"#)
        .bind(swap.target_id)
        .bind(swap.requester_slot_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query(r#"UPDATE shift_assignments SET employee_id = $1 WHERE id = $2"#)
        .bind(swap.requester_id)
        .bind(swap.target_slot_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}
