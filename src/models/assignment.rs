use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// An employee's signup against a shift slot. Swap requests name these by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAssignment {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub employee_id: i32,
    pub date: NaiveDate,
    pub shift_type: String,
    pub active: bool,
}

impl ShiftAssignment {
    pub fn is_held_by(&self, employee_id: i32) -> bool {
        self.active && self.employee_id == employee_id
    }
}
