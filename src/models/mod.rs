pub mod assignment;
pub mod shift_swap;
pub mod shift_swap_input;

pub use assignment::ShiftAssignment;
pub use shift_swap::{PageMeta, ShiftSwapRequest, ShiftSwapRow, SwapDashboard, SwapDirection, SwapPage};
pub use shift_swap_input::{CreateShiftSwapInput, ListAssignmentsQuery, ListShiftSwapsQuery, RespondShiftSwapInput};
