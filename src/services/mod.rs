pub mod shift_swaps;

pub use shift_swaps::ShiftSwapService;
