//! Premium gating for picks and the free daily pick.

pub mod gate;
pub mod usage;

pub use gate::{
    evaluate, evaluate_free_pick, present, present_free_pick, AccessState, FreePickStep,
    GateInput, Presentation,
};
pub use usage::{next_daily_reset, remaining_uses, AccessLimits, UserAccessState, ViewCount};
