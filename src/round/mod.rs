//! Per-round machinery: the submission barrier and the countdown timer.
//!
//! Both are owned by the match session. Neither knows about scoring.

pub mod barrier;
pub mod timer;

pub use barrier::{BarrierResponse, SubmissionBarrier};
pub use timer::{RoundTimer, TimerUpdate};
