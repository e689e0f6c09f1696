//! Match orchestration.
//!
//! [`MatchSession`] drives a match through its phases:
//! countdown → collection → resolution → scoring → elimination → next round
//! or match end. It owns the registry, barrier, and timer and calls the rule
//! engine; nothing else mutates match state.
//!
//! ## Example Usage
//!
//! ```
//! use pick_or_perish::core::{MatchConfig, PlayerId, PlayerProfile};
//! use pick_or_perish::session::{MatchPhase, MatchSession, SubmitResponse};
//!
//! let config = MatchConfig::default().with_timings(0, 25, 0);
//! let mut session = MatchSession::new(config).unwrap();
//! for id in 1..=3 {
//!     session.register_player(&PlayerProfile::new(PlayerId::new(id), format!("P{id}"))).unwrap();
//! }
//! session.start_match().unwrap();
//!
//! assert_eq!(session.submit(PlayerId::new(1), 10), Ok(SubmitResponse::Accepted));
//! session.submit(PlayerId::new(2), 30).unwrap();
//! session.submit(PlayerId::new(3), 80).unwrap();
//!
//! // All three in: round 1 resolved, round 2 already collecting.
//! let outcome = session.last_outcome().unwrap();
//! assert!(outcome.is_winner(PlayerId::new(2)));
//! assert_eq!(session.current_round_number(), 2);
//! assert_eq!(session.phase(), MatchPhase::CollectingSubmissions);
//! ```

mod machine;
mod phase;

pub use machine::{IgnoreReason, MatchSession, SubmitResponse};
pub use phase::MatchPhase;
