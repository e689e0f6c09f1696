//! Match events and the subscriber list that delivers them.
//!
//! ## Example Usage
//!
//! ```
//! use pick_or_perish::events::{EventBus, MatchEvent, SubscriberId};
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let mut bus = EventBus::new();
//!
//! let sink = Arc::clone(&seen);
//! bus.subscribe(SubscriberId::new(1), move |event| {
//!     sink.lock().unwrap().push(event.kind());
//! });
//!
//! bus.publish(&MatchEvent::MatchEnded { winner: None });
//! assert_eq!(*seen.lock().unwrap(), vec!["match_ended"]);
//! ```

mod bus;
mod event;

pub use bus::{EventBus, EventHandler, SubscriberId};
pub use event::{CountdownPhase, MatchEvent};
