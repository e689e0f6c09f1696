//! Async host for a match session.
//!
//! The host is the one authoritative owner of a [`MatchSession`] at runtime.
//! It runs on a tokio task: commands from any number of connections arrive
//! over an `mpsc` channel and are applied one at a time, a `tokio::time`
//! interval drives the session clock, and events fan out on a `broadcast`
//! channel for the transport layer to relay.
//!
//! The session itself stays synchronous and lock-free; serialization comes
//! from the single task owning it.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::core::error::{MatchResult, SubmitResult};
use crate::core::{PlayerId, RegistryView};
use crate::events::{MatchEvent, SubscriberId};
use crate::record::MatchRecord;
use crate::rules::{RoundOutcome, RuleEngine};
use crate::session::{MatchPhase, MatchSession, SubmitResponse};

/// Subscriber slot used for the broadcast bridge.
const BROADCAST_SUBSCRIBER: SubscriberId = SubscriberId::new(0);

/// Host channel failures.
#[derive(Error, Debug)]
pub enum HostError {
    /// The host task is no longer running.
    #[error("match host has shut down")]
    Closed,

    /// The host task panicked or was cancelled.
    #[error("match host task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type for host calls.
pub type HostResult<T> = Result<T, HostError>;

/// Read-only view of the match for newly connected clients.
#[derive(Clone, Debug)]
pub struct HostSnapshot {
    /// Current phase.
    pub phase: MatchPhase,
    /// Current round number.
    pub round: u32,
    /// All players with scores and states.
    pub players: RegistryView,
    /// Most recent outcome.
    pub last_outcome: Option<RoundOutcome>,
    /// Seconds left on the running countdown.
    pub seconds_remaining: u32,
    /// Winner, if the match has ended with one.
    pub winner: Option<PlayerId>,
}

/// Host settings.
#[derive(Clone, Copy, Debug)]
pub struct HostConfig {
    /// How often the session clock advances.
    pub tick: Duration,
    /// Command queue depth.
    pub command_capacity: usize,
    /// Event buffer per subscriber.
    pub event_capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            command_capacity: 256,
            event_capacity: 1024,
        }
    }
}

enum Command {
    Start(oneshot::Sender<MatchResult<()>>),
    Submit(PlayerId, i32, oneshot::Sender<SubmitResult<SubmitResponse>>),
    Stage(PlayerId, i32, oneshot::Sender<SubmitResult<()>>),
    Abort(oneshot::Sender<MatchResult<()>>),
    Snapshot(oneshot::Sender<HostSnapshot>),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Start(_) => "Start",
            Command::Submit(..) => "Submit",
            Command::Stage(..) => "Stage",
            Command::Abort(_) => "Abort",
            Command::Snapshot(_) => "Snapshot",
        };
        f.write_str(name)
    }
}

/// Client-side handle. Cheap to clone for each connection.
#[derive(Clone, Debug)]
pub struct HostHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<MatchEvent>,
}

impl HostHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> HostResult<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| HostError::Closed)?;
        response.await.map_err(|_| HostError::Closed)
    }

    /// Start the match.
    pub async fn start_match(&self) -> HostResult<MatchResult<()>> {
        self.request(Command::Start).await
    }

    /// Submit a value.
    pub async fn submit(&self, player: PlayerId, value: i32) -> HostResult<SubmitResult<SubmitResponse>> {
        self.request(|reply| Command::Submit(player, value, reply)).await
    }

    /// Stage a pending value.
    pub async fn stage(&self, player: PlayerId, value: i32) -> HostResult<SubmitResult<()>> {
        self.request(|reply| Command::Stage(player, value, reply)).await
    }

    /// Abort the match.
    pub async fn abort(&self) -> HostResult<MatchResult<()>> {
        self.request(Command::Abort).await
    }

    /// Current match snapshot.
    pub async fn snapshot(&self) -> HostResult<HostSnapshot> {
        self.request(Command::Snapshot).await
    }

    /// Receive every event published from now on.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<MatchEvent> {
        self.events.subscribe()
    }
}

/// A running host: the client handle plus the task owning the session.
#[derive(Debug)]
pub struct MatchHost {
    handle: HostHandle,
    task: JoinHandle<MatchRecord>,
}

impl MatchHost {
    /// Handle for issuing commands.
    #[must_use]
    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    /// Stop accepting commands and wait for the session's record.
    ///
    /// Other handle clones must be dropped too, or this waits for them.
    pub async fn shutdown(self) -> HostResult<MatchRecord> {
        let Self { handle, task } = self;
        drop(handle);
        Ok(task.await?)
    }
}

/// Move `session` onto a tokio task and return its host.
///
/// Must be called inside a tokio runtime.
pub fn spawn<E>(mut session: MatchSession<E>, config: HostConfig) -> MatchHost
where
    E: RuleEngine + Send + 'static,
{
    let (commands, inbox) = mpsc::channel(config.command_capacity);
    let (events, _) = broadcast::channel(config.event_capacity);

    let bridge = events.clone();
    session.subscribe(BROADCAST_SUBSCRIBER, move |event| {
        // No receivers is fine; nobody is listening yet.
        let _ = bridge.send(event.clone());
    });

    let task = tokio::spawn(run(session, inbox, config.tick));
    MatchHost {
        handle: HostHandle { commands, events },
        task,
    }
}

async fn run<E: RuleEngine>(
    mut session: MatchSession<E>,
    mut inbox: mpsc::Receiver<Command>,
    tick: Duration,
) -> MatchRecord {
    let mut interval = time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    loop {
        tokio::select! {
            command = inbox.recv() => match command {
                Some(command) => apply(&mut session, command),
                None => break,
            },
            now = interval.tick() => {
                let elapsed = now.saturating_duration_since(last);
                last = now;
                session.advance_time(elapsed);
            }
        }
    }

    if !session.is_over() {
        warn!(round = session.current_round_number(), "host closed mid-match");
        let _ = session.abort();
    }
    session.into_record()
}

fn apply<E: RuleEngine>(session: &mut MatchSession<E>, command: Command) {
    debug!(?command, "host command");
    // A dropped reply receiver just means the caller stopped waiting.
    match command {
        Command::Start(reply) => {
            let _ = reply.send(session.start_match());
        }
        Command::Submit(player, value, reply) => {
            let _ = reply.send(session.submit(player, value));
        }
        Command::Stage(player, value, reply) => {
            let _ = reply.send(session.stage(player, value));
        }
        Command::Abort(reply) => {
            let _ = reply.send(session.abort());
        }
        Command::Snapshot(reply) => {
            let _ = reply.send(HostSnapshot {
                phase: session.phase(),
                round: session.current_round_number(),
                players: session.registry_view(),
                last_outcome: session.last_outcome().cloned(),
                seconds_remaining: session.seconds_remaining(),
                winner: session.winner(),
            });
        }
    }
}
