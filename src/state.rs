// ABOUTME: Bind-state values and the channel-serialized cell that owns them
// ABOUTME: A dispatcher task serializes get/set so no call site needs lock discipline

use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Session lifecycle states (SMPP v3.4 Section 2.1), plus `Listening` for the
/// server side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Open,
    BoundTx,
    BoundRx,
    BoundTrx,
    Listening,
    Closed,
}

impl SessionState {
    /// Bound state selected by a successful bind response.
    pub fn for_bind_response(command_id: crate::datatypes::CommandId) -> Option<SessionState> {
        use crate::datatypes::CommandId;
        match command_id {
            CommandId::BindTransmitterResp => Some(SessionState::BoundTx),
            CommandId::BindReceiverResp => Some(SessionState::BoundRx),
            CommandId::BindTransceiverResp => Some(SessionState::BoundTrx),
            _ => None,
        }
    }

    pub fn is_transmitter(self) -> bool {
        matches!(self, SessionState::BoundTx | SessionState::BoundTrx)
    }

    pub fn is_receiver(self) -> bool {
        matches!(self, SessionState::BoundRx | SessionState::BoundTrx)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Open => "OPEN",
            SessionState::BoundTx => "BOUND_TX",
            SessionState::BoundRx => "BOUND_RX",
            SessionState::BoundTrx => "BOUND_TRX",
            SessionState::Listening => "LISTENING",
            SessionState::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

enum Command {
    Set(SessionState),
    Get(oneshot::Sender<SessionState>),
    Alive(oneshot::Sender<()>),
    Done,
}

/// How long `get` and `alive` wait on the dispatcher before assuming it is gone
const PROBE_TIMEOUT: Duration = Duration::from_millis(250);

/// Concurrency-safe state cell.
///
/// The state is read and written from the receive-dispatch task, the server
/// accept loop and user calls. Instead of a lock at every call site, one
/// dispatcher task owns the value and serializes access over a channel. Once
/// closed, the cell answers `Closed` forever.
#[derive(Debug)]
pub struct StateCell {
    commands: mpsc::Sender<Command>,
    shutdown: tokio::sync::Mutex<Shutdown>,
}

#[derive(Debug)]
struct Shutdown {
    closed: bool,
    dispatcher: Option<JoinHandle<()>>,
}

impl StateCell {
    /// Create the cell and spawn its dispatcher. Must run inside a tokio
    /// runtime.
    pub fn new(initial: SessionState) -> StateCell {
        let (commands, rx) = mpsc::channel(16);
        let dispatcher = tokio::spawn(Self::dispatcher(initial, rx));
        StateCell {
            commands,
            shutdown: tokio::sync::Mutex::new(Shutdown {
                closed: false,
                dispatcher: Some(dispatcher),
            }),
        }
    }

    async fn dispatcher(mut state: SessionState, mut rx: mpsc::Receiver<Command>) {
        while let Some(command) = rx.recv().await {
            match command {
                // Closed is terminal
                Command::Set(next) if state != SessionState::Closed => state = next,
                Command::Set(_) => {}
                Command::Get(reply) => {
                    let _ = reply.send(state);
                }
                Command::Alive(reply) => {
                    let _ = reply.send(());
                }
                Command::Done => break,
            }
        }
    }

    /// Accept a new state. A no-op after close.
    pub async fn set(&self, state: SessionState) {
        let _ = self.commands.send(Command::Set(state)).await;
    }

    /// Publish the current state. Returns `Closed` when the dispatcher is gone
    /// or does not answer within the probe timeout.
    pub async fn get(&self) -> SessionState {
        let (reply, answer) = oneshot::channel();
        if self.commands.send(Command::Get(reply)).await.is_err() {
            return SessionState::Closed;
        }
        match timeout(PROBE_TIMEOUT, answer).await {
            Ok(Ok(state)) => state,
            _ => SessionState::Closed,
        }
    }

    /// Probe whether the dispatcher is still running.
    pub async fn alive(&self) -> bool {
        let (reply, answer) = oneshot::channel();
        if self.commands.send(Command::Alive(reply)).await.is_err() {
            return false;
        }
        matches!(timeout(PROBE_TIMEOUT, answer).await, Ok(Ok(())))
    }

    /// Shut the dispatcher down and join it. Idempotent; callable from any
    /// task.
    pub async fn close(&self) {
        let mut shutdown = self.shutdown.lock().await;
        if shutdown.closed {
            return;
        }
        shutdown.closed = true;
        if self.alive().await {
            let _ = self.commands.send(Command::Done).await;
        }
        if let Some(dispatcher) = shutdown.dispatcher.take() {
            let _ = dispatcher.await;
        }
    }
}
