// ABOUTME: SMSC simulator - accept loop, channel-serialized session registry, lifecycle
// ABOUTME: Each accepted transport becomes a Session driven by handle_connection until closed

use crate::codec::Pdu;
use crate::datatypes::CommandStatus;
use crate::error::{SmppError, SmppResult};
use crate::handlers;
use crate::session::Session;
use crate::state::{SessionState, StateCell};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// In-process SMSC.
///
/// Accepts transports, wraps each in a [`Session`] with the server-side bind
/// handler installed, and drives it until it closes. The session registry is
/// mutated only by the control task; readers get an atomically swapped
/// `Arc<Vec<Session>>` snapshot that stays stable while they iterate.
#[derive(Clone)]
pub struct Smsc {
    inner: Arc<SmscInner>,
}

struct SmscInner {
    system_id: String,
    password: String,
    state: StateCell,
    sessions: RwLock<Arc<Vec<Session>>>,
    registry: mpsc::Sender<Registry>,
    listener: Mutex<Option<TcpListener>>,
    accept_loop: Mutex<Option<JoinHandle<()>>>,
    registry_loop: Mutex<Option<JoinHandle<()>>>,
    shutdown: watch::Sender<bool>,
    closed: AtomicBool,
}

enum Registry {
    Register {
        stream: TcpStream,
        reply: oneshot::Sender<Session>,
    },
    Remove {
        session: Session,
        done: oneshot::Sender<()>,
    },
    Shutdown,
}

impl Smsc {
    /// Create an SMSC bound to `listener`, publishing `LISTENING`. The accept
    /// loop does not run until [`start`](Smsc::start) is called. Must run
    /// inside a tokio runtime.
    pub fn new(
        listener: TcpListener,
        system_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Smsc {
        let (registry, commands) = mpsc::channel(16);
        let (shutdown, _) = watch::channel(false);

        let inner = Arc::new(SmscInner {
            system_id: system_id.into(),
            password: password.into(),
            state: StateCell::new(SessionState::Listening),
            sessions: RwLock::new(Arc::new(Vec::new())),
            registry,
            listener: Mutex::new(Some(listener)),
            accept_loop: Mutex::new(None),
            registry_loop: Mutex::new(None),
            shutdown,
            closed: AtomicBool::new(false),
        });

        let registry_inner = Arc::clone(&inner);
        let handle = tokio::spawn(Smsc::registry_loop(registry_inner, commands));
        *inner
            .registry_loop
            .lock()
            .expect("registry handle lock poisoned") = Some(handle);

        Smsc { inner }
    }

    /// Start the accept loop. Repeated calls are no-ops.
    pub async fn start(&self) {
        let listener = self
            .inner
            .listener
            .lock()
            .expect("listener lock poisoned")
            .take();
        let Some(listener) = listener else {
            return;
        };

        let inner = Arc::clone(&self.inner);
        let shutdown = self.inner.shutdown.subscribe();
        let handle = tokio::spawn(Smsc::accept_loop(inner, listener, shutdown));
        *self
            .inner
            .accept_loop
            .lock()
            .expect("accept handle lock poisoned") = Some(handle);
    }

    /// Stable snapshot of the session registry.
    pub fn sessions(&self) -> Arc<Vec<Session>> {
        self.inner
            .sessions
            .read()
            .expect("session registry lock poisoned")
            .clone()
    }

    /// Sessions accepted and not yet removed.
    pub fn number_of_connections(&self) -> usize {
        self.sessions().len()
    }

    /// Server lifecycle state: `LISTENING` until closed.
    pub async fn state(&self) -> SessionState {
        self.inner.state.get().await
    }

    /// Close every live session, stop the accept loop, release the listener.
    /// Idempotent.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        // Stop accepting before tearing sessions down
        let _ = self.inner.shutdown.send(true);
        drop(
            self.inner
                .listener
                .lock()
                .expect("listener lock poisoned")
                .take(),
        );
        let accept_loop = self
            .inner
            .accept_loop
            .lock()
            .expect("accept handle lock poisoned")
            .take();
        if let Some(handle) = accept_loop {
            let _ = handle.await;
        }

        for session in self.sessions().iter() {
            if session.state().await != SessionState::Closed {
                let (done, removed) = oneshot::channel();
                let command = Registry::Remove {
                    session: session.clone(),
                    done,
                };
                if self.inner.registry.send(command).await.is_ok() {
                    let _ = removed.await;
                }
            }
        }

        let _ = self.inner.registry.send(Registry::Shutdown).await;
        let registry_loop = self
            .inner
            .registry_loop
            .lock()
            .expect("registry handle lock poisoned")
            .take();
        if let Some(handle) = registry_loop {
            let _ = handle.await;
        }

        self.inner.state.set(SessionState::Closed).await;
        self.inner.state.close().await;
    }

    /// Registry control task: the only place the session list is mutated, so
    /// appends and removals are totally ordered.
    async fn registry_loop(inner: Arc<SmscInner>, mut commands: mpsc::Receiver<Registry>) {
        while let Some(command) = commands.recv().await {
            match command {
                Registry::Register { stream, reply } => {
                    let session = Session::from_stream(stream);
                    handlers::install_bind_handler(
                        &session,
                        inner.system_id.clone(),
                        inner.password.clone(),
                    );
                    {
                        let mut slot = inner
                            .sessions
                            .write()
                            .expect("session registry lock poisoned");
                        let mut next: Vec<Session> = slot.iter().cloned().collect();
                        next.push(session.clone());
                        *slot = Arc::new(next);
                    }
                    let _ = reply.send(session);
                }
                Registry::Remove { session, done } => {
                    let _ = session.close().await;
                    {
                        let mut slot = inner
                            .sessions
                            .write()
                            .expect("session registry lock poisoned");
                        let next: Vec<Session> =
                            slot.iter().filter(|s| **s != session).cloned().collect();
                        *slot = Arc::new(next);
                    }
                    let _ = done.send(());
                }
                Registry::Shutdown => break,
            }
        }
    }

    async fn accept_loop(
        inner: Arc<SmscInner>,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!(%peer, "accepted connection");
                        let (reply, registered) = oneshot::channel();
                        let command = Registry::Register { stream, reply };
                        if inner.registry.send(command).await.is_err() {
                            break;
                        }
                        let Ok(session) = registered.await else {
                            continue;
                        };
                        tokio::spawn(Smsc::drive_session(Arc::clone(&inner), session));
                    }
                    Err(error) => {
                        tracing::warn!(%error, "accept failed");
                        continue;
                    }
                },
            }
        }
        tracing::debug!("accept loop exited");
    }

    /// Run one accepted session to completion, then take it out of the
    /// registry.
    async fn drive_session(inner: Arc<SmscInner>, session: Session) {
        handle_connection(&session).await;
        let (done, removed) = oneshot::channel();
        let command = Registry::Remove { session, done };
        if inner.registry.send(command).await.is_ok() {
            let _ = removed.await;
        }
    }
}

/// Serve one session until it reaches `CLOSED`.
pub async fn handle_connection(session: &Session) {
    while session.state().await != SessionState::Closed {
        if let Err(error) = handle_operations(session).await {
            match error {
                // Timeouts iterate; a closed transport ends via the state check
                SmppError::Timeout | SmppError::ConnectionClosed => {}
                error => tracing::debug!(%error, "issue on connection"),
            }
            tokio::task::yield_now().await;
        }
    }
}

/// Receive and answer one PDU.
///
/// Anything other than a bind on a session still in `OPEN` is answered with
/// `ESME_RINVBNDSTS`; everything else goes through the session's handler
/// table.
pub async fn handle_operations(session: &Session) -> SmppResult<()> {
    let pdu = session.receive_pdu().await?;

    let state = session.state().await;
    if state == SessionState::Open && !pdu.header.command_id.is_bind() {
        tracing::debug!(command = %pdu.header.command_id, "expected a bind operation first");
        if let Some(response) = Pdu::response_to(&pdu) {
            let response = response
                .with_message_id("")
                .with_smpp_error(CommandStatus::IncorrectBindStatus);
            session.send(response).await?;
        }
        return Ok(());
    }

    session.dispatch(pdu).await;
    Ok(())
}
