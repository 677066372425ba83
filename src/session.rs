// ABOUTME: ESME session - one transport, a sequence allocator, bind state and a handler table
// ABOUTME: Cheap-to-clone handle; receive-dispatch runs on an optional background task

use crate::codec::{Pdu, parse_pdu};
use crate::connection::FrameReader;
use crate::datatypes::{CommandId, CommandStatus};
use crate::error::{SmppError, SmppResult};
use crate::handlers;
use crate::state::{SessionState, StateCell};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Read deadline applied to every frame read. A timeout is not fatal; receive
/// loops simply iterate, re-checking session state between reads.
pub const READ_DEADLINE: Duration = Duration::from_secs(1);

/// Handler invoked for an inbound PDU, keyed by command_id.
///
/// Handlers run on the receive-dispatch task and must return in bounded time,
/// or receive throughput is lost for the whole session.
pub type CommandHandler = Arc<
    dyn Fn(Session, Pdu) -> Pin<Box<dyn Future<Output = SmppResult<()>> + Send>> + Send + Sync,
>;

/// Per-session overrides applied when building a bind PDU without explicit
/// arguments for these parameters.
#[derive(Clone, Debug, Default)]
pub struct BindDefaults {
    pub system_type: Option<String>,
    pub interface_version: Option<u8>,
    pub addr_ton: Option<u8>,
    pub addr_npi: Option<u8>,
    pub address_range: Option<String>,
}

/// One SMPP session over a TCP transport.
///
/// `Session` is a handle: clones share the transport, the state cell, the
/// sequence counter and the handler table. User code holds one clone, the
/// receive-dispatch task holds another.
///
/// Writes may happen from any task; a write mutex serializes them. Reads are
/// serialized by the reader mutex, so `receive_pdu` and the control loop never
/// interleave partial frames.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    reader: tokio::sync::Mutex<FrameReader<OwnedReadHalf>>,
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    state: StateCell,
    sequence_number: AtomicU32,
    handlers: RwLock<HashMap<CommandId, CommandHandler>>,
    bind_defaults: RwLock<BindDefaults>,
    control_loop: tokio::sync::Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl PartialEq for Session {
    fn eq(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Session {
    /// Establish a TCP connection and wrap it in a session in state `OPEN`.
    pub async fn connect(addr: impl ToSocketAddrs) -> SmppResult<Session> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Session::from_stream(stream))
    }

    /// Wrap an established transport in a session in state `OPEN`.
    ///
    /// Installs the default `enquire_link`, `submit_sm` and `deliver_sm`
    /// handlers; register over them before starting the control loop to
    /// change behaviour.
    pub fn from_stream(stream: TcpStream) -> Session {
        let (read_half, write_half) = stream.into_split();
        let session = Session {
            inner: Arc::new(SessionInner {
                reader: tokio::sync::Mutex::new(FrameReader::new(read_half)),
                writer: tokio::sync::Mutex::new(write_half),
                state: StateCell::new(SessionState::Open),
                sequence_number: AtomicU32::new(0),
                handlers: RwLock::new(HashMap::new()),
                bind_defaults: RwLock::new(BindDefaults::default()),
                control_loop: tokio::sync::Mutex::new(None),
                closed: AtomicBool::new(false),
            }),
        };
        handlers::install_defaults(&session);
        session
    }

    /// Current bind state.
    pub async fn state(&self) -> SessionState {
        self.inner.state.get().await
    }

    /// Session may submit messages (bound TX or TRX).
    pub async fn is_transmitter(&self) -> bool {
        self.state().await.is_transmitter()
    }

    /// Session may receive deliveries (bound RX or TRX).
    pub async fn is_receiver(&self) -> bool {
        self.state().await.is_receiver()
    }

    pub(crate) async fn set_state(&self, state: SessionState) {
        self.inner.state.set(state).await;
    }

    /// Register or override the handler for a command id.
    ///
    /// The table is consulted by the control loop on every inbound PDU;
    /// populate it before `start_control_loop`.
    pub fn set_handler<F, Fut>(&self, command_id: CommandId, handler: F)
    where
        F: Fn(Session, Pdu) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = SmppResult<()>> + Send + 'static,
    {
        let handler: CommandHandler = Arc::new(move |session, pdu| {
            Box::pin(handler(session, pdu))
                as Pin<Box<dyn Future<Output = SmppResult<()>> + Send>>
        });
        self.inner
            .handlers
            .write()
            .expect("handler table lock poisoned")
            .insert(command_id, handler);
    }

    /// Override the parameters used for bind PDUs built by the `bind_*`
    /// convenience methods.
    pub fn set_bind_defaults(&self, defaults: BindDefaults) {
        *self
            .inner
            .bind_defaults
            .write()
            .expect("bind defaults lock poisoned") = defaults;
    }

    /// Send one PDU, allocating the next sequence number when the PDU carries
    /// 0 and keeping an explicit one as-is. Returns the sequence number used.
    pub async fn send(&self, pdu: Pdu) -> SmppResult<u32> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(SmppError::ConnectionClosed);
        }

        let sequence_number = if pdu.header.sequence_number == 0 {
            self.inner.sequence_number.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            pdu.header.sequence_number
        };
        let bytes = crate::codec::encode_pdu(&pdu.with_sequence_number(sequence_number))?;

        let mut writer = self.inner.writer.lock().await;
        writer.write_all(&bytes).await?;
        Ok(sequence_number)
    }

    /// Receive one PDU under the read deadline.
    ///
    /// Timeouts are recoverable. EOF, a closed transport, or a framing error
    /// that poisons the byte stream all initiate an asynchronous session close
    /// before the error is returned.
    pub async fn receive_pdu(&self) -> SmppResult<Pdu> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(SmppError::ConnectionClosed);
        }

        let mut reader = self.inner.reader.lock().await;
        let outcome = timeout(READ_DEADLINE, reader.read_frame()).await;
        drop(reader);

        match outcome {
            Err(_) => Err(SmppError::Timeout),
            Ok(Ok(Some(frame))) => Ok(parse_pdu(&frame)?),
            Ok(Ok(None)) => {
                self.close_in_background();
                Err(SmppError::ConnectionClosed)
            }
            Ok(Err(SmppError::Connection(_))) => {
                self.close_in_background();
                Err(SmppError::ConnectionClosed)
            }
            Ok(Err(error @ SmppError::Codec(_))) => {
                // Framing is lost; no later frame boundary can be trusted
                self.close_in_background();
                Err(error)
            }
            Ok(Err(other)) => Err(other),
        }
    }

    /// Bind as transmitter: one request/response round trip under the read
    /// deadline. On `ESME_ROK` the session transitions to `BOUND_TX`.
    pub async fn bind_transmitter(&self, system_id: &str, password: &str) -> SmppResult<Pdu> {
        self.bind(Pdu::bind_transmitter(), system_id, password).await
    }

    /// Bind as receiver; `BOUND_RX` on success.
    pub async fn bind_receiver(&self, system_id: &str, password: &str) -> SmppResult<Pdu> {
        self.bind(Pdu::bind_receiver(), system_id, password).await
    }

    /// Bind as transceiver; `BOUND_TRX` on success.
    pub async fn bind_transceiver(&self, system_id: &str, password: &str) -> SmppResult<Pdu> {
        self.bind(Pdu::bind_transceiver(), system_id, password).await
    }

    /// Release the bound role: one unbind round trip under the read deadline.
    /// On an `ESME_ROK` response the session returns to `OPEN`. The transport
    /// stays up; callers usually `close` right after.
    pub async fn unbind(&self) -> SmppResult<Pdu> {
        self.send(Pdu::unbind()).await?;
        let response = self.receive_pdu().await?;
        if response.header.command_id == CommandId::UnbindResp
            && response.header.command_status == CommandStatus::Ok
        {
            self.inner.state.set(SessionState::Open).await;
        }
        Ok(response)
    }

    async fn bind(&self, request: Pdu, system_id: &str, password: &str) -> SmppResult<Pdu> {
        let request = self
            .apply_bind_defaults(request)
            .with_system_id(system_id)
            .with_password(password);
        self.send(request).await?;

        let response = self.receive_pdu().await?;
        if response.header.command_status == CommandStatus::Ok {
            if let Some(bound) = SessionState::for_bind_response(response.header.command_id) {
                self.inner.state.set(bound).await;
            }
            Ok(response)
        } else {
            Err(SmppError::BindRejected {
                status: response.header.command_status,
                response: Box::new(response),
            })
        }
    }

    fn apply_bind_defaults(&self, mut pdu: Pdu) -> Pdu {
        let defaults = self
            .inner
            .bind_defaults
            .read()
            .expect("bind defaults lock poisoned")
            .clone();
        if let Some(system_type) = defaults.system_type {
            pdu = pdu.with_system_type(system_type);
        }
        if let Some(interface_version) = defaults.interface_version {
            pdu = pdu.with_interface_version(interface_version);
        }
        if let Some(addr_ton) = defaults.addr_ton {
            pdu = pdu.with_addr_ton(addr_ton);
        }
        if let Some(addr_npi) = defaults.addr_npi {
            pdu = pdu.with_addr_npi(addr_npi);
        }
        if let Some(address_range) = defaults.address_range {
            pdu = pdu.with_address_range(address_range);
        }
        pdu
    }

    /// Spawn the receive-dispatch task. At most one per session; repeated
    /// calls are no-ops. `close` joins the task.
    pub async fn start_control_loop(&self) {
        let mut slot = self.inner.control_loop.lock().await;
        if slot.is_some() {
            return;
        }
        let session = self.clone();
        *slot = Some(tokio::spawn(async move { session.control_loop().await }));
    }

    async fn control_loop(self) {
        while self.state().await != SessionState::Closed {
            let pdu = match self.receive_pdu().await {
                Ok(pdu) => pdu,
                Err(SmppError::Timeout) => continue,
                Err(SmppError::ConnectionClosed) => break,
                Err(error) => {
                    // Bad inbound PDU: log it, skip it, keep dispatching
                    tracing::warn!(%error, "dropping undecodable PDU");
                    continue;
                }
            };
            self.dispatch(pdu).await;
        }
        tracing::debug!("control loop exited");
    }

    /// Look up and invoke the handler for an inbound PDU. A missing entry is
    /// a logged drop, not an error.
    pub(crate) async fn dispatch(&self, pdu: Pdu) {
        let handler = self
            .inner
            .handlers
            .read()
            .expect("handler table lock poisoned")
            .get(&pdu.header.command_id)
            .cloned();

        match handler {
            Some(handler) => {
                let command = pdu.header.command_id;
                if let Err(error) = handler(self.clone(), pdu).await {
                    tracing::warn!(%command, %error, "handler failed");
                }
            }
            None => {
                tracing::debug!(command = %pdu.header.command_id, "no handler registered, dropping PDU");
            }
        }
    }

    /// Close the session: shut the transport down, drive state to `CLOSED`,
    /// join the control loop, shut the state cell down. Safe to call multiple
    /// times and from any task except the control loop itself (handlers
    /// wanting to close their own session should spawn the call).
    pub async fn close(&self) -> SmppResult<()> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        {
            let mut writer = self.inner.writer.lock().await;
            // Peer may already be gone; shutdown errors carry no information here
            let _ = writer.shutdown().await;
        }
        self.inner.state.set(SessionState::Closed).await;

        let control_loop = self.inner.control_loop.lock().await.take();
        if let Some(handle) = control_loop {
            let _ = handle.await;
        }

        self.inner.state.close().await;
        Ok(())
    }

    fn close_in_background(&self) {
        let session = self.clone();
        tokio::spawn(async move {
            let _ = session.close().await;
        });
    }
}
