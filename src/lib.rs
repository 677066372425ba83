//! SMPP v3.4 library and in-process SMSC simulator.
//!
//! Three layers:
//!
//! * a **codec** for the binary protocol data units - length-prefixed framing,
//!   per-command mandatory parameter layouts, optional TLV parameters;
//! * an **ESME [`Session`]** owning one transport: monotonic sequence-number
//!   allocation, a bind-state machine, and dispatch of inbound PDUs to
//!   registered handlers;
//! * an **[`Smsc`]** that accepts connections, creates a session per
//!   connection with credential-checking bind handlers, and drives the same
//!   session machinery.
//!
//! ```rust,no_run
//! use smpp_sim::{Pdu, Session, Smsc};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let listener = TcpListener::bind("127.0.0.1:2775").await?;
//!     let smsc = Smsc::new(listener, "SystemId", "Password");
//!     smsc.start().await;
//!
//!     let esme = Session::connect("127.0.0.1:2775").await?;
//!     esme.bind_transmitter("SystemId", "Password").await?;
//!
//!     let sms = Pdu::submit_sm()
//!         .with_source_addr("5551234567")
//!         .with_destination_addr("5557654321")
//!         .with_short_message("Hello!");
//!     esme.send(sms).await?;
//!
//!     esme.close().await?;
//!     smsc.close().await;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod codec;
pub mod connection;
pub mod datatypes;
pub mod error;
pub mod handlers;
pub mod server;
pub mod session;
pub mod state;

#[cfg(test)]
mod tests;

pub use codec::{CodecError, Header, MAX_PDU_SIZE, Pdu, encode_pdu, parse_header, parse_pdu};
pub use connection::FrameReader;
pub use datatypes::{
    BindBody, BindRespBody, Body, CommandId, CommandStatus, INTERFACE_VERSION_SMPP_34,
    MessageRespBody, SubmitSmBody, Tlv, TlvValue, tags,
};
pub use error::{SmppError, SmppResult};
pub use server::{Smsc, handle_connection, handle_operations};
pub use session::{BindDefaults, CommandHandler, READ_DEADLINE, Session};
pub use state::{SessionState, StateCell};
