// ABOUTME: Defines SMPP v3.4 command identifiers per specification Table 4-1
// ABOUTME: Implements command_id lookup, response-bit handling and request/response pairing

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// SMPP v3.4 Command Identifiers (Table 4-1)
///
/// The command_id field identifies the SMPP PDU type. Per SMPP v3.4 specification
/// Section 2.2.1, this is a 4-octet field in the PDU header.
///
/// ## Command ID Structure
/// - **Bit 31 (MSB)**: Response indicator bit
///   - 0 = Request PDU
///   - 1 = Response PDU
/// - **Bits 30-0**: Command type identifier
///
/// ## References
/// - SMPP v3.4 Specification Section 2.2.1 (PDU Header Format)
/// - SMPP v3.4 Specification Table 4-1 (Command ID Definitions)
#[derive(TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Copy)]
pub enum CommandId {
    /// generic_nack PDU (Section 4.3.1) - Error response for invalid PDUs
    GenericNack = 0x8000_0000,

    // Connection Management Operations (Section 4.1)
    /// bind_receiver PDU (Section 4.1.3) - Bind as message receiver
    BindReceiver = 0x0000_0001,
    /// bind_receiver_resp PDU (Section 4.1.4) - Response to bind_receiver
    BindReceiverResp = 0x8000_0001,
    /// bind_transmitter PDU (Section 4.1.1) - Bind as message transmitter
    BindTransmitter = 0x0000_0002,
    /// bind_transmitter_resp PDU (Section 4.1.2) - Response to bind_transmitter
    BindTransmitterResp = 0x8000_0002,

    // Message Submission Operations (Section 4.4)
    /// submit_sm PDU (Section 4.4.1) - Submit short message
    SubmitSm = 0x0000_0004,
    /// submit_sm_resp PDU (Section 4.4.2) - Response to submit_sm
    SubmitSmResp = 0x8000_0004,

    // Message Delivery Operations (Section 4.6)
    /// deliver_sm PDU (Section 4.6.1) - Deliver message to ESME
    DeliverSm = 0x0000_0005,
    /// deliver_sm_resp PDU (Section 4.6.2) - Response to deliver_sm
    DeliverSmResp = 0x8000_0005,

    // Session Management Operations (Section 4.2)
    /// unbind PDU (Section 4.2.1) - Unbind from SMSC
    Unbind = 0x0000_0006,
    /// unbind_resp PDU (Section 4.2.2) - Response to unbind
    UnbindResp = 0x8000_0006,

    // Transceiver Operations (Section 4.1.5-4.1.6)
    /// bind_transceiver PDU (Section 4.1.5) - Bind as transceiver (TX+RX)
    BindTransceiver = 0x0000_0009,
    /// bind_transceiver_resp PDU (Section 4.1.6) - Response to bind_transceiver
    BindTransceiverResp = 0x8000_0009,

    // Link Management Operations (Section 4.11)
    /// enquire_link PDU (Section 4.11.1) - Link verification request
    EnquireLink = 0x0000_0015,
    /// enquire_link_resp PDU (Section 4.11.2) - Response to enquire_link
    EnquireLinkResp = 0x8000_0015,

    // Enhanced Messaging Operations (Section 4.7)
    /// data_sm PDU (Section 4.7.1) - Enhanced data submission
    DataSm = 0x0000_0103,
    /// data_sm_resp PDU (Section 4.7.2) - Response to data_sm
    DataSmResp = 0x8000_0103,
}

impl CommandId {
    /// Check if this command_id represents a response PDU
    pub fn is_response(self) -> bool {
        u32::from(self) & 0x8000_0000 != 0
    }

    /// Check if this command_id is one of the three bind requests
    pub fn is_bind(self) -> bool {
        matches!(
            self,
            CommandId::BindTransmitter | CommandId::BindReceiver | CommandId::BindTransceiver
        )
    }

    /// The response command_id paired with this request, if any.
    ///
    /// Returns `None` for ids that are already responses and for generic_nack,
    /// which has no response PDU of its own.
    pub fn response(self) -> Option<CommandId> {
        if self.is_response() {
            return None;
        }
        CommandId::try_from(u32::from(self) | 0x8000_0000).ok()
    }

    /// Protocol-level name, as it appears in the SMPP v3.4 specification.
    pub fn name(self) -> &'static str {
        match self {
            CommandId::GenericNack => "generic_nack",
            CommandId::BindReceiver => "bind_receiver",
            CommandId::BindReceiverResp => "bind_receiver_resp",
            CommandId::BindTransmitter => "bind_transmitter",
            CommandId::BindTransmitterResp => "bind_transmitter_resp",
            CommandId::SubmitSm => "submit_sm",
            CommandId::SubmitSmResp => "submit_sm_resp",
            CommandId::DeliverSm => "deliver_sm",
            CommandId::DeliverSmResp => "deliver_sm_resp",
            CommandId::Unbind => "unbind",
            CommandId::UnbindResp => "unbind_resp",
            CommandId::BindTransceiver => "bind_transceiver",
            CommandId::BindTransceiverResp => "bind_transceiver_resp",
            CommandId::EnquireLink => "enquire_link",
            CommandId::EnquireLinkResp => "enquire_link_resp",
            CommandId::DataSm => "data_sm",
            CommandId::DataSmResp => "data_sm_resp",
        }
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
