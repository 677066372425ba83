// ABOUTME: Typed PDU body variants replacing the wire schema table with concrete structs
// ABOUTME: One variant per mandatory-parameter layout; Unknown preserves undecodable bodies

use bytes::Bytes;

/// interface_version value identifying SMPP v3.4 (decimal 52)
pub const INTERFACE_VERSION_SMPP_34: u8 = 0x34;

/// Mandatory-parameter body of a PDU, selected by the header's command_id.
///
/// Commands sharing a wire layout share a variant: the three bind requests all
/// carry [`BindBody`], submit_sm / deliver_sm / data_sm all carry
/// [`SubmitSmBody`], and the message responses all carry [`MessageRespBody`].
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// No mandatory parameters (enquire_link, unbind, generic_nack and their responses)
    Empty,
    /// bind_transmitter / bind_receiver / bind_transceiver
    Bind(BindBody),
    /// bind_*_resp
    BindResp(BindRespBody),
    /// submit_sm / deliver_sm / data_sm
    SubmitSm(Box<SubmitSmBody>),
    /// submit_sm_resp / deliver_sm_resp / data_sm_resp
    MessageResp(MessageRespBody),
    /// Body bytes that could not be decoded against the command's layout.
    /// The header is still meaningful and the raw bytes re-encode verbatim.
    Unknown { raw: Bytes },
}

/// Mandatory parameters of the three bind operations (Section 4.1.1)
#[derive(Clone, Debug, PartialEq)]
pub struct BindBody {
    pub system_id: String,
    pub password: String,
    pub system_type: String,
    pub interface_version: u8,
    pub addr_ton: u8,
    pub addr_npi: u8,
    pub address_range: String,
}

impl Default for BindBody {
    fn default() -> Self {
        BindBody {
            system_id: String::new(),
            password: String::new(),
            system_type: String::new(),
            interface_version: INTERFACE_VERSION_SMPP_34,
            addr_ton: 0,
            addr_npi: 0,
            address_range: String::new(),
        }
    }
}

/// Mandatory parameters of a bind response (Section 4.1.2)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BindRespBody {
    pub system_id: String,
}

/// The standard 18-field message layout shared by submit_sm, deliver_sm and
/// data_sm (Section 4.4.1). `sm_length` counts the octets of `short_message`;
/// the builder keeps the pair consistent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmitSmBody {
    pub service_type: String,
    pub source_addr_ton: u8,
    pub source_addr_npi: u8,
    pub source_addr: String,
    pub dest_addr_ton: u8,
    pub dest_addr_npi: u8,
    pub destination_addr: String,
    pub esm_class: u8,
    pub protocol_id: u8,
    pub priority_flag: u8,
    pub schedule_delivery_time: String,
    pub validity_period: String,
    pub registered_delivery: u8,
    pub replace_if_present_flag: u8,
    pub data_coding: u8,
    pub sm_default_msg_id: u8,
    pub sm_length: u8,
    pub short_message: String,
}

/// Mandatory parameters of a message response (Section 4.4.2)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageRespBody {
    pub message_id: String,
}
