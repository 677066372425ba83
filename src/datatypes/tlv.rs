// ABOUTME: Optional parameter (TLV) registry and value model per SMPP v3.4 Section 5.3
// ABOUTME: Registered tags decode to typed values; anything else passes through as raw octets

use bytes::{BufMut, Bytes, BytesMut};

/// Standard TLV tag codes per SMPP v3.4 Section 5.3.2
pub mod tags {
    pub const DEST_ADDR_SUBUNIT: u16 = 0x0005;
    pub const SOURCE_ADDR_SUBUNIT: u16 = 0x000D;
    pub const PAYLOAD_TYPE: u16 = 0x0019;
    pub const ADDITIONAL_STATUS_INFO_TEXT: u16 = 0x001D;
    pub const RECEIPTED_MESSAGE_ID: u16 = 0x001E;
    pub const MS_MSG_WAIT_FACILITIES: u16 = 0x0030;
    pub const PRIVACY_INDICATOR: u16 = 0x0201;
    pub const SOURCE_SUBADDRESS: u16 = 0x0202;
    pub const DEST_SUBADDRESS: u16 = 0x0203;
    pub const USER_MESSAGE_REFERENCE: u16 = 0x0204;
    pub const USER_RESPONSE_CODE: u16 = 0x0205;
    pub const SOURCE_PORT: u16 = 0x020A;
    pub const DESTINATION_PORT: u16 = 0x020B;
    pub const SAR_MSG_REF_NUM: u16 = 0x020C;
    pub const LANGUAGE_INDICATOR: u16 = 0x020D;
    pub const SAR_TOTAL_SEGMENTS: u16 = 0x020E;
    pub const SAR_SEGMENT_SEQNUM: u16 = 0x020F;
    pub const SC_INTERFACE_VERSION: u16 = 0x0210;
    pub const CALLBACK_NUM_PRES_IND: u16 = 0x0302;
    pub const CALLBACK_NUM_ATAG: u16 = 0x0303;
    pub const NUMBER_OF_MESSAGES: u16 = 0x0304;
    pub const CALLBACK_NUM: u16 = 0x0381;
    pub const DPF_RESULT: u16 = 0x0420;
    pub const SET_DPF: u16 = 0x0421;
    pub const MS_AVAILABILITY_STATUS: u16 = 0x0422;
    pub const NETWORK_ERROR_CODE: u16 = 0x0423;
    pub const MESSAGE_PAYLOAD: u16 = 0x0424;
    pub const DELIVERY_FAILURE_REASON: u16 = 0x0425;
    pub const MORE_MESSAGES_TO_SEND: u16 = 0x0426;
    pub const MESSAGE_STATE: u16 = 0x0427;
    pub const USSD_SERVICE_OP: u16 = 0x0501;
    pub const DISPLAY_TIME: u16 = 0x1201;
    pub const SMS_SIGNAL: u16 = 0x1203;
    pub const MS_VALIDITY: u16 = 0x1204;
    pub const ALERT_ON_MESSAGE_DELIVERY: u16 = 0x130C;
    pub const ITS_REPLY_TYPE: u16 = 0x1380;
    pub const ITS_SESSION_INFO: u16 = 0x1383;
}

/// How a registered tag's value is laid out on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TlvKind {
    /// C-octet string: value bytes plus a trailing NUL
    Str,
    /// Single unsigned octet
    Int,
}

/// Tag registry used during decoding. Tags whose values are wider than one
/// octet (ports, SAR reference numbers, signals) are intentionally absent and
/// pass through as raw octets.
pub(crate) fn kind_of(tag: u16) -> Option<TlvKind> {
    use tags::*;
    match tag {
        ADDITIONAL_STATUS_INFO_TEXT | RECEIPTED_MESSAGE_ID | MESSAGE_PAYLOAD => Some(TlvKind::Str),
        DEST_ADDR_SUBUNIT
        | SOURCE_ADDR_SUBUNIT
        | PAYLOAD_TYPE
        | MS_MSG_WAIT_FACILITIES
        | PRIVACY_INDICATOR
        | USER_RESPONSE_CODE
        | LANGUAGE_INDICATOR
        | SAR_SEGMENT_SEQNUM
        | SC_INTERFACE_VERSION
        | CALLBACK_NUM_PRES_IND
        | NUMBER_OF_MESSAGES
        | DPF_RESULT
        | SET_DPF
        | MS_AVAILABILITY_STATUS
        | DELIVERY_FAILURE_REASON
        | MORE_MESSAGES_TO_SEND
        | MESSAGE_STATE
        | USSD_SERVICE_OP
        | DISPLAY_TIME
        | MS_VALIDITY
        | ITS_REPLY_TYPE => Some(TlvKind::Int),
        _ => None,
    }
}

/// Decoded value of an optional parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum TlvValue {
    /// String-typed tag, NUL terminator stripped
    Str(String),
    /// Single-octet integer tag
    Int(u8),
    /// Unregistered tag, carried through untouched
    Octets(Bytes),
}

/// One optional parameter. The wire length is derived from the value at
/// encode time, so a `Tlv` cannot carry an inconsistent length field.
#[derive(Clone, Debug, PartialEq)]
pub struct Tlv {
    pub tag: u16,
    pub value: TlvValue,
}

impl Tlv {
    pub fn string(tag: u16, value: impl Into<String>) -> Self {
        Tlv {
            tag,
            value: TlvValue::Str(value.into()),
        }
    }

    pub fn integer(tag: u16, value: u8) -> Self {
        Tlv {
            tag,
            value: TlvValue::Int(value),
        }
    }

    pub fn octets(tag: u16, value: impl Into<Bytes>) -> Self {
        Tlv {
            tag,
            value: TlvValue::Octets(value.into()),
        }
    }

    /// Length field value: octet count of the encoded value.
    pub fn value_len(&self) -> u16 {
        match &self.value {
            TlvValue::Str(s) => (s.len() + 1) as u16,
            TlvValue::Int(_) => 1,
            TlvValue::Octets(b) => b.len() as u16,
        }
    }

    /// Total wire size including the tag and length fields.
    pub fn wire_len(&self) -> usize {
        4 + self.value_len() as usize
    }

    /// Append the encoded parameter to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.tag);
        buf.put_u16(self.value_len());
        match &self.value {
            TlvValue::Str(s) => {
                buf.put_slice(s.as_bytes());
                buf.put_u8(0);
            }
            TlvValue::Int(v) => buf.put_u8(*v),
            TlvValue::Octets(b) => buf.put_slice(b),
        }
    }
}
