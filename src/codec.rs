// ABOUTME: SMPP v3.4 PDU codec - framing, header and mandatory/optional parameter wire format
// ABOUTME: Case-analyzed per Body variant; body decode failures degrade to Body::Unknown

use crate::datatypes::{
    BindBody, BindRespBody, Body, CommandId, CommandStatus, MessageRespBody, SubmitSmBody, Tlv,
    TlvKind, TlvValue, kind_of,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;
use thiserror::Error;

/// Maximum allowed PDU size to prevent memory exhaustion from a hostile peer
pub const MAX_PDU_SIZE: u32 = 65536; // 64KB

/// SMPP v3.4 PDU Header (16 bytes, common to all PDUs)
///
/// `command_length` is informational on a decoded PDU and recomputed whenever
/// the PDU is encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub command_length: u32,
    pub command_id: CommandId,
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

impl Header {
    pub const SIZE: usize = 16;
}

/// One SMPP protocol data unit: header, typed mandatory body, optional TLVs.
///
/// PDUs are plain values. Constructors with schema-complete defaults live in
/// the builder module; the codec functions below translate to and from wire
/// bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    pub header: Header,
    pub body: Body,
    pub tlvs: Vec<Tlv>,
}

impl std::fmt::Display for Pdu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} seq={} status={}",
            self.header.command_id, self.header.sequence_number, self.header.command_status
        )
    }
}

/// Codec errors with enough context to log a useful diagnostic
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed frame: command_length {0} must be greater than 4")]
    MalformedFrame(u32),

    #[error("invalid length: command_length {declared} but only {available} bytes available")]
    InvalidLength { declared: u32, available: usize },

    #[error("frame of {0} bytes exceeds the maximum PDU size")]
    OversizedFrame(u32),

    #[error("unknown command_id {0:#010x}")]
    UnknownCommandId(u32),

    #[error("body truncated while reading {field}")]
    TruncatedBody { field: &'static str },

    #[error("field {field} is not valid UTF-8")]
    Utf8 {
        field: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("optional parameter truncated")]
    TruncatedTlv,

    #[error("PDU body does not match command_id {0}")]
    BodyMismatch(CommandId),
}

/// Parse one complete PDU from `bytes` (a full frame, length prefix included).
///
/// Header problems fail the parse. A body that cannot be decoded against the
/// command's layout does not: the PDU is returned with `Body::Unknown` holding
/// the raw body bytes, so the session can still dispatch on the header.
pub fn parse_pdu(bytes: &[u8]) -> Result<Pdu, CodecError> {
    let header = parse_header(bytes)?;
    let body_bytes = &bytes[Header::SIZE..header.command_length as usize];

    let (body, tlvs) = match decode_body(header.command_id, body_bytes) {
        Ok(decoded) => decoded,
        Err(error) => {
            tracing::warn!(
                command = %header.command_id,
                %error,
                "keeping undecodable body as raw bytes"
            );
            (
                Body::Unknown {
                    raw: Bytes::copy_from_slice(body_bytes),
                },
                Vec::new(),
            )
        }
    };

    Ok(Pdu { header, body, tlvs })
}

/// Parse only the 16-byte header of a frame.
pub fn parse_header(bytes: &[u8]) -> Result<Header, CodecError> {
    if bytes.len() < 4 {
        return Err(CodecError::InvalidLength {
            declared: Header::SIZE as u32,
            available: bytes.len(),
        });
    }

    let command_length = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if command_length <= 4 {
        return Err(CodecError::MalformedFrame(command_length));
    }
    if bytes.len() < command_length as usize || (command_length as usize) < Header::SIZE {
        return Err(CodecError::InvalidLength {
            declared: command_length,
            available: bytes.len(),
        });
    }

    let command_id_raw = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let command_id = CommandId::try_from(command_id_raw)
        .map_err(|_| CodecError::UnknownCommandId(command_id_raw))?;

    // Unknown statuses are carried verbatim rather than rejected
    let command_status =
        CommandStatus::from(u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]));
    let sequence_number = u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    Ok(Header {
        command_length,
        command_id,
        command_status,
        sequence_number,
    })
}

/// Encode a PDU to wire bytes, stamping the real `command_length`.
///
/// Fails with [`CodecError::BodyMismatch`] when the body variant does not fit
/// the header's command_id.
pub fn encode_pdu(pdu: &Pdu) -> Result<Bytes, CodecError> {
    let mut body = BytesMut::new();
    encode_body(pdu.header.command_id, &pdu.body, &mut body)?;
    for tlv in &pdu.tlvs {
        tlv.encode(&mut body);
    }

    let mut buf = BytesMut::with_capacity(Header::SIZE + body.len());
    buf.put_u32((Header::SIZE + body.len()) as u32);
    buf.put_u32(pdu.header.command_id.into());
    buf.put_u32(pdu.header.command_status.into());
    buf.put_u32(pdu.header.sequence_number);
    buf.extend_from_slice(&body);
    Ok(buf.freeze())
}

fn decode_body(command_id: CommandId, bytes: &[u8]) -> Result<(Body, Vec<Tlv>), CodecError> {
    let mut src = Cursor::new(bytes);

    let body = match command_id {
        CommandId::GenericNack
        | CommandId::EnquireLink
        | CommandId::EnquireLinkResp
        | CommandId::Unbind
        | CommandId::UnbindResp => Body::Empty,

        CommandId::BindTransmitter | CommandId::BindReceiver | CommandId::BindTransceiver => {
            Body::Bind(BindBody {
                system_id: get_cstring(&mut src, 16, "system_id")?,
                password: get_cstring(&mut src, 9, "password")?,
                system_type: get_cstring(&mut src, 13, "system_type")?,
                interface_version: get_u8(&mut src, "interface_version")?,
                addr_ton: get_u8(&mut src, "addr_ton")?,
                addr_npi: get_u8(&mut src, "addr_npi")?,
                address_range: get_cstring(&mut src, 41, "address_range")?,
            })
        }

        CommandId::BindTransmitterResp
        | CommandId::BindReceiverResp
        | CommandId::BindTransceiverResp => Body::BindResp(BindRespBody {
            system_id: get_cstring(&mut src, 16, "system_id")?,
        }),

        CommandId::SubmitSm | CommandId::DeliverSm | CommandId::DataSm => {
            Body::SubmitSm(Box::new(decode_submit_sm(&mut src)?))
        }

        CommandId::SubmitSmResp | CommandId::DeliverSmResp | CommandId::DataSmResp => {
            Body::MessageResp(MessageRespBody {
                message_id: get_cstring(&mut src, 65, "message_id")?,
            })
        }
    };

    // Whatever follows the mandatory parameters is the optional TLV region
    let tlvs = decode_tlvs(&mut src)?;
    Ok((body, tlvs))
}

fn decode_submit_sm(src: &mut Cursor<&[u8]>) -> Result<SubmitSmBody, CodecError> {
    let service_type = get_cstring(src, 6, "service_type")?;
    let source_addr_ton = get_u8(src, "source_addr_ton")?;
    let source_addr_npi = get_u8(src, "source_addr_npi")?;
    let source_addr = get_cstring(src, 21, "source_addr")?;
    let dest_addr_ton = get_u8(src, "dest_addr_ton")?;
    let dest_addr_npi = get_u8(src, "dest_addr_npi")?;
    let destination_addr = get_cstring(src, 21, "destination_addr")?;
    let esm_class = get_u8(src, "esm_class")?;
    let protocol_id = get_u8(src, "protocol_id")?;
    let priority_flag = get_u8(src, "priority_flag")?;
    let schedule_delivery_time = get_cstring(src, 17, "schedule_delivery_time")?;
    let validity_period = get_cstring(src, 17, "validity_period")?;
    let registered_delivery = get_u8(src, "registered_delivery")?;
    let replace_if_present_flag = get_u8(src, "replace_if_present_flag")?;
    let data_coding = get_u8(src, "data_coding")?;
    let sm_default_msg_id = get_u8(src, "sm_default_msg_id")?;
    let sm_length = get_u8(src, "sm_length")?;

    // sm_length was parsed just above and sizes the short_message read
    if src.remaining() < sm_length as usize {
        return Err(CodecError::TruncatedBody {
            field: "short_message",
        });
    }
    let message_bytes = src.copy_to_bytes(sm_length as usize);
    let short_message =
        String::from_utf8(message_bytes.to_vec()).map_err(|source| CodecError::Utf8 {
            field: "short_message",
            source,
        })?;

    Ok(SubmitSmBody {
        service_type,
        source_addr_ton,
        source_addr_npi,
        source_addr,
        dest_addr_ton,
        dest_addr_npi,
        destination_addr,
        esm_class,
        protocol_id,
        priority_flag,
        schedule_delivery_time,
        validity_period,
        registered_delivery,
        replace_if_present_flag,
        data_coding,
        sm_default_msg_id,
        sm_length,
        short_message,
    })
}

fn decode_tlvs(src: &mut Cursor<&[u8]>) -> Result<Vec<Tlv>, CodecError> {
    let mut tlvs = Vec::new();
    while src.has_remaining() {
        if src.remaining() < 4 {
            return Err(CodecError::TruncatedTlv);
        }
        let tag = src.get_u16();
        let length = src.get_u16() as usize;
        if src.remaining() < length {
            return Err(CodecError::TruncatedTlv);
        }
        let raw = src.copy_to_bytes(length);

        let value = match kind_of(tag) {
            Some(TlvKind::Str) => {
                let end = if raw.last() == Some(&0) {
                    raw.len() - 1
                } else {
                    raw.len()
                };
                match String::from_utf8(raw[..end].to_vec()) {
                    Ok(s) => TlvValue::Str(s),
                    Err(_) => TlvValue::Octets(raw),
                }
            }
            Some(TlvKind::Int) if length == 1 => TlvValue::Int(raw[0]),
            _ => TlvValue::Octets(raw),
        };
        tlvs.push(Tlv { tag, value });
    }
    Ok(tlvs)
}

fn encode_body(command_id: CommandId, body: &Body, buf: &mut BytesMut) -> Result<(), CodecError> {
    match (command_id, body) {
        // An undecoded body re-encodes byte for byte, whatever the command
        (_, Body::Unknown { raw }) => buf.put_slice(raw),

        (
            CommandId::GenericNack
            | CommandId::EnquireLink
            | CommandId::EnquireLinkResp
            | CommandId::Unbind
            | CommandId::UnbindResp,
            Body::Empty,
        ) => {}

        (
            CommandId::BindTransmitter | CommandId::BindReceiver | CommandId::BindTransceiver,
            Body::Bind(bind),
        ) => {
            put_cstring(buf, &bind.system_id);
            put_cstring(buf, &bind.password);
            put_cstring(buf, &bind.system_type);
            buf.put_u8(bind.interface_version);
            buf.put_u8(bind.addr_ton);
            buf.put_u8(bind.addr_npi);
            put_cstring(buf, &bind.address_range);
        }

        (
            CommandId::BindTransmitterResp
            | CommandId::BindReceiverResp
            | CommandId::BindTransceiverResp,
            Body::BindResp(resp),
        ) => put_cstring(buf, &resp.system_id),

        (
            CommandId::SubmitSm | CommandId::DeliverSm | CommandId::DataSm,
            Body::SubmitSm(sm),
        ) => {
            put_cstring(buf, &sm.service_type);
            buf.put_u8(sm.source_addr_ton);
            buf.put_u8(sm.source_addr_npi);
            put_cstring(buf, &sm.source_addr);
            buf.put_u8(sm.dest_addr_ton);
            buf.put_u8(sm.dest_addr_npi);
            put_cstring(buf, &sm.destination_addr);
            buf.put_u8(sm.esm_class);
            buf.put_u8(sm.protocol_id);
            buf.put_u8(sm.priority_flag);
            put_cstring(buf, &sm.schedule_delivery_time);
            put_cstring(buf, &sm.validity_period);
            buf.put_u8(sm.registered_delivery);
            buf.put_u8(sm.replace_if_present_flag);
            buf.put_u8(sm.data_coding);
            buf.put_u8(sm.sm_default_msg_id);
            buf.put_u8(sm.sm_length);
            buf.put_slice(sm.short_message.as_bytes());
        }

        (
            CommandId::SubmitSmResp | CommandId::DeliverSmResp | CommandId::DataSmResp,
            Body::MessageResp(resp),
        ) => put_cstring(buf, &resp.message_id),

        _ => return Err(CodecError::BodyMismatch(command_id)),
    }
    Ok(())
}

/// Read a NUL-terminated C-octet string of at most `max_len` octets
/// (terminator included) and strip the terminator.
fn get_cstring(
    src: &mut Cursor<&[u8]>,
    max_len: usize,
    field: &'static str,
) -> Result<String, CodecError> {
    let start = src.position() as usize;
    let data = *src.get_ref();
    let window = &data[start..data.len().min(start + max_len)];

    let nul = window
        .iter()
        .position(|&b| b == 0)
        .ok_or(CodecError::TruncatedBody { field })?;
    let value =
        String::from_utf8(window[..nul].to_vec()).map_err(|source| CodecError::Utf8 {
            field,
            source,
        })?;
    src.set_position((start + nul + 1) as u64);
    Ok(value)
}

fn get_u8(src: &mut Cursor<&[u8]>, field: &'static str) -> Result<u8, CodecError> {
    if !src.has_remaining() {
        return Err(CodecError::TruncatedBody { field });
    }
    Ok(src.get_u8())
}

/// Write value bytes plus the NUL terminator. SMPP C-octet strings are
/// variable length; fields are not padded to their schema maximum.
fn put_cstring(buf: &mut BytesMut, value: &str) {
    buf.put_slice(value.as_bytes());
    buf.put_u8(0);
}
