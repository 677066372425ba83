// ABOUTME: PDU constructors with schema-complete defaults and fluent with_* setters
// ABOUTME: Setters consume and return the PDU; ones aimed at an absent field are no-ops

use crate::codec::{Header, Pdu};
use crate::datatypes::{
    BindBody, BindRespBody, Body, CommandId, CommandStatus, MessageRespBody, SubmitSmBody, Tlv,
};

fn default_header(command_id: CommandId) -> Header {
    Header {
        command_length: 0,
        command_id,
        command_status: CommandStatus::Ok,
        sequence_number: 0,
    }
}

impl Pdu {
    fn with_parts(command_id: CommandId, body: Body) -> Pdu {
        Pdu {
            header: default_header(command_id),
            body,
            tlvs: Vec::new(),
        }
    }

    pub fn generic_nack() -> Pdu {
        Pdu::with_parts(CommandId::GenericNack, Body::Empty)
    }

    pub fn enquire_link() -> Pdu {
        Pdu::with_parts(CommandId::EnquireLink, Body::Empty)
    }

    pub fn enquire_link_resp() -> Pdu {
        Pdu::with_parts(CommandId::EnquireLinkResp, Body::Empty)
    }

    pub fn unbind() -> Pdu {
        Pdu::with_parts(CommandId::Unbind, Body::Empty)
    }

    pub fn unbind_resp() -> Pdu {
        Pdu::with_parts(CommandId::UnbindResp, Body::Empty)
    }

    pub fn bind_transmitter() -> Pdu {
        Pdu::with_parts(CommandId::BindTransmitter, Body::Bind(BindBody::default()))
    }

    pub fn bind_receiver() -> Pdu {
        Pdu::with_parts(CommandId::BindReceiver, Body::Bind(BindBody::default()))
    }

    pub fn bind_transceiver() -> Pdu {
        Pdu::with_parts(CommandId::BindTransceiver, Body::Bind(BindBody::default()))
    }

    pub fn bind_transmitter_resp() -> Pdu {
        Pdu::with_parts(
            CommandId::BindTransmitterResp,
            Body::BindResp(BindRespBody::default()),
        )
    }

    pub fn bind_receiver_resp() -> Pdu {
        Pdu::with_parts(
            CommandId::BindReceiverResp,
            Body::BindResp(BindRespBody::default()),
        )
    }

    pub fn bind_transceiver_resp() -> Pdu {
        Pdu::with_parts(
            CommandId::BindTransceiverResp,
            Body::BindResp(BindRespBody::default()),
        )
    }

    pub fn submit_sm() -> Pdu {
        Pdu::with_parts(
            CommandId::SubmitSm,
            Body::SubmitSm(Box::new(SubmitSmBody::default())),
        )
    }

    pub fn deliver_sm() -> Pdu {
        Pdu::with_parts(
            CommandId::DeliverSm,
            Body::SubmitSm(Box::new(SubmitSmBody::default())),
        )
    }

    pub fn data_sm() -> Pdu {
        Pdu::with_parts(
            CommandId::DataSm,
            Body::SubmitSm(Box::new(SubmitSmBody::default())),
        )
    }

    pub fn submit_sm_resp() -> Pdu {
        Pdu::with_parts(
            CommandId::SubmitSmResp,
            Body::MessageResp(MessageRespBody::default()),
        )
    }

    pub fn deliver_sm_resp() -> Pdu {
        Pdu::with_parts(
            CommandId::DeliverSmResp,
            Body::MessageResp(MessageRespBody::default()),
        )
    }

    pub fn data_sm_resp() -> Pdu {
        Pdu::with_parts(
            CommandId::DataSmResp,
            Body::MessageResp(MessageRespBody::default()),
        )
    }

    /// Default PDU for an arbitrary command id.
    pub fn for_command(command_id: CommandId) -> Pdu {
        match command_id {
            CommandId::GenericNack => Pdu::generic_nack(),
            CommandId::EnquireLink => Pdu::enquire_link(),
            CommandId::EnquireLinkResp => Pdu::enquire_link_resp(),
            CommandId::Unbind => Pdu::unbind(),
            CommandId::UnbindResp => Pdu::unbind_resp(),
            CommandId::BindTransmitter => Pdu::bind_transmitter(),
            CommandId::BindReceiver => Pdu::bind_receiver(),
            CommandId::BindTransceiver => Pdu::bind_transceiver(),
            CommandId::BindTransmitterResp => Pdu::bind_transmitter_resp(),
            CommandId::BindReceiverResp => Pdu::bind_receiver_resp(),
            CommandId::BindTransceiverResp => Pdu::bind_transceiver_resp(),
            CommandId::SubmitSm => Pdu::submit_sm(),
            CommandId::DeliverSm => Pdu::deliver_sm(),
            CommandId::DataSm => Pdu::data_sm(),
            CommandId::SubmitSmResp => Pdu::submit_sm_resp(),
            CommandId::DeliverSmResp => Pdu::deliver_sm_resp(),
            CommandId::DataSmResp => Pdu::data_sm_resp(),
        }
    }

    /// Default response PDU for a request, stamped with the request's
    /// sequence number. `None` when the request has no response counterpart
    /// (responses themselves, generic_nack).
    pub fn response_to(request: &Pdu) -> Option<Pdu> {
        let response_id = request.header.command_id.response()?;
        Some(Pdu::for_command(response_id).with_sequence_number(request.header.sequence_number))
    }

    pub fn with_system_id(mut self, system_id: impl Into<String>) -> Pdu {
        match &mut self.body {
            Body::Bind(bind) => bind.system_id = system_id.into(),
            Body::BindResp(resp) => resp.system_id = system_id.into(),
            _ => {}
        }
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Pdu {
        if let Body::Bind(bind) = &mut self.body {
            bind.password = password.into();
        }
        self
    }

    pub fn with_system_type(mut self, system_type: impl Into<String>) -> Pdu {
        if let Body::Bind(bind) = &mut self.body {
            bind.system_type = system_type.into();
        }
        self
    }

    pub fn with_interface_version(mut self, interface_version: u8) -> Pdu {
        if let Body::Bind(bind) = &mut self.body {
            bind.interface_version = interface_version;
        }
        self
    }

    pub fn with_addr_ton(mut self, addr_ton: u8) -> Pdu {
        if let Body::Bind(bind) = &mut self.body {
            bind.addr_ton = addr_ton;
        }
        self
    }

    pub fn with_addr_npi(mut self, addr_npi: u8) -> Pdu {
        if let Body::Bind(bind) = &mut self.body {
            bind.addr_npi = addr_npi;
        }
        self
    }

    pub fn with_address_range(mut self, address_range: impl Into<String>) -> Pdu {
        if let Body::Bind(bind) = &mut self.body {
            bind.address_range = address_range.into();
        }
        self
    }

    pub fn with_source_addr(mut self, source_addr: impl Into<String>) -> Pdu {
        if let Body::SubmitSm(sm) = &mut self.body {
            sm.source_addr = source_addr.into();
        }
        self
    }

    pub fn with_destination_addr(mut self, destination_addr: impl Into<String>) -> Pdu {
        if let Body::SubmitSm(sm) = &mut self.body {
            sm.destination_addr = destination_addr.into();
        }
        self
    }

    pub fn with_data_coding(mut self, data_coding: u8) -> Pdu {
        if let Body::SubmitSm(sm) = &mut self.body {
            sm.data_coding = data_coding;
        }
        self
    }

    /// Set the short message and keep `sm_length` in step with it.
    pub fn with_short_message(mut self, short_message: impl Into<String>) -> Pdu {
        if let Body::SubmitSm(sm) = &mut self.body {
            sm.short_message = short_message.into();
            sm.sm_length = sm.short_message.len() as u8;
        }
        self
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Pdu {
        if let Body::MessageResp(resp) = &mut self.body {
            resp.message_id = message_id.into();
        }
        self
    }

    pub fn with_sequence_number(mut self, sequence_number: u32) -> Pdu {
        self.header.sequence_number = sequence_number;
        self
    }

    /// Set the header's command_status.
    pub fn with_smpp_error(mut self, status: CommandStatus) -> Pdu {
        self.header.command_status = status;
        self
    }

    /// Override the header's command_id. The body is left untouched, so the
    /// new id must accept the current body variant for the PDU to encode.
    pub fn with_command_id(mut self, command_id: CommandId) -> Pdu {
        self.header.command_id = command_id;
        self
    }

    /// Append an optional parameter.
    pub fn with_tlv(mut self, tlv: Tlv) -> Pdu {
        self.tlvs.push(tlv);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::INTERFACE_VERSION_SMPP_34;

    #[test]
    fn bind_defaults_are_schema_complete() {
        let pdu = Pdu::bind_transmitter();
        assert_eq!(pdu.header.command_id, CommandId::BindTransmitter);
        assert_eq!(pdu.header.command_status, CommandStatus::Ok);
        assert_eq!(pdu.header.sequence_number, 0);
        match &pdu.body {
            Body::Bind(bind) => {
                assert_eq!(bind.system_id, "");
                assert_eq!(bind.password, "");
                assert_eq!(bind.system_type, "");
                assert_eq!(bind.interface_version, INTERFACE_VERSION_SMPP_34);
                assert_eq!(bind.addr_ton, 0);
                assert_eq!(bind.addr_npi, 0);
                assert_eq!(bind.address_range, "");
            }
            other => panic!("expected bind body, got {other:?}"),
        }
    }

    #[test]
    fn fluent_setters_build_a_bind() {
        let pdu = Pdu::bind_receiver()
            .with_system_id("SystemId")
            .with_password("Password")
            .with_sequence_number(3);
        match &pdu.body {
            Body::Bind(bind) => {
                assert_eq!(bind.system_id, "SystemId");
                assert_eq!(bind.password, "Password");
            }
            other => panic!("expected bind body, got {other:?}"),
        }
        assert_eq!(pdu.header.sequence_number, 3);
    }

    #[test]
    fn short_message_setter_tracks_length() {
        let pdu = Pdu::submit_sm().with_short_message("Hello");
        match &pdu.body {
            Body::SubmitSm(sm) => {
                assert_eq!(sm.short_message, "Hello");
                assert_eq!(sm.sm_length, 5);
            }
            other => panic!("expected submit_sm body, got {other:?}"),
        }
    }

    #[test]
    fn setters_for_absent_fields_are_no_ops() {
        let pdu = Pdu::enquire_link().with_message_id("1").with_system_id("x");
        assert_eq!(pdu.body, Body::Empty);
    }

    #[test]
    fn response_to_pairs_commands() {
        let request = Pdu::submit_sm().with_sequence_number(12);
        let response = Pdu::response_to(&request).unwrap();
        assert_eq!(response.header.command_id, CommandId::SubmitSmResp);
        assert_eq!(response.header.sequence_number, 12);
        assert_eq!(
            response.body,
            Body::MessageResp(MessageRespBody::default())
        );

        assert!(Pdu::response_to(&Pdu::submit_sm_resp()).is_none());
        assert!(Pdu::response_to(&Pdu::generic_nack()).is_none());
    }
}
