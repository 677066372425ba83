// ABOUTME: Default PDU handlers enforcing bind-role rules, plus the SMSC bind handler

use crate::codec::Pdu;
use crate::datatypes::{Body, CommandId, CommandStatus};
use crate::error::SmppResult;
use crate::session::Session;
use crate::state::SessionState;

/// Handlers every new session starts with. Users override them through
/// [`Session::set_handler`].
pub(crate) fn install_defaults(session: &Session) {
    session.set_handler(CommandId::EnquireLink, handle_enquire_link);
    session.set_handler(CommandId::SubmitSm, handle_submit_sm);
    session.set_handler(CommandId::DeliverSm, handle_deliver_sm);
    session.set_handler(CommandId::Unbind, handle_unbind);
}

/// enquire_link is answered unconditionally, echoing the sequence number.
pub async fn handle_enquire_link(session: Session, pdu: Pdu) -> SmppResult<()> {
    let response = Pdu::enquire_link_resp().with_sequence_number(pdu.header.sequence_number);
    session.send(response).await?;
    Ok(())
}

/// submit_sm is accepted only from a transmitter-bound peer.
pub async fn handle_submit_sm(session: Session, pdu: Pdu) -> SmppResult<()> {
    let response = if session.is_transmitter().await {
        Pdu::submit_sm_resp()
            .with_message_id("1")
            .with_sequence_number(pdu.header.sequence_number)
    } else {
        Pdu::submit_sm_resp()
            .with_message_id("")
            .with_smpp_error(CommandStatus::IncorrectBindStatus)
            .with_sequence_number(pdu.header.sequence_number)
    };
    session.send(response).await?;
    Ok(())
}

/// deliver_sm arriving at an SMSC-side session is a protocol violation; the
/// default rejects it. ESME applications override this handler.
pub async fn handle_deliver_sm(session: Session, pdu: Pdu) -> SmppResult<()> {
    let response = Pdu::deliver_sm_resp()
        .with_message_id("")
        .with_smpp_error(CommandStatus::IncorrectBindStatus)
        .with_sequence_number(pdu.header.sequence_number);
    session.send(response).await?;
    Ok(())
}

/// unbind releases the bound role. The peer gets its unbind_resp and the
/// session drops back to `OPEN`; the peer is expected to disconnect next.
pub async fn handle_unbind(session: Session, pdu: Pdu) -> SmppResult<()> {
    let response = Pdu::unbind_resp().with_sequence_number(pdu.header.sequence_number);
    session.send(response).await?;
    session.set_state(SessionState::Open).await;
    Ok(())
}

/// Install the server-side bind handler on a freshly accepted session,
/// checking credentials against the SMSC's configured identity.
pub(crate) fn install_bind_handler(session: &Session, system_id: String, password: String) {
    for command_id in [
        CommandId::BindTransmitter,
        CommandId::BindReceiver,
        CommandId::BindTransceiver,
    ] {
        let system_id = system_id.clone();
        let password = password.clone();
        session.set_handler(command_id, move |session, pdu| {
            let system_id = system_id.clone();
            let password = password.clone();
            async move { handle_bind(session, pdu, &system_id, &password).await }
        });
    }
}

/// Answer a bind request: echo the system_id, flag bad credentials with
/// `ESME_RBINDFAIL`, and on an accepted bind move the session into the bound
/// state selected by the request.
async fn handle_bind(
    session: Session,
    pdu: Pdu,
    system_id: &str,
    password: &str,
) -> SmppResult<()> {
    let credentials_ok = matches!(
        &pdu.body,
        Body::Bind(bind) if bind.system_id == system_id && bind.password == password
    );

    let requested_system_id = match &pdu.body {
        Body::Bind(bind) => bind.system_id.clone(),
        _ => String::new(),
    };

    let Some(mut response) = Pdu::response_to(&pdu) else {
        return Ok(());
    };
    response = response.with_system_id(requested_system_id);
    if !credentials_ok {
        tracing::info!(command = %pdu.header.command_id, "bind rejected, credentials do not match");
        response = response.with_smpp_error(CommandStatus::BindFailed);
    }

    let response_id = response.header.command_id;
    session.send(response).await?;

    if credentials_ok {
        if let Some(state) = SessionState::for_bind_response(response_id) {
            session.set_state(state).await;
        }
    }
    Ok(())
}
