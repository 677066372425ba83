// ABOUTME: Full deliver_sm round trip - SMSC-side session delivers, a bound receiver answers
//
//      ┌───────────────┐                            ┌───────────┐
//      │smsc_connection│                            │esme_client│
//      └───────┬───────┘                            └─────┬─────┘
//              │            1 send deliver_sm             │
//              │─────────────────────────────────────────>│
//              │                                          │
//              │                 2 process received deliver_sm
//              │                                          │
//              │         3 answer with deliver_sm_resp    │
//              │<─────────────────────────────────────────│
//              │                                          │
//              │  4 handler on the SMSC side sees the answer
//      ┌───────┴───────┐                            ┌─────┴─────┐
//      │smsc_connection│                            │esme_client│
//      └───────────────┘                            └───────────┘

use smpp_sim::{CommandId, CommandStatus, Pdu, Smsc, Session};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

const SYSTEM_ID: &str = "MySystemId";
const PASSWORD: &str = "Password";
const EXPECTED_DESTINATION: &str = "5551234567";
const EXPECTED_MESSAGE_ID: &str = "1";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Server side preparations
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let smsc = Smsc::new(listener, SYSTEM_ID, PASSWORD);
    smsc.start().await;

    // Client side: connect, take over deliver_sm handling, bind as receiver
    let esme = Session::connect(addr).await?;
    esme.set_handler(CommandId::DeliverSm, |session: Session, pdu: Pdu| async move {
        if !session.is_receiver().await {
            let response = Pdu::deliver_sm_resp()
                .with_smpp_error(CommandStatus::IncorrectBindStatus)
                .with_sequence_number(pdu.header.sequence_number);
            session.send(response).await?;
            return Ok(());
        }
        tracing::info!(sequence = pdu.header.sequence_number, "deliver_sm received");
        let response = Pdu::response_to(&pdu)
            .expect("deliver_sm has a response")
            .with_message_id(EXPECTED_MESSAGE_ID);
        session.send(response).await?;
        Ok(())
    });

    esme.bind_receiver(SYSTEM_ID, PASSWORD).await?;
    esme.start_control_loop().await;

    // Step 4: watch for the answer arriving back at the SMSC-side session
    let server_side = smsc.sessions()[0].clone();
    let (answered_tx, mut answered_rx) = mpsc::channel::<Pdu>(1);
    server_side.set_handler(CommandId::DeliverSmResp, move |_, pdu| {
        let answered_tx = answered_tx.clone();
        async move {
            let _ = answered_tx.send(pdu).await;
            Ok(())
        }
    });

    // Step 1: have the SMSC-side session deliver a message
    let deliver = Pdu::deliver_sm()
        .with_source_addr("5557654321")
        .with_destination_addr(EXPECTED_DESTINATION)
        .with_data_coding(3)
        .with_short_message("Hello, how are you today ?");
    tracing::info!("about to send");
    server_side.send(deliver).await?;
    tracing::info!("sent");

    let answer = timeout(Duration::from_secs(10), answered_rx.recv())
        .await?
        .ok_or("no deliver_sm_resp arrived")?;
    tracing::info!(status = %answer.header.command_status, "round trip complete");

    esme.close().await?;
    smsc.close().await;
    Ok(())
}
