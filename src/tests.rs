// ABOUTME: Integration tests driving a real SMSC and ESME over loopback sockets

use crate::codec::{Pdu, encode_pdu, parse_pdu};
use crate::connection::FrameReader;
use crate::datatypes::{Body, CommandId, CommandStatus};
use crate::error::{SmppError, SmppResult};
use crate::server::Smsc;
use crate::session::{BindDefaults, Session};
use crate::state::SessionState;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};

const VALID_SYSTEM_ID: &str = "SystemId";
const VALID_PASSWORD: &str = "Password";

async fn start_smsc() -> (Smsc, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let smsc = Smsc::new(listener, VALID_SYSTEM_ID, VALID_PASSWORD);
    smsc.start().await;
    (smsc, addr)
}

async fn connect_pair() -> (Smsc, Session, SocketAddr) {
    let (smsc, addr) = start_smsc().await;
    let esme = Session::connect(addr).await.unwrap();
    wait_for_connections(&smsc, 1).await;
    (smsc, esme, addr)
}

/// A session and the raw server end of its transport, with no SMSC behind it.
async fn raw_pair() -> (Session, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (client, server) = tokio::join!(TcpStream::connect(addr), listener.accept());
    (Session::from_stream(client.unwrap()), server.unwrap().0)
}

async fn wait_for_connections(smsc: &Smsc, count: usize) {
    for _ in 0..500 {
        if smsc.number_of_connections() == count {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "smsc never reached {count} connections (currently {})",
        smsc.number_of_connections()
    );
}

async fn wait_for_state(session: &Session, state: SessionState) {
    for _ in 0..500 {
        if session.state().await == state {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("session never reached state {state}");
}

/// Retry over read deadlines; the peer may need a few loop turns to answer.
async fn receive_with_retries(session: &Session, tries: usize) -> SmppResult<Pdu> {
    for _ in 0..tries {
        match session.receive_pdu().await {
            Err(SmppError::Timeout) => continue,
            other => return other,
        }
    }
    Err(SmppError::Timeout)
}

#[tokio::test]
async fn esme_binds_in_each_role() {
    for (role, expected) in [
        ("transmitter", SessionState::BoundTx),
        ("receiver", SessionState::BoundRx),
        ("transceiver", SessionState::BoundTrx),
    ] {
        let (smsc, esme, _) = connect_pair().await;

        let response = match role {
            "transmitter" => esme.bind_transmitter(VALID_SYSTEM_ID, VALID_PASSWORD).await,
            "receiver" => esme.bind_receiver(VALID_SYSTEM_ID, VALID_PASSWORD).await,
            _ => esme.bind_transceiver(VALID_SYSTEM_ID, VALID_PASSWORD).await,
        }
        .unwrap();

        assert_eq!(response.header.command_status, CommandStatus::Ok, "{role}");
        assert_eq!(esme.state().await, expected, "{role}");

        // The SMSC-side session mirrors the bound state
        let server_side = smsc.sessions()[0].clone();
        wait_for_state(&server_side, expected).await;

        esme.close().await.unwrap();
        smsc.close().await;
    }
}

#[tokio::test]
async fn bind_with_wrong_credentials_is_rejected() {
    let (smsc, esme, _) = connect_pair().await;

    let error = esme
        .bind_receiver("WrongSystemId", VALID_PASSWORD)
        .await
        .unwrap_err();
    match error {
        SmppError::BindRejected { status, response } => {
            assert_eq!(status, CommandStatus::BindFailed);
            assert_eq!(response.header.command_id, CommandId::BindReceiverResp);
            match &response.body {
                Body::BindResp(resp) => assert_eq!(resp.system_id, "WrongSystemId"),
                other => panic!("expected bind response body, got {other:?}"),
            }
        }
        other => panic!("expected a rejected bind, got {other:?}"),
    }
    assert_eq!(esme.state().await, SessionState::Open);

    esme.close().await.unwrap();
    smsc.close().await;
}

#[tokio::test]
async fn submit_before_bind_gets_invalid_bind_status() {
    let (smsc, esme, _) = connect_pair().await;

    let sequence = esme
        .send(Pdu::submit_sm().with_short_message("Hello"))
        .await
        .unwrap();
    let response = receive_with_retries(&esme, 5).await.unwrap();

    assert_eq!(response.header.command_id, CommandId::SubmitSmResp);
    assert_eq!(
        response.header.command_status,
        CommandStatus::IncorrectBindStatus
    );
    assert_eq!(response.header.sequence_number, sequence);
    match &response.body {
        Body::MessageResp(resp) => assert_eq!(resp.message_id, ""),
        other => panic!("expected message response body, got {other:?}"),
    }

    esme.close().await.unwrap();
    smsc.close().await;
}

#[tokio::test]
async fn concurrent_sends_allocate_distinct_sequence_numbers() {
    let (esme, _server) = raw_pair().await;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..101 {
        let esme = esme.clone();
        tasks.spawn(async move { esme.send(Pdu::enquire_link()).await.unwrap() });
    }

    let mut sequences = Vec::with_capacity(101);
    while let Some(sequence) = tasks.join_next().await {
        sequences.push(sequence.unwrap());
    }
    sequences.sort_unstable();
    assert_eq!(sequences, (1..=101).collect::<Vec<u32>>());

    esme.close().await.unwrap();
}

#[tokio::test]
async fn back_to_back_pdus_arrive_on_exact_frame_boundaries() {
    let (esme, server) = raw_pair().await;

    let bind = Pdu::bind_transmitter()
        .with_system_id(VALID_SYSTEM_ID)
        .with_password(VALID_PASSWORD);
    let submit = Pdu::submit_sm().with_short_message("Hello");

    let first_sequence = esme.send(bind.clone()).await.unwrap();
    let second_sequence = esme.send(submit.clone()).await.unwrap();
    assert_eq!(first_sequence, 1);
    assert_eq!(second_sequence, 2);

    let mut reader = FrameReader::new(server);
    let first = reader.read_frame().await.unwrap().unwrap();
    let second = reader.read_frame().await.unwrap().unwrap();
    assert_eq!(first, encode_pdu(&bind.with_sequence_number(1)).unwrap());
    assert_eq!(second, encode_pdu(&submit.with_sequence_number(2)).unwrap());

    esme.close().await.unwrap();
}

#[tokio::test]
async fn close_is_idempotent_and_fails_later_operations() {
    let (smsc, esme, _) = connect_pair().await;

    esme.close().await.unwrap();
    esme.close().await.unwrap();
    assert_eq!(esme.state().await, SessionState::Closed);

    assert!(matches!(
        esme.send(Pdu::enquire_link()).await,
        Err(SmppError::ConnectionClosed)
    ));
    assert!(matches!(
        esme.receive_pdu().await,
        Err(SmppError::ConnectionClosed)
    ));

    smsc.close().await;
}

#[tokio::test]
async fn closing_esme_removes_it_from_the_smsc_registry() {
    let (smsc, esme, _) = connect_pair().await;

    esme.close().await.unwrap();
    wait_for_connections(&smsc, 0).await;

    smsc.close().await;
}

#[tokio::test]
async fn smsc_close_shuts_everything_down() {
    let (smsc, esme, addr) = connect_pair().await;
    let server_side = smsc.sessions()[0].clone();

    smsc.close().await;

    assert_eq!(smsc.state().await, SessionState::Closed);
    assert_eq!(server_side.state().await, SessionState::Closed);

    // The listener is gone, so nobody else can connect
    assert!(TcpStream::connect(addr).await.is_err());

    // And closing again is a no-op
    smsc.close().await;

    esme.close().await.unwrap();
}

#[tokio::test]
async fn esme_can_bind_through_started_smsc_without_manual_accept() {
    let (smsc, _esme, addr) = connect_pair().await;

    let second = Session::connect(addr).await.unwrap();
    wait_for_connections(&smsc, 2).await;

    let response = second
        .bind_transmitter(VALID_SYSTEM_ID, VALID_PASSWORD)
        .await
        .unwrap();

    let mut expected = Pdu::bind_transmitter_resp()
        .with_system_id(VALID_SYSTEM_ID)
        .with_sequence_number(1);
    expected.header.command_length = 25;
    assert_eq!(response, expected);
    assert_eq!(smsc.number_of_connections(), 2);

    second.close().await.unwrap();
    smsc.close().await;
}

#[tokio::test]
async fn bound_sessions_answer_according_to_role() {
    struct Case {
        name: &'static str,
        request: Pdu,
        bind_state: SessionState,
        expected: Pdu,
    }

    let cases = [
        Case {
            name: "submit_sm while bound as transmitter is accepted",
            request: Pdu::submit_sm().with_short_message("Hello"),
            bind_state: SessionState::BoundTx,
            expected: Pdu::submit_sm_resp().with_message_id("1"),
        },
        Case {
            name: "submit_sm while bound as receiver is rejected",
            request: Pdu::submit_sm().with_short_message("Hello"),
            bind_state: SessionState::BoundRx,
            expected: Pdu::submit_sm_resp()
                .with_message_id("")
                .with_smpp_error(CommandStatus::IncorrectBindStatus),
        },
        Case {
            name: "enquire_link is always answered",
            request: Pdu::enquire_link(),
            bind_state: SessionState::BoundTx,
            expected: Pdu::enquire_link_resp(),
        },
        Case {
            name: "deliver_sm at the SMSC is rejected",
            request: Pdu::deliver_sm(),
            bind_state: SessionState::BoundTx,
            expected: Pdu::deliver_sm_resp()
                .with_message_id("")
                .with_smpp_error(CommandStatus::IncorrectBindStatus),
        },
    ];

    for case in cases {
        let (smsc, esme, _) = connect_pair().await;
        let server_side = smsc.sessions()[0].clone();

        esme.set_state(case.bind_state).await;
        server_side.set_state(case.bind_state).await;

        let sequence = esme.send(case.request).await.unwrap();
        let actual = receive_with_retries(&esme, 5).await.unwrap();

        let mut expected = case.expected.with_sequence_number(sequence);
        expected.header.command_length = actual.header.command_length;
        assert_eq!(actual, expected, "{}", case.name);

        esme.close().await.unwrap();
        smsc.close().await;
    }
}

#[tokio::test]
async fn unbind_returns_both_sides_to_open() {
    let (smsc, esme, _) = connect_pair().await;

    esme.bind_transceiver(VALID_SYSTEM_ID, VALID_PASSWORD)
        .await
        .unwrap();
    let server_side = smsc.sessions()[0].clone();
    wait_for_state(&server_side, SessionState::BoundTrx).await;

    let response = esme.unbind().await.unwrap();
    assert_eq!(response.header.command_id, CommandId::UnbindResp);
    assert_eq!(response.header.command_status, CommandStatus::Ok);
    assert_eq!(esme.state().await, SessionState::Open);
    wait_for_state(&server_side, SessionState::Open).await;

    esme.close().await.unwrap();
    smsc.close().await;
}

#[tokio::test]
async fn receive_times_out_when_the_peer_is_silent() {
    let (esme, _server) = raw_pair().await;
    assert!(matches!(esme.receive_pdu().await, Err(SmppError::Timeout)));
    esme.close().await.unwrap();
}

#[tokio::test]
async fn bind_defaults_shape_the_bind_pdu() {
    let (esme, server) = raw_pair().await;
    esme.set_bind_defaults(BindDefaults {
        system_type: Some("SUBMIT1".to_string()),
        addr_ton: Some(1),
        addr_npi: Some(1),
        ..BindDefaults::default()
    });

    // No peer will answer; the bind itself times out and that is fine
    let sender = esme.clone();
    let bind = tokio::spawn(async move {
        let _ = sender.bind_transmitter(VALID_SYSTEM_ID, VALID_PASSWORD).await;
    });

    let mut reader = FrameReader::new(server);
    let frame = reader.read_frame().await.unwrap().unwrap();
    let request = parse_pdu(&frame).unwrap();
    assert_eq!(request.header.command_id, CommandId::BindTransmitter);
    match &request.body {
        Body::Bind(body) => {
            assert_eq!(body.system_id, VALID_SYSTEM_ID);
            assert_eq!(body.password, VALID_PASSWORD);
            assert_eq!(body.system_type, "SUBMIT1");
            assert_eq!(body.addr_ton, 1);
            assert_eq!(body.addr_npi, 1);
        }
        other => panic!("expected bind body, got {other:?}"),
    }

    bind.await.unwrap();
    esme.close().await.unwrap();
}

#[tokio::test]
async fn overridden_deliver_sm_handler_runs_on_the_control_loop() {
    let (smsc, esme, _) = connect_pair().await;

    let (delivered_tx, mut delivered_rx) = tokio::sync::mpsc::channel::<Pdu>(1);
    esme.set_handler(CommandId::DeliverSm, move |session, pdu| {
        let delivered_tx = delivered_tx.clone();
        async move {
            let response = Pdu::response_to(&pdu)
                .expect("deliver_sm has a response")
                .with_message_id("1");
            session.send(response).await?;
            let _ = delivered_tx.send(pdu).await;
            Ok(())
        }
    });

    let response = esme
        .bind_receiver(VALID_SYSTEM_ID, VALID_PASSWORD)
        .await
        .unwrap();
    assert_eq!(response.header.command_status, CommandStatus::Ok);
    esme.start_control_loop().await;

    // Capture the answer arriving back at the SMSC-side session
    let server_side = smsc.sessions()[0].clone();
    let (answer_tx, mut answer_rx) = tokio::sync::mpsc::channel::<Pdu>(1);
    server_side.set_handler(CommandId::DeliverSmResp, move |_, pdu| {
        let answer_tx = answer_tx.clone();
        async move {
            let _ = answer_tx.send(pdu).await;
            Ok(())
        }
    });

    let sequence = server_side
        .send(
            Pdu::deliver_sm()
                .with_source_addr("5557654321")
                .with_destination_addr("5551234567")
                .with_short_message("Hello, how are you today ?"),
        )
        .await
        .unwrap();

    let delivered = timeout(Duration::from_secs(5), delivered_rx.recv())
        .await
        .unwrap()
        .unwrap();
    match &delivered.body {
        Body::SubmitSm(sm) => assert_eq!(sm.destination_addr, "5551234567"),
        other => panic!("expected deliver_sm body, got {other:?}"),
    }

    let answer = timeout(Duration::from_secs(5), answer_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(answer.header.command_id, CommandId::DeliverSmResp);
    assert_eq!(answer.header.sequence_number, sequence);
    match &answer.body {
        Body::MessageResp(resp) => assert_eq!(resp.message_id, "1"),
        other => panic!("expected message response body, got {other:?}"),
    }

    esme.close().await.unwrap();
    smsc.close().await;
}
