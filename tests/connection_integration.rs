//! Integration tests for the connection manager and the action pipeline.
//!
//! Each test starts a tokio-tungstenite server on a random local port and
//! drives the client against it through the public API.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use paquera::core::app::{
    apply_actions, App, AppAction, AppActionContext, AppActionEnvelope, AppCommand, AppInitConfig,
};
use paquera::core::connection::{
    ConnectionEvent, ConnectionId, ConnectionManager, ConnectionState, RetryPolicy, SendOutcome,
};
use paquera::core::message::Sender;
use paquera::core::personality::find_personality;
use paquera::core::protocol::InboundFormat;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);
const REPLY: &str = "@hitch respira fundo e tenta de novo";

/// What the server saw, tagged with the accept order of the socket.
#[derive(Debug)]
enum ServerEvent {
    Frame { socket: usize, text: String },
    /// `graceful` is true when the client sent a close frame first.
    Closed { socket: usize, graceful: bool },
}

/// Starts a server that answers every text frame with [`REPLY`] and closes
/// the socket when it receives `bye`.
async fn start_server() -> (String, mpsc::UnboundedReceiver<ServerEvent>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut socket = 0;
        while let Ok((stream, _)) = listener.accept().await {
            socket += 1;
            let tx = tx.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                let mut graceful = false;
                while let Some(Ok(frame)) = ws.next().await {
                    match frame {
                        WsMessage::Text(text) if text == "bye" => {
                            let _ = ws.close(None).await;
                            break;
                        }
                        WsMessage::Text(text) => {
                            let _ = tx.send(ServerEvent::Frame { socket, text });
                            let _ = ws.send(WsMessage::Text(REPLY.to_string())).await;
                        }
                        WsMessage::Close(_) => {
                            graceful = true;
                            break;
                        }
                        _ => {}
                    }
                }
                let _ = tx.send(ServerEvent::Closed { socket, graceful });
            });
        }
    });

    (format!("ws://127.0.0.1:{port}/ws"), rx)
}

async fn next_event(
    rx: &mut mpsc::UnboundedReceiver<(ConnectionEvent, ConnectionId)>,
) -> (ConnectionEvent, ConnectionId) {
    rx.recv().await.expect("connection event channel closed")
}

fn envelope(action: AppAction) -> AppActionEnvelope {
    AppActionEnvelope {
        action,
        context: AppActionContext::default(),
    }
}

fn onboarded_app() -> (App, AppCommand) {
    let mut app = App::new(AppInitConfig {
        personality: find_personality("cynthia").unwrap(),
        inbound_format: InboundFormat::Raw,
        log_file: None,
    })
    .unwrap();
    let onboarding = app.onboarding_mut().unwrap();
    onboarding.set_current_input("Ana");
    assert!(onboarding.advance());
    onboarding.set_current_input("25");
    assert!(onboarding.advance());
    assert!(onboarding.add_interest(Some("music")));
    let command = app.complete_onboarding().unwrap();
    (app, command)
}

#[tokio::test]
async fn manager_becomes_ready_and_exchanges_frames() {
    timeout(TEST_TIMEOUT, async {
        let (endpoint, mut server) = start_server().await;
        let (mut manager, mut events) = ConnectionManager::new(endpoint, RetryPolicy::none());

        assert_eq!(manager.send("cedo demais".into()), SendOutcome::DroppedNotReady);

        let id = manager.open();
        assert_eq!(next_event(&mut events).await, (ConnectionEvent::Ready, id));
        assert!(manager.is_ready());
        assert_eq!(manager.state(), ConnectionState::Open);

        assert_eq!(manager.send("oi".into()), SendOutcome::Sent);
        match server.recv().await.unwrap() {
            ServerEvent::Frame { text, .. } => assert_eq!(text, "oi"),
            other => panic!("expected a frame, got {other:?}"),
        }
        assert_eq!(
            next_event(&mut events).await,
            (ConnectionEvent::Message(REPLY.to_string()), id)
        );

        manager.shutdown().await;
        assert_eq!(manager.state(), ConnectionState::Closed);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn peer_close_is_reported_once() {
    timeout(TEST_TIMEOUT, async {
        let (endpoint, _server) = start_server().await;
        let (mut manager, mut events) = ConnectionManager::new(endpoint, RetryPolicy::none());

        let id = manager.open();
        assert_eq!(next_event(&mut events).await.0, ConnectionEvent::Ready);

        assert!(manager.send("bye".into()).is_sent());
        assert_eq!(next_event(&mut events).await, (ConnectionEvent::Closed, id));
        assert!(!manager.is_ready());
        assert_eq!(manager.current_id(), None);
        assert_eq!(manager.state(), ConnectionState::Closed);
        assert_eq!(manager.send("depois".into()), SendOutcome::DroppedNotReady);
    })
    .await
    .expect("test timed out");
}

/// Quitting closes the connection and then shuts the manager down right
/// before the runtime goes away. The server must still get a close frame.
#[test]
fn quitting_sends_a_close_frame_before_the_runtime_stops() {
    let server_rt = tokio::runtime::Runtime::new().unwrap();
    let (endpoint, mut server) = server_rt.block_on(start_server());

    let client_rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    client_rt.block_on(async {
        let (mut manager, mut events) = ConnectionManager::new(endpoint, RetryPolicy::none());
        manager.open();
        assert_eq!(next_event(&mut events).await.0, ConnectionEvent::Ready);

        manager.close();
        manager.shutdown().await;
    });
    drop(client_rt);

    let closed = server_rt
        .block_on(async { timeout(TEST_TIMEOUT, server.recv()).await })
        .expect("server never saw the socket close");
    match closed {
        Some(ServerEvent::Closed { socket, graceful }) => {
            assert_eq!(socket, 1);
            assert!(graceful, "socket was dropped without a close frame");
        }
        other => panic!("expected the socket to close, got {other:?}"),
    }
}

#[tokio::test]
async fn reopening_closes_the_previous_socket() {
    timeout(TEST_TIMEOUT, async {
        let (endpoint, mut server) = start_server().await;
        let (mut manager, mut events) = ConnectionManager::new(endpoint, RetryPolicy::none());

        let first = manager.open();
        assert_eq!(next_event(&mut events).await, (ConnectionEvent::Ready, first));

        let second = manager.open();
        assert_ne!(first, second);
        assert_eq!(manager.current_id(), Some(second));

        match server.recv().await.unwrap() {
            ServerEvent::Closed { socket, .. } => assert_eq!(socket, 1),
            other => panic!("expected the first socket to close, got {other:?}"),
        }

        // The cancelled connection stays silent; only the new one reports.
        assert_eq!(next_event(&mut events).await, (ConnectionEvent::Ready, second));
        assert!(manager.send("oi".into()).is_sent());
        assert_eq!(next_event(&mut events).await.1, second);
        assert!(events.try_recv().is_err());

        manager.shutdown().await;
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unreachable_endpoint_retries_then_gives_up() {
    timeout(TEST_TIMEOUT, async {
        let endpoint = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            format!("ws://{}/ws", listener.local_addr().unwrap())
        };
        let retry = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(20),
        };
        let (mut manager, mut events) = ConnectionManager::new(endpoint, retry);

        let id = manager.open();
        let mut seen = Vec::new();
        loop {
            let (event, conn_id) = next_event(&mut events).await;
            assert_eq!(conn_id, id);
            let done = event == ConnectionEvent::Closed;
            seen.push(event);
            if done {
                break;
            }
        }

        assert_eq!(
            seen[0],
            ConnectionEvent::Retrying {
                attempt: 1,
                delay: Duration::from_millis(10)
            }
        );
        assert_eq!(
            seen[1],
            ConnectionEvent::Retrying {
                attempt: 2,
                delay: Duration::from_millis(20)
            }
        );
        match &seen[2] {
            ConnectionEvent::Error(info) => assert!(info.contains("3 attempt")),
            other => panic!("expected an error, got {other:?}"),
        }
        assert_eq!(seen.len(), 4);
        assert!(!manager.is_ready());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chat_pipeline_sends_profile_frames_and_classifies_replies() {
    timeout(TEST_TIMEOUT, async {
        let (endpoint, mut server) = start_server().await;
        let (mut manager, mut events) = ConnectionManager::new(endpoint, RetryPolicy::none());
        let (mut app, command) = onboarded_app();
        assert_eq!(command, AppCommand::OpenConnection);

        // Typed while the socket is still opening: kept locally, no frame.
        let early = apply_actions(
            &mut app,
            [envelope(AppAction::SubmitMessage {
                message: "tem alguém aí?".into(),
            })],
        );
        assert!(early.is_empty());
        let early_id = app.transcript.last().unwrap().id;
        assert!(app.is_undelivered(early_id));

        let id = manager.open();
        app.connection_opened(id);
        let (event, conn_id) = next_event(&mut events).await;
        assert_eq!(event, ConnectionEvent::Ready);
        apply_actions(&mut app, [envelope(AppAction::ConnectionReady { conn_id })]);
        assert!(app.connection.is_ready());

        let commands = apply_actions(
            &mut app,
            [envelope(AppAction::SubmitMessage {
                message: "oi, tudo bem?".into(),
            })],
        );
        let [AppCommand::SendFrame { payload, .. }] = commands.as_slice() else {
            panic!("expected one frame, got {commands:?}");
        };
        assert_eq!(manager.send(payload.clone()), SendOutcome::Sent);

        let frame: Value = match server.recv().await.unwrap() {
            ServerEvent::Frame { text, .. } => serde_json::from_str(&text).unwrap(),
            other => panic!("expected a frame, got {other:?}"),
        };
        assert_eq!(frame["message"], "oi, tudo bem?");
        assert_eq!(frame["personality"], "cynthia");
        assert_eq!(frame["userProfile"]["name"], "Ana");
        assert_eq!(frame["userProfile"]["age"], "25");
        assert_eq!(frame["userProfile"]["interests"][0], "music");

        let (event, conn_id) = next_event(&mut events).await;
        let ConnectionEvent::Message(raw) = event else {
            panic!("expected the reply");
        };
        apply_actions(&mut app, [envelope(AppAction::InboundMessage { raw, conn_id })]);

        let last = app.transcript.last().unwrap();
        assert_eq!(last.sender, Sender::DirectedAgent);
        assert_eq!(last.text, REPLY);
        assert!(app.is_undelivered(early_id));

        // A reconnect swaps ids; late events from the old socket are ignored.
        assert_eq!(
            apply_actions(&mut app, [envelope(AppAction::Reconnect)]),
            vec![AppCommand::OpenConnection]
        );
        let before = app.transcript.len();
        let new_id = manager.open();
        app.connection_opened(new_id);
        apply_actions(
            &mut app,
            [envelope(AppAction::InboundMessage {
                raw: "atrasada".into(),
                conn_id: id,
            })],
        );
        assert_eq!(app.transcript.len(), before);

        manager.shutdown().await;
    })
    .await
    .expect("test timed out");
}
