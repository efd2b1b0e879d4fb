//! Per-connection handler.
//!
//! Each accepted socket gets one handler task (reading) and one pump
//! task (writing). The pump drains the connection's outbound event
//! channel onto the socket; everything else in the process only ever
//! touches the channel, so socket writes are single-owner and ordered.
//!
//! The handler trusts the identity tokens clients present: knowing a
//! token *is* the authentication. What it never does is tell a client
//! anything they couldn't already know — a bad game id, someone else's
//! duel, a garbled frame all produce either silence or a terse error
//! to this connection alone.

use std::sync::Arc;

use duello_engine::{DuelManager, Move};
use duello_presence::Presence;
use duello_protocol::{ClientEvent, Codec, Identity, JsonCodec, ServerEvent};
use duello_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::{Mutex, mpsc};

/// Runs one connection to completion.
///
/// Takes the concrete WebSocket connection: the pump task below needs
/// a `Send` future out of `send`, which async-fn-in-trait can't
/// promise for an arbitrary `Connection` impl.
pub async fn handle_connection(
    conn: WebSocketConnection,
    presence: Presence,
    manager: Arc<Mutex<DuelManager>>,
) {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let codec = JsonCodec;

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    // Outbound pump: channel → socket.
    let writer = Arc::clone(&conn);
    let pump = tokio::spawn(async move {
        let codec = JsonCodec;
        while let Some(event) = rx.recv().await {
            let bytes = match codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::error!(%err, "failed to encode outbound event");
                    continue;
                }
            };
            if writer.send(&bytes).await.is_err() {
                break;
            }
        }
    });

    // Inbound loop: socket → dispatch.
    loop {
        match conn.recv().await {
            Ok(Some(bytes)) => match codec.decode::<ClientEvent>(&bytes) {
                Ok(event) => {
                    dispatch(event, conn_id, &tx, &presence, &manager).await;
                }
                Err(err) => {
                    tracing::debug!(%conn_id, %err, "undecodable frame");
                    let _ = tx.send(ServerEvent::Error {
                        message: "couldn't read that".into(),
                    });
                }
            },
            Ok(None) => break,
            Err(err) => {
                tracing::debug!(%conn_id, %err, "connection error");
                break;
            }
        }
    }

    // The socket is gone; presence decides whether the person is.
    presence.on_disconnect(conn_id).await;
    pump.abort();
    tracing::debug!(%conn_id, "connection handler finished");
}

async fn dispatch(
    event: ClientEvent,
    conn_id: ConnectionId,
    tx: &mpsc::UnboundedSender<ServerEvent>,
    presence: &Presence,
    manager: &Arc<Mutex<DuelManager>>,
) {
    match event {
        ClientEvent::GoOnline { identity } => {
            presence
                .go_online(identity.clone(), conn_id, tx.clone())
                .await;
            let _ = tx.send(ServerEvent::Online { identity });
        }

        ClientEvent::Rejoin { identity } => {
            // A rejoin only succeeds while presence still remembers the
            // visit (i.e. within the disconnect grace window).
            if presence.is_online(&identity).await {
                presence
                    .go_online(identity.clone(), conn_id, tx.clone())
                    .await;
                let _ = tx.send(ServerEvent::Rejoined { identity });
            } else {
                let _ = tx.send(ServerEvent::RejoinFailed {
                    message: "that visit has ended".into(),
                });
            }
        }

        ClientEvent::Checkout { identity } => {
            if let Err(err) = presence.checkout(&identity).await {
                tracing::debug!(%identity, %err, "checkout for unknown identity");
            }
            let _ = tx.send(ServerEvent::CheckedOut);
        }

        ClientEvent::Challenge {
            target,
            kind,
            stakes,
        } => {
            let Some(from) = presence.resolve_identity(conn_id).await else {
                let _ = tx.send(ServerEvent::Error {
                    message: "go online first".into(),
                });
                return;
            };
            let result = manager
                .lock()
                .await
                .challenge(from, target, kind, stakes)
                .await;
            if let Err(err) = result {
                let _ = tx.send(ServerEvent::Error {
                    message: err.to_string(),
                });
            }
        }

        ClientEvent::Respond { game_id, accepted } => {
            let Some(from) = presence.resolve_identity(conn_id).await else {
                let _ = tx.send(ServerEvent::Error {
                    message: "go online first".into(),
                });
                return;
            };
            let result = manager.lock().await.respond(from, &game_id, accepted);
            if let Err(err) = result {
                let _ = tx.send(ServerEvent::Error {
                    message: err.to_string(),
                });
            }
        }

        ClientEvent::ShowdownChoice {
            game_id,
            identity,
            choice,
        } => {
            forward_move(manager, tx, identity, game_id, Move::Choice(choice)).await;
        }

        ClientEvent::HotPotatoPass { game_id, identity } => {
            forward_move(manager, tx, identity, game_id, Move::Pass).await;
        }

        ClientEvent::TapRaceTap { game_id, identity } => {
            forward_move(manager, tx, identity, game_id, Move::Tap).await;
        }

        ClientEvent::ConfessionSubmit {
            game_id,
            identity,
            statements,
            lie_index,
        } => {
            forward_move(
                manager,
                tx,
                identity,
                game_id,
                Move::Submit {
                    statements,
                    lie_index,
                },
            )
            .await;
        }

        ClientEvent::ConfessionGuess {
            game_id,
            identity,
            guess,
        } => {
            forward_move(manager, tx, identity, game_id, Move::Guess { guess }).await;
        }
    }
}

async fn forward_move(
    manager: &Arc<Mutex<DuelManager>>,
    tx: &mpsc::UnboundedSender<ServerEvent>,
    identity: Identity,
    game_id: duello_protocol::GameId,
    mv: Move,
) {
    let result = manager.lock().await.handle_move(identity, &game_id, mv);
    if let Err(err) = result {
        let _ = tx.send(ServerEvent::Error {
            message: err.to_string(),
        });
    }
}
