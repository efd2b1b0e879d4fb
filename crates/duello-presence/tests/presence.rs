//! Integration tests for the presence service, focused on the
//! disconnect grace window and the reconnect race.
//!
//! All tests run with `start_paused = true` so a 24-hour grace period
//! costs nothing to wait out.

use std::time::Duration;

use duello_presence::{Presence, PresenceConfig};
use duello_protocol::{Identity, ServerEvent};
use duello_transport::ConnectionId;
use tokio::sync::mpsc;

const GRACE: Duration = Duration::from_secs(86_400);

fn presence() -> Presence {
    Presence::new(PresenceConfig { grace: GRACE })
}

fn channel() -> (
    mpsc::UnboundedSender<ServerEvent>,
    mpsc::UnboundedReceiver<ServerEvent>,
) {
    mpsc::unbounded_channel()
}

/// Lets spawned timer tasks make progress under paused time.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_keeps_identity_online_during_grace() {
    let presence = presence();
    let aoife = Identity::new("aoife");
    let (tx, _rx) = channel();

    presence.go_online(aoife.clone(), ConnectionId::new(1), tx).await;
    presence.on_disconnect(ConnectionId::new(1)).await;

    settle().await;
    tokio::time::advance(GRACE - Duration::from_secs(1)).await;
    settle().await;

    assert!(presence.is_online(&aoife).await);
}

#[tokio::test(start_paused = true)]
async fn test_grace_expiry_removes_identity() {
    let presence = presence();
    let aoife = Identity::new("aoife");
    let (tx, _rx) = channel();

    presence.go_online(aoife.clone(), ConnectionId::new(1), tx).await;
    presence.on_disconnect(ConnectionId::new(1)).await;

    // Let the freshly spawned grace timer register its sleep before
    // advancing, or the advance lands before the deadline exists.
    settle().await;
    tokio::time::advance(GRACE + Duration::from_secs(1)).await;
    settle().await;

    assert!(!presence.is_online(&aoife).await);
    assert!(!presence.fabric().is_registered(&aoife).await);
}

#[tokio::test(start_paused = true)]
async fn test_rejoin_within_grace_cancels_removal() {
    let presence = presence();
    let aoife = Identity::new("aoife");
    let (tx1, _rx1) = channel();
    let (tx2, _rx2) = channel();

    presence.go_online(aoife.clone(), ConnectionId::new(1), tx1).await;
    presence.on_disconnect(ConnectionId::new(1)).await;

    // Halfway through the grace window the phone comes back.
    tokio::time::advance(GRACE / 2).await;
    settle().await;
    presence.go_online(aoife.clone(), ConnectionId::new(2), tx2).await;

    // Well past the original deadline: still online.
    tokio::time::advance(GRACE * 2).await;
    settle().await;

    assert!(presence.is_online(&aoife).await);
}

#[tokio::test(start_paused = true)]
async fn test_stale_grace_timer_does_not_remove_new_connection() {
    // A rejoin that races the timer: even if the old timer were to
    // fire, it must not act because the connection on record changed.
    let presence = presence();
    let aoife = Identity::new("aoife");
    let (tx1, _rx1) = channel();
    let (tx2, _rx2) = channel();

    presence.go_online(aoife.clone(), ConnectionId::new(1), tx1).await;
    presence.on_disconnect(ConnectionId::new(1)).await;
    presence.go_online(aoife.clone(), ConnectionId::new(2), tx2).await;

    // Drop the *new* connection too, then let only the first timer's
    // deadline pass. The second timer (for conn 2) was scheduled later
    // in wall-clock terms but both share the same delay, so advance
    // exactly to the first deadline.
    tokio::time::advance(GRACE * 3).await;
    settle().await;

    // Conn 2 never dropped, so aoife is still online.
    assert!(presence.is_online(&aoife).await);
}

#[tokio::test(start_paused = true)]
async fn test_checkout_is_immediate() {
    let presence = presence();
    let aoife = Identity::new("aoife");
    let (tx, _rx) = channel();

    presence.go_online(aoife.clone(), ConnectionId::new(1), tx).await;
    presence.checkout(&aoife).await.unwrap();

    assert!(!presence.is_online(&aoife).await);
    assert!(!presence.fabric().is_registered(&aoife).await);
}

#[tokio::test(start_paused = true)]
async fn test_checkout_unknown_identity_fails() {
    let presence = presence();
    assert!(presence.checkout(&Identity::new("ghost")).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_kick_notifies_then_removes() {
    let presence = presence();
    let aoife = Identity::new("aoife");
    let (tx, mut rx) = channel();

    presence.go_online(aoife.clone(), ConnectionId::new(1), tx).await;
    // Skip the roster update from going online.
    assert!(matches!(rx.recv().await, Some(ServerEvent::UsersUpdate { .. })));

    presence.kick(&aoife).await.unwrap();

    assert!(matches!(rx.recv().await, Some(ServerEvent::Kicked)));
    assert!(!presence.is_online(&aoife).await);
}

#[tokio::test(start_paused = true)]
async fn test_go_online_broadcasts_sorted_roster() {
    let presence = presence();
    let aoife = Identity::new("aoife");
    let brendan = Identity::new("brendan");
    let (tx1, mut rx1) = channel();
    let (tx2, mut rx2) = channel();

    presence.go_online(aoife.clone(), ConnectionId::new(1), tx1).await;
    match rx1.recv().await {
        Some(ServerEvent::UsersUpdate { users }) => assert_eq!(users, vec![aoife.clone()]),
        other => panic!("expected roster, got {other:?}"),
    }

    // A second arrival updates everyone, newcomer included.
    presence.go_online(brendan.clone(), ConnectionId::new(2), tx2).await;
    let expected = vec![aoife.clone(), brendan.clone()];
    match rx1.recv().await {
        Some(ServerEvent::UsersUpdate { users }) => assert_eq!(users, expected),
        other => panic!("expected roster, got {other:?}"),
    }
    match rx2.recv().await {
        Some(ServerEvent::UsersUpdate { users }) => assert_eq!(users, expected),
        other => panic!("expected roster, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_checkout_broadcasts_roster_to_remaining() {
    let presence = presence();
    let aoife = Identity::new("aoife");
    let brendan = Identity::new("brendan");
    let (tx1, mut rx1) = channel();
    let (tx2, _rx2) = channel();

    presence.go_online(aoife.clone(), ConnectionId::new(1), tx1).await;
    presence.go_online(brendan.clone(), ConnectionId::new(2), tx2).await;
    rx1.recv().await; // own arrival
    rx1.recv().await; // brendan's arrival

    presence.checkout(&brendan).await.unwrap();
    match rx1.recv().await {
        Some(ServerEvent::UsersUpdate { users }) => assert_eq!(users, vec![aoife.clone()]),
        other => panic!("expected roster, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_grace_expiry_broadcasts_roster_to_remaining() {
    let presence = presence();
    let aoife = Identity::new("aoife");
    let brendan = Identity::new("brendan");
    let (tx1, mut rx1) = channel();
    let (tx2, _rx2) = channel();

    presence.go_online(aoife.clone(), ConnectionId::new(1), tx1).await;
    presence.go_online(brendan.clone(), ConnectionId::new(2), tx2).await;
    rx1.recv().await;
    rx1.recv().await;

    presence.on_disconnect(ConnectionId::new(2)).await;
    settle().await;
    tokio::time::advance(GRACE + Duration::from_secs(1)).await;
    settle().await;

    match rx1.recv().await {
        Some(ServerEvent::UsersUpdate { users }) => assert_eq!(users, vec![aoife.clone()]),
        other => panic!("expected roster, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_on_disconnect_unknown_connection_is_noop() {
    let presence = presence();
    assert!(presence.on_disconnect(ConnectionId::new(99)).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_reset_all_cancels_grace_timers() {
    let presence = presence();
    let aoife = Identity::new("aoife");
    let brendan = Identity::new("brendan");
    let (tx1, _rx1) = channel();
    let (tx2, _rx2) = channel();

    presence.go_online(aoife.clone(), ConnectionId::new(1), tx1).await;
    presence.go_online(brendan.clone(), ConnectionId::new(2), tx2).await;
    presence.on_disconnect(ConnectionId::new(1)).await;

    presence.reset_all().await;

    assert_eq!(presence.online_count().await, 0);

    // The orphaned grace timer must not panic or resurrect anything.
    tokio::time::advance(GRACE * 2).await;
    settle().await;
    assert_eq!(presence.online_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_resolve_identity_follows_latest_connection() {
    let presence = presence();
    let aoife = Identity::new("aoife");
    let (tx1, _rx1) = channel();
    let (tx2, _rx2) = channel();

    presence.go_online(aoife.clone(), ConnectionId::new(1), tx1).await;
    presence.go_online(aoife.clone(), ConnectionId::new(2), tx2).await;

    assert_eq!(presence.resolve_identity(ConnectionId::new(2)).await, Some(aoife));
    assert!(presence.resolve_identity(ConnectionId::new(1)).await.is_none());
}
