//! The per-session actor.
//!
//! Every duel session runs as its own task, owning its state machine
//! outright. Moves, responses, and timer expirations all arrive as
//! [`DuelCommand`]s on the session's channel, so within one session
//! everything is serialized: a move and a timeout can race on the
//! wire, but one of them is handled first and the other sees its
//! effect. The first terminal outcome ends the task, which is what
//! makes "resolve exactly once" structural rather than a flag to
//! remember to check.
//!
//! Timer expirations carry the epoch they were armed under. Arming a
//! new phase timer bumps the epoch, so a stale expiration from an
//! earlier phase is recognized and dropped without the variant logic
//! ever seeing it.

use std::sync::Arc;

use duello_presence::Fabric;
use duello_protocol::{DuelKind, GameId, Identity, ServerEvent, Verdict};
use duello_timer::TimerHandle;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::{
    ActivityRecord, Directory, DuelConfig, DuelContext, DuelLogic, Move, Outcome, Participants,
    Recipient, Seat, Step,
};

/// Commands a session actor understands.
#[derive(Debug)]
pub enum DuelCommand {
    /// Accept or decline, pre-start. A decline from either participant
    /// cancels the session.
    Respond { from: Identity, accepted: bool },
    /// An in-game move.
    Move { from: Identity, mv: Move },
    /// An armed timer fired. Stale epochs are dropped.
    Timeout { epoch: u64 },
    /// Server shutdown; exit without resolving.
    Shutdown,
}

/// Handle to a running session actor.
#[derive(Debug, Clone)]
pub struct DuelHandle {
    pub id: GameId,
    pub kind: DuelKind,
    sender: mpsc::UnboundedSender<DuelCommand>,
}

impl DuelHandle {
    /// Sends a command. Returns `false` if the session already ended.
    pub fn send(&self, command: DuelCommand) -> bool {
        self.sender.send(command).is_ok()
    }

    /// Whether the session's actor has exited.
    pub fn is_finished(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Spawns a session actor in the pending (unanswered challenge) state.
pub fn spawn_duel(
    id: GameId,
    stakes: String,
    players: Participants,
    logic: Box<dyn DuelLogic>,
    fabric: Fabric,
    directory: Arc<dyn Directory>,
    config: DuelConfig,
) -> DuelHandle {
    let (sender, receiver) = mpsc::unbounded_channel();
    let kind = logic.kind();

    let actor = DuelActor {
        ctx: DuelContext {
            id: id.clone(),
            players,
            config,
        },
        kind,
        stakes,
        logic,
        fabric,
        directory,
        epoch: 0,
        accepted: false,
        timer: None,
        self_sender: sender.clone(),
    };
    tokio::spawn(actor.run(receiver));

    DuelHandle { id, kind, sender }
}

struct DuelActor {
    ctx: DuelContext,
    kind: DuelKind,
    stakes: String,
    logic: Box<dyn DuelLogic>,
    fabric: Fabric,
    directory: Arc<dyn Directory>,
    epoch: u64,
    accepted: bool,
    timer: Option<TimerHandle>,
    self_sender: mpsc::UnboundedSender<DuelCommand>,
}

impl DuelActor {
    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<DuelCommand>) {
        tracing::debug!(id = %self.ctx.id, kind = %self.kind, "duel pending");
        // A challenge nobody answers is eventually swept away.
        self.arm(self.ctx.config.pending_max_age);

        while let Some(command) = receiver.recv().await {
            let done = match command {
                DuelCommand::Respond { from, accepted } => {
                    self.handle_respond(from, accepted).await
                }
                DuelCommand::Move { from, mv } => self.handle_move(from, mv).await,
                DuelCommand::Timeout { epoch } => self.handle_timeout(epoch).await,
                DuelCommand::Shutdown => {
                    tracing::debug!(id = %self.ctx.id, "duel shut down");
                    true
                }
            };
            if done {
                break;
            }
        }

        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    async fn handle_respond(&mut self, from: Identity, accepted: bool) -> bool {
        let Some(seat) = self.ctx.players.seat_of(&from) else {
            return false; // not your duel
        };
        if self.accepted {
            return false; // play already started
        }

        if !accepted {
            // Either side may walk away before the start; the other
            // side is told who did.
            let other = self.ctx.players.get(seat.other()).clone();
            self.fabric
                .send(
                    &other,
                    ServerEvent::Declined {
                        game_id: self.ctx.id.clone(),
                        kind: self.kind,
                        by: from.clone(),
                    },
                )
                .await;
            tracing::info!(id = %self.ctx.id, by = %from, "duel declined");
            return true;
        }

        if seat != Seat::B {
            return false; // challengers can't accept their own duel
        }

        self.accepted = true;
        let (info, step) = self.logic.on_accept(&self.ctx, Instant::now());
        self.broadcast(ServerEvent::Start {
            game_id: self.ctx.id.clone(),
            participant_a: self.ctx.players.a.clone(),
            participant_b: self.ctx.players.b.clone(),
            stakes: self.stakes.clone(),
            info,
        })
        .await;
        tracing::info!(id = %self.ctx.id, kind = %self.kind, "duel started");
        self.apply(step).await
    }

    async fn handle_move(&mut self, from: Identity, mv: Move) -> bool {
        let Some(seat) = self.ctx.players.seat_of(&from) else {
            // Uninvolved parties learn nothing, not even that the
            // session exists.
            return false;
        };
        if !self.accepted {
            return false;
        }

        match self.logic.on_move(seat, mv, &self.ctx, Instant::now()) {
            Ok(step) => self.apply(step).await,
            Err(err) => {
                self.fabric
                    .send(
                        &from,
                        ServerEvent::Error {
                            message: err.to_string(),
                        },
                    )
                    .await;
                false
            }
        }
    }

    async fn handle_timeout(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch {
            tracing::trace!(id = %self.ctx.id, epoch, "stale timer dropped");
            return false;
        }
        if !self.accepted {
            // The challenge sat unanswered too long. No notification;
            // the client UI has long since moved on.
            tracing::debug!(id = %self.ctx.id, "unanswered challenge expired");
            return true;
        }
        let step = self.logic.on_timeout(&self.ctx);
        self.apply(step).await
    }

    /// Applies a step from the logic. Returns whether the session is
    /// over.
    async fn apply(&mut self, step: Step) -> bool {
        for emit in step.events {
            match emit.to {
                Recipient::A => {
                    self.fabric.send(&self.ctx.players.a, emit.event).await;
                }
                Recipient::B => {
                    self.fabric.send(&self.ctx.players.b, emit.event).await;
                }
                Recipient::Both => self.broadcast(emit.event).await,
            }
        }

        if let Some(delay) = step.arm {
            self.arm(delay);
        }

        match step.outcome {
            Some(outcome) => {
                self.finish(outcome).await;
                true
            }
            None => false,
        }
    }

    /// Arms the phase timer, invalidating any previous one.
    fn arm(&mut self, delay: std::time::Duration) {
        self.epoch += 1;
        let epoch = self.epoch;
        let sender = self.self_sender.clone();
        let handle = duello_timer::schedule(delay, async move {
            // The actor may be gone already; that's fine.
            let _ = sender.send(DuelCommand::Timeout { epoch });
        });
        if let Some(old) = self.timer.replace(handle) {
            old.cancel();
        }
    }

    async fn broadcast(&self, event: ServerEvent) {
        self.fabric.send(&self.ctx.players.a, event.clone()).await;
        self.fabric.send(&self.ctx.players.b, event).await;
    }

    /// Delivers the two personalized results and records the outcome.
    async fn finish(&mut self, outcome: Outcome) {
        let (winner, detail, cancelled) = match outcome {
            Outcome::Win { winner, detail } => (Some(winner), detail, false),
            Outcome::Draw { detail } => (None, detail, false),
            Outcome::Cancelled { detail } => (None, detail, true),
        };

        let (winner_id, loser_id) = match winner {
            Some(seat) => (
                Some(self.ctx.players.get(seat).clone()),
                Some(self.ctx.players.get(seat.other()).clone()),
            ),
            None => (None, None),
        };

        for seat in [Seat::A, Seat::B] {
            let verdict = match winner {
                Some(w) if w == seat => Verdict::Win,
                Some(_) => Verdict::Lose,
                None if cancelled => Verdict::Cancelled,
                None => Verdict::Draw,
            };
            self.fabric
                .send(
                    self.ctx.players.get(seat),
                    ServerEvent::Result {
                        game_id: self.ctx.id.clone(),
                        verdict,
                        winner: winner_id.clone(),
                        loser: loser_id.clone(),
                        stakes: self.stakes.clone(),
                        detail: detail.clone(),
                    },
                )
                .await;
        }

        tracing::info!(
            id = %self.ctx.id,
            kind = %self.kind,
            winner = winner_id.as_ref().map(|w| w.to_string()).unwrap_or_else(|| "-".into()),
            cancelled,
            "duel resolved"
        );

        self.directory.log_activity(ActivityRecord {
            game_id: self.ctx.id.clone(),
            kind: self.kind,
            participant_a: self.ctx.players.a.clone(),
            participant_b: self.ctx.players.b.clone(),
            stakes: self.stakes.clone(),
            winner: winner_id,
            cancelled,
        });
    }
}
