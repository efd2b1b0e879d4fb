//! The [`DuelLogic`] trait and the types its hooks speak.
//!
//! Each duel variant is a synchronous state machine: it receives moves
//! and timeouts, and answers with a [`Step`] saying what to tell the
//! players, whether to arm a phase timer, and whether the session is
//! over. Everything async — channels, timers, delivery — lives in the
//! session actor, so variant logic stays plain-function testable.
//!
//! Variants think in [`Seat`]s, not identities: seat A is always the
//! challenger, seat B the challenged party. The surrounding
//! [`DuelContext`] carries the identity mapping for events that must
//! name a player on the wire.

use std::time::Duration;

use duello_protocol::{Choice, DuelKind, GameId, Identity, ResultDetail, ServerEvent, StartInfo, Statements};
use tokio::time::Instant;

use crate::{DuelConfig, DuelError};

/// One of the two fixed positions in a duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    /// The challenger.
    A,
    /// The challenged party.
    B,
}

impl Seat {
    /// The opposite seat.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// The two participants of a session, by seat.
#[derive(Debug, Clone)]
pub struct Participants {
    pub a: Identity,
    pub b: Identity,
}

impl Participants {
    /// The identity in the given seat.
    pub fn get(&self, seat: Seat) -> &Identity {
        match seat {
            Seat::A => &self.a,
            Seat::B => &self.b,
        }
    }

    /// Which seat an identity occupies, if either.
    pub fn seat_of(&self, identity: &Identity) -> Option<Seat> {
        if *identity == self.a {
            Some(Seat::A)
        } else if *identity == self.b {
            Some(Seat::B)
        } else {
            None
        }
    }
}

/// Immutable session facts handed to every logic hook.
#[derive(Debug, Clone)]
pub struct DuelContext {
    pub id: GameId,
    pub players: Participants,
    pub config: DuelConfig,
}

/// A decoded in-game move, already stripped of its envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Move {
    /// Showdown: lock in a choice.
    Choice(Choice),
    /// Hot potato: pass the bomb.
    Pass,
    /// Tap race: one tap.
    Tap,
    /// Confession: submit statements and the lie index.
    Submit {
        statements: Statements,
        lie_index: u8,
    },
    /// Confession: guess the opponent's lie.
    Guess { guess: u8 },
}

/// Who an emitted event goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    A,
    B,
    Both,
}

/// One event addressed to one or both participants.
#[derive(Debug, Clone)]
pub struct Emit {
    pub to: Recipient,
    pub event: ServerEvent,
}

/// How the session resolved, in seat terms. The actor translates this
/// into two personalized `result` events.
#[derive(Debug, Clone)]
pub enum Outcome {
    Win { winner: Seat, detail: ResultDetail },
    Draw { detail: ResultDetail },
    Cancelled { detail: ResultDetail },
}

/// What the actor should do after a hook runs.
///
/// Built fluently: `Step::none().emit(...).arm(...)`. A step with an
/// `outcome` is terminal; the actor delivers results and exits, so any
/// armed timer is moot.
#[derive(Debug, Default)]
pub struct Step {
    pub events: Vec<Emit>,
    pub arm: Option<Duration>,
    pub outcome: Option<Outcome>,
}

impl Step {
    /// A step that changes nothing. Silently-ignored moves return this.
    pub fn none() -> Self {
        Self::default()
    }

    /// Adds an event for the given recipient(s).
    pub fn emit(mut self, to: Recipient, event: ServerEvent) -> Self {
        self.events.push(Emit { to, event });
        self
    }

    /// Arms (or re-arms) the session's phase timer. Any previously
    /// armed timer is invalidated.
    pub fn arm(mut self, delay: Duration) -> Self {
        self.arm = Some(delay);
        self
    }

    /// Marks the session resolved.
    pub fn finish(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }
}

/// The per-variant state machine.
///
/// Hooks are only ever called from the session's own actor task, so
/// implementations are free to use plain mutable state. `now` is the
/// actor's clock; using it (rather than calling `Instant::now`
/// internally) keeps the variants honest under paused-clock tests.
///
/// `Send + Sync` because the boxed logic lives inside a spawned actor
/// future that is held across await points.
pub trait DuelLogic: Send + Sync + 'static {
    /// Which variant this is.
    fn kind(&self) -> DuelKind;

    /// Called once, when the challenged party accepts. Returns the
    /// kind-specific `start` payload and the opening step (typically
    /// just arming the first phase timer).
    fn on_accept(&mut self, ctx: &DuelContext, now: Instant) -> (StartInfo, Step);

    /// Called for every validated in-game move.
    ///
    /// `Err` is reported to the mover alone; `Ok(Step::none())` drops
    /// the move silently.
    fn on_move(
        &mut self,
        seat: Seat,
        mv: Move,
        ctx: &DuelContext,
        now: Instant,
    ) -> Result<Step, DuelError>;

    /// Called when the armed phase timer fires.
    fn on_timeout(&mut self, ctx: &DuelContext) -> Step;
}
