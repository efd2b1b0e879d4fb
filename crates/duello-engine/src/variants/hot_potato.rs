//! Hot potato: pass the bomb before a secret fuse runs out.
//!
//! The challenger holds first. The fuse length is sampled once at
//! accept time and never rescheduled or extended — passing the bomb
//! changes who is holding it, not when it goes off. Whoever holds it
//! when the fuse fires loses.
//!
//! A short cooldown between passes keeps the game physical: you have
//! to actually sit with the bomb for a beat before handing it back.

use std::time::Duration;

use duello_protocol::{DuelKind, ResultDetail, ServerEvent, StartInfo};
use rand::Rng;
use tokio::time::Instant;

use crate::{DuelContext, DuelError, DuelLogic, Move, Outcome, Recipient, Seat, Step};

/// State machine for one hot potato session.
#[derive(Debug)]
pub struct HotPotato {
    holder: Seat,
    last_pass: Option<Instant>,
}

impl HotPotato {
    pub fn new() -> Self {
        Self {
            holder: Seat::A,
            last_pass: None,
        }
    }
}

impl Default for HotPotato {
    fn default() -> Self {
        Self::new()
    }
}

impl DuelLogic for HotPotato {
    fn kind(&self) -> DuelKind {
        DuelKind::HotPotato
    }

    fn on_accept(&mut self, ctx: &DuelContext, now: Instant) -> (StartInfo, Step) {
        let fuse = rand::rng().random_range(
            ctx.config.fuse_min.as_secs_f64()..=ctx.config.fuse_max.as_secs_f64(),
        );
        let fuse = Duration::from_secs_f64(fuse);
        tracing::debug!(id = %ctx.id, fuse_secs = fuse.as_secs_f64(), "fuse lit");

        // The cooldown clock starts at accept: the challenger has to
        // hold the bomb for a beat too, not fire it off instantly.
        self.last_pass = Some(now);

        let info = StartInfo::HotPotato {
            holder: ctx.players.a.clone(),
        };
        (info, Step::none().arm(fuse))
    }

    fn on_move(
        &mut self,
        seat: Seat,
        mv: Move,
        ctx: &DuelContext,
        now: Instant,
    ) -> Result<Step, DuelError> {
        let Move::Pass = mv else {
            return Err(DuelError::InvalidMove("that's not a hot potato move".into()));
        };
        if seat != self.holder {
            return Err(DuelError::InvalidMove("you're not holding it".into()));
        }
        if let Some(last) = self.last_pass {
            if now.duration_since(last) < ctx.config.pass_cooldown {
                // Too soon; drop the pass without comment.
                return Ok(Step::none());
            }
        }

        self.holder = seat.other();
        self.last_pass = Some(now);
        let holder = ctx.players.get(self.holder).clone();
        Ok(Step::none().emit(
            Recipient::Both,
            ServerEvent::Passed {
                game_id: ctx.id.clone(),
                holder,
            },
        ))
    }

    fn on_timeout(&mut self, ctx: &DuelContext) -> Step {
        let detail = ResultDetail::HotPotato {
            holder: ctx.players.get(self.holder).clone(),
        };
        Step::none().finish(Outcome::Win {
            winner: self.holder.other(),
            detail,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
