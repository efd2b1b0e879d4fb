//! Tap race: most taps inside the play window wins.
//!
//! One timer covers the whole game: countdown plus play window, armed
//! at accept. The countdown is a display affordance only; taps count
//! from the moment of acceptance. Taps arriving implausibly fast from
//! one player are dropped. Equal counts at the bell — including
//! zero-zero — are a draw.

use duello_protocol::{DuelKind, ResultDetail, ServerEvent, StartInfo};
use tokio::time::Instant;

use crate::{DuelContext, DuelError, DuelLogic, Move, Outcome, Recipient, Seat, Step};

/// State machine for one tap race session.
#[derive(Debug, Default)]
pub struct TapRace {
    count_a: u32,
    count_b: u32,
    last_tap_a: Option<Instant>,
    last_tap_b: Option<Instant>,
}

impl TapRace {
    pub fn new() -> Self {
        Self::default()
    }

    fn detail(&self) -> ResultDetail {
        ResultDetail::TapRace {
            count_a: self.count_a,
            count_b: self.count_b,
        }
    }
}

impl DuelLogic for TapRace {
    fn kind(&self) -> DuelKind {
        DuelKind::TapRace
    }

    fn on_accept(&mut self, ctx: &DuelContext, _now: Instant) -> (StartInfo, Step) {
        let info = StartInfo::TapRace {
            countdown_secs: ctx.config.tap_countdown.as_secs(),
            duration_secs: ctx.config.tap_window.as_secs(),
        };
        let total = ctx.config.tap_countdown + ctx.config.tap_window;
        (info, Step::none().arm(total))
    }

    fn on_move(
        &mut self,
        seat: Seat,
        mv: Move,
        ctx: &DuelContext,
        now: Instant,
    ) -> Result<Step, DuelError> {
        let Move::Tap = mv else {
            return Err(DuelError::InvalidMove("that's not a tap race move".into()));
        };

        let last = match seat {
            Seat::A => &mut self.last_tap_a,
            Seat::B => &mut self.last_tap_b,
        };
        if let Some(prev) = *last {
            if now.duration_since(prev) < ctx.config.min_tap_interval {
                return Ok(Step::none());
            }
        }
        *last = Some(now);

        match seat {
            Seat::A => self.count_a += 1,
            Seat::B => self.count_b += 1,
        }

        Ok(Step::none().emit(
            Recipient::Both,
            ServerEvent::TapUpdate {
                game_id: ctx.id.clone(),
                count_a: self.count_a,
                count_b: self.count_b,
            },
        ))
    }

    fn on_timeout(&mut self, _ctx: &DuelContext) -> Step {
        let outcome = if self.count_a > self.count_b {
            Outcome::Win {
                winner: Seat::A,
                detail: self.detail(),
            }
        } else if self.count_b > self.count_a {
            Outcome::Win {
                winner: Seat::B,
                detail: self.detail(),
            }
        } else {
            Outcome::Draw {
                detail: self.detail(),
            }
        };
        Step::none().finish(outcome)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use duello_protocol::{GameId, Identity};
    use crate::{DuelConfig, Participants};

    fn ctx() -> DuelContext {
        DuelContext {
            id: GameId::new("test0003"),
            players: Participants {
                a: Identity::new("a"),
                b: Identity::new("b"),
            },
            config: DuelConfig::default(),
        }
    }

    /// Accepts the game and returns an instant shortly after.
    fn start(game: &mut TapRace, ctx: &DuelContext) -> Instant {
        let t0 = Instant::now();
        game.on_accept(ctx, t0);
        t0 + Duration::from_millis(100)
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_arms_full_game_timer() {
        let ctx = ctx();
        let mut game = TapRace::new();
        let (info, step) = game.on_accept(&ctx, Instant::now());

        assert!(matches!(
            info,
            StartInfo::TapRace {
                countdown_secs: 3,
                duration_secs: 10,
            }
        ));
        assert_eq!(step.arm, Some(Duration::from_secs(13)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tap_increments_and_broadcasts_counts() {
        let ctx = ctx();
        let mut game = TapRace::new();
        let t = start(&mut game, &ctx);

        let step = game.on_move(Seat::A, Move::Tap, &ctx, t).unwrap();
        match &step.events[..] {
            [emit] => {
                assert_eq!(emit.to, Recipient::Both);
                assert!(matches!(
                    emit.event,
                    ServerEvent::TapUpdate {
                        count_a: 1,
                        count_b: 0,
                        ..
                    }
                ));
            }
            other => panic!("expected one event, got {}", other.len()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_taps_during_countdown_still_count() {
        // The countdown is purely a client display; an eager thumb is
        // legal from the moment of acceptance.
        let ctx = ctx();
        let mut game = TapRace::new();
        let t0 = Instant::now();
        game.on_accept(&ctx, t0);

        let step = game
            .on_move(Seat::A, Move::Tap, &ctx, t0 + Duration::from_secs(1))
            .unwrap();
        assert_eq!(step.events.len(), 1);
        assert_eq!(game.count_a, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_taps_are_dropped() {
        let ctx = ctx();
        let mut game = TapRace::new();
        let t = start(&mut game, &ctx);

        game.on_move(Seat::A, Move::Tap, &ctx, t).unwrap();
        // 10ms later: too fast, dropped.
        let step = game
            .on_move(Seat::A, Move::Tap, &ctx, t + Duration::from_millis(10))
            .unwrap();
        assert!(step.events.is_empty());
        assert_eq!(game.count_a, 1);

        // The limit is per player; B's tap at the same moment lands.
        let step = game
            .on_move(Seat::B, Move::Tap, &ctx, t + Duration::from_millis(10))
            .unwrap();
        assert_eq!(step.events.len(), 1);
        assert_eq!(game.count_b, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_higher_count_wins() {
        let ctx = ctx();
        let mut game = TapRace::new();
        let t = start(&mut game, &ctx);

        let gap = ctx.config.min_tap_interval + Duration::from_millis(10);
        for n in 0..3 {
            game.on_move(Seat::A, Move::Tap, &ctx, t + gap * n).unwrap();
        }
        game.on_move(Seat::B, Move::Tap, &ctx, t).unwrap();

        let step = game.on_timeout(&ctx);
        match step.outcome.unwrap() {
            Outcome::Win { winner, detail } => {
                assert_eq!(winner, Seat::A);
                assert_eq!(
                    detail,
                    ResultDetail::TapRace {
                        count_a: 3,
                        count_b: 1,
                    }
                );
            }
            other => panic!("expected win, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_equal_counts_draw() {
        let ctx = ctx();
        let mut game = TapRace::new();
        let t = start(&mut game, &ctx);

        game.on_move(Seat::A, Move::Tap, &ctx, t).unwrap();
        game.on_move(Seat::B, Move::Tap, &ctx, t).unwrap();

        let step = game.on_timeout(&ctx);
        assert!(matches!(step.outcome, Some(Outcome::Draw { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_zero_zero_is_draw() {
        let ctx = ctx();
        let mut game = TapRace::new();
        start(&mut game, &ctx);

        let step = game.on_timeout(&ctx);
        match step.outcome.unwrap() {
            Outcome::Draw { detail } => {
                assert_eq!(
                    detail,
                    ResultDetail::TapRace {
                        count_a: 0,
                        count_b: 0,
                    }
                );
            }
            other => panic!("expected draw, got {other:?}"),
        }
    }
}
