//! Showdown: rock-paper-scissors with a fixed move window.
//!
//! Both players have the full window to lock in a choice, and may
//! change it freely until the other side has also chosen — the session
//! resolves the instant the second choice lands. At timeout, the side
//! that chose beats the side that didn't; if neither chose, there is
//! nothing to judge and the session is cancelled.

use duello_protocol::{Choice, DuelKind, ResultDetail, StartInfo};
use tokio::time::Instant;

use crate::{DuelContext, DuelError, DuelLogic, Move, Outcome, Seat, Step};

/// Whether `x` beats `y` in rock-paper-scissors.
fn beats(x: Choice, y: Choice) -> bool {
    matches!(
        (x, y),
        (Choice::Rock, Choice::Scissors)
            | (Choice::Paper, Choice::Rock)
            | (Choice::Scissors, Choice::Paper)
    )
}

/// State machine for one showdown session.
#[derive(Debug, Default)]
pub struct Showdown {
    choice_a: Option<Choice>,
    choice_b: Option<Choice>,
}

impl Showdown {
    pub fn new() -> Self {
        Self::default()
    }

    fn detail(&self) -> ResultDetail {
        ResultDetail::Showdown {
            choice_a: self.choice_a,
            choice_b: self.choice_b,
        }
    }

    fn judge(&self, a: Choice, b: Choice) -> Outcome {
        if a == b {
            Outcome::Draw {
                detail: self.detail(),
            }
        } else if beats(a, b) {
            Outcome::Win {
                winner: Seat::A,
                detail: self.detail(),
            }
        } else {
            Outcome::Win {
                winner: Seat::B,
                detail: self.detail(),
            }
        }
    }
}

impl DuelLogic for Showdown {
    fn kind(&self) -> DuelKind {
        DuelKind::Showdown
    }

    fn on_accept(&mut self, ctx: &DuelContext, _now: Instant) -> (StartInfo, Step) {
        let info = StartInfo::Showdown {
            window_secs: ctx.config.showdown_window.as_secs(),
        };
        (info, Step::none().arm(ctx.config.showdown_window))
    }

    fn on_move(
        &mut self,
        seat: Seat,
        mv: Move,
        _ctx: &DuelContext,
        _now: Instant,
    ) -> Result<Step, DuelError> {
        let Move::Choice(choice) = mv else {
            return Err(DuelError::InvalidMove("that's not a showdown move".into()));
        };

        match seat {
            Seat::A => self.choice_a = Some(choice),
            Seat::B => self.choice_b = Some(choice),
        }

        match (self.choice_a, self.choice_b) {
            (Some(a), Some(b)) => Ok(Step::none().finish(self.judge(a, b))),
            _ => Ok(Step::none()),
        }
    }

    fn on_timeout(&mut self, _ctx: &DuelContext) -> Step {
        let outcome = match (self.choice_a, self.choice_b) {
            // A lone mover wins by forfeit.
            (Some(_), None) => Outcome::Win {
                winner: Seat::A,
                detail: self.detail(),
            },
            (None, Some(_)) => Outcome::Win {
                winner: Seat::B,
                detail: self.detail(),
            },
            // Nobody played: no legitimate outcome.
            _ => Outcome::Cancelled {
                detail: self.detail(),
            },
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
    use duello_protocol::{GameId, Identity};
    use crate::{DuelConfig, Participants};

    fn ctx() -> DuelContext {
        DuelContext {
            id: GameId::new("test0001"),
            players: Participants {
                a: Identity::new("a"),
                b: Identity::new("b"),
            },
            config: DuelConfig::default(),
        }
    }

    fn win_seat(outcome: &Outcome) -> Option<Seat> {
        match outcome {
            Outcome::Win { winner, .. } => Some(*winner),
            _ => None,
        }
    }

    #[test]
    fn test_beats_is_exhaustive_and_asymmetric() {
        use Choice::*;
        for x in [Rock, Paper, Scissors] {
            for y in [Rock, Paper, Scissors] {
                if x == y {
                    assert!(!beats(x, y));
                } else {
                    // Exactly one direction wins.
                    assert_ne!(beats(x, y), beats(y, x), "{x:?} vs {y:?}");
                }
            }
        }
        assert!(beats(Rock, Scissors));
        assert!(beats(Paper, Rock));
        assert!(beats(Scissors, Paper));
    }

    #[test]
    fn test_second_choice_resolves_immediately() {
        let ctx = ctx();
        let mut game = Showdown::new();
        let now = Instant::now();

        let step = game
            .on_move(Seat::A, Move::Choice(Choice::Rock), &ctx, now)
            .unwrap();
        assert!(step.outcome.is_none());

        let step = game
            .on_move(Seat::B, Move::Choice(Choice::Scissors), &ctx, now)
            .unwrap();
        assert_eq!(win_seat(step.outcome.as_ref().unwrap()), Some(Seat::A));
    }

    #[test]
    fn test_equal_choices_draw() {
        let ctx = ctx();
        let mut game = Showdown::new();
        let now = Instant::now();

        game.on_move(Seat::A, Move::Choice(Choice::Paper), &ctx, now)
            .unwrap();
        let step = game
            .on_move(Seat::B, Move::Choice(Choice::Paper), &ctx, now)
            .unwrap();
        assert!(matches!(step.outcome, Some(Outcome::Draw { .. })));
    }

    #[test]
    fn test_choice_can_change_until_opponent_moves() {
        let ctx = ctx();
        let mut game = Showdown::new();
        let now = Instant::now();

        game.on_move(Seat::A, Move::Choice(Choice::Rock), &ctx, now)
            .unwrap();
        game.on_move(Seat::A, Move::Choice(Choice::Scissors), &ctx, now)
            .unwrap();
        let step = game
            .on_move(Seat::B, Move::Choice(Choice::Rock), &ctx, now)
            .unwrap();

        // A's final answer was scissors, so B's rock wins.
        assert_eq!(win_seat(step.outcome.as_ref().unwrap()), Some(Seat::B));
    }

    #[test]
    fn test_timeout_with_one_mover_is_forfeit_win() {
        let ctx = ctx();
        let mut game = Showdown::new();
        game.on_move(Seat::B, Move::Choice(Choice::Rock), &ctx, Instant::now())
            .unwrap();

        let step = game.on_timeout(&ctx);
        assert_eq!(win_seat(step.outcome.as_ref().unwrap()), Some(Seat::B));
    }

    #[test]
    fn test_timeout_with_no_movers_is_cancelled() {
        let ctx = ctx();
        let mut game = Showdown::new();
        let step = game.on_timeout(&ctx);
        match step.outcome.unwrap() {
            Outcome::Cancelled { detail } => {
                assert_eq!(
                    detail,
                    ResultDetail::Showdown {
                        choice_a: None,
                        choice_b: None,
                    }
                );
            }
            other => panic!("expected cancelled, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_move_kind_is_rejected() {
        let ctx = ctx();
        let mut game = Showdown::new();
        let result = game.on_move(Seat::A, Move::Tap, &ctx, Instant::now());
        assert!(matches!(result, Err(DuelError::InvalidMove(_))));
    }

    #[test]
    fn test_accept_arms_window_timer() {
        let ctx = ctx();
        let mut game = Showdown::new();
        let (info, step) = game.on_accept(&ctx, Instant::now());
        assert!(matches!(info, StartInfo::Showdown { window_secs: 30 }));
        assert_eq!(step.arm, Some(ctx.config.showdown_window));
    }
}
