//! Confession: two truths and one lie.
//!
//! Two phases. In the write phase both players submit three statements
//! and mark which is the lie; in the guess phase each tries to spot the
//! other's lie. Spotting the lie when your opponent misses yours wins.
//! Both right or both wrong is a draw.
//!
//! A lone silent writer gets a placeholder slate so the game can
//! still proceed; if *neither* player writes anything the session is
//! cancelled outright. A player who never guesses is simply wrong.

use duello_protocol::{DuelKind, ResultDetail, ServerEvent, StartInfo, Statements};
use tokio::time::Instant;

use crate::{DuelContext, DuelError, DuelLogic, Move, Outcome, Recipient, Seat, Step};

/// Slate used when the write window closes without a submission.
const PLACEHOLDER: &str = "(No response)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Write,
    Guess,
}

#[derive(Debug, Clone)]
struct Slate {
    statements: Statements,
    lie_index: u8,
}

/// State machine for one confession session.
#[derive(Debug)]
pub struct Confession {
    phase: Phase,
    slate_a: Option<Slate>,
    slate_b: Option<Slate>,
    guess_a: Option<u8>,
    guess_b: Option<u8>,
}

impl Confession {
    pub fn new() -> Self {
        Self {
            phase: Phase::Write,
            slate_a: None,
            slate_b: None,
            guess_a: None,
            guess_b: None,
        }
    }

    fn slate(&self, seat: Seat) -> &Option<Slate> {
        match seat {
            Seat::A => &self.slate_a,
            Seat::B => &self.slate_b,
        }
    }

    fn placeholder() -> Slate {
        Slate {
            statements: [PLACEHOLDER.into(), PLACEHOLDER.into(), PLACEHOLDER.into()],
            lie_index: 0,
        }
    }

    /// Moves to the guess phase. Both slates must be set.
    fn begin_guessing(&mut self, ctx: &DuelContext) -> Step {
        self.phase = Phase::Guess;
        let slate_a = self.slate_a.as_ref().expect("slate_a set");
        let slate_b = self.slate_b.as_ref().expect("slate_b set");

        // Each side sees only the opponent's statements, never the
        // lie index.
        Step::none()
            .emit(
                Recipient::A,
                ServerEvent::GuessPhase {
                    game_id: ctx.id.clone(),
                    statements: slate_b.statements.clone(),
                    opponent: ctx.players.b.clone(),
                },
            )
            .emit(
                Recipient::B,
                ServerEvent::GuessPhase {
                    game_id: ctx.id.clone(),
                    statements: slate_a.statements.clone(),
                    opponent: ctx.players.a.clone(),
                },
            )
            .arm(ctx.config.guess_window)
    }

    fn resolve(&self) -> Outcome {
        let slate_a = self.slate_a.as_ref().expect("slate_a set");
        let slate_b = self.slate_b.as_ref().expect("slate_b set");

        // An unset guess is simply wrong.
        let a_correct = self.guess_a == Some(slate_b.lie_index);
        let b_correct = self.guess_b == Some(slate_a.lie_index);

        let detail = ResultDetail::Confession {
            statements_a: Some(slate_a.statements.clone()),
            statements_b: Some(slate_b.statements.clone()),
            lie_index_a: Some(slate_a.lie_index),
            lie_index_b: Some(slate_b.lie_index),
            guess_a: self.guess_a,
            guess_b: self.guess_b,
            a_correct,
            b_correct,
        };

        match (a_correct, b_correct) {
            (true, false) => Outcome::Win {
                winner: Seat::A,
                detail,
            },
            (false, true) => Outcome::Win {
                winner: Seat::B,
                detail,
            },
            _ => Outcome::Draw { detail },
        }
    }
}

impl Default for Confession {
    fn default() -> Self {
        Self::new()
    }
}

/// Trims and caps one statement. Returns `None` if nothing is left.
fn clean_statement(raw: &str, max_len: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_len).collect())
}

impl DuelLogic for Confession {
    fn kind(&self) -> DuelKind {
        DuelKind::Confession
    }

    fn on_accept(&mut self, ctx: &DuelContext, _now: Instant) -> (StartInfo, Step) {
        let info = StartInfo::Confession {
            write_secs: ctx.config.write_window.as_secs(),
        };
        (info, Step::none().arm(ctx.config.write_window))
    }

    fn on_move(
        &mut self,
        seat: Seat,
        mv: Move,
        ctx: &DuelContext,
        _now: Instant,
    ) -> Result<Step, DuelError> {
        match (self.phase, mv) {
            (Phase::Write, Move::Submit {
                statements,
                lie_index,
            }) => {
                if lie_index > 2 {
                    return Err(DuelError::InvalidMove("the lie must be one of the three".into()));
                }
                if self.slate(seat).is_some() {
                    // Already locked in; a resubmit changes nothing.
                    return Ok(Step::none());
                }

                let mut cleaned: Statements = Default::default();
                for (slot, raw) in cleaned.iter_mut().zip(&statements) {
                    match clean_statement(raw, ctx.config.statement_max_len) {
                        Some(s) => *slot = s,
                        None => {
                            return Err(DuelError::InvalidMove(
                                "all three statements are required".into(),
                            ));
                        }
                    }
                }

                let slate = Slate {
                    statements: cleaned,
                    lie_index,
                };
                match seat {
                    Seat::A => self.slate_a = Some(slate),
                    Seat::B => self.slate_b = Some(slate),
                }

                if self.slate_a.is_some() && self.slate_b.is_some() {
                    Ok(self.begin_guessing(ctx))
                } else {
                    Ok(Step::none().emit(
                        match seat {
                            Seat::A => Recipient::A,
                            Seat::B => Recipient::B,
                        },
                        ServerEvent::Waiting {
                            game_id: ctx.id.clone(),
                        },
                    ))
                }
            }

            (Phase::Guess, Move::Guess { guess }) => {
                if guess > 2 {
                    return Err(DuelError::InvalidMove("guess one of the three".into()));
                }
                match seat {
                    Seat::A => self.guess_a = Some(guess),
                    Seat::B => self.guess_b = Some(guess),
                }

                if self.guess_a.is_some() && self.guess_b.is_some() {
                    Ok(Step::none().finish(self.resolve()))
                } else {
                    Ok(Step::none().emit(
                        match seat {
                            Seat::A => Recipient::A,
                            Seat::B => Recipient::B,
                        },
                        ServerEvent::Waiting {
                            game_id: ctx.id.clone(),
                        },
                    ))
                }
            }

            (Phase::Write, Move::Guess { .. }) => {
                Err(DuelError::InvalidMove("still in the writing phase".into()))
            }
            (Phase::Guess, Move::Submit { .. }) => {
                Err(DuelError::InvalidMove("writing is over".into()))
            }
            _ => Err(DuelError::InvalidMove("that's not a confession move".into())),
        }
    }

    fn on_timeout(&mut self, ctx: &DuelContext) -> Step {
        match self.phase {
            Phase::Write => {
                // Neither wrote anything: nothing to guess at, no
                // legitimate outcome.
                if self.slate_a.is_none() && self.slate_b.is_none() {
                    return Step::none().finish(Outcome::Cancelled {
                        detail: ResultDetail::Confession {
                            statements_a: None,
                            statements_b: None,
                            lie_index_a: None,
                            lie_index_b: None,
                            guess_a: None,
                            guess_b: None,
                            a_correct: false,
                            b_correct: false,
                        },
                    });
                }
                // One silent writer gets the placeholder slate, and
                // the game goes on.
                if self.slate_a.is_none() {
                    self.slate_a = Some(Self::placeholder());
                }
                if self.slate_b.is_none() {
                    self.slate_b = Some(Self::placeholder());
                }
                self.begin_guessing(ctx)
            }
            Phase::Guess => Step::none().finish(self.resolve()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
