//! Tunable knobs for the duel engine.

use std::time::Duration;

/// Timing and limit configuration shared by all duel variants.
///
/// The defaults are the values the bar floor runs with; tests shrink
/// them freely.
#[derive(Debug, Clone)]
pub struct DuelConfig {
    /// Showdown: how long both players have to lock in a choice.
    pub showdown_window: Duration,

    /// Hot potato: shortest possible fuse.
    pub fuse_min: Duration,
    /// Hot potato: longest possible fuse. The actual fuse is sampled
    /// uniformly from `[fuse_min, fuse_max]` per session and never
    /// revealed to the players.
    pub fuse_max: Duration,
    /// Hot potato: minimum time between two passes. Stops two phones
    /// from volleying the bomb faster than anyone can react.
    pub pass_cooldown: Duration,

    /// Tap race: display-only countdown before taps start counting.
    pub tap_countdown: Duration,
    /// Tap race: length of the scoring window.
    pub tap_window: Duration,
    /// Tap race: taps arriving faster than this (per player) are
    /// dropped. Filters autoclickers, not thumbs.
    pub min_tap_interval: Duration,

    /// Confession: how long both players have to write statements.
    pub write_window: Duration,
    /// Confession: how long both players have to guess.
    pub guess_window: Duration,
    /// Confession: statements longer than this are truncated.
    pub statement_max_len: usize,

    /// How long an unanswered challenge lingers before the session is
    /// quietly discarded.
    pub pending_max_age: Duration,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            showdown_window: Duration::from_secs(30),
            fuse_min: Duration::from_secs(8),
            fuse_max: Duration::from_secs(15),
            pass_cooldown: Duration::from_millis(500),
            tap_countdown: Duration::from_secs(3),
            tap_window: Duration::from_secs(10),
            min_tap_interval: Duration::from_millis(50),
            write_window: Duration::from_secs(90),
            guess_window: Duration::from_secs(60),
            statement_max_len: 200,
            pending_max_age: Duration::from_secs(3600),
        }
    }
}
