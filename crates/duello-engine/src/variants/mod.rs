//! The four duel variants.

mod confession;
mod hot_potato;
mod showdown;
mod tap_race;

pub use confession::Confession;
pub use hot_potato::HotPotato;
pub use showdown::Showdown;
pub use tap_race::TapRace;

use duello_protocol::DuelKind;

use crate::DuelLogic;

/// Builds a fresh state machine for the given kind.
pub fn build_logic(kind: DuelKind) -> Box<dyn DuelLogic> {
    match kind {
        DuelKind::Showdown => Box::new(Showdown::new()),
        DuelKind::HotPotato => Box::new(HotPotato::new()),
        DuelKind::TapRace => Box::new(TapRace::new()),
        DuelKind::Confession => Box::new(Confession::new()),
    }
}
