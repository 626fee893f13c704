pub mod dice;
pub mod notation;
pub mod render;
pub mod session;
pub mod statistics;

pub mod prelude {
    pub use crate::{
        dice::{DiceMode, DiceSpec, RollResult},
        notation::{Expected, ParseError, parse_dice},
        render::{histogram, history_table, label_color, percentage},
        session::{History, RollRecord, SelectedDice, Session, SessionConfig},
        statistics::{
            distribution::Distribution,
            roller::Roller,
            stats::{Stats, compute_stats},
        },
    };
}
