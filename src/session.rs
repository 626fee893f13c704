use std::collections::VecDeque;

use derive_more::IntoIterator;
use serde::{Deserialize, Serialize};

use crate::{
    dice::DiceSpec,
    notation::{ParseError, parse_dice},
    statistics::{
        roller::Roller,
        stats::{Stats, compute_stats},
    },
};

pub type Timestamp = chrono::DateTime<chrono::Utc>;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const DEFAULT_NOTATION: &str = "d6";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of rolls kept in the history; older rolls are dropped.
    pub history_limit: usize,
    /// Notation the session starts with.
    pub initial_notation: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            initial_notation: DEFAULT_NOTATION.to_string(),
        }
    }
}

/// The dice currently selected, with the text they were parsed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedDice {
    pub raw: String,
    pub spec: DiceSpec,
    pub stats: Stats,
}

impl SelectedDice {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let spec = parse_dice(raw)?;
        let stats = compute_stats(&spec);
        Ok(Self {
            raw: raw.to_string(),
            spec,
            stats,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollRecord {
    /// Notation as the user typed it.
    pub raw: String,
    pub spec: DiceSpec,
    pub outcome: i64,
    pub individual_rolls: Vec<u32>,
    /// Chance of rolling exactly `outcome` with `spec`.
    pub probability: f64,
    pub rolled_at: Timestamp,
}

impl RollRecord {
    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        write!(f, "{} = {} {:?}", self.raw, self.outcome, self.individual_rolls)?;
        write!(f, " ({:.1}%)", self.probability * 100.0)
    }
}

/// Past rolls, newest first, capped at a fixed length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoIterator)]
pub struct History {
    limit: usize,
    #[into_iterator(owned, ref)]
    rolls: VecDeque<RollRecord>,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            rolls: VecDeque::with_capacity(limit),
        }
    }

    pub fn push(&mut self, record: RollRecord) {
        self.rolls.push_front(record);
        self.rolls.truncate(self.limit);
    }

    pub fn get(&self, index: usize) -> Option<&RollRecord> {
        self.rolls.get(index)
    }

    pub fn latest(&self) -> Option<&RollRecord> {
        self.rolls.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RollRecord> {
        self.rolls.iter()
    }

    pub fn len(&self) -> usize {
        self.rolls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rolls.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.rolls.clear();
    }
}

/// Everything an interactive front end needs to show: the text being edited,
/// the dice it last parsed to, the error if the text is currently invalid,
/// and the roll history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub raw: String,
    pub error: Option<ParseError>,
    pub dice: Option<SelectedDice>,
    pub history: History,
}

impl Session {
    pub fn new(config: &SessionConfig) -> Self {
        let mut session = Self {
            raw: String::new(),
            error: None,
            dice: None,
            history: History::new(config.history_limit),
        };
        if let Err(e) = session.update_dice(&config.initial_notation) {
            log::warn!(
                "Initial notation {:?} is invalid: {}",
                config.initial_notation,
                e
            );
        }
        session
    }

    /// Replaces the text being edited.
    ///
    /// Valid text replaces the selected dice. Invalid text is kept together
    /// with its error, and the previously selected dice stay as they were.
    pub fn update_dice(&mut self, text: &str) -> Result<&SelectedDice, ParseError> {
        self.raw = text.to_string();
        match SelectedDice::parse(text) {
            Ok(dice) => {
                self.error = None;
                Ok(self.dice.insert(dice))
            }
            Err(e) => {
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Rolls the selected dice and records the result.
    ///
    /// Returns `None` without rolling while the current text is invalid.
    pub fn roll(&mut self, roller: &mut Roller) -> anyhow::Result<Option<&RollRecord>> {
        if let Some(error) = &self.error {
            log::warn!("Not rolling {:?}: {}", self.raw, error);
            return Ok(None);
        }
        let Some(dice) = &self.dice else {
            return Ok(None);
        };

        let result = dice.spec.roll(roller)?;
        let record = RollRecord {
            raw: dice.raw.clone(),
            spec: dice.spec,
            outcome: result.total,
            probability: dice.stats.probability(result.total),
            individual_rolls: result.individual_rolls,
            rolled_at: chrono::Utc::now(),
        };
        log::debug!("{} -> {}", record.raw, record.outcome);

        self.history.push(record);
        Ok(self.history.latest())
    }

    /// Selects the dice of a past roll again.
    pub fn reselect(&mut self, index: usize) -> Option<Result<&SelectedDice, ParseError>> {
        let raw = self.history.get(index)?.raw.clone();
        Some(self.update_dice(&raw))
    }

    pub fn latest(&self) -> Option<&RollRecord> {
        self.history.latest()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
