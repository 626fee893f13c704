use derive_more::Display;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

use crate::statistics::roller::Roller;

/// How the dice were written: `d` for ordinary dice, `u` for "unique" dice.
///
/// Unique dice are parsed and preserved but currently roll and compute
/// statistics exactly like standard dice.
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiceMode {
    #[default]
    #[display("d")]
    Standard,
    #[display("u")]
    Unique,
}

/// A parsed dice notation: roll `num_dice` dice with `die` faces each, sum
/// them and add `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceSpec {
    pub num_dice: u32,
    pub mode: DiceMode,
    pub die: u32,
    pub offset: i32,
}

impl DiceSpec {
    /// Smallest achievable total.
    pub fn lower_bound(&self) -> i64 {
        i64::from(self.num_dice) + i64::from(self.offset)
    }

    /// Largest achievable total.
    pub fn upper_bound(&self) -> i64 {
        i64::from(self.num_dice) * i64::from(self.die) + i64::from(self.offset)
    }

    pub fn roll(&self, rng: &mut Roller) -> anyhow::Result<RollResult> {
        let die = rand_distr::Uniform::new_inclusive(1, self.die)?;

        let mut individual_rolls = Vec::with_capacity(self.num_dice as usize);
        let mut total = i64::from(self.offset);
        for _ in 0..self.num_dice {
            let roll = die.sample(rng.rng());
            individual_rolls.push(roll);
            total += i64::from(roll);
        }

        Ok(RollResult {
            total,
            individual_rolls,
            roll_used: *self,
        })
    }

    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        write!(f, "{}{}{}", self.num_dice, self.mode, self.die)?;
        if self.offset > 0 {
            write!(f, "+{}", self.offset)?;
        } else if self.offset < 0 {
            write!(f, "{}", self.offset)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.pretty_print(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    pub total: i64,
    pub individual_rolls: Vec<u32>,
    pub roll_used: DiceSpec,
}

impl RollResult {
    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        write!(f, "Rolled ")?;
        self.roll_used.pretty_print(f)?;
        write!(f, ": [")?;
        for (i, roll) in self.individual_rolls.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", roll)?;
        }
        write!(f, "] = {}", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll() {
        let roll = DiceSpec {
            num_dice: 2,
            mode: DiceMode::Standard,
            die: 6,
            offset: 3,
        };
        let mut rng = Roller::test_rng();
        for _ in 0..10000 {
            let result = roll.roll(&mut rng).unwrap();
            assert!(result.total >= 5 && result.total <= 15);
            assert_eq!(result.individual_rolls.len(), 2);
            assert!(result.individual_rolls.iter().all(|r| (1..=6).contains(r)));
            let sum: u32 = result.individual_rolls.iter().sum();
            assert_eq!(result.total, i64::from(sum) + 3);
        }
    }

    #[test]
    fn test_roll_hits_both_bounds() {
        let roll = DiceSpec {
            num_dice: 1,
            mode: DiceMode::Unique,
            die: 4,
            offset: -2,
        };
        let mut rng = Roller::test_rng();
        let totals: Vec<i64> = (0..1000)
            .map(|_| roll.roll(&mut rng).unwrap().total)
            .collect();
        assert!(totals.contains(&roll.lower_bound()));
        assert!(totals.contains(&roll.upper_bound()));
    }

    #[test]
    fn test_roll_is_reproducible() {
        let roll = DiceSpec {
            num_dice: 5,
            mode: DiceMode::Standard,
            die: 20,
            offset: 0,
        };
        let a = roll.roll(&mut Roller::from_seed(7)).unwrap();
        let b = roll.roll(&mut Roller::from_seed(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_roll_zero_faces_is_an_error() {
        let roll = DiceSpec {
            num_dice: 1,
            mode: DiceMode::Standard,
            die: 0,
            offset: 0,
        };
        assert!(roll.roll(&mut Roller::test_rng()).is_err());
    }

    #[test]
    fn test_bounds() {
        let roll = DiceSpec {
            num_dice: 3,
            mode: DiceMode::Standard,
            die: 6,
            offset: 7,
        };
        assert_eq!(roll.lower_bound(), 10);
        assert_eq!(roll.upper_bound(), 25);

        let huge = DiceSpec {
            num_dice: u32::MAX,
            mode: DiceMode::Standard,
            die: 6,
            offset: i32::MAX,
        };
        assert_eq!(
            huge.upper_bound(),
            i64::from(u32::MAX) * 6 + i64::from(i32::MAX)
        );
    }

    #[test]
    fn test_pretty_print() {
        let mut buf = String::new();
        let result = RollResult {
            total: 12,
            individual_rolls: vec![3, 2],
            roll_used: DiceSpec {
                num_dice: 2,
                mode: DiceMode::Standard,
                die: 6,
                offset: 7,
            },
        };
        result.pretty_print(&mut buf).unwrap();
        assert_eq!(buf, "Rolled 2d6+7: [3, 2] = 12");
    }
}
