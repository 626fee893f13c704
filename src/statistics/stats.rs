use serde::{Deserialize, Serialize};

use crate::{dice::DiceSpec, statistics::distribution::Distribution};

/// Exact outcome statistics for one [`DiceSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub lower_bound: i64,
    pub upper_bound: i64,
    pub distribution: Distribution,
}

impl Stats {
    pub fn probability(&self, outcome: i64) -> f64 {
        self.distribution.probability(outcome)
    }

    pub fn mean(&self) -> f64 {
        self.distribution.mean()
    }

    pub fn std_dev(&self) -> f64 {
        self.distribution.std_dev()
    }
}

/// Computes the distribution of totals by convolving one die with itself
/// `num_dice - 1` times and shifting the result by the offset.
///
/// Expects `die >= 1`; the notation parser never produces anything else.
pub fn compute_stats(spec: &DiceSpec) -> Stats {
    let one_die = Distribution::uniform(spec.die);
    let mut distribution = one_die.clone();
    for _ in 1..spec.num_dice {
        distribution = distribution.convolve(&one_die);
    }
    let distribution = distribution.shift(i64::from(spec.offset));

    log::debug!(
        "Computed {} outcomes for {}",
        distribution.len(),
        spec
    );

    Stats {
        lower_bound: spec.lower_bound(),
        upper_bound: spec.upper_bound(),
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use statrs::assert_almost_eq;

    use super::*;
    use crate::{dice::DiceMode, notation::parse_dice};

    fn spec(num_dice: u32, die: u32, offset: i32) -> DiceSpec {
        DiceSpec {
            num_dice,
            mode: DiceMode::Standard,
            die,
            offset,
        }
    }

    #[test]
    fn test_single_die_is_uniform() {
        let stats = compute_stats(&spec(1, 6, 0));
        assert_eq!(stats.lower_bound, 1);
        assert_eq!(stats.upper_bound, 6);
        assert_eq!(stats.distribution.len(), 6);
        for outcome in 1..=6 {
            assert_almost_eq!(stats.probability(outcome), 1.0 / 6.0, 1e-9);
        }
    }

    #[test]
    fn test_two_dice() {
        let stats = compute_stats(&spec(2, 6, 0));
        assert_eq!(stats.distribution.most_likely(), Some(7));
        assert_almost_eq!(stats.probability(7), 6.0 / 36.0, 1e-9);
        assert_almost_eq!(stats.probability(2), 1.0 / 36.0, 1e-9);
        assert_almost_eq!(stats.probability(12), 1.0 / 36.0, 1e-9);
        let highest = stats.distribution.highest_probability();
        assert_almost_eq!(highest, stats.probability(7), 1e-12);
    }

    #[test]
    fn test_sums_to_one_and_respects_bounds() {
        for notation in ["d6", "3d6+7", "1u20-3", "4d4", "10d10-50", "2d100", "d1", "5d1+2"] {
            let spec = parse_dice(notation).unwrap();
            let stats = compute_stats(&spec);
            assert_almost_eq!(stats.distribution.total(), 1.0, 1e-9);

            let expected_len = spec.num_dice as usize * (spec.die as usize - 1) + 1;
            assert_eq!(stats.distribution.len(), expected_len, "{notation}");

            for outcome in stats.distribution.outcomes() {
                assert!(
                    (stats.lower_bound..=stats.upper_bound).contains(&outcome),
                    "{notation}: {outcome} out of bounds"
                );
            }
            assert!(stats.probability(stats.lower_bound) > 0.0, "{notation}");
            assert!(stats.probability(stats.upper_bound) > 0.0, "{notation}");
            assert_eq!(stats.distribution.min(), Some(stats.lower_bound));
            assert_eq!(stats.distribution.max(), Some(stats.upper_bound));
        }
    }

    #[test]
    fn test_offset_shifts_outcomes() {
        let base = compute_stats(&spec(3, 8, 0));
        for offset in [-20, -1, 5, 100] {
            let shifted = compute_stats(&spec(3, 8, offset));
            assert_eq!(shifted.distribution.len(), base.distribution.len());
            for ((a, pa), (b, pb)) in base.distribution.iter().zip(shifted.distribution.iter()) {
                assert_eq!(a + i64::from(offset), b);
                assert_eq!(pa, pb);
            }
        }
    }

    #[test]
    fn test_mode_does_not_change_stats() {
        let standard = compute_stats(&parse_dice("3d6+1").unwrap());
        let unique = compute_stats(&parse_dice("3u6+1").unwrap());
        assert_eq!(standard, unique);
    }

    #[test]
    fn test_idempotent() {
        let spec = spec(4, 12, -3);
        assert_eq!(compute_stats(&spec), compute_stats(&spec));
    }

    #[test]
    fn test_mean() {
        let stats = compute_stats(&spec(3, 6, 7));
        assert_almost_eq!(stats.mean(), 17.5, 1e-9);
        assert_almost_eq!(stats.std_dev(), (3.0 * 35.0_f64 / 12.0).sqrt(), 1e-9);
    }
}
