use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Probability mass function over integer outcomes.
///
/// Outcomes iterate in ascending order. Outcomes that cannot happen are
/// simply absent.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distribution {
    probabilities: BTreeMap<i64, f64>,
}

impl Distribution {
    /// A fair die with faces `1..=faces`.
    pub fn uniform(faces: u32) -> Self {
        let p = 1.0 / f64::from(faces);
        let probabilities = (1..=i64::from(faces)).map(|face| (face, p)).collect();
        Self { probabilities }
    }

    /// Distribution of the sum of two independent outcomes.
    pub fn convolve(&self, other: &Distribution) -> Distribution {
        let mut probabilities = BTreeMap::new();
        for (&x, &px) in &self.probabilities {
            for (&y, &py) in &other.probabilities {
                *probabilities.entry(x + y).or_insert(0.0) += px * py;
            }
        }
        Distribution { probabilities }
    }

    /// Same probabilities with every outcome moved by `offset`.
    pub fn shift(&self, offset: i64) -> Distribution {
        let probabilities = self
            .probabilities
            .iter()
            .map(|(&outcome, &p)| (outcome + offset, p))
            .collect();
        Distribution { probabilities }
    }

    /// Probability of exactly `outcome`; zero if it cannot happen.
    pub fn probability(&self, outcome: i64) -> f64 {
        self.probabilities.get(&outcome).copied().unwrap_or(0.0)
    }

    pub fn at_least(&self, outcome: i64) -> f64 {
        self.probabilities.range(outcome..).map(|(_, p)| p).sum()
    }

    pub fn at_most(&self, outcome: i64) -> f64 {
        self.probabilities.range(..=outcome).map(|(_, p)| p).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.probabilities.iter().map(|(&o, &p)| (o, p))
    }

    pub fn outcomes(&self) -> impl Iterator<Item = i64> + '_ {
        self.probabilities.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Sum of all probabilities. Should be 1 up to rounding.
    pub fn total(&self) -> f64 {
        self.probabilities.values().sum()
    }

    pub fn min(&self) -> Option<i64> {
        self.probabilities.keys().next().copied()
    }

    pub fn max(&self) -> Option<i64> {
        self.probabilities.keys().next_back().copied()
    }

    pub fn mean(&self) -> f64 {
        self.iter().map(|(o, p)| o as f64 * p).sum()
    }

    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.iter()
            .map(|(o, p)| {
                let d = o as f64 - mean;
                d * d * p
            })
            .sum()
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Largest single-outcome probability, used to scale histograms.
    pub fn highest_probability(&self) -> f64 {
        self.probabilities.values().copied().fold(0.0, f64::max)
    }

    /// The most likely outcome. Ties go to the smallest outcome.
    pub fn most_likely(&self) -> Option<i64> {
        let mut best: Option<(i64, f64)> = None;
        for (o, p) in self.iter() {
            match best {
                Some((_, bp)) if bp >= p => {}
                _ => best = Some((o, p)),
            }
        }
        best.map(|(o, _)| o)
    }
}

impl FromIterator<(i64, f64)> for Distribution {
    fn from_iter<T: IntoIterator<Item = (i64, f64)>>(iter: T) -> Self {
        let mut probabilities = BTreeMap::new();
        for (outcome, p) in iter {
            *probabilities.entry(outcome).or_insert(0.0) += p;
        }
        Self { probabilities }
    }
}

#[cfg(test)]
mod tests {
    use statrs::assert_almost_eq;

    use super::*;

    #[test]
    fn test_uniform() {
        let d6 = Distribution::uniform(6);
        assert_eq!(d6.len(), 6);
        assert_eq!(d6.outcomes().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
        for outcome in 1..=6 {
            assert_almost_eq!(d6.probability(outcome), 1.0 / 6.0, 1e-9);
        }
        assert_eq!(d6.probability(0), 0.0);
        assert_eq!(d6.probability(7), 0.0);
    }

    #[test]
    fn test_convolve() {
        let d6 = Distribution::uniform(6);
        let two = d6.convolve(&d6);
        assert_eq!(two.len(), 11);
        assert_almost_eq!(two.probability(7), 6.0 / 36.0, 1e-9);
        assert_almost_eq!(two.probability(2), 1.0 / 36.0, 1e-9);
        assert_almost_eq!(two.probability(12), 1.0 / 36.0, 1e-9);
        assert_almost_eq!(two.total(), 1.0, 1e-9);
        assert_eq!(two.most_likely(), Some(7));
    }

    #[test]
    fn test_shift() {
        let d4 = Distribution::uniform(4);
        let shifted = d4.shift(-3);
        assert_eq!(shifted.min(), Some(-2));
        assert_eq!(shifted.max(), Some(1));
        for (a, b) in d4.iter().zip(shifted.iter()) {
            assert_eq!(a.0 - 3, b.0);
            assert_eq!(a.1, b.1);
        }
    }

    #[test]
    fn test_moments() {
        let d6 = Distribution::uniform(6);
        assert_almost_eq!(d6.mean(), 3.5, 1e-9);
        assert_almost_eq!(d6.variance(), 35.0 / 12.0, 1e-9);

        let two = d6.convolve(&d6);
        assert_almost_eq!(two.mean(), 7.0, 1e-9);
        assert_almost_eq!(two.variance(), 35.0 / 6.0, 1e-9);
    }

    #[test]
    fn test_cumulative() {
        let d6 = Distribution::uniform(6);
        assert_almost_eq!(d6.at_least(5), 2.0 / 6.0, 1e-9);
        assert_almost_eq!(d6.at_most(2), 2.0 / 6.0, 1e-9);
        assert_almost_eq!(d6.at_least(1), 1.0, 1e-9);
        assert_eq!(d6.at_least(7), 0.0);
    }

    #[test]
    fn test_most_likely_tie() {
        let d6 = Distribution::uniform(6);
        assert_eq!(d6.most_likely(), Some(1));
        assert_eq!(Distribution::default().most_likely(), None);
    }

    #[test]
    fn test_from_iter_accumulates() {
        let dist: Distribution = [(1, 0.25), (2, 0.5), (1, 0.25)].into_iter().collect();
        assert_eq!(dist.len(), 2);
        assert_almost_eq!(dist.probability(1), 0.5, 1e-12);
        assert_almost_eq!(dist.highest_probability(), 0.5, 1e-12);
    }
}
