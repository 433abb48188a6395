//! Laplace-smoothed probability estimates over a [`Dataset`].
//!
//! Both estimates share one formula:
//!
//! ```text
//! p = (matches + mu / 3) / (rows + mu)
//! ```
//!
//! The `3` is a fixed implicit support size, not the cardinality of the
//! attribute. For an attribute with `k` observed values the smoothed marginals
//! sum to `(rows + k * mu / 3) / (rows + mu)`, which is exactly one only for
//! `k == 3`. Every estimate lies strictly inside `(0, 1)` for `mu > 0` and a
//! non-empty dataset.

use crate::engine::dataset::Dataset;
use crate::engine::errors::{BayesError, Result};

/// Default additive smoothing constant.
pub const DEFAULT_MU: f64 = 1.0;

/// Implicit number of outcomes the smoothing mass is spread over.
pub const SMOOTHING_SUPPORT: f64 = 3.0;

/// Laplace-smoothed frequency estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Estimator {
    mu: f64,
}

impl Default for Estimator {
    fn default() -> Self {
        Self { mu: DEFAULT_MU }
    }
}

impl Estimator {
    /// Creates an estimator with smoothing constant `mu`, which must be finite
    /// and strictly positive.
    pub fn new(mu: f64) -> Result<Self> {
        if !mu.is_finite() || mu <= 0.0 {
            return Err(BayesError::invalid(format!(
                "smoothing constant must be finite and > 0, got {}",
                mu
            )));
        }
        Ok(Self { mu })
    }

    /// The smoothing constant.
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Smoothed probability that `attribute == value`.
    pub fn marginal(&self, data: &Dataset, attribute: &str, value: &str) -> Result<f64> {
        let col = data.column(attribute)?;
        Ok(self.smoothed(data.count_matching(&[(col, value)]), data.len()))
    }

    /// Smoothed probability of the conjunction of every `(attribute, value)`
    /// pair in `assignment`.
    ///
    /// `attribute` must name a column but is not added to the conjunction;
    /// callers that want the attribute's own value counted include it in
    /// `assignment`. An empty assignment matches every row. The denominator
    /// is always the full row count.
    pub fn conditional<I, A, V>(
        &self,
        data: &Dataset,
        attribute: &str,
        assignment: I,
    ) -> Result<f64>
    where
        I: IntoIterator<Item = (A, V)>,
        A: AsRef<str>,
        V: AsRef<str>,
    {
        data.column(attribute)?;
        let resolved = assignment
            .into_iter()
            .map(|(attr, value)| data.column(attr.as_ref()).map(|col| (col, value)))
            .collect::<Result<Vec<_>>>()?;
        let constraints: Vec<(usize, &str)> = resolved
            .iter()
            .map(|(col, value)| (*col, value.as_ref()))
            .collect();
        Ok(self.conditional_columns(data, &constraints))
    }

    /// Column-resolved form of [`Estimator::conditional`].
    pub(crate) fn conditional_columns(&self, data: &Dataset, constraints: &[(usize, &str)]) -> f64 {
        self.smoothed(data.count_matching(constraints), data.len())
    }

    /// `(count + mu / 3) / (total + mu)`.
    #[inline]
    pub fn smoothed(&self, count: usize, total: usize) -> f64 {
        (count as f64 + self.mu / SMOOTHING_SUPPORT) / (total as f64 + self.mu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn weather() -> Dataset {
        Dataset::new(
            ["Rain", "WetGrass"],
            [["T", "T"], ["T", "T"], ["F", "F"], ["F", "F"]],
        )
        .unwrap()
    }

    #[test]
    fn marginal_matches_closed_form() {
        let est = Estimator::default();
        let p = est.marginal(&weather(), "Rain", "T").unwrap();
        assert!((p - (2.0 + 1.0 / 3.0) / 5.0).abs() < 1e-12);
        assert!((p - 0.4667).abs() < 1e-4);
    }

    #[test]
    fn unseen_value_keeps_smoothing_mass() {
        let est = Estimator::default();
        let p = est.marginal(&weather(), "Rain", "Maybe").unwrap();
        assert!((p - (1.0 / 3.0) / 5.0).abs() < 1e-12);
    }

    #[test]
    fn conditional_counts_conjunction() {
        let est = Estimator::default();
        let data = weather();

        let mut assignment = BTreeMap::new();
        assignment.insert("Rain", "T");
        assignment.insert("WetGrass", "T");
        let both = est.conditional(&data, "WetGrass", &assignment).unwrap();
        assert!((both - (2.0 + 1.0 / 3.0) / 5.0).abs() < 1e-12);

        assignment.insert("WetGrass", "F");
        let none = est.conditional(&data, "WetGrass", &assignment).unwrap();
        assert!((none - (1.0 / 3.0) / 5.0).abs() < 1e-12);
    }

    #[test]
    fn empty_assignment_counts_every_row() {
        let est = Estimator::default();
        let empty: [(&str, &str); 0] = [];
        let p = est.conditional(&weather(), "Rain", empty).unwrap();
        assert!((p - (4.0 + 1.0 / 3.0) / 5.0).abs() < 1e-12);
        assert!(p < 1.0);
    }

    #[test]
    fn unknown_attributes_are_rejected() {
        let est = Estimator::default();
        let data = weather();
        assert!(est.marginal(&data, "Snow", "T").is_err());
        assert!(est.conditional(&data, "Snow", [("Rain", "T")]).is_err());
        assert!(est.conditional(&data, "Rain", [("Snow", "T")]).is_err());
    }

    #[test]
    fn smoothing_constant_is_validated() {
        assert!(Estimator::new(0.0).is_err());
        assert!(Estimator::new(-1.0).is_err());
        assert!(Estimator::new(f64::NAN).is_err());
        assert_eq!(Estimator::new(2.0).unwrap().mu(), 2.0);
    }

    #[test]
    fn marginals_sum_to_one_only_for_three_values() {
        let est = Estimator::default();
        let three = Dataset::new(["X"], [["a"], ["b"], ["c"], ["a"]]).unwrap();
        let sum: f64 = ["a", "b", "c"]
            .iter()
            .map(|v| est.marginal(&three, "X", v).unwrap())
            .sum();
        assert!((sum - 1.0).abs() < 1e-12);

        let two = weather();
        let sum: f64 = ["T", "F"]
            .iter()
            .map(|v| est.marginal(&two, "Rain", v).unwrap())
            .sum();
        let expected = (4.0 + 2.0 / 3.0) / 5.0;
        assert!((sum - expected).abs() < 1e-12);
    }
}
