//! Pseudo-likelihood scoring of a network against its training data.
//!
//! The probability of one observed row is the primary vertex's smoothed
//! marginal times, for every other vertex, the smoothed frequency of its
//! parents' observed values:
//!
//! ```text
//! P(row) = p(primary = row[primary]) * Π_{v != primary} p({u = row[u] : u ∈ parents(v)})
//! ```
//!
//! The fitness of a network is `Σ_rows |ln P(row)|`. That magnitude is a
//! negative log-likelihood, so smaller means a better fit; see
//! [`ScoreDirection`](crate::engine::config::ScoreDirection) for how the
//! search compares scores.

use crate::engine::dataset::{Dataset, Observation};
use crate::engine::errors::{BayesError, Result};
use crate::engine::estimator::Estimator;
use crate::engine::network::Network;

/// Scores networks with a fixed [`Estimator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    estimator: Estimator,
}

/// Network structure resolved to dataset columns, computed once per network
/// rather than once per row.
struct ScoringPlan {
    primary: usize,
    /// Parent columns of each non-primary vertex, in vertex order.
    families: Vec<Vec<usize>>,
}

impl ScoringPlan {
    fn new(network: &Network, data: &Dataset) -> Result<Self> {
        let columns = network
            .vertices()
            .iter()
            .map(|label| {
                data.column(label).map_err(|_| {
                    BayesError::invalid(format!(
                        "vertex '{}' has no column in the dataset",
                        label
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let primary = network.primary_id();
        let families = network
            .vertex_ids()
            .filter(|&v| v != primary)
            .map(|v| {
                network
                    .parent_ids(v)
                    .map(|p| columns[p.index()])
                    .collect()
            })
            .collect();

        Ok(Self {
            primary: columns[primary.index()],
            families,
        })
    }
}

impl Scorer {
    /// Creates a scorer around `estimator`.
    pub fn new(estimator: Estimator) -> Self {
        Self { estimator }
    }

    /// The estimator used for every factor.
    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// Probability of `observation` under `network`, a value in `(0, 1)`.
    pub fn score(
        &self,
        network: &Network,
        data: &Dataset,
        observation: &Observation<'_>,
    ) -> Result<f64> {
        let plan = ScoringPlan::new(network, data)?;
        let attributes = data.attributes();
        self.row_probability(&plan, data, |col| observation.get(&attributes[col]))
    }

    /// `Σ_rows |ln P(row)|` over every row of `data`.
    ///
    /// Fails with [`BayesError::Numerical`] if the sum is not finite.
    pub fn total_log_score(&self, network: &Network, data: &Dataset) -> Result<f64> {
        let plan = ScoringPlan::new(network, data)?;
        let mut total = 0.0;
        for row in data.rows() {
            let p = self.row_probability(&plan, data, |col| Ok(row[col].as_str()))?;
            total += p.ln().abs();
        }
        if !total.is_finite() {
            return Err(BayesError::Numerical(format!(
                "log score is not finite ({})",
                total
            )));
        }
        Ok(total)
    }

    fn row_probability<'v>(
        &self,
        plan: &ScoringPlan,
        data: &Dataset,
        value_at: impl Fn(usize) -> Result<&'v str>,
    ) -> Result<f64> {
        let primary_value = value_at(plan.primary)?;
        let mut result = self
            .estimator
            .conditional_columns(data, &[(plan.primary, primary_value)]);

        let mut constraints: Vec<(usize, &str)> = Vec::new();
        for parents in &plan.families {
            constraints.clear();
            for &col in parents {
                constraints.push((col, value_at(col)?));
            }
            result *= self.estimator.conditional_columns(data, &constraints);
        }
        Ok(result)
    }
}
