//! Structure search configuration.

use crate::engine::errors::{BayesError, Result};
use crate::engine::estimator::DEFAULT_MU;
use crate::engine::network::CycleGuard;

/// Number of random restarts run by default.
pub const DEFAULT_RESTARTS: usize = 5;

/// How two log-score magnitudes are compared.
///
/// The log score is `Σ |ln P(row)|`, a negative log-likelihood, so a smaller
/// magnitude is the better fit. The historical behaviour of this search keeps
/// the *larger* magnitude, which tends to favour denser graphs; it stays the
/// default so that learned structures are reproducible. `MinimizeMagnitude`
/// is the likelihood-correct comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScoreDirection {
    /// Accept a candidate whose magnitude is strictly larger.
    #[default]
    MaximizeMagnitude,
    /// Accept a candidate whose magnitude is strictly smaller.
    MinimizeMagnitude,
}

impl ScoreDirection {
    /// Whether `candidate` strictly beats `incumbent`.
    pub fn is_improvement(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            ScoreDirection::MaximizeMagnitude => candidate.abs() > incumbent.abs(),
            ScoreDirection::MinimizeMagnitude => candidate.abs() < incumbent.abs(),
        }
    }
}

/// Configuration for greedy structure search and its random restarts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Number of independent restarts.
    pub restarts: usize,

    /// Base seed; restart `i` uses `seed + i`. `None` draws from entropy.
    pub seed: Option<u64>,

    /// Laplace smoothing constant.
    pub mu: f64,

    /// Score comparison used by both the search and restart selection.
    pub direction: ScoreDirection,

    /// Guard forced onto the working network. `None` keeps the initial
    /// network's own guard.
    pub cycle_guard: Option<CycleGuard>,

    /// Shuffle the vertex scan order at the start of each search.
    pub shuffle_vertices: bool,

    /// Upper bound on full scans; a scan that accepts nothing ends the search.
    pub max_passes: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            restarts: DEFAULT_RESTARTS,
            seed: None,
            mu: DEFAULT_MU,
            direction: ScoreDirection::default(),
            cycle_guard: None,
            shuffle_vertices: true,
            max_passes: 1,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_mu(mut self, mu: f64) -> Self {
        self.mu = mu;
        self
    }

    pub fn with_direction(mut self, direction: ScoreDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_cycle_guard(mut self, guard: CycleGuard) -> Self {
        self.cycle_guard = Some(guard);
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle_vertices = shuffle;
        self
    }

    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }

    /// Rejects configurations the search cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.restarts == 0 {
            return Err(BayesError::invalid("restarts must be at least 1"));
        }
        if self.max_passes == 0 {
            return Err(BayesError::invalid("max_passes must be at least 1"));
        }
        if !self.mu.is_finite() || self.mu <= 0.0 {
            return Err(BayesError::invalid(format!(
                "mu must be finite and > 0, got {}",
                self.mu
            )));
        }
        Ok(())
    }
}
