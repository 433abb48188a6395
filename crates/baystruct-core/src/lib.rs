//! # baystruct core
//!
//! Greedy structure learning of Bayesian networks over categorical tables,
//! plus a word-count Naive Bayes spam classifier.
//!
//! ## Usage
//!
//! ```rust
//! use baystruct_core::{learn_from_dataset, Dataset, SearchConfig};
//!
//! let data = Dataset::new(
//!     ["Rain", "WetGrass"],
//!     [["T", "T"], ["T", "T"], ["F", "F"], ["F", "F"]],
//! )
//! .unwrap();
//!
//! let config = SearchConfig::new().with_seed(7);
//! let learned = learn_from_dataset(&data, Some("Rain"), &config).unwrap();
//! assert_eq!(learned.network.parents_of("WetGrass").unwrap(), vec!["Rain"]);
//! ```

#![forbid(unsafe_code)]

pub mod classifier;
pub mod engine;

// Re-export commonly used types
pub use classifier::naive_bayes::{EmailClass, EmailFeatures, NaiveBayes, TrainingCounts, Verdict};
pub use engine::config::{ScoreDirection, SearchConfig};
pub use engine::dataset::{Dataset, Observation};
pub use engine::errors::{BayesError, Result};
pub use engine::estimator::Estimator;
pub use engine::network::{CycleGuard, Network, NetworkBuilder, VertexId};
pub use engine::restarts::{learn_from_dataset, learn_structure, LearnedStructure};
pub use engine::scorer::Scorer;
pub use engine::search::{GreedySearch, SearchOutcome};
