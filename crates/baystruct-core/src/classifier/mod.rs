//! Classifiers that run alongside structure learning.
//!
//! - **naive_bayes**: word-count Naive Bayes spam filter

pub mod naive_bayes;
