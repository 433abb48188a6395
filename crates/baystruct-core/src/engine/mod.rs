//! The structure-learning engine.
//!
//! This module provides:
//! - **errors**: Error types shared by every component
//! - **dataset**: Immutable categorical table and per-row views
//! - **network**: Directed network with a primary vertex and cycle guards
//! - **estimator**: Laplace-smoothed marginal and conjunctive estimates
//! - **scorer**: Per-row probability and total log score of a network
//! - **config**: Search configuration and score direction
//! - **search**: One randomized greedy hill-climbing search
//! - **restarts**: Random-restart driver and best-structure selection

pub mod config;
pub mod dataset;
pub mod errors;
pub mod estimator;
pub mod network;
pub mod restarts;
pub mod scorer;
pub mod search;
