//! Randomized greedy hill-climbing over edge additions.
//!
//! One search shuffles the vertex order, then for every non-primary vertex
//! `v` and every other vertex `p` (both scanned in that order) tries adding
//! `v -> p` to a copy of the current network. The copy replaces the current
//! network only when its log score strictly improves under the configured
//! [`ScoreDirection`]. Edges rejected by the network's cycle guard are
//! skipped, not treated as failures.
//!
//! The scan runs once by default; `max_passes` lets it repeat until a full
//! scan accepts nothing.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::config::{ScoreDirection, SearchConfig};
use crate::engine::dataset::Dataset;
use crate::engine::errors::Result;
use crate::engine::estimator::Estimator;
use crate::engine::network::{Network, VertexId};
use crate::engine::scorer::Scorer;

/// Result of one greedy search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The best network found.
    pub network: Network,
    /// Its total log score.
    pub score: f64,
    /// Total log score of the starting network.
    pub initial_score: f64,
    /// Candidate networks that were scored.
    pub candidates_evaluated: usize,
    /// Candidates that replaced the current network.
    pub moves_accepted: usize,
    /// Full scans performed.
    pub passes: usize,
}

/// Greedy structure search with a fixed configuration.
#[derive(Debug, Clone)]
pub struct GreedySearch {
    config: SearchConfig,
    scorer: Scorer,
}

impl GreedySearch {
    /// Validates `config` and builds the search.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let scorer = Scorer::new(Estimator::new(config.mu)?);
        Ok(Self { config, scorer })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn direction(&self) -> ScoreDirection {
        self.config.direction
    }

    /// Runs one search from `initial`, drawing the scan order from `rng`.
    ///
    /// `initial` is never modified. A search that finds no improving edge
    /// returns a network equal to `initial`.
    pub fn search<R>(&self, initial: &Network, data: &Dataset, rng: &mut R) -> Result<SearchOutcome>
    where
        R: Rng + ?Sized,
    {
        let mut current = initial.clone();
        if let Some(guard) = self.config.cycle_guard {
            current = current.with_cycle_guard(guard);
        }
        let initial_score = self.scorer.total_log_score(&current, data)?;
        let mut current_score = initial_score;

        let mut order: Vec<VertexId> = current.vertex_ids().collect();
        if self.config.shuffle_vertices {
            order.shuffle(rng);
        }

        let primary = current.primary_id();
        let direction = self.config.direction;
        let mut candidates_evaluated = 0usize;
        let mut moves_accepted = 0usize;
        let mut passes = 0usize;

        while passes < self.config.max_passes {
            passes += 1;
            let mut accepted_this_pass = 0usize;

            for &vertex in &order {
                if vertex == primary {
                    continue;
                }
                for &other in &order {
                    // Skip self pairs and pairs whose reverse edge already exists.
                    if other == vertex || current.contains_edge_ids(other, vertex) {
                        continue;
                    }

                    let mut candidate = current.clone();
                    match candidate.add_edge_ids(vertex, other) {
                        Ok(true) => {}
                        Ok(false) | Err(_) => continue,
                    }

                    candidates_evaluated += 1;
                    let score = self.scorer.total_log_score(&candidate, data)?;
                    if direction.is_improvement(score, current_score) {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            parent = candidate.label(vertex),
                            child = candidate.label(other),
                            from = current_score,
                            to = score,
                            "accepted edge"
                        );
                        current = candidate;
                        current_score = score;
                        moves_accepted += 1;
                        accepted_this_pass += 1;
                    }
                }
            }

            if accepted_this_pass == 0 {
                break;
            }
        }

        Ok(SearchOutcome {
            network: current,
            score: current_score,
            initial_score,
            candidates_evaluated,
            moves_accepted,
            passes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::network::CycleGuard;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sprinkler() -> Dataset {
        Dataset::new(
            ["Cloudy", "Sprinkler", "Rain", "WetGrass"],
            [
                ["T", "F", "T", "T"],
                ["T", "F", "T", "T"],
                ["T", "T", "F", "T"],
                ["F", "T", "F", "T"],
                ["F", "F", "F", "F"],
                ["F", "T", "F", "T"],
                ["T", "F", "T", "T"],
                ["F", "F", "F", "F"],
            ],
        )
        .unwrap()
    }

    fn unshuffled(direction: ScoreDirection) -> GreedySearch {
        GreedySearch::new(
            SearchConfig::new()
                .with_shuffle(false)
                .with_direction(direction),
        )
        .unwrap()
    }

    #[test]
    fn search_never_modifies_initial() {
        let data = sprinkler();
        let initial = Network::new(data.attributes().iter().cloned(), Some("WetGrass")).unwrap();
        let before = initial.to_string();
        let search = GreedySearch::new(SearchConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        search.search(&initial, &data, &mut rng).unwrap();
        assert_eq!(initial.to_string(), before);
    }

    #[test]
    fn maximizing_search_never_lowers_magnitude() {
        let data = sprinkler();
        let initial = Network::new(data.attributes().iter().cloned(), None).unwrap();
        let search = unshuffled(ScoreDirection::MaximizeMagnitude);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = search.search(&initial, &data, &mut rng).unwrap();
        assert!(outcome.score >= outcome.initial_score);
        assert!(outcome.moves_accepted > 0);
        assert!(outcome.network.edge_count() > initial.edge_count());
        assert!(outcome.network.is_acyclic());
    }

    #[test]
    fn minimizing_search_never_raises_magnitude() {
        let data = sprinkler();
        let initial = Network::new(data.attributes().iter().cloned(), None).unwrap();
        let search = unshuffled(ScoreDirection::MinimizeMagnitude);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = search.search(&initial, &data, &mut rng).unwrap();
        assert!(outcome.score <= outcome.initial_score);
    }

    #[test]
    fn single_vertex_network_has_nothing_to_try() {
        let data = sprinkler();
        let initial = Network::new(["Rain"], None).unwrap();
        let search = GreedySearch::new(SearchConfig::default()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let outcome = search.search(&initial, &data, &mut rng).unwrap();
        assert_eq!(outcome.candidates_evaluated, 0);
        assert_eq!(outcome.network.edge_count(), 0);
        assert_eq!(outcome.score, outcome.initial_score);
    }

    #[test]
    fn forced_guard_applies_to_result() {
        let data = sprinkler();
        let initial = Network::new(data.attributes().iter().cloned(), None).unwrap();
        let search = GreedySearch::new(
            SearchConfig::new().with_cycle_guard(CycleGuard::ReverseEdge),
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let outcome = search.search(&initial, &data, &mut rng).unwrap();
        assert_eq!(outcome.network.cycle_guard(), CycleGuard::ReverseEdge);
    }

    /// `B` copies `P`; `C` and `D` vary independently of both.
    fn copied_parent() -> Dataset {
        Dataset::new(
            ["B", "C", "D", "P"],
            [
                ["x", "x", "x", "x"],
                ["x", "y", "y", "x"],
                ["y", "x", "y", "y"],
                ["y", "y", "x", "y"],
            ],
        )
        .unwrap()
    }

    fn copied_parent_initial() -> Network {
        Network::builder(["B", "C", "D", "P"])
            .primary("P")
            .cycle_guard(CycleGuard::ReverseEdge)
            .edges([("P", "D")])
            .build()
            .unwrap()
    }

    #[test]
    fn reverse_edge_search_closes_a_three_cycle() {
        // Scan order B, C, D (P is primary):
        //   B -> C  accepted, C's parent set grows from {} to {B}
        //   B -> D  rejected, B adds nothing to D's parent P
        //   B -> P  rejected, the primary's parents are not scored
        //   C -> B  skipped, B -> C exists
        //   C -> D  accepted, C splits the P = x rows
        //   C -> P  rejected
        //   D -> B  accepted, only the reverse B -> D is checked
        //   D -> C, D -> P  skipped, reverse edges exist
        let data = copied_parent();
        let search = unshuffled(ScoreDirection::MaximizeMagnitude);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let outcome = search
            .search(&copied_parent_initial(), &data, &mut rng)
            .unwrap();

        assert_eq!(
            outcome.network.to_string(),
            "B -> C\nC -> D\nD -> B\nP -> D\n"
        );
        assert_eq!(outcome.moves_accepted, 3);
        assert_eq!(outcome.candidates_evaluated, 6);
        assert_eq!(outcome.passes, 1);
        assert!(!outcome.network.is_acyclic());
    }

    #[test]
    fn acyclic_guard_blocks_the_closing_edge() {
        let data = copied_parent();
        let search = GreedySearch::new(
            SearchConfig::new()
                .with_shuffle(false)
                .with_cycle_guard(CycleGuard::Acyclic),
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let outcome = search
            .search(&copied_parent_initial(), &data, &mut rng)
            .unwrap();

        assert_eq!(outcome.network.to_string(), "B -> C\nC -> D\nP -> D\n");
        assert_eq!(outcome.moves_accepted, 2);
        assert_eq!(outcome.candidates_evaluated, 5);
        assert!(outcome.network.is_acyclic());
    }

    #[test]
    fn extra_passes_only_add_improvements() {
        let data = sprinkler();
        let initial = Network::new(data.attributes().iter().cloned(), None).unwrap();
        let one = unshuffled(ScoreDirection::MaximizeMagnitude);
        let many = GreedySearch::new(SearchConfig::new().with_shuffle(false).with_max_passes(10))
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let a = one.search(&initial, &data, &mut rng).unwrap();
        let b = many.search(&initial, &data, &mut rng).unwrap();
        assert!(b.score >= a.score);
        assert!(b.passes >= 1 && b.passes <= 10);
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(GreedySearch::new(SearchConfig::new().with_restarts(0)).is_err());
    }
}
