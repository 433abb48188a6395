//! Property tests for estimator bounds, network guards and search monotonicity.

use baystruct_core::{
    CycleGuard, Dataset, Estimator, GreedySearch, Network, ScoreDirection, Scorer, SearchConfig,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const NAMES: [&str; 4] = ["A", "B", "C", "D"];
const VALUES: [&str; 3] = ["x", "y", "z"];

fn dataset_from(cells: &[Vec<usize>]) -> Dataset {
    let rows: Vec<Vec<&str>> = cells
        .iter()
        .map(|row| row.iter().map(|&v| VALUES[v]).collect())
        .collect();
    Dataset::new(NAMES, rows).unwrap()
}

fn table() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..3, 4), 1..20)
}

fn edge_list() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..4, 0usize..4), 0..16)
}

proptest! {
    #[test]
    fn estimates_stay_strictly_inside_unit_interval(
        cells in table(),
        mu in 1e-3f64..100.0,
        attr in 0usize..4,
        value in 0usize..3,
        parent in 0usize..4,
        parent_value in 0usize..3,
    ) {
        let data = dataset_from(&cells);
        let est = Estimator::new(mu).unwrap();

        let m = est.marginal(&data, NAMES[attr], VALUES[value]).unwrap();
        prop_assert!(m > 0.0 && m < 1.0);

        let c = est
            .conditional(&data, NAMES[attr], [(NAMES[parent], VALUES[parent_value])])
            .unwrap();
        prop_assert!(c > 0.0 && c < 1.0);
    }

    #[test]
    fn three_valued_marginals_sum_to_one(cells in table(), mu in 1e-3f64..100.0, attr in 0usize..4) {
        let data = dataset_from(&cells);
        let est = Estimator::new(mu).unwrap();
        let total: f64 = VALUES
            .iter()
            .map(|v| est.marginal(&data, NAMES[attr], v).unwrap())
            .sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn acyclic_guard_keeps_every_network_a_dag(edges in edge_list()) {
        let mut net = Network::builder(NAMES)
            .edges(Vec::<(&str, &str)>::new())
            .build()
            .unwrap();
        for (p, c) in edges {
            let before = net.to_string();
            if net.add_edge(NAMES[p], NAMES[c]).is_err() {
                prop_assert_eq!(net.to_string(), before);
            }
            prop_assert!(net.is_acyclic());
        }
    }

    #[test]
    fn reverse_edge_guard_never_holds_both_directions(edges in edge_list()) {
        let mut net = Network::builder(NAMES)
            .cycle_guard(CycleGuard::ReverseEdge)
            .edges(Vec::<(&str, &str)>::new())
            .build()
            .unwrap();
        for (p, c) in edges {
            let _ = net.add_edge(NAMES[p], NAMES[c]);
        }
        for (p, c) in net.edges() {
            prop_assert!(p != c);
            prop_assert!(!net.contains_edge(c, p).unwrap());
        }
    }

    #[test]
    fn clone_is_independent_of_original(edges in edge_list(), extra in (0usize..4, 0usize..4)) {
        let mut original = Network::builder(NAMES)
            .edges(Vec::<(&str, &str)>::new())
            .build()
            .unwrap();
        for (p, c) in edges {
            let _ = original.add_edge(NAMES[p], NAMES[c]);
        }
        let snapshot = original.to_string();

        let mut copy = original.clone();
        let _ = copy.add_edge(NAMES[extra.0], NAMES[extra.1]);
        prop_assert_eq!(original.to_string(), snapshot);
    }

    #[test]
    fn search_score_moves_only_in_configured_direction(
        cells in table(),
        seed in any::<u64>(),
        minimize in any::<bool>(),
    ) {
        let data = dataset_from(&cells);
        let direction = if minimize {
            ScoreDirection::MinimizeMagnitude
        } else {
            ScoreDirection::MaximizeMagnitude
        };
        let search = GreedySearch::new(SearchConfig::new().with_direction(direction)).unwrap();
        let initial = Network::new(NAMES, None).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let outcome = search.search(&initial, &data, &mut rng).unwrap();
        prop_assert!(!direction.is_improvement(outcome.initial_score, outcome.score));
        prop_assert!(outcome.network.is_acyclic());

        let rescored = Scorer::default().total_log_score(&outcome.network, &data).unwrap();
        prop_assert_eq!(rescored, outcome.score);
    }
}
