//! # Bayesian network structure
//!
//! A [`Network`] is a directed graph over a fixed set of named vertices with
//! one distinguished *primary* vertex, the one whose marginal seeds the joint
//! probability of a row.
//!
//! ## Design
//!
//! - Vertices live in an arena addressed by [`VertexId`]; labels and the
//!   label → id index are immutable and shared between clones through `Arc`.
//! - Edges are stored as parent → children adjacency. Child lists are kept
//!   sorted so that edge enumeration is stable: parents in vertex order,
//!   then children in vertex order.
//! - `Clone` is a deep copy of the adjacency. Mutating a clone never changes
//!   the original, which is what the structure search relies on when it
//!   tries candidate edges.
//! - Edge insertion is guarded by a [`CycleGuard`]. The reverse-edge guard
//!   only rejects direct 2-cycles; the acyclic guard rejects any edge that
//!   would close a directed cycle.
//!
//! ## Example
//!
//! ```rust
//! use baystruct_core::engine::network::Network;
//!
//! let mut net = Network::new(["Rain", "Sprinkler", "WetGrass"], Some("Rain")).unwrap();
//! assert_eq!(net.parents_of("WetGrass").unwrap(), vec!["Rain"]);
//!
//! net.add_edge("Sprinkler", "WetGrass").unwrap();
//! assert!(net.add_edge("WetGrass", "Sprinkler").is_err());
//! ```

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::engine::errors::{BayesError, Result};

/// Maximum size for inline child storage.
const INLINE_CHILDREN: usize = 8;

type ChildList = SmallVec<[VertexId; INLINE_CHILDREN]>;

/// Index of a vertex in a network's arena.
///
/// Ordered by construction position, which is the stable enumeration order.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexId(pub u32);

impl VertexId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Policy applied by [`Network::add_edge`] before inserting an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CycleGuard {
    /// Reject only an edge whose exact reverse already exists. Longer cycles
    /// (`a -> b -> c -> a`) are accepted.
    ReverseEdge,
    /// Reject any edge whose child can already reach its parent, keeping the
    /// graph a DAG.
    #[default]
    Acyclic,
}

/// Immutable vertex table shared between clones.
#[derive(Debug)]
struct VertexTable {
    labels: Vec<String>,
    ids: FxHashMap<String, VertexId>,
}

/// A directed network over named vertices with a primary vertex.
#[derive(Debug, Clone)]
pub struct Network {
    table: Arc<VertexTable>,
    primary: VertexId,
    children: Vec<ChildList>,
    guard: CycleGuard,
}

impl Network {
    /// Builds a network whose primary vertex is the parent of every other
    /// vertex.
    ///
    /// The primary defaults to the first vertex. Fails with
    /// [`BayesError::InvalidArgument`] if `primary` is not among `vertices`,
    /// or if the vertex list is empty or repeats a name.
    pub fn new<I, S>(vertices: I, primary: Option<&str>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = NetworkBuilder::new(vertices);
        if let Some(primary) = primary {
            builder = builder.primary(primary);
        }
        builder.build()
    }

    /// Builds a network from an explicit edge set instead of the star. Each
    /// edge goes through [`Network::add_edge`] under the default guard.
    pub fn with_edges<I, S, E, P, C>(vertices: I, primary: Option<&str>, edges: E) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        E: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let mut builder = NetworkBuilder::new(vertices).edges(edges);
        if let Some(primary) = primary {
            builder = builder.primary(primary);
        }
        builder.build()
    }

    /// Starts a [`NetworkBuilder`] for custom primary, guard or edge set.
    pub fn builder<I, S>(vertices: I) -> NetworkBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NetworkBuilder::new(vertices)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.table.labels.len()
    }

    /// Vertex labels in construction order.
    pub fn vertices(&self) -> &[String] {
        &self.table.labels
    }

    /// Vertex ids in construction order.
    pub fn vertex_ids(&self) -> impl ExactSizeIterator<Item = VertexId> {
        (0..self.vertex_count() as u32).map(VertexId)
    }

    /// The primary vertex's id.
    pub fn primary_id(&self) -> VertexId {
        self.primary
    }

    /// The primary vertex's label.
    pub fn primary(&self) -> &str {
        self.label(self.primary)
    }

    /// The cycle guard applied on edge insertion.
    pub fn cycle_guard(&self) -> CycleGuard {
        self.guard
    }

    /// Returns a copy of this network that applies `guard` to later
    /// insertions. Existing edges are kept as they are.
    pub fn with_cycle_guard(mut self, guard: CycleGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Label of `id`. Fails with [`BayesError::InvalidArgument`] for an id
    /// outside this network.
    pub fn label_of(&self, id: VertexId) -> Result<&str> {
        self.check_id(id)?;
        Ok(self.label(id))
    }

    /// Unchecked form of [`Network::label_of`] for ids produced by this
    /// network.
    pub(crate) fn label(&self, id: VertexId) -> &str {
        &self.table.labels[id.index()]
    }

    /// Resolves a label to its id.
    pub fn vertex_id(&self, label: &str) -> Result<VertexId> {
        self.table
            .ids
            .get(label)
            .copied()
            .ok_or_else(|| BayesError::invalid(format!("'{}' is not a vertex", label)))
    }

    /// Whether `label` is a vertex of this network.
    pub fn contains_vertex(&self, label: &str) -> bool {
        self.table.ids.contains_key(label)
    }

    /// Adds the edge `parent -> child`.
    ///
    /// Returns `Ok(true)` if the edge was inserted and `Ok(false)` if it was
    /// already present. Fails with [`BayesError::InvalidArgument`] when either
    /// endpoint is unknown, when `parent == child`, when `child -> parent`
    /// already exists, or, under [`CycleGuard::Acyclic`], when `child` can
    /// already reach `parent`. A failed call leaves the network unchanged.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> Result<bool> {
        let (p, c) = match (self.vertex_id(parent), self.vertex_id(child)) {
            (Ok(p), Ok(c)) => (p, c),
            _ => {
                return Err(BayesError::invalid(format!(
                    "edge '{}' -> '{}' references a vertex outside the network",
                    parent, child
                )))
            }
        };
        self.add_edge_ids(p, c)
    }

    /// Id-based form of [`Network::add_edge`].
    pub fn add_edge_ids(&mut self, parent: VertexId, child: VertexId) -> Result<bool> {
        self.check_id(parent)?;
        self.check_id(child)?;

        if parent == child {
            return Err(BayesError::invalid(format!(
                "self loop on '{}'",
                self.label(parent)
            )));
        }
        if self.contains_edge_ids(child, parent) {
            return Err(BayesError::invalid(format!(
                "'{}' is already a child of '{}'",
                self.label(parent),
                self.label(child)
            )));
        }
        if self.guard == CycleGuard::Acyclic && self.has_path_ids(child, parent) {
            return Err(BayesError::invalid(format!(
                "edge '{}' -> '{}' would close a cycle",
                self.label(parent),
                self.label(child)
            )));
        }

        let list = &mut self.children[parent.index()];
        match list.binary_search(&child) {
            Ok(_) => Ok(false),
            Err(pos) => {
                list.insert(pos, child);
                Ok(true)
            }
        }
    }

    /// Whether the edge `parent -> child` exists.
    pub fn contains_edge(&self, parent: &str, child: &str) -> Result<bool> {
        Ok(self.contains_edge_ids(self.vertex_id(parent)?, self.vertex_id(child)?))
    }

    pub(crate) fn contains_edge_ids(&self, parent: VertexId, child: VertexId) -> bool {
        self.children[parent.index()].binary_search(&child).is_ok()
    }

    /// Parents of `vertex` in vertex order.
    ///
    /// Parents are found by reverse lookup: every vertex that lists `vertex`
    /// among its children.
    pub fn parents_of(&self, vertex: &str) -> Result<Vec<&str>> {
        let id = self.vertex_id(vertex)?;
        Ok(self.parent_ids(id).map(|p| self.label(p)).collect())
    }

    /// Id-based form of [`Network::parents_of`].
    pub fn parent_ids(&self, vertex: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_ids()
            .filter(move |&p| self.contains_edge_ids(p, vertex))
    }

    /// Children of `vertex` in vertex order.
    pub fn children_of(&self, vertex: &str) -> Result<Vec<&str>> {
        let id = self.vertex_id(vertex)?;
        Ok(self.children[id.index()]
            .iter()
            .map(|&c| self.label(c))
            .collect())
    }

    /// Every edge as `(parent, child)`, parents in vertex order then children
    /// in vertex order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.children.iter().enumerate().flat_map(move |(p, list)| {
            list.iter()
                .map(move |&c| (self.label(VertexId(p as u32)), self.label(c)))
        })
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.children.iter().map(|list| list.len()).sum()
    }

    /// Whether a directed path leads from `from` to `to`. A vertex reaches
    /// itself.
    pub fn has_path(&self, from: &str, to: &str) -> Result<bool> {
        Ok(self.has_path_ids(self.vertex_id(from)?, self.vertex_id(to)?))
    }

    fn has_path_ids(&self, from: VertexId, to: VertexId) -> bool {
        let mut visited = vec![false; self.vertex_count()];
        let mut stack = vec![from];
        while let Some(v) = stack.pop() {
            if v == to {
                return true;
            }
            if std::mem::replace(&mut visited[v.index()], true) {
                continue;
            }
            stack.extend(
                self.children[v.index()]
                    .iter()
                    .copied()
                    .filter(|c| !visited[c.index()]),
            );
        }
        false
    }

    /// Whether the graph has no directed cycle.
    ///
    /// Always true for networks built and mutated under
    /// [`CycleGuard::Acyclic`]; reverse-edge networks may fail it.
    pub fn is_acyclic(&self) -> bool {
        // Kahn's algorithm over the child adjacency.
        let n = self.vertex_count();
        let mut in_degree = vec![0usize; n];
        for list in &self.children {
            for c in list {
                in_degree[c.index()] += 1;
            }
        }
        let mut queue: Vec<VertexId> = self
            .vertex_ids()
            .filter(|v| in_degree[v.index()] == 0)
            .collect();
        let mut visited = 0usize;
        while let Some(v) = queue.pop() {
            visited += 1;
            for &c in &self.children[v.index()] {
                in_degree[c.index()] -= 1;
                if in_degree[c.index()] == 0 {
                    queue.push(c);
                }
            }
        }
        visited == n
    }

    fn check_id(&self, id: VertexId) -> Result<()> {
        if id.index() < self.vertex_count() {
            Ok(())
        } else {
            Err(BayesError::invalid(format!(
                "vertex id {} out of range",
                id.0
            )))
        }
    }
}

/// One `parent -> child` line per edge, in [`Network::edges`] order.
impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (parent, child) in self.edges() {
            writeln!(f, "{} -> {}", parent, child)?;
        }
        Ok(())
    }
}

/// Builder for [`Network`] when the defaults of [`Network::new`] do not fit.
///
/// Without [`NetworkBuilder::edges`] the primary becomes the parent of every
/// other vertex. With it, the adjacency starts empty and only the supplied
/// edges are inserted, each through the configured [`CycleGuard`].
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    vertices: Vec<String>,
    primary: Option<String>,
    guard: CycleGuard,
    edges: Option<Vec<(String, String)>>,
}

impl NetworkBuilder {
    fn new<I, S>(vertices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vertices: vertices.into_iter().map(Into::into).collect(),
            primary: None,
            guard: CycleGuard::default(),
            edges: None,
        }
    }

    /// Sets the primary vertex.
    pub fn primary(mut self, primary: impl Into<String>) -> Self {
        self.primary = Some(primary.into());
        self
    }

    /// Sets the cycle guard.
    pub fn cycle_guard(mut self, guard: CycleGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Supplies an explicit edge set, replacing the default star.
    pub fn edges<I, P, C>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        self.edges = Some(
            edges
                .into_iter()
                .map(|(p, c)| (p.into(), c.into()))
                .collect(),
        );
        self
    }

    /// Validates the inputs and builds the network.
    pub fn build(self) -> Result<Network> {
        if self.vertices.is_empty() {
            return Err(BayesError::invalid("network needs at least one vertex"));
        }

        let mut ids = FxHashMap::default();
        for (idx, label) in self.vertices.iter().enumerate() {
            if ids.insert(label.clone(), VertexId(idx as u32)).is_some() {
                return Err(BayesError::invalid(format!(
                    "duplicate vertex '{}'",
                    label
                )));
            }
        }

        let primary = match &self.primary {
            None => VertexId(0),
            Some(label) => *ids.get(label).ok_or_else(|| {
                BayesError::invalid(format!("primary '{}' must be in the graph", label))
            })?,
        };

        let n = self.vertices.len();
        let mut network = Network {
            table: Arc::new(VertexTable {
                labels: self.vertices,
                ids,
            }),
            primary,
            children: vec![ChildList::new(); n],
            guard: self.guard,
        };

        match self.edges {
            None => {
                network.children[primary.index()] = network
                    .vertex_ids()
                    .filter(|&v| v != primary)
                    .collect();
            }
            Some(edges) => {
                for (parent, child) in &edges {
                    network.add_edge(parent, child)?;
                }
            }
        }

        Ok(network)
    }
}
