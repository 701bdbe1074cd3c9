use std::{collections::VecDeque, fmt::Debug, hash::Hash};

use crate::{Map, Set};

mod views;
pub use views::{FnGraph, ReRooted};

pub mod samples;

/// An implicit graph that is only ever explored, never materialized. It exposes its
/// roots and, for a given vertex, a freshly produced sequence of neighbours. Both
/// sequences may be empty or infinite, and calling [`RootedGraph::roots`] again
/// restarts the root sequence.
///
/// Equality of vertices is whatever the caller decides; the traversal engines only
/// compare canonical forms obtained through a [`crate::Reduce`].
pub trait RootedGraph {
    /// The type of vertices.
    type Vertex: Clone + Debug;

    /// Iterator over the roots of the graph.
    type Roots<'a>: Iterator<Item = Self::Vertex>
    where
        Self: 'a;

    /// Iterator over the neighbours of a vertex.
    type Neighbours<'a>: Iterator<Item = Self::Vertex>
    where
        Self: 'a;

    /// Returns the roots of the graph. Called once per traversal start.
    fn roots(&self) -> Self::Roots<'_>;

    /// Returns the neighbours of `vertex`.
    fn neighbours(&self, vertex: &Self::Vertex) -> Self::Neighbours<'_>;

    /// Hint whether the graph may contain cycles. Graphs without cycles and without
    /// sharing are trees, for which no known-set needs to be kept.
    fn has_cycles(&self) -> bool {
        true
    }

    /// Hint whether a vertex may be reached along more than one path.
    fn has_sharing(&self) -> bool {
        true
    }
}

impl<G: RootedGraph + ?Sized> RootedGraph for &G {
    type Vertex = G::Vertex;

    type Roots<'a> = G::Roots<'a>
    where
        Self: 'a;

    type Neighbours<'a> = G::Neighbours<'a>
    where
        Self: 'a;

    fn roots(&self) -> Self::Roots<'_> {
        G::roots(self)
    }

    fn neighbours(&self, vertex: &Self::Vertex) -> Self::Neighbours<'_> {
        G::neighbours(self, vertex)
    }

    fn has_cycles(&self) -> bool {
        G::has_cycles(self)
    }

    fn has_sharing(&self) -> bool {
        G::has_sharing(self)
    }
}

/// An explicitly stored finite graph. Neighbours are returned in the order in which
/// the edges were added, which makes traversal orders predictable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency<V: Eq + Hash> {
    roots: Vec<V>,
    vertices: Vec<V>,
    edges: Map<V, Vec<V>>,
    cycles: bool,
    sharing: bool,
}

impl<V: Clone + Eq + Hash> Adjacency<V> {
    /// Creates a graph with the given roots and no edges.
    pub fn new<I: IntoIterator<Item = V>>(roots: I) -> Self {
        let mut graph = Self {
            roots: Vec::new(),
            vertices: Vec::new(),
            edges: Map::default(),
            cycles: true,
            sharing: true,
        };
        for root in roots {
            graph.add_root(root);
        }
        graph
    }

    /// Creates a graph from its roots and a list of edges.
    pub fn from_edges<R, E>(roots: R, edges: E) -> Self
    where
        R: IntoIterator<Item = V>,
        E: IntoIterator<Item = (V, V)>,
    {
        let mut graph = Self::new(roots);
        for (source, target) in edges {
            graph.add_edge(source, target);
        }
        graph
    }

    /// Declares the graph as acyclic and/or free of sharing.
    pub fn with_hints(mut self, cycles: bool, sharing: bool) -> Self {
        self.cycles = cycles;
        self.sharing = sharing;
        self
    }

    fn touch(&mut self, vertex: &V) {
        if !self.edges.contains_key(vertex) {
            self.edges.insert(vertex.clone(), Vec::new());
            self.vertices.push(vertex.clone());
        }
    }

    /// Adds a root. Adding the same root twice makes it appear twice in [`RootedGraph::roots`].
    pub fn add_root(&mut self, root: V) {
        self.touch(&root);
        self.roots.push(root);
    }

    /// Adds an edge from `source` to `target`.
    pub fn add_edge(&mut self, source: V, target: V) {
        self.touch(&target);
        self.touch(&source);
        if let Some(targets) = self.edges.get_mut(&source) {
            targets.push(target);
        }
    }

    /// All vertices that occur in the graph, in the order they were first mentioned.
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    /// The number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Returns `true` if `target` is a direct successor of `source`.
    pub fn has_edge(&self, source: &V, target: &V) -> bool {
        self.edges
            .get(source)
            .map(|targets| targets.contains(target))
            .unwrap_or(false)
    }

    /// The set of vertices reachable from `origin` by a path of length zero or more.
    pub fn reachable_from(&self, origin: &V) -> Set<V> {
        let mut seen: Set<V> = Set::default();
        let mut queue = VecDeque::from([origin.clone()]);
        seen.insert(origin.clone());
        while let Some(vertex) = queue.pop_front() {
            for target in self.edges.get(&vertex).into_iter().flatten() {
                if seen.insert(target.clone()) {
                    queue.push_back(target.clone());
                }
            }
        }
        seen
    }
}

impl<V: Clone + Debug + Eq + Hash> RootedGraph for Adjacency<V> {
    type Vertex = V;

    type Roots<'a> = std::iter::Cloned<std::slice::Iter<'a, V>>
    where
        Self: 'a;

    type Neighbours<'a> = std::iter::Cloned<std::slice::Iter<'a, V>>
    where
        Self: 'a;

    fn roots(&self) -> Self::Roots<'_> {
        self.roots.iter().cloned()
    }

    fn neighbours(&self, vertex: &V) -> Self::Neighbours<'_> {
        self.edges
            .get(vertex)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .cloned()
    }

    fn has_cycles(&self) -> bool {
        self.cycles
    }

    fn has_sharing(&self) -> bool {
        self.sharing
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    use super::{samples, Adjacency, RootedGraph};

    #[test]
    fn adjacency_keeps_edge_order() {
        let graph = Adjacency::from_edges([0], [(0, 2), (0, 1), (1, 3)]);
        assert_eq!(graph.roots().collect_vec(), vec![0]);
        assert_eq!(graph.neighbours(&0).collect_vec(), vec![2, 1]);
        assert_eq!(graph.neighbours(&2).collect_vec(), Vec::<i32>::new());
        assert_eq!(graph.neighbours(&42).collect_vec(), Vec::<i32>::new());
        assert_eq!(graph.vertices(), &[0, 2, 1, 3]);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn reachability_closure() {
        let graph = samples::two_roots_two_graphs();
        let from_one = graph.reachable_from(&1);
        assert!(from_one.contains(&3));
        assert!(!from_one.contains(&10));
        assert!(graph.has_edge(&3, &2));
        assert!(!graph.has_edge(&2, &1));
    }

    #[test]
    fn references_are_graphs() {
        let graph = samples::root_cycle_3();
        let by_ref = &graph;
        assert_eq!(by_ref.neighbours(&3).collect_vec(), vec![1]);
        assert!(by_ref.has_cycles());
    }
}
