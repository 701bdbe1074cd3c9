//! Small graphs that exercise the interesting corners of the traversal engines.

use std::cell::Cell;

use super::{Adjacency, RootedGraph};

/// A single root on a three-cycle: `1 -> 2 -> 3 -> 1`.
pub fn root_cycle_3() -> Adjacency<u32> {
    Adjacency::from_edges([1], [(1, 2), (2, 3), (3, 1)])
}

/// Two disconnected components with one root each. The first, rooted at `1`, ends in
/// the cycle `2 <-> 3`; the second, rooted at `10`, is the chain `10 -> 11 -> 12`.
pub fn two_roots_two_graphs() -> Adjacency<u32> {
    Adjacency::from_edges([1, 10], [(1, 2), (2, 3), (3, 2), (10, 11), (11, 12)])
}

/// The cycle `1 -> 2 -> 3 -> 1` together with the detour `1 -> 4 -> 5 -> 2` which
/// shares the vertex `2` with it.
pub fn sharing_2() -> Adjacency<u32> {
    Adjacency::from_edges([1], [(1, 2), (1, 4), (2, 3), (3, 1), (4, 5), (5, 2)])
}

/// An acyclic diamond `1 -> {2, 3} -> 4`.
pub fn diamond() -> Adjacency<u32> {
    Adjacency::from_edges([1], [(1, 2), (1, 3), (2, 4), (3, 4)]).with_hints(false, true)
}

/// A binary tree of the given height whose vertices are numbered in heap order.
pub fn binary_tree(height: u32) -> Adjacency<u32> {
    let mut graph = Adjacency::new([1]);
    let inner = (1u32 << height.saturating_sub(1)).saturating_sub(1);
    for v in 1..=inner {
        graph.add_edge(v, 2 * v);
        graph.add_edge(v, 2 * v + 1);
    }
    graph.with_hints(false, false)
}

/// The infinite chain `0 -> 1 -> 2 -> ...` which turns into a sink after its
/// neighbours have been requested a fixed number of times.
#[derive(Debug)]
pub struct SinkAfter {
    calls: Cell<usize>,
    limit: usize,
}

/// Creates a [`SinkAfter`] chain that answers `limit` neighbour requests.
pub fn sink_after(limit: usize) -> SinkAfter {
    SinkAfter {
        calls: Cell::new(0),
        limit,
    }
}

impl SinkAfter {
    /// The number of neighbour requests seen so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl RootedGraph for SinkAfter {
    type Vertex = u64;

    type Roots<'a> = std::iter::Once<u64>;

    type Neighbours<'a> = std::option::IntoIter<u64>;

    fn roots(&self) -> Self::Roots<'_> {
        std::iter::once(0)
    }

    fn neighbours(&self, vertex: &u64) -> Self::Neighbours<'_> {
        let calls = self.calls.get();
        self.calls.set(calls + 1);
        if calls < self.limit {
            Some(vertex + 1).into_iter()
        } else {
            None.into_iter()
        }
    }

    fn has_cycles(&self) -> bool {
        false
    }

    fn has_sharing(&self) -> bool {
        false
    }
}
