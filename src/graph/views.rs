use std::fmt::Debug;

use itertools::Either;

use super::RootedGraph;

/// A [`RootedGraph`] given by two closures, one producing the roots and one producing
/// the neighbours of a vertex. Useful for infinite or generator-style graphs.
#[derive(Clone)]
pub struct FnGraph<R, N> {
    roots: R,
    neighbours: N,
    cycles: bool,
    sharing: bool,
}

impl<R, N> FnGraph<R, N> {
    /// Creates a graph from a root producer and a neighbour function.
    pub fn new(roots: R, neighbours: N) -> Self {
        Self {
            roots,
            neighbours,
            cycles: true,
            sharing: true,
        }
    }

    /// Declares the graph as acyclic and/or free of sharing.
    pub fn with_hints(mut self, cycles: bool, sharing: bool) -> Self {
        self.cycles = cycles;
        self.sharing = sharing;
        self
    }
}

impl<V, IR, IN, R, N> RootedGraph for FnGraph<R, N>
where
    V: Clone + Debug,
    R: Fn() -> IR,
    IR: IntoIterator<Item = V>,
    N: Fn(&V) -> IN,
    IN: IntoIterator<Item = V>,
{
    type Vertex = V;

    type Roots<'a> = IR::IntoIter
    where
        Self: 'a;

    type Neighbours<'a> = IN::IntoIter
    where
        Self: 'a;

    fn roots(&self) -> Self::Roots<'_> {
        (self.roots)().into_iter()
    }

    fn neighbours(&self, vertex: &V) -> Self::Neighbours<'_> {
        (self.neighbours)(vertex).into_iter()
    }

    fn has_cycles(&self) -> bool {
        self.cycles
    }

    fn has_sharing(&self) -> bool {
        self.sharing
    }
}

impl<R, N> Debug for FnGraph<R, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnGraph")
            .field("cycles", &self.cycles)
            .field("sharing", &self.sharing)
            .finish_non_exhaustive()
    }
}

/// A view on a graph that replaces its roots, either by a single seed vertex or by the
/// neighbours of a seed vertex. Secondary searches of the nested depth-first checks
/// run on such views.
#[derive(Debug, Clone)]
pub struct ReRooted<G: RootedGraph> {
    graph: G,
    seed: G::Vertex,
    successors: bool,
}

impl<G: RootedGraph> ReRooted<G> {
    /// The view whose only root is `seed`.
    pub fn at(graph: G, seed: G::Vertex) -> Self {
        Self {
            graph,
            seed,
            successors: false,
        }
    }

    /// The view whose roots are the neighbours of `seed`, so `seed` itself is only
    /// reached again if it lies on a cycle.
    pub fn successors_of(graph: G, seed: G::Vertex) -> Self {
        Self {
            graph,
            seed,
            successors: true,
        }
    }

    /// The vertex the view is rooted at.
    pub fn seed(&self) -> &G::Vertex {
        &self.seed
    }
}

impl<G: RootedGraph> RootedGraph for ReRooted<G> {
    type Vertex = G::Vertex;

    type Roots<'a> = Either<std::iter::Once<G::Vertex>, G::Neighbours<'a>>
    where
        Self: 'a;

    type Neighbours<'a> = G::Neighbours<'a>
    where
        Self: 'a;

    fn roots(&self) -> Self::Roots<'_> {
        if self.successors {
            Either::Right(self.graph.neighbours(&self.seed))
        } else {
            Either::Left(std::iter::once(self.seed.clone()))
        }
    }

    fn neighbours(&self, vertex: &Self::Vertex) -> Self::Neighbours<'_> {
        self.graph.neighbours(vertex)
    }

    fn has_cycles(&self) -> bool {
        self.graph.has_cycles()
    }

    fn has_sharing(&self) -> bool {
        self.graph.has_sharing()
    }
}
