use tracing::debug;

use crate::{
    BfsConfiguration, Cancel, Control, DfsConfiguration, Hooks, Identity, Outcome, Reduce,
    RootedGraph, Traversal, Visited,
};

use super::Run;

/// Collects the vertices reachable from the roots of a graph, in discovery order.
#[derive(Debug, Clone)]
pub struct Reachability<'g, G, R = Identity> {
    graph: &'g G,
    reduce: R,
    breadth_first: bool,
    bound: Option<usize>,
}

/// The vertices found by a [`Reachability`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reached<V> {
    /// The discovered vertices, one per canonical form, in discovery order.
    pub vertices: Vec<V>,
    /// `false` if the run was cancelled before the reachable part was exhausted.
    pub complete: bool,
}

impl<V: PartialEq> Reached<V> {
    /// Returns `true` if `vertex` was discovered.
    pub fn contains(&self, vertex: &V) -> bool {
        self.vertices.contains(vertex)
    }
}

impl<'g, G: RootedGraph> Reachability<'g, G> {
    /// Explores `graph` depth-first.
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            reduce: Identity,
            breadth_first: false,
            bound: None,
        }
    }
}

impl<'g, G: RootedGraph, R> Reachability<'g, G, R> {
    /// Explores level by level instead.
    pub fn breadth_first(mut self) -> Self {
        self.breadth_first = true;
        self
    }

    /// Only follows paths with at most `bound` vertices. Has no effect on a
    /// breadth-first exploration.
    pub fn with_depth_bound(mut self, bound: usize) -> Self {
        self.bound = Some(bound);
        self
    }

    /// Identifies vertices by their canonical form under `reduce`.
    pub fn with_reduction<S>(self, reduce: S) -> Reachability<'g, G, S> {
        Reachability {
            graph: self.graph,
            reduce,
            breadth_first: self.breadth_first,
            bound: self.bound,
        }
    }
}

struct Collect<V>(Vec<V>);

impl<C: Traversal + ?Sized> Hooks<C> for Collect<C::Vertex> {
    fn on_entry(
        &mut self,
        _source: Option<&C::Vertex>,
        target: &C::Vertex,
        _search: &C,
    ) -> Control {
        self.0.push(target.clone());
        Control::Continue
    }
}

impl<'g, G, R> Run for Reachability<'g, G, R>
where
    G: RootedGraph,
    R: Reduce<G::Vertex> + Clone,
{
    type Output = Reached<G::Vertex>;

    fn run(&self, cancel: &dyn Cancel) -> Self::Output {
        let mut collect = Collect(Vec::new());
        let known: Visited<R::Canonical> = Visited::for_graph(self.graph);
        let outcome = if self.breadth_first {
            BfsConfiguration::with_parts(self.graph, self.reduce.clone(), known)
                .run(&mut collect, cancel)
        } else {
            DfsConfiguration::with_parts(self.graph, self.reduce.clone(), known)
                .with_optional_bound(self.bound)
                .run(&mut collect, cancel)
        };
        debug!(
            "reachability found {} vertices, {:?}",
            collect.0.len(),
            outcome
        );
        Reached {
            vertices: collect.0,
            complete: outcome == Outcome::Exhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Reachability;
    use crate::{graph::samples, ReduceWith, Run, StepBudget};

    #[test]
    fn depth_and_breadth_first() {
        let graph = samples::two_roots_two_graphs();
        let dfs = Reachability::new(&graph).run_alone();
        assert_eq!(dfs.vertices, vec![1, 2, 3, 10, 11, 12]);
        assert!(dfs.complete);
        let bfs = Reachability::new(&graph).breadth_first().run_alone();
        assert_eq!(bfs.vertices, vec![1, 10, 2, 11, 3, 12]);
        assert!(bfs.contains(&12));
    }

    #[test]
    fn bounded_reduced_and_cancelled() {
        let graph = samples::two_roots_two_graphs();
        let bounded = Reachability::new(&graph).with_depth_bound(2).run_alone();
        assert_eq!(bounded.vertices, vec![1, 2, 10, 11]);

        let below_ten = Reachability::new(&graph)
            .with_reduction(ReduceWith(|v: &u32| *v < 10))
            .run_alone();
        assert_eq!(below_ten.vertices, vec![1, 10]);

        let cancelled = Reachability::new(&graph).run(&StepBudget::new(2));
        assert_eq!(cancelled.vertices, vec![1, 2]);
        assert!(!cancelled.complete);
    }
}
