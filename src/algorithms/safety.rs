use tracing::debug;

use crate::{
    Cancel, Control, DepthFirst, DfsConfiguration, Hooks, Identity, Reduce, RootedGraph, Visited,
};

use super::{Answer, Run, Witness};

/// Checks that no bad vertex is reachable from the roots of a graph.
///
/// The depth-first search stops at the first bad vertex it discovers. The trace of the
/// counterexample is the search path leading to it, the witness is the edge through
/// which it was discovered, or the vertex itself if it is a root.
#[derive(Debug, Clone)]
pub struct Safety<'g, G, P, R = Identity> {
    graph: &'g G,
    bad: P,
    reduce: R,
    bound: Option<usize>,
}

impl<'g, G: RootedGraph, P> Safety<'g, G, P>
where
    P: Fn(&G::Vertex) -> bool,
{
    /// Checks that no vertex of `graph` satisfying `bad` is reachable.
    pub fn new(graph: &'g G, bad: P) -> Self {
        Self {
            graph,
            bad,
            reduce: Identity,
            bound: None,
        }
    }
}

impl<'g, G: RootedGraph, P, R> Safety<'g, G, P, R> {
    /// Only considers paths with at most `bound` vertices.
    pub fn with_depth_bound(mut self, bound: usize) -> Self {
        self.bound = Some(bound);
        self
    }

    /// Identifies vertices by their canonical form under `reduce`.
    pub fn with_reduction<S>(self, reduce: S) -> Safety<'g, G, P, S> {
        Safety {
            graph: self.graph,
            bad: self.bad,
            reduce,
            bound: self.bound,
        }
    }
}

struct Detector<'p, P, V> {
    bad: &'p P,
    answer: Answer<V>,
}

impl<'p, C, P> Hooks<C> for Detector<'p, P, C::Vertex>
where
    C: DepthFirst + ?Sized,
    P: Fn(&C::Vertex) -> bool,
{
    fn on_entry(&mut self, source: Option<&C::Vertex>, target: &C::Vertex, search: &C) -> Control {
        if !(self.bad)(target) {
            return Control::Continue;
        }
        let witness = match source {
            Some(source) => Witness::Edge {
                source: source.clone(),
                target: target.clone(),
            },
            None => Witness::Vertex(target.clone()),
        };
        let mut trace = search.path();
        trace.push(target.clone());
        debug!(
            "bad vertex {:?} reached after {} steps",
            target,
            trace.len() - 1
        );
        self.answer = Answer::violated(witness, trace);
        Control::Abort
    }
}

impl<'g, G, P, R> Run for Safety<'g, G, P, R>
where
    G: RootedGraph,
    P: Fn(&G::Vertex) -> bool,
    R: Reduce<G::Vertex> + Clone,
{
    type Output = Answer<G::Vertex>;

    fn run(&self, cancel: &dyn Cancel) -> Self::Output {
        let mut detector = Detector {
            bad: &self.bad,
            answer: Answer::satisfied(),
        };
        let known: Visited<R::Canonical> = Visited::for_graph(self.graph);
        let outcome = DfsConfiguration::with_parts(self.graph, self.reduce.clone(), known)
            .with_optional_bound(self.bound)
            .run(&mut detector, cancel);
        debug!("safety check ended {:?}", outcome);
        detector.answer
    }
}
