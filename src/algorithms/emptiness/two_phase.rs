use tracing::{debug, trace};

use crate::{
    algorithms::{Answer, Run, Witness},
    Cancel, Control, DepthFirst, DfsConfiguration, Hooks, Identity, Outcome, ReRooted, Reduce,
    RootedGraph, Visited,
};

/// Emptiness check in two phases: an accepting vertex is checked for a cycle only after
/// the primary search has finished all its descendants. The secondary search is
/// rooted at the accepting vertex and stops at the first vertex with an edge back to
/// it, without entering the accepting vertex a second time. The trace ends with that
/// edge back to the accepting vertex.
#[derive(Debug, Clone)]
pub struct TwoPhaseNestedDfs<'g, G, P, R = Identity> {
    graph: &'g G,
    accepting: P,
    reduce: R,
}

impl<'g, G: RootedGraph, P> TwoPhaseNestedDfs<'g, G, P>
where
    P: Fn(&G::Vertex) -> bool,
{
    /// Checks `graph` for a reachable cycle through a vertex satisfying `accepting`.
    pub fn new(graph: &'g G, accepting: P) -> Self {
        Self {
            graph,
            accepting,
            reduce: Identity,
        }
    }
}

impl<'g, G: RootedGraph, P, R> TwoPhaseNestedDfs<'g, G, P, R> {
    /// Identifies vertices by their canonical form under `reduce`.
    pub fn with_reduction<S>(self, reduce: S) -> TwoPhaseNestedDfs<'g, G, P, S> {
        TwoPhaseNestedDfs {
            graph: self.graph,
            accepting: self.accepting,
            reduce,
        }
    }
}

/// Aborts a secondary search at the first vertex that has the seed as a neighbour.
struct BackEdge<'a, G: RootedGraph, R: Reduce<G::Vertex>> {
    graph: &'a G,
    reduce: &'a R,
    seed: R::Canonical,
    closing: Option<(G::Vertex, G::Vertex)>,
}

impl<'a, C, G, R> Hooks<C> for BackEdge<'a, G, R>
where
    C: DepthFirst<Vertex = G::Vertex> + ?Sized,
    G: RootedGraph,
    R: Reduce<G::Vertex>,
{
    fn on_entry(
        &mut self,
        _source: Option<&G::Vertex>,
        target: &G::Vertex,
        _search: &C,
    ) -> Control {
        let back = self
            .graph
            .neighbours(target)
            .find(|successor| self.reduce.reduce(successor) == self.seed);
        match back {
            Some(seed) => {
                self.closing = Some((target.clone(), seed));
                Control::Abort
            }
            None => Control::Continue,
        }
    }
}

struct Primary<'a, G: RootedGraph, P, R> {
    graph: &'a G,
    accepting: &'a P,
    reduce: &'a R,
    cancel: &'a dyn Cancel,
    answer: Answer<G::Vertex>,
    cancelled: bool,
    launched: usize,
}

impl<'a, C, G, P, R> Hooks<C> for Primary<'a, G, P, R>
where
    C: DepthFirst<Vertex = G::Vertex> + ?Sized,
    G: RootedGraph,
    P: Fn(&G::Vertex) -> bool,
    R: Reduce<G::Vertex> + Clone,
{
    fn on_exit(&mut self, vertex: &G::Vertex, _frame: &C::Frame, search: &C) -> Control {
        if !(self.accepting)(vertex) {
            return Control::Continue;
        }
        self.launched += 1;
        trace!("searching a way back to {:?}", vertex);

        let view = ReRooted::at(self.graph, vertex.clone());
        let mut back_edge = BackEdge {
            graph: self.graph,
            reduce: self.reduce,
            seed: self.reduce.reduce(vertex),
            closing: None,
        };
        let known: Visited<R::Canonical> = Visited::for_graph(&view);
        let mut secondary = DfsConfiguration::with_parts(&view, self.reduce.clone(), known);
        match secondary.run(&mut back_edge, self.cancel) {
            Outcome::Exhausted => Control::Continue,
            Outcome::Cancelled => {
                self.cancelled = true;
                Control::Abort
            }
            Outcome::Aborted => {
                let Some((source, target)) = back_edge.closing else {
                    return Control::Continue;
                };
                let mut trace = search.path();
                trace.extend(secondary.path());
                trace.push(source.clone());
                trace.push(target.clone());
                debug!(
                    "{:?} closes an accepting cycle through {:?}",
                    source, vertex
                );
                self.answer = Answer::violated(Witness::Edge { source, target }, trace);
                Control::Abort
            }
        }
    }
}

impl<'g, G, P, R> Run for TwoPhaseNestedDfs<'g, G, P, R>
where
    G: RootedGraph,
    P: Fn(&G::Vertex) -> bool,
    R: Reduce<G::Vertex> + Clone,
{
    type Output = Answer<G::Vertex>;

    fn run(&self, cancel: &dyn Cancel) -> Self::Output {
        let mut primary = Primary {
            graph: self.graph,
            accepting: &self.accepting,
            reduce: &self.reduce,
            cancel,
            answer: Answer::satisfied(),
            cancelled: false,
            launched: 0,
        };
        let known: Visited<R::Canonical> = Visited::for_graph(self.graph);
        let mut search = DfsConfiguration::with_parts(self.graph, self.reduce.clone(), known);
        let outcome = search.run(&mut primary, cancel);
        debug!(
            "two-phase nested search ended {:?} after {} secondary searches",
            outcome, primary.launched
        );
        if primary.cancelled {
            Answer::satisfied()
        } else {
            primary.answer
        }
    }
}
