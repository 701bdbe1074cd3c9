use tracing::{debug, trace};

use crate::{
    algorithms::{Answer, Run, Witness},
    Cancel, Control, DepthFirst, DfsConfiguration, Hooks, Identity, Outcome, ReRooted, Reduce,
    RootedGraph, Traversal, Visited,
};

/// Emptiness check that searches for a cycle back to every accepting vertex right when
/// it is discovered. Each secondary search starts from scratch, so the check may take
/// time proportional to the number of accepting vertices times the size of the graph.
#[derive(Debug, Clone)]
pub struct NaiveNestedDfs<'g, G, P, R = Identity> {
    graph: &'g G,
    accepting: P,
    reduce: R,
}

impl<'g, G: RootedGraph, P> NaiveNestedDfs<'g, G, P>
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

impl<'g, G: RootedGraph, P, R> NaiveNestedDfs<'g, G, P, R> {
    /// Identifies vertices by their canonical form under `reduce`.
    pub fn with_reduction<S>(self, reduce: S) -> NaiveNestedDfs<'g, G, P, S> {
        NaiveNestedDfs {
            graph: self.graph,
            accepting: self.accepting,
            reduce,
        }
    }
}

/// Aborts a secondary search as soon as it discovers the seed again.
struct Closer<K, V> {
    seed: K,
    closing: Option<(Option<V>, V)>,
}

impl<C: Traversal + ?Sized> Hooks<C> for Closer<C::Key, C::Vertex> {
    fn on_entry(&mut self, source: Option<&C::Vertex>, target: &C::Vertex, search: &C) -> Control {
        if search.key(target) == self.seed {
            self.closing = Some((source.cloned(), target.clone()));
            Control::Abort
        } else {
            Control::Continue
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
    fn on_entry(&mut self, _source: Option<&G::Vertex>, target: &G::Vertex, search: &C) -> Control {
        if !(self.accepting)(target) {
            return Control::Continue;
        }
        self.launched += 1;
        trace!("searching a cycle through {:?}", target);

        let view = ReRooted::successors_of(self.graph, target.clone());
        let mut closer = Closer {
            seed: self.reduce.reduce(target),
            closing: None,
        };
        let known: Visited<R::Canonical> = Visited::for_graph(&view);
        let mut secondary = DfsConfiguration::with_parts(&view, self.reduce.clone(), known);
        match secondary.run(&mut closer, self.cancel) {
            Outcome::Exhausted => Control::Continue,
            Outcome::Cancelled => {
                self.cancelled = true;
                Control::Abort
            }
            Outcome::Aborted => {
                let Some((source, closing)) = closer.closing else {
                    return Control::Continue;
                };
                let mut trace = search.path();
                trace.push(target.clone());
                trace.extend(secondary.path());
                trace.push(closing.clone());
                let witness = Witness::Edge {
                    source: source.unwrap_or_else(|| target.clone()),
                    target: closing,
                };
                debug!("accepting cycle through {:?}", target);
                self.answer = Answer::violated(witness, trace);
                Control::Abort
            }
        }
    }
}

impl<'g, G, P, R> Run for NaiveNestedDfs<'g, G, P, R>
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
            "naive nested search ended {:?} after {} secondary searches",
            outcome, primary.launched
        );
        if primary.cancelled {
            Answer::satisfied()
        } else {
            primary.answer
        }
    }
}
