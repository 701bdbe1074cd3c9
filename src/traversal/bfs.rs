use std::{collections::VecDeque, fmt::Debug, hash::Hash};

use itertools::{Either, Itertools};
use tracing::{debug, trace};

use crate::{Cancel, Identity, KnownSet, Reduce, RootedGraph, Visited};

use super::{dfs::Frame, Control, Hooks, Outcome, Traversal};

/// The action that a [`BfsConfiguration`] takes next.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BfsAction<V> {
    /// `target` is new and gets enqueued.
    Unknown {
        /// The vertex being expanded, `None` if `target` is a root.
        source: Option<V>,
        /// The discovered vertex.
        target: V,
    },
    /// `target` has been discovered before and is skipped.
    Known {
        /// The vertex being expanded, `None` if `target` is a root.
        source: Option<V>,
        /// The already known vertex.
        target: V,
    },
    /// The neighbours of the vertex being expanded are done, the front of the frontier is
    /// expanded next.
    Expand(V),
    /// The frontier is empty and the last expansion is done.
    End,
}

/// The state of a breadth-first traversal: the frontier of discovered but not yet
/// expanded vertices, the canonical forms of all discovered vertices, and the remaining
/// neighbours of the vertex being expanded.
pub struct BfsConfiguration<
    'g,
    G: RootedGraph,
    R = Identity,
    K = Visited<<G as RootedGraph>::Vertex>,
> {
    graph: &'g G,
    reduce: R,
    known: K,
    frontier: VecDeque<G::Vertex>,
    expanding: Option<Frame<'g, G>>,
}

impl<'g, G> BfsConfiguration<'g, G>
where
    G: RootedGraph,
    G::Vertex: Eq + Hash,
{
    /// Creates a traversal of `graph` which identifies vertices by equality.
    pub fn new(graph: &'g G) -> Self {
        Self::with_parts(graph, Identity, Visited::for_graph(graph))
    }
}

impl<'g, G, R, K> BfsConfiguration<'g, G, R, K>
where
    G: RootedGraph,
    R: Reduce<G::Vertex>,
    K: KnownSet<R::Canonical>,
{
    /// Creates a traversal from its parts, expanding the roots of `graph` first.
    pub fn with_parts(graph: &'g G, reduce: R, known: K) -> Self {
        Self {
            graph,
            reduce,
            known,
            frontier: VecDeque::new(),
            expanding: Some(Frame::new(None, Either::Left(graph.roots()))),
        }
    }

    /// Replaces the reduction. The traversal starts over with a fresh known-set.
    pub fn with_reduction<S>(self, reduce: S) -> BfsConfiguration<'g, G, S, Visited<S::Canonical>>
    where
        S: Reduce<G::Vertex>,
    {
        BfsConfiguration::with_parts(self.graph, reduce, Visited::for_graph(self.graph))
    }

    /// Replaces the known-set. The traversal starts over.
    pub fn with_known<L>(self, known: L) -> BfsConfiguration<'g, G, R, L>
    where
        L: KnownSet<R::Canonical>,
    {
        BfsConfiguration::with_parts(self.graph, self.reduce, known)
    }

    /// The explored graph.
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// The known-set.
    pub fn known(&self) -> &K {
        &self.known
    }

    /// The discovered vertices that still wait for their expansion.
    pub fn frontier(&self) -> &VecDeque<G::Vertex> {
        &self.frontier
    }

    /// Returns `true` once the frontier and the last expansion are done.
    pub fn is_exhausted(&self) -> bool {
        self.expanding.is_none()
    }

    /// Returns `true` if the canonical form of `vertex` is known.
    pub fn knows(&self, vertex: &G::Vertex) -> bool {
        self.known.knows(&self.reduce.reduce(vertex))
    }

    /// Computes the enabled action without changing the configuration.
    pub fn action(&self) -> Option<BfsAction<G::Vertex>> {
        let frame = self.expanding.as_ref()?;
        if let Some(target) = frame.peek() {
            let source = frame.vertex().cloned();
            let target = target.clone();
            return Some(if self.knows(&target) {
                BfsAction::Known { source, target }
            } else {
                BfsAction::Unknown { source, target }
            });
        }
        Some(match self.frontier.front() {
            Some(next) => BfsAction::Expand(next.clone()),
            None => BfsAction::End,
        })
    }

    /// Executes `action`, which must be the action computed by
    /// [`BfsConfiguration::action`], firing the matching hook.
    ///
    /// Finishing the expansion of a vertex fires its exit hook right after the next
    /// vertex has been taken from the frontier.
    pub fn execute<H>(&mut self, action: BfsAction<G::Vertex>, hooks: &mut H) -> Control
    where
        H: Hooks<Self> + ?Sized,
    {
        trace!("executing {:?}", action);
        match action {
            BfsAction::Known { source, target } => {
                self.advance();
                hooks.on_known(source.as_ref(), &target, self)
            }
            BfsAction::Unknown { source, target } => {
                self.advance();
                self.known.learn(self.reduce.reduce(&target));
                if hooks.on_entry(source.as_ref(), &target, self).is_abort() {
                    return Control::Abort;
                }
                self.frontier.push_back(target);
                Control::Continue
            }
            BfsAction::Expand(_) => match self.frontier.pop_front() {
                Some(next) => self.expand(Some(next), hooks),
                None => self.expand(None, hooks),
            },
            BfsAction::End => self.expand(None, hooks),
        }
    }

    fn advance(&mut self) {
        if let Some(frame) = self.expanding.as_mut() {
            frame.advance();
        }
    }

    fn expand<H>(&mut self, next: Option<G::Vertex>, hooks: &mut H) -> Control
    where
        H: Hooks<Self> + ?Sized,
    {
        let finished = match next {
            Some(vertex) => {
                let neighbours = self.graph.neighbours(&vertex);
                self.expanding
                    .replace(Frame::new(Some(vertex), Either::Right(neighbours)))
            }
            None => self.expanding.take(),
        };
        match &finished {
            Some(frame) => match frame.vertex() {
                Some(vertex) => hooks.on_exit(vertex, frame, self),
                None => Control::Continue,
            },
            None => Control::Continue,
        }
    }

    /// Takes one step, firing the matching hook. Returns `None` if the traversal was
    /// already over.
    pub fn step<H>(&mut self, hooks: &mut H) -> Option<Control>
    where
        H: Hooks<Self> + ?Sized,
    {
        let frame = self.expanding.as_mut()?;
        let Some(target) = frame.advance() else {
            let next = self.frontier.pop_front();
            return Some(self.expand(next, hooks));
        };

        let key = self.reduce.reduce(&target);
        if self.known.knows(&key) {
            trace!("{:?} is already known", target);
            return Some(hooks.on_known(self.current(), &target, self));
        }

        trace!("discovered {:?}", target);
        self.known.learn(key);
        if hooks.on_entry(self.current(), &target, self).is_abort() {
            return Some(Control::Abort);
        }
        self.frontier.push_back(target);
        Some(Control::Continue)
    }

    /// Drives the traversal to its end, polling `cancel` before every step.
    pub fn run<H>(&mut self, hooks: &mut H, cancel: &dyn Cancel) -> Outcome
    where
        H: Hooks<Self> + ?Sized,
    {
        loop {
            if cancel.is_cancelled() {
                debug!(
                    "breadth-first traversal cancelled with {} vertices in the frontier",
                    self.frontier.len()
                );
                return Outcome::Cancelled;
            }
            match self.step(hooks) {
                None => return Outcome::Exhausted,
                Some(Control::Abort) => return Outcome::Aborted,
                Some(Control::Continue) => {}
            }
        }
    }

    /// Like [`BfsConfiguration::run`], but takes the first step before polling `cancel`
    /// for the first time and polls after every step instead.
    pub fn run_eager<H>(&mut self, hooks: &mut H, cancel: &dyn Cancel) -> Outcome
    where
        H: Hooks<Self> + ?Sized,
    {
        loop {
            match self.step(hooks) {
                None => return Outcome::Exhausted,
                Some(Control::Abort) => return Outcome::Aborted,
                Some(Control::Continue) => {}
            }
            if self.is_exhausted() {
                return Outcome::Exhausted;
            }
            if cancel.is_cancelled() {
                debug!(
                    "breadth-first traversal cancelled with {} vertices in the frontier",
                    self.frontier.len()
                );
                return Outcome::Cancelled;
            }
        }
    }

    /// Drives the traversal through materialized [`BfsAction`]s.
    pub fn run_stepping<H>(&mut self, hooks: &mut H, cancel: &dyn Cancel) -> Outcome
    where
        H: Hooks<Self> + ?Sized,
    {
        loop {
            if cancel.is_cancelled() {
                debug!(
                    "breadth-first traversal cancelled with {} vertices in the frontier",
                    self.frontier.len()
                );
                return Outcome::Cancelled;
            }
            let Some(action) = self.action() else {
                return Outcome::Exhausted;
            };
            if self.execute(action, hooks).is_abort() {
                return Outcome::Aborted;
            }
        }
    }
}

impl<'g, G, R, K> Traversal for BfsConfiguration<'g, G, R, K>
where
    G: RootedGraph,
    R: Reduce<G::Vertex>,
    K: KnownSet<R::Canonical>,
{
    type Vertex = G::Vertex;
    type Key = R::Canonical;
    type Frame = Frame<'g, G>;

    fn key(&self, vertex: &G::Vertex) -> R::Canonical {
        self.reduce.reduce(vertex)
    }

    fn current(&self) -> Option<&G::Vertex> {
        self.expanding.as_ref().and_then(Frame::vertex)
    }

    fn discovered(&self) -> usize {
        self.known.len()
    }
}

impl<'g, G, R, K> Clone for BfsConfiguration<'g, G, R, K>
where
    G: RootedGraph,
    G::Roots<'g>: Clone,
    G::Neighbours<'g>: Clone,
    R: Clone,
    K: Clone,
{
    fn clone(&self) -> Self {
        Self {
            graph: self.graph,
            reduce: self.reduce.clone(),
            known: self.known.clone(),
            frontier: self.frontier.clone(),
            expanding: self.expanding.clone(),
        }
    }
}

impl<'g, G: RootedGraph, R, K> Debug for BfsConfiguration<'g, G, R, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BFS expanding {:?}, frontier [{}]",
            self.expanding.as_ref().and_then(Frame::vertex),
            self.frontier.iter().map(|v| format!("{v:?}")).join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::{BfsAction, BfsConfiguration};
    use crate::{
        graph::samples,
        traversal::{
            testing::{Event, Recorder},
            DfsConfiguration, Outcome, Traversal,
        },
        Never, StepBudget,
    };

    #[test]
    #[traced_test]
    fn level_order_with_sharing() {
        let graph = samples::sharing_2();
        let mut bfs = BfsConfiguration::new(&graph);
        let mut recorder = Recorder::default();
        assert_eq!(bfs.run(&mut recorder, &Never), Outcome::Exhausted);
        use Event::*;
        assert_eq!(
            recorder.events,
            vec![
                Entry(None, 1),
                Entry(Some(1), 2),
                Entry(Some(1), 4),
                Exit(1),
                Entry(Some(2), 3),
                Exit(2),
                Entry(Some(4), 5),
                Exit(4),
                Known(Some(3), 1),
                Exit(3),
                Known(Some(5), 2),
                Exit(5),
            ]
        );
        assert!(bfs.is_exhausted());
        assert_eq!(bfs.current(), None);
    }

    #[test]
    fn actions_match_steps() {
        let graph = samples::two_roots_two_graphs();
        let mut bfs = BfsConfiguration::new(&graph);
        let mut actions = vec![];
        while let Some(action) = bfs.action() {
            actions.push(action.clone());
            bfs.execute(action, &mut ());
        }
        assert_eq!(
            actions.first(),
            Some(&BfsAction::Unknown {
                source: None,
                target: 1,
            })
        );
        assert_eq!(actions.get(2), Some(&BfsAction::Expand(1)));
        assert_eq!(actions.last(), Some(&BfsAction::End));

        let mut stepping = Recorder::default();
        BfsConfiguration::new(&graph).run_stepping(&mut stepping, &Never);
        let mut polling = Recorder::default();
        BfsConfiguration::new(&graph).run(&mut polling, &Never);
        let mut eager = Recorder::default();
        BfsConfiguration::new(&graph).run_eager(&mut eager, &Never);
        assert_eq!(stepping.events, polling.events);
        assert_eq!(eager.events, polling.events);
        assert_eq!(polling.discoveries(), vec![1, 10, 2, 11, 3, 12]);
    }

    #[test]
    #[traced_test]
    fn stepping_driver_logs_cancellation() {
        let graph = samples::sharing_2();
        assert_eq!(
            BfsConfiguration::new(&graph).run_stepping(&mut (), &StepBudget::new(3)),
            Outcome::Cancelled
        );
        assert!(logs_contain("cancelled with"));
    }

    #[test]
    fn same_known_set_as_depth_first() {
        let graph = samples::sharing_2();
        let mut bfs = BfsConfiguration::new(&graph);
        bfs.run(&mut (), &Never);
        let mut dfs = DfsConfiguration::new(&graph);
        dfs.run(&mut (), &Never);
        assert_eq!(bfs.known().remembered(), dfs.known().remembered());
    }

    #[test]
    fn abort_and_cancel() {
        let graph = samples::sharing_2();
        let mut bfs = BfsConfiguration::new(&graph);
        let mut recorder = Recorder {
            abort_on: Some(4),
            ..Default::default()
        };
        assert_eq!(bfs.run(&mut recorder, &Never), Outcome::Aborted);
        assert_eq!(bfs.current(), Some(&1));
        assert_eq!(bfs.frontier().iter().copied().collect::<Vec<_>>(), vec![2]);

        let mut bfs = BfsConfiguration::new(&graph);
        assert_eq!(bfs.run(&mut (), &StepBudget::new(2)), Outcome::Cancelled);
        assert_eq!(bfs.discovered(), 1);
    }
}
