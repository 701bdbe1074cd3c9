use std::{fmt::Debug, hash::Hash};

use itertools::{Either, Itertools};
use tracing::{debug, trace};

use crate::{Cancel, Identity, KnownSet, Reduce, RootedGraph, Visited};

use super::{Control, DepthFirst, Hooks, Lookahead, Outcome, Traversal};

pub(super) type Successors<'g, G> =
    Either<<G as RootedGraph>::Roots<'g>, <G as RootedGraph>::Neighbours<'g>>;

/// An entry of the depth-first stack: a vertex together with the neighbours that have
/// not been looked at yet. The bottom frame has no vertex, its "neighbours" are the
/// roots of the graph.
pub struct Frame<'g, G: RootedGraph + 'g> {
    vertex: Option<G::Vertex>,
    successors: Lookahead<Successors<'g, G>>,
}

impl<'g, G: RootedGraph + 'g> Frame<'g, G> {
    pub(super) fn new(vertex: Option<G::Vertex>, successors: Successors<'g, G>) -> Self {
        Self {
            vertex,
            successors: Lookahead::new(successors),
        }
    }

    /// The vertex of this frame, `None` for the bottom frame.
    pub fn vertex(&self) -> Option<&G::Vertex> {
        self.vertex.as_ref()
    }

    /// The next neighbour that will be looked at.
    pub fn peek(&self) -> Option<&G::Vertex> {
        self.successors.peek()
    }

    pub(super) fn advance(&mut self) -> Option<G::Vertex> {
        self.successors.next()
    }
}

impl<'g, G> Clone for Frame<'g, G>
where
    G: RootedGraph + 'g,
    G::Roots<'g>: Clone,
    G::Neighbours<'g>: Clone,
{
    fn clone(&self) -> Self {
        Self {
            vertex: self.vertex.clone(),
            successors: self.successors.clone(),
        }
    }
}

impl<'g, G: RootedGraph + 'g> Debug for Frame<'g, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("vertex", &self.vertex)
            .field("next", &self.successors.peek())
            .finish()
    }
}

/// The action that a [`DfsConfiguration`] takes next.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DfsAction<V> {
    /// `target` is new and gets pushed on top of `source`.
    Unknown {
        /// The vertex on top of the stack, `None` if `target` is a root.
        source: Option<V>,
        /// The discovered vertex.
        target: V,
    },
    /// `target` has been discovered before and is skipped.
    Known {
        /// The vertex on top of the stack, `None` if `target` is a root.
        source: Option<V>,
        /// The already known vertex.
        target: V,
    },
    /// All neighbours of the vertex on top of the stack are done, it gets popped.
    Backtrack(V),
    /// All roots are done, the bottom frame gets popped.
    End,
}

/// The state of a depth-first traversal: the stack of frames from the roots to the
/// current vertex, the canonical forms of all discovered vertices, and an optional
/// bound on the number of vertices on the stack.
///
/// A vertex is known exactly if it has been pushed at least once, and the stack always
/// holds the path along which the top vertex was discovered. Once the stack is empty
/// the traversal is over.
pub struct DfsConfiguration<
    'g,
    G: RootedGraph,
    R = Identity,
    K = Visited<<G as RootedGraph>::Vertex>,
> {
    graph: &'g G,
    reduce: R,
    known: K,
    stack: Vec<Frame<'g, G>>,
    bound: Option<usize>,
}

impl<'g, G> DfsConfiguration<'g, G>
where
    G: RootedGraph,
    G::Vertex: Eq + Hash,
{
    /// Creates a traversal of `graph` which identifies vertices by equality. The
    /// known-set is chosen from the hints of the graph.
    pub fn new(graph: &'g G) -> Self {
        Self::with_parts(graph, Identity, Visited::for_graph(graph))
    }
}

impl<'g, G, R, K> DfsConfiguration<'g, G, R, K>
where
    G: RootedGraph,
    R: Reduce<G::Vertex>,
    K: KnownSet<R::Canonical>,
{
    /// Creates a traversal from its parts, seeded with the roots of `graph`.
    pub fn with_parts(graph: &'g G, reduce: R, known: K) -> Self {
        let mut configuration = Self {
            graph,
            reduce,
            known,
            stack: Vec::new(),
            bound: None,
        };
        configuration.restart();
        configuration
    }

    /// Limits the number of vertices on the stack to `bound`. Vertices further away from
    /// the roots are neither discovered nor counted as known.
    pub fn with_depth_bound(mut self, bound: usize) -> Self {
        self.bound = Some(bound);
        self
    }

    /// Sets an optional bound, see [`DfsConfiguration::with_depth_bound`].
    pub fn with_optional_bound(mut self, bound: Option<usize>) -> Self {
        self.bound = bound;
        self
    }

    /// Replaces the reduction. The traversal starts over with a fresh known-set.
    pub fn with_reduction<S>(self, reduce: S) -> DfsConfiguration<'g, G, S, Visited<S::Canonical>>
    where
        S: Reduce<G::Vertex>,
    {
        DfsConfiguration::with_parts(self.graph, reduce, Visited::for_graph(self.graph))
            .with_optional_bound(self.bound)
    }

    /// Replaces the known-set. The traversal starts over.
    pub fn with_known<L>(self, known: L) -> DfsConfiguration<'g, G, R, L>
    where
        L: KnownSet<R::Canonical>,
    {
        DfsConfiguration::with_parts(self.graph, self.reduce, known).with_optional_bound(self.bound)
    }

    /// Resets the stack to the bottom frame, asking the graph for its roots again. The
    /// known-set is kept.
    pub fn restart(&mut self) {
        self.stack.clear();
        self.stack
            .push(Frame::new(None, Either::Left(self.graph.roots())));
    }

    /// The explored graph.
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// The known-set.
    pub fn known(&self) -> &K {
        &self.known
    }

    /// Consumes the configuration and returns its known-set.
    pub fn into_known(self) -> K {
        self.known
    }

    /// The frames on the stack, from the bottom to the top.
    pub fn frames(&self) -> &[Frame<'g, G>] {
        &self.stack
    }

    /// The depth bound, if any.
    pub fn bound(&self) -> Option<usize> {
        self.bound
    }

    /// Returns `true` once the stack is empty.
    pub fn is_exhausted(&self) -> bool {
        self.stack.is_empty()
    }

    /// Returns `true` if the canonical form of `vertex` is known.
    pub fn knows(&self, vertex: &G::Vertex) -> bool {
        self.known.knows(&self.reduce.reduce(vertex))
    }

    fn within_bound(&self) -> bool {
        self.bound.map_or(true, |bound| self.stack.len() <= bound)
    }

    fn top_vertex(&self) -> Option<&G::Vertex> {
        self.stack.last().and_then(Frame::vertex)
    }

    /// Computes the enabled action without changing the configuration. Returns `None`
    /// once the traversal is over.
    pub fn action(&self) -> Option<DfsAction<G::Vertex>> {
        let frame = self.stack.last()?;
        if self.within_bound() {
            if let Some(target) = frame.peek() {
                let source = frame.vertex.clone();
                let target = target.clone();
                return Some(if self.knows(&target) {
                    DfsAction::Known { source, target }
                } else {
                    DfsAction::Unknown { source, target }
                });
            }
        }
        Some(match &frame.vertex {
            Some(vertex) => DfsAction::Backtrack(vertex.clone()),
            None => DfsAction::End,
        })
    }

    /// Executes `action`, which must be the action computed by
    /// [`DfsConfiguration::action`], firing the matching hook.
    pub fn execute<H>(&mut self, action: DfsAction<G::Vertex>, hooks: &mut H) -> Control
    where
        H: Hooks<Self> + ?Sized,
    {
        trace!("executing {:?}", action);
        match action {
            DfsAction::Known { source, target } => {
                self.advance();
                hooks.on_known(source.as_ref(), &target, self)
            }
            DfsAction::Unknown { source, target } => {
                self.advance();
                self.known.learn(self.reduce.reduce(&target));
                if hooks.on_entry(source.as_ref(), &target, self).is_abort() {
                    return Control::Abort;
                }
                self.push(target);
                Control::Continue
            }
            DfsAction::Backtrack(vertex) => match self.stack.pop() {
                Some(frame) => hooks.on_exit(&vertex, &frame, self),
                None => Control::Continue,
            },
            DfsAction::End => {
                self.stack.pop();
                Control::Continue
            }
        }
    }

    fn advance(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.successors.next();
        }
    }

    fn push(&mut self, vertex: G::Vertex) {
        let neighbours = self.graph.neighbours(&vertex);
        self.stack
            .push(Frame::new(Some(vertex), Either::Right(neighbours)));
    }

    /// Takes one step, firing the matching hook. Returns `None` if the traversal was
    /// already over, otherwise what the hook decided.
    pub fn step<H>(&mut self, hooks: &mut H) -> Option<Control>
    where
        H: Hooks<Self> + ?Sized,
    {
        let within = self.within_bound();
        let frame = self.stack.last_mut()?;
        let next = if within { frame.successors.next() } else { None };

        let Some(target) = next else {
            let frame = self.stack.pop()?;
            return Some(match frame.vertex() {
                Some(vertex) => {
                    trace!("backtracking from {:?}", vertex);
                    hooks.on_exit(vertex, &frame, self)
                }
                None => {
                    trace!("all roots are done");
                    Control::Continue
                }
            });
        };

        let key = self.reduce.reduce(&target);
        if self.known.knows(&key) {
            trace!("{:?} is already known", target);
            return Some(hooks.on_known(self.top_vertex(), &target, self));
        }

        trace!("discovered {:?}", target);
        self.known.learn(key);
        if hooks
            .on_entry(self.top_vertex(), &target, self)
            .is_abort()
        {
            return Some(Control::Abort);
        }
        self.push(target);
        Some(Control::Continue)
    }

    /// Drives the traversal to its end, polling `cancel` before every step.
    pub fn run<H>(&mut self, hooks: &mut H, cancel: &dyn Cancel) -> Outcome
    where
        H: Hooks<Self> + ?Sized,
    {
        loop {
            if cancel.is_cancelled() {
                debug!("depth-first traversal cancelled at depth {}", self.depth());
                return Outcome::Cancelled;
            }
            match self.step(hooks) {
                None => return Outcome::Exhausted,
                Some(Control::Abort) => return Outcome::Aborted,
                Some(Control::Continue) => {}
            }
        }
    }

    /// Like [`DfsConfiguration::run`], but takes the first step before polling `cancel`
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
                debug!("depth-first traversal cancelled at depth {}", self.depth());
                return Outcome::Cancelled;
            }
        }
    }

    /// Drives the traversal by materializing every action with
    /// [`DfsConfiguration::action`] and handing it to [`DfsConfiguration::execute`].
    pub fn run_stepping<H>(&mut self, hooks: &mut H, cancel: &dyn Cancel) -> Outcome
    where
        H: Hooks<Self> + ?Sized,
    {
        loop {
            if cancel.is_cancelled() {
                debug!("depth-first traversal cancelled at depth {}", self.depth());
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

impl<'g, G, R, K> Traversal for DfsConfiguration<'g, G, R, K>
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
        self.top_vertex()
    }

    fn discovered(&self) -> usize {
        self.known.len()
    }
}

impl<'g, G, R, K> DepthFirst for DfsConfiguration<'g, G, R, K>
where
    G: RootedGraph,
    R: Reduce<G::Vertex>,
    K: KnownSet<R::Canonical>,
{
    fn path(&self) -> Vec<G::Vertex> {
        self.stack
            .iter()
            .filter_map(|frame| frame.vertex.clone())
            .collect()
    }

    fn depth(&self) -> usize {
        self.stack
            .iter()
            .filter(|frame| frame.vertex.is_some())
            .count()
    }
}

impl<'g, G, R, K> Clone for DfsConfiguration<'g, G, R, K>
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
            stack: self.stack.clone(),
            bound: self.bound,
        }
    }
}

impl<'g, G: RootedGraph, R, K> Debug for DfsConfiguration<'g, G, R, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DFS [{}]",
            self.stack
                .iter()
                .filter_map(|frame| frame.vertex.as_ref())
                .map(|vertex| format!("{vertex:?}"))
                .join(" -> ")
        )?;
        if let Some(bound) = self.bound {
            write!(f, " bounded by {bound}")?;
        }
        Ok(())
    }
}
