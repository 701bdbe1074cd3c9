use std::hash::Hash;

use tracing::{debug, trace};

use crate::{
    algorithms::{Answer, Run, Witness},
    Cancel, Control, DepthFirst, DfsConfiguration, Hooks, Identity, KnownSet, Map, Outcome,
    ReRooted, Reduce, RootedGraph, Set, Traversal,
};

/// Emptiness check with a coloring that persists across all secondary searches.
///
/// The primary (blue) search colors a vertex cyan while it is on the search stack and
/// blue once it is finished. When an accepting vertex is finished, a secondary (red)
/// search walks through blue vertices, turning them red; reaching a cyan vertex closes
/// an accepting cycle. Red vertices are never explored again, so all red searches
/// together visit every vertex at most once.
///
/// Every cyan vertex also records how many accepting vertices lie on the search stack
/// up to and including it. With early detection, which is on by default, the blue
/// search reports a cycle as soon as it follows an edge back to a cyan vertex that is
/// accepting or below an accepting vertex on the stack.
#[derive(Debug, Clone)]
pub struct ColoredNestedDfs<'g, G, P, R = Identity> {
    graph: &'g G,
    accepting: P,
    reduce: R,
    early: bool,
}

impl<'g, G: RootedGraph, P> ColoredNestedDfs<'g, G, P>
where
    P: Fn(&G::Vertex) -> bool,
{
    /// Checks `graph` for a reachable cycle through a vertex satisfying `accepting`.
    pub fn new(graph: &'g G, accepting: P) -> Self {
        Self {
            graph,
            accepting,
            reduce: Identity,
            early: true,
        }
    }
}

impl<'g, G: RootedGraph, P, R> ColoredNestedDfs<'g, G, P, R> {
    /// Identifies vertices by their canonical form under `reduce`.
    pub fn with_reduction<S>(self, reduce: S) -> ColoredNestedDfs<'g, G, P, S> {
        ColoredNestedDfs {
            graph: self.graph,
            accepting: self.accepting,
            reduce,
            early: self.early,
        }
    }

    /// Switches the detection of accepting cycles by the blue search on or off.
    pub fn with_early_detection(mut self, early: bool) -> Self {
        self.early = early;
        self
    }
}

/// The color of a vertex. Vertices without a color are white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Color {
    Cyan,
    Blue,
    Red,
}

/// The colors and weights of all vertices seen so far.
#[derive(Debug)]
struct Palette<K> {
    colors: Map<K, (Color, usize)>,
}

impl<K: Eq + Hash> Palette<K> {
    fn color(&self, key: &K) -> Option<Color> {
        self.colors.get(key).map(|(color, _)| *color)
    }

    fn weight(&self, key: &K) -> usize {
        self.colors.get(key).map_or(0, |(_, weight)| *weight)
    }

    fn paint(&mut self, key: K, color: Color) {
        self.colors
            .entry(key)
            .and_modify(|(old, _)| {
                // red is final
                if *old != Color::Red {
                    *old = color
                }
            })
            .or_insert((color, 0));
    }
}

/// The known-set of a red search: every vertex that is not blue counts as known, and
/// discovering a vertex turns it red.
struct RedView<'p, K> {
    palette: &'p mut Palette<K>,
    painted: usize,
}

impl<'p, K: Eq + Hash> KnownSet<K> for RedView<'p, K> {
    fn knows(&self, key: &K) -> bool {
        self.palette.color(key) != Some(Color::Blue)
    }

    fn learn(&mut self, key: K) -> bool {
        self.palette.paint(key, Color::Red);
        self.painted += 1;
        true
    }

    fn len(&self) -> usize {
        self.painted
    }
}

/// Aborts a red search when it follows an edge to a cyan vertex.
struct Red<V> {
    seed: V,
    closing: Option<(V, V)>,
}

impl<'v, 'p, H, R> Hooks<DfsConfiguration<'v, H, R, RedView<'p, R::Canonical>>> for Red<H::Vertex>
where
    H: RootedGraph,
    R: Reduce<H::Vertex>,
{
    fn on_known(
        &mut self,
        source: Option<&H::Vertex>,
        target: &H::Vertex,
        search: &DfsConfiguration<'v, H, R, RedView<'p, R::Canonical>>,
    ) -> Control {
        let key = search.key(target);
        if search.known().palette.color(&key) != Some(Color::Cyan) {
            return Control::Continue;
        }
        let source = source.cloned().unwrap_or_else(|| self.seed.clone());
        self.closing = Some((source, target.clone()));
        Control::Abort
    }
}

struct Blue<'a, G: RootedGraph, P, R: Reduce<G::Vertex>> {
    graph: &'a G,
    accepting: &'a P,
    reduce: &'a R,
    cancel: &'a dyn Cancel,
    early: bool,
    palette: Palette<R::Canonical>,
    answer: Answer<G::Vertex>,
    cancelled: bool,
    launched: usize,
}

impl<'a, G, P, R> Blue<'a, G, P, R>
where
    G: RootedGraph,
    R: Reduce<G::Vertex> + Clone,
{
    /// Runs a red search from the successors of the accepting `seed`, which was just
    /// finished by the blue search with `stack` leading to it.
    fn red_search(&mut self, seed: &G::Vertex, stack: Vec<G::Vertex>) -> Control {
        self.launched += 1;
        let view = ReRooted::successors_of(self.graph, seed.clone());
        let known = RedView {
            palette: &mut self.palette,
            painted: 0,
        };
        let mut red = Red {
            seed: seed.clone(),
            closing: None,
        };
        let mut search = DfsConfiguration::with_parts(&view, self.reduce.clone(), known);
        let outcome = search.run(&mut red, self.cancel);
        let path = search.path();
        trace!(
            "red search from {:?} ended {:?} after painting {} vertices",
            seed,
            outcome,
            search.known().len()
        );
        drop(search);
        match (outcome, red.closing) {
            (Outcome::Cancelled, _) => {
                self.cancelled = true;
                Control::Abort
            }
            (Outcome::Aborted, Some((source, target))) => {
                debug!(
                    "red search from {:?} reached {:?} on the stack",
                    seed, target
                );
                let mut trace = stack;
                trace.push(seed.clone());
                trace.extend(path);
                trace.push(target.clone());
                self.answer = Answer::violated(Witness::Edge { source, target }, trace);
                Control::Abort
            }
            _ => {
                self.palette.paint(self.reduce.reduce(seed), Color::Red);
                Control::Continue
            }
        }
    }
}

impl<'a, C, G, P, R> Hooks<C> for Blue<'a, G, P, R>
where
    C: DepthFirst<Vertex = G::Vertex, Key = R::Canonical> + ?Sized,
    G: RootedGraph,
    P: Fn(&G::Vertex) -> bool,
    R: Reduce<G::Vertex> + Clone,
{
    fn on_entry(&mut self, source: Option<&G::Vertex>, target: &G::Vertex, search: &C) -> Control {
        let below = source.map_or(0, |source| self.palette.weight(&search.key(source)));
        let weight = below + usize::from((self.accepting)(target));
        self.palette
            .colors
            .insert(search.key(target), (Color::Cyan, weight));
        Control::Continue
    }

    fn on_known(&mut self, source: Option<&G::Vertex>, target: &G::Vertex, search: &C) -> Control {
        let (true, Some(source)) = (self.early, source) else {
            return Control::Continue;
        };
        let key = search.key(target);
        if self.palette.color(&key) != Some(Color::Cyan) {
            return Control::Continue;
        }
        let closes = (self.accepting)(target)
            || self.palette.weight(&search.key(source)) > self.palette.weight(&key);
        if !closes {
            return Control::Continue;
        }
        debug!("back edge from {:?} closes an accepting cycle", source);
        let mut trace = search.path();
        trace.push(target.clone());
        let witness = Witness::Edge {
            source: source.clone(),
            target: target.clone(),
        };
        self.answer = Answer::violated(witness, trace);
        Control::Abort
    }

    fn on_exit(&mut self, vertex: &G::Vertex, _frame: &C::Frame, search: &C) -> Control {
        if !(self.accepting)(vertex) {
            self.palette.paint(search.key(vertex), Color::Blue);
            return Control::Continue;
        }
        if self.cancel.is_cancelled() {
            self.cancelled = true;
            return Control::Abort;
        }
        self.red_search(vertex, search.path())
    }
}

impl<'g, G, P, R> Run for ColoredNestedDfs<'g, G, P, R>
where
    G: RootedGraph,
    P: Fn(&G::Vertex) -> bool,
    R: Reduce<G::Vertex> + Clone,
{
    type Output = Answer<G::Vertex>;

    fn run(&self, cancel: &dyn Cancel) -> Self::Output {
        let mut blue = Blue {
            graph: self.graph,
            accepting: &self.accepting,
            reduce: &self.reduce,
            cancel,
            early: self.early,
            palette: Palette {
                colors: Map::default(),
            },
            answer: Answer::satisfied(),
            cancelled: false,
            launched: 0,
        };
        let mut search = DfsConfiguration::with_parts(
            self.graph,
            self.reduce.clone(),
            Set::<R::Canonical>::default(),
        );
        let outcome = search.run(&mut blue, cancel);
        debug!(
            "colored nested search ended {:?} after {} red searches",
            outcome, blue.launched
        );
        if blue.cancelled {
            Answer::satisfied()
        } else {
            blue.answer
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::ColoredNestedDfs;
    use crate::{graph::samples, Adjacency, CancelFlag, Run, Witness};

    #[test]
    fn early_detection_on_back_edge() {
        let graph = samples::root_cycle_3();
        let answer = ColoredNestedDfs::new(&graph, |v: &u32| *v == 1).run_alone();
        assert_eq!(answer.trace(), &[1, 2, 3, 1]);
        assert_eq!(
            answer.witness(),
            Some(&Witness::Edge {
                source: 3,
                target: 1,
            })
        );

        let weighted = ColoredNestedDfs::new(&graph, |v: &u32| *v == 2).run_alone();
        assert_eq!(weighted.trace(), &[1, 2, 3, 1]);
    }

    #[test]
    fn red_search_finds_cyan_vertex() {
        let graph = samples::root_cycle_3();
        let answer = ColoredNestedDfs::new(&graph, |v: &u32| *v == 3)
            .with_early_detection(false)
            .run_alone();
        assert_eq!(answer.trace(), &[1, 2, 3, 1]);
        assert_eq!(
            answer.witness(),
            Some(&Witness::Edge {
                source: 3,
                target: 1,
            })
        );

        let graph = samples::sharing_2();
        let answer = ColoredNestedDfs::new(&graph, |v: &u32| *v == 4)
            .with_early_detection(false)
            .run_alone();
        assert!(!answer.holds());
        assert_eq!(answer.validate_lasso(&graph, |v: &u32| *v == 4), Ok(()));
    }

    #[test]
    fn late_detection_and_red_vertices() {
        let graph = Adjacency::from_edges([0], [(0, 1), (1, 2), (2, 1), (1, 3), (3, 0)]);
        let answer = ColoredNestedDfs::new(&graph, |v: &u32| *v == 3)
            .with_early_detection(false)
            .run_alone();
        assert_eq!(answer.trace(), &[0, 1, 3, 0]);

        let acyclic = Adjacency::from_edges([0], [(0, 1), (0, 2), (1, 3), (2, 3)]);
        assert!(ColoredNestedDfs::new(&acyclic, |_: &u32| true)
            .with_early_detection(false)
            .run_alone()
            .holds());
    }

    #[test]
    fn cancelled_before_red_search() {
        let graph = samples::root_cycle_3();
        let flag = CancelFlag::new();
        flag.cancel();
        let answer = ColoredNestedDfs::new(&graph, |v: &u32| *v == 1).run(&flag);
        assert!(answer.holds());
    }
}
