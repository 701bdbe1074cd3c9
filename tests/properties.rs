use lasso::{
    Adjacency, BfsConfiguration, ColoredNestedDfs, Control, DfsConfiguration, Hooks,
    NaiveNestedDfs, Reachability, ReduceWith, RootedGraph, Run, Safety, Set, StronglyConnected,
    Traversal, TwoPhaseNestedDfs,
};
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Entry(Option<u32>, u32),
    Known(Option<u32>, u32),
    Exit(u32),
}

#[derive(Debug, Default)]
struct Log(Vec<Event>);

impl<C: Traversal<Vertex = u32> + ?Sized> Hooks<C> for Log {
    fn on_entry(&mut self, source: Option<&u32>, target: &u32, _search: &C) -> Control {
        self.0.push(Event::Entry(source.copied(), *target));
        Control::Continue
    }

    fn on_known(&mut self, source: Option<&u32>, target: &u32, _search: &C) -> Control {
        self.0.push(Event::Known(source.copied(), *target));
        Control::Continue
    }

    fn on_exit(&mut self, vertex: &u32, _frame: &C::Frame, _search: &C) -> Control {
        self.0.push(Event::Exit(*vertex));
        Control::Continue
    }
}

fn arb_graph() -> impl Strategy<Value = Adjacency<u32>> {
    (
        proptest::collection::vec(0u32..8, 1..3),
        proptest::collection::vec((0u32..8, 0u32..8), 0..16),
    )
        .prop_map(|(roots, edges)| Adjacency::from_edges(roots, edges))
}

fn reachable(graph: &Adjacency<u32>, roots: &[u32]) -> Set<u32> {
    roots
        .iter()
        .flat_map(|root| graph.reachable_from(root))
        .collect()
}

fn roots_of(graph: &Adjacency<u32>) -> Vec<u32> {
    graph.roots().collect()
}

fn has_accepting_lasso(graph: &Adjacency<u32>, accepting: &Set<u32>) -> bool {
    reachable(graph, &roots_of(graph)).into_iter().any(|vertex| {
        accepting.contains(&vertex)
            && graph
                .vertices()
                .iter()
                .filter(|successor| graph.has_edge(&vertex, successor))
                .any(|successor| graph.reachable_from(successor).contains(&vertex))
    })
}

proptest! {
    #[test]
    fn depth_first_drivers_agree(graph in arb_graph()) {
        let mut stepped = Log::default();
        let mut eager = Log::default();
        let mut stepping = Log::default();
        DfsConfiguration::new(&graph).run(&mut stepped, &|| false);
        DfsConfiguration::new(&graph).run_eager(&mut eager, &|| false);
        DfsConfiguration::new(&graph).run_stepping(&mut stepping, &|| false);
        prop_assert_eq!(&stepped.0, &eager.0);
        prop_assert_eq!(&stepped.0, &stepping.0);

        let entries = stepped.0.iter().filter(|e| matches!(e, Event::Entry(..))).count();
        let exits = stepped.0.iter().filter(|e| matches!(e, Event::Exit(_))).count();
        prop_assert_eq!(entries, exits);
    }

    #[test]
    fn breadth_first_drivers_agree(graph in arb_graph()) {
        let mut stepped = Log::default();
        let mut eager = Log::default();
        let mut stepping = Log::default();
        BfsConfiguration::new(&graph).run(&mut stepped, &|| false);
        BfsConfiguration::new(&graph).run_eager(&mut eager, &|| false);
        BfsConfiguration::new(&graph).run_stepping(&mut stepping, &|| false);
        prop_assert_eq!(&stepped.0, &eager.0);
        prop_assert_eq!(&stepped.0, &stepping.0);
    }

    #[test]
    fn strategies_reach_the_same_vertices(graph in arb_graph()) {
        let expected = reachable(&graph, &roots_of(&graph));
        let depth: Set<u32> = Reachability::new(&graph).run_alone().vertices.into_iter().collect();
        let breadth: Set<u32> = Reachability::new(&graph)
            .breadth_first()
            .run_alone()
            .vertices
            .into_iter()
            .collect();
        prop_assert_eq!(&depth, &expected);
        prop_assert_eq!(&breadth, &expected);
    }

    #[test]
    fn components_partition_reachable_vertices(graph in arb_graph()) {
        let decomposition = StronglyConnected::new(&graph).run_alone();
        let expected = reachable(&graph, &roots_of(&graph));
        let members: Vec<u32> = decomposition.iter().flatten().copied().collect();
        prop_assert_eq!(members.len(), expected.len());
        prop_assert_eq!(
            members.iter().copied().collect::<Set<u32>>(),
            expected.clone()
        );

        for a in &expected {
            for b in &expected {
                let mutual =
                    graph.reachable_from(a).contains(b) && graph.reachable_from(b).contains(a);
                prop_assert_eq!(decomposition.same_component(a, b), mutual, "{} {}", a, b);
            }
        }
        for (index, component) in decomposition.iter().enumerate() {
            let looping = component.len() > 1 || graph.has_edge(&component[0], &component[0]);
            prop_assert_eq!(decomposition.is_trivial(index), !looping);
        }
    }

    #[test]
    fn nested_searches_decide_emptiness(
        graph in arb_graph(),
        accepting in proptest::collection::vec(0u32..8, 0..4),
    ) {
        let accepting: Set<u32> = accepting.into_iter().collect();
        let is_accepting = |v: &u32| accepting.contains(v);
        let expected = !has_accepting_lasso(&graph, &accepting);

        let answers = [
            NaiveNestedDfs::new(&graph, is_accepting).run_alone(),
            TwoPhaseNestedDfs::new(&graph, is_accepting).run_alone(),
            ColoredNestedDfs::new(&graph, is_accepting).run_alone(),
            ColoredNestedDfs::new(&graph, is_accepting)
                .with_early_detection(false)
                .run_alone(),
        ];
        for answer in &answers {
            prop_assert_eq!(answer.holds(), expected, "{:?}", answer);
            prop_assert_eq!(answer.validate_lasso(&graph, is_accepting), Ok(()));
        }
    }

    #[test]
    fn safety_is_sound_and_complete(graph in arb_graph(), bad in 0u32..8) {
        let answer = Safety::new(&graph, |v: &u32| *v == bad).run_alone();
        let expected = !reachable(&graph, &roots_of(&graph)).contains(&bad);
        prop_assert_eq!(answer.holds(), expected);
        prop_assert_eq!(answer.validate(&graph), Ok(()));
        if !answer.holds() {
            prop_assert_eq!(answer.trace().last(), Some(&bad));
        }
    }

    #[test]
    fn never_cancelling_changes_nothing(graph in arb_graph(), bad in 0u32..8) {
        prop_assert_eq!(
            StronglyConnected::new(&graph).run(&|| false),
            StronglyConnected::new(&graph).run_alone()
        );
        prop_assert_eq!(
            Reachability::new(&graph).run(&|| false),
            Reachability::new(&graph).run_alone()
        );
        let accepting = |v: &u32| *v == bad;
        prop_assert_eq!(
            NaiveNestedDfs::new(&graph, accepting).run(&|| false),
            NaiveNestedDfs::new(&graph, accepting).run_alone()
        );
        prop_assert_eq!(
            TwoPhaseNestedDfs::new(&graph, accepting).run(&|| false),
            TwoPhaseNestedDfs::new(&graph, accepting).run_alone()
        );
        prop_assert_eq!(
            ColoredNestedDfs::new(&graph, accepting).run(&|| false),
            ColoredNestedDfs::new(&graph, accepting).run_alone()
        );
        prop_assert_eq!(
            Safety::new(&graph, accepting).run(&|| false),
            Safety::new(&graph, accepting).run_alone()
        );
    }

    #[test]
    fn reduction_explores_a_subset(graph in arb_graph(), modulus in 1u32..4) {
        let plain = Reachability::new(&graph).run_alone();
        let reduced = Reachability::new(&graph)
            .with_reduction(ReduceWith(move |v: &u32| v % modulus))
            .run_alone();
        prop_assert!(reduced.vertices.len() <= plain.vertices.len());
        prop_assert!(reduced.vertices.len() <= modulus as usize);
        for vertex in &reduced.vertices {
            prop_assert!(plain.contains(vertex));
        }
    }
}
