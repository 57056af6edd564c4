//! Integration Tests for the Incremental Engines
//!
//! These tests drive the pull engine, the push graph and the adapters
//! together through the public API.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use indexmap::{indexmap, IndexMap};
use parking_lot::Mutex;

use delta_core::adapters::{PullFromPush, PushFromPull};
use delta_core::graph::NodeGraph;
use delta_core::pull::{BuildState, Deps, Makelike};
use delta_core::push::{BoxedStage, Delta, Diffs, DiffsExt, FilterLog, Graph, Rerunner, Sum};
use delta_core::Error;

/// Per-rule call counters, keyed by node.
#[derive(Clone, Default)]
struct Calls(Arc<Mutex<HashMap<&'static str, i32>>>);

impl Calls {
    fn hit(&self, node: &'static str) {
        *self.0.lock().entry(node).or_default() += 1;
    }

    fn get(&self, node: &'static str) -> i32 {
        self.0.lock().get(node).copied().unwrap_or(0)
    }
}

fn compile(source: &str) -> String {
    source.bytes().rev().map(char::from).collect()
}

fn build_system(calls: &Calls) -> Makelike<&'static str, String> {
    let mut builder = NodeGraph::builder();
    for (object, source) in [("foo.o", "foo.c"), ("bar.o", "bar.c")] {
        let calls = calls.clone();
        builder = builder.derive(
            object,
            move |deps: &[&String]| {
                calls.hit(object);
                compile(deps[0])
            },
            [source],
        );
    }
    let link_calls = calls.clone();
    let graph = builder
        .derive(
            "lib.a",
            move |deps: &[&String]| {
                link_calls.hit("lib.a");
                deps.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(" ")
            },
            ["foo.o", "bar.o"],
        )
        .build()
        .unwrap();
    Makelike::new(graph)
}

/// Compile twice and link once; rewriting a source with the same value
/// still counts as a change.
#[test]
fn compile_and_link() {
    let calls = Calls::default();
    let mut make = build_system(&calls);

    make.write("foo.c", "A".to_string()).unwrap();
    make.write("bar.c", "B".to_string()).unwrap();
    assert_eq!(make.read(&"lib.a").unwrap(), "A B");
    assert_eq!(calls.get("foo.o"), 1);
    assert_eq!(calls.get("bar.o"), 1);
    assert_eq!(calls.get("lib.a"), 1);

    let linked_at = make.version(&"lib.a").unwrap();
    make.write("bar.c", "B".to_string()).unwrap();
    assert_eq!(make.read(&"lib.a").unwrap(), "A B");

    assert_eq!(calls.get("foo.o"), 1);
    assert_eq!(calls.get("bar.o"), 2);
    assert_eq!(calls.get("lib.a"), 2);
    assert!(make.version(&"lib.a").unwrap() > linked_at);
}

/// Each write recomputes exactly the transitive dependents, once, on the
/// next read; everything else is untouched.
#[test]
fn staleness_law() {
    let calls = Calls::default();
    let mut make = build_system(&calls);
    make.write("foo.c", "f".to_string()).unwrap();
    make.write("bar.c", "b".to_string()).unwrap();
    make.read(&"lib.a").unwrap();

    for (round, source) in ["foo.c", "bar.c", "foo.c", "foo.c", "bar.c"].into_iter().enumerate() {
        let (object, other) = if source == "foo.c" { ("foo.o", "bar.o") } else { ("bar.o", "foo.o") };
        let before = (calls.get(object), calls.get(other), calls.get("lib.a"));

        make.write(source, format!("{source}-{round}")).unwrap();
        make.read(&"lib.a").unwrap();
        make.read(&"lib.a").unwrap();

        assert_eq!(calls.get(object), before.0 + 1);
        assert_eq!(calls.get(other), before.1);
        assert_eq!(calls.get("lib.a"), before.2 + 1);
    }
}

#[test]
fn version_monotonicity() {
    let calls = Calls::default();
    let mut make = build_system(&calls);
    make.write("foo.c", String::new()).unwrap();
    make.write("bar.c", String::new()).unwrap();
    let mut last = None;
    let mut seen: HashMap<u64, String> = HashMap::new();

    for n in 0..10 {
        let source = if n % 3 == 0 { "bar.c" } else { "foo.c" };
        make.write(source, n.to_string()).unwrap();
        let value = make.read(&"lib.a").unwrap();
        let version = make.version(&"lib.a").unwrap();

        assert!(Some(version) > last);
        // One version, one value.
        if let Some(previous) = seen.insert(version.raw(), value.clone()) {
            assert_eq!(previous, value);
        }
        last = Some(version);
    }
}

#[test]
fn errors_are_distinguishable() {
    let mut make = build_system(&Calls::default());

    assert!(matches!(make.write("lib.a", String::new()), Err(Error::InvalidWriteTarget { .. })));
    assert!(matches!(make.read(&"lib.a"), Err(Error::UnknownSource { .. })));
    assert_eq!(make.build_state(&"foo.o"), BuildState::Unbuilt);

    let cyclic: Result<NodeGraph<&str, ()>, _> = NodeGraph::builder().rule("a", (), ["b"]).rule("b", (), ["a"]).build();
    assert!(matches!(cyclic, Err(Error::CyclicGraph { .. })));

    assert!(matches!(Sum::new().update(vec![]), Err(Error::PreconditionViolation { .. })));
}

#[test]
fn sum_scenario() {
    let mut sum = Sum::new();
    assert_eq!(sum.compute(vec![1, 2, 3]).unwrap(), 6);
    assert_eq!(sum.update(vec![(1, 5)]).unwrap(), 3);
    assert_eq!(sum.entries(), Some(&[1, 5, 3][..]));
    assert_eq!(sum.update(vec![(0, 10)]).unwrap(), 9);
}

#[test]
fn filter_log_scenario() {
    let mut filter = FilterLog::new(|x: &i32| x % 2 == 0);
    assert_eq!(filter.compute(vec![1, 2, 3, 4]).unwrap(), vec![2, 4]);
    assert_eq!(filter.update(vec![5, 6]).unwrap(), vec![6]);
}

/// Turns a single value into the one-element positional input `Rerunner`
/// expects.
struct Singleton;

impl Diffs for Singleton {
    type Input = i64;
    type Output = Vec<i64>;
    type InputDelta = Delta<i64>;
    type OutputDelta = Vec<Delta<i64>>;

    fn compute(&mut self, value: i64) -> delta_core::Result<Vec<i64>> {
        Ok(vec![value])
    }

    fn update(&mut self, delta: Delta<i64>) -> delta_core::Result<Vec<Delta<i64>>> {
        Ok(vec![delta])
    }
}

/// A pipeline fed by a pull engine: the adapter's unconditional `New`
/// forces every downstream stage to rerun.
#[test]
fn push_from_pull_over_propagates() {
    let calls = Arc::new(AtomicI32::new(0));
    let downstream = calls.clone();

    let pull = NodeGraph::builder()
        .derive("clamped", |deps: &[&i64]| (*deps[0]).clamp(0, 10), ["raw"])
        .build()
        .unwrap();
    let mut pipeline = PushFromPull::new(Makelike::new(pull), "clamped")
        .then(Singleton)
        .then(Rerunner::new(move |xs: &[i64]| {
            downstream.fetch_add(1, Ordering::SeqCst);
            xs[0] * 2
        }));

    assert_eq!(pipeline.compute(indexmap! { "raw" => 50 }).unwrap(), 20);
    assert_eq!(pipeline.update(indexmap! { "raw" => Delta::New(70) }).unwrap(), Delta::New(20));
    assert_eq!(pipeline.update(indexmap! { "raw" => Delta::New(80) }).unwrap(), Delta::New(20));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

/// The push graph obeys the consistency law across a run of updates.
#[test]
fn push_graph_consistency() {
    type Stage = BoxedStage<i64, Delta<i64>>;
    let build = || {
        let graph: NodeGraph<&str, Stage> = NodeGraph::builder()
            .stage("sum", Rerunner::new(|xs: &[i64]| xs.iter().sum()), ["a", "b"])
            .stage("max", Rerunner::new(|xs: &[i64]| xs.iter().copied().max().unwrap_or(0)), ["a", "b", "c"])
            .stage("out", Rerunner::new(|xs: &[i64]| xs[0] * xs[1]), ["sum", "max"])
            .build()
            .unwrap();
        Graph::new(graph)
    };

    let mut inputs: IndexMap<&str, i64> = indexmap! { "a" => 1, "b" => 2, "c" => 3 };
    let mut warm = build();
    let mut values = warm.compute(inputs.clone()).unwrap();
    assert_eq!(values["out"], 9);

    let steps: Vec<IndexMap<&str, Delta<i64>>> = vec![
        indexmap! { "c" => Delta::New(7) },
        indexmap! {},
        indexmap! { "a" => Delta::New(-1), "b" => Delta::Unchanged },
        indexmap! { "b" => Delta::New(9), "c" => Delta::New(0) },
    ];
    for step in steps {
        for (node, delta) in &step {
            delta.clone().apply_to(inputs.get_mut(node).unwrap());
        }
        for (node, delta) in warm.update(step).unwrap() {
            delta.apply_to(values.get_mut(&node).unwrap());
        }
        let fresh = build().compute(inputs.clone()).unwrap();
        assert_eq!(values, fresh);
    }
}

/// Wrapping a stage as a pull engine keeps its internal state between reads.
#[test]
fn pull_from_push_keeps_stage_state() {
    let calls = Arc::new(AtomicI32::new(0));
    let counted = calls.clone();
    let stage = delta_core::push::NamedRerunner::new(move |inputs: &IndexMap<String, i64>| {
        counted.fetch_add(1, Ordering::SeqCst);
        inputs.values().sum::<i64>()
    });
    let mut deps = PullFromPush::new(stage);

    deps.write("a".to_string(), 1).unwrap();
    deps.write("b".to_string(), 2).unwrap();
    assert_eq!(deps.read(&String::new()).unwrap(), 3);
    assert_eq!(deps.read(&String::new()).unwrap(), 3);
    deps.write("a".to_string(), 10).unwrap();
    assert_eq!(deps.read(&String::new()).unwrap(), 12);

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
