mod common;
use crate::common::{init_tracing, with_timeout};

use buildwatch_test_utils::builders::{pipeline_shape, RegistryBuilder};
use buildwatch_test_utils::Recorder;

#[tokio::test]
async fn build_runs_every_prerequisite_before_itself() {
    init_tracing();
    let recorder = Recorder::new();
    let runner = pipeline_shape(&recorder);

    let report = with_timeout(runner.run("build")).await.expect("build succeeds");

    assert_eq!(
        recorder.executed(),
        vec!["elm-init", "elm", "static", "build"]
    );
    assert_eq!(report.root, "build");
    assert_eq!(report.executed, recorder.executed());
}

#[tokio::test]
async fn running_a_leaf_only_runs_its_own_prerequisites() {
    init_tracing();
    let recorder = Recorder::new();
    let runner = pipeline_shape(&recorder);

    with_timeout(runner.run("elm")).await.expect("elm succeeds");

    assert_eq!(recorder.executed(), vec!["elm-init", "elm"]);
    assert_eq!(recorder.count("static"), 0);
    assert_eq!(recorder.count("build"), 0);
}

#[tokio::test]
async fn task_without_prerequisites_runs_alone() {
    init_tracing();
    let recorder = Recorder::new();
    let runner = pipeline_shape(&recorder);

    with_timeout(runner.run("static")).await.expect("static succeeds");

    assert_eq!(recorder.executed(), vec!["static"]);
}

#[tokio::test]
async fn shared_prerequisite_runs_once_per_run() {
    init_tracing();
    let recorder = Recorder::new();
    // a <- b, a <- c, {b, c} <- d
    let runner = RegistryBuilder::new(&recorder)
        .task("a", &[])
        .task("b", &["a"])
        .task("c", &["a"])
        .task("d", &["b", "c"])
        .runner();

    with_timeout(runner.run("d")).await.expect("d succeeds");

    assert_eq!(recorder.executed(), vec!["a", "b", "c", "d"]);
    assert_eq!(recorder.count("a"), 1);
}

#[tokio::test]
async fn prerequisites_may_be_registered_after_their_dependents() {
    init_tracing();
    let recorder = Recorder::new();
    let runner = RegistryBuilder::new(&recorder)
        .task("top", &["bottom"])
        .task("bottom", &[])
        .runner();

    runner.registry().validate().expect("graph is complete");
    with_timeout(runner.run("top")).await.expect("top succeeds");

    assert_eq!(recorder.executed(), vec!["bottom", "top"]);
}

#[tokio::test]
async fn every_run_starts_from_scratch() {
    init_tracing();
    let recorder = Recorder::new();
    let runner = pipeline_shape(&recorder);

    with_timeout(runner.run("build")).await.expect("first build");
    with_timeout(runner.run("build")).await.expect("second build");

    assert_eq!(recorder.count("elm-init"), 2);
    assert_eq!(recorder.count("static"), 2);
    assert_eq!(recorder.count("build"), 2);
}

#[test]
fn plan_matches_execution_order() {
    let recorder = Recorder::new();
    let runner = pipeline_shape(&recorder);

    let plan = runner.plan("build").expect("plan resolves");

    assert_eq!(plan, vec!["elm-init", "elm", "static", "build"]);
    assert!(recorder.executed().is_empty(), "planning runs nothing");
}

#[test]
fn graph_reports_dependents() {
    let recorder = Recorder::new();
    let runner = pipeline_shape(&recorder);
    let graph = runner.registry().graph();

    assert_eq!(graph.dependents_of("elm-init"), vec!["elm"]);
    assert_eq!(graph.dependents_of("static"), vec!["build"]);
    assert!(graph.dependents_of("build").is_empty());
    assert_eq!(graph.prerequisites_of("build"), ["elm", "static"]);
}
