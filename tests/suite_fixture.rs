use std::path::PathBuf;

use branchmark::{harness::DEFAULT_ITERATIONS, InputPattern, SuiteLoader};

fn suite_loader() -> SuiteLoader {
    SuiteLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn suite_path() -> PathBuf {
    PathBuf::from("suites/branch_chains.yaml")
}

#[test]
fn suite_loader_reads_fixture() {
    let suite = suite_loader().load(suite_path()).expect("suite parses");
    assert_eq!(suite.name, "branch_chains");
    assert_eq!(suite.iterations, DEFAULT_ITERATIONS);
    assert_eq!(suite.input, InputPattern::Fixed { value: 3 });
    assert_eq!(suite.runs.len(), 3);
    assert_eq!(
        suite
            .runs
            .iter()
            .map(|run| run.predicate.as_str())
            .collect::<Vec<_>>(),
        vec!["chain_ascending", "chain_hinted", "chain_hot_first"]
    );
}

#[test]
fn fixture_builds_a_runnable_harness() {
    let suite = suite_loader().load(suite_path()).expect("suite parses");
    // Clamp iterations so the test stays quick; the suite default is 10M.
    let mut harness = suite
        .build_harness(None, Some(1_000), None)
        .expect("harness builds");
    assert_eq!(harness.run_count(), 3);

    let measurements = harness.run().expect("run succeeds");
    for measurement in &measurements {
        assert_eq!(measurement.calls, 1_000);
        // Fixed input 3 hits the hot arm every call.
        assert_eq!(measurement.checksum, 3_000);
    }
}

#[test]
fn missing_suite_file_reports_path() {
    let err = suite_loader()
        .load("suites/no_such_suite.yaml")
        .expect_err("load should fail");
    assert!(err.to_string().contains("no_such_suite.yaml"));
}

#[test]
fn output_lines_use_reference_format() {
    let suite = suite_loader().load(suite_path()).expect("suite parses");
    let mut harness = suite
        .build_harness(None, Some(100), None)
        .expect("harness builds");
    let measurements = harness.run().expect("run succeeds");

    let line = branchmark::report::format_line(&measurements[0]);
    assert!(line.starts_with("chain_ascendingrun time is "));
    assert!(line.ends_with(" us"));
}
