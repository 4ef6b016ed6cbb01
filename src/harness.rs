//! Timed run loop
//!
//! Runs execute strictly sequentially and back-to-back: no warm-up pass, no
//! cache or predictor isolation between runs. Carried predictor state is an
//! accepted noise source, kept as-observed rather than corrected.

use std::hint::black_box;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::Serialize;

use crate::{
    predicate::Predicate,
    report::ReportWriter,
    sequence::{InputPattern, InputSequence},
};

/// Default invocation count per run.
pub const DEFAULT_ITERATIONS: u64 = 10_000_000;

pub struct HarnessSettings {
    pub suite_name: String,
    /// When set, a JSON report is written here after the last run.
    pub report_dir: Option<PathBuf>,
}

/// One benchmark run: a predicate, an iteration count and an input pattern.
/// Constructed before the timed loop, consumed by it, independent of every
/// other run.
pub struct BenchRun {
    pub predicate: Box<dyn Predicate>,
    pub iterations: u64,
    pub pattern: InputPattern,
}

impl BenchRun {
    pub fn new(predicate: Box<dyn Predicate>, iterations: u64, pattern: InputPattern) -> Self {
        assert!(iterations > 0, "iteration count must be greater than zero");
        Self {
            predicate,
            iterations,
            pattern,
        }
    }
}

/// Result of a single run.
#[derive(Debug, Clone, Serialize)]
pub struct Measurement {
    pub predicate: String,
    pub pattern: String,
    pub iterations: u64,
    /// Invocations observed through the predicate's own counter.
    pub calls: u64,
    /// Arm-weighted side effect; zero here means the chain was eliminated
    /// and the timing is meaningless.
    pub checksum: u64,
    /// Reported granularity: integer microseconds.
    pub elapsed_us: u64,
    /// Full-resolution clock delta; not part of the wire format.
    #[serde(skip)]
    pub elapsed: Duration,
}

impl Measurement {
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

pub struct HarnessBuilder {
    settings: HarnessSettings,
    runs: Vec<BenchRun>,
}

impl HarnessBuilder {
    pub fn new(settings: HarnessSettings) -> Self {
        Self {
            settings,
            runs: Vec::new(),
        }
    }

    pub fn with_run(mut self, run: BenchRun) -> Self {
        self.runs.push(run);
        self
    }

    pub fn push_run(&mut self, run: BenchRun) {
        self.runs.push(run);
    }

    pub fn build(self) -> Harness {
        Harness {
            settings: self.settings,
            runs: self.runs,
        }
    }
}

pub struct Harness {
    settings: HarnessSettings,
    runs: Vec<BenchRun>,
}

impl Harness {
    pub fn suite_name(&self) -> &str {
        &self.settings.suite_name
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Execute every run in order and return the measurements.
    pub fn run(&mut self) -> Result<Vec<Measurement>> {
        self.run_with_hook(|_| {})
    }

    /// Execute every run in order, invoking `hook` after each one.
    pub fn run_with_hook(
        &mut self,
        mut hook: impl FnMut(&Measurement),
    ) -> Result<Vec<Measurement>> {
        let mut measurements = Vec::with_capacity(self.runs.len());
        for run in &mut self.runs {
            let measurement = execute(run)?;
            hook(&measurement);
            measurements.push(measurement);
        }
        if let Some(dir) = &self.settings.report_dir {
            let writer = ReportWriter::new(dir);
            writer.write(&self.settings.suite_name, &measurements)?;
        }
        Ok(measurements)
    }
}

/// Time one run: clock read immediately before the first invocation, clock
/// read immediately after the last, reported in integer microseconds.
fn execute(run: &mut BenchRun) -> Result<Measurement> {
    let sequence = run.pattern.materialize()?;
    let predicate = &mut run.predicate;
    let iterations = run.iterations;

    let start = Instant::now();
    match &sequence {
        InputSequence::Fixed(value) => {
            for _ in 0..iterations {
                predicate.call(black_box(*value));
            }
        }
        InputSequence::Repeating(buffer) => {
            let mut index = 0usize;
            for _ in 0..iterations {
                predicate.call(black_box(buffer[index]));
                index += 1;
                if index == buffer.len() {
                    index = 0;
                }
            }
        }
    }
    let elapsed = start.elapsed();

    // Read both counters through black_box so the loop above keeps its
    // observable effects.
    let calls = black_box(predicate.calls());
    let checksum = black_box(predicate.checksum());

    Ok(Measurement {
        predicate: predicate.name().to_string(),
        pattern: run.pattern.describe(),
        iterations,
        calls,
        checksum,
        elapsed_us: elapsed.as_micros() as u64,
        elapsed,
    })
}
