pub mod harness;
pub mod predicate;
pub mod report;
pub mod sequence;
pub mod suite;
pub mod web;

pub use harness::{BenchRun, Harness, HarnessBuilder, HarnessSettings, Measurement};
pub use sequence::InputPattern;
pub use suite::{Suite, SuiteLoader};
