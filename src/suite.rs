//! Declarative benchmark suites loaded from YAML.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    harness::{BenchRun, Harness, HarnessBuilder, HarnessSettings, DEFAULT_ITERATIONS},
    predicate,
    sequence::{InputPattern, PatternError},
};

fn default_iterations() -> u64 {
    DEFAULT_ITERATIONS
}

#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("suite validation error: {0}")]
    Validation(String),
    #[error("run '{predicate}': {source}")]
    Pattern {
        predicate: String,
        source: PatternError,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Suite {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    #[serde(default)]
    pub input: InputPattern,
    pub runs: Vec<SuiteRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuiteRun {
    pub predicate: String,
    /// Overrides the suite-level iteration count when present.
    #[serde(default)]
    pub iterations: Option<u64>,
    /// Overrides the suite-level input pattern when present.
    #[serde(default)]
    pub input: Option<InputPattern>,
}

pub struct SuiteLoader {
    base_dir: PathBuf,
}

impl SuiteLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Suite> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read suite file {}", path.display()))?;
        let suite: Suite = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        suite.validate()?;
        Ok(suite)
    }
}

impl Suite {
    pub fn validate(&self) -> Result<(), SuiteError> {
        if self.runs.is_empty() {
            return Err(SuiteError::Validation(
                "suite must define at least one run".into(),
            ));
        }
        if self.iterations == 0 {
            return Err(SuiteError::Validation(
                "suite iteration count must be greater than zero".into(),
            ));
        }
        for run in &self.runs {
            if predicate::builtin(&run.predicate).is_none() {
                return Err(SuiteError::Validation(format!(
                    "unknown predicate '{}' (available: {})",
                    run.predicate,
                    predicate::builtin_names().join(", ")
                )));
            }
            if run.iterations == Some(0) {
                return Err(SuiteError::Validation(format!(
                    "run '{}' iteration count must be greater than zero",
                    run.predicate
                )));
            }
            let pattern = run.input.as_ref().unwrap_or(&self.input);
            pattern.validate().map_err(|source| SuiteError::Pattern {
                predicate: run.predicate.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Effective iteration count for a run, honoring the override chain:
    /// CLI override, per-run value, suite default.
    pub fn iterations_for(&self, run: &SuiteRun, override_iterations: Option<u64>) -> u64 {
        override_iterations
            .or(run.iterations)
            .unwrap_or(self.iterations)
    }

    pub fn input_for(&self, run: &SuiteRun, override_input: Option<&InputPattern>) -> InputPattern {
        override_input
            .cloned()
            .or_else(|| run.input.clone())
            .unwrap_or_else(|| self.input.clone())
    }

    /// Assemble the harness for this suite.
    pub fn build_harness(
        &self,
        report_dir: Option<PathBuf>,
        override_iterations: Option<u64>,
        override_input: Option<&InputPattern>,
    ) -> Result<Harness> {
        let settings = HarnessSettings {
            suite_name: self.name.clone(),
            report_dir,
        };
        let mut builder = HarnessBuilder::new(settings);
        for run in &self.runs {
            let boxed = predicate::builtin(&run.predicate).ok_or_else(|| {
                SuiteError::Validation(format!("unknown predicate '{}'", run.predicate))
            })?;
            builder.push_run(BenchRun::new(
                boxed,
                self.iterations_for(run, override_iterations),
                self.input_for(run, override_input),
            ));
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_suite(text: &str) -> Result<Suite> {
        let suite: Suite = serde_yaml::from_str(text)?;
        suite.validate()?;
        Ok(suite)
    }

    #[test]
    fn defaults_apply_when_omitted() {
        let suite = minimal_suite(
            "name: quick\nruns:\n  - predicate: chain_ascending\n",
        )
        .unwrap();
        assert_eq!(suite.iterations, DEFAULT_ITERATIONS);
        assert_eq!(suite.input, InputPattern::Fixed { value: 3 });
    }

    #[test]
    fn unknown_predicate_is_rejected() {
        let err = minimal_suite("name: bad\nruns:\n  - predicate: chain_missing\n")
            .expect_err("validation should fail");
        assert!(err.to_string().contains("unknown predicate"));
    }

    #[test]
    fn empty_runs_are_rejected() {
        let err = minimal_suite("name: empty\nruns: []\n").expect_err("validation should fail");
        assert!(err.to_string().contains("at least one run"));
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let err = minimal_suite(
            "name: zero\niterations: 0\nruns:\n  - predicate: chain_ascending\n",
        )
        .expect_err("validation should fail");
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn override_chain_prefers_cli_then_run_then_suite() {
        let suite = minimal_suite(
            "name: overrides\niterations: 100\nruns:\n  - predicate: chain_ascending\n    iterations: 50\n  - predicate: chain_hinted\n",
        )
        .unwrap();
        assert_eq!(suite.iterations_for(&suite.runs[0], None), 50);
        assert_eq!(suite.iterations_for(&suite.runs[1], None), 100);
        assert_eq!(suite.iterations_for(&suite.runs[0], Some(7)), 7);
    }
}
