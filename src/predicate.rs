//! Candidate predicates for the branch-prediction benchmarks
//!
//! Every predicate is an `if/else` comparison chain over a single integer.
//! The variants differ only in branch ordering and hinting, so timing them
//! over the same input stream exposes predictor behavior rather than
//! algorithmic differences.

/// A callable candidate measured by the harness.
///
/// The label is supplied explicitly rather than derived from the type so
/// output stays stable across builds. `calls` and `checksum` are observable
/// side effects: the harness reads both through `black_box` after the timed
/// loop, which keeps the comparison chains from being optimized away.
pub trait Predicate: Send {
    fn name(&self) -> &str;
    fn call(&mut self, input: i32);
    /// Total invocations so far.
    fn calls(&self) -> u64;
    /// Arm-weighted tally; proves which branches actually ran.
    fn checksum(&self) -> u64;
}

#[cold]
#[inline(never)]
fn cold_path() {}

/// Stable stand-in for a likely-branch hint: taking the `false` side routes
/// through a cold function, which pushes codegen toward the `true` side.
#[inline(always)]
fn likely(condition: bool) -> bool {
    if !condition {
        cold_path();
    }
    condition
}

/// Chain that tests the hot value last: `1`, `2`, `3`, else.
#[derive(Debug, Default)]
pub struct ChainAscending {
    calls: u64,
    checksum: u64,
}

impl ChainAscending {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Predicate for ChainAscending {
    fn name(&self) -> &str {
        "chain_ascending"
    }

    fn call(&mut self, input: i32) {
        if input == 1 {
            self.checksum += 1;
        } else if input == 2 {
            self.checksum += 2;
        } else if input == 3 {
            self.checksum += 3;
        } else {
            self.checksum += 4;
        }
        self.calls += 1;
    }

    fn calls(&self) -> u64 {
        self.calls
    }

    fn checksum(&self) -> u64 {
        self.checksum
    }
}

/// Same ordering as [`ChainAscending`], with the hot comparison wrapped in a
/// likely-branch hint.
#[derive(Debug, Default)]
pub struct ChainHinted {
    calls: u64,
    checksum: u64,
}

impl ChainHinted {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Predicate for ChainHinted {
    fn name(&self) -> &str {
        "chain_hinted"
    }

    fn call(&mut self, input: i32) {
        if input == 1 {
            self.checksum += 1;
        } else if input == 2 {
            self.checksum += 2;
        } else if likely(input == 3) {
            self.checksum += 3;
        } else {
            self.checksum += 4;
        }
        self.calls += 1;
    }

    fn calls(&self) -> u64 {
        self.calls
    }

    fn checksum(&self) -> u64 {
        self.checksum
    }
}

/// Chain that tests the hot value first: `3`, `2`, `1`, else.
#[derive(Debug, Default)]
pub struct ChainHotFirst {
    calls: u64,
    checksum: u64,
}

impl ChainHotFirst {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Predicate for ChainHotFirst {
    fn name(&self) -> &str {
        "chain_hot_first"
    }

    fn call(&mut self, input: i32) {
        if input == 3 {
            self.checksum += 3;
        } else if input == 2 {
            self.checksum += 2;
        } else if input == 1 {
            self.checksum += 1;
        } else {
            self.checksum += 4;
        }
        self.calls += 1;
    }

    fn calls(&self) -> u64 {
        self.calls
    }

    fn checksum(&self) -> u64 {
        self.checksum
    }
}

/// Labels of the predicates suites may refer to.
pub fn builtin_names() -> &'static [&'static str] {
    &["chain_ascending", "chain_hinted", "chain_hot_first"]
}

/// Construct a built-in predicate by label.
pub fn builtin(name: &str) -> Option<Box<dyn Predicate>> {
    match name {
        "chain_ascending" => Some(Box::new(ChainAscending::new())),
        "chain_hinted" => Some(Box::new(ChainHinted::new())),
        "chain_hot_first" => Some(Box::new(ChainHotFirst::new())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chains_agree_on_checksum_contributions() {
        let mut ascending = ChainAscending::new();
        let mut hinted = ChainHinted::new();
        let mut hot_first = ChainHotFirst::new();

        for input in [1, 2, 3, 4, 3, 3] {
            ascending.call(input);
            hinted.call(input);
            hot_first.call(input);
        }

        // Identical logic, different orderings.
        assert_eq!(ascending.checksum(), hinted.checksum());
        assert_eq!(ascending.checksum(), hot_first.checksum());
        assert_eq!(ascending.calls(), 6);
    }

    #[test]
    fn builtin_registry_matches_names() {
        for name in builtin_names() {
            let predicate = builtin(name).expect("builtin should resolve");
            assert_eq!(predicate.name(), *name);
        }
        assert!(builtin("no_such_chain").is_none());
    }

    #[test]
    fn hot_arm_dominates_checksum_for_fixed_three() {
        let mut chain = ChainHotFirst::new();
        for _ in 0..100 {
            chain.call(3);
        }
        assert_eq!(chain.calls(), 100);
        assert_eq!(chain.checksum(), 300);
    }
}
