//! Test harness for running fixtures with stochastic variations

use crate::common::{ErrorClass, Gen, TestCase};

/// What a parse produced, reduced to something comparable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Wkt(String),
    Error(ErrorClass),
}

impl Outcome {
    fn expected(case: &TestCase) -> Self {
        match (&case.wkt, case.error) {
            (Some(wkt), _) => Outcome::Wkt(wkt.clone()),
            (None, Some(class)) => Outcome::Error(class),
            (None, None) => unreachable!("loader rejects cases without an expectation"),
        }
    }
}

/// Parse and reduce the result, checking cleanup accounting on the way
pub fn outcome(input: &[u8]) -> (Outcome, Vec<String>) {
    let (result, report) = kml_core::Parser::default().parse_with_report(input);
    let mut errors = Vec::new();
    if !report.is_balanced() {
        errors.push(format!("Unbalanced cleanup: {:?}", report));
    }
    let outcome = match result {
        Ok(geometry) => Outcome::Wkt(geometry.to_string()),
        Err(err) => Outcome::Error(ErrorClass::of(&err)),
    };
    (outcome, errors)
}

/// Result of running a test
#[derive(Debug)]
pub struct TestResult {
    pub passed: bool,
    pub input: Vec<u8>,
    pub expected: Outcome,
    pub actual: Outcome,
    pub seed: u64,
    pub errors: Vec<String>,
}

fn check(case: &TestCase, input: Vec<u8>, seed: u64) -> TestResult {
    let expected = Outcome::expected(case);
    let (actual, mut errors) = outcome(&input);
    if actual != expected {
        errors.push(format!("Expected {:?}, got {:?}", expected, actual));
    }
    TestResult {
        passed: errors.is_empty(),
        input,
        expected,
        actual,
        seed,
        errors,
    }
}

/// Run a single test case (canonical, no variations)
pub fn run_test(case: &TestCase) -> TestResult {
    check(case, case.kml.as_bytes().to_vec(), 0)
}

/// Run test with stochastic variations
///
/// Applies independent variations that must not change the outcome:
/// - 20% chance of a UTF-8 byte order mark in front
/// - 30% chance of an XML declaration in front
/// - Filler (whitespace, comments) before every tag
/// - Indentation of continuation lines
pub fn run_with_variations(case: &TestCase, gen: &mut Gen) -> TestResult {
    let mut input = Vec::new();

    if gen.chance(0.2) {
        input.extend("\u{feff}".as_bytes());
    }
    if gen.chance(0.3) {
        input.extend(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    }

    for (i, piece) in case.kml.as_bytes().split(|&b| b == b'<').enumerate() {
        if i > 0 {
            input.extend(gen.filler());
            input.push(b'<');
        }
        input.extend(piece);
    }

    check(case, input, gen.seed)
}

impl TestResult {
    /// Print detailed failure info
    pub fn print_failure(&self, case_id: &str) {
        eprintln!("\n=== FAILED: {} ===", case_id);
        eprintln!("Seed: {} (set KML_TEST_SEED={} to reproduce)", self.seed, self.seed);
        eprintln!("\nInput:");
        eprintln!("{}", String::from_utf8_lossy(&self.input));
        eprintln!("\nExpected: {:?}", self.expected);
        eprintln!("Actual:   {:?}", self.actual);
        eprintln!("\nErrors:");
        for e in &self.errors {
            eprintln!("  - {}", e);
        }
    }
}
