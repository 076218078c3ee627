//! Fixture loading from YAML files

use serde::Deserialize;

use std::path::Path;

/// A single test case from a fixture file
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub desc: String,
    pub kml: String,
    /// Expected WKT on success
    #[serde(default)]
    pub wkt: Option<String>,
    /// Expected failure class
    #[serde(default)]
    pub error: Option<ErrorClass>,
}

/// Which pipeline stage is expected to reject the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    Scan,
    Grammar,
    Structure,
    Unsupported,
    Limit,
}

impl ErrorClass {
    pub fn of(err: &kml_core::ParseError) -> Self {
        use kml_core::ParseError;
        match err {
            ParseError::Scan { .. } => ErrorClass::Scan,
            ParseError::Grammar { .. } => ErrorClass::Grammar,
            ParseError::Structure(_) => ErrorClass::Structure,
            ParseError::UnsupportedType { .. } => ErrorClass::Unsupported,
            ParseError::Limit { .. } => ErrorClass::Limit,
        }
    }
}

/// Load all test cases from a YAML fixture file
pub fn load_fixtures(path: &Path) -> Vec<TestCase> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));
    let cases: Vec<TestCase> = serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e));
    for case in &cases {
        assert!(
            case.wkt.is_some() != case.error.is_some(),
            "fixture {} must set exactly one of `wkt` and `error`",
            case.id
        );
    }
    cases
}

/// Load fixtures from the standard fixtures directory
pub fn load_fixtures_by_name(name: &str) -> Vec<TestCase> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.yaml", name));
    load_fixtures(&path)
}
