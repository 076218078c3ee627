//! Parse configuration.

/// SRID of the KML datum (WGS 84).
pub const DEFAULT_SRID: i32 = 4326;

/// Default limit on element nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What to do with a polygon ring whose first and last vertex differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RingClosure {
    /// Reject the ring.
    #[default]
    Require,
    /// Append a copy of the first vertex.
    AutoClose,
}

/// Options for one parse call.
///
/// ```
/// use kml_core::{ParseOptions, RingClosure};
///
/// let options = ParseOptions::default()
///     .srid(3857)
///     .ring_closure(RingClosure::AutoClose)
///     .max_input_len(Some(1 << 20));
/// assert_eq!(options.srid, 3857);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// SRID stamped on the result.
    pub srid: i32,
    pub ring_closure: RingClosure,
    /// Deepest element nesting accepted.
    pub max_depth: usize,
    /// Longest input accepted, in bytes. `None` is unbounded.
    pub max_input_len: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            srid: DEFAULT_SRID,
            ring_closure: RingClosure::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_len: None,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn srid(mut self, srid: i32) -> Self {
        self.srid = srid;
        self
    }

    pub fn ring_closure(mut self, ring_closure: RingClosure) -> Self {
        self.ring_closure = ring_closure;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_input_len(mut self, max_input_len: Option<usize>) -> Self {
        self.max_input_len = max_input_len;
        self
    }
}
