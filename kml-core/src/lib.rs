//! KML Geometry Parser
//!
//! Turns a KML geometry fragment (`Point`, `LineString`, `Polygon` or
//! `MultiGeometry`) into one typed [`Geometry`].
//!
//! # Architecture
//!
//! - **scanner.rs** - Markup scanner, calls back with [`Event`]s
//! - **tree.rs** - Tree builder and the [`Document`] node tree
//! - **arena.rs** - Per-parse allocation tracking for tree building
//! - **assemble.rs** - Grammar matching per geometry keyword
//! - **unify.rs** - Fragment list to declared type and dimension
//! - **geometry.rs** - Result types and WKT output
//!
//! # Example
//!
//! ```
//! use kml_core::{Dimension, GeometryType};
//!
//! let geom = kml_core::parse(b"<Point><coordinates>10,20</coordinates></Point>").unwrap();
//! assert_eq!(geom.declared_type(), GeometryType::Point);
//! assert_eq!(geom.dimension(), Dimension::Xy);
//! assert_eq!(geom.to_string(), "POINT (10 20)");
//! ```

pub mod arena;
pub mod assemble;
pub mod coord;
pub mod error;
pub mod event;
pub mod geometry;
pub mod options;
pub mod scanner;
pub mod span;
pub mod tag;
pub mod tree;
pub mod unify;

pub use arena::{ArenaStats, EntryKind, ReleasePolicy};
pub use assemble::{Assembly, Fragment};
pub use error::{
    GrammarErrorKind, LimitKind, ParseError, Result, ScanErrorCode, StructureError,
    StructureErrorKind,
};
pub use event::Event;
pub use geometry::{BoundingBox, Coord, Dimension, Geometry, GeometryType, LineString, Polygon};
pub use options::{ParseOptions, RingClosure};
pub use span::Span;
pub use tag::Tag;
pub use tree::{CleanupReport, Document, Node, NodeId, TreeBuilder};

/// Parse KML markup with default options.
pub fn parse(input: &[u8]) -> Result<Geometry> {
    Parser::default().parse(input)
}

/// Parse KML markup with the given options.
pub fn parse_with(input: &[u8], options: &ParseOptions) -> Result<Geometry> {
    Parser::new(options.clone()).parse(input)
}

/// Reusable parse driver.
///
/// Holds no per-parse state, so one `Parser` can serve any number of calls.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn parse(&self, input: &[u8]) -> Result<Geometry> {
        self.parse_with_report(input).0
    }

    /// Parse and also return the arena accounting of the attempt.
    ///
    /// The report covers both outcomes and is balanced once this returns.
    pub fn parse_with_report(&self, input: &[u8]) -> (Result<Geometry>, CleanupReport) {
        tracing::debug!(len = input.len(), "parse start");

        if let Some(limit) = self.options.max_input_len {
            if input.len() > limit {
                let err = ParseError::Limit {
                    what: LimitKind::InputLength,
                    limit,
                };
                tracing::debug!(error = %err, "parse rejected");
                return (Err(err), CleanupReport::empty());
            }
        }

        let (doc, mut report) = Document::build(input, &self.options);
        let doc = match doc {
            Ok(doc) => doc,
            Err(err) => return (Err(err), report),
        };

        let result = assemble::assemble(&doc, &self.options)
            .map(|assembly| unify::unify(&assembly, self.options.srid));
        report.nodes = doc.release();

        match &result {
            Ok(geometry) => tracing::debug!(
                declared_type = %geometry.declared_type(),
                nodes = report.nodes.registered,
                "parse done"
            ),
            Err(err) => tracing::debug!(error = %err, "assembly failed"),
        }
        (result, report)
    }
}
