//! Error types for the parse pipeline.
//!
//! Every failure ends the whole parse: there is no partial geometry. The
//! variants of [`ParseError`] follow the pipeline stage that gave up.

use std::fmt;

use thiserror::Error;

use crate::span::Span;

/// Lexical failure codes reported by the scanner.
///
/// A plain enum keeps the scanner free of message allocation; the text
/// comes from [`ScanErrorCode::message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ScanErrorCode {
    /// `<` without a closing `>`
    UnclosedTag = 0,
    /// `<!--` without `-->`
    UnclosedComment,
    /// `<![CDATA[` without `]]>`
    UnclosedCdata,
    /// `<?` or `<!` declaration without its terminator
    UnclosedDeclaration,
    /// Attribute value quote never closed
    UnclosedQuote,
    /// Tag name or attribute key is not an identifier
    InvalidName,
    /// Attribute key not followed by `=`
    ExpectedEquals,
    /// `=` not followed by a value
    ExpectedValue,
    /// Byte that cannot start or continue markup here
    UnexpectedByte,
    /// Input is not valid UTF-8
    InvalidUtf8,
}

impl ScanErrorCode {
    /// Get a human-readable message for this error code.
    pub fn message(self) -> &'static str {
        match self {
            Self::UnclosedTag => "unclosed tag",
            Self::UnclosedComment => "unclosed comment",
            Self::UnclosedCdata => "unclosed cdata section",
            Self::UnclosedDeclaration => "unclosed declaration",
            Self::UnclosedQuote => "unclosed quote",
            Self::InvalidName => "invalid name",
            Self::ExpectedEquals => "expected '=' after attribute key",
            Self::ExpectedValue => "expected attribute value",
            Self::UnexpectedByte => "unexpected byte",
            Self::InvalidUtf8 => "invalid utf-8",
        }
    }
}

impl fmt::Display for ScanErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Tag nesting failures detected while building the node tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarErrorKind {
    #[error("closing tag `{found}` does not match open `{expected}`")]
    MismatchedClose { expected: String, found: String },

    #[error("closing tag `{0}` has no open element")]
    UnmatchedClose(String),

    #[error("element `{0}` is never closed")]
    Unclosed(String),

    #[error("text outside of any element")]
    TextOutsideElement,

    #[error("document contains no elements")]
    EmptyDocument,
}

/// Why a node sequence did not match its geometry grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureErrorKind {
    #[error("expected `{expected}`, found `{found}`")]
    UnexpectedTag { expected: &'static str, found: String },

    #[error("missing `{0}`")]
    MissingElement(&'static str),

    #[error("unexpected text content")]
    UnexpectedText,

    #[error("`coordinates` is empty")]
    EmptyCoordinates,

    #[error("`{0}` is not a number")]
    BadNumber(String),

    #[error("coordinate tuple has {0} components, expected 2 or 3")]
    ComponentCount(usize),

    #[error("point has {0} coordinate tuples, expected 1")]
    PointTupleCount(usize),

    #[error("linestring has {0} vertices, expected at least 2")]
    TooFewVertices(usize),

    #[error("ring has {0} vertices, expected at least 4")]
    RingTooSmall(usize),

    #[error("ring is not closed")]
    RingNotClosed,

    #[error("polygon has {0} exterior rings, expected 1")]
    ExteriorRingCount(usize),

    #[error("`MultiGeometry` cannot be nested")]
    NestedCollection,

    #[error("`MultiGeometry` has no members")]
    EmptyCollection,

    #[error("unexpected content after the geometry")]
    TrailingContent,
}

/// A structural mismatch at a particular node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {span}")]
pub struct StructureError {
    pub kind: StructureErrorKind,
    pub span: Span,
}

impl StructureError {
    pub fn new(kind: StructureErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Which configured limit was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    InputLength,
    Depth,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::InputLength => f.write_str("input length"),
            LimitKind::Depth => f.write_str("nesting depth"),
        }
    }
}

/// Error returned when parsing fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The scanner could not tokenize the input.
    #[error("{code} at {span}")]
    Scan { code: ScanErrorCode, span: Span },

    /// Tags are not properly nested.
    #[error("{kind} at {span}")]
    Grammar { kind: GrammarErrorKind, span: Span },

    /// The node tree does not match the grammar of its geometry.
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// The top-level element is not a recognized geometry keyword.
    #[error("unsupported geometry type `{name}` at {span}")]
    UnsupportedType { name: String, span: Span },

    #[error("{what} limit of {limit} exceeded")]
    Limit { what: LimitKind, limit: usize },
}

impl ParseError {
    /// Location of the failure, when there is one.
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Scan { span, .. }
            | ParseError::Grammar { span, .. }
            | ParseError::UnsupportedType { span, .. } => Some(*span),
            ParseError::Structure(e) => Some(e.span),
            ParseError::Limit { .. } => None,
        }
    }

    pub(crate) fn scan(code: ScanErrorCode, span: Span) -> Self {
        ParseError::Scan { code, span }
    }

    pub(crate) fn grammar(kind: GrammarErrorKind, span: Span) -> Self {
        ParseError::Grammar { kind, span }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
