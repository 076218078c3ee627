//! Scanner events - the contract between the scanner and the tree builder.
//!
//! SAX-style: events are emitted as the scanner encounters markup, with no
//! accumulation. Structure is represented by `Open`/`Close` pairs, or a
//! single `SelfClosed`.
//!
//! All string slices are zero-copy references into the input buffer.
//! Attribute values are passed raw, quotes included; de-quoting is the tree
//! builder's job.
//!
//! ## Event Sequences
//!
//! `<Point id="p1"><coordinates>10,20</coordinates></Point>` emits:
//! ```text
//! Open { name: "Point", attributes: [id = "\"p1\""] }
//! Open { name: "coordinates" }
//! Text("10,20")
//! Close { name: "coordinates" }
//! Close { name: "Point" }
//! ```

use crate::span::Span;

/// One `key=value` pair inside a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAttribute<'a> {
    pub key: &'a str,
    /// Value as written, including any surrounding quotes.
    pub value: &'a str,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    // ========== Structure Events ==========

    /// Opening tag: `<name ...>`
    Open {
        name: &'a str,
        attributes: Vec<RawAttribute<'a>>,
        span: Span,
    },

    /// Self-closing tag: `<name .../>`
    SelfClosed {
        name: &'a str,
        attributes: Vec<RawAttribute<'a>>,
        span: Span,
    },

    /// Closing tag: `</name>`
    Close {
        name: &'a str,
        span: Span,
    },

    // ========== Content Events ==========

    /// Character content between tags, whitespace-only runs excluded.
    /// CDATA sections arrive here too, without their delimiters.
    Text {
        content: &'a str,
        span: Span,
    },

    /// Comment: `<!-- text -->`
    Comment {
        content: &'a str,
        span: Span,
    },
}

impl<'a> Event<'a> {
    /// Get the span for this event.
    pub fn span(&self) -> Span {
        match self {
            Event::Open { span, .. } => *span,
            Event::SelfClosed { span, .. } => *span,
            Event::Close { span, .. } => *span,
            Event::Text { span, .. } => *span,
            Event::Comment { span, .. } => *span,
        }
    }

    /// Tag name for structure events.
    pub fn name(&self) -> Option<&'a str> {
        match self {
            Event::Open { name, .. } | Event::SelfClosed { name, .. } | Event::Close { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }
}
