//! Node tree for KML markup.
//!
//! The tree is the intermediate representation between the scanner and the
//! geometry assembler. Nodes live in an index-based [`Arena`]; a
//! [`NodeId`] is a handle into it, which gives parent links without
//! reference cycles.
//!
//! # Example
//!
//! ```
//! use kml_core::tree::Document;
//! use kml_core::Tag;
//!
//! let input = b"<Point id=\"home\"><coordinates>10,20</coordinates></Point>";
//! let doc = Document::parse(input).unwrap();
//!
//! let point = doc.root().unwrap();
//! assert_eq!(point.tag(), Tag::Point);
//! assert_eq!(point.attr("id"), Some("home"));
//!
//! let coords = point.first_child().unwrap();
//! assert_eq!(coords.coordinate_tokens().collect::<Vec<_>>(), ["10,20"]);
//! ```

use std::fmt;

use crate::arena::{Arena, ArenaStats, EntryKind, Handle, ReleasePolicy, Tracked};
use crate::error::{GrammarErrorKind, LimitKind, ParseError, Result};
use crate::event::Event;
use crate::options::ParseOptions;
use crate::scanner::Scanner;
use crate::span::Span;
use crate::tag::Tag;

// ============================================================================
// Core Types
// ============================================================================

/// Handle of a node in its document.
pub type NodeId = Handle<NodeData>;

/// One raw coordinate token, e.g. `10,20,5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    pub raw: String,
    pub span: Span,
}

impl Tracked for Coordinate {
    const KIND: EntryKind = EntryKind::Coordinate;
}

/// A `key=value` pair with the value de-quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    /// Build an attribute, stripping one pair of matching quotes from `value`.
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: dequote(value).to_string(),
        }
    }
}

impl Tracked for Attribute {
    const KIND: EntryKind = EntryKind::Attribute;
}

/// Strip exactly one leading and one trailing quote if both are present
/// and equal; otherwise return the text unchanged.
pub fn dequote(value: &str) -> &str {
    let bytes = value.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&open @ (b'"' | b'\'')), Some(&close)) if bytes.len() >= 2 && open == close => {
            &value[1..value.len() - 1]
        }
        _ => value,
    }
}

/// Lifecycle state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Opened, closing tag not seen yet.
    Open,
    /// `<name/>`, no content.
    SelfClosed,
    /// Opened and matched by its closing tag.
    Close,
}

/// Internal node storage.
#[derive(Debug)]
pub struct NodeData {
    name: String,
    tag: Tag,
    kind: NodeKind,
    error: bool,
    attributes: Vec<Attribute>,
    coordinates: Vec<Coordinate>,
    span: Span,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Tracked for NodeData {
    const KIND: EntryKind = EntryKind::Node;
}

/// Arena accounting for one parse, per tracked kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub nodes: ArenaStats,
    pub attributes: ArenaStats,
    pub coordinates: ArenaStats,
}

impl CleanupReport {
    /// Every registered entry was adopted or released exactly once.
    pub fn is_balanced(&self) -> bool {
        self.nodes.is_balanced() && self.attributes.is_balanced() && self.coordinates.is_balanced()
    }

    pub(crate) fn empty() -> Self {
        Self {
            nodes: ArenaStats::new(EntryKind::Node),
            attributes: ArenaStats::new(EntryKind::Attribute),
            coordinates: ArenaStats::new(EntryKind::Coordinate),
        }
    }

    pub fn registered(&self) -> usize {
        self.nodes.registered + self.attributes.registered + self.coordinates.registered
    }
}

// ============================================================================
// Document
// ============================================================================

/// A parsed markup document as a tree.
pub struct Document {
    nodes: Arena<NodeData>,
    roots: Vec<NodeId>,
}

impl Document {
    /// Scan and build a tree with default options.
    pub fn parse(input: &[u8]) -> Result<Self> {
        Self::parse_with(input, &ParseOptions::default())
    }

    pub fn parse_with(input: &[u8], options: &ParseOptions) -> Result<Self> {
        Self::build(input, options).0
    }

    /// Scan and build a tree, returning the build-time arena accounting.
    ///
    /// On failure every transient allocation has already been released and
    /// the report is balanced. On success the nodes are still live in the
    /// document; [`Document::release`] accounts for them.
    pub fn build(input: &[u8], options: &ParseOptions) -> (Result<Self>, CleanupReport) {
        let mut builder = TreeBuilder::new(options.max_depth);
        let built = Scanner::new(input)
            .scan(|event| builder.handle_event(event))
            .and_then(|()| builder.check_complete());

        match built {
            Ok(()) => {
                let (doc, report) = builder.finish();
                (Ok(doc), report)
            }
            Err(err) => {
                let report = builder.abort();
                tracing::debug!(error = %err, registered = report.registered(), "tree build failed");
                (Err(err), report)
            }
        }
    }

    /// The first top-level element.
    pub fn root(&self) -> Option<Node<'_>> {
        self.roots.first().map(|&id| Node { doc: self, id })
    }

    /// All top-level elements.
    pub fn roots(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        self.roots.iter().map(move |&id| Node { doc: self, id })
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        self.nodes.get(id).map(|_| Node { doc: self, id })
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.live()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Every node in document order (depth-first, pre-order).
    pub fn descendants(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.nodes[id].children.iter().rev().copied());
            Some(Node { doc: self, id })
        })
    }

    /// Free the tree, returning its node accounting.
    pub fn release(self) -> ArenaStats {
        self.nodes.release_all(ReleasePolicy::Discard)
    }

    fn node_data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id]
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.roots()).finish()
    }
}

// ============================================================================
// Node (navigation handle)
// ============================================================================

/// A handle for navigating the document tree.
#[derive(Clone, Copy)]
pub struct Node<'doc> {
    doc: &'doc Document,
    id: NodeId,
}

impl<'doc> Node<'doc> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn data(&self) -> &'doc NodeData {
        self.doc.node_data(self.id)
    }

    /// Tag name as written.
    pub fn name(&self) -> &'doc str {
        &self.data().name
    }

    pub fn tag(&self) -> Tag {
        self.data().tag
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    /// Set when the closing tag did not match this node.
    pub fn has_error(&self) -> bool {
        self.data().error
    }

    /// From the opening tag through the closing tag.
    pub fn span(&self) -> Span {
        self.data().span
    }

    pub fn attributes(&self) -> &'doc [Attribute] {
        &self.data().attributes
    }

    pub fn attr(&self, key: &str) -> Option<&'doc str> {
        self.attributes()
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    pub fn coordinates(&self) -> &'doc [Coordinate] {
        &self.data().coordinates
    }

    pub fn coordinate_tokens(&self) -> impl Iterator<Item = &'doc str> {
        self.coordinates().iter().map(|c| c.raw.as_str())
    }

    pub fn parent(&self) -> Option<Node<'doc>> {
        self.data().parent.map(|id| Node { doc: self.doc, id })
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'doc>> + 'doc {
        let doc = self.doc;
        self.data().children.iter().map(move |&id| Node { doc, id })
    }

    pub fn first_child(&self) -> Option<Node<'doc>> {
        self.data().children.first().map(|&id| Node { doc: self.doc, id })
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn next_sibling(&self) -> Option<Node<'doc>> {
        let siblings = match self.data().parent {
            Some(parent) => &self.doc.node_data(parent).children,
            None => &self.doc.roots,
        };
        let pos = siblings.iter().position(|&id| id == self.id)?;
        siblings.get(pos + 1).map(|&id| Node { doc: self.doc, id })
    }
}

impl<'doc> fmt::Debug for Node<'doc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("name", &self.name()).field("kind", &self.kind());
        if !self.attributes().is_empty() {
            s.field("attributes", &self.attributes());
        }
        if !self.coordinates().is_empty() {
            s.field("coordinates", &self.coordinate_tokens().collect::<Vec<_>>());
        }
        if self.child_count() > 0 {
            s.field("children", &self.children().collect::<Vec<_>>());
        }
        s.finish()
    }
}

// ============================================================================
// TreeBuilder (event consumer)
// ============================================================================

/// Builds a document tree from scanner events.
///
/// The `make_*` operations are the callback contract for a grammar driver:
/// attributes and coordinates are created (and tracked) first, then handed
/// to the node that absorbs them. Whatever is still tracked when the build
/// ends is released by [`TreeBuilder::finish`] or [`TreeBuilder::abort`].
pub struct TreeBuilder {
    nodes: Arena<NodeData>,
    attributes: Arena<Attribute>,
    coordinates: Arena<Coordinate>,
    /// Stack of open node IDs.
    stack: Vec<NodeId>,
    roots: Vec<NodeId>,
    max_depth: usize,
}

impl TreeBuilder {
    pub fn new(max_depth: usize) -> Self {
        TreeBuilder {
            nodes: Arena::new(),
            attributes: Arena::new(),
            coordinates: Arena::new(),
            stack: Vec::new(),
            roots: Vec::new(),
            max_depth,
        }
    }

    pub fn make_coordinate(&mut self, raw: &str, span: Span) -> Handle<Coordinate> {
        self.coordinates.register(Coordinate {
            raw: raw.to_string(),
            span,
        })
    }

    pub fn make_attribute(&mut self, key: &str, value: &str) -> Handle<Attribute> {
        self.attributes.register(Attribute::new(key, value))
    }

    /// Open a node; it becomes the parent of everything until its close.
    pub fn make_node(
        &mut self,
        name: &str,
        span: Span,
        attributes: &[Handle<Attribute>],
        coordinates: &[Handle<Coordinate>],
    ) -> Result<NodeId> {
        if self.stack.len() >= self.max_depth {
            return Err(ParseError::Limit {
                what: LimitKind::Depth,
                limit: self.max_depth,
            });
        }
        let id = self.push_node(name, NodeKind::Open, span, attributes, coordinates);
        self.stack.push(id);
        Ok(id)
    }

    pub fn make_self_closed_node(
        &mut self,
        name: &str,
        span: Span,
        attributes: &[Handle<Attribute>],
    ) -> Result<NodeId> {
        if self.stack.len() >= self.max_depth {
            return Err(ParseError::Limit {
                what: LimitKind::Depth,
                limit: self.max_depth,
            });
        }
        Ok(self.push_node(name, NodeKind::SelfClosed, span, attributes, &[]))
    }

    /// Close the innermost open node, which must be called `name`.
    pub fn make_closing_node(&mut self, name: &str, span: Span) -> Result<NodeId> {
        let Some(&id) = self.stack.last() else {
            return Err(ParseError::grammar(
                GrammarErrorKind::UnmatchedClose(name.to_string()),
                span,
            ));
        };
        let node = &mut self.nodes[id];
        if node.name != name {
            node.error = true;
            return Err(ParseError::grammar(
                GrammarErrorKind::MismatchedClose {
                    expected: node.name.clone(),
                    found: name.to_string(),
                },
                span,
            ));
        }
        node.kind = NodeKind::Close;
        node.span = node.span.join(span);
        self.stack.pop();
        Ok(id)
    }

    /// Move coordinates into the innermost open node.
    pub fn attach_coordinates(&mut self, coordinates: &[Handle<Coordinate>], span: Span) -> Result<()> {
        let Some(&id) = self.stack.last() else {
            return Err(ParseError::grammar(GrammarErrorKind::TextOutsideElement, span));
        };
        let adopted: Vec<Coordinate> = coordinates
            .iter()
            .filter_map(|&h| self.coordinates.unregister(h))
            .collect();
        self.nodes[id].coordinates.extend(adopted);
        Ok(())
    }

    fn push_node(
        &mut self,
        name: &str,
        kind: NodeKind,
        span: Span,
        attributes: &[Handle<Attribute>],
        coordinates: &[Handle<Coordinate>],
    ) -> NodeId {
        let attributes = attributes
            .iter()
            .filter_map(|&h| self.attributes.unregister(h))
            .collect();
        let coordinates = coordinates
            .iter()
            .filter_map(|&h| self.coordinates.unregister(h))
            .collect();
        let parent = self.stack.last().copied();
        let id = self.nodes.register(NodeData {
            name: name.to_string(),
            tag: Tag::from_name(name),
            kind,
            error: false,
            attributes,
            coordinates,
            span,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(parent) => self.nodes[parent].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn handle_event(&mut self, event: Event<'_>) -> Result<()> {
        match event {
            Event::Open { name, attributes, span } => {
                let attrs: Vec<_> = attributes
                    .iter()
                    .map(|a| self.make_attribute(a.key, a.value))
                    .collect();
                self.make_node(name, span, &attrs, &[])?;
            }
            Event::SelfClosed { name, attributes, span } => {
                let attrs: Vec<_> = attributes
                    .iter()
                    .map(|a| self.make_attribute(a.key, a.value))
                    .collect();
                self.make_self_closed_node(name, span, &attrs)?;
            }
            Event::Close { name, span } => {
                self.make_closing_node(name, span)?;
            }
            Event::Text { content, span } => {
                let base = span.start as usize;
                let tokens: Vec<_> = split_tokens(content)
                    .map(|(offset, token)| {
                        let start = base + offset;
                        self.make_coordinate(token, Span::new(start, start + token.len()))
                    })
                    .collect();
                self.attach_coordinates(&tokens, span)?;
            }
            Event::Comment { .. } => {}
        }
        Ok(())
    }

    /// Fail if elements are still open or nothing was built.
    pub fn check_complete(&self) -> Result<()> {
        if let Some(&id) = self.stack.last() {
            let node = &self.nodes[id];
            return Err(ParseError::grammar(
                GrammarErrorKind::Unclosed(node.name.clone()),
                node.span,
            ));
        }
        if self.roots.is_empty() {
            return Err(ParseError::grammar(GrammarErrorKind::EmptyDocument, Span::default()));
        }
        Ok(())
    }

    /// Hand the nodes to a [`Document`] and release leftover bookkeeping.
    ///
    /// Attributes and coordinates still tracked here were never adopted by
    /// a node; they are released as orphans.
    pub fn finish(self) -> (Document, CleanupReport) {
        let report = CleanupReport {
            nodes: self.nodes.stats(),
            attributes: self.attributes.release_all(ReleasePolicy::Orphans),
            coordinates: self.coordinates.release_all(ReleasePolicy::Orphans),
        };
        tracing::debug!(nodes = self.nodes.live(), roots = self.roots.len(), "tree built");
        let doc = Document {
            nodes: self.nodes,
            roots: self.roots,
        };
        (doc, report)
    }

    /// Release everything built so far.
    pub fn abort(self) -> CleanupReport {
        CleanupReport {
            nodes: self.nodes.release_all(ReleasePolicy::Discard),
            attributes: self.attributes.release_all(ReleasePolicy::Discard),
            coordinates: self.coordinates.release_all(ReleasePolicy::Discard),
        }
    }
}

/// Whitespace-delimited tokens with their byte offsets.
fn split_tokens(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split(|c: char| c.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
        .map(move |token| (token.as_ptr() as usize - text.as_ptr() as usize, token))
}

// ============================================================================
// Tests
// ============================================================================
