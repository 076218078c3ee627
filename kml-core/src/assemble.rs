//! Geometry assembly: node tree to geometry fragments.
//!
//! Each geometry keyword has a small grammar over its children:
//!
//! ```text
//! Point         := coordinates                      (one tuple)
//! LineString    := coordinates                      (two or more tuples)
//! Polygon       := boundary+
//! boundary      := (outerBoundaryIs | innerBoundaryIs) > LinearRing > coordinates
//! MultiGeometry := (Point | LineString | Polygon)+
//! ```
//!
//! Matching stops at the first node that does not fit; there is no
//! best-effort result. Scratch values ([`DynamicLine`], [`DynamicPolygon`])
//! and the fragment list are owned, so an early return drops them.
//! Attributes are ignored.

use crate::coord::regroup;
use crate::error::{ParseError, StructureError, StructureErrorKind};
use crate::geometry::{Coord, Dimension, LineString, Polygon};
use crate::options::{ParseOptions, RingClosure};
use crate::span::Span;
use crate::tag::Tag;
use crate::tree::{Document, Node};

type Result<T> = std::result::Result<T, StructureError>;

/// Minimum vertices in a linestring.
const MIN_LINE_VERTICES: usize = 2;

/// Minimum vertices in a polygon ring, closing vertex included.
const MIN_RING_VERTICES: usize = 4;

// ============================================================================
// Scratch values
// ============================================================================

/// Growable vertex list, tracking whether every vertex carries Z.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DynamicLine {
    coords: Vec<Coord>,
    has_z: bool,
}

impl DynamicLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, coord: Coord) {
        self.has_z = if self.coords.is_empty() {
            coord.has_z()
        } else {
            self.has_z && coord.has_z()
        };
        self.coords.push(coord);
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// False for an empty line.
    pub fn has_z(&self) -> bool {
        self.has_z
    }

    pub fn is_closed(&self) -> bool {
        match (self.coords.first(), self.coords.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    /// Append the first vertex unless the line is already closed.
    pub fn close(&mut self) {
        if let (false, Some(&first)) = (self.is_closed(), self.coords.first()) {
            self.coords.push(first);
        }
    }

    /// Z is kept only if every vertex carries it.
    pub fn into_line_string(self) -> LineString {
        let dimension = Dimension::from_flags(self.has_z, false);
        self.into_dimension(dimension)
    }

    fn into_dimension(self, dimension: Dimension) -> LineString {
        LineString::new(self.coords.into_iter().map(|c| c.with_dimension(dimension)).collect())
    }
}

impl FromIterator<Coord> for DynamicLine {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        let mut line = DynamicLine::new();
        for coord in iter {
            line.push(coord);
        }
        line
    }
}

/// One ring of a polygon under construction.
#[derive(Debug, Clone, PartialEq)]
struct RingPart {
    line: DynamicLine,
    interior: bool,
}

/// Rings collected before exterior and interiors are separated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DynamicPolygon {
    rings: Vec<RingPart>,
}

impl DynamicPolygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ring(&mut self, line: DynamicLine, interior: bool) {
        self.rings.push(RingPart { line, interior });
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// True only if every ring has Z.
    pub fn has_z(&self) -> bool {
        !self.rings.is_empty() && self.rings.iter().all(|r| r.line.has_z())
    }

    /// Split into one exterior ring and the interiors, in input order.
    /// Every ring gets the polygon's dimension.
    pub fn into_polygon(self) -> std::result::Result<Polygon, StructureErrorKind> {
        let exteriors = self.rings.iter().filter(|r| !r.interior).count();
        if exteriors != 1 {
            return Err(StructureErrorKind::ExteriorRingCount(exteriors));
        }
        let dimension = Dimension::from_flags(self.has_z(), false);
        let mut exterior = None;
        let mut interiors = Vec::with_capacity(self.rings.len() - 1);
        for ring in self.rings {
            if ring.interior {
                interiors.push(ring.line.into_dimension(dimension));
            } else {
                exterior = Some(ring.line.into_dimension(dimension));
            }
        }
        let exterior = exterior.ok_or(StructureErrorKind::ExteriorRingCount(0))?;
        Ok(Polygon { exterior, interiors })
    }
}

// ============================================================================
// Fragments
// ============================================================================

/// One geometry primitive produced by a grammar.
///
/// All vertices of a fragment share one dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Point(Coord),
    LineString(LineString),
    Polygon(Polygon),
}

impl Fragment {
    pub fn has_z(&self) -> bool {
        let first = match self {
            Fragment::Point(c) => Some(c),
            Fragment::LineString(l) => l.coords.first(),
            Fragment::Polygon(p) => p.exterior.coords.first(),
        };
        first.is_some_and(Coord::has_z)
    }
}

/// The fragments of a document plus the keyword they were declared under.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub keyword: Tag,
    pub fragments: Vec<Fragment>,
}

impl Assembly {
    pub fn is_collection(&self) -> bool {
        self.keyword == Tag::MultiGeometry
    }
}

// ============================================================================
// Assembler
// ============================================================================

/// Match the document against the grammar of its root keyword.
pub fn assemble(doc: &Document, options: &ParseOptions) -> std::result::Result<Assembly, ParseError> {
    let mut roots = doc.roots();
    let root = roots.next().ok_or_else(|| {
        StructureError::new(StructureErrorKind::MissingElement("geometry"), Span::default())
    })?;

    if !root.tag().is_geometry() {
        return Err(ParseError::UnsupportedType {
            name: root.name().to_string(),
            span: root.span(),
        });
    }
    if let Some(extra) = roots.next() {
        return Err(StructureError::new(StructureErrorKind::TrailingContent, extra.span()).into());
    }

    let assembler = Assembler {
        ring_closure: options.ring_closure,
    };
    let mut fragments = Vec::new();
    match root.tag() {
        Tag::MultiGeometry => assembler.multi(root, &mut fragments)?,
        _ => fragments.push(assembler.member(root)?),
    }

    tracing::debug!(keyword = root.name(), fragments = fragments.len(), "assembled");
    Ok(Assembly {
        keyword: root.tag(),
        fragments,
    })
}

struct Assembler {
    ring_closure: RingClosure,
}

impl Assembler {
    /// A single Point, LineString or Polygon.
    fn member(&self, node: Node<'_>) -> Result<Fragment> {
        match node.tag() {
            Tag::Point => self.point(node).map(Fragment::Point),
            Tag::LineString => self.line_string(node).map(Fragment::LineString),
            Tag::Polygon => self.polygon(node).map(Fragment::Polygon),
            Tag::MultiGeometry => Err(fail(StructureErrorKind::NestedCollection, node)),
            _ => Err(unexpected("Point, LineString or Polygon", node)),
        }
    }

    fn multi(&self, node: Node<'_>, fragments: &mut Vec<Fragment>) -> Result<()> {
        tracing::trace!(span = %node.span(), "MultiGeometry");
        no_text(node)?;
        for child in node.children() {
            fragments.push(self.member(child)?);
        }
        if fragments.is_empty() {
            return Err(fail(StructureErrorKind::EmptyCollection, node));
        }
        Ok(())
    }

    fn point(&self, node: Node<'_>) -> Result<Coord> {
        tracing::trace!(span = %node.span(), "Point");
        let coords = only_child(node, Tag::Coordinates)?;
        let tuples = read_coordinates(coords)?;
        match tuples.as_slice() {
            [coord] => Ok(*coord),
            _ => Err(fail(StructureErrorKind::PointTupleCount(tuples.len()), coords)),
        }
    }

    fn line_string(&self, node: Node<'_>) -> Result<LineString> {
        tracing::trace!(span = %node.span(), "LineString");
        let coords = only_child(node, Tag::Coordinates)?;
        let line: DynamicLine = read_coordinates(coords)?.into_iter().collect();
        if line.len() < MIN_LINE_VERTICES {
            return Err(fail(StructureErrorKind::TooFewVertices(line.len()), coords));
        }
        Ok(line.into_line_string())
    }

    fn polygon(&self, node: Node<'_>) -> Result<Polygon> {
        tracing::trace!(span = %node.span(), "Polygon");
        no_text(node)?;
        let mut polygon = DynamicPolygon::new();
        for boundary in node.children() {
            if !boundary.tag().is_boundary() {
                return Err(unexpected("outerBoundaryIs or innerBoundaryIs", boundary));
            }
            let interior = boundary.tag() == Tag::InnerBoundaryIs;
            polygon.push_ring(self.ring(boundary)?, interior);
        }
        if polygon.ring_count() == 0 {
            return Err(fail(StructureErrorKind::MissingElement("outerBoundaryIs"), node));
        }
        tracing::trace!(rings = polygon.ring_count(), has_z = polygon.has_z(), "rings collected");
        polygon.into_polygon().map_err(|kind| fail(kind, node))
    }

    /// `boundary > LinearRing > coordinates`
    fn ring(&self, boundary: Node<'_>) -> Result<DynamicLine> {
        let ring = only_child(boundary, Tag::LinearRing)?;
        let coords = only_child(ring, Tag::Coordinates)?;
        let mut line: DynamicLine = read_coordinates(coords)?.into_iter().collect();

        if self.ring_closure == RingClosure::AutoClose {
            line.close();
        }
        if line.len() < MIN_RING_VERTICES {
            return Err(fail(StructureErrorKind::RingTooSmall(line.len()), coords));
        }
        if !line.is_closed() {
            return Err(fail(StructureErrorKind::RingNotClosed, coords));
        }
        Ok(line)
    }
}

fn fail(kind: StructureErrorKind, node: Node<'_>) -> StructureError {
    StructureError::new(kind, node.span())
}

fn unexpected(expected: &'static str, node: Node<'_>) -> StructureError {
    fail(
        StructureErrorKind::UnexpectedTag {
            expected,
            found: node.name().to_string(),
        },
        node,
    )
}

/// Text directly inside a structural element is an error.
fn no_text(node: Node<'_>) -> Result<()> {
    match node.coordinates().first() {
        Some(text) => Err(StructureError::new(StructureErrorKind::UnexpectedText, text.span)),
        None => Ok(()),
    }
}

/// The single child of `node`, which must be a `tag` element.
fn only_child<'doc>(node: Node<'doc>, tag: Tag) -> Result<Node<'doc>> {
    no_text(node)?;
    let mut children = node.children();
    let child = children
        .next()
        .ok_or_else(|| fail(StructureErrorKind::MissingElement(tag.name()), node))?;
    if child.tag() != tag {
        return Err(unexpected(tag.name(), child));
    }
    if let Some(extra) = children.next() {
        return Err(unexpected(closing_tag(node.tag()), extra));
    }
    Ok(child)
}

fn closing_tag(tag: Tag) -> &'static str {
    match tag {
        Tag::Point => "</Point>",
        Tag::LineString => "</LineString>",
        Tag::Polygon => "</Polygon>",
        Tag::MultiGeometry => "</MultiGeometry>",
        Tag::OuterBoundaryIs => "</outerBoundaryIs>",
        Tag::InnerBoundaryIs => "</innerBoundaryIs>",
        Tag::LinearRing => "</LinearRing>",
        Tag::Coordinates => "</coordinates>",
        Tag::Other => "closing tag",
    }
}

/// Regroup the tokens of a `coordinates` element into vertices.
fn read_coordinates(node: Node<'_>) -> Result<Vec<Coord>> {
    if let Some(child) = node.first_child() {
        return Err(unexpected(closing_tag(Tag::Coordinates), child));
    }
    let tuples = regroup(node.coordinate_tokens()).map_err(|kind| fail(kind, node))?;
    if tuples.is_empty() {
        return Err(fail(StructureErrorKind::EmptyCoordinates, node));
    }
    tracing::trace!(tuples = tuples.len(), "coordinates");
    Ok(tuples)
}
