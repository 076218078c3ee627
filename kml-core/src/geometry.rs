//! Geometry values produced by the parser.
//!
//! [`Geometry`] is the only object handed to the caller. It is a typed
//! collection: points, linestrings and polygons are kept in separate lists,
//! and [`GeometryType`] says how the whole should be read (a single
//! `Point`, a `MultiPolygon`, a mixed `GeometryCollection`, ...).
//!
//! `Display` renders ISO WKT:
//!
//! ```
//! let geom = kml_core::parse(b"<Point><coordinates>10,20,5</coordinates></Point>").unwrap();
//! assert_eq!(geom.to_string(), "POINT Z (10 20 5)");
//! assert_eq!(geom.to_ewkt(), "SRID=4326;POINT Z (10 20 5)");
//! ```

use std::fmt;

/// One vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Coord {
    #[inline]
    pub fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    #[inline]
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    #[inline]
    pub fn has_z(&self) -> bool {
        self.z.is_some()
    }

    /// Same vertex with Z dropped or filled with `0.0`.
    #[inline]
    pub fn with_dimension(self, dimension: Dimension) -> Self {
        if dimension.has_z() {
            Self::xyz(self.x, self.y, self.z.unwrap_or(0.0))
        } else {
            Self::xy(self.x, self.y)
        }
    }
}

/// Which ordinates the geometry carries besides X and Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dimension {
    #[default]
    Xy,
    Xyz,
    Xym,
    Xyzm,
}

impl Dimension {
    pub fn from_flags(has_z: bool, has_m: bool) -> Self {
        match (has_z, has_m) {
            (false, false) => Dimension::Xy,
            (true, false) => Dimension::Xyz,
            (false, true) => Dimension::Xym,
            (true, true) => Dimension::Xyzm,
        }
    }

    pub fn has_z(self) -> bool {
        matches!(self, Dimension::Xyz | Dimension::Xyzm)
    }

    pub fn has_m(self) -> bool {
        matches!(self, Dimension::Xym | Dimension::Xyzm)
    }

    fn wkt_suffix(self) -> &'static str {
        match self {
            Dimension::Xy => "",
            Dimension::Xyz => " Z",
            Dimension::Xym => " M",
            Dimension::Xyzm => " ZM",
        }
    }
}

/// Normalized classification of a parsed geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryType {
    pub fn wkt_name(self) -> &'static str {
        match self {
            GeometryType::Point => "POINT",
            GeometryType::LineString => "LINESTRING",
            GeometryType::Polygon => "POLYGON",
            GeometryType::MultiPoint => "MULTIPOINT",
            GeometryType::MultiLineString => "MULTILINESTRING",
            GeometryType::MultiPolygon => "MULTIPOLYGON",
            GeometryType::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wkt_name())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineString {
    pub coords: Vec<Coord>,
}

impl LineString {
    pub fn new(coords: Vec<Coord>) -> Self {
        Self { coords }
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// First and last vertex equal, component-wise.
    pub fn is_closed(&self) -> bool {
        match (self.coords.first(), self.coords.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }
}

/// Polygon rings are closed linestrings.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: LineString,
    pub interiors: Vec<LineString>,
}

impl Polygon {
    pub fn rings(&self) -> impl Iterator<Item = &LineString> {
        std::iter::once(&self.exterior).chain(self.interiors.iter())
    }
}

/// Axis-aligned extent of a geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    /// Only set for geometries with Z.
    pub z_range: Option<(f64, f64)>,
}

impl BoundingBox {
    fn from_coord(c: &Coord) -> Self {
        Self {
            min_x: c.x,
            min_y: c.y,
            max_x: c.x,
            max_y: c.y,
            z_range: c.z.map(|z| (z, z)),
        }
    }

    fn extend(&mut self, c: &Coord) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
        if let (Some((lo, hi)), Some(z)) = (self.z_range.as_mut(), c.z) {
            *lo = lo.min(z);
            *hi = hi.max(z);
        }
    }
}

/// A parsed geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub(crate) srid: i32,
    pub(crate) dimension: Dimension,
    pub(crate) declared_type: GeometryType,
    pub(crate) points: Vec<Coord>,
    pub(crate) linestrings: Vec<LineString>,
    pub(crate) polygons: Vec<Polygon>,
}

impl Geometry {
    pub fn srid(&self) -> i32 {
        self.srid
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn declared_type(&self) -> GeometryType {
        self.declared_type
    }

    pub fn points(&self) -> &[Coord] {
        &self.points
    }

    pub fn linestrings(&self) -> &[LineString] {
        &self.linestrings
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Every vertex, in point, linestring, polygon order.
    pub fn coords(&self) -> impl Iterator<Item = &Coord> {
        self.points
            .iter()
            .chain(self.linestrings.iter().flat_map(|l| l.coords.iter()))
            .chain(
                self.polygons
                    .iter()
                    .flat_map(|p| p.rings())
                    .flat_map(|r| r.coords.iter()),
            )
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut coords = self.coords();
        let mut bbox = BoundingBox::from_coord(coords.next()?);
        for c in coords {
            bbox.extend(c);
        }
        Some(bbox)
    }

    /// WKT prefixed with `SRID=<srid>;`.
    pub fn to_ewkt(&self) -> String {
        format!("SRID={};{}", self.srid, self)
    }
}

// ============================================================================
// WKT
// ============================================================================

fn write_coord(f: &mut fmt::Formatter<'_>, c: &Coord) -> fmt::Result {
    write!(f, "{} {}", c.x, c.y)?;
    if let Some(z) = c.z {
        write!(f, " {}", z)?;
    }
    Ok(())
}

fn write_coords(f: &mut fmt::Formatter<'_>, coords: &[Coord]) -> fmt::Result {
    f.write_str("(")?;
    for (i, c) in coords.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_coord(f, c)?;
    }
    f.write_str(")")
}

fn write_polygon(f: &mut fmt::Formatter<'_>, polygon: &Polygon) -> fmt::Result {
    f.write_str("(")?;
    for (i, ring) in polygon.rings().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_coords(f, &ring.coords)?;
    }
    f.write_str(")")
}

/// `items` separated by `", "`, wrapped in parentheses.
fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut write_item: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    f.write_str("(")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_item(f, item)?;
    }
    f.write_str(")")
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dim = self.dimension.wkt_suffix();
        write!(f, "{}{} ", self.declared_type.wkt_name(), dim)?;
        match self.declared_type {
            GeometryType::Point => match self.points.first() {
                Some(c) => write_coords(f, std::slice::from_ref(c)),
                None => f.write_str("EMPTY"),
            },
            GeometryType::LineString => match self.linestrings.first() {
                Some(l) => write_coords(f, &l.coords),
                None => f.write_str("EMPTY"),
            },
            GeometryType::Polygon => match self.polygons.first() {
                Some(p) => write_polygon(f, p),
                None => f.write_str("EMPTY"),
            },
            GeometryType::MultiPoint => {
                write_list(f, &self.points, |f, c| write_coords(f, std::slice::from_ref(c)))
            }
            GeometryType::MultiLineString => {
                write_list(f, &self.linestrings, |f, l| write_coords(f, &l.coords))
            }
            GeometryType::MultiPolygon => write_list(f, &self.polygons, write_polygon),
            GeometryType::GeometryCollection => {
                f.write_str("(")?;
                let mut first = true;
                let mut sep = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
                    if !std::mem::take(&mut first) {
                        f.write_str(", ")?;
                    }
                    Ok(())
                };
                for c in &self.points {
                    sep(f)?;
                    write!(f, "POINT{} ", dim)?;
                    write_coords(f, std::slice::from_ref(c))?;
                }
                for l in &self.linestrings {
                    sep(f)?;
                    write!(f, "LINESTRING{} ", dim)?;
                    write_coords(f, &l.coords)?;
                }
                for p in &self.polygons {
                    sep(f)?;
                    write!(f, "POLYGON{} ", dim)?;
                    write_polygon(f, p)?;
                }
                f.write_str(")")
            }
        }
    }
}
