//! Fragment list to one typed [`Geometry`].
//!
//! | points | lines | polygons | result                                   |
//! |--------|-------|----------|------------------------------------------|
//! | 1      | 0     | 0        | `Point` (`MultiPoint` under MultiGeometry) |
//! | 0      | 1     | 0        | `LineString` (or `MultiLineString`)      |
//! | 0      | 0     | 1        | `Polygon` (or `MultiPolygon`)            |
//! | n > 1  | 0     | 0        | `MultiPoint`, and likewise per kind      |
//! | mixed  |       |          | `GeometryCollection`                     |
//!
//! The result is 2D only if no fragment carries Z. Otherwise it is 3D and
//! every vertex of a 2D fragment gets `z = 0`.

use crate::assemble::{Assembly, Fragment};
use crate::geometry::{Coord, Dimension, Geometry, GeometryType, LineString, Polygon};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    points: usize,
    lines: usize,
    polygons: usize,
    any_z: bool,
}

impl Tally {
    fn of(fragments: &[Fragment]) -> Self {
        let mut tally = Tally::default();
        for fragment in fragments {
            match fragment {
                Fragment::Point(_) => tally.points += 1,
                Fragment::LineString(_) => tally.lines += 1,
                Fragment::Polygon(_) => tally.polygons += 1,
            }
            tally.any_z |= fragment.has_z();
        }
        tally
    }

    fn declared_type(&self, collection: bool) -> GeometryType {
        match (self.points, self.lines, self.polygons) {
            (1, 0, 0) if !collection => GeometryType::Point,
            (0, 1, 0) if !collection => GeometryType::LineString,
            (0, 0, 1) if !collection => GeometryType::Polygon,
            (1.., 0, 0) => GeometryType::MultiPoint,
            (0, 1.., 0) => GeometryType::MultiLineString,
            (0, 0, 1..) => GeometryType::MultiPolygon,
            _ => GeometryType::GeometryCollection,
        }
    }
}

/// Build the final geometry, copying coordinates out of the fragments.
pub fn unify(assembly: &Assembly, srid: i32) -> Geometry {
    let tally = Tally::of(&assembly.fragments);
    let declared_type = tally.declared_type(assembly.is_collection());
    let dimension = Dimension::from_flags(tally.any_z, false);

    let line = |l: &LineString| LineString::new(copy_coords(&l.coords, dimension));
    let mut geometry = Geometry {
        srid,
        dimension,
        declared_type,
        points: Vec::with_capacity(tally.points),
        linestrings: Vec::with_capacity(tally.lines),
        polygons: Vec::with_capacity(tally.polygons),
    };
    for fragment in &assembly.fragments {
        match fragment {
            Fragment::Point(c) => geometry.points.push(c.with_dimension(dimension)),
            Fragment::LineString(l) => geometry.linestrings.push(line(l)),
            Fragment::Polygon(p) => geometry.polygons.push(Polygon {
                exterior: line(&p.exterior),
                interiors: p.interiors.iter().map(line).collect(),
            }),
        }
    }

    tracing::debug!(
        declared_type = %declared_type,
        ?dimension,
        points = tally.points,
        lines = tally.lines,
        polygons = tally.polygons,
        "unified"
    );
    geometry
}

fn copy_coords(coords: &[Coord], dimension: Dimension) -> Vec<Coord> {
    coords.iter().map(|c| c.with_dimension(dimension)).collect()
}
