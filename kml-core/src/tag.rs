//! Tag names the geometry grammars care about.
//!
//! Names are resolved once, when a node is created, so the assembler matches
//! on [`Tag`] instead of comparing strings. Matching is exact and
//! case-sensitive; anything else is [`Tag::Other`].

use phf::phf_map;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Point,
    LineString,
    Polygon,
    MultiGeometry,
    OuterBoundaryIs,
    InnerBoundaryIs,
    LinearRing,
    Coordinates,
    /// Any name outside the geometry vocabulary.
    Other,
}

static TAGS: phf::Map<&'static str, Tag> = phf_map! {
    "Point" => Tag::Point,
    "LineString" => Tag::LineString,
    "Polygon" => Tag::Polygon,
    "MultiGeometry" => Tag::MultiGeometry,
    "outerBoundaryIs" => Tag::OuterBoundaryIs,
    "innerBoundaryIs" => Tag::InnerBoundaryIs,
    "LinearRing" => Tag::LinearRing,
    "coordinates" => Tag::Coordinates,
};

impl Tag {
    #[inline]
    pub fn from_name(name: &str) -> Tag {
        TAGS.get(name).copied().unwrap_or(Tag::Other)
    }

    /// The markup spelling, or `"?"` for [`Tag::Other`].
    pub fn name(self) -> &'static str {
        match self {
            Tag::Point => "Point",
            Tag::LineString => "LineString",
            Tag::Polygon => "Polygon",
            Tag::MultiGeometry => "MultiGeometry",
            Tag::OuterBoundaryIs => "outerBoundaryIs",
            Tag::InnerBoundaryIs => "innerBoundaryIs",
            Tag::LinearRing => "LinearRing",
            Tag::Coordinates => "coordinates",
            Tag::Other => "?",
        }
    }

    /// Keywords accepted as the root of a geometry.
    pub fn is_geometry(self) -> bool {
        matches!(
            self,
            Tag::Point | Tag::LineString | Tag::Polygon | Tag::MultiGeometry
        )
    }

    pub fn is_boundary(self) -> bool {
        matches!(self, Tag::OuterBoundaryIs | Tag::InnerBoundaryIs)
    }
}
