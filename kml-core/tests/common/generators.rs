//! Stochastic content generators for test variations
//!
//! Uses seeded RNG for reproducibility. Print seed on failure for replay.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded generator for reproducible stochastic tests
pub struct Gen {
    pub rng: StdRng,
    pub seed: u64,
}

impl Gen {
    /// Create with specific seed (for reproduction)
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create from environment or random seed
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var("KML_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);
        Self::new(seed)
    }

    /// Geometric distribution: count until rand > alpha
    /// Returns 0, 1, 2, ... with decreasing probability
    pub fn geometric(&mut self, alpha: f64) -> usize {
        let mut n = 0;
        while self.rng.gen::<f64>() < alpha {
            n += 1;
        }
        n
    }

    /// Random boolean with probability p
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// Random element name (ASCII subset of XID_Start + XID_Continue*)
    pub fn name(&mut self) -> String {
        let len = 1 + self.geometric(0.7);
        let mut name = String::with_capacity(len);
        name.push(self.rng.gen_range(b'a'..=b'z') as char);
        let chars = b"abcdefghijklmnopqrstuvwxyz0123456789-_";
        for _ in 1..len {
            name.push(chars[self.rng.gen_range(0..chars.len())] as char);
        }
        name
    }

    /// Whitespace and comments, usually empty
    pub fn filler(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        for _ in 0..self.geometric(0.3) {
            match self.rng.gen_range(0..4) {
                0 => out.push(b' '),
                1 => out.push(b'\n'),
                2 => out.extend(b"\t  "),
                _ => {
                    out.extend(b"<!-- ");
                    out.extend(self.name().as_bytes());
                    out.extend(b" -->");
                }
            }
        }
        out
    }

    /// Coordinate component with up to 3 decimals
    pub fn ordinate(&mut self) -> f64 {
        let scaled: i32 = self.rng.gen_range(-180_000..=180_000);
        f64::from(scaled) / 1000.0
    }

    /// One vertex, 3D with probability `p_z`
    pub fn vertex(&mut self, p_z: f64) -> Vertex {
        Vertex {
            x: self.ordinate(),
            y: self.ordinate(),
            z: if self.chance(p_z) { Some(self.ordinate()) } else { None },
        }
    }

    /// Separator between tuples in a coordinates block
    pub fn tuple_separator(&mut self) -> &'static str {
        match self.rng.gen_range(0..4) {
            0 => "\n",
            1 => "  ",
            2 => "\n    ",
            _ => " ",
        }
    }

    /// Render vertices as the text of a `coordinates` element
    pub fn coordinates(&mut self, vertices: &[Vertex]) -> String {
        let mut out = String::new();
        for (i, v) in vertices.iter().enumerate() {
            if i > 0 {
                out.push_str(self.tuple_separator());
            }
            out.push_str(&v.to_kml());
        }
        out
    }

    /// Random valid member geometry
    pub fn member(&mut self) -> Generated {
        match self.rng.gen_range(0..3) {
            0 => self.point(),
            1 => self.line_string(),
            _ => self.polygon(),
        }
    }

    pub fn point(&mut self) -> Generated {
        let v = self.vertex(0.5);
        let coords = self.coordinates(&[v]);
        Generated {
            kml: format!("<Point><coordinates>{}</coordinates></Point>", coords),
            kind: Kind::Point,
            has_z: v.z.is_some(),
        }
    }

    pub fn line_string(&mut self) -> Generated {
        let p_z = if self.chance(0.5) { 1.0 } else { 0.0 };
        let count = 2 + self.geometric(0.6);
        let vertices: Vec<Vertex> = (0..count).map(|_| self.vertex(p_z)).collect();
        let coords = self.coordinates(&vertices);
        Generated {
            kml: format!("<LineString><coordinates>{}</coordinates></LineString>", coords),
            kind: Kind::LineString,
            has_z: p_z > 0.0,
        }
    }

    /// Closed ring of at least 4 vertices
    pub fn ring(&mut self, p_z: f64) -> Vec<Vertex> {
        let count = 3 + self.geometric(0.5);
        let mut vertices: Vec<Vertex> = (0..count).map(|_| self.vertex(p_z)).collect();
        vertices.push(vertices[0]);
        vertices
    }

    pub fn polygon(&mut self) -> Generated {
        let p_z = if self.chance(0.5) { 1.0 } else { 0.0 };
        let holes = self.geometric(0.4);
        let outer_at = self.rng.gen_range(0..=holes);
        let mut body = String::new();
        for i in 0..=holes {
            let tag = if i == outer_at { "outerBoundaryIs" } else { "innerBoundaryIs" };
            let ring = self.ring(p_z);
            let coords = self.coordinates(&ring);
            body.push_str(&format!(
                "<{tag}><LinearRing><coordinates>{coords}</coordinates></LinearRing></{tag}>"
            ));
        }
        Generated {
            kml: format!("<Polygon>{}</Polygon>", body),
            kind: Kind::Polygon(holes),
            has_z: p_z > 0.0,
        }
    }

    /// MultiGeometry of 1 to 5 random members
    pub fn multi(&mut self) -> (String, Vec<Generated>) {
        let count = 1 + self.geometric(0.5).min(4);
        let members: Vec<Generated> = (0..count).map(|_| self.member()).collect();
        let body: String = members.iter().map(|m| m.kml.as_str()).collect();
        (format!("<MultiGeometry>{}</MultiGeometry>", body), members)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Vertex {
    pub fn to_kml(&self) -> String {
        match self.z {
            Some(z) => format!("{},{},{}", self.x, self.y, z),
            None => format!("{},{}", self.x, self.y),
        }
    }
}

/// Which member grammar a generated fragment uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Point,
    LineString,
    /// Number of interior rings
    Polygon(usize),
}

#[derive(Debug, Clone)]
pub struct Generated {
    pub kml: String,
    pub kind: Kind,
    pub has_z: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducibility() {
        let mut g1 = Gen::new(42);
        let mut g2 = Gen::new(42);

        for _ in 0..10 {
            assert_eq!(g1.name(), g2.name());
            assert_eq!(g1.member().kml, g2.member().kml);
        }
    }

    #[test]
    fn test_rings_are_closed() {
        let mut gen = Gen::new(7);
        for _ in 0..50 {
            let ring = gen.ring(0.5);
            assert!(ring.len() >= 4);
            assert_eq!(ring.first(), ring.last());
        }
    }
}
