//! Coordinate text to numeric tuples.
//!
//! KML writes a coordinate list as whitespace-separated tuples whose
//! components are joined by commas: `10,20,5 30,40,5`. The tree builder
//! stores each whitespace-delimited token as-is, so a tuple written with
//! stray spaces (`10, 20`) arrives as several tokens. [`regroup`] stitches
//! tokens back together: a token continues the current tuple when the
//! previous token ended with a comma or this one starts with one.

use crate::error::StructureErrorKind;
use crate::geometry::Coord;

/// Parse a decimal number: optional sign, digits with an optional
/// fraction, optional exponent. `inf`, `nan`, hex and values that overflow
/// `f64` are rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }

    if i != bytes.len() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Group raw tokens into vertices of 2 or 3 components.
pub fn regroup<'t, I>(tokens: I) -> Result<Vec<Coord>, StructureErrorKind>
where
    I: IntoIterator<Item = &'t str>,
{
    let mut coords = Vec::new();
    let mut current: Vec<f64> = Vec::with_capacity(3);
    let mut continuing = false;

    for token in tokens {
        let joins = continuing || token.starts_with(',');
        if !joins && !current.is_empty() {
            coords.push(finish(&current)?);
            current.clear();
        }

        let parts: Vec<&str> = token.split(',').collect();
        let last = parts.len() - 1;
        for (i, part) in parts.iter().enumerate() {
            if part.is_empty() {
                // Only a leading or trailing comma may leave an empty part.
                if (i == 0 && token.starts_with(',')) || (i == last && token.ends_with(',')) {
                    continue;
                }
                return Err(StructureErrorKind::BadNumber(token.to_string()));
            }
            let value =
                parse_number(part).ok_or_else(|| StructureErrorKind::BadNumber(part.to_string()))?;
            current.push(value);
        }
        continuing = token.ends_with(',');
    }

    if !current.is_empty() {
        coords.push(finish(&current)?);
    }
    Ok(coords)
}

fn finish(components: &[f64]) -> Result<Coord, StructureErrorKind> {
    match *components {
        [x, y] => Ok(Coord::xy(x, y)),
        [x, y, z] => Ok(Coord::xyz(x, y, z)),
        _ => Err(StructureErrorKind::ComponentCount(components.len())),
    }
}
