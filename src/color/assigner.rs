//! Deterministic class-to-colour assignment.
//!
//! Colours are derived from a class's *position* in the session vocabulary, not from
//! its name: class `i` hashes the synthetic key `"class{i}"`. Two sessions that load
//! the same vocabulary string therefore paint identical masks.

use std::collections::BTreeMap;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{SegmaskError, SegmaskResult};

/// Vocabulary used by the standalone mask printer when none is supplied.
pub const DEFAULT_CLASS_LIST: &str =
    "airplane-backpack-bicycle-boat-bus-car-cat-dog-motorcycle-person-train-truck";

/// Separator between class names in a vocabulary string.
pub const CLASS_LIST_DELIMITER: char = '-';

#[derive(Clone, Copy, Debug, PartialEq)]
/// Hue/saturation/value triple, each component in `[0, 1]`.
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Colour table entry for one vocabulary class.
pub struct ClassColor {
    pub index: usize,
    pub rgb: Rgb8,
}

#[derive(Clone, Debug, Default)]
/// Maps class names of one session's vocabulary to stable colours.
pub struct ColorAssigner {
    table: BTreeMap<String, ClassColor>,
}

impl ColorAssigner {
    /// Parse a hyphen-joined vocabulary and populate the colour table.
    ///
    /// A class listed twice keeps the index of its last occurrence.
    pub fn from_class_list(class_list: &str) -> Self {
        let mut indices = BTreeMap::new();
        for (index, name) in class_list.split(CLASS_LIST_DELIMITER).enumerate() {
            indices.insert(name.to_string(), index);
        }

        let table = indices
            .into_iter()
            .map(|(name, index)| {
                let rgb = hsv_to_rgb(hsv_for_key(&class_key(index)));
                (name, ClassColor { index, rgb })
            })
            .collect();
        Self { table }
    }

    /// Colour of `class_name`.
    ///
    /// Querying a class outside the vocabulary is a caller bug and reported as a
    /// validation error.
    pub fn color_for(&self, class_name: &str) -> SegmaskResult<Rgb8> {
        self.table
            .get(class_name)
            .map(|c| c.rgb)
            .ok_or_else(|| {
                SegmaskError::validation(format!(
                    "class '{class_name}' is not in the session vocabulary"
                ))
            })
    }

    pub fn index_of(&self, class_name: &str) -> Option<usize> {
        self.table.get(class_name).map(|c| c.index)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Entries ordered by vocabulary index.
    pub fn entries(&self) -> Vec<(&str, ClassColor)> {
        let mut out: Vec<_> = self
            .table
            .iter()
            .map(|(name, color)| (name.as_str(), *color))
            .collect();
        out.sort_by_key(|(_, c)| c.index);
        out
    }
}

/// Synthetic hash key for the class at `index` in the vocabulary.
pub fn class_key(index: usize) -> String {
    format!("class{index}")
}

/// 32-bit hash of `key`: the wrapping sum over code units `c_i` of `(c_i * 31)^(len - i)`.
pub fn class_hash(key: &str) -> i32 {
    let units: Vec<u16> = key.encode_utf16().collect();
    let len = units.len();
    let mut hash = 0u32;
    for (i, &unit) in units.iter().enumerate() {
        let base = u32::from(unit).wrapping_mul(31);
        let exp = u32::try_from(len - i).unwrap_or(u32::MAX);
        hash = hash.wrapping_add(base.wrapping_pow(exp));
    }
    hash as i32
}

/// Hue in `[0, 1)` derived from the hash of `key`.
pub fn hue_for_key(key: &str) -> f64 {
    // `%` truncates toward zero, matching the remainder the colour table was built with.
    let degrees = (class_hash(key) % 360).unsigned_abs();
    f64::from(degrees) / 360.0
}

pub fn hsv_for_key(key: &str) -> Hsv {
    Hsv {
        h: hue_for_key(key),
        s: 1.0,
        v: 1.0,
    }
}

/// Six-sector HSV to RGB conversion with channels rounded to the nearest integer.
pub fn hsv_to_rgb(hsv: Hsv) -> Rgb8 {
    let Hsv { h, s, v } = hsv;
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match (i as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgb8::new(channel(r), channel(g), channel(b))
}

fn channel(x: f64) -> u8 {
    (x * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/color/assigner.rs"]
mod tests;
