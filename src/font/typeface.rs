//! Typeface JSON model and text layout.
//!
//! The format stores one outline string per glyph in font units, plus the
//! metrics needed to lay out lines of text.

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use super::outline::{flatten, parse_outline, Contour};
use crate::error::FontError;

/// Glyph substituted for characters the font lacks.
pub const FALLBACK_GLYPH: char = '?';

/// A parsed typeface file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typeface {
    pub glyphs: HashMap<String, Glyph>,
    #[serde(default)]
    pub family_name: String,
    /// Font units per em.
    pub resolution: f32,
    #[serde(default)]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub underline_thickness: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

/// One glyph: horizontal advance and an optional outline.
#[derive(Debug, Clone, Deserialize)]
pub struct Glyph {
    /// Horizontal advance in font units.
    pub ha: f32,
    #[serde(default)]
    pub x_min: f32,
    #[serde(default)]
    pub x_max: f32,
    /// Outline command string; absent for blanks like space.
    #[serde(default)]
    pub o: Option<String>,
}

/// A glyph's flattened contours, already placed on the page.
#[derive(Debug, Clone)]
pub struct PlacedGlyph {
    pub ch: char,
    pub contours: Vec<Contour>,
}

impl Typeface {
    /// Read and parse a typeface JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, FontError> {
        let typeface: Typeface = serde_json::from_str(json)?;
        if !(typeface.resolution.is_finite() && typeface.resolution > 0.0) {
            return Err(FontError::Metrics(format!(
                "resolution must be positive, got {}",
                typeface.resolution
            )));
        }
        log::debug!(
            "parsed typeface {:?}: {} glyphs at {} units/em",
            typeface.family_name,
            typeface.glyphs.len(),
            typeface.resolution
        );
        Ok(typeface)
    }

    /// Look up a glyph, falling back to [`FALLBACK_GLYPH`].
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs
            .get(&ch.to_string())
            .or_else(|| self.glyphs.get(&FALLBACK_GLYPH.to_string()))
    }

    /// Distance between baselines for text of the given em size.
    pub fn line_height(&self, size: f32) -> f32 {
        let bb = &self.bounding_box;
        (bb.y_max - bb.y_min + self.underline_thickness) * size / self.resolution
    }

    /// Lay out `text` at em size `size` and flatten every outline.
    ///
    /// `cancelled` is polled before each glyph; once it returns true the
    /// layout stops with [`FontError::Cancelled`].
    pub fn layout(
        &self,
        text: &str,
        size: f32,
        curve_segments: u32,
        cancelled: &dyn Fn() -> bool,
    ) -> Result<Vec<PlacedGlyph>, FontError> {
        let scale = size / self.resolution;
        let line_height = self.line_height(size);

        let mut placed = Vec::new();
        let mut missing = BTreeSet::new();
        let (mut offset_x, mut offset_y) = (0.0f32, 0.0f32);

        for ch in text.chars() {
            if cancelled() {
                return Err(FontError::Cancelled);
            }
            if ch == '\n' {
                offset_x = 0.0;
                offset_y -= line_height;
                continue;
            }

            if !self.has_glyph(ch) {
                missing.insert(ch);
            }
            let Some(glyph) = self.glyph(ch) else {
                continue;
            };

            if let Some(outline) = &glyph.o {
                let commands = parse_outline(outline).map_err(|message| FontError::Outline {
                    glyph: ch,
                    message,
                })?;
                let contours = flatten(&commands, scale, [offset_x, offset_y], curve_segments)
                    .map_err(|message| FontError::Outline { glyph: ch, message })?;
                placed.push(PlacedGlyph { ch, contours });
            }
            offset_x += glyph.ha * scale;
        }

        if !missing.is_empty() {
            log::warn!(
                "typeface {:?} has no glyph for {:?}",
                self.family_name,
                missing.iter().collect::<String>()
            );
        }
        Ok(placed)
    }

    fn has_glyph(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch.to_string())
    }
}
