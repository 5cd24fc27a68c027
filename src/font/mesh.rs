//! Extruded text geometry.
//!
//! Glyph contours are filled with lyon's non-zero tessellator, so holes (the
//! inside of an `o`) follow from contour winding. The fill is emitted twice,
//! as a front cap at `z = depth` and a back cap at `z = 0`, and every contour
//! edge is swept into a wall quad between them.

use glam::{Vec2, Vec3};
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};

use super::typeface::{PlacedGlyph, Typeface};
use crate::error::FontError;

/// Extrusion parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Em size in world units.
    pub size: f32,
    /// Extrusion depth along +Z.
    pub depth: f32,
    /// Straight segments per outline curve.
    pub curve_segments: u32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 3.0,
            depth: 1.0,
            curve_segments: 12,
        }
    }
}

/// Indexed triangle mesh of a laid-out string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMesh {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl TextMesh {
    /// Lay out, tessellate and extrude `text`, then centre the result.
    pub fn build(typeface: &Typeface, text: &str, style: &TextStyle) -> Result<Self, FontError> {
        Self::build_cancellable(typeface, text, style, &|| false)
    }

    /// As [`TextMesh::build`], polling `cancelled` between glyphs.
    pub fn build_cancellable(
        typeface: &Typeface,
        text: &str,
        style: &TextStyle,
        cancelled: &dyn Fn() -> bool,
    ) -> Result<Self, FontError> {
        let glyphs = typeface.layout(text, style.size, style.curve_segments, cancelled)?;

        let mut mesh = TextMesh::default();
        let mut tessellator = FillTessellator::new();
        for glyph in &glyphs {
            if cancelled() {
                return Err(FontError::Cancelled);
            }
            mesh.extrude_glyph(&mut tessellator, glyph, style.depth)?;
        }
        mesh.center();

        log::debug!(
            "built text mesh for {:?}: {} vertices, {} triangles",
            text,
            mesh.positions.len(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds as `(min, max)`; zero for an empty mesh.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        if self.positions.is_empty() {
            return (Vec3::ZERO, Vec3::ZERO);
        }
        self.positions.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), p| {
                let p = Vec3::from_array(*p);
                (min.min(p), max.max(p))
            },
        )
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p = (Vec3::from_array(*p) + offset).to_array();
        }
    }

    /// Shift by minus half the bounding-box extent on every axis.
    ///
    /// Text is laid out from the origin, so this centres it in X and Z; in Y
    /// descenders keep the block slightly above centre.
    pub fn center(&mut self) {
        let (min, max) = self.bounds();
        self.translate(-(max - min) / 2.0);
    }

    fn extrude_glyph(
        &mut self,
        tessellator: &mut FillTessellator,
        glyph: &PlacedGlyph,
        depth: f32,
    ) -> Result<(), FontError> {
        if glyph.contours.is_empty() {
            return Ok(());
        }

        let mut builder = Path::builder();
        for contour in &glyph.contours {
            builder.begin(point(contour[0].x, contour[0].y));
            for p in &contour[1..] {
                builder.line_to(point(p.x, p.y));
            }
            builder.end(true);
        }
        let path = builder.build();

        let mut fill: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
        tessellator
            .tessellate_path(
                &path,
                &FillOptions::default().with_fill_rule(FillRule::NonZero),
                &mut BuffersBuilder::new(&mut fill, |v: FillVertex| v.position().to_array()),
            )
            .map_err(|e| FontError::Tessellation {
                glyph: glyph.ch,
                message: format!("{e:?}"),
            })?;

        // Front cap keeps lyon's winding.
        let base = self.positions.len() as u32;
        self.positions
            .extend(fill.vertices.iter().map(|&[x, y]| [x, y, depth]));
        self.indices.extend(fill.indices.iter().map(|i| base + i));

        if depth <= 0.0 {
            return Ok(());
        }

        // Back cap faces the other way.
        let base = self.positions.len() as u32;
        self.positions
            .extend(fill.vertices.iter().map(|&[x, y]| [x, y, 0.0]));
        for tri in fill.indices.chunks_exact(3) {
            self.indices
                .extend([base + tri[0], base + tri[2], base + tri[1]]);
        }

        for contour in &glyph.contours {
            self.extrude_walls(contour, depth);
        }
        Ok(())
    }

    fn extrude_walls(&mut self, contour: &[Vec2], depth: f32) {
        for (i, a) in contour.iter().enumerate() {
            let b = contour[(i + 1) % contour.len()];
            let base = self.positions.len() as u32;
            self.positions.extend([
                [a.x, a.y, 0.0],
                [b.x, b.y, 0.0],
                [b.x, b.y, depth],
                [a.x, a.y, depth],
            ]);
            self.indices
                .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }
}
