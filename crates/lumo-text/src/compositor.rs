//! Per-glyph composition: the loop that turns a shaped glyph sequence into
//! a finished [`FontTexture`].
//!
//! The compositor walks the sequence in shaping order, asking the rasterizer
//! for one coverage bitmap at a time. Each bitmap can retroactively grow the
//! vertical metrics, which relocates everything already drawn (see
//! [`crate::atlas`]), so the cursor bookkeeping and the buffer state evolve
//! together inside a single pass.

use crate::atlas::{next_pow2, AtlasBuffer};
use crate::error::ComposeError;
use crate::metrics::FontMetrics;
use crate::texture::{FontTexture, UvRect};

/// One shaped glyph: the resolved glyph id plus advances in font design
/// units.
///
/// The id comes from the shaping engine, not from the input string; ligature
/// substitution means it need not correspond to any single input character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphPlacement {
    pub glyph_id: u32,
    pub x_advance: i32,
    pub y_advance: i32,
}

/// CPU-side coverage bitmap for one rasterized glyph.
///
/// An owned copy: it stays valid across subsequent rasterizer calls.
#[derive(Clone, Debug, Default)]
pub struct GlyphBitmap {
    /// Bitmap dimensions in pixels: (width, height).
    pub size_px: [u32; 2],
    /// Horizontal bearing: offset from the pen position to the left edge.
    pub left: i32,
    /// Vertical bearing: distance from the baseline up to the top row.
    pub top: i32,
    /// Row-major coverage bytes (0..=255), length = `width * height`.
    pub coverage: Vec<u8>,
}

impl GlyphBitmap {
    /// Lowest extent relative to the baseline (`top - height`, usually ≤ 0).
    pub fn bottom(&self) -> i32 {
        self.top - self.size_px[1] as i32
    }
}

/// Supplies coverage bitmaps for resolved glyph ids.
pub trait GlyphRasterizer {
    /// Rasterize one glyph, or `None` when the font cannot supply it.
    fn rasterize(&mut self, glyph_id: u32) -> Option<GlyphBitmap>;
}

/// Fixed inputs for one texture construction.
#[derive(Clone, Copy, Debug)]
pub struct ComposeParams {
    /// Requested pixel size; also the row height when the layout wraps.
    pub size: f32,
    /// Padding between glyphs and rows, and the overflow margin. Default 0.
    pub padding: u32,
    /// Font ascender in design units.
    pub font_ascender: i16,
    /// Design units per em; advances are scaled by `size / units_per_em`.
    pub units_per_em: u16,
}

/// Composite a shaped glyph sequence into a single luminance texture.
///
/// The texture width is the summed advance width rounded up to a power of
/// two; rows wrap within it when a glyph would cross the right edge. Any
/// rasterization failure or vertical overflow aborts the whole construction;
/// no partial texture escapes.
pub fn compose<R: GlyphRasterizer>(
    rasterizer: &mut R,
    placements: &[GlyphPlacement],
    params: &ComposeParams,
) -> Result<FontTexture, ComposeError> {
    let scale = params.size / f32::from(params.units_per_em);
    let advance_units: i64 = placements.iter().map(|p| i64::from(p.x_advance)).sum();
    let string_width = (advance_units as f32 * scale).ceil() as u32;
    let width = next_pow2(string_width);

    let mut metrics = FontMetrics::initial(params.size, params.font_ascender, params.units_per_em);
    let mut buffer = AtlasBuffer::new(width, next_pow2(metrics.total() as u32));

    let padding = params.padding as i32;
    let row_height = params.size as i32;
    let mut cursor_x = padding;
    let mut cursor_y = padding;

    for placement in placements {
        let Some(bitmap) = rasterizer.rasterize(placement.glyph_id) else {
            log::error!("font cannot supply glyph {}", placement.glyph_id);
            return Err(ComposeError::MissingGlyph {
                glyph_id: placement.glyph_id,
            });
        };

        // Grow the metrics (and the buffer with them) when this glyph pokes
        // above the ascender or below the descender seen so far.
        if metrics.exceeded_by(bitmap.top, bitmap.bottom()) {
            let grown = metrics.merge(bitmap.top, bitmap.bottom());
            buffer.expand(&metrics, &grown);
            metrics = grown;
        }

        let bitmap_w = bitmap.size_px[0] as i32;
        let bitmap_h = bitmap.size_px[1] as i32;
        let buffer_w = buffer.width() as i32;
        let buffer_h = buffer.height() as i32;

        // Wrap to a new row when the right edge would cross the padded
        // border.
        if cursor_x + bitmap_w + bitmap.left >= buffer_w - padding {
            cursor_y += row_height + padding;
            cursor_x = padding;
        }

        if cursor_y + metrics.base_line() + bitmap_h - bitmap.top >= buffer_h - padding {
            log::error!("text does not fit into a {buffer_w}x{buffer_h} texture");
            return Err(ComposeError::TextureOverflow {
                width: buffer.width(),
                height: buffer.height(),
            });
        }

        buffer.blit(
            &bitmap.coverage,
            bitmap.size_px,
            cursor_x + bitmap.left,
            cursor_y + metrics.base_line() - bitmap.top,
        );

        cursor_x += (placement.x_advance as f32 * scale) as i32 + padding;
        cursor_y -= (placement.y_advance as f32 * scale) as i32;
    }

    let uv = UvRect::new(
        [0.0, 0.0],
        [
            string_width as f32 / buffer.width() as f32,
            metrics.total() as f32 / buffer.height() as f32,
        ],
    );

    Ok(FontTexture::new(buffer, uv, metrics))
}
