//! Font session: open/close lifecycle, shaping, and the cached
//! string-to-texture entry point.
//!
//! Shaping runs through `rustybuzz` and rasterization through `swash`. The
//! raw font bytes are the owning handle; both libraries get short-lived
//! views recreated from them per call, which keeps the open-font state free
//! of self-references.

use std::str::FromStr;

use rustybuzz::ttf_parser::Tag;
use rustybuzz::{Direction, Language, UnicodeBuffer};
use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::Format;
use swash::{CacheKey, FontRef};

use crate::cache::TextureCache;
use crate::compositor::{compose, ComposeParams, GlyphBitmap, GlyphPlacement, GlyphRasterizer};
use crate::error::FontError;
use crate::store::FontStore;
use crate::texture::FontTexture;

/// Base direction of a shaped string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl TextDirection {
    fn to_shaper(self) -> Direction {
        match self {
            Self::LeftToRight => Direction::LeftToRight,
            Self::RightToLeft => Direction::RightToLeft,
        }
    }
}

/// Shaping configuration for one construction.
///
/// Direction, script and language describe the text being shaped; they are
/// request-scoped, not session state.
#[derive(Clone, Debug)]
pub struct ShapeSettings {
    pub direction: TextDirection,
    /// ISO 15924 script tag, e.g. `*b"Latn"`.
    pub script: [u8; 4],
    /// BCP 47 language tag, e.g. `"en"`. Unset keeps the shaper's default.
    pub language: Option<String>,
}

impl Default for ShapeSettings {
    fn default() -> Self {
        Self {
            direction: TextDirection::default(),
            script: *b"Latn",
            language: None,
        }
    }
}

/// Process-wide engine state, passed explicitly instead of living in
/// globals: the rasterizer's scale context plus the scratch buffer that
/// stages shaping output.
///
/// Create exactly one at the composition root and thread `&mut` references
/// through the sessions using it; dropping it tears the engine down. The
/// shared scratch makes texture construction non-reentrant, which the
/// exclusive borrow encodes.
pub struct EngineContext {
    scale: ScaleContext,
    scratch: Vec<GlyphPlacement>,
}

impl EngineContext {
    pub fn new() -> Self {
        Self {
            scale: ScaleContext::new(),
            scratch: Vec::new(),
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// State held while a font is open.
///
/// Field order is drop order: textures go before the bytes they were
/// rendered from.
struct OpenFont {
    textures: TextureCache,
    data: Vec<u8>,
    /// Byte offset to the font table directory inside `data`.
    offset: u32,
    /// swash identity for scale-context reuse across constructions.
    key: CacheKey,
    /// Nominal ascender in design units.
    ascender: i16,
    units_per_em: u16,
}

/// Rasterizes glyphs for one construction from the session's font bytes.
pub struct SwashRasterizer<'a> {
    font: FontRef<'a>,
    context: &'a mut ScaleContext,
    size: f32,
}

impl GlyphRasterizer for SwashRasterizer<'_> {
    fn rasterize(&mut self, glyph_id: u32) -> Option<GlyphBitmap> {
        let glyph_id = u16::try_from(glyph_id).ok()?;
        let mut scaler = self
            .context
            .builder(self.font)
            .size(self.size)
            .hint(true)
            .build();
        let image = Render::new(&[Source::Outline])
            .format(Format::Alpha)
            .render(&mut scaler, glyph_id)?;

        Some(GlyphBitmap {
            size_px: [image.placement.width, image.placement.height],
            left: image.placement.left,
            top: image.placement.top,
            coverage: image.data,
        })
    }
}

/// Shape `text` and stage the resulting glyph sequence in `scratch`.
///
/// Advances stay in font design units; the compositor applies the pixel
/// scale.
fn shape_into<'a>(
    scratch: &'a mut Vec<GlyphPlacement>,
    data: &[u8],
    text: &str,
    settings: &ShapeSettings,
) -> Result<&'a [GlyphPlacement], FontError> {
    let face = rustybuzz::Face::from_slice(data, 0).ok_or(FontError::ShapingUnavailable)?;

    let mut buffer = UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.set_direction(settings.direction.to_shaper());
    if let Some(script) = rustybuzz::Script::from_iso15924_tag(Tag::from_bytes(&settings.script)) {
        buffer.set_script(script);
    }
    if let Some(language) = settings
        .language
        .as_deref()
        .and_then(|tag| Language::from_str(tag).ok())
    {
        buffer.set_language(language);
    }

    let shaped = rustybuzz::shape(&face, &[], buffer);

    scratch.clear();
    for (info, pos) in shaped.glyph_infos().iter().zip(shaped.glyph_positions()) {
        scratch.push(GlyphPlacement {
            glyph_id: info.glyph_id,
            x_advance: pos.x_advance,
            y_advance: pos.y_advance,
        });
    }
    Ok(scratch.as_slice())
}

/// Owns one opened font and the textures built from it.
pub struct FontSession {
    font: Option<OpenFont>,
    /// Padding between glyphs and rows in composited textures.
    pub glyph_padding: u32,
}

impl FontSession {
    pub fn new() -> Self {
        Self {
            font: None,
            glyph_padding: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.font.is_some()
    }

    /// Open a font: load its bytes from `store`, validate them as a font
    /// program and derive the shaping face.
    ///
    /// Any failure leaves the session closed with no partial state. Opening
    /// while a font is already open is a contract violation reported as
    /// [`FontError::SessionAlreadyOpen`].
    pub fn open(&mut self, store: &dyn FontStore, identifier: &str) -> Result<(), FontError> {
        if self.font.is_some() {
            return Err(FontError::SessionAlreadyOpen);
        }

        let data = store.load(identifier)?;

        let Some(font) = FontRef::from_index(&data, 0) else {
            log::error!("failed to parse font {identifier:?}");
            return Err(FontError::InvalidFont);
        };
        let (offset, key) = (font.offset, font.key);

        let Some(face) = rustybuzz::Face::from_slice(&data, 0) else {
            log::error!("failed to derive a shaping face for {identifier:?}");
            return Err(FontError::ShapingUnavailable);
        };
        let ascender = face.ascender();
        let units_per_em = face.units_per_em() as u16;

        self.font = Some(OpenFont {
            data,
            offset,
            key,
            ascender,
            units_per_em,
            textures: TextureCache::new(),
        });
        log::info!("opened font {identifier:?}");
        Ok(())
    }

    /// Close the session, destroying every cached texture with it.
    ///
    /// Safe no-op when nothing is open; returns whether a font was actually
    /// closed.
    pub fn close(&mut self) -> bool {
        match self.font.take() {
            Some(font) => {
                log::info!("closing font session, dropping {} textures", font.textures.len());
                true
            }
            None => false,
        }
    }

    /// Texture for `text` at `size` pixels with default shaping settings.
    pub fn get_or_create(
        &mut self,
        ctx: &mut EngineContext,
        text: &str,
        size: f32,
    ) -> Result<&FontTexture, FontError> {
        self.get_or_create_with(ctx, text, size, &ShapeSettings::default())
    }

    /// Texture for `text` at `size` pixels.
    ///
    /// Cache hits return the stored texture without touching the shaper or
    /// rasterizer; note the cache key is the text alone (see
    /// [`TextureCache`]). On a miss the string is shaped, composited and the
    /// result cached; a failed construction caches nothing. The shaping
    /// scratch is cleared before this returns, on success and on failure.
    pub fn get_or_create_with(
        &mut self,
        ctx: &mut EngineContext,
        text: &str,
        size: f32,
        settings: &ShapeSettings,
    ) -> Result<&FontTexture, FontError> {
        let padding = self.glyph_padding;
        let font = self.font.as_mut().ok_or(FontError::NoFontOpen)?;
        let OpenFont {
            ref data,
            offset,
            key,
            ascender,
            units_per_em,
            ref mut textures,
        } = *font;
        let EngineContext {
            ref mut scale,
            ref mut scratch,
        } = *ctx;

        let result = textures.get_or_create(text, || {
            log::debug!("texture cache miss for {text:?}, compositing at {size}px");
            let placements = shape_into(scratch, data, text, settings)?;
            let mut rasterizer = SwashRasterizer {
                font: FontRef {
                    data: data.as_slice(),
                    offset,
                    key,
                },
                context: scale,
                size,
            };
            let params = ComposeParams {
                size,
                padding,
                font_ascender: ascender,
                units_per_em,
            };
            Ok(compose(&mut rasterizer, placements, &params)?)
        });

        ctx.scratch.clear();
        result
    }
}

impl Default for FontSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store with canned bytes regardless of identifier.
    struct StaticStore(&'static [u8]);

    impl FontStore for StaticStore {
        fn load(&self, _identifier: &str) -> Result<Vec<u8>, FontError> {
            Ok(self.0.to_vec())
        }
    }

    /// Store that never has anything.
    struct EmptyStore;

    impl FontStore for EmptyStore {
        fn load(&self, identifier: &str) -> Result<Vec<u8>, FontError> {
            Err(FontError::FontNotFound {
                identifier: identifier.to_owned(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    #[test]
    fn open_propagates_a_storage_miss_and_stays_closed() {
        let mut session = FontSession::new();
        let err = session.open(&EmptyStore, "missing.ttf").unwrap_err();

        assert!(matches!(err, FontError::FontNotFound { .. }));
        assert!(!session.is_open());
        assert!(!session.close());
    }

    #[test]
    fn open_rejects_bytes_that_are_not_a_font() {
        let mut session = FontSession::new();
        let err = session.open(&StaticStore(&[0u8; 32]), "junk.ttf").unwrap_err();

        assert!(matches!(err, FontError::InvalidFont));
        assert!(!session.is_open());
    }

    #[test]
    fn get_or_create_requires_an_open_font() {
        let mut ctx = EngineContext::new();
        let mut session = FontSession::new();

        let err = session.get_or_create(&mut ctx, "abc", 20.0).unwrap_err();
        assert!(matches!(err, FontError::NoFontOpen));
    }

    #[test]
    fn close_without_an_open_font_is_a_no_op() {
        let mut session = FontSession::new();
        assert!(!session.close());
        assert!(!session.close());
    }
}
