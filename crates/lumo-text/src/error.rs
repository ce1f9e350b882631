//! Error types.
//!
//! Runtime failures (missing resources, unsupported glyphs, overflow) are
//! recoverable: the caller can retry with different input. Contract
//! violations (double open, operating on a closed session) get their own
//! variants so they are rejected at the boundary instead of asserting.

use thiserror::Error;

/// Failure inside one texture construction. Nothing partial is retained.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// The font cannot supply a glyph the shaping engine selected.
    #[error("glyph {glyph_id} is not available in the font")]
    MissingGlyph { glyph_id: u32 },

    /// The composited rows no longer fit within the texture height.
    #[error("text does not fit into a {width}x{height} texture")]
    TextureOverflow { width: u32, height: u32 },
}

/// Session-level failures.
#[derive(Error, Debug)]
pub enum FontError {
    /// The storage backend has no font under the requested identifier.
    #[error("font resource {identifier:?} not found")]
    FontNotFound {
        identifier: String,
        #[source]
        source: std::io::Error,
    },

    /// The loaded bytes are not a parseable font program.
    #[error("failed to parse the font program")]
    InvalidFont,

    /// A shaping face could not be derived from the font program.
    #[error("failed to derive a shaping face from the font program")]
    ShapingUnavailable,

    /// `open` was called while a font is already open.
    #[error("a font is already open in this session")]
    SessionAlreadyOpen,

    /// An operation that needs an open font ran on a closed session.
    #[error("no font is open in this session")]
    NoFontOpen,

    /// Texture construction failed; the cache is unchanged.
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_glyph_names_the_glyph() {
        let err = ComposeError::MissingGlyph { glyph_id: 42 };
        assert_eq!(err.to_string(), "glyph 42 is not available in the font");
    }

    #[test]
    fn overflow_names_the_texture_size() {
        let err = ComposeError::TextureOverflow {
            width: 64,
            height: 32,
        };
        assert_eq!(err.to_string(), "text does not fit into a 64x32 texture");
    }

    #[test]
    fn compose_errors_convert_into_font_errors() {
        let err = FontError::from(ComposeError::MissingGlyph { glyph_id: 7 });
        assert!(matches!(
            err,
            FontError::Compose(ComposeError::MissingGlyph { glyph_id: 7 })
        ));
    }
}
