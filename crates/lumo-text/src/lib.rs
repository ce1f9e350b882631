//! Shaped-string luminance textures with cached, growable atlas
//! construction.
//!
//! # Design goals
//! - **Backend-agnostic output**: a finished [`FontTexture`] is a CPU-side
//!   pixel buffer plus UVs and metrics; GPU upload happens behind the
//!   [`TextureSink`] boundary.
//! - **One pass over the glyphs**: the atlas grows mid-construction instead
//!   of pre-scanning every bitmap, relocating already-drawn rows when a
//!   taller or deeper glyph is discovered.
//! - **Cache-friendly**: each distinct string is shaped and rasterized at
//!   most once per session.
//!
//! # Pipeline
//! 1. [`FontSession::open`] loads a font through a [`FontStore`] and
//!    validates it.
//! 2. [`FontSession::get_or_create`] shapes the string, composites glyph
//!    coverage into a power-of-two buffer and caches the result.
//! 3. Renderers place the texture using its [`UvRect`] and [`FontMetrics`]:
//!    the baseline sits `metrics.base_line()` rows below the texture top.
//!
//! The `shaping` feature (on by default) provides the rustybuzz + swash
//! engine; without it the crate still offers the compositor core against
//! the [`GlyphRasterizer`] trait.

#![deny(warnings)]

pub mod atlas;
pub mod cache;
pub mod compositor;
pub mod error;
pub mod metrics;
pub mod store;
pub mod texture;

#[cfg(feature = "shaping")]
pub mod session;

pub use atlas::{next_pow2, AtlasBuffer, Expansion};
pub use cache::TextureCache;
pub use compositor::{compose, ComposeParams, GlyphBitmap, GlyphPlacement, GlyphRasterizer};
pub use error::{ComposeError, FontError};
pub use metrics::FontMetrics;
pub use store::{DirectoryStore, FontStore};
pub use texture::{FontTexture, PixelFormat, TextureSink, UvRect};

#[cfg(feature = "shaping")]
pub use session::{EngineContext, FontSession, ShapeSettings, SwashRasterizer, TextDirection};
