//! String → texture cache.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::FontError;
use crate::texture::FontTexture;

/// Owns every texture constructed for a font session, keyed by the source
/// text.
///
/// The key deliberately omits the requested pixel size: the first
/// construction for a string wins, and later requests for the same string at
/// another size get that first texture back. Callers that need several sizes
/// of one string must use separate sessions.
#[derive(Default)]
pub struct TextureCache {
    map: HashMap<String, FontTexture>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, text: &str) -> Option<&FontTexture> {
        self.map.get(text)
    }

    pub fn contains(&self, text: &str) -> bool {
        self.map.contains_key(text)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drop every cached texture at once.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Return the cached texture for `text`, running `build` only on a miss.
    ///
    /// A failed construction inserts nothing, so the next identical call
    /// retries from scratch.
    pub fn get_or_create<F>(&mut self, text: &str, build: F) -> Result<&FontTexture, FontError>
    where
        F: FnOnce() -> Result<FontTexture, FontError>,
    {
        match self.map.entry(text.to_owned()) {
            Entry::Occupied(hit) => Ok(hit.into_mut()),
            Entry::Vacant(slot) => Ok(slot.insert(build()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasBuffer;
    use crate::error::ComposeError;
    use crate::metrics::FontMetrics;
    use crate::texture::UvRect;

    fn texture(height: u32) -> FontTexture {
        FontTexture::new(
            AtlasBuffer::new(8, height),
            UvRect::new([0.0, 0.0], [0.5, 0.5]),
            FontMetrics::initial(20.0, 20, 20),
        )
    }

    #[test]
    fn second_lookup_reuses_the_first_construction() {
        let mut cache = TextureCache::new();
        let mut builds = 0;

        let first = cache
            .get_or_create("abc", || {
                builds += 1;
                Ok(texture(32))
            })
            .unwrap() as *const FontTexture;

        let second = cache
            .get_or_create("abc", || {
                builds += 1;
                Ok(texture(32))
            })
            .unwrap() as *const FontTexture;

        assert_eq!(builds, 1);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn key_ignores_the_requested_size() {
        let mut cache = TextureCache::new();

        cache.get_or_create("abc", || Ok(texture(32))).unwrap();
        // A request that would build a taller texture still gets the first.
        let hit = cache.get_or_create("abc", || Ok(texture(128))).unwrap();

        assert_eq!(hit.height(), 32);
    }

    #[test]
    fn failed_construction_caches_nothing_and_retries() {
        let mut cache = TextureCache::new();

        let result = cache.get_or_create("abc", || {
            Err(ComposeError::MissingGlyph { glyph_id: 7 }.into())
        });
        assert!(result.is_err());
        assert!(!cache.contains("abc"));

        let retried = cache.get_or_create("abc", || Ok(texture(32)));
        assert!(retried.is_ok());
        assert!(cache.contains("abc"));
    }

    #[test]
    fn clear_drops_every_texture() {
        let mut cache = TextureCache::new();
        cache.get_or_create("a", || Ok(texture(32))).unwrap();
        cache.get_or_create("b", || Ok(texture(32))).unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }
}
