use std::collections::HashMap;
use std::path::PathBuf;

use image::imageops::FilterType;
use tracing::debug;

use crate::canvas::Canvas;

/// Icons render at a fixed square size, matching the habit row geometry.
pub const ICON_SIZE: u32 = 32;

/// A 32×32 ink mask for one icon glyph.
#[derive(Debug, Clone)]
pub struct IconBitmap {
    pixels: Vec<bool>,
}

impl IconBitmap {
    fn from_luma(image: &image::GrayImage) -> Self {
        let pixels = image.pixels().map(|p| p.0[0] < 128).collect();
        Self { pixels }
    }

    /// Outlined square shown when an icon asset is missing.
    pub fn placeholder() -> Self {
        let mut pixels = vec![false; (ICON_SIZE * ICON_SIZE) as usize];
        let last = ICON_SIZE - 3;
        for i in 2..=last {
            pixels[(2 * ICON_SIZE + i) as usize] = true;
            pixels[(last * ICON_SIZE + i) as usize] = true;
            pixels[(i * ICON_SIZE + 2) as usize] = true;
            pixels[(i * ICON_SIZE + last) as usize] = true;
        }
        Self { pixels }
    }

    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        self.pixels[(y * ICON_SIZE + x) as usize]
    }

    /// Stamp the mask onto the canvas. Only ink pixels are written, so the
    /// paste does not punch white holes into surrounding artwork.
    pub fn paste(&self, canvas: &mut Canvas, x: i32, y: i32) {
        for py in 0..ICON_SIZE {
            for px in 0..ICON_SIZE {
                if self.is_ink(px, py) {
                    canvas.set_ink(x + px as i32, y + py as i32, true);
                }
            }
        }
    }
}

/// Identifier-keyed icon cache owned by one renderer instance. Entries live
/// for the renderer's lifetime; a missing or broken asset resolves to a
/// placeholder and is cached like any other glyph.
pub struct IconCache {
    icons_dir: PathBuf,
    cache: HashMap<String, IconBitmap>,
}

impl IconCache {
    pub fn new(icons_dir: impl Into<PathBuf>) -> Self {
        Self {
            icons_dir: icons_dir.into(),
            cache: HashMap::new(),
        }
    }

    pub fn get(&mut self, id: &str) -> &IconBitmap {
        if !self.cache.contains_key(id) {
            let bitmap = self.load(id).unwrap_or_else(|| {
                debug!(icon = id, "icon asset missing, using placeholder");
                IconBitmap::placeholder()
            });
            self.cache.insert(id.to_string(), bitmap);
        }
        &self.cache[id]
    }

    fn load(&self, id: &str) -> Option<IconBitmap> {
        if id.is_empty() {
            return None;
        }
        let path = self.icons_dir.join(format!("{id}.png"));
        let decoded = image::open(&path).ok()?;
        let gray = decoded
            .resize_exact(ICON_SIZE, ICON_SIZE, FilterType::Nearest)
            .to_luma8();
        Some(IconBitmap::from_luma(&gray))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_asset_yields_placeholder_without_failing() {
        let dir = tempdir().unwrap();
        let mut cache = IconCache::new(dir.path());
        let icon = cache.get("no_such_icon");
        // Placeholder outline: corners of the inset square carry ink.
        assert!(icon.is_ink(2, 2));
        assert!(icon.is_ink(ICON_SIZE - 3, ICON_SIZE - 3));
        assert!(!icon.is_ink(0, 0));
    }

    #[test]
    fn decoded_png_is_thresholded_and_cached() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dot.png");
        let mut img = image::GrayImage::from_pixel(ICON_SIZE, ICON_SIZE, image::Luma([255u8]));
        img.put_pixel(0, 0, image::Luma([0u8]));
        img.save(&path).unwrap();

        let mut cache = IconCache::new(dir.path());
        assert!(cache.get("dot").is_ink(0, 0));
        assert!(!cache.get("dot").is_ink(1, 1));

        // Cached entries survive the asset disappearing.
        std::fs::remove_file(&path).unwrap();
        assert!(cache.get("dot").is_ink(0, 0));
    }

    #[test]
    fn paste_only_adds_ink() {
        let mut canvas = Canvas::new();
        canvas.set_ink(0, 0, true);
        IconBitmap::placeholder().paste(&mut canvas, 0, 0);
        assert!(canvas.is_ink(0, 0), "existing ink is preserved");
        assert!(canvas.is_ink(2, 2));
    }
}
