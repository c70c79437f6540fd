//! Page bitmaps and the rasterization capability the engine consumes.
//!
//! The engine never decodes documents itself. A host hands it a [`PageSource`]
//! once the pages are available; replacing the document means building a new
//! session over a new source.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{FlipbookError, FlipbookResult};

static NEXT_BITMAP_ID: AtomicU64 = AtomicU64::new(1);

/// An already-decoded page raster.
///
/// Clones share pixels and identity, so renderers may cache per [`PageBitmap::id`].
#[derive(Clone, Debug)]
pub struct PageBitmap {
    id: u64,
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PageBitmap {
    pub fn from_premul_rgba8(width: u32, height: u32, rgba8_premul: Vec<u8>) -> FlipbookResult<Self> {
        if width == 0 || height == 0 {
            return Err(FlipbookError::validation("page bitmap must be at least 1x1"));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| FlipbookError::validation("page bitmap dimensions overflow"))?;
        if rgba8_premul.len() != expected {
            return Err(FlipbookError::validation(format!(
                "page bitmap byte length {} does not match {width}x{height}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            id: NEXT_BITMAP_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// A bitmap filled with one straight RGBA color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> FlipbookResult<Self> {
        let mut px = rgba;
        premultiply_rgba8_in_place(&mut px);
        let n = (width as usize).saturating_mul(height as usize);
        Self::from_premul_rgba8(width, height, px.repeat(n))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Read-only, ordered page sequence delivered by the rasterization collaborator.
pub trait PageSource {
    fn page_count(&self) -> usize;

    fn page(&self, index: usize) -> Option<&PageBitmap>;

    /// Width over height of the first page; fixed for the session.
    fn aspect_ratio(&self) -> Option<f64> {
        self.page(0).map(PageBitmap::aspect_ratio)
    }
}

/// In-memory page sequence.
#[derive(Clone, Debug, Default)]
pub struct PageSequence {
    pages: Vec<PageBitmap>,
}

impl PageSequence {
    pub fn new(pages: Vec<PageBitmap>) -> Self {
        Self { pages }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageSource for PageSequence {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Option<&PageBitmap> {
        self.pages.get(index)
    }
}

impl FromIterator<PageBitmap> for PageSequence {
    fn from_iter<I: IntoIterator<Item = PageBitmap>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Decode an encoded raster (PNG, JPEG, ...) into a page bitmap.
pub fn decode_page(bytes: &[u8]) -> FlipbookResult<PageBitmap> {
    let dyn_img = image::load_from_memory(bytes).context("decode page image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    PageBitmap::from_premul_rgba8(width, height, rgba8_premul)
}

/// Load every PNG/JPEG file in `dir`, ordered by file name.
#[tracing::instrument]
pub fn load_page_dir(dir: &Path) -> FlipbookResult<PageSequence> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        FlipbookError::io(format!("failed to read page directory '{}': {e}", dir.display()))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            FlipbookError::io(format!("failed to list '{}': {e}", dir.display()))
        })?;
        let path = entry.path();
        let is_raster = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
            .unwrap_or(false);
        if is_raster {
            paths.push(path);
        }
    }
    paths.sort();

    let mut pages = Vec::with_capacity(paths.len());
    for path in &paths {
        let bytes = std::fs::read(path).map_err(|e| {
            FlipbookError::io(format!("failed to read page '{}': {e}", path.display()))
        })?;
        let page = decode_page(&bytes)
            .with_context(|| format!("decode page '{}'", path.display()))?;
        pages.push(page);
    }
    tracing::debug!(count = pages.len(), "loaded pages");
    Ok(PageSequence::new(pages))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let p = Rgba8Premul::from_straight_rgba(px[0], px[1], px[2], px[3]);
        px.copy_from_slice(&[p.r, p.g, p.b, p.a]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pages/source.rs"]
mod tests;
