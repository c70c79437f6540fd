use crate::compose::layers::LayerStack;
use crate::foundation::core::Rgba8;
use crate::foundation::error::FlipbookResult;
use crate::pages::source::PageSource;

/// Rendered pixels, row-major RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data
            .get(i..i + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixels, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// Executes a [`LayerStack`] against a page source.
pub trait RenderBackend {
    fn render(&mut self, stack: &LayerStack, pages: &dyn PageSource) -> FlipbookResult<FrameRGBA>;
}

#[derive(Clone, Copy, Debug)]
pub enum BackendKind {
    Cpu,
}

#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// Straight RGBA the surface is cleared to; transparent when `None`.
    pub clear_rgba: Option<[u8; 4]>,
}

impl RenderSettings {
    pub fn with_clear(clear: Option<Rgba8>) -> Self {
        Self {
            clear_rgba: clear.map(|c| [c.r, c.g, c.b, c.a]),
        }
    }
}

pub fn create_backend(
    kind: BackendKind,
    settings: &RenderSettings,
) -> FlipbookResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new(
            settings.clone(),
        ))),
    }
}
