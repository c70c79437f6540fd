use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::compose::layers::{Draw, Layer, LayerOp, LayerStack, LinearRamp};
use crate::foundation::core::{Affine, BezPath, PageBox, Point, Rgba8};
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::foundation::math::mul_div255_u16;
use crate::geometry::fold::fold_extent;
use crate::pages::source::{PageBitmap, PageSource};
use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};

/// Texels along a baked gradient.
const RAMP_TEXELS: u16 = 64;

/// Page images kept uploaded unless `FLIPBOOK_PAGE_CACHE_CAPACITY` says otherwise.
const DEFAULT_PAGE_CACHE_CAPACITY: usize = 64;

/// Software renderer on `vello_cpu`.
///
/// Page bitmaps are uploaded once and cached by bitmap id, so repeated frames
/// over the same document only pay for rasterization. The cache is bounded
/// and evicts the least recently drawn page first.
pub struct CpuBackend {
    settings: RenderSettings,
    image_cache: HashMap<u64, vello_cpu::Image>,
    lru: VecDeque<u64>,
    cache_capacity: usize,
}

impl CpuBackend {
    pub fn new(settings: RenderSettings) -> Self {
        let cache_capacity = std::env::var("FLIPBOOK_PAGE_CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PAGE_CACHE_CAPACITY);
        Self::with_cache_capacity(settings, cache_capacity)
    }

    pub fn with_cache_capacity(settings: RenderSettings, cache_capacity: usize) -> Self {
        Self {
            settings,
            image_cache: HashMap::new(),
            lru: VecDeque::new(),
            cache_capacity: cache_capacity.max(1),
        }
    }

    /// Drop every uploaded page image, e.g. when the host switches documents.
    pub fn clear_cache(&mut self) {
        self.image_cache.clear();
        self.lru.clear();
    }

    #[tracing::instrument(skip_all, fields(layers = stack.layers.len()))]
    pub fn render(
        &mut self,
        stack: &LayerStack,
        pages: &dyn PageSource,
    ) -> FlipbookResult<FrameRGBA> {
        let page_box = stack.page_box;
        let (width, height) = page_box.surface_size();
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| FlipbookError::render("surface width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| FlipbookError::render("surface height exceeds u16"))?;

        // Page-local units to device pixels.
        let base = Affine::scale_non_uniform(
            f64::from(width) / page_box.width,
            f64::from(height) / page_box.height,
        );

        let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
        if let Some([r, g, b, a]) = self.settings.clear_rgba {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }

        for layer in &stack.layers {
            self.draw_layer(&mut ctx, layer, base, page_box, pages)?;
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width,
            height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_layer(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        layer: &Layer,
        base: Affine,
        page_box: PageBox,
        pages: &dyn PageSource,
    ) -> FlipbookResult<()> {
        push_clips(ctx, &layer.clips, base);
        let mut result = Ok(());
        for op in &layer.ops {
            result = match op {
                LayerOp::Draw(draw) => self.draw_op(ctx, draw, base, page_box, pages),
                LayerOp::Clipped { clips, draws } => {
                    push_clips(ctx, clips, base);
                    let r = draws
                        .iter()
                        .try_for_each(|d| self.draw_op(ctx, d, base, page_box, pages));
                    pop_clips(ctx, clips.len());
                    r
                }
            };
            if result.is_err() {
                break;
            }
        }
        // Clips are closed even on failure so the context stays balanced.
        pop_clips(ctx, layer.clips.len());
        result
    }

    fn draw_op(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        draw: &Draw,
        base: Affine,
        page_box: PageBox,
        pages: &dyn PageSource,
    ) -> FlipbookResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match draw {
            Draw::Page {
                index,
                transform,
                opacity,
            } => {
                let bitmap = pages.page(*index).ok_or_else(|| {
                    FlipbookError::render(format!("page {index} is not in the page source"))
                })?;
                let paint = self.image_paint_for(bitmap)?;
                let (w, h) = (f64::from(bitmap.width), f64::from(bitmap.height));

                // Stretch the bitmap over the page box.
                let fit = Affine::scale_non_uniform(page_box.width / w, page_box.height / h);
                ctx.set_transform(affine_to_cpu(base * *transform * fit));
                ctx.set_paint(paint);
                if *opacity < 1.0 {
                    ctx.push_opacity_layer(*opacity);
                }
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                if *opacity < 1.0 {
                    ctx.pop_layer();
                }
                Ok(())
            }
            Draw::Fill { color, transform } => {
                ctx.set_transform(affine_to_cpu(base * *transform));
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    page_box.width,
                    page_box.height,
                ));
                Ok(())
            }
            Draw::Ramp(ramp) => draw_ramp(ctx, ramp, base, page_box),
            Draw::Stroke { path, color, width } => {
                ctx.set_transform(affine_to_cpu(base));
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
                ctx.set_paint(color_to_cpu(*color));
                ctx.stroke_path(&bezpath_to_cpu(path));
                Ok(())
            }
        }
    }

    fn image_paint_for(&mut self, bitmap: &PageBitmap) -> FlipbookResult<vello_cpu::Image> {
        let key = bitmap.id();
        if let Some(paint) = self.image_cache.get(&key).cloned() {
            self.touch(key);
            return Ok(paint);
        }

        let pixmap = image_premul_bytes_to_pixmap(
            bitmap.rgba8_premul.as_slice(),
            bitmap.width,
            bitmap.height,
        )?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.insert_image(key, paint.clone());
        Ok(paint)
    }

    fn insert_image(&mut self, key: u64, image: vello_cpu::Image) {
        self.image_cache.insert(key, image);
        self.touch(key);
        while self.lru.len() > self.cache_capacity {
            if let Some(old) = self.lru.pop_front() {
                self.image_cache.remove(&old);
            }
        }
    }

    fn touch(&mut self, key: u64) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

impl RenderBackend for CpuBackend {
    fn render(&mut self, stack: &LayerStack, pages: &dyn PageSource) -> FlipbookResult<FrameRGBA> {
        CpuBackend::render(self, stack, pages)
    }
}

fn push_clips(ctx: &mut vello_cpu::RenderContext, clips: &[BezPath], base: Affine) {
    ctx.set_transform(affine_to_cpu(base));
    for clip in clips {
        ctx.push_clip_layer(&bezpath_to_cpu(clip));
    }
}

fn pop_clips(ctx: &mut vello_cpu::RenderContext, n: usize) {
    for _ in 0..n {
        ctx.pop_layer();
    }
}

/// Fill the open clip region with a linear ramp.
///
/// The ramp is baked into a one-texel-tall image laid along `start -> end`,
/// with solid end-stop bands on either side standing in for pad extension.
/// Bands and image are sized to outlast any page-box clip.
fn draw_ramp(
    ctx: &mut vello_cpu::RenderContext,
    ramp: &LinearRamp,
    base: Affine,
    page_box: PageBox,
) -> FlipbookResult<()> {
    let (Some(first), Some(last)) = (ramp.stops.first(), ramp.stops.last()) else {
        return Ok(());
    };
    let axis = ramp.end - ramp.start;
    let len = axis.hypot();
    if !(len.is_finite() && len > 1e-6) {
        return Ok(());
    }
    let dir = axis / len;
    let ext = fold_extent(page_box.width, page_box.height);

    // u runs along the ramp, v across it.
    let frame = base * Affine::new([dir.x, dir.y, -dir.y, dir.x, ramp.start.x, ramp.start.y]);

    ctx.set_transform(affine_to_cpu(frame));
    ctx.set_paint(color_to_cpu(first.color));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(-ext, -ext, 0.0, ext));
    ctx.set_paint(color_to_cpu(last.color));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(len, -ext, len + ext, ext));

    let texels = f64::from(RAMP_TEXELS);
    let stretch = Affine::scale_non_uniform(len / texels, 2.0 * ext)
        * Affine::translate((0.0, -0.5));
    ctx.set_transform(affine_to_cpu(frame * stretch));
    ctx.set_paint(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(bake_ramp(ramp)?)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    });
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, texels, 1.0));
    Ok(())
}

fn bake_ramp(ramp: &LinearRamp) -> FlipbookResult<vello_cpu::Pixmap> {
    let n = usize::from(RAMP_TEXELS);
    let mut bytes = Vec::with_capacity(n * 4);
    for i in 0..n {
        let t = (i as f64 + 0.5) / n as f64;
        let [r, g, b, a] = ramp.sample(t);
        let a = a.round().clamp(0.0, 255.0) as u16;
        let premul = |c: f64| mul_div255_u16(c.round().clamp(0.0, 255.0) as u16, a) as u8;
        bytes.extend_from_slice(&[premul(r), premul(g), premul(b), a as u8]);
    }
    image_premul_bytes_to_pixmap(&bytes, u32::from(RAMP_TEXELS), 1)
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> FlipbookResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FlipbookError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FlipbookError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(FlipbookError::render("page bitmap byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
