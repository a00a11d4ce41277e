use crate::foundation::core::{Affine, Canvas, Rect};
use crate::foundation::error::{ParticleError, ParticleResult};
use crate::particles::field::Particle;
use crate::render::frame::FrameRGBA;

/// CPU rasterizer that draws every particle as a rotated, filled square.
///
/// The `vello_cpu` context and target pixmap are reused across frames.
pub struct ParticleRasterizer {
    canvas: Canvas,
    surface: Option<Surface>,
}

struct Surface {
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl ParticleRasterizer {
    /// Create a rasterizer for `canvas`. Sides must fit in `u16`.
    pub fn new(canvas: Canvas) -> ParticleResult<Self> {
        if canvas.is_empty() {
            return Ok(Self {
                canvas,
                surface: None,
            });
        }
        let w: u16 = canvas.width.try_into().map_err(|_| {
            ParticleError::validation(format!("canvas width exceeds u16: {}", canvas.width))
        })?;
        let h: u16 = canvas.height.try_into().map_err(|_| {
            ParticleError::validation(format!("canvas height exceeds u16: {}", canvas.height))
        })?;
        Ok(Self {
            canvas,
            surface: Some(Surface {
                ctx: vello_cpu::RenderContext::new(w, h),
                pixmap: vello_cpu::Pixmap::new(w, h),
            }),
        })
    }

    /// Canvas this rasterizer draws into.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Clear the surface, draw `particles` in order, and read the frame back (premultiplied).
    pub fn draw(&mut self, particles: &[Particle]) -> FrameRGBA {
        let Some(surface) = self.surface.as_mut() else {
            return FrameRGBA::blank(self.canvas);
        };
        let ctx = &mut surface.ctx;
        ctx.reset();
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        for p in particles {
            let c = p.color.with_opacity(p.opacity);
            if c.a == 0 || p.size <= 0.0 {
                continue;
            }
            let tr = Affine::translate(p.pos.to_vec2()) * Affine::rotate(p.rotation);
            let half = p.size / 2.0;
            ctx.set_transform(affine_to_cpu(tr));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            ctx.fill_rect(&rect_to_cpu(Rect::new(-half, -half, half, half)));
        }

        surface.pixmap.data_as_u8_slice_mut().fill(0);
        ctx.flush();
        ctx.render_to_pixmap(&mut surface.pixmap);

        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: surface.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
