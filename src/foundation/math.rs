use crate::foundation::error::{ParticleError, ParticleResult};

pub(crate) fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Convert premultiplied RGBA8 back to straight alpha; lossy for small alpha values.
pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            if a == 0 {
                px[0] = 0;
                px[1] = 0;
                px[2] = 0;
            }
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Composite `src` over an opaque background, writing opaque RGBA8 into `dst`.
pub(crate) fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> ParticleResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ParticleError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_rgba[0]);
    let bg_g = u16::from(bg_rgba[1]);
    let bg_b = u16::from(bg_rgba[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            d[3] = 255;
            continue;
        }

        let inv = 255u16 - a;

        let (r, g, b) = if src_is_premul {
            (
                u16::from(s[0]) + mul_div255(bg_r, inv),
                u16::from(s[1]) + mul_div255(bg_g, inv),
                u16::from(s[2]) + mul_div255(bg_b, inv),
            )
        } else {
            (
                mul_div255(u16::from(s[0]), a) + mul_div255(bg_r, inv),
                mul_div255(u16::from(s[1]), a) + mul_div255(bg_g, inv),
                mul_div255(u16::from(s[2]), a) + mul_div255(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
