use crate::foundation::core::Rgb8;
use crate::foundation::error::{SegmaskError, SegmaskResult};
use crate::render::raster::Coverage;

/// Straight RGBA8 pixel as stored in a [`crate::MaskSurface`].
pub type Rgba8 = [u8; 4];

/// Opaque black: the mask value of "no class here".
pub const BACKGROUND: Rgba8 = [0, 0, 0, 255];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// How a draw operation combines with what is already on the surface.
pub enum BlendMode {
    /// The paint colour replaces the destination, fully opaque.
    Overwrite,
    /// Each colour channel becomes the alpha-weighted paint colour minus the
    /// destination, modulo 256.
    ///
    /// Applying the same paint twice restores the destination exactly; over the
    /// background it yields the paint blended at its alpha over black. Different
    /// paints do not commute, so overlap depends on paint order.
    ToggleAlpha,
    /// The destination is reset to [`BACKGROUND`] whatever painted it.
    ClearUnder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Colour plus 8-bit coverage alpha for a draw operation.
pub struct Paint {
    pub rgb: Rgb8,
    pub alpha: u8,
}

impl Paint {
    pub fn opaque(rgb: Rgb8) -> Self {
        Self { rgb, alpha: 255 }
    }

    pub fn with_opacity(rgb: Rgb8, opacity: f32) -> Self {
        let alpha = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u8;
        Self { rgb, alpha }
    }

    /// Channels weighted by alpha, as contributed over a black destination.
    pub fn weighted(self) -> [u8; 3] {
        let a = u16::from(self.alpha);
        [
            mul_div255(u16::from(self.rgb.r), a),
            mul_div255(u16::from(self.rgb.g), a),
            mul_div255(u16::from(self.rgb.b), a),
        ]
    }
}

pub fn blend(dst: Rgba8, paint: Paint, mode: BlendMode) -> Rgba8 {
    match mode {
        BlendMode::Overwrite => [paint.rgb.r, paint.rgb.g, paint.rgb.b, 255],
        BlendMode::ToggleAlpha => {
            let [r, g, b] = paint.weighted();
            [
                r.wrapping_sub(dst[0]),
                g.wrapping_sub(dst[1]),
                b.wrapping_sub(dst[2]),
                dst[3],
            ]
        }
        BlendMode::ClearUnder => BACKGROUND,
    }
}

/// Blend `paint` into every pixel of `dst` selected by `coverage`, once per pixel.
pub fn blend_covered_in_place(
    dst: &mut [u8],
    coverage: &Coverage,
    paint: Paint,
    mode: BlendMode,
) -> SegmaskResult<()> {
    if dst.len() != coverage.canvas().byte_len()? {
        return Err(SegmaskError::render(
            "blend_covered_in_place expects a buffer matching the coverage canvas",
        ));
    }
    for idx in coverage.covered_indices() {
        let px = &mut dst[idx * 4..idx * 4 + 4];
        let out = blend([px[0], px[1], px[2], px[3]], paint, mode);
        px.copy_from_slice(&out);
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
