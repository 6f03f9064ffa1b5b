use crate::foundation::error::{SegmaskError, SegmaskResult};

/// Rendering knobs for [`crate::MaskCompositor`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    /// Opacity of finalized fills and positive strokes.
    pub fill_alpha: f32,
    /// Edge length of the vertex markers drawn for in-progress polygons.
    pub marker_size_px: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fill_alpha: 0.5,
            marker_size_px: 4.0,
        }
    }
}

impl RenderSettings {
    /// Defaults, overridden by `SEGMASK_FILL_ALPHA` / `SEGMASK_MARKER_SIZE` when set.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let fill_alpha = std::env::var("SEGMASK_FILL_ALPHA")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|a| a.is_finite() && *a > 0.0 && *a <= 1.0)
            .unwrap_or(defaults.fill_alpha);
        let marker_size_px = std::env::var("SEGMASK_MARKER_SIZE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(defaults.marker_size_px);
        Self {
            fill_alpha,
            marker_size_px,
        }
    }

    pub fn validate(&self) -> SegmaskResult<()> {
        if !(self.fill_alpha.is_finite() && self.fill_alpha > 0.0 && self.fill_alpha <= 1.0) {
            return Err(SegmaskError::validation(format!(
                "fill_alpha must be in (0, 1], got {}",
                self.fill_alpha
            )));
        }
        if !(self.marker_size_px.is_finite() && self.marker_size_px > 0.0) {
            return Err(SegmaskError::validation(format!(
                "marker_size_px must be positive, got {}",
                self.marker_size_px
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/settings.rs"]
mod tests;
