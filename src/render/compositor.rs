use crate::{
    color::assigner::ColorAssigner,
    foundation::core::Canvas,
    foundation::error::{SegmaskError, SegmaskResult},
    render::blend::{BACKGROUND, Rgba8, blend_covered_in_place},
    render::plan::{DrawOp, Geometry, MaskPlan, RenderRequest, compile_mask},
    render::raster::Coverage,
    render::settings::RenderSettings,
};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Rendered mask: straight RGBA8, row-major, fully opaque.
pub struct MaskSurface {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl MaskSurface {
    /// Surface of `canvas` size filled with [`BACKGROUND`].
    pub fn new(canvas: Canvas) -> SegmaskResult<Self> {
        let len = canvas.byte_len()?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..canvas.pixel_count() {
            data.extend_from_slice(&BACKGROUND);
        }
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            data,
        })
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = &self.data[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn pixels(&self) -> impl Iterator<Item = Rgba8> + '_ {
        self.data
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    pub fn count_matching(&self, value: Rgba8) -> usize {
        self.pixels().filter(|px| *px == value).count()
    }

    pub fn is_blank(&self) -> bool {
        self.pixels().all(|px| px == BACKGROUND)
    }

    pub fn apply(&mut self, op: &DrawOp) -> SegmaskResult<()> {
        let Some(bounds) = op.geometry.bounds() else {
            return Ok(());
        };
        let mut coverage = Coverage::within(self.canvas(), bounds);
        match &op.geometry {
            Geometry::PointSet(points) => coverage.fill_point_set(points),
            Geometry::Polygon(points) => coverage.fill_polygon(points),
            Geometry::PolygonOutline {
                points,
                marker_size_px,
            } => coverage.polygon_outline(points, *marker_size_px),
        }
        blend_covered_in_place(&mut self.data, &coverage, op.paint, op.blend)
    }
}

/// Replay `plan` onto a fresh background surface.
pub fn execute_plan(plan: &MaskPlan) -> SegmaskResult<MaskSurface> {
    let mut surface = MaskSurface::new(plan.canvas)?;
    for op in &plan.ops {
        surface.apply(op).map_err(|e| {
            SegmaskError::render(format!("draw op from {:?} failed: {e}", op.source))
        })?;
    }
    Ok(surface)
}

/// Renders annotation requests into masks using one session's colour table.
pub struct MaskCompositor<'a> {
    colors: &'a ColorAssigner,
    settings: RenderSettings,
}

impl<'a> MaskCompositor<'a> {
    pub fn new(colors: &'a ColorAssigner) -> Self {
        Self {
            colors,
            settings: RenderSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn compile(&self, request: &RenderRequest) -> SegmaskResult<MaskPlan> {
        compile_mask(request, self.colors, &self.settings)
    }

    /// Render `request` into a new mask surface.
    #[tracing::instrument(skip(self, request), fields(width = request.canvas.width, height = request.canvas.height))]
    pub fn render(&self, request: &RenderRequest) -> SegmaskResult<MaskSurface> {
        let plan = self.compile(request)?;
        tracing::debug!(ops = plan.ops.len(), "compiled mask plan");
        execute_plan(&plan)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
