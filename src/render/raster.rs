//! Aliased coverage rasterization.
//!
//! Shapes are reduced to a per-pixel coverage set before blending, so one draw
//! operation touches each pixel at most once. Filled shapes cover a pixel when its
//! centre lies inside them (nonzero winding); line segments are walked with
//! Bresenham between the pixels containing their endpoints.

use kurbo::Shape as _;

use crate::foundation::core::{BezPath, Canvas, Point, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Pixel rectangle `[x0, x0 + width) x [y0, y0 + height)` inside the canvas.
struct Window {
    x0: i64,
    y0: i64,
    width: i64,
    height: i64,
}

impl Window {
    fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x0 && y >= self.y0 && x < self.x0 + self.width && y < self.y0 + self.height
    }

    fn area(&self) -> usize {
        (self.width.max(0) as usize).saturating_mul(self.height.max(0) as usize)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Set of covered pixels over a canvas.
///
/// Storage spans a window of the canvas; pixels outside it are never covered.
pub struct Coverage {
    canvas: Canvas,
    window: Window,
    mask: Vec<bool>,
}

impl Coverage {
    pub fn new(canvas: Canvas) -> Self {
        Self::with_window(
            canvas,
            Window {
                x0: 0,
                y0: 0,
                width: i64::from(canvas.width),
                height: i64::from(canvas.height),
            },
        )
    }

    /// Coverage limited to the pixels that `bounds` can touch.
    pub fn within(canvas: Canvas, bounds: Rect) -> Self {
        let bounds = bounds.abs();
        if !(bounds.x0.is_finite()
            && bounds.y0.is_finite()
            && bounds.x1.is_finite()
            && bounds.y1.is_finite())
        {
            return Self::with_window(
                canvas,
                Window {
                    x0: 0,
                    y0: 0,
                    width: 0,
                    height: 0,
                },
            );
        }
        let (x_start, x_end) = clamp_span(
            bounds.x0.floor() as i64,
            bounds.x1.ceil() as i64 + 1,
            canvas.width,
        );
        let (y_start, y_end) = clamp_span(
            bounds.y0.floor() as i64,
            bounds.y1.ceil() as i64 + 1,
            canvas.height,
        );
        Self::with_window(
            canvas,
            Window {
                x0: x_start,
                y0: y_start,
                width: x_end - x_start,
                height: y_end - y_start,
            },
        )
    }

    fn with_window(canvas: Canvas, window: Window) -> Self {
        Self {
            canvas,
            window,
            mask: vec![false; window.area()],
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn local_index(&self, x: i64, y: i64) -> Option<usize> {
        self.window.contains(x, y).then(|| {
            ((y - self.window.y0) * self.window.width + (x - self.window.x0)) as usize
        })
    }

    /// Mark pixel `(x, y)`; pixels outside the canvas are ignored.
    pub fn set(&mut self, x: i64, y: i64) {
        if let Some(idx) = self.local_index(x, y) {
            self.mask[idx] = true;
        }
    }

    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.local_index(i64::from(x), i64::from(y))
            .is_some_and(|idx| self.mask[idx])
    }

    pub fn count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.mask.iter().any(|&m| m)
    }

    /// Row-major canvas indices of covered pixels.
    pub fn covered_indices(&self) -> impl Iterator<Item = usize> + '_ {
        let window = self.window;
        let stride = self.canvas.width as usize;
        self.mask.iter().enumerate().filter_map(move |(idx, &m)| {
            let row = idx / window.width as usize;
            let col = idx % window.width as usize;
            m.then(|| (window.y0 as usize + row) * stride + window.x0 as usize + col)
        })
    }

    /// Cover every pixel whose centre lies in `[x0, x1) x [y0, y1)`.
    pub fn fill_rect(&mut self, rect: Rect) {
        let rect = rect.abs();
        let (x_start, x_end) = centre_span(rect.x0, rect.x1);
        let (y_start, y_end) = centre_span(rect.y0, rect.y1);
        let (x_start, x_end) = clamp_span(x_start, x_end, self.canvas.width);
        let (y_start, y_end) = clamp_span(y_start, y_end, self.canvas.height);
        for y in y_start..y_end {
            for x in x_start..x_end {
                self.set(x, y);
            }
        }
    }

    /// Cover the single pixel containing `p`.
    pub fn fill_pixel(&mut self, p: Point) {
        if !is_finite(p) {
            return;
        }
        let (x, y) = (p.x.floor(), p.y.floor());
        self.fill_rect(Rect::new(x, y, x + 1.0, y + 1.0));
    }

    /// One-pixel-wide segment from `a` to `b`, both end pixels included.
    pub fn stroke_line(&mut self, a: Point, b: Point) {
        let bounds = Rect::new(
            -1.0,
            -1.0,
            f64::from(self.canvas.width) + 1.0,
            f64::from(self.canvas.height) + 1.0,
        );
        let Some((a, b)) = clip_segment(a, b, bounds) else {
            return;
        };

        let (mut x, mut y) = (a.x.floor() as i64, a.y.floor() as i64);
        let (x1, y1) = (b.x.floor() as i64, b.y.floor() as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set(x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Closed polygon through `points`, filled with the nonzero rule.
    pub fn fill_polygon(&mut self, points: &[Point]) {
        let Some(path) = polygon_path(points) else {
            return;
        };
        let bbox = path.bounding_box();
        let (x_start, x_end) = clamp_span(
            bbox.x0.floor() as i64,
            bbox.x1.ceil() as i64,
            self.canvas.width,
        );
        let (y_start, y_end) = clamp_span(
            bbox.y0.floor() as i64,
            bbox.y1.ceil() as i64,
            self.canvas.height,
        );
        for y in y_start..y_end {
            for x in x_start..x_end {
                let centre = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if path.winding(centre) != 0 {
                    self.set(x, y);
                }
            }
        }
    }

    /// Point-set rule: one point is a pixel, two points a line, more a filled polygon.
    pub fn fill_point_set(&mut self, points: &[Point]) {
        match points {
            [] => {}
            [p] => self.fill_pixel(*p),
            [a, b] => self.stroke_line(*a, *b),
            _ => self.fill_polygon(points),
        }
    }

    /// Square vertex markers plus an open polyline through consecutive vertices.
    pub fn polygon_outline(&mut self, points: &[Point], marker_size_px: f64) {
        let half = marker_size_px / 2.0;
        for p in points.iter().filter(|p| is_finite(**p)) {
            self.fill_rect(Rect::new(p.x - half, p.y - half, p.x + half, p.y + half));
        }
        for pair in points.windows(2) {
            self.stroke_line(pair[0], pair[1]);
        }
    }
}

fn is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

fn polygon_path(points: &[Point]) -> Option<BezPath> {
    if points.len() < 3 || !points.iter().all(|p| is_finite(*p)) {
        return None;
    }
    let mut path = BezPath::new();
    path.move_to(points[0]);
    for p in &points[1..] {
        path.line_to(*p);
    }
    path.close_path();
    Some(path)
}

/// Pixel range `[start, end)` whose centres fall in `[lo, hi)`.
fn centre_span(lo: f64, hi: f64) -> (i64, i64) {
    if !(lo.is_finite() && hi.is_finite()) {
        return (0, 0);
    }
    ((lo - 0.5).ceil() as i64, (hi - 0.5).ceil() as i64)
}

fn clamp_span(start: i64, end: i64, limit: u32) -> (i64, i64) {
    let limit = i64::from(limit);
    (start.clamp(0, limit), end.clamp(0, limit))
}

/// Liang-Barsky clip of segment `a -> b` against `bounds`.
fn clip_segment(a: Point, b: Point, bounds: Rect) -> Option<(Point, Point)> {
    if !(is_finite(a) && is_finite(b)) {
        return None;
    }
    let d = b - a;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    let checks = [
        (-d.x, a.x - bounds.x0),
        (d.x, bounds.x1 - a.x),
        (-d.y, a.y - bounds.y0),
        (d.y, bounds.y1 - a.y),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((a + d * t0, a + d * t1))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
