//! Geometry helpers built on the `geo` crate.
//!
//! Fields keep their rings as plain `[x, y]` arrays so they serialize
//! cleanly; these helpers lift them into `geo` types for intersection and
//! containment tests and lay out the pixel grid used for sampling.

use geo::{Contains, Intersects, LineString, Point, Polygon, Rect, coord};

use crate::types::{BoundingBox, Field};

impl BoundingBox {
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.xmin(), y: self.ymin() },
            coord! { x: self.xmax(), y: self.ymax() },
        )
    }
}

impl Field {
    /// The field ring as a `geo` polygon (closed automatically).
    pub fn geometry(&self) -> Polygon<f64> {
        let ring: Vec<(f64, f64)> = self.polygon.iter().map(|[x, y]| (*x, *y)).collect();
        Polygon::new(LineString::from(ring), vec![])
    }

    /// True geometric overlap with the box, not an envelope test.
    pub fn intersects_bbox(&self, bbox: &BoundingBox) -> bool {
        self.geometry().intersects(&bbox.to_rect())
    }

    /// Number of distinct vertices in the ring, ignoring a repeated closing vertex.
    pub fn distinct_vertices(&self) -> usize {
        let mut seen: Vec<[f64; 2]> = Vec::with_capacity(self.polygon.len());
        for v in &self.polygon {
            if !seen.contains(v) {
                seen.push(*v);
            }
        }
        seen.len()
    }
}

/// A regular grid of square pixels laid over a bounding box.
///
/// Pixel `(col, row)` has its centre at
/// `(xmin + (col + 0.5) * res, ymax - (row + 0.5) * res)`, so row 0 is the
/// northern edge, matching raster image orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelGrid {
    bbox: BoundingBox,
    resolution: f64,
    width: usize,
    height: usize,
}

impl PixelGrid {
    /// Build a grid; `resolution` must be positive. At least one pixel is
    /// produced along each axis.
    pub fn new(bbox: BoundingBox, resolution: f64) -> Option<Self> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return None;
        }
        let width = ((bbox.width() / resolution).round() as usize).max(1);
        let height = ((bbox.height() / resolution).round() as usize).max(1);
        Some(Self {
            bbox,
            resolution,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn centre(&self, col: usize, row: usize) -> Point<f64> {
        Point::new(
            self.bbox.xmin() + (col as f64 + 0.5) * self.resolution,
            self.bbox.ymax() - (row as f64 + 0.5) * self.resolution,
        )
    }

    /// Linear indices (`row * width + col`) of the pixels whose centres lie
    /// inside `polygon`, in row-major order. Only pixels under the polygon's
    /// envelope are visited.
    pub fn pixels_inside(&self, polygon: &Polygon<f64>) -> Vec<usize> {
        use geo::BoundingRect;

        let Some(env) = polygon.bounding_rect() else {
            return Vec::new();
        };
        let res = self.resolution;
        let col_lo = ((env.min().x - self.bbox.xmin()) / res).floor().max(0.0) as usize;
        let col_hi = ((env.max().x - self.bbox.xmin()) / res).ceil().max(0.0) as usize;
        let row_lo = ((self.bbox.ymax() - env.max().y) / res).floor().max(0.0) as usize;
        let row_hi = ((self.bbox.ymax() - env.min().y) / res).ceil().max(0.0) as usize;

        let mut out = Vec::new();
        for row in row_lo..row_hi.min(self.height) {
            for col in col_lo..col_hi.min(self.width) {
                if polygon.contains(&self.centre(col, row)) {
                    out.push(row * self.width + col);
                }
            }
        }
        out
    }
}
