//! Per-metric choropleth of field means over the analysis box.

use std::io::Cursor;

use cropwatch_core::{Metric, PixelGrid};
use cropwatch_pipeline::RawArtifact;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::colormap::Colormap;
use crate::error::{VizError, VizResult};

const BACKGROUND: Rgb<u8> = Rgb([0xD3, 0xD3, 0xD3]);
const LEGEND_ROWS: u32 = 12;

/// Raster layout: grid resolution in coordinate units and image pixels per
/// grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterStyle {
    pub resolution: f64,
    pub scale: u32,
}

impl Default for RasterStyle {
    fn default() -> Self {
        Self {
            resolution: 0.01,
            scale: 4,
        }
    }
}

/// Paint every field's mean for `metric` over the pixel cells it covers.
///
/// Cells outside any recorded field keep the grey background. A colour bar
/// for the metric's display range runs along the bottom edge.
pub fn render_metric(artifact: &RawArtifact, metric: Metric, style: RasterStyle) -> VizResult<RgbImage> {
    let grid = PixelGrid::new(artifact.bbox, style.resolution)
        .ok_or(VizError::Resolution(style.resolution))?;
    let scale = style.scale.max(1);
    let cols = grid.width() as u32;
    let rows = grid.height() as u32;
    let colormap = Colormap::for_metric(metric);

    let mut img = RgbImage::from_pixel(cols * scale, rows * scale + LEGEND_ROWS, BACKGROUND);

    for field in &artifact.fields {
        let Some(record) = artifact.record(&field.id, metric) else {
            continue;
        };
        let colour = colormap.value(metric, record.mean);
        for idx in grid.pixels_inside(&field.geometry()) {
            let col = (idx % grid.width()) as u32;
            let row = (idx / grid.width()) as u32;
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel(col * scale + dx, row * scale + dy, colour);
                }
            }
        }
    }

    let width = img.width();
    for x in 0..width {
        let t = if width > 1 { x as f64 / (width - 1) as f64 } else { 0.0 };
        let colour = colormap.at(t);
        for y in rows * scale..img.height() {
            img.put_pixel(x, y, colour);
        }
    }

    Ok(img)
}

pub fn encode_png(img: RgbImage) -> VizResult<Vec<u8>> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}
