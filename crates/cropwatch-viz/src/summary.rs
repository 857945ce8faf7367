//! Per-field change summary: a 2×2 grid with previous and current mean side
//! by side for each metric, plus the day-over-day deltas.

use cropwatch_core::Metric;
use cropwatch_pipeline::ChangeArtifact;
use image::{Rgb, RgbImage};

use crate::colormap::value_range;

const PANEL_WIDTH: u32 = 120;
const PANEL_HEIGHT: u32 = 160;
const MARGIN: u32 = 16;
const BAR_WIDTH: u32 = 32;
const DELTA_BAR_WIDTH: u32 = 24;
const WHITE: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);
const AXIS: Rgb<u8> = Rgb([0x33, 0x33, 0x33]);

/// (previous, current) bar colours.
fn bar_colours(metric: Metric) -> (Rgb<u8>, Rgb<u8>) {
    match metric {
        Metric::Ndvi => (Rgb([0x98, 0xFB, 0x98]), Rgb([0x00, 0x64, 0x00])),
        Metric::SoilMoisture => (Rgb([0xAD, 0xD8, 0xE6]), Rgb([0x00, 0x00, 0x8B])),
        Metric::Temperature => (Rgb([0xFF, 0xA0, 0x7A]), Rgb([0x8B, 0x00, 0x00])),
    }
}

/// Top-left corner of panel `index` in the grid, row-major.
fn panel_origin(index: usize) -> (u32, u32) {
    let index = index as u32;
    ((index % 2) * PANEL_WIDTH, (index / 2) * PANEL_HEIGHT)
}

/// Bar height in pixels for `value` on the metric's display range.
fn bar_height(metric: Metric, value: f64) -> u32 {
    let (lo, hi) = value_range(metric);
    let usable = (PANEL_HEIGHT - 2 * MARGIN) as f64;
    let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    if t.is_finite() { (t * usable).round() as u32 } else { 0 }
}

/// Signed bar length for a delta, measured from the zero axis. A change of
/// half the display range fills the half panel. Any non-zero delta is at
/// least one pixel.
fn delta_height(metric: Metric, delta: f64) -> i32 {
    let (lo, hi) = value_range(metric);
    let half = ((PANEL_HEIGHT - 2 * MARGIN) / 2) as f64;
    let t = (delta / ((hi - lo) / 2.0)).clamp(-1.0, 1.0);
    if !t.is_finite() || delta == 0.0 {
        return 0;
    }
    let px = (t.abs() * half).round().max(1.0) as i32;
    if delta < 0.0 { -px } else { px }
}

/// Render the summary for `field_id`, or `None` when the field has no
/// change records.
///
/// Panels in reading order: NDVI, soil moisture, temperature, then the
/// deltas. A metric panel shows the previous-day bar on the left and the
/// current bar on the right; a field with no previous value gets only the
/// current bar. The delta panel draws one bar per metric above or below a
/// zero axis, and leaves out metrics with no delta.
pub fn render_field_summary(change: &ChangeArtifact, field_id: &str) -> Option<RgbImage> {
    let records: Vec<_> = Metric::ALL
        .iter()
        .map(|&m| (m, change.record(field_id, m)))
        .collect();
    if records.iter().all(|(_, r)| r.is_none()) {
        return None;
    }

    let mut img = RgbImage::from_pixel(PANEL_WIDTH * 2, PANEL_HEIGHT * 2, WHITE);

    for (panel, (metric, record)) in records.iter().enumerate() {
        let (x0, y0) = panel_origin(panel);
        let baseline = y0 + PANEL_HEIGHT - MARGIN;
        draw_axis(&mut img, x0, baseline);
        let Some(record) = record else { continue };

        let (prev_colour, cur_colour) = bar_colours(*metric);
        let left = x0 + PANEL_WIDTH / 2 - BAR_WIDTH - 4;
        let right = x0 + PANEL_WIDTH / 2 + 4;
        if let Some(prev) = record.previous_mean {
            let h = bar_height(*metric, prev);
            fill_rect(&mut img, left, BAR_WIDTH, baseline - h, baseline, prev_colour);
        }
        let current = bar_height(*metric, record.current_mean);
        fill_rect(&mut img, right, BAR_WIDTH, baseline - current, baseline, cur_colour);
    }

    let (x0, y0) = panel_origin(Metric::ALL.len());
    let zero = y0 + PANEL_HEIGHT / 2;
    draw_axis(&mut img, x0, zero);
    let slot = (PANEL_WIDTH - 16) / Metric::ALL.len() as u32;
    for (i, (metric, record)) in records.iter().enumerate() {
        let Some(delta) = record.and_then(|r| r.delta) else { continue };
        let x = x0 + 8 + i as u32 * slot + (slot - DELTA_BAR_WIDTH) / 2;
        let (_, colour) = bar_colours(*metric);
        let h = delta_height(*metric, delta);
        if h > 0 {
            fill_rect(&mut img, x, DELTA_BAR_WIDTH, zero - h as u32, zero, colour);
        } else if h < 0 {
            fill_rect(&mut img, x, DELTA_BAR_WIDTH, zero + 1, zero + 1 + h.unsigned_abs(), colour);
        }
    }

    Some(img)
}

fn draw_axis(img: &mut RgbImage, x0: u32, y: u32) {
    for x in x0 + 8..x0 + PANEL_WIDTH - 8 {
        img.put_pixel(x, y, AXIS);
    }
}

/// Fill columns `x..x + width` over rows `top..bottom`.
fn fill_rect(img: &mut RgbImage, x: u32, width: u32, top: u32, bottom: u32, colour: Rgb<u8>) {
    for y in top..bottom {
        for dx in 0..width {
            img.put_pixel(x + dx, y, colour);
        }
    }
}
