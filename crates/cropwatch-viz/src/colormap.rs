//! Piecewise-linear colormaps, one per metric.

use cropwatch_core::Metric;
use image::Rgb;

/// Colour stops at positions in `[0, 1]`, ascending.
#[derive(Debug, Clone, Copy)]
pub struct Colormap {
    stops: &'static [(f64, [u8; 3])],
}

const NDVI: &[(f64, [u8; 3])] = &[
    (0.0, [0xA1, 0x61, 0x18]),
    (0.2, [0xE6, 0xC7, 0x8A]),
    (0.4, [0xCE, 0xDB, 0x9C]),
    (0.7, [0x50, 0xA7, 0x47]),
    (1.0, [0x1E, 0x56, 0x31]),
];

const SOIL: &[(f64, [u8; 3])] = &[
    (0.0, [0xEB, 0xE3, 0xD0]),
    (0.3, [0xC5, 0xB7, 0x83]),
    (0.6, [0x89, 0xA1, 0xC8]),
    (1.0, [0x2F, 0x4F, 0x73]),
];

const TEMPERATURE: &[(f64, [u8; 3])] = &[
    (0.0, [0x00, 0x22, 0xFF]),
    (0.3, [0x55, 0xAA, 0xFF]),
    (0.5, [0xFF, 0xFF, 0xFF]),
    (0.7, [0xFF, 0xAA, 0x55]),
    (1.0, [0xFF, 0x00, 0x00]),
];

impl Colormap {
    pub fn for_metric(metric: Metric) -> Self {
        let stops = match metric {
            Metric::Ndvi => NDVI,
            Metric::SoilMoisture => SOIL,
            Metric::Temperature => TEMPERATURE,
        };
        Self { stops }
    }

    /// Colour at position `t`, clamped to `[0, 1]`.
    pub fn at(&self, t: f64) -> Rgb<u8> {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let upper = self
            .stops
            .iter()
            .position(|(p, _)| *p >= t)
            .unwrap_or(self.stops.len() - 1);
        if upper == 0 {
            return Rgb(self.stops[0].1);
        }
        let (p0, c0) = self.stops[upper - 1];
        let (p1, c1) = self.stops[upper];
        let f = (t - p0) / (p1 - p0);
        Rgb(std::array::from_fn(|i| {
            (c0[i] as f64 + (c1[i] as f64 - c0[i] as f64) * f).round() as u8
        }))
    }

    /// Colour for `value` on the metric's display scale.
    pub fn value(&self, metric: Metric, value: f64) -> Rgb<u8> {
        let (lo, hi) = value_range(metric);
        self.at((value - lo) / (hi - lo))
    }
}

/// Display range per metric.
pub fn value_range(metric: Metric) -> (f64, f64) {
    match metric {
        Metric::Ndvi | Metric::SoilMoisture => (0.0, 1.0),
        Metric::Temperature => (0.0, 30.0),
    }
}
