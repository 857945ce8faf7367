//! Synthetic observation generator.
//!
//! Every value is a pure function of `(field id, partition, metric)`: the
//! triple is hashed with SHA-256 and the first eight bytes seed a `StdRng`.
//! Nothing reads the clock or a global RNG, so rerunning a partition
//! reproduces its observations exactly.
//!
//! # Curves
//!
//! With `d` = days since planting (clamped to ≥ 0) and `doy` = day of year:
//!
//! ```text
//! ndvi           0.15 + 0.65 · (1 − e^(−d/20))          rises, plateaus at 0.80   noise ±0.05, clamp [0, 1]
//! soil_moisture  0.40 − 0.15 · (1 − e^(−d/30))          falls, plateaus at 0.25   noise ±0.04, clamp [0, 1]
//! temperature    15 + 10 · sin(2π · (doy − 80) / 365)    seasonal, °C              noise ±1.0
//! ```
//!
//! NDVI is monotonically non-decreasing and soil moisture monotonically
//! non-increasing in `d` before noise; temperature follows the season and
//! ignores planting.

use std::f64::consts::PI;

use cropwatch_core::{Field, Metric, PartitionKey};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationGenerator;

impl ObservationGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Stable seed for `(field_id, partition, metric)`.
    pub fn seed(field_id: &str, partition: PartitionKey, metric: Metric) -> u64 {
        let digest = Sha256::digest(format!("{field_id}|{partition}|{metric}").as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Noise-free curve value for a field on a day.
    pub fn expected(&self, field: &Field, partition: PartitionKey, metric: Metric) -> f64 {
        let days = field.days_since_planting(partition).max(0) as f64;
        match metric {
            Metric::Ndvi => 0.15 + 0.65 * (1.0 - (-days / 20.0).exp()),
            Metric::SoilMoisture => 0.40 - 0.15 * (1.0 - (-days / 30.0).exp()),
            Metric::Temperature => {
                let doy = partition.day_of_year() as f64;
                15.0 + 10.0 * ((doy - 80.0) * 2.0 * PI / 365.0).sin()
            }
        }
    }

    /// A single field-level observation. Equal to the first value of
    /// [`pixel_samples`](Self::pixel_samples) for the same inputs.
    pub fn sample(&self, field: &Field, partition: PartitionKey, metric: Metric) -> f64 {
        let base = self.expected(field, partition, metric);
        self.stream(field, partition, metric).next().unwrap_or(base)
    }

    /// `pixels` per-pixel observations: the curve value plus one noise draw
    /// each, in a fixed order.
    pub fn pixel_samples(
        &self,
        field: &Field,
        partition: PartitionKey,
        metric: Metric,
        pixels: usize,
    ) -> Vec<f64> {
        self.stream(field, partition, metric).take(pixels).collect()
    }

    fn stream(
        &self,
        field: &Field,
        partition: PartitionKey,
        metric: Metric,
    ) -> impl Iterator<Item = f64> + use<> {
        let base = self.expected(field, partition, metric);
        let amplitude = noise_amplitude(metric);
        let mut rng = StdRng::seed_from_u64(Self::seed(&field.id, partition, metric));
        std::iter::repeat_with(move || clamp(metric, base + rng.random_range(-amplitude..=amplitude)))
    }
}

fn noise_amplitude(metric: Metric) -> f64 {
    match metric {
        Metric::Ndvi => 0.05,
        Metric::SoilMoisture => 0.04,
        Metric::Temperature => 1.0,
    }
}

fn clamp(metric: Metric, value: f64) -> f64 {
    match metric {
        Metric::Ndvi | Metric::SoilMoisture => value.clamp(0.0, 1.0),
        Metric::Temperature => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn field(planted: (u32, u32)) -> Field {
        Field {
            id: "f1".to_string(),
            name: "f1".to_string(),
            crop_type: "Corn".to_string(),
            planting_date: NaiveDate::from_ymd_opt(2024, planted.0, planted.1).unwrap(),
            polygon: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
        }
    }

    fn key(m: u32, d: u32) -> PartitionKey {
        PartitionKey::from_ymd(2024, m, d).unwrap()
    }

    #[test]
    fn seed_depends_on_every_input() {
        let base = ObservationGenerator::seed("f1", key(1, 2), Metric::Ndvi);
        assert_eq!(base, ObservationGenerator::seed("f1", key(1, 2), Metric::Ndvi));
        assert_ne!(base, ObservationGenerator::seed("f2", key(1, 2), Metric::Ndvi));
        assert_ne!(base, ObservationGenerator::seed("f1", key(1, 3), Metric::Ndvi));
        assert_ne!(base, ObservationGenerator::seed("f1", key(1, 2), Metric::Temperature));
    }

    #[test]
    fn sample_is_first_pixel() {
        let g = ObservationGenerator::new();
        let f = field((1, 1));
        let pixels = g.pixel_samples(&f, key(2, 1), Metric::SoilMoisture, 10);
        assert_eq!(pixels.len(), 10);
        assert_eq!(g.sample(&f, key(2, 1), Metric::SoilMoisture), pixels[0]);
        assert!(g.pixel_samples(&f, key(2, 1), Metric::SoilMoisture, 0).is_empty());
    }

    #[test]
    fn ndvi_curve_rises_then_plateaus() {
        let g = ObservationGenerator::new();
        let f = field((1, 1));
        let mut prev = f64::MIN;
        for d in 1..=28 {
            let v = g.expected(&f, key(1, d), Metric::Ndvi);
            assert!(v >= prev);
            prev = v;
        }
        let late = g.expected(&f, key(12, 1), Metric::Ndvi);
        assert!((late - 0.80).abs() < 1e-3);
        assert!((g.expected(&f, key(1, 1), Metric::Ndvi) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn soil_moisture_declines_then_plateaus() {
        let g = ObservationGenerator::new();
        let f = field((1, 1));
        let early = g.expected(&f, key(1, 1), Metric::SoilMoisture);
        let mid = g.expected(&f, key(2, 1), Metric::SoilMoisture);
        let late = g.expected(&f, key(12, 1), Metric::SoilMoisture);
        assert!(early > mid && mid > late);
        assert!((late - 0.25).abs() < 1e-3);
    }

    #[test]
    fn before_planting_uses_day_zero() {
        let g = ObservationGenerator::new();
        let f = field((3, 1));
        assert_eq!(
            g.expected(&f, key(1, 1), Metric::Ndvi),
            g.expected(&f, key(3, 1), Metric::Ndvi)
        );
    }

    #[test]
    fn temperature_is_seasonal() {
        let g = ObservationGenerator::new();
        let f = field((1, 1));
        let winter = g.expected(&f, key(1, 15), Metric::Temperature);
        let summer = g.expected(&f, key(7, 15), Metric::Temperature);
        assert!(summer > winter + 10.0);
    }

    #[test]
    fn bounded_metrics_stay_in_unit_interval() {
        let g = ObservationGenerator::new();
        let f = field((1, 1));
        for metric in [Metric::Ndvi, Metric::SoilMoisture] {
            for v in g.pixel_samples(&f, key(6, 1), metric, 500) {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
