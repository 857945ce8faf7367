//! Shared types used across cropwatch crates.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ISO-8601 calendar date format used for partition keys and planting dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Start of the daily key space unless configured otherwise.
pub const DEFAULT_START_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2024, 1, 1) {
    Some(date) => date,
    None => panic!("invalid default start date"),
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    #[error("invalid bounding box {0:?}: require xmin < xmax and ymin < ymax")]
    InvalidBoundingBox([f64; 4]),
    #[error("invalid partition key {0:?}: expected YYYY-MM-DD")]
    InvalidPartitionKey(String),
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("unknown asset: {0}")]
    UnknownAsset(String),
}

// ── Bounding box ───────────────────────────────────────────────────

/// Axis-aligned analysis region `(xmin, ymin, xmax, ymax)`.
///
/// Serialized as a four-element array. Construction rejects degenerate or
/// inverted boxes, so every value of this type satisfies `xmin < xmax` and
/// `ymin < ymax`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

impl BoundingBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self, TypeError> {
        let finite = [xmin, ymin, xmax, ymax].iter().all(|v| v.is_finite());
        if !finite || xmin >= xmax || ymin >= ymax {
            return Err(TypeError::InvalidBoundingBox([xmin, ymin, xmax, ymax]));
        }
        Ok(Self { xmin, ymin, xmax, ymax })
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.xmin, self.ymin, self.xmax, self.ymax]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            xmin: 10.0,
            ymin: 45.0,
            xmax: 11.0,
            ymax: 46.0,
        }
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = TypeError;

    fn try_from(v: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        b.to_array()
    }
}

// ── Partition key ──────────────────────────────────────────────────

/// A calendar day identifying one unit of work.
///
/// Ordered by date; printed and parsed as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionKey(NaiveDate);

impl PartitionKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build a key from year/month/day, `None` if the date does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The previous calendar day.
    pub fn pred(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// The next calendar day.
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// Whole days from `earlier` to this key (negative if `earlier` is later).
    pub fn days_since(&self, earlier: NaiveDate) -> i64 {
        (self.0 - earlier).num_days()
    }

    /// Day of year, 1-based.
    pub fn day_of_year(&self) -> u32 {
        self.0.ordinal()
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for PartitionKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| TypeError::InvalidPartitionKey(s.to_string()))
    }
}

impl From<NaiveDate> for PartitionKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

// ── Metrics ────────────────────────────────────────────────────────

/// The three agronomic metrics produced for every active field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Ndvi,
    SoilMoisture,
    Temperature,
}

impl Metric {
    /// All metrics in artifact order.
    pub const ALL: [Metric; 3] = [Metric::Ndvi, Metric::SoilMoisture, Metric::Temperature];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Ndvi => "ndvi",
            Metric::SoilMoisture => "soil_moisture",
            Metric::Temperature => "temperature",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| TypeError::UnknownMetric(s.to_string()))
    }
}

// ── Assets ─────────────────────────────────────────────────────────

/// The two partitioned assets of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    /// Per-day field metrics.
    Raw,
    /// Day-over-day change analysis, depends on the prior day's `Raw`.
    Change,
}

impl Asset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Asset::Raw => "raw",
            Asset::Change => "change",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Asset {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Asset::Raw),
            "change" => Ok(Asset::Change),
            other => Err(TypeError::UnknownAsset(other.to_string())),
        }
    }
}

// ── Fields ─────────────────────────────────────────────────────────

/// A polygon field with its planting date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    pub crop_type: String,
    pub planting_date: NaiveDate,
    /// Exterior ring as `[x, y]` vertices. The ring is implicitly closed.
    pub polygon: Vec<[f64; 2]>,
}

impl Field {
    /// Whole days between planting and `key`; negative before planting.
    pub fn days_since_planting(&self, key: PartitionKey) -> i64 {
        key.days_since(self.planting_date)
    }

    pub fn is_planted_by(&self, key: PartitionKey) -> bool {
        self.planting_date <= key.date()
    }
}
