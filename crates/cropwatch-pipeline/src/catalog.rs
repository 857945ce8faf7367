//! Geometry catalog: the fields and bounding box a run works on.
//!
//! The catalog is loaded once per run from a JSON document and is immutable
//! afterwards. When the document is missing or malformed the catalog falls
//! back to a deterministic set of synthetic fields so the pipeline stays
//! runnable without external input; artifacts built from such a catalog
//! carry `synthetic_fallback = true`.

use std::collections::HashSet;
use std::path::Path;

use chrono::{Days, NaiveDate};
use cropwatch_core::{BoundingBox, CropwatchConfig, Field, PartitionKey};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Crop types assigned to synthetic fields.
const CROPS: [&str; 7] = [
    "Corn", "Wheat", "Soybeans", "Barley", "Potatoes", "Alfalfa", "Rice",
];

/// Synthetic planting dates fall within this many days of the window start.
const PLANTING_WINDOW_DAYS: u64 = 120;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    #[error("catalog malformed: {0}")]
    Malformed(String),
}

// ── Document format ────────────────────────────────────────────────

/// The external catalog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    pub fields: Vec<FieldDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDocument {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    pub planting_date: NaiveDate,
    #[serde(alias = "polygon_coords")]
    pub polygon: Vec<[f64; 2]>,
}

impl From<FieldDocument> for Field {
    fn from(doc: FieldDocument) -> Self {
        Field {
            name: doc.name.unwrap_or_else(|| doc.id.clone()),
            crop_type: doc.crop_type.unwrap_or_else(|| "unknown".to_string()),
            id: doc.id,
            planting_date: doc.planting_date,
            polygon: doc.polygon,
        }
    }
}

// ── Catalog ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    bbox: BoundingBox,
    /// Sorted by id.
    fields: Vec<Field>,
    synthetic_fallback: bool,
}

impl Catalog {
    /// Build a catalog from explicit fields, validating every field.
    pub fn new(bbox: BoundingBox, mut fields: Vec<Field>) -> Result<Self, CatalogError> {
        validate_fields(&fields)?;
        fields.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(Self {
            bbox,
            fields,
            synthetic_fallback: false,
        })
    }

    /// Build from a parsed document; `default_bbox` applies when the
    /// document has none.
    pub fn from_document(
        doc: CatalogDocument,
        default_bbox: BoundingBox,
    ) -> Result<Self, CatalogError> {
        let bbox = doc.bbox.unwrap_or(default_bbox);
        Self::new(bbox, doc.fields.into_iter().map(Field::from).collect())
    }

    pub fn from_json(bytes: &[u8], default_bbox: BoundingBox) -> Result<Self, CatalogError> {
        let doc: CatalogDocument =
            serde_json::from_slice(bytes).map_err(|e| CatalogError::Malformed(e.to_string()))?;
        Self::from_document(doc, default_bbox)
    }

    /// Load the document at `path`, failing on any problem.
    pub fn try_load(path: &Path, default_bbox: BoundingBox) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(path)
            .map_err(|e| CatalogError::Unavailable(format!("{}: {e}", path.display())))?;
        let catalog = Self::from_json(&bytes, default_bbox)?;
        info!(path = %path.display(), fields = catalog.fields.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Load the document at `path`, or fall back to synthetic fields.
    ///
    /// `path = None` skips straight to the fallback. This never fails; the
    /// reason for falling back is logged and visible through
    /// [`Catalog::is_synthetic_fallback`].
    pub fn load_or_fallback(
        path: Option<&Path>,
        default_bbox: BoundingBox,
        fallback: &FallbackSpec,
    ) -> Self {
        let err = match path {
            Some(path) => match Self::try_load(path, default_bbox) {
                Ok(catalog) => return catalog,
                Err(e) => e,
            },
            None => CatalogError::Unavailable("no catalog path configured".to_string()),
        };
        warn!(error = %err, fields = fallback.count, seed = fallback.seed, "using synthetic fallback fields");
        Self::synthetic(default_bbox, fallback)
    }

    /// Load the configured catalog document, falling back to synthetic
    /// fields planted from the configured start date.
    pub fn from_config(config: &CropwatchConfig) -> Self {
        let fallback = FallbackSpec {
            count: config.catalog.fallback_fields,
            seed: config.catalog.fallback_seed,
            planting_from: config.pipeline.start_date.date(),
        };
        Self::load_or_fallback(config.catalog.path.as_deref(), config.pipeline.bbox, &fallback)
    }

    /// Deterministic synthetic fields: rotated rectangles centred in the
    /// inner 20–80 % of the box, 5–15 % of its extent, planted within
    /// 120 days of `fallback.planting_from`.
    pub fn synthetic(bbox: BoundingBox, fallback: &FallbackSpec) -> Self {
        let mut rng = StdRng::seed_from_u64(fallback.seed);
        let (w, h) = (bbox.width(), bbox.height());

        let mut fields = Vec::with_capacity(fallback.count);
        for i in 1..=fallback.count {
            let cx = bbox.xmin() + rng.random_range(0.2..0.8) * w;
            let cy = bbox.ymin() + rng.random_range(0.2..0.8) * h;
            let size = rng.random_range(0.05..0.15);
            let (fw, fh) = (size * w, size * h);
            let (sin, cos) = rng.random_range(0.0f64..90.0).to_radians().sin_cos();

            let polygon = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)]
                .iter()
                .map(|(dx, dy)| {
                    [
                        cx + dx * fw * cos - dy * fh * sin,
                        cy + dx * fw * sin + dy * fh * cos,
                    ]
                })
                .collect();

            let offset = rng.random_range(0..=PLANTING_WINDOW_DAYS);
            let planting_date = fallback
                .planting_from
                .checked_add_days(Days::new(offset))
                .unwrap_or(fallback.planting_from);
            let crop = CROPS[rng.random_range(0..CROPS.len())];

            fields.push(Field {
                id: format!("field{i}"),
                name: format!("{crop} Field {i}"),
                crop_type: crop.to_string(),
                planting_date,
                polygon,
            });
        }
        debug!(count = fields.len(), seed = fallback.seed, "synthetic fields generated");

        fields.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            bbox,
            fields,
            synthetic_fallback: true,
        }
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn is_synthetic_fallback(&self) -> bool {
        self.synthetic_fallback
    }

    /// Fields whose geometry intersects the bounding box and which are
    /// planted on or before `partition`, ordered by id.
    pub fn fields_active_on(&self, partition: PartitionKey) -> Vec<&Field> {
        self.fields
            .iter()
            .filter(|f| f.is_planted_by(partition) && f.intersects_bbox(&self.bbox))
            .collect()
    }

    /// Export as a catalog document, e.g. to pin a synthetic fallback.
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            bbox: Some(self.bbox),
            fields: self
                .fields
                .iter()
                .map(|f| FieldDocument {
                    id: f.id.clone(),
                    name: Some(f.name.clone()),
                    crop_type: Some(f.crop_type.clone()),
                    planting_date: f.planting_date,
                    polygon: f.polygon.clone(),
                })
                .collect(),
        }
    }
}

/// Parameters of the synthetic fallback catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackSpec {
    pub count: usize,
    pub seed: u64,
    /// Earliest synthetic planting date.
    pub planting_from: NaiveDate,
}

fn validate_fields(fields: &[Field]) -> Result<(), CatalogError> {
    let mut ids = HashSet::with_capacity(fields.len());
    for field in fields {
        if field.id.is_empty() || field.id.contains(['/', '\\']) {
            return Err(CatalogError::Malformed(format!(
                "invalid field id {:?}",
                field.id
            )));
        }
        if !ids.insert(field.id.as_str()) {
            return Err(CatalogError::Malformed(format!("duplicate field id {:?}", field.id)));
        }
        if field.polygon.iter().flatten().any(|v| !v.is_finite()) {
            return Err(CatalogError::Malformed(format!(
                "field {:?} has non-finite coordinates",
                field.id
            )));
        }
        if field.distinct_vertices() < 3 {
            return Err(CatalogError::Malformed(format!(
                "field {:?} ring needs at least three distinct vertices",
                field.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn key(m: u32, d: u32) -> PartitionKey {
        PartitionKey::new(date(m, d))
    }

    fn square(id: &str, x0: f64, y0: f64, planted: NaiveDate) -> Field {
        Field {
            id: id.to_string(),
            name: id.to_string(),
            crop_type: "Corn".to_string(),
            planting_date: planted,
            polygon: vec![[x0, y0], [x0 + 0.1, y0], [x0 + 0.1, y0 + 0.1], [x0, y0 + 0.1]],
        }
    }

    fn fallback() -> FallbackSpec {
        FallbackSpec {
            count: 8,
            seed: 42,
            planting_from: date(1, 1),
        }
    }

    #[test]
    fn active_requires_planting_and_intersection() {
        let catalog = Catalog::new(
            BoundingBox::default(),
            vec![
                square("inside", 10.4, 45.4, date(1, 1)),
                square("outside", 12.0, 45.4, date(1, 1)),
                square("late", 10.2, 45.2, date(1, 5)),
            ],
        )
        .unwrap();

        let ids = |k| {
            catalog
                .fields_active_on(k)
                .iter()
                .map(|f| f.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(key(1, 1)), vec!["inside"]);
        assert_eq!(ids(key(1, 4)), vec!["inside"]);
        assert_eq!(ids(key(1, 5)), vec!["inside", "late"]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Catalog::new(
            BoundingBox::default(),
            vec![square("a", 10.1, 45.1, date(1, 1)), square("a", 10.5, 45.5, date(1, 1))],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
    }

    #[test]
    fn rejects_degenerate_ring_and_bad_ids() {
        let mut f = square("a", 10.1, 45.1, date(1, 1));
        f.polygon.truncate(2);
        assert!(Catalog::new(BoundingBox::default(), vec![f]).is_err());

        let g = square("a/b", 10.1, 45.1, date(1, 1));
        assert!(Catalog::new(BoundingBox::default(), vec![g]).is_err());
    }

    #[test]
    fn parses_document_with_defaults_and_alias() {
        let json = br#"{
            "fields": [
                {"id": "f2", "planting_date": "2024-02-01",
                 "polygon_coords": [[10.1, 45.1], [10.2, 45.1], [10.2, 45.2]]},
                {"id": "f1", "name": "North", "crop_type": "Rice",
                 "planting_date": "2024-01-01",
                 "polygon": [[10.3, 45.3], [10.4, 45.3], [10.4, 45.4]]}
            ]
        }"#;
        let catalog = Catalog::from_json(json, BoundingBox::default()).unwrap();
        assert!(!catalog.is_synthetic_fallback());
        assert_eq!(catalog.bbox(), BoundingBox::default());
        assert_eq!(catalog.fields()[0].id, "f1");
        let f2 = catalog.field("f2").unwrap();
        assert_eq!(f2.name, "f2");
        assert_eq!(f2.crop_type, "unknown");
    }

    #[test]
    fn malformed_document_is_error() {
        assert!(matches!(
            Catalog::from_json(b"{not json", BoundingBox::default()),
            Err(CatalogError::Malformed(_))
        ));
    }

    #[test]
    fn missing_document_falls_back() {
        let catalog = Catalog::load_or_fallback(
            Some(Path::new("/definitely/not/here.json")),
            BoundingBox::default(),
            &fallback(),
        );
        assert!(catalog.is_synthetic_fallback());
        assert_eq!(catalog.fields().len(), 8);
    }

    #[test]
    fn malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.json");
        std::fs::write(&path, b"[1, 2, 3]").unwrap();
        let catalog = Catalog::load_or_fallback(Some(&path), BoundingBox::default(), &fallback());
        assert!(catalog.is_synthetic_fallback());
    }

    #[test]
    fn valid_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.json");
        let doc = Catalog::synthetic(BoundingBox::default(), &fallback()).to_document();
        std::fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();

        let catalog = Catalog::load_or_fallback(Some(&path), BoundingBox::default(), &fallback());
        assert!(!catalog.is_synthetic_fallback());
        assert_eq!(catalog.fields().len(), 8);
    }

    #[test]
    fn synthetic_is_deterministic_and_inside_box() {
        let a = Catalog::synthetic(BoundingBox::default(), &fallback());
        let b = Catalog::synthetic(BoundingBox::default(), &fallback());
        assert_eq!(a, b);

        let bbox = BoundingBox::default();
        for field in a.fields() {
            assert!(field.intersects_bbox(&bbox));
            assert!(field.planting_date >= date(1, 1));
            assert!(field.planting_date <= date(4, 30));
            assert!(CROPS.contains(&field.crop_type.as_str()));
            let index = field.id.trim_start_matches("field");
            assert_eq!(field.name, format!("{} Field {index}", field.crop_type));
        }

        let other = Catalog::synthetic(
            BoundingBox::default(),
            &FallbackSpec {
                seed: 43,
                ..fallback()
            },
        );
        assert_ne!(a, other);
    }

    #[test]
    fn fallback_planting_window_follows_start_date() {
        let default = Catalog::from_config(&CropwatchConfig::default());
        assert!(default.is_synthetic_fallback());
        for field in default.fields() {
            assert!((date(1, 1)..=date(4, 30)).contains(&field.planting_date));
        }

        let config = CropwatchConfig::from_toml_str(
            r#"
            [pipeline]
            start_date = "2024-06-01"
            "#,
        )
        .unwrap();
        let shifted = Catalog::from_config(&config);
        for field in shifted.fields() {
            assert!((date(6, 1)..=date(9, 29)).contains(&field.planting_date));
        }
    }
}
