use cropwatch_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VizError {
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("plot store write failed: {0}")]
    Store(#[from] StoreError),

    #[error("invalid raster resolution {0}")]
    Resolution(f64),
}

pub type VizResult<T> = Result<T, VizError>;
