//! lopdf-backed document library for the page engine.

mod copy;
mod images;
mod library;
mod metadata;
mod utils;

pub use images::{ImageAsset, ImageFormatKind, ImagePageLayout};
pub use library::{LopdfLibrary, PdfHandle};
pub use metadata::set_producer_metadata;

use folio_core::CoreError;

pub type Result<T> = std::result::Result<T, PdfError>;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("pdf parse error: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("invalid document structure: {0}")]
    InvalidStructure(String),
    #[error("page index {index} out of range ({page_count} pages)")]
    PageOutOfRange { index: usize, page_count: usize },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PdfError> for CoreError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::PageOutOfRange { index, page_count } => {
                CoreError::PageIndexOutOfRange { index, page_count }
            }
            PdfError::UnsupportedFormat(format) => CoreError::UnsupportedFormat(format),
            other => CoreError::Backend(other.to_string()),
        }
    }
}
