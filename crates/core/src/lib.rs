//! Page-collection transformation engine: provenance, ordering, rotation and
//! inclusion of pages drawn from one or more source documents.

pub mod document;
pub mod materialize;
pub mod ordering;
pub mod page;
pub mod range;
pub mod rotation;
pub mod session;
pub mod source;

pub use document::{DocumentHandle, DocumentLibrary};
pub use materialize::materialize;
pub use ordering::WorkingSet;
pub use page::{PageId, PageRef};
pub use range::parse_page_range;
pub use rotation::{compose_rotation, Rotation, RotationDirection};
pub use session::{BatchReport, FileFailure, Session, SessionObserver};
pub use source::{SourceDocument, SourceId, SourceRegistry};

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("failed to load {name}: {message}")]
    Load { name: String, message: String },
    #[error("invalid range: {0:?}")]
    InvalidRange(String),
    #[error("no pages selected")]
    EmptySelection,
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("page not found: {0}")]
    PageNotFound(PageId),
    #[error("source not found: {0}")]
    SourceNotFound(SourceId),
    #[error("page index {index} out of range (source has {page_count} pages)")]
    PageIndexOutOfRange { index: usize, page_count: usize },
    #[error("no pages have been rotated")]
    NothingToRotate,
    #[error("cannot remove every page")]
    AllPagesRemoved,
    #[error("another operation is in progress")]
    Busy,
    #[error("document backend error: {0}")]
    Backend(String),
}

impl CoreError {
    pub fn load(name: impl Into<String>, message: impl ToString) -> Self {
        CoreError::Load {
            name: name.into(),
            message: message.to_string(),
        }
    }
}
