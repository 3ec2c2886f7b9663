//! 页面工具：合并、拆分、旋转、删除、插入图片、压缩、缩略图、编辑计划
//!
//! 每个工具都是一次异步调用：读取输入、加载到调用方持有的 `Session`、
//! 执行编辑、生成文档并交给 `OutputSink`。

mod compress;
mod delete;
mod edits;
mod images;
mod merge;
mod plan;
mod rotate;
mod split;
mod thumbnails;

pub use compress::{compress, CompressOutcome};
pub use delete::delete_pages;
pub use edits::{apply_edit, resolve_pages, EditOp};
pub use images::{add_images, ImagesOutcome};
pub use merge::merge;
pub use plan::{load_plan, run_plan, EditPlan};
pub use rotate::rotate;
pub use split::split;
pub use thumbnails::thumbnails;

use folio_core::{BatchReport, CoreError, FileFailure, Session};
use folio_pdf::{LopdfLibrary, PdfError};
use folio_render::RenderError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::busy::BusyFlag;
use crate::config::FolioConfig;
use crate::sink::{Delivered, OutputSink};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),
    #[error("invalid edit plan: {0}")]
    Plan(#[from] serde_json::Error),
    #[error("need at least {required} pages, found {found}")]
    NotEnoughPages { required: usize, found: usize },
    #[error("none of the input files could be loaded")]
    NoDocuments,
    #[error("no image could be embedded")]
    NoImagesEmbedded,
}

pub type ToolResult<T> = Result<T, ToolError>;

/// 工具运行环境
pub struct ToolContext<S: OutputSink> {
    pub config: FolioConfig,
    pub sink: S,
    pub busy: BusyFlag,
}

impl<S: OutputSink> ToolContext<S> {
    pub fn new(config: FolioConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            busy: BusyFlag::new(),
        }
    }

    pub fn library(&self) -> LopdfLibrary {
        LopdfLibrary::with_compression(self.config.compress_output)
    }
}

/// 一次工具调用的结果
#[derive(Debug)]
pub struct ToolOutcome {
    pub delivered: Delivered,
    /// 未能加载的输入文件
    pub failures: Vec<FileFailure>,
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `report.pdf` + `_rotated` -> `report_rotated.pdf`
pub(crate) fn output_name(source_name: &str, suffix: &str, extension: &str) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    format!("{}{}.{}", stem, suffix, extension)
}

pub(crate) async fn read_input(path: &Path) -> ToolResult<(String, Arc<[u8]>)> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ToolError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((display_name(path), Arc::from(bytes)))
}

/// 读取并批量加载多个文件；读不到的文件和解析失败的文件一起记入报告
pub(crate) async fn load_files<S: OutputSink>(
    ctx: &ToolContext<S>,
    session: &mut Session,
    paths: &[PathBuf],
) -> BatchReport {
    let mut inputs = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();

    for path in paths {
        match read_input(path).await {
            Ok(input) => inputs.push(input),
            Err(e) => {
                let name = display_name(path);
                log::warn!("[Load] 读取失败 {}: {}", name, e);
                unreadable.push(FileFailure {
                    error: CoreError::load(name.clone(), e),
                    name,
                });
            }
        }
    }

    let mut report = session.load_batch(&ctx.library(), inputs);
    report.failures.extend(unreadable);
    log::info!(
        "[Load] 加载 {} 个文件, 新增 {} 页, 失败 {} 个",
        report.loaded.len(),
        report.added_pages,
        report.failures.len()
    );
    report
}

/// 单文档工具的加载步骤
pub(crate) async fn load_single<S: OutputSink>(
    ctx: &ToolContext<S>,
    session: &mut Session,
    path: &Path,
) -> ToolResult<String> {
    let (name, bytes) = read_input(path).await?;
    session.load_single(&ctx.library(), &name, bytes)?;
    Ok(name)
}

#[cfg(test)]
#[path = "../../tests/common/mod.rs"]
pub(crate) mod testing;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_name() {
        assert_eq!(output_name("report.pdf", "_rotated", "pdf"), "report_rotated.pdf");
        assert_eq!(output_name("scan.v2.pdf", "_page_1", "png"), "scan.v2_page_1.png");
        assert_eq!(output_name("", "_edited", "pdf"), "document_edited.pdf");
    }
}
