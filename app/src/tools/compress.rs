use folio_core::Session;
use folio_pdf::LopdfLibrary;
use std::path::Path;

use super::{load_single, output_name, ToolContext, ToolResult};
use crate::sink::{Delivered, OutputSink};

#[derive(Debug)]
pub struct CompressOutcome {
    pub delivered: Delivered,
    pub original_size: usize,
    pub compressed_size: usize,
}

impl CompressOutcome {
    /// 节省的比例，0.25 表示缩小了 25%
    pub fn savings(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        1.0 - self.compressed_size as f64 / self.original_size as f64
    }
}

/// 把全部页面复制到新文档并压缩所有流
///
/// 复制时只带上页面实际引用的对象，未引用的对象自然丢弃。
pub async fn compress<S: OutputSink>(
    ctx: &ToolContext<S>,
    session: &mut Session,
    file: &Path,
) -> ToolResult<CompressOutcome> {
    let _guard = ctx.busy.acquire()?;

    let name = load_single(ctx, session, file).await?;
    let original_size = session
        .registry()
        .iter()
        .map(|source| source.bytes().len())
        .sum();

    session.select_all();
    let bytes = session.materialize(&LopdfLibrary::with_compression(true))?;
    let compressed_size = bytes.len();
    let delivered = ctx
        .sink
        .deliver(bytes, &output_name(&name, "_compressed", "pdf"))
        .await?;

    let outcome = CompressOutcome {
        delivered,
        original_size,
        compressed_size,
    };
    log::info!(
        "[Compress] {}: {} -> {} 字节 ({:.1}%)",
        name,
        original_size,
        compressed_size,
        outcome.savings() * 100.0
    );
    Ok(outcome)
}
