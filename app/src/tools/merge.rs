use folio_core::Session;
use std::path::PathBuf;
use std::time::Instant;

use super::{apply_edit, load_files, EditOp, ToolContext, ToolError, ToolOutcome, ToolResult};
use crate::sink::OutputSink;

const MERGED_NAME: &str = "merged.pdf";

/// 合并多个文件
///
/// 读取或解析失败的文件跳过并记入结果，其余文件照常合并。
/// 编辑按顺序应用后至少要剩两页。
pub async fn merge<S: OutputSink>(
    ctx: &ToolContext<S>,
    session: &mut Session,
    files: &[PathBuf],
    edits: &[EditOp],
) -> ToolResult<ToolOutcome> {
    let _guard = ctx.busy.acquire()?;
    let start = Instant::now();

    let report = load_files(ctx, session, files).await;
    if session.working_set().is_empty() {
        return Err(ToolError::NoDocuments);
    }

    for op in edits {
        apply_edit(session, op)?;
    }

    let found = session.working_set().included_count();
    if found < 2 {
        return Err(ToolError::NotEnoughPages { required: 2, found });
    }

    let bytes = session.materialize(&ctx.library())?;
    let delivered = ctx.sink.deliver(bytes, MERGED_NAME).await?;
    log::info!(
        "[Merge] {} 个文件, {} 页 -> {}, 耗时 {:?}",
        report.loaded.len(),
        found,
        delivered.name,
        start.elapsed()
    );

    Ok(ToolOutcome {
        delivered,
        failures: report.failures,
    })
}
