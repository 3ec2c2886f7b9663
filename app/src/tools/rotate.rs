use folio_core::{CoreError, Session};
use std::path::Path;

use super::{apply_edit, load_single, output_name, EditOp, ToolContext, ToolOutcome, ToolResult};
use crate::sink::OutputSink;

/// 旋转页面并输出整份文档
///
/// 没有任何页面带旋转时拒绝输出。
pub async fn rotate<S: OutputSink>(
    ctx: &ToolContext<S>,
    session: &mut Session,
    file: &Path,
    edits: &[EditOp],
) -> ToolResult<ToolOutcome> {
    let _guard = ctx.busy.acquire()?;

    let name = load_single(ctx, session, file).await?;
    for op in edits {
        apply_edit(session, op)?;
    }
    if !session.working_set().has_rotations() {
        return Err(CoreError::NothingToRotate.into());
    }

    // 旋转工具总是输出全部页面
    session.select_all();
    let rotated = session
        .working_set()
        .pages()
        .iter()
        .filter(|p| !p.rotation().is_zero())
        .count();
    log::info!("[Rotate] {}: {} 页带旋转", name, rotated);

    let bytes = session.materialize(&ctx.library())?;
    let delivered = ctx
        .sink
        .deliver(bytes, &output_name(&name, "_rotated", "pdf"))
        .await?;
    Ok(ToolOutcome {
        delivered,
        failures: Vec::new(),
    })
}
