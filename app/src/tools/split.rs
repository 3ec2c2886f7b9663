use folio_core::Session;
use std::path::Path;

use super::{load_single, output_name, ToolContext, ToolOutcome, ToolResult};
use crate::sink::OutputSink;

/// 按范围表达式提取页面，例如 `1-3, 5, 7-10`
pub async fn split<S: OutputSink>(
    ctx: &ToolContext<S>,
    session: &mut Session,
    file: &Path,
    range: &str,
) -> ToolResult<ToolOutcome> {
    let _guard = ctx.busy.acquire()?;

    let name = load_single(ctx, session, file).await?;
    let selection = session.apply_range(range)?;
    log::info!("[Split] {} 选中 {} 页: {:?}", name, selection.len(), selection);

    let bytes = session.materialize(&ctx.library())?;
    let delivered = ctx
        .sink
        .deliver(bytes, &output_name(&name, "_extracted", "pdf"))
        .await?;
    Ok(ToolOutcome {
        delivered,
        failures: Vec::new(),
    })
}
