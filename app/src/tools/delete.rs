use folio_core::{CoreError, Session};
use std::path::Path;

use super::{load_single, output_name, resolve_pages, ToolContext, ToolOutcome, ToolResult};
use crate::sink::OutputSink;

/// 删除范围内的页面
///
/// 页面只是标记为不输出，会话里仍可恢复；全部页面都被标记时拒绝输出。
pub async fn delete_pages<S: OutputSink>(
    ctx: &ToolContext<S>,
    session: &mut Session,
    file: &Path,
    range: &str,
) -> ToolResult<ToolOutcome> {
    let _guard = ctx.busy.acquire()?;

    let name = load_single(ctx, session, file).await?;
    let marked = resolve_pages(session, range)?;
    // 先检查再标记，拒绝时工作集保持不变
    let working_set = session.working_set();
    let newly_excluded = marked
        .iter()
        .filter_map(|id| working_set.get(*id).ok())
        .filter(|page| page.included())
        .count();
    if working_set.included_count() == newly_excluded {
        return Err(CoreError::AllPagesRemoved.into());
    }
    for id in &marked {
        session.set_included(*id, false)?;
    }
    log::info!(
        "[Delete] {}: 删除 {} 页, 保留 {} 页",
        name,
        marked.len(),
        session.working_set().included_count()
    );

    let bytes = session.materialize(&ctx.library())?;
    let delivered = ctx
        .sink
        .deliver(bytes, &output_name(&name, "_edited", "pdf"))
        .await?;
    Ok(ToolOutcome {
        delivered,
        failures: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FolioConfig;
    use crate::sink::tests::MemorySink;
    use crate::tools::testing::{page_labels, sample_pdf};
    use crate::tools::ToolError;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_delete_middle_page() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("doc.pdf");
        std::fs::write(&file, sample_pdf("D", &[0; 3])).unwrap();

        let ctx = ToolContext::new(FolioConfig::default(), MemorySink::default());
        let mut session = Session::new();
        let outcome = delete_pages(&ctx, &mut session, &file, "2").await.unwrap();

        assert_eq!(outcome.delivered.name, "doc_edited.pdf");
        let labels: Vec<String> = page_labels(&ctx.sink.last()).into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["D0", "D2"]);
        // 标记可恢复，页面仍在工作集中
        assert_eq!(session.working_set().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_everything_refused() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("doc.pdf");
        std::fs::write(&file, sample_pdf("D", &[0; 2])).unwrap();

        let ctx = ToolContext::new(FolioConfig::default(), MemorySink::default());
        let mut session = Session::new();
        let result = delete_pages(&ctx, &mut session, &file, "1-2").await;

        assert!(matches!(
            result,
            Err(ToolError::Core(CoreError::AllPagesRemoved))
        ));
        assert!(ctx.sink.names().is_empty());
        assert_eq!(session.working_set().included_count(), 2);
    }
}
