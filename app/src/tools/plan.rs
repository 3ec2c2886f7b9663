use folio_core::Session;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{apply_edit, load_files, EditOp, ToolContext, ToolError, ToolOutcome, ToolResult};
use crate::sink::OutputSink;

const DEFAULT_PLAN_OUTPUT: &str = "edited.pdf";

/// JSON 编辑计划
///
/// ```json
/// {
///   "files": ["a.pdf", "b.pdf"],
///   "operations": [
///     { "op": "move", "from": 4, "to": 1 },
///     { "op": "rotate", "pages": "1-2", "direction": "right" },
///     { "op": "exclude", "pages": "3" }
///   ],
///   "output": "result.pdf"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPlan {
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub operations: Vec<EditOp>,
    #[serde(default)]
    pub output: Option<String>,
}

impl EditPlan {
    /// 相对路径按计划文件所在目录解析
    fn resolve_files(&self, base_dir: &Path) -> Vec<PathBuf> {
        self.files
            .iter()
            .map(|file| {
                if file.is_absolute() {
                    file.clone()
                } else {
                    base_dir.join(file)
                }
            })
            .collect()
    }
}

pub async fn load_plan(path: &Path) -> ToolResult<EditPlan> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ToolError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(serde_json::from_str(&raw)?)
}

/// 按计划加载文件、依次执行编辑并输出
pub async fn run_plan<S: OutputSink>(
    ctx: &ToolContext<S>,
    session: &mut Session,
    plan: &EditPlan,
    base_dir: &Path,
) -> ToolResult<ToolOutcome> {
    let _guard = ctx.busy.acquire()?;

    let report = load_files(ctx, session, &plan.resolve_files(base_dir)).await;
    if session.working_set().is_empty() {
        return Err(ToolError::NoDocuments);
    }

    for (step, op) in plan.operations.iter().enumerate() {
        if let Err(e) = apply_edit(session, op) {
            log::error!("[Plan] 第 {} 步失败 {:?}: {}", step + 1, op, e);
            return Err(e.into());
        }
    }

    let bytes = session.materialize(&ctx.library())?;
    let output = plan.output.as_deref().unwrap_or(DEFAULT_PLAN_OUTPUT);
    let delivered = ctx.sink.deliver(bytes, output).await?;
    log::info!(
        "[Plan] {} 步编辑完成, 输出 {}",
        plan.operations.len(),
        delivered.name
    );

    Ok(ToolOutcome {
        delivered,
        failures: report.failures,
    })
}
