use folio_core::{parse_page_range, CoreError, PageId, RotationDirection, Session};
use serde::{Deserialize, Serialize};

/// 对工作集的一次编辑
///
/// 页码一律是执行该编辑时的显示位置（从 1 开始）；`pages` 为范围表达式，
/// `all` 表示全部页面。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditOp {
    Move { from: usize, to: usize },
    Rotate {
        pages: String,
        direction: RotationDirection,
    },
    Remove { pages: String },
    Exclude { pages: String },
    Include { pages: String },
    /// 只保留范围内的页面为已选
    Select { pages: String },
    SelectAll,
    DeselectAll,
}

/// 把范围表达式解析为当前显示顺序下的页面 ID
pub fn resolve_pages(session: &Session, expression: &str) -> Result<Vec<PageId>, CoreError> {
    let working_set = session.working_set();
    if expression.trim().eq_ignore_ascii_case("all") {
        return Ok(working_set.pages().iter().map(|p| p.id()).collect());
    }
    parse_page_range(expression, working_set.len())?
        .into_iter()
        .map(|position| {
            working_set
                .at(position - 1)
                .map(|p| p.id())
                .ok_or_else(|| CoreError::InvalidRange(expression.to_string()))
        })
        .collect()
}

fn page_at(session: &Session, position: usize) -> Result<PageId, CoreError> {
    position
        .checked_sub(1)
        .and_then(|index| session.working_set().at(index))
        .map(|p| p.id())
        .ok_or_else(|| CoreError::InvalidRange(position.to_string()))
}

pub fn apply_edit(session: &mut Session, op: &EditOp) -> Result<(), CoreError> {
    log::debug!("[Edit] {:?}", op);
    match op {
        EditOp::Move { from, to } => {
            let id = page_at(session, *from)?;
            let to_index = to
                .checked_sub(1)
                .ok_or_else(|| CoreError::InvalidRange(to.to_string()))?;
            session.move_page(id, to_index)
        }
        EditOp::Rotate { pages, direction } => {
            let ids = resolve_pages(session, pages)?;
            session.rotate_many(&ids, *direction)
        }
        EditOp::Remove { pages } => {
            for id in resolve_pages(session, pages)? {
                session.remove(id)?;
            }
            Ok(())
        }
        EditOp::Exclude { pages } => {
            for id in resolve_pages(session, pages)? {
                session.set_included(id, false)?;
            }
            Ok(())
        }
        EditOp::Include { pages } => {
            for id in resolve_pages(session, pages)? {
                session.set_included(id, true)?;
            }
            Ok(())
        }
        EditOp::Select { pages } => session.apply_range(pages).map(|_| ()),
        EditOp::SelectAll => {
            session.select_all();
            Ok(())
        }
        EditOp::DeselectAll => {
            session.deselect_all();
            Ok(())
        }
    }
}
