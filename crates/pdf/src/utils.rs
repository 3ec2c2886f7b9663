use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object, ObjectId};

/// 页面树中可继承的属性
pub const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// 页面树最大深度，防止 Parent 循环
const MAX_TREE_DEPTH: usize = 64;

/// 解引用：如果是引用则返回被引用的对象
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// 查找页面属性，页面自身没有时沿 Parent 链向上继承
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    log::warn!("[PageTree] 页面 {:?} 的 Parent 链过深，停止查找 {:?}", page_id, String::from_utf8_lossy(key));
    None
}

/// 按文档顺序收集页面树中的页面，/Kids 可以是间接对象
pub fn collect_page_ids(doc: &Document, pages_root: ObjectId) -> Vec<ObjectId> {
    let mut pages = Vec::new();
    let mut visited = HashSet::new();
    walk_page_tree(doc, pages_root, 0, &mut visited, &mut pages);
    pages
}

fn walk_page_tree(
    doc: &Document,
    node_id: ObjectId,
    depth: usize,
    visited: &mut HashSet<ObjectId>,
    pages: &mut Vec<ObjectId>,
) {
    if depth > MAX_TREE_DEPTH || !visited.insert(node_id) {
        log::warn!("[PageTree] 页面树节点 {:?} 重复或过深，已跳过", node_id);
        return;
    }
    let Ok(node) = doc.get_dictionary(node_id) else {
        return;
    };
    match node.type_name() {
        Ok("Page") => pages.push(node_id),
        Ok("Pages") => {
            let kids = node
                .get(b"Kids")
                .ok()
                .and_then(|kids| resolve(doc, kids))
                .and_then(|kids| kids.as_array().ok());
            for kid in kids.into_iter().flatten() {
                if let Ok(kid_id) = kid.as_reference() {
                    walk_page_tree(doc, kid_id, depth + 1, visited, pages);
                }
            }
        }
        _ => {}
    }
}

/// 获取页面的旋转角度（含继承），原始值不做规范化
pub fn get_page_rotation(doc: &Document, page_id: ObjectId) -> i64 {
    inherited_attribute(doc, page_id, b"Rotate")
        .as_ref()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| match obj {
            Object::Integer(i) => Some(*i),
            Object::Real(r) => Some(*r as i64),
            _ => None,
        })
        .unwrap_or(0)
}

/// 复制页面字典，并把从祖先节点继承来的属性写到页面自身
///
/// 页面脱离原页面树后，这些属性不能再依赖 Parent 提供。
pub fn flatten_page_dictionary(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    let mut dict = doc.get_dictionary(page_id).ok()?.clone();
    for key in INHERITABLE_KEYS {
        if dict.has(key) {
            continue;
        }
        if let Some(value) = inherited_attribute(doc, page_id, key) {
            dict.set(key.to_vec(), value);
        }
    }
    dict.remove(b"Parent");
    Some(dict)
}
