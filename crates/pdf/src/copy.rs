//! 跨文档复制页面
//!
//! 从源页面出发复制它引用到的全部对象（字体、图片、内容流等），
//! 在目标文档中重新分配对象号。映射表按源文档记录，
//! 同一源文档的共享资源在一个输出文档里只复制一次。

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

use crate::utils::flatten_page_dictionary;
use crate::{PdfError, Result};

/// 源文档对象号 -> 目标文档对象号
pub type ObjectMap = HashMap<ObjectId, ObjectId>;

/// 把源文档中的一页复制到目标文档，返回新页面对象号
///
/// 新页面没有 Parent，由调用方挂到自己的页面树上。
/// 指向其他页面或页面树节点的引用（例如链接注释的目标）被替换为 null，
/// 避免把整个源页面树带进来。
pub fn copy_page(
    source: &Document,
    page_id: ObjectId,
    target: &mut Document,
    map: &mut ObjectMap,
) -> Result<ObjectId> {
    let page = flatten_page_dictionary(source, page_id)
        .ok_or_else(|| PdfError::InvalidStructure(format!("page object {:?} missing", page_id)))?;

    let new_page_id = target.new_object_id();
    // 页面本身不进入共享映射：同一页可以被复制多次，每次都是独立的新页面
    let previous = map.insert(page_id, new_page_id);

    let mut pending = Vec::new();
    let page = Object::Dictionary(page);
    let copied = rewrite(&page, source, target, map, &mut pending);
    target.objects.insert(new_page_id, copied);

    while let Some((source_id, target_id)) = pending.pop() {
        let object = source
            .get_object(source_id)
            .map(Object::clone)
            .unwrap_or(Object::Null);
        let copied = rewrite(&object, source, target, map, &mut pending);
        target.objects.insert(target_id, copied);
    }

    match previous {
        Some(id) => map.insert(page_id, id),
        None => map.remove(&page_id),
    };
    Ok(new_page_id)
}

fn rewrite(
    object: &Object,
    source: &Document,
    target: &mut Document,
    map: &mut ObjectMap,
    pending: &mut Vec<(ObjectId, ObjectId)>,
) -> Object {
    match object {
        Object::Reference(id) => {
            if let Some(mapped) = map.get(id) {
                return Object::Reference(*mapped);
            }
            if is_page_tree_node(source, *id) {
                return Object::Null;
            }
            let new_id = target.new_object_id();
            map.insert(*id, new_id);
            pending.push((*id, new_id));
            Object::Reference(new_id)
        }
        Object::Array(items) => Object::Array(
            items
                .iter()
                .map(|item| rewrite(item, source, target, map, pending))
                .collect(),
        ),
        Object::Dictionary(dict) => Object::Dictionary(rewrite_dict(dict, source, target, map, pending)),
        Object::Stream(stream) => {
            let mut stream = stream.clone();
            stream.dict = rewrite_dict(&stream.dict, source, target, map, pending);
            Object::Stream(stream)
        }
        other => other.clone(),
    }
}

fn rewrite_dict(
    dict: &Dictionary,
    source: &Document,
    target: &mut Document,
    map: &mut ObjectMap,
    pending: &mut Vec<(ObjectId, ObjectId)>,
) -> Dictionary {
    let mut out = Dictionary::new();
    for (key, value) in dict.iter() {
        out.set(key.clone(), rewrite(value, source, target, map, pending));
    }
    out
}

fn is_page_tree_node(doc: &Document, id: ObjectId) -> bool {
    matches!(
        doc.get_object(id).and_then(Object::type_name),
        Ok("Page") | Ok("Pages")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Stream;

    /// 两页共享一个字体资源，第一页带一个指向第二页的链接注释
    fn source_doc() -> (Document, ObjectId, ObjectId, ObjectId) {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut font = Dictionary::new();
        font.set("Type", "Font");
        font.set("Subtype", "Type1");
        font.set("BaseFont", "Helvetica");
        let font_id = doc.add_object(font);

        let mut fonts = Dictionary::new();
        fonts.set("F1", font_id);
        let mut resources = Dictionary::new();
        resources.set("Font", fonts);
        let resources_id = doc.add_object(resources);

        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            b"BT /F1 12 Tf (P2) Tj ET".to_vec(),
        ));
        let mut second = Dictionary::new();
        second.set("Type", "Page");
        second.set("Parent", pages_id);
        second.set("Contents", content_id);
        let second_id = doc.add_object(second);

        let mut link = Dictionary::new();
        link.set("Type", "Annot");
        link.set("Subtype", "Link");
        link.set(
            "Dest",
            vec![Object::Reference(second_id), Object::Name(b"Fit".to_vec())],
        );
        let link_id = doc.add_object(link);

        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            b"BT /F1 12 Tf (P1) Tj ET".to_vec(),
        ));
        let mut first = Dictionary::new();
        first.set("Type", "Page");
        first.set("Parent", pages_id);
        first.set("Contents", content_id);
        first.set("Annots", vec![Object::Reference(link_id)]);
        let first_id = doc.add_object(first);

        let mut pages = Dictionary::new();
        pages.set("Type", "Pages");
        pages.set(
            "Kids",
            vec![Object::Reference(first_id), Object::Reference(second_id)],
        );
        pages.set("Count", Object::Integer(2));
        pages.set("Resources", resources_id);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        (doc, first_id, second_id, font_id)
    }

    fn count_fonts(doc: &Document) -> usize {
        doc.objects
            .values()
            .filter(|o| matches!(o.type_name(), Ok("Font")))
            .count()
    }

    #[test]
    fn test_shared_resources_copied_once() {
        let (source, first, second, _) = source_doc();
        let mut target = Document::with_version("1.7");
        let mut map = ObjectMap::new();

        copy_page(&source, first, &mut target, &mut map).unwrap();
        copy_page(&source, second, &mut target, &mut map).unwrap();

        assert_eq!(count_fonts(&target), 1);
    }

    #[test]
    fn test_links_to_other_pages_are_dropped() {
        let (source, first, _, _) = source_doc();
        let mut target = Document::with_version("1.7");
        let mut map = ObjectMap::new();

        copy_page(&source, first, &mut target, &mut map).unwrap();

        let pages = target
            .objects
            .values()
            .filter(|o| matches!(o.type_name(), Ok("Page")))
            .count();
        assert_eq!(pages, 1);
    }

    #[test]
    fn test_same_page_copied_twice_is_two_objects() {
        let (source, first, _, _) = source_doc();
        let mut target = Document::with_version("1.7");
        let mut map = ObjectMap::new();

        let a = copy_page(&source, first, &mut target, &mut map).unwrap();
        let b = copy_page(&source, first, &mut target, &mut map).unwrap();

        assert_ne!(a, b);
        assert!(!map.contains_key(&first));
    }

    #[test]
    fn test_inherited_resources_land_on_page() {
        let (source, first, _, _) = source_doc();
        let mut target = Document::with_version("1.7");
        let mut map = ObjectMap::new();

        let page_id = copy_page(&source, first, &mut target, &mut map).unwrap();
        let page = target.get_dictionary(page_id).unwrap();
        assert!(page.has(b"Resources"));
        assert!(!page.has(b"Parent"));
    }
}
