//! 集成测试与单元测试共用的 PDF 样例

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream};

/// 每页内容为 `(<标签><页索引>)` 的测试 PDF，可指定每页 /Rotate
pub fn sample_pdf(label: &str, rotations: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();

    for (i, rotate) in rotations.iter().enumerate() {
        let text = format!("BT /F1 24 Tf 72 720 Td ({}{}) Tj ET", label, i);
        let content_id = doc.add_object(Stream::new(dictionary! {}, text.into_bytes()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if *rotate != 0 {
            page.set("Rotate", Object::Integer(*rotate));
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    // MediaBox 放在页面树根上，由页面继承
    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(595),
        Object::Integer(842),
    ];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "MediaBox" => media_box,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// 按页序读取 (标签, /Rotate)
pub fn page_labels(bytes: &[u8]) -> Vec<(String, i64)> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            let text = String::from_utf8_lossy(&content).into_owned();
            let start = text.find('(').unwrap() + 1;
            let end = text.find(')').unwrap();
            let rotate = doc
                .get_dictionary(page_id)
                .and_then(|d| d.get(b"Rotate"))
                .and_then(Object::as_i64)
                .unwrap_or(0);
            (text[start..end].to_string(), rotate)
        })
        .collect()
}

pub fn labels(bytes: &[u8]) -> Vec<String> {
    page_labels(bytes).into_iter().map(|(label, _)| label).collect()
}
