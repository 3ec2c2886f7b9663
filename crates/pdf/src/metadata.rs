//! 输出文档元信息

use chrono::Local;
use lopdf::{Dictionary, Document, Object, StringFormat};

use crate::Result;

const PRODUCER_NAME: &str = "Folio";
const PRODUCER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 设置输出文档元信息
///
/// 在 Info 字典中写入生成工具和修改时间，已有的其他字段（标题、作者等）保留。
pub fn set_producer_metadata(doc: &mut Document) -> Result<()> {
    // 获取或创建 Info 字典
    let info_id = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => *id,
        _ => {
            let new_id = doc.add_object(Object::Dictionary(Dictionary::new()));
            doc.trailer.set(b"Info".to_vec(), Object::Reference(new_id));
            new_id
        }
    };

    // PDF 日期格式 D:YYYYMMDDHHmmSS
    let pdf_date = format!("D:{}", Local::now().format("%Y%m%d%H%M%S"));
    let producer = format!("{} v{}", PRODUCER_NAME, PRODUCER_VERSION);

    let info = doc.get_dictionary_mut(info_id)?;
    info.set(
        b"Producer".to_vec(),
        Object::String(producer.as_bytes().to_vec(), StringFormat::Literal),
    );
    if !info.has(b"Creator") {
        info.set(
            b"Creator".to_vec(),
            Object::String(PRODUCER_NAME.as_bytes().to_vec(), StringFormat::Literal),
        );
    }
    info.set(
        b"ModDate".to_vec(),
        Object::String(pdf_date.as_bytes().to_vec(), StringFormat::Literal),
    );

    log::debug!("[Metadata] Producer={}, ModDate={}", producer, pdf_date);
    Ok(())
}
