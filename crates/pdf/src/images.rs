//! 图片嵌入：每张图片追加为一个新页面，等比缩放后居中

use image::{DynamicImage, ImageFormat};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::library::PdfHandle;
use crate::{PdfError, Result};

/// 支持嵌入的图片编码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormatKind {
    Png,
    Jpeg,
}

/// 待嵌入的图片
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub name: String,
    pub bytes: Vec<u8>,
    /// 声明的 MIME 类型（如 `image/png`），缺省时按内容识别
    pub mime_type: Option<String>,
}

impl ImageAsset {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            mime_type: None,
        }
    }

    /// 判断图片编码，只接受 PNG 和 JPEG
    pub fn format(&self) -> Result<ImageFormatKind> {
        if let Some(mime) = &self.mime_type {
            return match mime.to_ascii_lowercase().as_str() {
                "image/png" => Ok(ImageFormatKind::Png),
                "image/jpeg" | "image/jpg" => Ok(ImageFormatKind::Jpeg),
                other => Err(PdfError::UnsupportedFormat(other.to_string())),
            };
        }
        match image::guess_format(&self.bytes) {
            Ok(ImageFormat::Png) => Ok(ImageFormatKind::Png),
            Ok(ImageFormat::Jpeg) => Ok(ImageFormatKind::Jpeg),
            Ok(other) => Err(PdfError::UnsupportedFormat(format!("{:?}", other))),
            Err(_) => Err(PdfError::UnsupportedFormat(format!("unknown ({})", self.name))),
        }
    }
}

/// 图片页面版式
#[derive(Debug, Clone, Copy)]
pub struct ImagePageLayout {
    pub page_width: f32,
    pub page_height: f32,
    /// 宽高方向各自扣除的总边距
    pub margin: f32,
}

impl Default for ImagePageLayout {
    fn default() -> Self {
        // A4
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin: 50.0,
        }
    }
}

impl ImagePageLayout {
    /// 返回 (x, y, 宽, 高)
    fn place(&self, image_width: f32, image_height: f32) -> (f32, f32, f32, f32) {
        let scale = ((self.page_width - self.margin) / image_width)
            .min((self.page_height - self.margin) / image_height);
        let width = image_width * scale;
        let height = image_height * scale;
        (
            (self.page_width - width) / 2.0,
            (self.page_height - height) / 2.0,
            width,
            height,
        )
    }
}

impl PdfHandle {
    /// 把图片作为新页面追加到文档末尾，返回新页面索引
    pub fn append_image_page(&mut self, asset: &ImageAsset, layout: &ImagePageLayout) -> Result<usize> {
        let format = asset.format()?;
        let (image_id, width, height) = match format {
            ImageFormatKind::Jpeg => embed_jpeg(&mut self.doc, &asset.bytes)?,
            ImageFormatKind::Png => embed_png(&mut self.doc, &asset.bytes)?,
        };
        let (x, y, w, h) = layout.place(width as f32, height as f32);

        let mut xobjects = Dictionary::new();
        xobjects.set("Im0", Object::Reference(image_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let content = format!("q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/Im0 Do\nQ\n", w, h, x, y);
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page = Dictionary::new();
        page.set("Type", "Page");
        page.set(
            "MediaBox",
            vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(layout.page_width),
                Object::Real(layout.page_height),
            ],
        );
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Reference(content_id));
        let page_id = self.doc.add_object(Object::Dictionary(page));

        log::info!("[Images] {} 嵌入为新页面 ({}x{}, {:?})", asset.name, width, height, format);
        self.attach_page(page_id)
    }
}

fn image_dictionary(width: u32, height: u32, color_space: &str) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", "XObject");
    dict.set("Subtype", "Image");
    dict.set("Width", Object::Integer(i64::from(width)));
    dict.set("Height", Object::Integer(i64::from(height)));
    dict.set("ColorSpace", color_space);
    dict.set("BitsPerComponent", Object::Integer(8));
    dict
}

/// JPEG 原样嵌入（DCTDecode），只解码以获取尺寸和颜色通道
fn embed_jpeg(doc: &mut Document, bytes: &[u8]) -> Result<(ObjectId, u32, u32)> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
    let (width, height) = (img.width(), img.height());
    let color_space = match img {
        DynamicImage::ImageLuma8(_) => "DeviceGray",
        _ => "DeviceRGB",
    };

    let mut dict = image_dictionary(width, height, color_space);
    dict.set("Filter", "DCTDecode");
    let stream = Stream::new(dict, bytes.to_vec()).with_compression(false);
    Ok((doc.add_object(stream), width, height))
}

/// PNG 解码为 RGB，透明通道写成 SMask
fn embed_png(doc: &mut Document, bytes: &[u8]) -> Result<(ObjectId, u32, u32)> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    let (width, height) = (img.width(), img.height());

    let mut dict = image_dictionary(width, height, "DeviceRGB");
    if img.color().has_alpha() {
        let alpha: Vec<u8> = img.to_rgba8().pixels().map(|p| p.0[3]).collect();
        let mut smask = Stream::new(image_dictionary(width, height, "DeviceGray"), alpha);
        smask.compress()?;
        let smask_id = doc.add_object(smask);
        dict.set("SMask", Object::Reference(smask_id));
    }

    let mut stream = Stream::new(dict, img.to_rgb8().into_raw());
    stream.compress()?;
    Ok((doc.add_object(stream), width, height))
}
