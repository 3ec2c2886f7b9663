use folio_core::{CoreError, DocumentHandle, FileFailure};
use folio_pdf::{ImageAsset, PdfHandle};
use std::path::{Path, PathBuf};

use super::{display_name, output_name, read_input, ToolContext, ToolError, ToolResult};
use crate::sink::{Delivered, OutputSink};

#[derive(Debug)]
pub struct ImagesOutcome {
    pub delivered: Delivered,
    pub added: usize,
    /// 读取失败或格式不支持的图片
    pub skipped: Vec<FileFailure>,
}

/// 每张图片追加为文档末尾的一页
///
/// 单张图片失败只跳过该图片；一张都没嵌入时不输出。
pub async fn add_images<S: OutputSink>(
    ctx: &ToolContext<S>,
    file: &Path,
    images: &[PathBuf],
) -> ToolResult<ImagesOutcome> {
    let _guard = ctx.busy.acquire()?;

    let (name, bytes) = read_input(file).await?;
    let mut handle = PdfHandle::load(&bytes, ctx.config.compress_output)?;
    let layout = ctx.config.image_layout();

    let mut added = 0;
    let mut skipped = Vec::new();
    for path in images {
        let image_name = display_name(path);
        let result = match tokio::fs::read(path).await {
            Ok(data) => handle
                .append_image_page(&ImageAsset::new(image_name.clone(), data), &layout)
                .map_err(CoreError::from),
            Err(e) => Err(CoreError::load(image_name.clone(), e)),
        };
        match result {
            Ok(_) => added += 1,
            Err(error) => {
                log::warn!("[Images] 跳过 {}: {}", image_name, error);
                skipped.push(FileFailure {
                    name: image_name,
                    error,
                });
            }
        }
    }

    if added == 0 {
        return Err(ToolError::NoImagesEmbedded);
    }

    let output = handle.save()?;
    let delivered = ctx
        .sink
        .deliver(output, &output_name(&name, "_with_images", "pdf"))
        .await?;
    log::info!("[Images] {}: 新增 {} 页, 跳过 {} 张", name, added, skipped.len());

    Ok(ImagesOutcome {
        delivered,
        added,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FolioConfig;
    use crate::sink::tests::MemorySink;
    use crate::tools::testing::sample_pdf;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn png() -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image::RgbImage::from_pixel(20, 10, image::Rgb([0, 128, 255]))
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_unsupported_image_skipped() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("album.pdf");
        let good = dir.path().join("photo.png");
        let bad = dir.path().join("anim.gif");
        std::fs::write(&file, sample_pdf("P", &[0; 1])).unwrap();
        std::fs::write(&good, png()).unwrap();
        std::fs::write(&bad, b"GIF89a\x01\x00\x01\x00").unwrap();

        let ctx = ToolContext::new(FolioConfig::default(), MemorySink::default());
        let outcome = add_images(&ctx, &file, &[bad, good]).await.unwrap();

        assert_eq!(outcome.delivered.name, "album_with_images.pdf");
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(matches!(
            outcome.skipped[0].error,
            CoreError::UnsupportedFormat(_)
        ));

        let doc = lopdf::Document::load_mem(&ctx.sink.last()).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[tokio::test]
    async fn test_no_embeddable_images() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("album.pdf");
        std::fs::write(&file, sample_pdf("P", &[0; 1])).unwrap();

        let ctx = ToolContext::new(FolioConfig::default(), MemorySink::default());
        let result = add_images(&ctx, &file, &[dir.path().join("missing.png")]).await;
        assert!(matches!(result, Err(ToolError::NoImagesEmbedded)));
    }
}
