use std::path::{Path, PathBuf};

/// 交付结果
#[derive(Debug, Clone)]
pub struct Delivered {
    pub name: String,
    pub location: PathBuf,
    pub size: usize,
}

/// 输出去向
#[allow(async_fn_in_trait)]
pub trait OutputSink {
    async fn deliver(&self, bytes: Vec<u8>, suggested_name: &str) -> std::io::Result<Delivered>;
}

/// 写入指定目录，同名文件会被覆盖
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl OutputSink for DirectorySink {
    async fn deliver(&self, bytes: Vec<u8>, suggested_name: &str) -> std::io::Result<Delivered> {
        tokio::fs::create_dir_all(&self.directory).await?;
        // 只取文件名部分，避免写出目录之外
        let name = Path::new(suggested_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output.pdf".to_string());
        let location = self.directory.join(&name);
        let size = bytes.len();

        tokio::fs::write(&location, bytes).await?;
        log::info!("[Sink] 已写入 {} ({} 字节)", location.display(), size);
        Ok(Delivered {
            name,
            location,
            size,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;

    /// 内存收集器
    #[derive(Default)]
    pub struct MemorySink {
        pub files: RefCell<Vec<(String, Vec<u8>)>>,
    }

    impl MemorySink {
        pub fn names(&self) -> Vec<String> {
            self.files.borrow().iter().map(|(n, _)| n.clone()).collect()
        }

        pub fn last(&self) -> Vec<u8> {
            self.files
                .borrow()
                .last()
                .map(|(_, b)| b.clone())
                .unwrap_or_default()
        }
    }

    impl OutputSink for MemorySink {
        async fn deliver(&self, bytes: Vec<u8>, suggested_name: &str) -> std::io::Result<Delivered> {
            let size = bytes.len();
            self.files.borrow_mut().push((suggested_name.to_string(), bytes));
            Ok(Delivered {
                name: suggested_name.to_string(),
                location: PathBuf::from(suggested_name),
                size,
            })
        }
    }

    #[tokio::test]
    async fn test_directory_sink_writes_file() {
        let dir = tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("out"));
        let delivered = sink.deliver(b"%PDF".to_vec(), "merged.pdf").await.unwrap();

        assert_eq!(delivered.size, 4);
        assert_eq!(std::fs::read(dir.path().join("out/merged.pdf")).unwrap(), b"%PDF");
    }

    #[tokio::test]
    async fn test_directory_sink_strips_directories() {
        let dir = tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let delivered = sink.deliver(b"x".to_vec(), "../escape.pdf").await.unwrap();
        assert_eq!(delivered.location, dir.path().join("escape.pdf"));
    }
}
