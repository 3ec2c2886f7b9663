mod common;

use clap::Parser;
use common::{labels, page_labels, sample_pdf};
use folio::cli::{run, Cli};
use folio::tools::{self, EditOp};
use folio::{save_config, DirectorySink, FolioConfig, ToolContext, ToolError};
use folio_core::{CoreError, RotationDirection, Session, SessionObserver, WorkingSet};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, bytes: Vec<u8>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn context(out: &Path) -> ToolContext<DirectorySink> {
    let config = FolioConfig {
        output_directory: out.to_path_buf(),
        ..FolioConfig::default()
    };
    ToolContext::new(config, DirectorySink::new(out))
}

struct CountingObserver(Rc<Cell<usize>>);

impl SessionObserver for CountingObserver {
    fn on_change(&mut self, _working_set: &WorkingSet) {
        self.0.set(self.0.get() + 1);
    }
}

#[tokio::test]
async fn merge_writes_into_output_directory() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.pdf", sample_pdf("A", &[90, 0]));
    let b = write(dir.path(), "b.pdf", sample_pdf("B", &[0]));
    let out = dir.path().join("out");

    let ctx = context(&out);
    let mut session = Session::new();
    let edits = vec![EditOp::Rotate {
        pages: "1".to_string(),
        direction: RotationDirection::Right,
    }];
    let outcome = tools::merge(&ctx, &mut session, &[a, b], &edits).await.unwrap();

    assert_eq!(outcome.delivered.location, out.join("merged.pdf"));
    let bytes = std::fs::read(out.join("merged.pdf")).unwrap();
    assert_eq!(
        page_labels(&bytes),
        vec![
            ("A0".to_string(), 180),
            ("A1".to_string(), 0),
            ("B0".to_string(), 0)
        ]
    );
}

#[tokio::test]
async fn inherited_media_box_survives_extraction() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "report.pdf", sample_pdf("R", &[0, 0, 0]));
    let out = dir.path().join("out");

    let ctx = context(&out);
    let mut session = Session::new();
    tools::split(&ctx, &mut session, &file, "3").await.unwrap();

    let doc = lopdf::Document::load(out.join("report_extracted.pdf")).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);
    let page = doc.get_dictionary(pages[&1]).unwrap();
    assert!(page.has(b"MediaBox"));
}

#[tokio::test]
async fn compressed_output_stays_readable() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.pdf", sample_pdf("A", &[0, 0]));
    let b = write(dir.path(), "b.pdf", sample_pdf("B", &[0, 0]));
    let out = dir.path().join("out");

    let mut ctx = context(&out);
    ctx.config.compress_output = true;
    let mut session = Session::new();
    tools::merge(&ctx, &mut session, &[b, a], &[]).await.unwrap();

    let bytes = std::fs::read(out.join("merged.pdf")).unwrap();
    assert_eq!(labels(&bytes), vec!["B0", "B1", "A0", "A1"]);
}

#[tokio::test]
async fn busy_context_rejects_second_operation() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.pdf", sample_pdf("A", &[0, 0]));

    let ctx = context(&dir.path().join("out"));
    let _guard = ctx.busy.acquire().unwrap();
    let mut session = Session::new();
    let result = tools::merge(&ctx, &mut session, &[a], &[]).await;

    assert!(matches!(result, Err(ToolError::Core(CoreError::Busy))));
    assert!(session.working_set().is_empty());
}

#[tokio::test]
async fn observers_see_each_mutation() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.pdf", sample_pdf("A", &[0, 0, 0]));

    let ctx = context(&dir.path().join("out"));
    let changes = Rc::new(Cell::new(0));
    let mut session = Session::new();
    session.subscribe(Box::new(CountingObserver(Rc::clone(&changes))));

    // 加载 1 次，排除 1 次
    tools::delete_pages(&ctx, &mut session, &a, "2").await.unwrap();
    assert_eq!(changes.get(), 2);
}

#[tokio::test]
async fn failed_load_keeps_previous_document() {
    let dir = tempdir().unwrap();
    let good = write(dir.path(), "good.pdf", sample_pdf("G", &[0, 0]));
    let bad = write(dir.path(), "bad.pdf", b"%PDF-1.7 garbage".to_vec());

    let ctx = context(&dir.path().join("out"));
    let mut session = Session::new();
    tools::split(&ctx, &mut session, &good, "1-2").await.unwrap();

    let result = tools::split(&ctx, &mut session, &bad, "1").await;
    assert!(matches!(result, Err(ToolError::Core(CoreError::Load { .. }))));
    assert_eq!(session.working_set().len(), 2);
    assert_eq!(session.registry().len(), 1);
}

#[tokio::test]
async fn cli_runs_split_with_config_file() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "deck.pdf", sample_pdf("D", &[0, 0, 0, 0]));
    let out = dir.path().join("exports");
    let config_path = dir.path().join("folio.json");
    save_config(
        &config_path,
        &FolioConfig {
            output_directory: out.clone(),
            ..FolioConfig::default()
        },
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "folio".into(),
        "--config".into(),
        config_path.into_os_string(),
        "split".into(),
        file.into_os_string(),
        "--pages".into(),
        "4-3".into(),
    ])
    .unwrap();
    run(cli).await.unwrap();

    let bytes = std::fs::read(out.join("deck_extracted.pdf")).unwrap();
    assert_eq!(labels(&bytes), vec!["D2", "D3"]);
}

#[tokio::test]
async fn cli_output_flag_overrides_config() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "scan.pdf", sample_pdf("S", &[0, 0]));
    let out = dir.path().join("rotated");

    let cli = Cli::try_parse_from([
        "folio".into(),
        "--config".into(),
        dir.path().join("missing.json").into_os_string(),
        "-o".into(),
        out.clone().into_os_string(),
        "rotate".into(),
        file.into_os_string(),
        "--pages".into(),
        "2".into(),
    ])
    .unwrap();
    run(cli).await.unwrap();

    let bytes = std::fs::read(out.join("scan_rotated.pdf")).unwrap();
    assert_eq!(
        page_labels(&bytes),
        vec![("S0".to_string(), 0), ("S1".to_string(), 90)]
    );
}
