use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use folio_core::{RotationDirection, Session};
use folio_render::PdfiumRenderer;
use std::path::{Path, PathBuf};

use crate::config::{config_path, load_config, save_config, FolioConfig};
use crate::observer::LoggingObserver;
use crate::sink::DirectorySink;
use crate::tools::{self, EditOp, ToolContext, ToolOutcome};

#[derive(Debug, Parser)]
#[command(
    name = "folio",
    about = "Merge, split, rotate and reorder PDF pages",
    version
)]
pub struct Cli {
    /// Config file (default: $FOLIO_CONFIG, then ./folio.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output directory, overrides the config file
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Merge several PDFs into merged.pdf.
    Merge(MergeArgs),

    /// Extract a page range into <name>_extracted.pdf.
    Split(SplitArgs),

    /// Rotate pages and write <name>_rotated.pdf.
    Rotate(RotateArgs),

    /// Drop pages and write <name>_edited.pdf.
    Delete(DeleteArgs),

    /// Append one page per image and write <name>_with_images.pdf.
    #[command(name = "add-images")]
    AddImages(AddImagesArgs),

    /// Rewrite with compressed streams into <name>_compressed.pdf.
    Compress(FileArgs),

    /// Render every page to <name>_page_<n>.png.
    Thumbnails(ThumbnailArgs),

    /// Run a JSON edit plan.
    Plan(PlanArgs),

    /// Write a default config file.
    #[command(name = "init-config")]
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Turn {
    Left,
    Right,
}

impl From<Turn> for RotationDirection {
    fn from(turn: Turn) -> Self {
        match turn {
            Turn::Left => RotationDirection::Left,
            Turn::Right => RotationDirection::Right,
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct MergeArgs {
    /// Input files, merged in the given order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Move the page at display position FROM to position TO (repeatable)
    #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
    pub moves: Vec<(usize, usize)>,

    /// Pages to rotate 90° clockwise, e.g. "1-3,5"
    #[arg(long, value_name = "RANGE")]
    pub rotate_right: Option<String>,

    /// Pages to rotate 90° counter-clockwise
    #[arg(long, value_name = "RANGE")]
    pub rotate_left: Option<String>,

    /// Pages to leave out
    #[arg(long, value_name = "RANGE")]
    pub exclude: Option<String>,
}

impl MergeArgs {
    fn edits(&self) -> Vec<EditOp> {
        let mut edits: Vec<EditOp> = self
            .moves
            .iter()
            .map(|&(from, to)| EditOp::Move { from, to })
            .collect();
        if let Some(pages) = &self.rotate_right {
            edits.push(EditOp::Rotate {
                pages: pages.clone(),
                direction: RotationDirection::Right,
            });
        }
        if let Some(pages) = &self.rotate_left {
            edits.push(EditOp::Rotate {
                pages: pages.clone(),
                direction: RotationDirection::Left,
            });
        }
        if let Some(pages) = &self.exclude {
            edits.push(EditOp::Exclude {
                pages: pages.clone(),
            });
        }
        edits
    }
}

#[derive(Debug, clap::Args)]
pub struct SplitArgs {
    pub file: PathBuf,

    /// Pages to extract, e.g. "1-3, 5, 7-10"
    #[arg(short, long, value_name = "RANGE")]
    pub pages: String,
}

#[derive(Debug, clap::Args)]
pub struct RotateArgs {
    pub file: PathBuf,

    /// Pages to rotate ("all" for every page)
    #[arg(short, long, value_name = "RANGE", default_value = "all")]
    pub pages: String,

    #[arg(short, long, value_enum, default_value_t = Turn::Right)]
    pub direction: Turn,

    /// Number of quarter turns
    #[arg(short, long, default_value_t = 1)]
    pub times: u8,
}

impl RotateArgs {
    fn edits(&self) -> Vec<EditOp> {
        (0..self.times)
            .map(|_| EditOp::Rotate {
                pages: self.pages.clone(),
                direction: self.direction.into(),
            })
            .collect()
    }
}

#[derive(Debug, clap::Args)]
pub struct DeleteArgs {
    pub file: PathBuf,

    /// Pages to delete
    #[arg(short, long, value_name = "RANGE")]
    pub pages: String,
}

#[derive(Debug, clap::Args)]
pub struct AddImagesArgs {
    pub file: PathBuf,

    /// PNG or JPEG files
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct FileArgs {
    pub file: PathBuf,
}

#[derive(Debug, clap::Args)]
pub struct ThumbnailArgs {
    pub file: PathBuf,

    /// Render scale (default from config, 0.3)
    #[arg(short, long)]
    pub scale: Option<f32>,
}

#[derive(Debug, clap::Args)]
pub struct PlanArgs {
    /// Plan file (JSON)
    pub plan: PathBuf,
}

fn parse_move(value: &str) -> Result<(usize, usize), String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got {:?}", value))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid position {:?}: {}", s, e))
    };
    Ok((parse(from)?, parse(to)?))
}

fn report(outcome: &ToolOutcome) {
    for failure in &outcome.failures {
        eprintln!("skipped {}: {}", failure.name, failure.error);
    }
    println!(
        "wrote {} ({} bytes)",
        outcome.delivered.location.display(),
        outcome.delivered.size
    );
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    save_config(path, &FolioConfig::default())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let path = config_path(cli.config.as_deref());
    if let Commands::InitConfig { force } = cli.command {
        return init_config(&path, force);
    }

    let mut config = load_config(&path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    if let Some(dir) = cli.output {
        config.output_directory = dir;
    }
    log::debug!("[Config] {:?}", config);

    let sink = DirectorySink::new(config.output_directory.clone());
    let ctx = ToolContext::new(config, sink);
    let mut session = Session::new();
    session.subscribe(Box::new(LoggingObserver::default()));

    match cli.command {
        Commands::Merge(args) => {
            let outcome = tools::merge(&ctx, &mut session, &args.files, &args.edits())
                .await
                .context("merge failed")?;
            report(&outcome);
        }
        Commands::Split(args) => {
            let outcome = tools::split(&ctx, &mut session, &args.file, &args.pages)
                .await
                .context("split failed")?;
            report(&outcome);
        }
        Commands::Rotate(args) => {
            let outcome = tools::rotate(&ctx, &mut session, &args.file, &args.edits())
                .await
                .context("rotate failed")?;
            report(&outcome);
        }
        Commands::Delete(args) => {
            let outcome = tools::delete_pages(&ctx, &mut session, &args.file, &args.pages)
                .await
                .context("delete failed")?;
            report(&outcome);
        }
        Commands::AddImages(args) => {
            let outcome = tools::add_images(&ctx, &args.file, &args.images)
                .await
                .context("add-images failed")?;
            for skipped in &outcome.skipped {
                eprintln!("skipped {}: {}", skipped.name, skipped.error);
            }
            println!(
                "wrote {} ({} image pages)",
                outcome.delivered.location.display(),
                outcome.added
            );
        }
        Commands::Compress(args) => {
            let outcome = tools::compress(&ctx, &mut session, &args.file)
                .await
                .context("compress failed")?;
            println!(
                "wrote {}: {} -> {} bytes ({:.1}% smaller)",
                outcome.delivered.location.display(),
                outcome.original_size,
                outcome.compressed_size,
                outcome.savings() * 100.0
            );
        }
        Commands::Thumbnails(args) => {
            let renderer = PdfiumRenderer::new(ctx.config.pdfium_library_path.as_deref())
                .context("pdfium is required for thumbnails")?;
            let delivered = tools::thumbnails(&ctx, &renderer, &args.file, args.scale)
                .await
                .context("thumbnails failed")?;
            println!(
                "wrote {} thumbnails to {}",
                delivered.len(),
                ctx.sink.directory().display()
            );
        }
        Commands::Plan(args) => {
            let plan = tools::load_plan(&args.plan).await?;
            let base_dir = args
                .plan
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            let outcome = tools::run_plan(&ctx, &mut session, &plan, &base_dir)
                .await
                .context("plan failed")?;
            report(&outcome);
        }
        Commands::InitConfig { force } => init_config(&path, force)?,
    }
    Ok(())
}
