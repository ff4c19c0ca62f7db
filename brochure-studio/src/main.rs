//! # Brochure
//!
//! Batch front end for the brochure engine: generate documents from trip
//! data, refresh them, export pages for print and extract elements from
//! preview snapshots.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use brochure_core::Itinerary;
use brochure_extract::{extract, ExtractOptions, PerceptualColorMode, SnapshotNode};
use brochure_renderer::{ExportConfig, ExportFormat, PageExporter, RetainedCanvas};
use brochure_studio::{LogFormat, PageOverrides, SchemaStore, StudioConfig};
use brochure_themes::ThemeRegistry;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default log directives when neither `BROCHURE_LOG` nor `RUST_LOG` is set.
const DEFAULT_LOG_FILTER: &str = "warn,brochure=info,brochure_studio=info";

#[derive(Debug, Parser)]
#[command(name = "brochure", version, about = "Schema-driven travel brochures")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

/// Settings shared by every subcommand.
#[derive(Debug, Args)]
struct ConfigArgs {
    /// JSON configuration file.
    #[arg(long, global = true, env = "BROCHURE_CONFIG")]
    config: Option<PathBuf>,

    /// Theme for new documents.
    #[arg(long, global = true, env = "BROCHURE_THEME")]
    theme: Option<String>,

    /// Trimmed page width in pixels.
    #[arg(long, global = true)]
    page_width: Option<f32>,

    /// Trimmed page height in pixels.
    #[arg(long, global = true)]
    page_height: Option<f32>,

    /// Bleed beyond the trim edge in pixels.
    #[arg(long, global = true)]
    bleed: Option<f32>,

    /// Safety margin inside the trim edge in pixels.
    #[arg(long, global = true)]
    safety_margin: Option<f32>,

    /// Directory for generated files.
    #[arg(long, short = 'o', global = true, env = "BROCHURE_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, env = "RUST_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

impl ConfigArgs {
    /// Configuration file first, then flags and environment.
    fn resolve(&self) -> anyhow::Result<StudioConfig> {
        let mut config = match &self.config {
            Some(path) => StudioConfig::load(path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
            None => StudioConfig::default(),
        };
        if let Some(theme) = &self.theme {
            config.theme.clone_from(theme);
        }
        config.page.merge(PageOverrides {
            width: self.page_width,
            height: self.page_height,
            bleed: self.bleed,
            safety_margin: self.safety_margin,
        });
        if let Some(dir) = &self.out_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a brochure document from itinerary JSON.
    Generate {
        /// Itinerary JSON file.
        itinerary: PathBuf,
        /// Document file to write; defaults to `<out-dir>/<itinerary id>.json`.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Document name; defaults to the destination city.
        #[arg(long)]
        name: Option<String>,
    },
    /// Re-read trip data into a document, keeping user edits.
    Refresh {
        /// Document JSON file, rewritten in place.
        document: PathBuf,
        /// Itinerary JSON file.
        itinerary: PathBuf,
    },
    /// Write every page of a document for print.
    Export {
        /// Document JSON file.
        document: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Svg)]
        format: OutputFormat,
        /// Output pixels per page pixel.
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
        /// Extend each page by the document bleed.
        #[arg(long)]
        include_bleed: bool,
    },
    /// Convert a preview DOM snapshot into an element list.
    Extract {
        /// DOM snapshot JSON file.
        snapshot: PathBuf,
        /// Scale the preview was rendered at.
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
        /// Seed for reproducible element ids.
        #[arg(long)]
        seed: Option<u64>,
        /// Convert oklab/oklch/lab/lch colors instead of mapping lightness to gray.
        #[arg(long)]
        convert_colors: bool,
        /// Element list file to write; defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the built-in themes.
    Themes {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One SVG file per page.
    Svg,
    /// One PNG file per page.
    Png,
    /// A single multi-page PDF.
    Pdf,
}

/// Initialize structured tracing.
///
/// `BROCHURE_LOG` (or `RUST_LOG`) sets the filter. Logs go to stderr so that
/// command output on stdout stays machine-readable.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_env("BROCHURE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init(),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config.resolve()?;
    init_tracing(config.log_format);
    tracing::debug!(?config, "configuration resolved");

    match cli.command {
        Command::Generate {
            itinerary,
            output,
            name,
        } => generate(&config, &itinerary, output, name),
        Command::Refresh {
            document,
            itinerary,
        } => refresh(&document, &itinerary),
        Command::Export {
            document,
            format,
            scale,
            include_bleed,
        } => export(&config, &document, format, scale, include_bleed),
        Command::Extract {
            snapshot,
            scale,
            seed,
            convert_colors,
            output,
        } => {
            let mut options = ExtractOptions::with_scale(scale);
            if let Some(seed) = seed {
                options = options.with_seed(seed);
            }
            if convert_colors {
                options = options.with_color_mode(PerceptualColorMode::Convert);
            }
            extract_snapshot(&snapshot, &options, output.as_deref())
        }
        Command::Themes { json } => list_themes(json),
    }
}

fn read_itinerary(path: &Path) -> anyhow::Result<Itinerary> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading itinerary {}", path.display()))?;
    Itinerary::from_json(&json).with_context(|| format!("parsing itinerary {}", path.display()))
}

fn generate(
    config: &StudioConfig,
    itinerary_path: &Path,
    output: Option<PathBuf>,
    name: Option<String>,
) -> anyhow::Result<()> {
    let itinerary = read_itinerary(itinerary_path)?;
    let mut store = SchemaStore::<RetainedCanvas>::from_itinerary(
        &itinerary,
        ThemeRegistry::builtin(),
        &config.theme,
        config.document_settings(),
    )
    .context("generating brochure")?;
    if let Some(name) = name {
        store.rename(name);
    }

    let output = output.unwrap_or_else(|| {
        config
            .output_dir
            .join(format!("{}.json", sanitize_filename(&itinerary.id)))
    });
    ensure_parent(&output)?;
    store
        .save(&output)
        .with_context(|| format!("writing document {}", output.display()))?;
    tracing::info!(
        pages = store.document().page_count(),
        path = %output.display(),
        "document written"
    );
    println!("{}", output.display());
    Ok(())
}

fn refresh(document_path: &Path, itinerary_path: &Path) -> anyhow::Result<()> {
    let itinerary = read_itinerary(itinerary_path)?;
    let mut store = SchemaStore::<RetainedCanvas>::open(document_path, ThemeRegistry::builtin())
        .with_context(|| format!("opening document {}", document_path.display()))?;
    store
        .refresh_all_from_source(&itinerary)
        .context("refreshing pages")?;
    store
        .save(document_path)
        .with_context(|| format!("writing document {}", document_path.display()))?;
    println!("{}", document_path.display());
    Ok(())
}

fn export(
    config: &StudioConfig,
    document_path: &Path,
    format: OutputFormat,
    scale: f32,
    include_bleed: bool,
) -> anyhow::Result<()> {
    let store = SchemaStore::<RetainedCanvas>::open(document_path, ThemeRegistry::builtin())
        .with_context(|| format!("opening document {}", document_path.display()))?;
    let document = store.document();
    if document.pages.is_empty() {
        bail!("document {} has no pages", document_path.display());
    }

    let exporter = PageExporter::new(ExportConfig {
        scale,
        include_bleed,
        bleed: document.settings.bleed,
        ..ExportConfig::default()
    });
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    let mut written = Vec::new();
    match format {
        OutputFormat::Svg => {
            let pages = exporter
                .export_document(document)
                .context("rendering pages")?;
            for (index, svg) in pages.iter().enumerate() {
                let path = page_path(&config.output_dir, index, ExportFormat::Svg);
                fs::write(&path, svg).with_context(|| format!("writing {}", path.display()))?;
                written.push(path);
            }
        }
        OutputFormat::Png => {
            for (index, page) in document.pages.iter().enumerate() {
                let bytes = exporter
                    .export(page, ExportFormat::Png)
                    .with_context(|| format!("rendering page {}", index + 1))?;
                let path = page_path(&config.output_dir, index, ExportFormat::Png);
                fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
                written.push(path);
            }
        }
        OutputFormat::Pdf => {
            let bytes = exporter
                .export_document_pdf(document)
                .context("rendering pdf")?;
            let path = config
                .output_dir
                .join(format!("{}.pdf", sanitize_filename(&document.name)));
            fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
            written.push(path);
        }
    }

    tracing::info!(files = written.len(), ?format, "export finished");
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn extract_snapshot(
    snapshot_path: &Path,
    options: &ExtractOptions,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let json = fs::read_to_string(snapshot_path)
        .with_context(|| format!("reading snapshot {}", snapshot_path.display()))?;
    let root = SnapshotNode::from_json(&json)
        .with_context(|| format!("parsing snapshot {}", snapshot_path.display()))?;
    let elements = extract(&root, options).context("extracting elements")?;
    let json = serde_json::to_string_pretty(&elements).context("serializing elements")?;

    match output {
        Some(path) => {
            ensure_parent(path)?;
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(elements = elements.len(), path = %path.display(), "elements written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn list_themes(json: bool) -> anyhow::Result<()> {
    let themes = ThemeRegistry::builtin().list();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&themes).context("serializing themes")?
        );
    } else {
        for theme in themes {
            println!("{:<10} {:<10} {}", theme.id, theme.name, theme.description);
        }
    }
    Ok(())
}

/// `page-01.svg`, `page-02.svg`, ...
fn page_path(dir: &Path, index: usize, format: ExportFormat) -> PathBuf {
    dir.join(format!("page-{:02}.{}", index + 1, format.extension()))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}

/// Keep a name safe to use as a file stem.
fn sanitize_filename(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "brochure".to_string()
    } else {
        stem
    }
}
