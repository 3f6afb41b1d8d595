use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dbdiagram::Diagram;
use dbdiagram::config::DiagramConfig;
use dbdiagram::layout::{LayeredLayout, serialize_scene};
use dbdiagram::render::{EMPTY_SCHEMA_MESSAGE, HtmlSurface, RenderSurface, SvgSurface};
use dbdiagram::schema::{TableDescriptor, parse_schema};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Svg,
    Html,
    Json,
}

impl OutputFormat {
    fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "svg" => Some(Self::Svg),
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render a database schema (JSON table descriptors) as a diagram
#[derive(Debug, Parser)]
#[command(name = "dbdiagram", version, about)]
struct Cli {
    /// Schema file: JSON array of table descriptors
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from output extension, else svg)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// JSON file with rendering options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page title for HTML output (default: input file name)
    #[arg(long)]
    title: Option<String>,

    /// Disable canvas panning
    #[arg(long)]
    no_pan: bool,

    /// Disable canvas zoom
    #[arg(long)]
    no_zoom: bool,

    /// Draw links as straight lines
    #[arg(long)]
    straight_links: bool,

    /// Cap on drawn points per link (0 = no cap)
    #[arg(long)]
    max_points: Option<usize>,

    /// Verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "dbdiagram=debug" } else { "dbdiagram=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<DiagramConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            DiagramConfig::from_json(&json)?
        }
        None => DiagramConfig::default(),
    };

    if cli.no_pan {
        config.allow_canvas_translation = false;
    }
    if cli.no_zoom {
        config.allow_canvas_zoom = false;
    }
    if cli.straight_links {
        config.smart_routing = false;
    }
    if let Some(max) = cli.max_points {
        config.max_number_points_per_link = max;
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let input = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let tables = parse_schema(&input)?;
    let config = load_config(&cli)?;

    let format = cli
        .format
        .or_else(|| cli.output.as_deref().and_then(OutputFormat::from_extension))
        .unwrap_or(OutputFormat::Svg);

    tracing::info!(tables = tables.len(), ?format, "rendering diagram");

    let output = match format {
        OutputFormat::Json => {
            let scene = Diagram::with_config(config).layout(&tables)?;
            serialize_scene(&scene).to_json()?
        }
        OutputFormat::Svg => render(Diagram::with_config(config), &tables)?,
        OutputFormat::Html => {
            let title = cli.title.clone().unwrap_or_else(|| {
                cli.input
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "Database diagram".to_string())
            });
            let engine = config.layout.clone();
            let surface =
                HtmlSurface::new(&title).with_svg(SvgSurface::new(config.metrics.clone()));
            render(Diagram::new(engine, surface, config), &tables)?
        }
    };

    match &cli.output {
        Some(path) => fs::write(path, &output)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", output),
    }
    Ok(())
}

fn render<S: RenderSurface>(
    diagram: Diagram<LayeredLayout, S>,
    tables: &[TableDescriptor],
) -> Result<String> {
    if tables.is_empty() {
        tracing::warn!("{}", EMPTY_SCHEMA_MESSAGE);
    }
    Ok(diagram.render_markup(tables)?)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

