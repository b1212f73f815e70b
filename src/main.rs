use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use textcard::catalog::Catalog;
use textcard::config::RenderJob;
use textcard::render::compose;
use textcard::render::metrics::FontMetrics;

#[derive(Debug, Parser)]
#[command(
    name = "textcard",
    version,
    about = "Render styled text onto card backgrounds"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a job file to a PNG image
    Render {
        /// Path to YAML render job
        #[arg(value_name = "JOB")]
        job: PathBuf,
        /// Where to write the PNG
        #[arg(long, short, value_name = "PNG")]
        output: PathBuf,
        /// Replace the built-in catalog with a YAML file
        #[arg(long, value_name = "CATALOG")]
        catalog: Option<PathBuf>,
        /// Use this font file instead of looking up the job's family
        #[arg(long = "font-file", value_name = "FONT")]
        font_file: Option<PathBuf>,
    },
    /// List templates, sizes, markers and fonts
    Catalog {
        #[arg(long, value_name = "CATALOG")]
        catalog: Option<PathBuf>,
    },
    /// Validate a job file against the catalog without rendering
    Check {
        #[arg(value_name = "JOB")]
        job: PathBuf,
        #[arg(long, value_name = "CATALOG")]
        catalog: Option<PathBuf>,
    },
}

fn main() {
    // RUST_LOG controls level, default = info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    if let Err(err) = run(Cli::parse()) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Render {
            job,
            output,
            catalog,
            font_file,
        } => render(&job, &output, catalog.as_deref(), font_file.as_deref()),
        Command::Catalog { catalog } => {
            print_catalog(&load_catalog(catalog.as_deref())?);
            Ok(())
        }
        Command::Check { job, catalog } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let job = load_job(&job)?;
            let resolved = job.resolve(&catalog)?;
            info!(
                template = %resolved.template.id,
                size = %resolved.size.id,
                characters = resolved.characters.len(),
                "job is valid"
            );
            Ok(())
        }
    }
}

fn render(
    job_path: &Path,
    output: &Path,
    catalog: Option<&Path>,
    font_file: Option<&Path>,
) -> Result<()> {
    let catalog = load_catalog(catalog)?;
    let job = load_job(job_path)?;
    let resolved = job.resolve(&catalog)?;

    let metrics = match font_file {
        Some(path) => FontMetrics::from_file(path)?,
        None => FontMetrics::load(&job.font_family)?,
    };
    info!(family = metrics.family(), "using font");

    let (surface, layout) = compose::render(&metrics, &resolved.input())
        .with_context(|| format!("failed to render {}", job_path.display()))?;
    surface
        .save_png(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(
        output = %output.display(),
        width = surface.width(),
        height = surface.height(),
        lines = layout.lines.len(),
        "rendered text card"
    );
    Ok(())
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => Catalog::from_yaml_file(path),
        None => Ok(Catalog::builtin()),
    }
}

fn load_job(path: &Path) -> Result<RenderJob> {
    let job = RenderJob::from_yaml_file(path)
        .with_context(|| format!("failed to load render job from {}", path.display()))?
        .validated()
        .context("invalid render job values")?;
    Ok(job)
}

fn print_catalog(catalog: &Catalog) {
    println!("templates:");
    for template in &catalog.templates {
        println!(
            "  {:<12} {:<9} {}",
            template.id,
            template.background.kind_name(),
            template.name
        );
    }
    println!("sizes:");
    for size in &catalog.sizes {
        println!("  {:<12} {}x{}", size.id, size.width, size.height);
    }
    println!("markers:");
    for marker in &catalog.markers {
        println!(
            "  {:<12} {}",
            marker.id.as_str(),
            marker.color.as_deref().unwrap_or("-")
        );
    }
    println!("fonts:");
    for font in &catalog.fonts {
        println!("  {}", font.family);
    }
}
