use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use pagecheck::{assemble_all, loader, sitemap, stats, BuildReport, PageRegistry, Settings};

#[derive(Parser)]
#[command(name = "pagecheck", about = "Validate and assemble structured content pages")]
struct Cli {
    /// Directory of page records (*.json); overrides the configured one
    #[arg(short, long, global = true)]
    content: Option<PathBuf>,
    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every page and report all problems
    Check,
    /// Validate, then write rendered pages and sitemap.xml
    Build {
        /// Output directory
        #[arg(short, long, default_value = "dist")]
        out: PathBuf,
    },
    /// Print sitemap.xml for all valid pages
    Sitemap,
    /// Content statistics
    Stats,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(dir) = cli.content {
        settings.content_dir = dir;
    }
    info!(content_dir = %settings.content_dir.display(), site = %settings.site_url, "settings loaded");

    let code = match cli.command {
        Commands::Check => {
            let (_, report) = check(&settings)?;
            print_report(&report, cli.json)?;
            exit_code(&report)
        }
        Commands::Build { out } => {
            let (registry, report) = check(&settings)?;
            let written = write_pages(&report, &out)?;
            let xml = sitemap::render(&registry, &settings)?;
            fs::write(out.join("sitemap.xml"), xml)
                .with_context(|| format!("Failed to write sitemap to {}", out.display()))?;
            print_report(&report, cli.json)?;
            if !cli.json {
                println!("Wrote {} pages to {}", written, out.display());
            }
            exit_code(&report)
        }
        Commands::Sitemap => {
            let (raws, failures) = loader::load_dir(&settings.content_dir)?;
            let (registry, _) = PageRegistry::build(&raws);
            info!(pages = registry.len(), unreadable = failures.len(), "registry built");
            print!("{}", sitemap::render(&registry, &settings)?);
            ExitCode::SUCCESS
        }
        Commands::Stats => {
            let (raws, _) = loader::load_dir(&settings.content_dir)?;
            let (registry, _) = PageRegistry::build(&raws);
            let s = stats::collect(&registry);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&s)?);
            } else {
                s.print();
            }
            ExitCode::SUCCESS
        }
    };

    info!("Done in {}", format_duration(t0.elapsed()));
    Ok(code)
}

/// Load, build the registry, assemble every page.
fn check(settings: &Settings) -> Result<(PageRegistry, BuildReport)> {
    let (raws, load_failures) = loader::load_dir(&settings.content_dir)?;
    // duplicate ids come back as failed outcomes from assemble_all
    let (registry, _) = PageRegistry::build(&raws);
    info!(records = raws.len(), registered = registry.len(), "registry built");

    let outcomes = assemble_all(&raws, &registry, settings);
    let report = BuildReport {
        load_failures,
        outcomes,
    };
    Ok((registry, report))
}

fn print_report(report: &BuildReport, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn exit_code(report: &BuildReport) -> ExitCode {
    if report.has_fatal() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Write `<path>.html` and `<path>.json` for every rendered page.
fn write_pages(report: &BuildReport, out: &Path) -> Result<usize> {
    fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;

    let pages: Vec<_> = report
        .outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .collect();

    let pb = ProgressBar::new(pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    for page in &pages {
        let stem = output_stem(&page.id);
        let html_path = out.join(format!("{}.html", stem));
        if let Some(parent) = html_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&html_path, page.to_html())
            .with_context(|| format!("Failed to write {}", html_path.display()))?;
        let json_path = out.join(format!("{}.json", stem));
        fs::write(&json_path, serde_json::to_string_pretty(page)?)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(pages.len())
}

/// `/` → `index`, `/reviews/acme` → `reviews/acme`.
fn output_stem(id: &str) -> String {
    let trimmed = id.trim_matches('/');
    if trimmed.is_empty() {
        "index".to_string()
    } else {
        trimmed.to_string()
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
