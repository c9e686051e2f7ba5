use clap::Parser;
use std::path::PathBuf;

mod error;
mod kml;
mod merge;
mod output;
mod pipeline;
mod style;
mod table;
mod template;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "kml-landuse-merge")]
#[command(
    about = "Render land-use metadata into KML placemark descriptions",
    long_about = None
)]
struct Cli {
    /// Metadata table (CSV with a "Placemark ID" column).
    #[arg(long, default_value = "src/metadata-raw.csv")]
    csv: PathBuf,

    /// Source KML document.
    #[arg(long, default_value = "src/landuse-raw.kml")]
    kml: PathBuf,

    /// HTML description template.
    #[arg(long, default_value = "src/template.html")]
    template: PathBuf,

    #[arg(short = 'o', long, default_value = "dist/landuse-example.kml")]
    out: PathBuf,

    /// Copy of the last rendered description.
    #[arg(long, default_value = "dist/template-example.html")]
    template_out: PathBuf,

    #[arg(long)]
    no_template_out: bool,

    /// Write a JSON summary of matched and unmatched placemarks.
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    let config = pipeline::Config {
        csv: cli.csv,
        kml: cli.kml,
        template: cli.template,
        out: cli.out,
        template_out: (!cli.no_template_out).then_some(cli.template_out),
        summary: cli.summary,
    };

    let summary = pipeline::run(&config)?;
    println!(
        "Wrote {} ({} matched, {} without data)",
        config.out.display(),
        summary.matched,
        summary.unmatched
    );

    Ok(())
}
