use anyhow::{Context, Result};
use clap::Parser;
use scatter3d::config::{Backend, ScatterConfig};
use scatter3d::runtime;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scatter3d")]
#[command(about = "Render 3D scatter plots of CSV datasets with plotly and/or a static image back end", long_about = None)]
struct Args {
    /// JSON plot configuration (datasets, columns, styles, back ends)
    config: PathBuf,

    /// Back end to render: plotly or matplotlib. Repeat for several; replaces the configured set
    #[arg(short, long = "backend")]
    backends: Vec<Backend>,

    /// Output file name without extension (e.g. 'plots/example')
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut config = ScatterConfig::from_path(&args.config)?;
    if !args.backends.is_empty() {
        config.backends = args.backends;
    }
    if let Some(output) = args.output {
        config.output.name = output;
    }

    let summary = runtime::run(&config).context("Failed to render scatter plots")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for artifact in &summary.artifacts {
        writeln!(handle, "{}", artifact.path.display()).context("Failed to write to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;

    if !summary.warnings.is_empty() {
        eprintln!("{} warning(s):", summary.warnings.len());
        for warning in &summary.warnings {
            eprintln!("  {}", warning);
        }
    }

    Ok(())
}
