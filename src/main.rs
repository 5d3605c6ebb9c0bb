use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use webp_sizes::{config, output, process};

#[derive(Parser)]
#[command(name = "webp-sizes")]
#[command(about = "Generate responsive WebP variants for static site images")]
#[command(long_about = "\
Generate responsive WebP variants for static site images

Every JPEG, PNG and WebP under the source directory gets a set of WebP
siblings at the configured widths, plus a full-size re-encode:

  static/images/
  ├── photo.jpg          # 1800px wide source
  ├── photo.webp         # original size
  ├── photo-300.webp
  ├── photo-600.webp
  ├── photo-1200.webp
  └── thumbnails/        # excluded directory, never touched

Images are never upscaled. Outputs newer than their source are left alone,
so re-running on an unchanged tree writes nothing.

Settings are read from the [webp] table of the config file. Run
'webp-sizes gen-config' to print a documented table.")]
#[command(version)]
struct Cli {
    /// Settings file holding the [webp] table
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Override the source directory from the settings file
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate all missing or stale WebP outputs
    Run {
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate settings and show what a run would write
    Check,
    /// Print a stock [webp] table with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { json } => {
            let settings = load_settings(&cli.config, cli.source)?;
            let report = process::run(&settings)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_run_output(&report);
            }
        }
        Command::Check => {
            let settings = load_settings(&cli.config, cli.source)?;
            println!("==> Checking {}", settings.source_dir.display());
            let report = process::plan(&settings)?;
            output::print_plan_output(&report);
            println!("==> Settings are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the `[webp]` table, applying a command-line source override.
fn load_settings(
    path: &std::path::Path,
    source: Option<PathBuf>,
) -> Result<config::WebpConfig, config::ConfigError> {
    let mut settings = config::load_config(path)?;
    if let Some(source) = source {
        settings.source_dir = source;
    }
    Ok(settings)
}
