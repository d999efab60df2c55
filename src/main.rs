use clap::{Parser, Subcommand};
use gdp_scatter::{config, export, plot, server};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the settled plot for one year to an SVG file
    Render {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        #[arg(short, long)]
        year: Option<i32>,
        #[arg(short, long, value_name = "FILE", default_value = "plot.svg")]
        out: PathBuf,
    },
    /// Render one SVG frame per year into the frame directory
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Serve the interactive plot with its year slider
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Render { config, year, out } => {
            info!("Rendering plot with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;
            let dataset = plot::load_dataset(&app_config)?;

            let year = year.unwrap_or(app_config.years.min);
            export::write_frame(&dataset, &app_config.canvas, year, out)?;
        }
        Commands::Generate { config } => {
            info!("Generating frames with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            // 1. Load and join
            let dataset = plot::load_dataset(&app_config)?;

            // 2. Render every year
            let paths = export::generate_frames(&app_config, &dataset)?;

            info!("Generation complete: {} frames", paths.len());
        }
        Commands::Serve { config } => {
            info!("Serving plot with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            // All four tables must load before the first render
            let session = plot::Session::load(&app_config)?;

            server::start_server(app_config, session).await?;
        }
    }

    Ok(())
}
