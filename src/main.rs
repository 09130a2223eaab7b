use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vodtool::{parse_vod_link, Config, PipelineOutcome, VodPipeline};

#[derive(Parser)]
#[command(name = "vodtool")]
#[command(version, about = "Split stream VODs into upload-sized chunks and map chapters onto them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to vodtool.toml or config/vodtool.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the VODs directory
    #[arg(long, global = true)]
    vods_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a VOD and its chat capture, split it and generate the chapter map
    Download {
        /// VOD link, e.g. https://twitch.tv/videos/123456789
        link: String,
        /// Rebuild the chapter map even if one exists
        #[arg(long)]
        force: bool,
    },
    /// Parse <uid>.cat, split the VOD and generate the chapter map
    Categorize {
        uid: String,
        /// Rebuild the chapter map even if one exists
        #[arg(long)]
        force: bool,
    },
    /// Print a formatted chapter map
    PrintChapterMap { uid: String },
    /// Download every clip listed in a file, one link per line
    DownloadClips { clips_file: PathBuf },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "vodtool=debug,info" } else { "vodtool=info,warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_target(verbose)
        .with_env_filter(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    if let Some(dir) = &cli.vods_dir {
        config.paths.vods_dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

fn report(outcome: PipelineOutcome) {
    match outcome {
        PipelineOutcome::Completed { map_path, chunks, fragments } => {
            info!("📦 {} chunks, {} chapter entries", chunks, fragments);
            info!("🎉 All done! Chapter map: {}", map_path.display());
        }
        PipelineOutcome::AlreadyDone(map_path) => {
            info!("✅ Nothing to do, chapter map already at {} (use --force to rebuild)", map_path.display());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli).context("failed to load configuration")?;
    if cli.verbose {
        info!("{}", config.summary());
    }

    let pipeline = VodPipeline::new(config);

    let result = match &cli.command {
        Commands::Download { link, force } => {
            let uid = parse_vod_link(link)?.to_string();
            pipeline.download(&uid, *force).await.map(report)
        }
        Commands::Categorize { uid, force } => pipeline.categorize(uid, *force).await.map(report),
        Commands::PrintChapterMap { uid } => pipeline.print_chapter_map(uid).await.map(|listing| print!("{}", listing)),
        Commands::DownloadClips { clips_file } => pipeline.download_clips(clips_file).await.map(|_| ()),
    };

    if let Err(e) = &result {
        error!("💥 {}", e);
    }
    result?;
    Ok(())
}
