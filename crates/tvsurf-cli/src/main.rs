//! tvsurf - keyboard-driven IPTV channel surfer.

/// Application configuration (TOML).
mod config;
/// Playback sinks.
mod player;
/// Terminal UI components.
mod tui;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use tvsurf_epg::{EpgApi, EpgClient};

use crate::config::{AppConfig, resolve_config_path, resolve_log_path};
use crate::player::ExternalPlayer;
use crate::tui::run_surfer;
use crate::tui::state::{Channel, NavigationController};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Launch the channel surfer.
    Watch,
    /// List configured channels.
    Channels,
    /// Print the EPG listing for one channel.
    Epg(EpgArgs),
    /// Write a starter config.toml.
    Init,
}

/// Arguments for the `epg` subcommand.
#[derive(clap::Args)]
struct EpgArgs {
    /// Channel ID (EPG key, e.g. "ch1").
    #[arg(long, required = true)]
    channel: String,
}

/// Loads and validates the config.
///
/// # Errors
///
/// Returns an error if the config cannot be read or declares no usable channels.
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    config.validate()?;
    Ok(config)
}

/// Builds an `EpgClient` from config with the default user agent.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the client fails to build.
#[instrument(skip_all)]
fn build_epg_client(config: &AppConfig) -> Result<EpgClient> {
    EpgClient::builder()
        .url(config.epg_url()?)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(config.epg_timeout())
        .build()
        .context("failed to build EPG client")
}

/// Runs the `watch` subcommand.
///
/// # Errors
///
/// Returns an error if config loading or the TUI fails.
#[instrument(skip_all)]
async fn run_watch(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_epg_client(&config)?;
    let player = ExternalPlayer::new(config.player.clone());
    let channels = config.channels.iter().map(Channel::from).collect();

    let mut controller = NavigationController::new(channels, player, config.auto_hide_delay())?;
    tracing::info!(
        channels = controller.channels().len(),
        epg = %client.url(),
        "Launching surfer..."
    );
    if config.navigation.autoplay {
        controller.commit_selection();
    }

    run_surfer(&mut controller, client)
        .await
        .context("channel surfer TUI failed")?;

    tracing::info!(
        source = controller.sink().source().unwrap_or("(none)"),
        "Surfer closed"
    );
    Ok(())
}

/// Runs the `channels` subcommand.
///
/// # Errors
///
/// Returns an error if config loading fails.
#[instrument(skip_all)]
fn run_channels(dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;

    tracing::info!("Channels ({}):", config.channels.len());
    for channel in &config.channels {
        tracing::info!("  {:<8}  {:<24}  {}", channel.id, channel.name, channel.src);
    }

    Ok(())
}

/// Runs the `epg` subcommand.
///
/// # Errors
///
/// Returns an error if config loading or the EPG fetch fails.
#[instrument(skip_all)]
async fn run_epg(args: &EpgArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config = load_config(dir)?;
    let client = build_epg_client(&config)?;

    let guide = client
        .fetch_guide()
        .await
        .with_context(|| format!("failed to load EPG for {}", args.channel))?;

    let name = config
        .channels
        .iter()
        .find(|ch| ch.id == args.channel)
        .map_or("(not configured)", |ch| ch.name.as_str());
    tracing::info!("{} {}:", args.channel, name);
    for line in guide.listing_lines(&args.channel) {
        tracing::info!("  {line}");
    }

    Ok(())
}

/// Runs the `init` subcommand.
///
/// # Errors
///
/// Returns an error if a config already exists or cannot be written.
#[instrument(skip_all)]
fn run_init(dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    if config_path.exists() {
        bail!("config already exists at {}", config_path.display());
    }

    AppConfig::sample()
        .save(&config_path)
        .context("failed to save config")?;
    tracing::info!("Wrote {}", config_path.display());
    Ok(())
}

/// Picks the log destination.
///
/// `watch` owns the terminal, so it logs to a file unless one is given.
/// Returns the writer and whether ANSI colors should be used.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
fn log_writer(cli: &Cli) -> Result<(BoxMakeWriter, bool)> {
    let log_file = match (&cli.log_file, &cli.command) {
        (Some(path), _) => Some(path.clone()),
        (None, Commands::Watch) => Some(resolve_log_path(cli.dir.as_ref())?),
        (None, _) => None,
    };

    match log_file {
        Some(path) => Ok((BoxMakeWriter::new(Mutex::new(open_log_file(&path)?)), false)),
        None => Ok((BoxMakeWriter::new(std::io::stderr), true)),
    }
}

/// Opens a log file for appending, creating parent directories if needed.
fn open_log_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (writer, ansi) = log_writer(&cli)?;

    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    match &cli.command {
        Commands::Watch => run_watch(cli.dir.as_ref()).await,
        Commands::Channels => run_channels(cli.dir.as_ref()),
        Commands::Epg(args) => run_epg(args, cli.dir.as_ref()).await,
        Commands::Init => run_init(cli.dir.as_ref()),
    }
}
