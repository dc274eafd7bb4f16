mod terminal;

use clap::{Parser, Subcommand};
use prixloc_core::{AppConfig, Position};
use prixloc_locator::{
    FixedSensor, LocatorSettings, ManualInput, NearbyClient, NearbyLocator, NoSensor,
    PositionSensor, SearchOutcome, Selectors,
};
use tracing_subscriber::EnvFilter;

use crate::terminal::{TerminalMap, TerminalView};

#[derive(Debug, Parser)]
#[command(name = "prixloc")]
#[command(about = "Find stores near a position")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search stores around the device position or the entered coordinates
    Nearby {
        /// Device position fix as `LAT,LNG`; without it the device has no sensor
        #[arg(long)]
        fix: Option<String>,
        /// Manually entered latitude, used when no device fix is available
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,
        /// Manually entered longitude
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<String>,
        /// Search radius in kilometers
        #[arg(long)]
        radius_km: Option<String>,
        /// Travel mode: driving, walking, bicycling or transit
        #[arg(long)]
        mode: Option<String>,
        /// List map markers on stderr
        #[arg(long)]
        show_markers: bool,
    },
    /// Store a last-searched location on the user profile
    Persist {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long)]
        radius_km: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = prixloc_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Nearby {
            fix,
            lat,
            lng,
            radius_km,
            mode,
            show_markers,
        } => {
            let manual = ManualInput {
                latitude: lat,
                longitude: lng,
            };
            let selectors = Selectors {
                radius_km,
                travel_mode: mode,
            };
            let outcome = match fix.as_deref().map(parse_fix).transpose()? {
                Some(position) => {
                    run_nearby(&config, FixedSensor(position), manual, selectors, show_markers)
                        .await?
                }
                None => run_nearby(&config, NoSensor, manual, selectors, show_markers).await?,
            };
            if matches!(outcome, SearchOutcome::Failed | SearchOutcome::NoPosition) {
                std::process::exit(1);
            }
        }
        Commands::Persist { lat, lng, radius_km } => {
            let position = Position::new(lat, lng)
                .ok_or_else(|| anyhow::anyhow!("coordinates must be finite numbers"))?;
            let client = NearbyClient::new(&config)?;
            client
                .persist_last_location(position, radius_km.unwrap_or(config.default_radius_km))
                .await?;
            println!("Last location saved: {position}");
        }
    }

    Ok(())
}

/// Runs one acquisition and search against the configured backend.
async fn run_nearby<S: PositionSensor + 'static>(
    config: &AppConfig,
    sensor: S,
    manual: ManualInput,
    selectors: Selectors,
    show_markers: bool,
) -> anyhow::Result<SearchOutcome> {
    let client = NearbyClient::new(config)?;
    let view = TerminalView::new(std::io::stdout(), manual, selectors);
    let locator = NearbyLocator::new(
        client,
        sensor,
        view,
        TerminalMap::new(show_markers),
        LocatorSettings::from_config(config),
    );

    let outcome = locator.locate_and_search().await;
    locator.finish_persist().await;
    locator.teardown().await;
    tracing::debug!(?outcome, "nearby search finished");
    Ok(outcome)
}

/// Parses a `LAT,LNG` pair.
fn parse_fix(raw: &str) -> anyhow::Result<Position> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("expected LAT,LNG but got {raw:?}"))?;
    Position::parse(lat, lng).ok_or_else(|| anyhow::anyhow!("invalid coordinates {raw:?}"))
}
