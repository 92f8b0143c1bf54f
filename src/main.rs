use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tripsync::api::AppState;
use tripsync::config::LoggingConfig;
use tripsync::{
    GoogleMapsProvider, LocalStore, OpenStreetMapProvider, PaymentSimulator, PlaceAggregator,
    PlannerSession, ProviderSelector, TripSyncConfig, web,
};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("tripsync={},tower_http=info", logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = TripSyncConfig::load_from_path(config_path)?;
    init_tracing(&config.logging);

    info!("TripSync v{} starting...", tripsync::VERSION);

    let store_path = config.cache.resolved_location();
    let store = Arc::new(
        LocalStore::open(&store_path)
            .with_context(|| format!("Failed to open local store at {}", store_path.display()))?,
    );

    let google = GoogleMapsProvider::new(&config.google, config.places.search_radius_m)?;
    let geocode_ttl = Duration::from_secs(u64::from(config.cache.geocode_ttl_hours) * 60 * 60);
    let osm = OpenStreetMapProvider::new(&config.osm)?
        .with_geocode_cache(Arc::clone(&store), geocode_ttl);

    let selector = ProviderSelector::new(
        Arc::new(google),
        Arc::new(osm),
        &config.map,
        config.google.load_timeout(),
    );
    let aggregator = PlaceAggregator::new(config.places.per_category_limit);
    let mut session = PlannerSession::new(selector, aggregator);

    match session.select_provider(config.map.default_provider).await {
        Ok(selection) => {
            if let Some(notice) = selection.notice {
                warn!("{}", notice.message);
            }
        }
        Err(e) => warn!("No map provider could be loaded at startup: {}", e),
    }

    let payments = PaymentSimulator::new(store, config.payment.success_rate);
    web::run(&config.server, AppState::new(session, payments)).await
}
