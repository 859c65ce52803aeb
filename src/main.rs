use anyhow::{Context, Result};
use chrono::{Datelike, Local, Month};
use ghi_forecaster::{
    api,
    config::{Config, HistoryConfig},
    history::{self, LoadedHistory},
    telemetry,
};
use rand::{rngs::StdRng, SeedableRng};
use telemetry::init_tracing;
use tracing::{info, warn};

fn load_history(cfg: &HistoryConfig) -> Result<LoadedHistory> {
    if let Some(path) = &cfg.path {
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening history file {}", path.display()))?;
        let month = Month::try_from(Local::now().month() as u8)?;
        return history::load_csv(file, month)
            .with_context(|| format!("parsing history file {}", path.display()));
    }

    let mut rng = match cfg.synthetic_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    warn!(days = cfg.synthetic_days, "no history file configured, using synthetic history");
    Ok(history::synthetic::history(
        cfg.synthetic_days,
        history::synthetic::day_start(Local::now().fixed_offset()),
        &mut rng,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cfg = Config::load()?;
    init_tracing(&cfg.logging);
    let loaded = load_history(&cfg.history)?;
    info!(format = ?loaded.format, rows = loaded.input.len(), "{}", loaded.message);

    let app_state = api::AppState::new(cfg.clone(), loaded);
    let app = api::router(app_state, &cfg);

    let addr = cfg.server.socket_addr()?;
    if cfg.server.host == "0.0.0.0" {
        warn!("server binding to 0.0.0.0, the API will be reachable from the network");
    }
    info!(%addr, model = %cfg.forecast.default_model, "starting GHI forecaster");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
