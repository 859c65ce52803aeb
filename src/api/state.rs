use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::{
    config::Config,
    forecast::{ForecastContext, ForecastEngine, SeasonalPattern},
    history::{HistoryFormat, LoadedHistory},
};

/// History currently backing forecasts
#[derive(Debug, Clone, Serialize)]
pub struct HistorySnapshot {
    #[serde(flatten)]
    pub format: HistoryFormat,
    pub message: String,
    pub rows: usize,
    pub loaded_at: DateTime<Utc>,
    #[serde(skip)]
    pub context: ForecastContext,
}

impl HistorySnapshot {
    pub fn from_loaded(loaded: LoadedHistory) -> Self {
        Self {
            context: ForecastContext::from_history(&loaded.input),
            rows: loaded.input.len(),
            format: loaded.format,
            message: loaded.message,
            loaded_at: Utc::now(),
        }
    }

    pub fn pattern(&self) -> &SeasonalPattern {
        self.context.pattern()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub engine: ForecastEngine,
    history: Arc<RwLock<HistorySnapshot>>,
}

impl AppState {
    pub fn new(cfg: Config, history: LoadedHistory) -> Self {
        let engine = ForecastEngine::from_config(&cfg.forecast);
        Self {
            cfg: Arc::new(cfg),
            engine,
            history: Arc::new(RwLock::new(HistorySnapshot::from_loaded(history))),
        }
    }

    /// Copy of the current forecast context; the lock is released on return
    pub fn context(&self) -> ForecastContext {
        self.history.read().context.clone()
    }

    pub fn history(&self) -> HistorySnapshot {
        self.history.read().clone()
    }

    pub fn replace_history(&self, loaded: LoadedHistory) -> HistorySnapshot {
        let snapshot = HistorySnapshot::from_loaded(loaded);
        info!(rows = snapshot.rows, format = ?snapshot.format, "history replaced");
        *self.history.write() = snapshot.clone();
        snapshot
    }
}
