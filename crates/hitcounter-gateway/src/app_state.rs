//! Shared application state for the hitcounter gateway.
//!
//! Startup errors (bad sprites, invalid options) are returned as `Result` so
//! `main` can report them instead of panicking.

use std::sync::Arc;

use hitcounter_core::error::Result;
use hitcounter_core::{CounterService, FileCounterStore, SpriteSource};

use crate::config::HitCounterConfig;
use crate::obs::metrics::GatewayMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<GatewayMetrics>,
}

struct AppStateInner {
    cfg: HitCounterConfig,
    counter: CounterService,
}

impl AppState {
    /// Build state from config: file-backed store plus the configured sprite
    /// source. Preloaded sprites are validated here, so a broken asset set
    /// fails boot rather than the first request.
    pub fn new(cfg: HitCounterConfig) -> Result<Self> {
        let paths = cfg.sprites.paths();
        let sprites = if cfg.sprites.reload_per_request {
            tracing::info!(dir = %cfg.sprites.dir, "sprites reloaded per request");
            SpriteSource::OnDemand(paths)
        } else {
            let set = paths.load()?;
            tracing::info!(
                dir = %cfg.sprites.dir,
                width = set.width(),
                height = set.height(),
                "sprites loaded"
            );
            SpriteSource::from(set)
        };

        let store = Arc::new(FileCounterStore::new(&cfg.counter.path));
        let counter = CounterService::new(store, sprites, cfg.counter.options())?;
        Ok(Self::with_counter(cfg, counter))
    }

    /// Wrap an already-built counter service (custom stores, tests).
    pub fn with_counter(cfg: HitCounterConfig, counter: CounterService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, counter }),
            metrics: Arc::new(GatewayMetrics::default()),
        }
    }

    pub fn cfg(&self) -> &HitCounterConfig {
        &self.inner.cfg
    }

    pub fn counter(&self) -> &CounterService {
        &self.inner.counter
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }
}
