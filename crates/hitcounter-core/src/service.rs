//! Counter orchestration: lock, read, increment, persist, render.
//!
//! Store read failures never fail a request. A missing, corrupt, or
//! unreadable store is treated as a prior count of [`DEFAULT_PRIOR_COUNT`],
//! so the first image ever served shows `2` and corruption restarts the
//! sequence. Write failures and sprite failures are fatal for the call.

use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use tokio::sync::Mutex;

use crate::compositor;
use crate::error::{HitCounterError, Result, StoreError};
use crate::sprite::{SpriteSet, SpriteSource};
use crate::store::CounterStore;
use crate::Count;

/// Effective prior count when the store cannot be read.
pub const DEFAULT_PRIOR_COUNT: Count = 1;

/// Largest accepted pad length.
pub const MAX_PAD_LEN: usize = 64;

/// What to do with the persisted count when rendering fails after it was
/// already advanced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderFailurePolicy {
    /// Re-persist the prior count so no value is burned.
    #[default]
    Rollback,
    /// Leave the advanced count in place.
    Keep,
}

#[derive(Debug, Clone)]
pub struct CounterOptions {
    /// Number of digit positions rendered.
    pub pad_len: usize,
    /// Upper bound on waiting for the counter lock. `None` waits forever.
    pub lock_timeout: Option<Duration>,
    pub on_render_failure: RenderFailurePolicy,
}

impl Default for CounterOptions {
    fn default() -> Self {
        Self {
            pad_len: 10,
            lock_timeout: Some(Duration::from_secs(5)),
            on_render_failure: RenderFailurePolicy::default(),
        }
    }
}

impl CounterOptions {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PAD_LEN).contains(&self.pad_len) {
            return Err(HitCounterError::BadRequest(format!(
                "pad_len must be between 1 and {MAX_PAD_LEN}"
            )));
        }
        if self.lock_timeout == Some(Duration::ZERO) {
            return Err(HitCounterError::BadRequest(
                "lock_timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Result of one successful [`CounterService::next`] call.
#[derive(Debug, Clone)]
pub struct RenderedCounter {
    pub count: Count,
    pub image: RgbaImage,
}

/// Serializes read-increment-persist over one store and renders the result.
///
/// The store lives inside the service's mutex, so each service instance is
/// its own exclusive section; there is no process-global lock.
pub struct CounterService {
    store: Mutex<Arc<dyn CounterStore>>,
    sprites: SpriteSource,
    options: CounterOptions,
}

impl CounterService {
    pub fn new(
        store: Arc<dyn CounterStore>,
        sprites: SpriteSource,
        options: CounterOptions,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            store: Mutex::new(store),
            sprites,
            options,
        })
    }

    /// Advance the counter by one and render the new value.
    pub async fn next(&self) -> Result<RenderedCounter> {
        let store = self.lock().await?;

        let prior = read_or_default(&**store);
        let count = match prior.checked_add(1) {
            Some(c) => c,
            None => {
                tracing::warn!(prior, "counter saturated");
                prior
            }
        };

        store.write(count).map_err(|e| {
            tracing::error!(error = %e, count, "counter persist failed");
            HitCounterError::from(e)
        })?;
        tracing::debug!(count, "counter advanced");

        let sprites = match self.load_sprites().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, count, "sprite load failed after persist");
                if self.options.on_render_failure == RenderFailurePolicy::Rollback {
                    match store.write(prior) {
                        Ok(()) => tracing::info!(count = prior, "counter rolled back"),
                        Err(re) => tracing::error!(error = %re, prior, "counter rollback failed"),
                    }
                }
                return Err(e);
            }
        };

        let image = compositor::render(count, &sprites, self.options.pad_len);
        drop(store);

        Ok(RenderedCounter { count, image })
    }

    /// Persisted count without advancing it. `None` when the store is
    /// missing or unreadable; the default prior is not substituted here.
    pub async fn peek(&self) -> Result<Option<Count>> {
        let store = self.lock().await?;
        Ok(store.read().ok())
    }

    /// On-demand sprites are decoded on the blocking pool.
    async fn load_sprites(&self) -> Result<Arc<SpriteSet>> {
        match &self.sprites {
            SpriteSource::Preloaded(set) => Ok(Arc::clone(set)),
            SpriteSource::OnDemand(_) => {
                let source = self.sprites.clone();
                tokio::task::spawn_blocking(move || source.sprites())
                    .await
                    .map_err(|e| HitCounterError::Internal(format!("sprite load task failed: {e}")))?
                    .map_err(HitCounterError::from)
            }
        }
    }

    async fn lock(&self) -> Result<tokio::sync::MutexGuard<'_, Arc<dyn CounterStore>>> {
        match self.options.lock_timeout {
            Some(limit) => tokio::time::timeout(limit, self.store.lock())
                .await
                .map_err(|_| {
                    tracing::warn!(?limit, "counter lock wait timed out");
                    HitCounterError::Timeout(limit)
                }),
            None => Ok(self.store.lock().await),
        }
    }
}

fn read_or_default(store: &dyn CounterStore) -> Count {
    match store.read() {
        Ok(c) => c,
        Err(StoreError::NotFound { .. }) => {
            tracing::debug!("counter store missing, starting from default");
            DEFAULT_PRIOR_COUNT
        }
        Err(e) => {
            tracing::warn!(error = %e, "counter store unreadable, resetting to default");
            DEFAULT_PRIOR_COUNT
        }
    }
}
