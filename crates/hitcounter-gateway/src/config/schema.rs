use std::time::Duration;

use serde::Deserialize;

use hitcounter_core::error::{HitCounterError, Result};
use hitcounter_core::service::MAX_PAD_LEN;
use hitcounter_core::{CounterOptions, RenderFailurePolicy, SpritePaths};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HitCounterConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub counter: CounterSection,

    #[serde(default)]
    pub sprites: SpriteSection,
}

impl Default for HitCounterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            counter: CounterSection::default(),
            sprites: SpriteSection::default(),
        }
    }
}

impl HitCounterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(HitCounterError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.counter.validate()?;
        self.sprites.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Report failures with 5xx instead of the legacy 200 + JSON body.
    #[serde(default)]
    pub strict_errors: bool,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            strict_errors: false,
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(HitCounterError::BadRequest(
                "gateway.listen must be a valid socket address".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnRenderFailure {
    #[default]
    Rollback,
    Keep,
}

impl From<OnRenderFailure> for RenderFailurePolicy {
    fn from(v: OnRenderFailure) -> Self {
        match v {
            OnRenderFailure::Rollback => RenderFailurePolicy::Rollback,
            OnRenderFailure::Keep => RenderFailurePolicy::Keep,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CounterSection {
    #[serde(default = "default_counter_path")]
    pub path: String,

    #[serde(default = "default_pad_len")]
    pub pad_len: usize,

    /// 0 disables the bound.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    #[serde(default)]
    pub on_render_failure: OnRenderFailure,
}

impl Default for CounterSection {
    fn default() -> Self {
        Self {
            path: default_counter_path(),
            pad_len: default_pad_len(),
            lock_timeout_ms: default_lock_timeout_ms(),
            on_render_failure: OnRenderFailure::default(),
        }
    }
}

impl CounterSection {
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(HitCounterError::BadRequest(
                "counter.path must not be empty".into(),
            ));
        }
        if !(1..=MAX_PAD_LEN).contains(&self.pad_len) {
            return Err(HitCounterError::BadRequest(format!(
                "counter.pad_len must be between 1 and {MAX_PAD_LEN}"
            )));
        }
        if self.lock_timeout_ms > 600_000 {
            return Err(HitCounterError::BadRequest(
                "counter.lock_timeout_ms must not exceed 600000".into(),
            ));
        }
        Ok(())
    }

    pub fn options(&self) -> CounterOptions {
        CounterOptions {
            pad_len: self.pad_len,
            lock_timeout: (self.lock_timeout_ms > 0)
                .then(|| Duration::from_millis(self.lock_timeout_ms)),
            on_render_failure: self.on_render_failure.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpriteSection {
    #[serde(default = "default_sprite_dir")]
    pub dir: String,

    #[serde(default = "default_sprite_extension")]
    pub extension: String,

    /// Re-read sprite files on every request instead of once at startup.
    #[serde(default)]
    pub reload_per_request: bool,
}

impl Default for SpriteSection {
    fn default() -> Self {
        Self {
            dir: default_sprite_dir(),
            extension: default_sprite_extension(),
            reload_per_request: false,
        }
    }
}

impl SpriteSection {
    pub fn validate(&self) -> Result<()> {
        if self.extension.is_empty() || self.extension.contains(['/', '\\', '.']) {
            return Err(HitCounterError::BadRequest(
                "sprites.extension must be a bare file extension".into(),
            ));
        }
        Ok(())
    }

    pub fn paths(&self) -> SpritePaths {
        SpritePaths::in_dir(&self.dir, &self.extension)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_counter_path() -> String {
    "counter.dat".into()
}
fn default_pad_len() -> usize {
    10
}
fn default_lock_timeout_ms() -> u64 {
    5000
}
fn default_sprite_dir() -> String {
    "img/1".into()
}
fn default_sprite_extension() -> String {
    "png".into()
}
