//! Config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io;

use hitcounter_core::error::{HitCounterError, Result};

pub use schema::{CounterSection, GatewaySection, HitCounterConfig, OnRenderFailure, SpriteSection};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "hitcounter.yaml";

pub fn load_from_file(path: &str) -> Result<HitCounterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| HitCounterError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<HitCounterConfig> {
    let cfg: HitCounterConfig = serde_yaml::from_str(s)
        .map_err(|e| HitCounterError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load an explicitly named file, or fall back to [`DEFAULT_CONFIG_PATH`].
pub fn load(path: Option<&str>) -> Result<HitCounterConfig> {
    match path {
        Some(p) => load_from_file(p),
        None => load_or_default(DEFAULT_CONFIG_PATH),
    }
}

/// Like [`load_from_file`], but a missing file yields the built-in defaults.
pub fn load_or_default(path: &str) -> Result<HitCounterConfig> {
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path, "no config file, using defaults");
            Ok(HitCounterConfig::default())
        }
        Err(e) => Err(HitCounterError::Internal(format!(
            "read config failed ({path}): {e}"
        ))),
    }
}
