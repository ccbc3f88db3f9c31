//! Error types shared by the core and the gateway.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid configuration or options.
    BadRequest,
    /// The counter lock could not be acquired in time.
    Timeout,
    /// Storage or rendering failure.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Timeout => "TIMEOUT",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Failure to build a [`SpriteSet`](crate::SpriteSet). Any single digit
/// failing aborts the whole load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("expected 10 digit sprites, got {found}")]
    WrongCount { found: usize },

    #[error("sprite for digit {digit} unreadable ({}): {source}", .path.display())]
    Read {
        digit: u8,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("sprite for digit {digit} not decodable ({}): {source}", .path.display())]
    Decode {
        digit: u8,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(
        "dimension mismatch: sprite for digit {digit} ({}) is {}x{}, expected {}x{}",
        .path.display(), .found.0, .found.1, .expected.0, .expected.1
    )]
    DimensionMismatch {
        digit: u8,
        path: PathBuf,
        expected: (u32, u32),
        found: (u32, u32),
    },
}

/// Counter store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("counter store not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("counter store corrupt: {contents:?}")]
    Corrupt { contents: String },

    #[error("counter store read failed: {0}")]
    Read(#[source] io::Error),

    #[error("counter store write failed: {0}")]
    Write(#[source] io::Error),
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, HitCounterError>;

/// The only error crossing the core boundary. Wraps the cause for operator
/// logs; callers expose a generic message to end users.
#[derive(Debug, Error)]
pub enum HitCounterError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sprite(#[from] LoadError),

    #[error("counter lock not acquired within {0:?}")]
    Timeout(Duration),

    #[error("internal: {0}")]
    Internal(String),
}

impl HitCounterError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            HitCounterError::BadRequest(_) => ClientCode::BadRequest,
            HitCounterError::Timeout(_) => ClientCode::Timeout,
            HitCounterError::Store(_)
            | HitCounterError::Sprite(_)
            | HitCounterError::Internal(_) => ClientCode::Internal,
        }
    }
}
