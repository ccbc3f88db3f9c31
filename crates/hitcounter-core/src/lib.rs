//! hitcounter core: counter persistence, digit sprites, and image compositing.
//!
//! This crate owns every piece of the hit counter that carries state or binary
//! formats. It has no HTTP surface; the gateway crate wires it to a router and
//! encodes the rendered image.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible paths
//! surface as `HitCounterError`/`Result` so a bad asset or an unwritable
//! counter file fails one request instead of the process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod compositor;
pub mod error;
pub mod service;
pub mod sprite;
pub mod store;

/// Persisted visit count.
pub type Count = u64;

/// Shared result type.
pub use error::{HitCounterError, Result};

pub use compositor::{digits, render};
pub use service::{CounterOptions, CounterService, RenderFailurePolicy, RenderedCounter};
pub use sprite::{SpritePaths, SpriteSet, SpriteSource};
pub use store::{CounterStore, FileCounterStore, MemoryCounterStore};
