//! hitcounter gateway library entry.
//!
//! Wires the counter core to an axum router: config loading, shared state,
//! the `/counter` image endpoint, and operational endpoints. Consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod transport;
