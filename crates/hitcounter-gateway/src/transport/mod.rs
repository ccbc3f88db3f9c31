//! HTTP transport for the counter.
//!
//! The handler drives one `CounterService::next` per request and owns the
//! boundary concerns: PNG encoding, headers, and failure bodies.

pub mod codec;
pub mod http;
