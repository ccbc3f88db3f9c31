//! Top-level facade crate for hitcounter.
//!
//! Re-exports the counter core and the HTTP gateway library so users can depend on a single crate.

pub mod core {
    pub use hitcounter_core::*;
}

pub mod gateway {
    pub use hitcounter_gateway::*;
}
