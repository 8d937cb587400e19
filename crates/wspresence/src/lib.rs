//! Top-level facade crate for wsPresence.
//!
//! Re-exports the presence core and the hub library so users can depend on a single crate.

pub mod core {
    pub use wspresence_core::*;
}

pub mod hub {
    pub use wspresence_hub::*;
}
