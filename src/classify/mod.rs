//! Pure per-card classifiers: freshness against the run cutoff, and pin state.

pub mod freshness;
pub mod pin;

pub use freshness::Freshness;
pub use pin::PinState;
