//! Shared primitives: value types, the error taxonomy and small pixel math helpers.

/// Core value types (ticks, fps, canvas, vectors).
pub mod core;
/// Crate-wide error type.
pub mod error;
pub(crate) mod math;
