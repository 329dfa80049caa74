//! Observer registries and deferred background tasks.

/// Multi-subscriber notification points keyed by event kind.
pub mod channel;
/// Background computations whose results are collected on the render thread.
pub mod task;
