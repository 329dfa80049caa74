//! On-demand recording of the composite surface.

/// Recorder state machine and encoder hand-off.
pub mod recorder;
