//! Face tracking state and the adapter around the external tracking provider.

/// Tracking adapter: per-tick snapshotting and visibility transitions.
pub mod adapter;
/// Scripted provider replaying a recorded landmark trace.
pub mod replay;
/// Pose/landmark data model and the latest-value publication slot.
pub mod state;
