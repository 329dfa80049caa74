//! Display pacing, compositing and the per-tick render loop.

/// Frame buffers and the scene renderer contract.
pub mod backend;
/// `vello_cpu` scene renderer.
pub mod cpu;
/// Display refresh notifications.
pub mod display;
/// The single-threaded render loop.
pub mod frame_loop;
/// Pinhole camera projection.
pub mod projection;
/// Double-buffered composite surface.
pub mod surface;
