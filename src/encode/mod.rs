//! Recording sinks.
//!
//! Sinks consume composited frames in tick order on the recorder's encoder thread.

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
