//! Overlay mesh geometry and per-tick deformation.

/// Per-tick landmark-to-vertex deformation.
pub mod deformer;
/// Vertex buffer plus immutable topology.
pub mod geometry;
