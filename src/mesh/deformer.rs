use crate::mesh::geometry::OverlayGeometry;
use crate::tracking::state::LandmarkSet;

/// Writes tracked landmarks into the overlay vertex buffer, one vertex per landmark.
///
/// The mapping is direct: vertex `i` takes landmark `i`. There is no smoothing and no
/// accumulated state, so repeated calls with the same input produce identical buffers.
#[derive(Debug, Default)]
pub struct MeshDeformer {
    geometry: OverlayGeometry,
    updates: u64,
}

impl MeshDeformer {
    /// Take ownership of the geometry buffer.
    pub fn new(geometry: OverlayGeometry) -> Self {
        Self {
            geometry,
            updates: 0,
        }
    }

    /// Rewrite vertex positions from `landmarks`.
    ///
    /// Runs once per tick whether or not the face is visible; hiding is the visibility
    /// gate's job.
    pub fn update_from_tracking(&mut self, landmarks: &LandmarkSet) {
        self.geometry.rewrite_positions(landmarks.as_slice());
        self.updates += 1;
    }

    /// The deformed geometry.
    pub fn geometry(&self) -> &OverlayGeometry {
        &self.geometry
    }

    /// Mutable access for attaching the topology once assets load.
    pub fn geometry_mut(&mut self) -> &mut OverlayGeometry {
        &mut self.geometry
    }

    /// Number of deformation passes run so far.
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/deformer.rs"]
mod tests;
