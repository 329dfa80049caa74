use std::sync::Arc;

use crate::foundation::core::Vec3;
use crate::foundation::error::{FaceliftError, FaceliftResult};

/// Immutable mesh topology: per-vertex UVs and triangle indices.
///
/// UVs follow the GL convention (origin bottom-left, `v` up).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MeshTopology {
    uvs: Vec<[f32; 2]>,
    indices: Vec<[u32; 3]>,
}

impl MeshTopology {
    /// Build a validated topology.
    pub fn new(uvs: Vec<[f32; 2]>, indices: Vec<[u32; 3]>) -> FaceliftResult<Self> {
        let t = Self { uvs, indices };
        t.validate()?;
        Ok(t)
    }

    /// Check that every index addresses a UV and every UV is finite.
    pub fn validate(&self) -> FaceliftResult<()> {
        if let Some(uv) = self
            .uvs
            .iter()
            .find(|uv| !uv[0].is_finite() || !uv[1].is_finite())
        {
            return Err(FaceliftError::validation(format!(
                "mesh uv {uv:?} must be finite"
            )));
        }
        let n = self.uvs.len();
        for (ti, tri) in self.indices.iter().enumerate() {
            if tri.iter().any(|&i| i as usize >= n) {
                return Err(FaceliftError::validation(format!(
                    "mesh triangle {ti} {tri:?} references a vertex outside 0..{n}"
                )));
            }
        }
        Ok(())
    }

    /// Number of vertices the topology describes.
    pub fn vertex_count(&self) -> usize {
        self.uvs.len()
    }

    /// Per-vertex texture coordinates.
    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// Triangle vertex indices.
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }
}

/// Overlay vertex buffer plus its topology.
///
/// Positions are rewritten every tick; the topology is attached once and then frozen.
#[derive(Clone, Debug, Default)]
pub struct OverlayGeometry {
    topology: Option<Arc<MeshTopology>>,
    positions: Vec<Vec3>,
    revision: u64,
}

impl OverlayGeometry {
    /// Geometry with no topology and no vertices yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Geometry with `topology` attached, positions reserved for its vertex count.
    pub fn with_topology(topology: Arc<MeshTopology>) -> Self {
        let mut g = Self::new();
        g.positions.reserve_exact(topology.vertex_count());
        g.topology = Some(topology);
        g
    }

    /// Attach the topology. Fails if one is already attached.
    pub fn set_topology(&mut self, topology: Arc<MeshTopology>) -> FaceliftResult<()> {
        if self.topology.is_some() {
            return Err(FaceliftError::validation(
                "overlay topology is set once per session",
            ));
        }
        let want = topology.vertex_count();
        if want > self.positions.len() {
            self.positions.reserve_exact(want - self.positions.len());
        }
        self.topology = Some(topology);
        Ok(())
    }

    /// The attached topology, if assets have loaded.
    pub fn topology(&self) -> Option<&Arc<MeshTopology>> {
        self.topology.as_ref()
    }

    /// Current vertex positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Number of vertices currently written.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of position rewrites so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace every position with `src`, reusing the existing allocation.
    pub(crate) fn rewrite_positions(&mut self, src: &[Vec3]) {
        self.positions.clear();
        self.positions.extend_from_slice(src);
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/geometry.rs"]
mod tests;
