use anyhow::Context;

use crate::foundation::error::{FaceliftError, FaceliftResult};
use crate::mesh::geometry::MeshTopology;

/// Parse a mesh topology document and check it against the tracker's landmark count.
///
/// The document is JSON: `{"uvs": [[u, v], ..], "indices": [[a, b, c], ..]}`, one UV per
/// landmark.
pub fn parse_topology(bytes: &[u8], landmark_count: usize) -> FaceliftResult<MeshTopology> {
    let topology: MeshTopology =
        serde_json::from_slice(bytes).context("parse mesh topology json")?;
    topology.validate()?;
    if topology.vertex_count() != landmark_count {
        return Err(FaceliftError::validation(format!(
            "mesh has {} vertices but the tracker reports {landmark_count} landmarks",
            topology.vertex_count()
        )));
    }
    Ok(topology)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/mesh.rs"]
mod tests;
