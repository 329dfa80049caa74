use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::assets::decode::{OverlayTexture, decode_texture};
use crate::assets::mesh::parse_topology;
use crate::events::task::Deferred;
use crate::foundation::error::{FaceliftError, FaceliftResult};
use crate::mesh::geometry::MeshTopology;

/// Locations of the overlay assets on disk.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssetPaths {
    /// Mesh topology JSON.
    pub mesh: PathBuf,
    /// Overlay texture image.
    pub texture: PathBuf,
}

impl AssetPaths {
    /// Resolve relative paths against `root`.
    pub fn resolved_against(&self, root: &Path) -> Self {
        Self {
            mesh: root.join(&self.mesh),
            texture: root.join(&self.texture),
        }
    }
}

/// Loaded overlay: topology and texture, both immutable for the session.
#[derive(Clone, Debug)]
pub struct OverlayAssets {
    /// Triangle indices and per-vertex UVs.
    pub topology: Arc<MeshTopology>,
    /// Texture sampled through the UVs.
    pub texture: Arc<OverlayTexture>,
}

impl OverlayAssets {
    /// Bundle already-loaded assets.
    pub fn new(topology: MeshTopology, texture: OverlayTexture) -> Self {
        Self {
            topology: Arc::new(topology),
            texture: Arc::new(texture),
        }
    }
}

/// Pending asset load, polled by the render loop.
pub type AssetLoad = Deferred<FaceliftResult<OverlayAssets>>;

/// Read and decode the overlay assets. Every failure maps to [`FaceliftError::AssetLoad`].
#[tracing::instrument(
    skip_all,
    fields(mesh = %paths.mesh.display(), texture = %paths.texture.display())
)]
pub fn load_overlay_assets(
    paths: &AssetPaths,
    landmark_count: usize,
) -> FaceliftResult<OverlayAssets> {
    let load = || -> FaceliftResult<OverlayAssets> {
        let mesh_bytes = std::fs::read(&paths.mesh)
            .with_context(|| format!("read mesh '{}'", paths.mesh.display()))?;
        let topology = parse_topology(&mesh_bytes, landmark_count)?;

        let tex_bytes = std::fs::read(&paths.texture)
            .with_context(|| format!("read texture '{}'", paths.texture.display()))?;
        let texture = decode_texture(&tex_bytes)?;
        Ok(OverlayAssets::new(topology, texture))
    };
    let assets = load().map_err(|e| match e {
        FaceliftError::AssetLoad(_) => e,
        other => FaceliftError::asset_load(format!("{other:#}")),
    })?;
    tracing::info!(
        vertices = assets.topology.vertex_count(),
        triangles = assets.topology.indices().len(),
        texture_w = assets.texture.width,
        texture_h = assets.texture.height,
        "overlay assets loaded"
    );
    Ok(assets)
}

/// Start loading the overlay assets on a background worker.
pub fn spawn_overlay_load(paths: AssetPaths, landmark_count: usize) -> FaceliftResult<AssetLoad> {
    Deferred::spawn("assets", move || load_overlay_assets(&paths, landmark_count))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
