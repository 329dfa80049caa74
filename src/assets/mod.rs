//! Overlay asset loading: mesh topology and texture.

/// Image decoding into premultiplied RGBA8.
pub mod decode;
/// Background loading of the overlay assets.
pub mod loader;
/// Mesh topology documents.
pub mod mesh;
