//! Asset loading/parsers (meshes, pixel maps).
//! Mesh text is flattened into unwelded render buffers, with vertex normals
//! synthesized when the source has none. Pixel maps decode to RGBA8.

pub mod error;
pub mod mesh;
pub mod normals;
pub mod obj;
pub mod ppm;
pub mod texture;

pub use error::{AssetError, AssetResult, IndexKind};
pub use mesh::{Corner, Face, MeshBuffers};
pub use texture::{TextureData, TextureFormat};
