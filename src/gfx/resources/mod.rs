//! Icon textures and the loaders that produce them.

pub mod texture;

pub use texture::{FileTextureLoader, IconTexture, TextureLoader};
