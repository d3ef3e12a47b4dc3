mod manifest;

pub use manifest::{load_tileset, read_manifest, ManifestError, TilesetManifest};
