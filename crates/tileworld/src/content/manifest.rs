use std::fs;
use std::path::{Path, PathBuf};

use image::ImageReader;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::render::{Framebuffer, Tileset, TilesetError};

/// On-disk description of a tileset: the atlas image (relative to the
/// manifest's directory) and the pixel size of one tile cell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TilesetManifest {
    pub atlas: String,
    pub tile_width: u32,
    pub tile_height: u32,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read tileset manifest at {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tileset manifest at {path}: {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to open atlas image at {path}: {source}")]
    OpenAtlas {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode atlas image at {path}: {source}")]
    DecodeAtlas {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid tile dimensions in manifest at {path}: {source}")]
    InvalidTileSize {
        path: PathBuf,
        #[source]
        source: TilesetError,
    },
}

pub fn read_manifest(path: &Path) -> Result<TilesetManifest, ManifestError> {
    let raw = fs::read_to_string(path).map_err(|source| ManifestError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ManifestError::ParseJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the manifest at `manifest_path`, decodes its atlas image and builds
/// the described [`Tileset`].
pub fn load_tileset(manifest_path: &Path) -> Result<Tileset, ManifestError> {
    let manifest = read_manifest(manifest_path)?;
    let atlas_path = match manifest_path.parent() {
        Some(dir) => dir.join(&manifest.atlas),
        None => PathBuf::from(&manifest.atlas),
    };

    let reader = ImageReader::open(&atlas_path).map_err(|source| ManifestError::OpenAtlas {
        path: atlas_path.clone(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| ManifestError::DecodeAtlas {
        path: atlas_path.clone(),
        source,
    })?;
    let atlas = Framebuffer::from_image(decoded.to_rgba8());

    let tileset = Tileset::new(atlas, manifest.tile_width, manifest.tile_height).map_err(
        |source| ManifestError::InvalidTileSize {
            path: manifest_path.to_path_buf(),
            source,
        },
    )?;
    debug!(
        atlas = %atlas_path.display(),
        columns = tileset.columns(),
        rows = tileset.rows(),
        "tileset_loaded"
    );
    Ok(tileset)
}
