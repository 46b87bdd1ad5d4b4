use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::render::Color;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read sprite {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sprite {path:?} is not a PNG image")]
    NotPng { path: PathBuf },
}

/// Opaque handle the render sink draws. Viewers resolve it by `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpriteHandle {
    Texture {
        id: String,
        path: PathBuf,
        bytes: usize,
    },
    Solid {
        id: String,
        color: Color,
        size: [u32; 2],
    },
}

impl SpriteHandle {
    pub fn solid(id: impl Into<String>, color: Color, size: [u32; 2]) -> Self {
        SpriteHandle::Solid {
            id: id.into(),
            color,
            size,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            SpriteHandle::Texture { id, .. } | SpriteHandle::Solid { id, .. } => id.as_str(),
        }
    }
}

pub trait AssetProvider {
    fn load_sprite(&self) -> Result<SpriteHandle, AssetError>;
}

/// PNG on disk. Only the signature is checked; decoding is the viewer's job.
#[derive(Debug, Clone)]
pub struct FileSprite {
    pub path: PathBuf,
}

impl AssetProvider for FileSprite {
    fn load_sprite(&self) -> Result<SpriteHandle, AssetError> {
        let data = std::fs::read(&self.path).map_err(|source| AssetError::Read {
            path: self.path.clone(),
            source,
        })?;
        if !data.starts_with(&PNG_SIGNATURE) {
            return Err(AssetError::NotPng {
                path: self.path.clone(),
            });
        }

        let id = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("sprite")
            .to_string();

        Ok(SpriteHandle::Texture {
            id,
            path: self.path.clone(),
            bytes: data.len(),
        })
    }
}

/// Procedural placeholder: a flat-colored rectangle.
#[derive(Debug, Clone)]
pub struct SolidSprite {
    pub color: Color,
    pub size: [u32; 2],
}

impl Default for SolidSprite {
    fn default() -> Self {
        Self {
            color: Color::rgb(220, 40, 40),
            size: [28, 14],
        }
    }
}

impl AssetProvider for SolidSprite {
    fn load_sprite(&self) -> Result<SpriteHandle, AssetError> {
        Ok(SpriteHandle::solid("placeholder", self.color, self.size))
    }
}

/// File sprite when a path is configured, placeholder otherwise.
pub fn provider_for(path: Option<&Path>) -> Box<dyn AssetProvider> {
    match path {
        Some(p) => Box::new(FileSprite {
            path: p.to_path_buf(),
        }),
        None => Box::new(SolidSprite::default()),
    }
}
