use std::net::SocketAddr;

use thiserror::Error;

use crate::assets::AssetError;
use crate::config::ConfigError;

/// Anything that stops the server before the first frame.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
