//! Error types for index initialization

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// IO error on the operator's streams
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("failed to create {}", path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to resolve {}", path.display())]
    Resolve {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Interrupt or end of input while waiting on a prompt
    #[error("Canceled by user.")]
    Canceled,

    #[error("block counts must be positive")]
    ZeroBlocks,

    #[error("{blocks_x} × {blocks_y} blocks does not fit in a 64-bit file size")]
    IndexTooLarge { blocks_x: u32, blocks_y: u32 },
}
