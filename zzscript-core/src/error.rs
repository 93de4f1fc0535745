//! Error types.

use std::io;

use crate::machine;
use crate::EntityId;

pub type Result<T> = core::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::IoError(e.to_string())
    }
}

/// Crate-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    IoError(String),

    #[cfg(feature = "yaml")]
    #[error("yaml deserialization error: {0}")]
    YamlDeserError(#[from] serde_yaml::Error),
    #[error("toml deserialization error: {0}")]
    TomlDeserError(#[from] toml::de::Error),
    #[error("unsupported config file format: {0}")]
    UnsupportedConfigFormat(String),

    #[error("failed requesting new integer id: no more ids available in the pool?")]
    RequestIdError,
    #[error("failed returning integer id to pool: already exists?")]
    ReturnIdError,

    #[cfg(feature = "lz4")]
    #[error("failed decompressing snapshot: {0}")]
    SnapshotDecompressionError(String),
    #[error("failed reading snapshot: {0}")]
    FailedReadingSnapshot(String),
    #[error("failed creating snapshot: {0}")]
    FailedCreatingSnapshot(String),

    #[error("failed getting entity with id: {0}")]
    FailedGettingEntityById(EntityId),
    #[error("no compiled script named: {0}")]
    NoScript(String),

    #[error("script machine error: {0}")]
    MachineError(#[from] machine::Error),
}
