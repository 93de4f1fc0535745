use chrono::{DateTime, Utc};
use id_pool::IdPool;

use crate::config::EngineConfig;
use crate::error::Error;
use crate::machine::exec::ContextSnapshot;
use crate::{EntityId, Result};

/// Representation of the board state at a certain point in time.
///
/// Compiled scripts are not part of the snapshot, entities refer to their
/// scripts by name and are matched against scripts provided on restore.
#[derive(Serialize, Deserialize)]
pub struct Snapshot {
    pub metadata: SnapshotMetadata,
    pub clock: usize,
    pub config: EngineConfig,
    pub entity_pool: IdPool,
    pub entities: Vec<EntitySnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub name: String,
    pub locked: bool,
    /// Name of the script the entity runs
    pub script: Option<String>,
    /// Missing if the context was in its default state
    pub context: Option<ContextSnapshot>,
    /// Messages not yet delivered
    pub messages: Vec<String>,
}

/// Leading byte of an uncompressed snapshot.
const HEADER_RAW: u8 = 0;
/// Leading byte of an LZ4 compressed snapshot.
const HEADER_LZ4: u8 = 1;

impl Snapshot {
    /// Serializes the snapshot to bytes.
    ///
    /// The first byte records whether the rest is compressed, so reading
    /// a snapshot back doesn't depend on current settings.
    ///
    /// # Compression
    ///
    /// Optional compression using LZ4 algorithm can be performed, it's
    /// silently skipped if the `lz4` feature is disabled.
    pub fn to_bytes(&self, compress: bool) -> Result<Vec<u8>> {
        let data: Vec<u8> =
            bincode::serialize(&self).map_err(|e| Error::FailedCreatingSnapshot(e.to_string()))?;
        #[cfg(feature = "lz4")]
        {
            if compress {
                let mut out = vec![HEADER_LZ4];
                out.extend(lz4::block::compress(&data, None, true)?);
                return Ok(out);
            }
        }
        #[cfg(not(feature = "lz4"))]
        {
            if compress {
                warn!("lz4 feature disabled, saving uncompressed snapshot");
            }
        }
        let mut out = Vec::with_capacity(data.len() + 1);
        out.push(HEADER_RAW);
        out.extend(data);
        Ok(out)
    }

    /// Deserializes a snapshot from bytes, decompressing them first if
    /// the header says so.
    pub fn from_bytes(bytes: &[u8]) -> Result<Snapshot> {
        match bytes.split_first() {
            Some((&HEADER_RAW, data)) => Snapshot::decode(data),
            Some((&HEADER_LZ4, data)) => Snapshot::decompress(data),
            Some((header, _)) => Err(Error::FailedReadingSnapshot(format!(
                "unknown snapshot header: {}",
                header
            ))),
            None => Err(Error::FailedReadingSnapshot("empty snapshot".to_string())),
        }
    }

    #[cfg(feature = "lz4")]
    fn decompress(data: &[u8]) -> Result<Snapshot> {
        let data = lz4::block::decompress(data, None)
            .map_err(|e| Error::SnapshotDecompressionError(e.to_string()))?;
        Snapshot::decode(&data)
    }

    #[cfg(not(feature = "lz4"))]
    fn decompress(_: &[u8]) -> Result<Snapshot> {
        Err(Error::FailedReadingSnapshot(
            "snapshot is compressed but the lz4 feature is disabled".to_string(),
        ))
    }

    fn decode(data: &[u8]) -> Result<Snapshot> {
        bincode::deserialize(data).map_err(|e| Error::FailedReadingSnapshot(e.to_string()))
    }
}
