//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{KvError, Result};

/// Header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// A single entry in the WAL: every change made by one committed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// Changes in the order the transaction made them
    pub operations: Vec<Operation>,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Create an empty bucket
    CreateBucket { bucket: Vec<u8> },

    /// Drop a bucket and everything in it
    DeleteBucket { bucket: Vec<u8> },

    /// Put a key-value pair
    Put { bucket: Vec<u8>, key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Delete { bucket: Vec<u8>, key: Vec<u8> },

    /// Set a bucket's sequence counter
    SetSequence { bucket: Vec<u8>, sequence: u64 },
}

/// Payload stored after the header
#[derive(Serialize, Deserialize)]
struct Body {
    operations: Vec<Operation>,
    timestamp: u64,
}

impl WalEntry {
    /// Create an entry stamped with the current time
    pub fn new(lsn: u64, operations: Vec<Operation>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            lsn,
            operations,
            timestamp,
        }
    }

    /// Encode as `LSN | CRC | Len | Data`
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let body = Body {
            operations: self.operations.clone(),
            timestamp: self.timestamp,
        };
        let data = bincode::serialize(&body)?;
        let len = u32::try_from(data.len()).map_err(|_| {
            KvError::Serialization(format!("WAL entry too large: {} bytes", data.len()))
        })?;

        let lsn_bytes = self.lsn.to_le_bytes();
        let crc = Self::compute_crc(&lsn_bytes, &data);

        let mut bytes = Vec::with_capacity(HEADER_SIZE + data.len());
        bytes.extend_from_slice(&lsn_bytes);
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes.extend_from_slice(&len.to_le_bytes());
        bytes.extend_from_slice(&data);
        Ok(bytes)
    }

    /// Decode one entry, verifying its checksum
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(KvError::WalCorruption(format!(
                "entry header truncated: {} of {} bytes",
                bytes.len(),
                HEADER_SIZE
            )));
        }

        let (lsn, crc, len) = Self::parse_header(&bytes[..HEADER_SIZE]);
        let end = HEADER_SIZE + len as usize;
        if bytes.len() < end {
            return Err(KvError::WalCorruption(format!(
                "entry data truncated: {} of {} bytes",
                bytes.len() - HEADER_SIZE,
                len
            )));
        }

        let data = &bytes[HEADER_SIZE..end];
        let actual = Self::compute_crc(&lsn.to_le_bytes(), data);
        if actual != crc {
            return Err(KvError::WalCorruption(format!(
                "CRC mismatch at lsn {}: stored {:08x}, computed {:08x}",
                lsn, crc, actual
            )));
        }

        let body: Body = bincode::deserialize(data)
            .map_err(|e| KvError::WalCorruption(format!("undecodable entry {}: {}", lsn, e)))?;

        Ok(Self {
            lsn,
            operations: body.operations,
            timestamp: body.timestamp,
        })
    }

    /// Split a header into (lsn, crc, data_len)
    pub(crate) fn parse_header(header: &[u8]) -> (u64, u32, u32) {
        let mut lsn = [0u8; 8];
        let mut crc = [0u8; 4];
        let mut len = [0u8; 4];
        lsn.copy_from_slice(&header[0..8]);
        crc.copy_from_slice(&header[8..12]);
        len.copy_from_slice(&header[12..16]);
        (
            u64::from_le_bytes(lsn),
            u32::from_le_bytes(crc),
            u32::from_le_bytes(len),
        )
    }

    fn compute_crc(lsn_bytes: &[u8], data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(lsn_bytes);
        hasher.update(data);
        hasher.finalize()
    }
}
