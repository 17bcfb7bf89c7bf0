//! WAL Reader
//!
//! Handles reading entries from the WAL file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{KvError, Result};
use super::entry::{WalEntry, HEADER_SIZE};

/// What the reader found at its current position
#[derive(Debug)]
pub(crate) enum Frame {
    /// A complete, checksummed entry
    Entry(WalEntry),

    /// Clean end of file
    End,

    /// The file ends partway through an entry
    Torn,

    /// A complete frame whose checksum or payload is bad
    Corrupt(String),
}

/// Reads entries from the WAL file
pub struct WalReader {
    reader: BufReader<File>,
    /// Byte offset just past the last complete entry
    position: u64,
    /// File length when opened
    file_len: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
            file_len,
        })
    }

    /// Read the next entry from the WAL
    ///
    /// Returns `Ok(None)` at the end of the log, including a torn final entry
    /// left by an interrupted append. A complete frame that fails its checksum
    /// is `WalCorruption`.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        match self.next_frame()? {
            Frame::Entry(entry) => Ok(Some(entry)),
            Frame::End => Ok(None),
            Frame::Torn => {
                tracing::debug!(offset = self.position, "WAL ends with a partial entry");
                Ok(None)
            }
            Frame::Corrupt(reason) => Err(KvError::WalCorruption(reason)),
        }
    }

    /// Byte offset just past the last complete entry read
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Iterate over all valid entries, stopping at the first bad one
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }

    pub(crate) fn next_frame(&mut self) -> Result<Frame> {
        let mut header = [0u8; HEADER_SIZE];
        let got = read_up_to(&mut self.reader, &mut header)?;
        if got == 0 {
            return Ok(Frame::End);
        }
        if got < HEADER_SIZE {
            return Ok(Frame::Torn);
        }

        let (_, _, len) = WalEntry::parse_header(&header);
        // The header is unverified; never size a buffer past the end of the file
        let remaining = self.file_len.saturating_sub(self.position + HEADER_SIZE as u64);
        if u64::from(len) > remaining {
            return Ok(Frame::Torn);
        }
        let mut frame = vec![0u8; HEADER_SIZE + len as usize];
        frame[..HEADER_SIZE].copy_from_slice(&header);
        let got = read_up_to(&mut self.reader, &mut frame[HEADER_SIZE..])?;
        if got < len as usize {
            return Ok(Frame::Torn);
        }

        match WalEntry::deserialize(&frame) {
            Ok(entry) => {
                self.position += frame.len() as u64;
                Ok(Frame::Entry(entry))
            }
            Err(KvError::WalCorruption(reason)) => Ok(Frame::Corrupt(reason)),
            Err(e) => Err(e),
        }
    }
}

/// Fill as much of `buf` as the file allows
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Iterator over WAL entries
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
