//! WalReader

use std::fs::{File, OpenOptions};
use std::io::Write;

use sortkv::config::WalSyncStrategy;
use sortkv::wal::{Operation, WalEntry, WalReader, WalWriter, HEADER_SIZE};

use super::{put, setup_temp_wal, tx_ops, write_raw_entries};

#[test]
fn test_read_empty_file() {
    let (_temp, wal_path) = setup_temp_wal();
    File::create(&wal_path).unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_entry().unwrap().is_none());
    assert_eq!(reader.position(), 0);
}

#[test]
fn test_write_then_read() {
    let (_temp, wal_path) = setup_temp_wal();
    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(tx_ops("users", "alice", "1")).unwrap();
        writer.append(vec![put("users", "bob", "2")]).unwrap();
    }

    let mut reader = WalReader::open(&wal_path).unwrap();

    let first = reader.next_entry().unwrap().unwrap();
    assert_eq!(first.lsn, 1);
    assert!(matches!(first.operations[0], Operation::CreateBucket { .. }));

    let second = reader.next_entry().unwrap().unwrap();
    assert_eq!(second.lsn, 2);
    assert_eq!(second.operations, vec![put("users", "bob", "2")]);

    assert!(reader.next_entry().unwrap().is_none());
}

#[test]
fn test_iterator_many_entries() {
    let (_temp, wal_path) = setup_temp_wal();
    let count = 500;
    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryNEntries { count: 100 }).unwrap();
        for i in 0..count {
            writer.append(vec![put("b", &format!("key{}", i), "v")]).unwrap();
        }
        writer.sync().unwrap();
    }

    let reader = WalReader::open(&wal_path).unwrap();
    let entries: Vec<_> = reader.entries().collect::<Result<Vec<_>, _>>().unwrap();

    assert_eq!(entries.len(), count);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.lsn, (i + 1) as u64);
    }
}

#[test]
fn test_position_tracks_valid_bytes() {
    let (_temp, wal_path) = setup_temp_wal();
    let entry = WalEntry::new(1, tx_ops("b", "k", "v"));
    let len = entry.serialize().unwrap().len() as u64;
    write_raw_entries(&wal_path, &[entry]);

    let mut reader = WalReader::open(&wal_path).unwrap();
    reader.next_entry().unwrap();
    assert_eq!(reader.position(), len);
}

// =============================================================================
// Partial Write Tests
// =============================================================================

#[test]
fn test_partial_header_ends_log() {
    let (_temp, wal_path) = setup_temp_wal();
    write_raw_entries(&wal_path, &[WalEntry::new(1, tx_ops("b", "k", "v"))]);

    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&[0u8; 8]).unwrap();
    file.sync_all().unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_entry().unwrap().is_some());
    assert!(reader.next_entry().unwrap().is_none());
}

#[test]
fn test_partial_data_ends_log() {
    let (_temp, wal_path) = setup_temp_wal();
    write_raw_entries(&wal_path, &[WalEntry::new(1, tx_ops("b", "k", "v"))]);

    let torn = WalEntry::new(2, tx_ops("b", "k2", "v2")).serialize().unwrap();
    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&torn[..HEADER_SIZE + 2]).unwrap();
    file.sync_all().unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_entry().unwrap().is_some());
    assert!(reader.next_entry().unwrap().is_none());
}

#[test]
fn test_oversized_length_ends_log() {
    let (_temp, wal_path) = setup_temp_wal();
    write_raw_entries(&wal_path, &[WalEntry::new(1, tx_ops("b", "k", "v"))]);

    // A header claiming far more data than the file holds
    let mut header = Vec::with_capacity(HEADER_SIZE);
    header.extend_from_slice(&2u64.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&u32::MAX.to_le_bytes());
    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&header).unwrap();
    file.write_all(b"short").unwrap();
    file.sync_all().unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_entry().unwrap().is_some());
    assert!(reader.next_entry().unwrap().is_none());
}
