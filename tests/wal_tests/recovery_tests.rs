//! WalRecovery

use std::fs::{self, File, OpenOptions};
use std::io::Write;

use sortkv::config::WalSyncStrategy;
use sortkv::wal::{WalEntry, WalRecovery, WalWriter};

use super::{setup_temp_wal, tx_ops, write_raw_entries};

#[test]
fn test_recover_empty_file() {
    let (_temp, wal_path) = setup_temp_wal();
    File::create(&wal_path).unwrap();

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();
    assert!(entries.is_empty());
    assert_eq!(result.entries_recovered, 0);
    assert_eq!(result.last_lsn, 0);
    assert!(!result.was_truncated);
}

#[test]
fn test_recover_clean_wal() {
    let (_temp, wal_path) = setup_temp_wal();
    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        for i in 0..10 {
            writer.append(tx_ops("b", &format!("k{}", i), "v")).unwrap();
        }
    }

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();
    assert_eq!(entries.len(), 10);
    assert_eq!(result.entries_recovered, 10);
    assert_eq!(result.entries_corrupted, 0);
    assert_eq!(result.last_lsn, 10);
    assert!(!result.was_truncated);
}

#[test]
fn test_recover_truncates_torn_tail() {
    let (_temp, wal_path) = setup_temp_wal();
    let good = vec![
        WalEntry::new(1, tx_ops("b", "k1", "v")),
        WalEntry::new(2, tx_ops("b", "k2", "v")),
    ];
    write_raw_entries(&wal_path, &good);
    let valid_len = fs::metadata(&wal_path).unwrap().len();

    let torn = WalEntry::new(3, tx_ops("b", "k3", "v")).serialize().unwrap();
    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&torn[..torn.len() / 2]).unwrap();
    file.sync_all().unwrap();

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(result.was_truncated);
    assert_eq!(result.entries_corrupted, 0);
    assert_eq!(result.valid_len, valid_len);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), valid_len);
}

#[test]
fn test_recover_truncates_oversized_length() {
    let (_temp, wal_path) = setup_temp_wal();
    write_raw_entries(&wal_path, &[WalEntry::new(1, tx_ops("b", "k1", "v"))]);
    let valid_len = fs::metadata(&wal_path).unwrap().len();

    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&2u64.to_le_bytes()).unwrap();
    file.write_all(&0u32.to_le_bytes()).unwrap();
    file.write_all(&u32::MAX.to_le_bytes()).unwrap();
    file.write_all(&[7u8; 5]).unwrap();
    file.sync_all().unwrap();

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(result.was_truncated);
    assert_eq!(result.entries_corrupted, 0);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), valid_len);
}

#[test]
fn test_recover_stops_at_corrupt_entry() {
    let (_temp, wal_path) = setup_temp_wal();
    let entries = vec![
        WalEntry::new(1, tx_ops("b", "k1", "v")),
        WalEntry::new(2, tx_ops("b", "k2", "v")),
        WalEntry::new(3, tx_ops("b", "k3", "v")),
    ];
    write_raw_entries(&wal_path, &entries);

    // Corrupt the last data byte of the second frame
    let first_len = entries[0].serialize().unwrap().len();
    let second_len = entries[1].serialize().unwrap().len();
    let mut bytes = fs::read(&wal_path).unwrap();
    bytes[first_len + second_len - 1] ^= 0xFF;
    fs::write(&wal_path, &bytes).unwrap();

    let (recovered, result) = WalRecovery::recover(&wal_path).unwrap();
    assert_eq!(recovered.len(), 1);
    assert_eq!(recovered[0].lsn, 1);
    assert_eq!(result.entries_corrupted, 1);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), first_len as u64);
}

#[test]
fn test_verify_does_not_modify_file() {
    let (_temp, wal_path) = setup_temp_wal();
    write_raw_entries(&wal_path, &[WalEntry::new(1, tx_ops("b", "k1", "v"))]);

    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&[0xAB; 5]).unwrap();
    file.sync_all().unwrap();
    let len_before = fs::metadata(&wal_path).unwrap().len();

    let result = WalRecovery::verify(&wal_path).unwrap();
    assert_eq!(result.entries_recovered, 1);
    assert!(result.was_truncated);
    assert_eq!(fs::metadata(&wal_path).unwrap().len(), len_before);
}

#[test]
fn test_append_after_recovery_is_readable() {
    let (_temp, wal_path) = setup_temp_wal();
    write_raw_entries(&wal_path, &[WalEntry::new(1, tx_ops("b", "k1", "v"))]);
    let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
    file.write_all(&[0x01; 3]).unwrap();
    drop(file);

    WalRecovery::recover(&wal_path).unwrap();
    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        assert_eq!(writer.append(tx_ops("b", "k2", "v")).unwrap(), 2);
    }

    let (entries, result) = WalRecovery::recover(&wal_path).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(!result.was_truncated);
}
