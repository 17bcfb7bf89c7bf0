//! Batched record operations

use sortkv::KvError;

use super::{keys, pairs, seed, setup_temp_db};

#[test]
fn test_put_then_get_in_same_transaction() {
    let (_temp, db) = setup_temp_db();
    let mut tx = db.begin(true);

    tx.put(b"users", &["alice", "admin"]).unwrap();
    assert_eq!(tx.get(b"users", &["alice"]), pairs(&[("alice", "admin")]));
    tx.commit().unwrap();
}

#[test]
fn test_committed_put_visible_to_new_reader() {
    let (_temp, db) = setup_temp_db();
    seed(&db, b"users", &["alice", "admin", "bob", "guest"]);

    let mut tx = db.begin(false);
    assert_eq!(
        tx.get(b"users", &["bob", "alice"]),
        pairs(&[("bob", "guest"), ("alice", "admin")])
    );
    tx.rollback().unwrap();
}

#[test]
fn test_get_skips_missing_and_empty_values() {
    let (_temp, db) = setup_temp_db();
    seed(&db, b"b", &["k1", "v1", "blank", "", "k3", "v3"]);

    let mut tx = db.begin(false);
    let result = tx.get(b"b", &["k3", "nope", "blank", "k1"]);
    assert_eq!(result, pairs(&[("k3", "v3"), ("k1", "v1")]));
}

#[test]
fn test_get_on_missing_bucket_read_only() {
    let (_temp, db) = setup_temp_db();
    let mut tx = db.begin(false);

    assert!(tx.get(b"ghost", &["k"]).is_empty());
    assert!(tx.error().is_none());
}

#[test]
fn test_writable_get_creates_bucket() {
    let (_temp, db) = setup_temp_db();
    {
        let mut tx = db.begin(true);
        assert!(tx.get(b"lazy", &["k"]).is_empty());
        tx.commit().unwrap();
    }

    let reader = db.engine().begin(false).unwrap();
    assert!(reader.bucket(b"lazy").is_some());
}

#[test]
fn test_put_binary_keys() {
    let (_temp, db) = setup_temp_db();
    let key = vec![0u8, 0xFF, 0x14];
    let value = vec![0u8; 3];

    let mut tx = db.begin(true);
    tx.put(b"bin", &[key.clone(), value.clone()]).unwrap();
    assert_eq!(tx.get(b"bin", &[key.clone()]), vec![(key, value)]);
}

#[test]
fn test_put_odd_length_writes_nothing() {
    let (_temp, db) = setup_temp_db();
    let mut tx = db.begin(true);

    let result = tx.put(b"b", &["k1", "v1", "k2"]);
    assert!(matches!(result, Err(KvError::InvalidArgument(_))));
    assert!(matches!(tx.error(), Some(KvError::InvalidArgument(_))));

    tx.clear_error();
    assert!(tx.get(b"b", &["k1"]).is_empty());
}

#[test]
fn test_put_empty_list_is_invalid() {
    let (_temp, db) = setup_temp_db();
    let mut tx = db.begin(true);
    let empty: [&str; 0] = [];
    assert!(matches!(tx.put(b"b", &empty), Err(KvError::InvalidArgument(_))));
}

#[test]
fn test_put_on_read_only_fails() {
    let (_temp, db) = setup_temp_db();
    let mut tx = db.begin(false);

    assert!(matches!(tx.put(b"b", &["k", "v"]), Err(KvError::NotWritable)));
    assert!(matches!(tx.error(), Some(KvError::NotWritable)));
}

#[test]
fn test_put_partial_failure_keeps_earlier_pairs() {
    let (_temp, db) = setup_temp_db();
    let mut tx = db.begin(true);

    // The empty key fails after "k1" is already written
    assert!(tx.put(b"b", &["k1", "v1", "", "v2", "k3", "v3"]).is_err());
    tx.clear_error();
    assert_eq!(tx.get(b"b", &["k1", "k3"]), pairs(&[("k1", "v1")]));
}

#[test]
fn test_delete_visits_every_key() {
    let (_temp, db) = setup_temp_db();
    seed(&db, b"b", &["k1", "v", "k2", "v", "k3", "v", "k4", "v"]);

    let mut tx = db.begin(true);
    tx.delete(b"b", &["k1", "k2", "k3"]).unwrap();
    tx.commit().unwrap();

    let mut tx = db.begin(false);
    assert_eq!(keys(&tx.next(b"b", b"", 0)), vec![b"k4".to_vec()]);
}

#[test]
fn test_delete_missing_bucket_is_noop() {
    let (_temp, db) = setup_temp_db();
    let mut tx = db.begin(true);

    tx.delete(b"ghost", &["k"]).unwrap();
    assert!(tx.error().is_none());
}

#[test]
fn test_delete_on_read_only_fails() {
    let (_temp, db) = setup_temp_db();
    seed(&db, b"b", &["k", "v"]);

    let mut tx = db.begin(false);
    assert!(matches!(tx.delete(b"b", &["k"]), Err(KvError::NotWritable)));
}

#[test]
fn test_for_each_matches_next_order() {
    let (_temp, db) = setup_temp_db();
    seed(&db, b"b", &["m", "2", "a", "1", "z", "3"]);

    let mut tx = db.begin(false);
    let mut visited = Vec::new();
    tx.for_each(b"b", |k, v| {
        visited.push((k.to_vec(), v.to_vec()));
        Ok(())
    })
    .unwrap();

    assert_eq!(visited, pairs(&[("a", "1"), ("m", "2"), ("z", "3")]));
    assert_eq!(visited, tx.next(b"b", b"", 0));
}

#[test]
fn test_for_each_missing_bucket() {
    let (_temp, db) = setup_temp_db();
    let mut tx = db.begin(false);

    let mut calls = 0;
    tx.for_each(b"ghost", |_, _| {
        calls += 1;
        Ok(())
    })
    .unwrap();
    assert_eq!(calls, 0);
}

#[test]
fn test_for_each_visitor_error_stops_and_sticks() {
    let (_temp, db) = setup_temp_db();
    seed(&db, b"b", &["a", "1", "b", "2", "c", "3"]);

    let mut tx = db.begin(false);
    let mut seen = Vec::new();
    let result = tx.for_each(b"b", |k, _| {
        seen.push(k.to_vec());
        if k == b"b" {
            return Err(KvError::Storage("stop".to_string()));
        }
        Ok(())
    });

    assert!(matches!(result, Err(KvError::Storage(_))));
    assert_eq!(seen, vec![b"a".to_vec(), b"b".to_vec()]);
    assert!(tx.next(b"b", b"", 0).is_empty());
}

#[test]
fn test_delete_bucket() {
    let (_temp, db) = setup_temp_db();
    seed(&db, b"b", &["k", "v"]);

    let mut tx = db.begin(true);
    tx.delete_bucket(b"b").unwrap();
    tx.commit().unwrap();

    let reader = db.engine().begin(false).unwrap();
    assert!(reader.bucket(b"b").is_none());
}

#[test]
fn test_delete_missing_bucket_fails() {
    let (_temp, db) = setup_temp_db();
    let mut tx = db.begin(true);
    assert!(matches!(tx.delete_bucket(b"ghost"), Err(KvError::BucketNotFound(_))));
}
