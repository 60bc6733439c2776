//! End-to-end scenarios over the public log surface: the operations the
//! surrounding service binds its Produce/Consume handlers to.

use std::io::Read;

use bytes::Bytes;
use tempfile::TempDir;

use strata_log::{Error, Log, LogConfig, Record};

const PAYLOAD: &[u8] = b"hello world";

fn small_segment_config() -> LogConfig {
    LogConfig {
        max_store_bytes: 32,
        ..Default::default()
    }
}

#[test]
fn append_and_read() {
    let dir = TempDir::new().unwrap();
    let log = Log::open(dir.path(), LogConfig::default()).unwrap();

    let offset = log.append(Record::new(PAYLOAD)).unwrap();
    assert_eq!(offset, 0);

    let record = log.read(0).unwrap();
    assert_eq!(record.value, Bytes::from(PAYLOAD));
    assert_eq!(record.offset, 0);

    log.close().unwrap();
}

#[test]
fn offset_out_of_range() {
    let dir = TempDir::new().unwrap();
    let log = Log::open(dir.path(), LogConfig::default()).unwrap();

    match log.read(1) {
        Err(Error::OffsetOutOfRange { offset }) => assert_eq!(offset, 1),
        other => panic!("expected out-of-range error, got {other:?}"),
    }

    log.close().unwrap();
}

#[test]
fn reopen_preserves_data() {
    let dir = TempDir::new().unwrap();

    {
        let log = Log::open(dir.path(), small_segment_config()).unwrap();
        for _ in 0..3 {
            log.append(Record::new(PAYLOAD)).unwrap();
        }
        log.close().unwrap();
    }

    let log = Log::open(dir.path(), small_segment_config()).unwrap();
    assert_eq!(log.lowest_offset().unwrap(), 0);
    assert_eq!(log.highest_offset().unwrap(), 2);
    for offset in 0..3 {
        let record = log.read(offset).unwrap();
        assert_eq!(record.offset, offset);
        assert_eq!(record.value, Bytes::from(PAYLOAD));
    }
    log.close().unwrap();
}

#[test]
fn whole_log_reader_replays_framing() {
    let dir = TempDir::new().unwrap();
    let log = Log::open(dir.path(), small_segment_config()).unwrap();
    log.append(Record::new(PAYLOAD)).unwrap();

    let mut bytes = Vec::new();
    log.reader().read_to_end(&mut bytes).unwrap();

    // The stream starts with the store's 8-byte big-endian length prefix;
    // the remainder is the framed record
    let len = u64::from_be_bytes(bytes[..8].try_into().unwrap());
    assert_eq!(len as usize, bytes.len() - 8);

    let record = Record::decode(&bytes[8..]).unwrap();
    assert_eq!(record.value, Bytes::from(PAYLOAD));

    log.close().unwrap();
}

#[test]
fn truncate_removes_old_records() {
    let dir = TempDir::new().unwrap();
    let log = Log::open(dir.path(), small_segment_config()).unwrap();
    for _ in 0..3 {
        log.append(Record::new(PAYLOAD)).unwrap();
    }

    log.truncate(1).unwrap();

    assert!(log.read(0).is_err());
    log.close().unwrap();
}

#[test]
fn rollover_after_index_exhaustion() {
    let dir = TempDir::new().unwrap();
    let log = Log::open(
        dir.path(),
        LogConfig {
            max_store_bytes: 1024,
            max_index_bytes: 3 * 12,
            initial_offset: 0,
        },
    )
    .unwrap();

    // Three records fill the index; the fourth append must transparently
    // land in a fresh segment whose base continues the sequence
    for want in 0..4u64 {
        assert_eq!(log.append(Record::new(PAYLOAD)).unwrap(), want);
    }
    assert_eq!(log.lowest_offset().unwrap(), 0);
    assert_eq!(log.highest_offset().unwrap(), 3);
    assert_eq!(log.read(3).unwrap().offset, 3);

    log.close().unwrap();
}

#[test]
fn persistence_across_rollover_and_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let log = Log::open(dir.path(), small_segment_config()).unwrap();
        for want in 0..8u64 {
            assert_eq!(log.append(Record::new(PAYLOAD)).unwrap(), want);
        }
        log.close().unwrap();
    }

    let log = Log::open(dir.path(), small_segment_config()).unwrap();
    assert_eq!(log.lowest_offset().unwrap(), 0);
    assert_eq!(log.highest_offset().unwrap(), 7);
    assert_eq!(log.append(Record::new(PAYLOAD)).unwrap(), 8);
    log.close().unwrap();
}

#[test]
fn concurrent_readers_during_appends() {
    use std::sync::Arc;
    use std::thread;

    let dir = TempDir::new().unwrap();
    let log = Arc::new(
        Log::open(
            dir.path(),
            LogConfig {
                max_store_bytes: 4096,
                max_index_bytes: 4096,
                initial_offset: 0,
            },
        )
        .unwrap(),
    );

    let writer = {
        let log = Arc::clone(&log);
        thread::spawn(move || {
            for _ in 0..200 {
                log.append(Record::new(PAYLOAD)).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                // Every offset at or below the published highest must read
                // back exactly, whatever the writer is doing
                for _ in 0..500 {
                    let highest = log.highest_offset().unwrap();
                    let record = log.read(highest).ok();
                    if let Some(record) = record {
                        assert_eq!(record.offset, highest);
                        assert_eq!(record.value, Bytes::from(PAYLOAD));
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    for offset in 0..200u64 {
        assert_eq!(log.read(offset).unwrap().offset, offset);
    }
    log.close().unwrap();
}
