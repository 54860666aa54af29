use std::{
    sync::{Arc, Barrier},
    thread,
};

use bytes::Bytes;
use cellbase::{
    ColumnFamilyDescriptor, Get, Put, Scan, Store, StoreOptions, TableDescriptor,
};
use tempfile::TempDir;

fn counters() -> TableDescriptor {
    TableDescriptor::new("counters").with_family(ColumnFamilyDescriptor::new("cf"))
}

#[test]
fn test_concurrent_writes() {
    let store = Arc::new(Store::new());
    store.create_table(counters()).unwrap();

    let num_threads = 8;
    let writes_per_thread = 500;
    let barrier = Arc::new(Barrier::new(num_threads));

    let mut handles = vec![];
    for thread_id in 0..num_threads {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);

        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..writes_per_thread {
                let row = format!("thread{thread_id}_row{i:04}");
                let value = format!("value{thread_id}_{i}");
                store
                    .put_cell("counters", row.clone(), "cf", "q", value.clone(), None)
                    .unwrap();

                // Read your own write
                let result = store.get("counters", &Get::new(row)).unwrap();
                assert_eq!(result.value(b"cf", b"q"), Some(&Bytes::from(value)));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let rows = store.scan("counters", Scan::new()).unwrap().count();
    assert_eq!(rows, num_threads * writes_per_thread);
}

#[test]
fn test_concurrent_writes_to_one_row() {
    let store = Arc::new(Store::new());
    store.create_table(counters()).unwrap();

    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..200 {
                    store
                        .put(
                            "counters",
                            &Put::new("hot")
                                .add_column("cf", "a", format!("{thread_id}-{i}"))
                                .add_column("cf", "b", format!("{thread_id}-{i}")),
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Both columns of a Put share one timestamp, so the newest version of
    // each column comes from the same Put
    let result = store.get("counters", &Get::new("hot")).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.value(b"cf", b"a"), result.value(b"cf", b"b"));
}

#[test]
fn test_scanner_sees_snapshot() {
    let store = Store::new();
    store.create_table(counters()).unwrap();
    for i in 0..10 {
        store
            .put_cell("counters", format!("row{i}"), "cf", "q", "before", None)
            .unwrap();
    }

    let mut scanner = store.scan("counters", Scan::new()).unwrap();
    let first = scanner.next().unwrap().unwrap();
    assert_eq!(first.row(), &Bytes::from("row0"));

    // Writes after the scanner opened are not observed by it
    for i in 0..10 {
        store
            .put_cell("counters", format!("row{i}"), "cf", "q", "after", None)
            .unwrap();
    }
    store
        .put_cell("counters", "row5a", "cf", "q", "new", None)
        .unwrap();

    let rest: Vec<_> = scanner.map(|r| r.unwrap()).collect();
    assert_eq!(rest.len(), 9);
    assert!(rest
        .iter()
        .all(|r| r.value(b"cf", b"q") == Some(&Bytes::from("before"))));

    // A new scanner sees everything
    let rows = store.scan("counters", Scan::new()).unwrap().count();
    assert_eq!(rows, 11);
}

#[test]
fn test_scan_during_writes() {
    let store = Arc::new(Store::new());
    store.create_table(counters()).unwrap();
    for i in 0..100 {
        store
            .put_cell("counters", format!("row{i:03}"), "cf", "q", "0", None)
            .unwrap();
    }

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for round in 1..=20 {
                for i in 0..100 {
                    store
                        .put_cell(
                            "counters",
                            format!("row{i:03}"),
                            "cf",
                            "q",
                            round.to_string(),
                            None,
                        )
                        .unwrap();
                }
            }
        })
    };

    for _ in 0..20 {
        let rows: Vec<_> = store
            .scan("counters", Scan::new())
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(rows.len(), 100);

        // Within one snapshot a later row never lags an earlier one by more
        // than the single round being written
        let rounds: Vec<u32> = rows
            .iter()
            .map(|r| {
                std::str::from_utf8(r.value(b"cf", b"q").unwrap())
                    .unwrap()
                    .parse()
                    .unwrap()
            })
            .collect();
        assert!(rounds.windows(2).all(|w| w[0] >= w[1] && w[0] - w[1] <= 1));
    }

    writer.join().unwrap();
}

#[test]
fn test_compaction_with_concurrent_readers() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(Store::open(StoreOptions::at(temp_dir.path().join("store"))).unwrap());
    store
        .create_table(
            TableDescriptor::new("versions")
                .with_family(ColumnFamilyDescriptor::new("cf").with_max_versions(2)),
        )
        .unwrap();

    for ts in 1..=20u64 {
        for row in 0..20 {
            store
                .put_cell("versions", format!("row{row:02}"), "cf", "q", ts.to_string(), Some(ts))
                .unwrap();
        }
    }

    let num_readers = 4;
    let barrier = Arc::new(Barrier::new(num_readers + 1));
    let readers: Vec<_> = (0..num_readers)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..50 {
                    let rows: Vec<_> = store
                        .scan("versions", Scan::new())
                        .unwrap()
                        .map(|r| r.unwrap())
                        .collect();
                    assert_eq!(rows.len(), 20);
                    assert!(rows
                        .iter()
                        .all(|r| r.value(b"cf", b"q") == Some(&Bytes::from("20"))));
                }
            })
        })
        .collect();

    barrier.wait();
    for _ in 0..5 {
        store.compact_all().unwrap();
    }
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(store.table("versions").unwrap().num_entries(), 40);
}
