// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket numbering properties: per-day uniqueness, contiguity, and shard
//! isolation, including under genuinely concurrent submissions.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use time::macros::datetime;

use crate::Persistence;

use super::{create_test_draft, setup_test_persistence, test_now};

static FILE_DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Path for a throwaway file-backed database shared by several
/// connections within one test.
fn temp_db_path() -> std::path::PathBuf {
    let id = FILE_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "toolreq_seq_test_{}_{id}.db",
        std::process::id()
    ))
}

fn remove_db_files(path: &std::path::Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(std::path::PathBuf::from(file));
    }
}

#[test]
fn test_sequential_creation_yields_contiguous_numbers() {
    let mut persistence = setup_test_persistence();
    let now = test_now();

    for expected in 1..=5 {
        let created = persistence
            .create_request(&create_test_draft("uid-1", "Alice"), now)
            .expect("Failed to create request");
        assert_eq!(
            created.ticket_no,
            format!("REQ-20260116-{expected:03}"),
            "sequence must be contiguous"
        );
    }

    let count = persistence
        .get_counter("requests_20260116")
        .expect("Failed to read counter");
    assert_eq!(count, 5);
}

#[test]
fn test_concurrent_creation_yields_distinct_contiguous_numbers() {
    let path = temp_db_path();
    // Initialize the schema once before spawning writers.
    drop(Persistence::new_with_file(&path).expect("Failed to initialize database"));

    let now = test_now();
    let handles: Vec<_> = (0..3)
        .map(|i| {
            let path = path.clone();
            std::thread::spawn(move || {
                let mut persistence =
                    Persistence::new_with_file(&path).expect("Failed to open database");
                persistence
                    .create_request(&create_test_draft(&format!("uid-{i}"), "Writer"), now)
                    .expect("Failed to create request")
            })
        })
        .collect();

    let ticket_nos: BTreeSet<String> = handles
        .into_iter()
        .map(|h| h.join().expect("Writer thread panicked").ticket_no)
        .collect();

    assert_eq!(
        ticket_nos,
        BTreeSet::from([
            String::from("REQ-20260116-001"),
            String::from("REQ-20260116-002"),
            String::from("REQ-20260116-003"),
        ]),
        "three concurrent submissions must receive the contiguous set 1..3"
    );

    let mut persistence = Persistence::new_with_file(&path).expect("Failed to open database");
    let count = persistence
        .get_counter("requests_20260116")
        .expect("Failed to read counter");
    assert_eq!(count, 3);

    remove_db_files(&path);
}

#[test]
fn test_day_shards_are_isolated() {
    let mut persistence = setup_test_persistence();

    let jan_16 = datetime!(2026-01-16 22:00:00 UTC);
    let jan_17 = datetime!(2026-01-17 01:00:00 UTC);

    let first = persistence
        .create_request(&create_test_draft("uid-1", "Alice"), jan_16)
        .expect("create");
    let second = persistence
        .create_request(&create_test_draft("uid-1", "Alice"), jan_16)
        .expect("create");
    let next_day = persistence
        .create_request(&create_test_draft("uid-2", "Bob"), jan_17)
        .expect("create");

    assert_eq!(first.ticket_no, "REQ-20260116-001");
    assert_eq!(second.ticket_no, "REQ-20260116-002");
    // The next day's counter starts independently at zero.
    assert_eq!(next_day.ticket_no, "REQ-20260117-001");

    assert_eq!(persistence.get_counter("requests_20260116").expect("read"), 2);
    assert_eq!(persistence.get_counter("requests_20260117").expect("read"), 1);
}

#[test]
fn test_creation_stamps_status_and_timestamps() {
    let mut persistence = setup_test_persistence();
    let created = persistence
        .create_request(&create_test_draft("uid-1", "Alice"), test_now())
        .expect("create");

    let ticket = persistence
        .get_request(created.request_id)
        .expect("get")
        .expect("ticket must exist");

    assert_eq!(ticket.status, toolreq_domain::TicketStatus::Pending);
    assert_eq!(ticket.created_at, ticket.updated_at);
    assert_eq!(ticket.applicant.display_name, "Alice");
    assert!(ticket.admin_note.is_none());
    assert!(ticket.admin_handler.is_none());
    assert!(ticket.supervisor_note.is_none());
}
