mod common;

use common::{init_logging, row, table, Faults, MemoryStore, StaticFetcher, SOURCE_URL};
use jobsync_core::{IssueKind, Listing, StopOutcome};
use jobsync_engine::{FailureKind, SyncEngine, SyncError, SyncSettings};
use pretty_assertions::assert_eq;

const ROWS: [(&str, &str); 3] = [
    ("Newest Intern", "https://jobs.example/3"),
    ("Middle Intern", "https://jobs.example/2"),
    ("Oldest Intern", "https://jobs.example/1"),
];

fn listings(rows: &[(&str, &str)]) -> Vec<Listing> {
    rows.iter()
        .map(|(role, link)| Listing::new(*role, *link))
        .collect()
}

#[tokio::test]
async fn empty_store_receives_every_row_in_source_order() {
    init_logging();
    let fetcher = StaticFetcher::page(table(&ROWS));
    let store = MemoryStore::default();

    let report = SyncEngine::new(&fetcher, &store, SyncSettings::without_delays())
        .run(SOURCE_URL)
        .await
        .unwrap();

    assert_eq!(store.rows(), listings(&ROWS));
    assert_eq!(store.append_calls(), vec![3]);
    assert_eq!(report.stop, StopOutcome::NoMarker);
    assert_eq!(report.appended, listings(&ROWS));
}

#[tokio::test]
async fn only_rows_above_the_stored_marker_are_appended() {
    init_logging();
    let fetcher = StaticFetcher::page(table(&ROWS));
    // Store order is discovery order, so the marker row is last.
    let store = MemoryStore::with_rows(&[ROWS[2], ROWS[1]]);

    let report = SyncEngine::new(&fetcher, &store, SyncSettings::without_delays())
        .run(SOURCE_URL)
        .await
        .unwrap();

    assert_eq!(report.stop, StopOutcome::Reached);
    assert_eq!(report.candidates, 1);
    assert_eq!(report.appended, listings(&ROWS[..1]));
    assert_eq!(store.rows(), listings(&[ROWS[2], ROWS[1], ROWS[0]]));
}

#[tokio::test]
async fn malformed_row_between_good_rows_is_skipped() {
    init_logging();
    let html = format!(
        "<table>{}<tr><td>Broken</td><td>Only two cells</td></tr>{}</table>",
        row("First Intern", "https://jobs.example/a"),
        row("Second Intern", "https://jobs.example/b"),
    );
    let fetcher = StaticFetcher::page(html);
    let store = MemoryStore::default();

    let report = SyncEngine::new(&fetcher, &store, SyncSettings::without_delays())
        .run(SOURCE_URL)
        .await
        .unwrap();

    assert_eq!(
        store.rows(),
        vec![
            Listing::new("First Intern", "https://jobs.example/a"),
            Listing::new("Second Intern", "https://jobs.example/b"),
        ]
    );
    assert_eq!(report.issues_of(IssueKind::ParseRow).count(), 1);
}

#[tokio::test]
async fn stray_invalid_byte_still_appends_good_rows() {
    init_logging();
    let mut body = table(&ROWS[..2]).into_bytes();
    let footer = body.len() - "</tbody></table></body></html>".len();
    body.splice(footer..footer, b"<tr><td>Caf\xff</td></tr>".iter().copied());
    let fetcher = StaticFetcher::raw(body);
    let store = MemoryStore::default();

    let report = SyncEngine::new(&fetcher, &store, SyncSettings::without_delays())
        .run(SOURCE_URL)
        .await
        .unwrap();

    assert_eq!(store.rows(), listings(&ROWS[..2]));
    assert_eq!(report.issues_of(IssueKind::Decode).count(), 1);
    assert!(report.issues_of(IssueKind::ParseRow).count() >= 1);
}

#[tokio::test]
async fn new_role_with_known_link_is_not_appended() {
    // Current (possibly too strict) behaviour: a known link alone marks the listing as seen.
    init_logging();
    let fetcher = StaticFetcher::page(table(&[
        ("Renamed Intern", "https://jobs.example/1"),
        ("Brand New Intern", "https://jobs.example/9"),
    ]));
    let store = MemoryStore::with_rows(&[("Other", "https://jobs.example/x"), ROWS[2]]);

    let report = SyncEngine::new(&fetcher, &store, SyncSettings::without_delays())
        .run(SOURCE_URL)
        .await
        .unwrap();

    assert_eq!(report.stop, StopOutcome::NotFound);
    assert_eq!(report.suppressed, 1);
    assert_eq!(
        report.appended,
        vec![Listing::new("Brand New Intern", "https://jobs.example/9")]
    );
}

#[tokio::test]
async fn second_run_without_upstream_changes_adds_nothing() {
    init_logging();
    let fetcher = StaticFetcher::page(table(&ROWS));
    let store = MemoryStore::default();
    let engine = SyncEngine::new(&fetcher, &store, SyncSettings::without_delays());

    engine.run(SOURCE_URL).await.unwrap();
    let second = engine.run(SOURCE_URL).await.unwrap();

    assert!(second.appended.is_empty());
    assert!(!second.store_mutated());
    assert_eq!(store.rows().len(), 3);
    assert_eq!(store.append_calls(), vec![3]);
}

#[tokio::test]
async fn unreadable_last_record_scans_whole_page() {
    init_logging();
    let fetcher = StaticFetcher::page(table(&ROWS));
    let store = MemoryStore::with_rows(&[ROWS[2]]);
    store.set_faults(Faults {
        last_record: true,
        ..Faults::default()
    });

    let report = SyncEngine::new(&fetcher, &store, SyncSettings::without_delays())
        .run(SOURCE_URL)
        .await
        .unwrap();

    assert_eq!(report.stop, StopOutcome::NoMarker);
    assert_eq!(report.candidates, 3);
    assert!(report.has_issue(IssueKind::StoreRead));
    // History still filters the stored row.
    assert_eq!(report.appended, listings(&ROWS[..2]));
}

#[tokio::test]
async fn unreadable_history_risks_duplicates() {
    init_logging();
    let fetcher = StaticFetcher::page(table(&[
        ROWS[0],
        ("Unrelated", "https://jobs.example/other"),
    ]));
    let store = MemoryStore::with_rows(&[("Unrelated", "https://jobs.example/u")]);
    store.set_faults(Faults {
        link_column: true,
        ..Faults::default()
    });

    let report = SyncEngine::new(&fetcher, &store, SyncSettings::without_delays())
        .run(SOURCE_URL)
        .await
        .unwrap();

    assert!(report.has_issue(IssueKind::StoreRead));
    assert_eq!(report.suppressed, 0);
    assert_eq!(report.appended.len(), 2);
}

#[tokio::test]
async fn failed_batch_falls_back_to_single_rows_and_drops_failures() {
    init_logging();
    let fetcher = StaticFetcher::page(table(&ROWS));
    let store = MemoryStore::default();
    store.set_faults(Faults {
        appends: [true, false, true, false].into_iter().collect(),
        ..Faults::default()
    });

    let report = SyncEngine::new(&fetcher, &store, SyncSettings::without_delays())
        .run(SOURCE_URL)
        .await
        .unwrap();

    assert!(report.used_row_fallback);
    assert_eq!(store.append_calls(), vec![3, 1, 1, 1]);
    assert_eq!(report.appended, listings(&[ROWS[0], ROWS[2]]));
    assert_eq!(report.dropped, listings(&ROWS[1..2]));
    assert_eq!(store.rows(), listings(&[ROWS[0], ROWS[2]]));
    assert_eq!(report.issues_of(IssueKind::StoreWrite).count(), 2);
}

#[tokio::test]
async fn unreachable_source_aborts_without_touching_the_store() {
    init_logging();
    let fetcher = StaticFetcher::unreachable();
    let store = MemoryStore::with_rows(&[ROWS[2]]);

    let err = SyncEngine::new(&fetcher, &store, SyncSettings::without_delays())
        .run(SOURCE_URL)
        .await
        .unwrap_err();

    match err {
        SyncError::Network(fetch) => assert_eq!(fetch.kind, FailureKind::Network),
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.append_calls().is_empty());
}
