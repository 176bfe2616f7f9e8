use jobsync_core::{IssueKind, Listing, RunReport, StopMarker, StopOutcome};

fn init_logging() {
    jobsync_logging::initialize_for_tests();
}

#[test]
fn narrative_lists_added_and_dropped_rows() {
    init_logging();
    let mut report = RunReport::new("https://source.example");
    report.stop_marker = Some(Listing::new("Old", "https://jobs.example/old"));
    report.stop = StopOutcome::Reached;
    report.rows_seen = 4;
    report.candidates = 2;
    report.appended = vec![Listing::new("New", "https://jobs.example/new")];
    report.dropped = vec![Listing::new("Lost", "https://jobs.example/lost")];
    report.used_row_fallback = true;
    report.push_issue(IssueKind::StoreWrite, "quota exceeded");

    let text = report.to_string();
    assert!(text.contains("Most recent stored listing: Old <https://jobs.example/old>"));
    assert!(text.contains("stopped at the most recent stored listing"));
    assert!(text.contains("Added 1 new listings:"));
    assert!(text.contains("  + New <https://jobs.example/new>"));
    assert!(text.contains("  ! dropped Lost <https://jobs.example/lost>"));
    assert!(text.contains("store write failed: quota exceeded"));
}

#[test]
fn empty_run_says_nothing_was_added() {
    let report = RunReport::new("https://source.example");
    assert!(!report.store_mutated());
    assert!(report
        .narrative()
        .iter()
        .any(|line| line == "No new listings to add"));
    assert!(report
        .narrative()
        .iter()
        .any(|line| line == "Store has no previous listings"));
}

#[test]
fn issues_are_filtered_by_kind() {
    let mut report = RunReport::new("u");
    report.push_issue(IssueKind::ParseRow, "row 1");
    report.push_issue(IssueKind::StoreRead, "denied");
    report.push_issue(IssueKind::ParseRow, "row 5");

    assert_eq!(report.issues_of(IssueKind::ParseRow).count(), 2);
    assert!(report.has_issue(IssueKind::StoreRead));
    assert!(!report.has_issue(IssueKind::StoreWrite));
}

#[test]
fn stop_marker_matches_only_both_fields() {
    let marker = StopMarker::at(Listing::new("r", "l"));
    assert!(marker.is_reached_by("r", "l"));
    assert!(!marker.is_reached_by("r", "other"));
    assert!(!StopMarker::absent().is_reached_by("r", "l"));
    assert!(StopMarker::from(None).is_absent());
}
