//! End-to-end scenarios for the resolution pipeline.
//!
//! These tests drive full runs over the scripted mock provider and assert
//! on submission order, throttle recovery, failure isolation, and
//! cancellation semantics.

use std::time::Duration;

use resolver_core::testing::{test_identity, test_numbers, test_phone, ImportScript, MockDirectory};
use resolver_core::{
    AuthSession, BatchResolver, ResolveConfig, ResolveEvent,
};

/// Connect a session over a mock scripted to be already authorized.
async fn authenticated_session(mock: MockDirectory) -> AuthSession<MockDirectory> {
    let mut session = AuthSession::new(mock, test_identity(), test_phone(0));
    session.connect().await.expect("mock connect succeeds");
    assert!(session.is_authenticated());
    session
}

#[tokio::test]
async fn test_25_numbers_partition_into_3_ordered_batches() {
    let numbers = test_numbers(25);
    let session = authenticated_session(MockDirectory::already_authorized()).await;
    let mut resolver =
        BatchResolver::new(session, ResolveConfig::without_delay(10)).unwrap();

    let report = resolver.run(&numbers).await;

    let calls = resolver.session().provider().import_batches().to_vec();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].len(), 10);
    assert_eq!(calls[1].len(), 10);
    assert_eq!(calls[2].len(), 5);

    // Original input order is preserved across the partition.
    assert_eq!(calls[0][0].phone, numbers[0]);
    assert_eq!(calls[1][0].phone, numbers[10]);
    assert_eq!(calls[2][4].phone, numbers[24]);

    // Correlation ids restart at 0 for every batch.
    assert_eq!(calls[2][0].client_id, 0);
    assert_eq!(calls[2][4].client_id, 4);

    assert_eq!(report.total_submitted, 25);
    assert_eq!(report.batches.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_throttled_batch_waits_and_resubmits_before_advancing() {
    let numbers = test_numbers(6);
    let mock = MockDirectory::already_authorized()
        .with_import(ImportScript::NoMatches) // batch 0
        .with_import(ImportScript::Throttle(5)) // batch 1, first attempt
        .with_import(ImportScript::Matches(vec![MockDirectory::match_for(
            &numbers[2],
            "Asha",
        )])) // batch 1, resubmission
        .with_import(ImportScript::NoMatches); // batch 2
    let session = authenticated_session(mock).await;
    let mut resolver = BatchResolver::new(session, ResolveConfig::without_delay(2)).unwrap();

    let started = tokio::time::Instant::now();
    let report = resolver.run(&numbers).await;

    // The throttled batch was resubmitted, not skipped, and batch 2 was
    // not touched until batch 1 succeeded.
    let calls = resolver.session().provider().import_batches();
    assert_eq!(calls.len(), 4);
    let phones = |i: usize| calls[i].iter().map(|e| e.phone.clone()).collect::<Vec<_>>();
    assert_eq!(phones(1), phones(2));
    assert_eq!(calls[3][0].phone, numbers[4]);

    // The full signaled wait elapsed before the resubmission.
    assert!(started.elapsed() >= Duration::from_secs(5));

    assert_eq!(report.matched(), 1);
    assert_eq!(report.batches[1].throttle_waits, 1);
}

#[tokio::test]
async fn test_failed_batch_is_isolated_and_run_completes() {
    let numbers = test_numbers(9);
    let mock = MockDirectory::already_authorized()
        .with_import(ImportScript::Matches(vec![
            MockDirectory::match_for(&numbers[0], "Asha"),
            MockDirectory::match_for(&numbers[1], "Ravi"),
        ]))
        .with_import(ImportScript::Fail("backend unavailable".to_string()))
        .with_import(ImportScript::Matches(vec![MockDirectory::match_for(
            &numbers[6],
            "Meera",
        )]));
    let session = authenticated_session(mock).await;
    let mut resolver = BatchResolver::new(session, ResolveConfig::without_delay(3)).unwrap();

    let report = resolver.run(&numbers).await;

    // 2 + 0 + 1 accounts; the failed middle batch neither aborts the run
    // nor surfaces an error to the caller.
    assert_eq!(report.matched(), 3);
    assert!(!report.cancelled);
    assert_eq!(report.batches.len(), 3);
    assert!(report.batches[1].error.is_some());
    assert_eq!(report.batches[1].accounts_found, 0);

    // Never more accounts than submitted numbers.
    assert!(report.accounts.len() <= report.total_submitted);
    assert!((report.success_rate() - 3.0 / 9.0).abs() < f64::EPSILON);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_during_inter_batch_wait() {
    let numbers = test_numbers(4);
    let mock = MockDirectory::already_authorized()
        .with_import(ImportScript::Matches(vec![MockDirectory::match_for(
            &numbers[0],
            "Asha",
        )]))
        .with_import(ImportScript::Matches(vec![MockDirectory::match_for(
            &numbers[2],
            "Ravi",
        )]));
    let session = authenticated_session(mock).await;
    let config = ResolveConfig {
        batch_size: 2,
        inter_batch_delay: Duration::from_secs(60),
    };
    let mut resolver = BatchResolver::new(session, config).unwrap();
    let mut events = resolver.subscribe();
    let token = resolver.cancellation_token();

    let handle = tokio::spawn(async move {
        let report = resolver.run(&numbers).await;
        (resolver, report)
    });

    // Cancel as soon as the first batch lands, i.e. during the pacing wait.
    while let Some(event) = events.recv().await {
        if matches!(event, ResolveEvent::BatchSucceeded { index: 0, .. }) {
            token.cancel();
            break;
        }
    }

    let (resolver, report) = handle.await.unwrap();

    // Batch 1's accounts survive; batch 2 was never submitted.
    assert!(report.cancelled);
    assert_eq!(report.matched(), 1);
    assert_eq!(report.accounts[0].first_name, "Asha");
    assert_eq!(resolver.session().provider().import_call_count(), 1);
}

#[tokio::test]
async fn test_run_over_unmatched_numbers_reports_zero_rate() {
    let numbers = test_numbers(5);
    let session = authenticated_session(MockDirectory::already_authorized()).await;
    let mut resolver = BatchResolver::new(session, ResolveConfig::without_delay(5)).unwrap();

    let report = resolver.run(&numbers).await;
    assert_eq!(report.matched(), 0);
    assert_eq!(report.success_rate(), 0.0);
    assert_eq!(report.batches.len(), 1);
}
