//! The batch resolver: sequential, rate-limit-aware submission.
//!
//! One run walks the batches strictly in order. Sequencing is a
//! correctness choice, not a performance limitation: concurrent batches
//! would defeat the pacing that keeps the provider from throttling, and
//! would risk duplicate contact-import side effects on the remote
//! account.
//!
//! Every wait (throttle backoff, inter-batch pacing) races the
//! cancellation token, so a caller can stop the run between submissions
//! without losing accounts already collected.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::AuthSession;
use crate::error::{ProviderError, ResolveError};
use crate::pipeline::aggregate::ResultAggregator;
use crate::traits::directory::DirectoryProvider;
use crate::types::account::ResolvedAccount;
use crate::types::batch::{partition, BatchOutcome, BatchStatus};
use crate::types::config::ResolveConfig;
use crate::types::events::ResolveEvent;
use crate::types::phone::PhoneNumber;
use crate::types::report::ResolutionReport;

use std::time::Duration;

/// Drives one resolution run over an authenticated session.
///
/// The resolver exclusively owns the session (and through it the
/// provider handle) for the duration of the run.
#[derive(Debug)]
pub struct BatchResolver<P: DirectoryProvider> {
    session: AuthSession<P>,
    config: ResolveConfig,
    cancel: CancellationToken,
    events: Option<mpsc::UnboundedSender<ResolveEvent>>,
}

impl<P: DirectoryProvider> BatchResolver<P> {
    /// Build a resolver from a session that must already be
    /// `Authenticated`.
    pub fn new(session: AuthSession<P>, config: ResolveConfig) -> Result<Self, ResolveError> {
        if !session.is_authenticated() {
            return Err(ResolveError::NotAuthenticated {
                state: session.state(),
            });
        }
        if config.batch_size < 1 {
            return Err(ResolveError::InvalidBatchSize);
        }
        Ok(Self {
            session,
            config,
            cancel: CancellationToken::new(),
            events: None,
        })
    }

    /// Receive progress events for runs on this resolver. Events flow one
    /// way; a dropped receiver never blocks the run.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ResolveEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    /// Token that stops the run before its next submission when
    /// cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn session(&self) -> &AuthSession<P> {
        &self.session
    }

    /// Hand the session back, e.g. to disconnect after a run.
    pub fn into_session(self) -> AuthSession<P> {
        self.session
    }

    /// Resolve the given numbers and always produce a report, even when
    /// every batch failed or the run was cancelled partway.
    pub async fn run(&mut self, numbers: &[PhoneNumber]) -> ResolutionReport {
        let run_id = Uuid::new_v4();
        let batches = partition(numbers, self.config.batch_size);
        let total_batches = batches.len();
        let mut aggregator = ResultAggregator::new(numbers.len());

        info!(
            %run_id,
            total_numbers = numbers.len(),
            total_batches,
            batch_size = self.config.batch_size,
            "resolution run started"
        );
        self.emit(ResolveEvent::RunStarted {
            run_id,
            total_numbers: numbers.len(),
            total_batches,
        });

        'run: for mut batch in batches {
            if self.cancel.is_cancelled() {
                aggregator.mark_cancelled();
                self.emit(ResolveEvent::Cancelled);
                break;
            }

            self.emit(ResolveEvent::BatchStarted {
                index: batch.index,
                total_batches,
                size: batch.len(),
            });

            let mut throttle_waits = 0u32;
            loop {
                batch.status = BatchStatus::Submitted;
                debug!(batch = batch.index, size = batch.len(), "submitting batch");

                match self
                    .session
                    .provider_mut()
                    .import_contacts(&batch.contact_entries())
                    .await
                {
                    Ok(matches) => {
                        batch.status = BatchStatus::Succeeded;
                        let accounts: Vec<ResolvedAccount> =
                            matches.into_iter().map(ResolvedAccount::from_match).collect();
                        info!(
                            batch = batch.index,
                            found = accounts.len(),
                            "batch succeeded"
                        );
                        self.emit(ResolveEvent::BatchSucceeded {
                            index: batch.index,
                            total_batches,
                            accounts_found: accounts.len(),
                        });
                        aggregator.append(&BatchOutcome::succeeded(
                            batch.index,
                            batch.len(),
                            accounts,
                            throttle_waits,
                        ));
                        break;
                    }
                    Err(ProviderError::Throttled { retry_after }) => {
                        // Do not advance: wait out the signal, then
                        // resubmit this same batch.
                        batch.status = BatchStatus::Throttled;
                        throttle_waits += 1;
                        warn!(
                            batch = batch.index,
                            wait_secs = retry_after.as_secs(),
                            "provider throttled batch, waiting"
                        );
                        self.emit(ResolveEvent::Throttled {
                            index: batch.index,
                            wait_secs: retry_after.as_secs(),
                        });
                        if !self.wait(retry_after).await {
                            aggregator.mark_cancelled();
                            self.emit(ResolveEvent::Cancelled);
                            break 'run;
                        }
                    }
                    Err(e) if e.is_session_fatal() => {
                        batch.status = BatchStatus::Failed;
                        error!(
                            batch = batch.index,
                            error = %e,
                            "session lost, aborting remaining batches"
                        );
                        self.emit(ResolveEvent::BatchFailed {
                            index: batch.index,
                            total_batches,
                            error: e.to_string(),
                        });
                        aggregator.append(&BatchOutcome::failed(
                            batch.index,
                            batch.len(),
                            e.to_string(),
                            throttle_waits,
                        ));
                        break 'run;
                    }
                    Err(e) => {
                        // Partial failure is tolerated: record, continue.
                        batch.status = BatchStatus::Failed;
                        warn!(batch = batch.index, error = %e, "batch failed, continuing");
                        self.emit(ResolveEvent::BatchFailed {
                            index: batch.index,
                            total_batches,
                            error: e.to_string(),
                        });
                        aggregator.append(&BatchOutcome::failed(
                            batch.index,
                            batch.len(),
                            e.to_string(),
                            throttle_waits,
                        ));
                        break;
                    }
                }
            }

            let more_remain = batch.index + 1 < total_batches;
            if batch.status == BatchStatus::Succeeded
                && more_remain
                && !self.config.inter_batch_delay.is_zero()
                && !self.wait_with_countdown(self.config.inter_batch_delay).await
            {
                aggregator.mark_cancelled();
                self.emit(ResolveEvent::Cancelled);
                break;
            }
        }

        let report = aggregator.finalize(run_id);
        info!(
            %run_id,
            matched = report.matched(),
            cancelled = report.cancelled,
            "resolution run finished"
        );
        self.emit(ResolveEvent::RunCompleted {
            matched: report.matched(),
            total_numbers: report.total_submitted,
        });
        report
    }

    fn emit(&self, event: ResolveEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    /// Sleep `duration` unless cancelled first. Returns false on
    /// cancellation.
    async fn wait(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    /// Inter-batch pacing wait with once-per-second countdown events.
    async fn wait_with_countdown(&self, duration: Duration) -> bool {
        let mut remaining = duration;
        while !remaining.is_zero() {
            self.emit(ResolveEvent::Waiting {
                remaining_secs: remaining.as_secs_f64().ceil() as u64,
            });
            let step = remaining.min(Duration::from_secs(1));
            if !self.wait(step).await {
                return false;
            }
            remaining = remaining.saturating_sub(step);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        test_identity, test_numbers, test_phone, ImportScript, MockDirectory,
    };
    use crate::types::credentials::ApiIdentity;

    /// Connects a session over a mock whose connect script must report
    /// an existing authorization (start from
    /// [`MockDirectory::already_authorized`]).
    async fn authenticated_session(mock: MockDirectory) -> AuthSession<MockDirectory> {
        let mut session = AuthSession::new(mock, test_identity(), test_phone(0));
        session.connect().await.expect("mock connect succeeds");
        assert!(session.is_authenticated());
        session
    }

    #[tokio::test]
    async fn test_rejects_unauthenticated_session() {
        let session = AuthSession::new(
            MockDirectory::new(),
            ApiIdentity::new(1, "h"),
            test_phone(0),
        );
        let err = BatchResolver::new(session, ResolveConfig::without_delay(10)).unwrap_err();
        assert!(matches!(err, ResolveError::NotAuthenticated { .. }));
    }

    #[tokio::test]
    async fn test_rejects_zero_batch_size() {
        let session = authenticated_session(MockDirectory::already_authorized()).await;
        let err = BatchResolver::new(session, ResolveConfig::without_delay(0)).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidBatchSize));
    }

    #[tokio::test]
    async fn test_empty_input_produces_empty_report() {
        let session = authenticated_session(MockDirectory::already_authorized()).await;
        let mut resolver =
            BatchResolver::new(session, ResolveConfig::without_delay(10)).unwrap();

        let report = resolver.run(&[]).await;
        assert_eq!(report.total_submitted, 0);
        assert_eq!(report.matched(), 0);
        assert_eq!(report.success_rate(), 0.0);
        assert_eq!(resolver.session().provider().import_call_count(), 0);
    }

    #[tokio::test]
    async fn test_accounts_keep_batch_then_provider_order() {
        let numbers = test_numbers(4);
        let mock = MockDirectory::already_authorized()
            .with_import(ImportScript::Matches(vec![
                MockDirectory::match_for(&numbers[1], "Beta"),
                MockDirectory::match_for(&numbers[0], "Alpha"),
            ]))
            .with_import(ImportScript::Matches(vec![MockDirectory::match_for(
                &numbers[3],
                "Gamma",
            )]));
        let session = authenticated_session(mock).await;
        let mut resolver =
            BatchResolver::new(session, ResolveConfig::without_delay(2)).unwrap();

        let report = resolver.run(&numbers).await;
        let names: Vec<&str> = report
            .accounts
            .iter()
            .map(|a| a.first_name.as_str())
            .collect();
        // Batch order first, provider return order within a batch (no
        // re-sorting by input position).
        assert_eq!(names, vec!["Beta", "Alpha", "Gamma"]);
    }

    #[tokio::test]
    async fn test_pre_cancelled_run_submits_nothing() {
        let session = authenticated_session(MockDirectory::already_authorized()).await;
        let mut resolver =
            BatchResolver::new(session, ResolveConfig::without_delay(10)).unwrap();
        resolver.cancellation_token().cancel();

        let report = resolver.run(&test_numbers(5)).await;
        assert!(report.cancelled);
        assert_eq!(report.matched(), 0);
        assert_eq!(resolver.session().provider().import_call_count(), 0);
    }

    #[tokio::test]
    async fn test_session_fatal_error_aborts_remaining_batches() {
        let numbers = test_numbers(6);
        let mock = MockDirectory::already_authorized()
            .with_import(ImportScript::NoMatches)
            .with_import(ImportScript::ConnectionLost)
            .with_import(ImportScript::NoMatches);
        let session = authenticated_session(mock).await;
        let mut resolver =
            BatchResolver::new(session, ResolveConfig::without_delay(2)).unwrap();

        let report = resolver.run(&numbers).await;
        // Batch 2 recorded as failed; batch 3 never submitted.
        assert_eq!(resolver.session().provider().import_call_count(), 2);
        assert_eq!(report.batches.len(), 2);
        assert!(report.batches[1].error.is_some());
    }

    #[tokio::test]
    async fn test_throttle_wait_count_recorded() {
        let numbers = test_numbers(2);
        let mock = MockDirectory::already_authorized()
            .with_import(ImportScript::Throttle(0))
            .with_import(ImportScript::Matches(vec![MockDirectory::match_for(
                &numbers[0],
                "Alpha",
            )]));
        let session = authenticated_session(mock).await;
        let mut resolver =
            BatchResolver::new(session, ResolveConfig::without_delay(10)).unwrap();

        let report = resolver.run(&numbers).await;
        assert_eq!(report.matched(), 1);
        assert_eq!(report.batches[0].throttle_waits, 1);
        assert_eq!(resolver.session().provider().import_call_count(), 2);
    }
}
