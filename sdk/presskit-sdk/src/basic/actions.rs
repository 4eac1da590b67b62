use crate::advanced::batch::{self, CallBatch};
use crate::advanced::poller::{CallStatusPoller, PollOutcome};
use crate::basic::session::Session;
use crate::core::config::SubmissionStrategy;
use crate::core::provider::WalletProvider;
use crate::core::rpc::{self, methods, SendCallsResult};
use crate::error::{PressKitError, Result};
use crate::types::{BatchReceipt, CallId, Settlement};
use alloy_primitives::B256;
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Holds the session's in-flight flag; clears it on drop whatever the outcome.
struct BusyGuard<'a> {
    session: &'a Session,
}

impl<'a> BusyGuard<'a> {
    fn acquire(session: &'a Session) -> Result<Self> {
        session
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| PressKitError::Busy)?;
        Ok(Self { session })
    }

    fn publish(&self) {
        self.session.publish_busy(true);
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.session.busy.store(false, Ordering::SeqCst);
        self.session.publish_busy(false);
    }
}

/// Encodes `press()`, submits it from the active sender and waits for a
/// terminal status.
pub struct PressAction<'a> {
    session: &'a Session,
    strategy: SubmissionStrategy,
    cancel: Option<CancellationToken>,
}

impl<'a> PressAction<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            strategy: session.config().strategy,
            cancel: None,
        }
    }

    pub fn with_strategy(mut self, strategy: SubmissionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Use a caller-owned token instead of the session's.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build the batch this action would submit from the active sender.
    pub fn build_batch(&self) -> Result<CallBatch> {
        let config = self.session.config();
        batch::press(
            config.contract,
            self.session.active_sender()?,
            config.chain_id,
        )
    }

    pub async fn submit(self) -> Result<Option<Settlement>> {
        let provider = self.session.provider()?;
        let guard = BusyGuard::acquire(self.session)?;

        let cancel = match &self.cancel {
            Some(token) => token.clone(),
            None => self.session.cancellation_token().await,
        };
        if cancel.is_cancelled() {
            return Err(PressKitError::Cancelled);
        }

        let batch = match self.build_batch() {
            Ok(batch) => batch,
            Err(PressKitError::NotConnected) => {
                debug!("no sender resolved, press skipped");
                return Ok(None);
            },
            Err(e) => return Err(e),
        };

        guard.publish();
        match self.run(provider.as_ref(), &batch, &cancel).await {
            Ok(settlement) => Ok(Some(settlement)),
            Err(PressKitError::Cancelled) => Err(PressKitError::Cancelled),
            Err(e) => {
                warn!(error = %e, "press did not complete");
                self.session.record_error(&e);
                Err(e)
            },
        }
    }

    async fn run(
        &self,
        provider: &dyn WalletProvider,
        batch: &CallBatch,
        cancel: &CancellationToken,
    ) -> Result<Settlement> {
        let receipt = self.send(provider, batch).await?;
        info!(call_id = %receipt.id, sender = %receipt.sender, "press submitted");

        let outcome = CallStatusPoller::new(provider, &self.session.config().poll)
            .wait(&receipt.id, cancel)
            .await;
        if let PollOutcome::Cancelled { id, attempts } = &outcome {
            warn!(call_id = %id, attempts, "press cancelled after submission, outcome unconfirmed");
        }
        let settlement = outcome.into_result()?;

        match settlement.reference {
            Some(reference) => info!(call_id = %settlement.id, %reference, "press confirmed"),
            None => info!(call_id = %settlement.id, "press confirmed without a reference"),
        }

        self.session.clear_error();
        self.session.refresh().await;
        Ok(settlement)
    }

    async fn send(&self, provider: &dyn WalletProvider, batch: &CallBatch) -> Result<BatchReceipt> {
        let id = match self.strategy {
            SubmissionStrategy::BatchedCalls => {
                let result: SendCallsResult = rpc::call(provider, methods::SEND_CALLS, [batch])
                    .await
                    .map_err(submission_error)?;
                CallId::Batch(result.into_id())
            },
            SubmissionStrategy::DirectTransaction => {
                let tx = batch.to_transaction()?;
                let hash: B256 = rpc::call(provider, methods::SEND_TRANSACTION, [tx])
                    .await
                    .map_err(submission_error)?;
                CallId::Transaction(hash)
            },
        };

        Ok(BatchReceipt {
            id,
            sender: batch.from(),
        })
    }
}

fn submission_error(e: PressKitError) -> PressKitError {
    match e {
        PressKitError::UserRejected(_) | PressKitError::SubmissionFailure(_) => e,
        other => PressKitError::SubmissionFailure(other.to_string()),
    }
}
