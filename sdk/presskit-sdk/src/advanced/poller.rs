//! Call-status polling.
//!
//! Drives a submitted press to a terminal state: one status query per tick
//! until the wallet reports confirmed, failed or rejected, the tick budget
//! runs out, or the cancellation token fires.

use crate::core::config::PollConfig;
use crate::core::provider::WalletProvider;
use crate::core::rpc::{self, methods, CallsStatusResult, RawCallStatus, TransactionReceipt};
use crate::error::{PressKitError, Result};
use crate::types::{BatchStatus, CallId, Settlement};
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Terminal result of a polling run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Confirmed(Settlement),
    Failed {
        id: CallId,
        status: BatchStatus,
        attempts: u32,
    },
    TimedOut {
        id: CallId,
        attempts: u32,
    },
    Cancelled {
        id: CallId,
        attempts: u32,
    },
}

impl PollOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Confirmed(settlement) => settlement.attempts,
            Self::Failed { attempts, .. }
            | Self::TimedOut { attempts, .. }
            | Self::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn into_result(self) -> Result<Settlement> {
        match self {
            Self::Confirmed(settlement) => Ok(settlement),
            Self::Failed { id, status, .. } => Err(PressKitError::PollFailure {
                id: id.to_string(),
                status: status.label().to_string(),
            }),
            Self::TimedOut { id, attempts } => Err(PressKitError::PollTimeout {
                id: id.to_string(),
                attempts,
            }),
            Self::Cancelled { .. } => Err(PressKitError::Cancelled),
        }
    }
}

/// Map an EIP-5792 status payload onto [`BatchStatus`].
///
/// v2 codes: 1xx pending, 2xx confirmed, 4xx rejected off-chain,
/// 5xx/6xx reverted on-chain. Unknown values stay pending.
pub fn classify(result: &CallsStatusResult) -> BatchStatus {
    let confirmed = || BatchStatus::Confirmed {
        reference: result.settlement_reference(),
    };

    match &result.status {
        RawCallStatus::Code(code) => match code {
            200..=299 => confirmed(),
            400..=499 => BatchStatus::Rejected,
            500..=699 => BatchStatus::Failed,
            _ => BatchStatus::Pending,
        },
        RawCallStatus::Label(label) => match label.to_ascii_uppercase().as_str() {
            "CONFIRMED" | "SUCCESS" => confirmed(),
            "REJECTED" => BatchStatus::Rejected,
            "FAILED" | "FAILURE" | "REVERTED" => BatchStatus::Failed,
            _ => BatchStatus::Pending,
        },
    }
}

/// One status query for `id`.
pub async fn query_status(provider: &dyn WalletProvider, id: &CallId) -> Result<BatchStatus> {
    match id {
        CallId::Batch(batch_id) => {
            let result: CallsStatusResult =
                rpc::call(provider, methods::GET_CALLS_STATUS, [batch_id]).await?;
            Ok(classify(&result))
        },
        CallId::Transaction(hash) => {
            let receipt: Option<TransactionReceipt> =
                rpc::call(provider, methods::GET_TRANSACTION_RECEIPT, [hash]).await?;
            Ok(match receipt {
                None => BatchStatus::Pending,
                Some(r) if r.succeeded() => BatchStatus::Confirmed {
                    reference: Some(r.transaction_hash),
                },
                Some(_) => BatchStatus::Failed,
            })
        },
    }
}

/// `tokio::time::interval` rejects a zero period
const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub struct CallStatusPoller<'a> {
    provider: &'a dyn WalletProvider,
    interval: Duration,
    max_tries: u32,
}

impl<'a> CallStatusPoller<'a> {
    pub fn new(provider: &'a dyn WalletProvider, config: &PollConfig) -> Self {
        Self {
            provider,
            interval: config.interval().max(MIN_INTERVAL),
            max_tries: config.max_tries,
        }
    }

    /// Zero is clamped to one millisecond.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    pub fn with_max_tries(mut self, max_tries: u32) -> Self {
        self.max_tries = max_tries;
        self
    }

    /// Poll until a terminal outcome. Issues at most `max_tries` queries;
    /// the first one goes out immediately.
    pub async fn wait(&self, id: &CallId, cancel: &CancellationToken) -> PollOutcome {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        for attempt in 1..=self.max_tries {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(call_id = %id, attempt, "status polling cancelled");
                    return PollOutcome::Cancelled { id: id.clone(), attempts: attempt - 1 };
                }
                _ = ticker.tick() => {}
            }

            match query_status(self.provider, id).await {
                Ok(BatchStatus::Pending) => {
                    debug!(call_id = %id, attempt, "call still pending");
                },
                Ok(BatchStatus::Confirmed { reference }) => {
                    return PollOutcome::Confirmed(Settlement {
                        id: id.clone(),
                        reference,
                        attempts: attempt,
                    });
                },
                Ok(status) => {
                    return PollOutcome::Failed {
                        id: id.clone(),
                        status,
                        attempts: attempt,
                    };
                },
                // Transient: status method may not be live yet
                Err(e) => {
                    warn!(call_id = %id, attempt, error = %e, "status query failed, retrying");
                },
            }
        }

        PollOutcome::TimedOut {
            id: id.clone(),
            attempts: self.max_tries,
        }
    }
}
