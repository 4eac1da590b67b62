use crate::core::constants::GAUGE_FULL_SCALE_BPS;
use crate::utils;
use alloy_primitives::{Address, B256};
use std::fmt;

/// Identifier returned when a press leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CallId {
    /// Opaque EIP-5792 batch id
    Batch(String),
    /// Hash of a directly sent transaction
    Transaction(B256),
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Batch(id) => f.write_str(id),
            Self::Transaction(hash) => write!(f, "{hash}"),
        }
    }
}

/// Handed back immediately on submission; not a settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReceipt {
    pub id: CallId,
    pub sender: Address,
}

/// Wallet-reported state of a submitted batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    Pending,
    Confirmed { reference: Option<B256> },
    Failed,
    Rejected,
}

impl BatchStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed { .. } => "confirmed",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
        }
    }
}

/// Terminal success of a press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub id: CallId,
    /// Transaction hash, when the wallet reported one
    pub reference: Option<B256>,
    /// Status queries issued before confirmation
    pub attempts: u32,
}

/// Result of `Session::connect`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub primary: Address,
    pub delegated: Option<Address>,
}

impl Connection {
    /// Delegated account when provisioned, primary otherwise.
    pub fn sender(&self) -> Address {
        self.delegated.unwrap_or(self.primary)
    }
}

/// Derived, non-authoritative contract state shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Rate in basis points (425 = 4.25%)
    pub rate_bps: Option<u64>,
    /// Total presses; never moves backwards
    pub presses: Option<u64>,
}

impl DisplayState {
    pub fn rate_percent(&self) -> Option<f64> {
        self.rate_bps.map(utils::bps_to_percent)
    }

    /// "4.25%", or "..." before the first successful read.
    pub fn rate_label(&self) -> String {
        self.rate_bps
            .map(utils::format_bps)
            .unwrap_or_else(|| "...".to_string())
    }

    pub fn clicks_label(&self) -> String {
        self.presses
            .map(|p| p.to_string())
            .unwrap_or_else(|| "...".to_string())
    }

    /// Gauge fill in percent, clamped to 0..=100.
    pub fn gauge_percent(&self, full_scale_bps: u64) -> f64 {
        match self.rate_bps {
            Some(bps) if full_scale_bps > 0 => {
                (bps as f64 / full_scale_bps as f64 * 100.0).clamp(0.0, 100.0)
            },
            _ => 0.0,
        }
    }

    pub fn default_gauge_percent(&self) -> f64 {
        self.gauge_percent(GAUGE_FULL_SCALE_BPS)
    }

    /// Apply a fresh read, keeping the counter monotonic.
    pub fn apply(&mut self, rate_bps: u64, presses: u64) {
        self.rate_bps = Some(rate_bps);
        self.presses = Some(self.presses.map_or(presses, |prev| prev.max(presses)));
    }
}

/// Everything the presentation layer renders, published on every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub connected: bool,
    pub primary: Option<Address>,
    pub delegated: Option<Address>,
    pub display: DisplayState,
    pub busy: bool,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    pub fn rate_percent(&self) -> Option<f64> {
        self.display.rate_percent()
    }

    pub fn click_count(&self) -> Option<u64> {
        self.display.presses
    }

    /// Short form of the account outgoing calls are sent from.
    pub fn account_label(&self) -> Option<String> {
        self.delegated
            .or(self.primary)
            .map(|a| utils::short_address(&a))
    }
}
