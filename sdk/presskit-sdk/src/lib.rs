pub mod advanced;
pub mod basic;
pub mod core;
pub mod error;
pub mod types;
pub mod utils;

pub use crate::basic::session::Session;
pub use crate::core::config::{
    DefaultAccount, PollConfig, SessionConfig, SubAccountCreation, SubAccountPolicy,
    SubmissionStrategy,
};
pub use crate::core::provider::{
    ProviderConnector, ProviderError, ProviderHandle, ProviderOptions, WalletProvider,
};
pub use crate::error::{PressKitError, Result};
pub use crate::types::{
    BatchReceipt, BatchStatus, CallId, Connection, DisplayState, SessionSnapshot, Settlement,
};
pub use crate::utils::{format_bps, short_address};

pub mod contract {
    pub use presskit_interface::{
        IRateButton, RateButtonCall, BPS_PER_PERCENT, CHAIN_ID, CONTRACT_ADDRESS,
    };
}
