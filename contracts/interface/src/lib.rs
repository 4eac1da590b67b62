//! PressKit Interface - Rate Contract Binding
//!
//! Client-side view of the deployed rate contract: ABI, address and the
//! network it lives on. The contract itself is not part of this workspace.

use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use thiserror::Error;

/// Base Sepolia
pub const CHAIN_ID: u64 = 84_532;

pub const CONTRACT_ADDRESS: Address = address!("162316f84Cb8A3c981cC2cF150D4240EfEE2CeE1");

/// Divisor turning the on-chain basis-point rate into a percentage.
pub const BPS_PER_PERCENT: u64 = 100;

sol! {
    /// Every `press` nudges the published rate down and bumps the counter.
    interface IRateButton {
        function rateBps() external view returns (uint256 rate);
        function totalPresses() external view returns (uint256 presses);
        function press() external;
    }
}

#[derive(Debug, Error)]
pub enum InterfaceError {
    #[error("Calldata shorter than a selector ({0} bytes)")]
    TruncatedCalldata(usize),

    #[error("Unknown selector 0x{}", alloy_primitives::hex::encode(.0))]
    UnknownSelector([u8; 4]),

    #[error("ABI decode failed: {0}")]
    Decode(#[from] alloy_sol_types::Error),
}

/// Contract entry points, keyed by selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateButtonCall {
    RateBps,
    TotalPresses,
    Press,
}

impl RateButtonCall {
    pub fn selector(&self) -> [u8; 4] {
        match self {
            Self::RateBps => IRateButton::rateBpsCall::SELECTOR,
            Self::TotalPresses => IRateButton::totalPressesCall::SELECTOR,
            Self::Press => IRateButton::pressCall::SELECTOR,
        }
    }

    /// Read-only entry points go through `eth_call`, the rest need a batch.
    pub fn is_view(&self) -> bool {
        !matches!(self, Self::Press)
    }

    /// ABI-encoded calldata. All entry points are zero-argument.
    pub fn calldata(&self) -> Bytes {
        let encoded = match self {
            Self::RateBps => IRateButton::rateBpsCall {}.abi_encode(),
            Self::TotalPresses => IRateButton::totalPressesCall {}.abi_encode(),
            Self::Press => IRateButton::pressCall {}.abi_encode(),
        };
        Bytes::from(encoded)
    }

    /// Identify the entry point targeted by raw calldata.
    pub fn unpack(data: &[u8]) -> Result<Self, InterfaceError> {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or(InterfaceError::TruncatedCalldata(data.len()))?;

        [Self::RateBps, Self::TotalPresses, Self::Press]
            .into_iter()
            .find(|call| call.selector() == selector)
            .ok_or(InterfaceError::UnknownSelector(selector))
    }
}

/// Decode the return data of `rateBps()`.
pub fn decode_rate_bps(data: &[u8]) -> Result<U256, InterfaceError> {
    Ok(IRateButton::rateBpsCall::abi_decode_returns(data, true)?.rate)
}

/// Decode the return data of `totalPresses()`.
pub fn decode_total_presses(data: &[u8]) -> Result<U256, InterfaceError> {
    Ok(IRateButton::totalPressesCall::abi_decode_returns(data, true)?.presses)
}
