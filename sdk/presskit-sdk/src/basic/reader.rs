use crate::core::provider::WalletProvider;
use crate::core::rpc::{self, methods, CallRequest};
use crate::error::{PressKitError, Result};
use crate::utils;
use alloy_primitives::{Address, Bytes};
use presskit_interface::{decode_rate_bps, decode_total_presses, RateButtonCall};

/// Raw contract state as read on-chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainState {
    pub rate_bps: u64,
    pub presses: u64,
}

/// Read-only view of the rate contract.
#[derive(Debug, Clone, Copy)]
pub struct StateReader {
    contract: Address,
}

impl StateReader {
    pub fn new(contract: Address) -> Self {
        Self { contract }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Read rate and counter, calling as `from` when a sender is bound.
    pub async fn load_state(
        &self,
        provider: &dyn WalletProvider,
        from: Option<Address>,
    ) -> Result<ChainState> {
        let rate_raw = self.eth_call(provider, from, RateButtonCall::RateBps).await?;
        let presses_raw = self
            .eth_call(provider, from, RateButtonCall::TotalPresses)
            .await?;

        let rate = decode_rate_bps(&rate_raw).map_err(read_failure)?;
        let presses = decode_total_presses(&presses_raw).map_err(read_failure)?;

        Ok(ChainState {
            rate_bps: utils::u256_to_u64(rate, "rateBps")?,
            presses: utils::u256_to_u64(presses, "totalPresses")?,
        })
    }

    async fn eth_call(
        &self,
        provider: &dyn WalletProvider,
        from: Option<Address>,
        call: RateButtonCall,
    ) -> Result<Bytes> {
        let request = CallRequest {
            from,
            to: self.contract,
            data: call.calldata(),
        };
        rpc::call(provider, methods::CALL, (request, "latest"))
            .await
            .map_err(read_failure)
    }
}

fn read_failure(e: impl std::fmt::Display) -> PressKitError {
    PressKitError::ReadFailure(e.to_string())
}
