use crate::core::constants::SEND_CALLS_VERSION;
use crate::core::rpc::TransactionRequest;
use crate::error::{PressKitError, Result};
use alloy_primitives::{Address, Bytes, U256};
use presskit_interface::RateButtonCall;
use serde::{Serialize, Serializer};

/// One `{to, data, value}` entry of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Call {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

/// Ordered calls submitted together through `wallet_sendCalls`.
/// Serializes to the EIP-5792 request object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallBatch {
    version: &'static str,
    #[serde(serialize_with = "hex_quantity")]
    chain_id: u64,
    from: Address,
    atomic_required: bool,
    calls: Vec<Call>,
}

fn hex_quantity<S: Serializer>(value: &u64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:#x}"))
}

impl CallBatch {
    pub fn from(&self) -> Address {
        self.from
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn is_atomic(&self) -> bool {
        self.atomic_required
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Single-call batches can go out as a plain transaction instead.
    pub fn to_transaction(&self) -> Result<TransactionRequest> {
        match self.calls.as_slice() {
            [call] => Ok(TransactionRequest {
                from: self.from,
                to: call.to,
                data: call.data.clone(),
                value: call.value,
            }),
            calls => Err(PressKitError::SubmissionFailure(format!(
                "direct transactions carry exactly one call, batch has {}",
                calls.len()
            ))),
        }
    }
}

/// Fluent builder for [`CallBatch`]. Atomic by default.
#[derive(Debug, Clone)]
pub struct CallBatchBuilder {
    from: Option<Address>,
    chain_id: Option<u64>,
    atomic_required: bool,
    calls: Vec<Call>,
}

impl Default for CallBatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CallBatchBuilder {
    pub fn new() -> Self {
        Self {
            from: None,
            chain_id: None,
            atomic_required: true,
            calls: Vec::new(),
        }
    }

    pub fn with_sender(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Allow the wallet to execute the calls non-atomically.
    pub fn best_effort(mut self) -> Self {
        self.atomic_required = false;
        self
    }

    pub fn add_call(self, to: Address, data: Bytes) -> Self {
        self.add_call_with_value(to, data, U256::ZERO)
    }

    pub fn add_call_with_value(mut self, to: Address, data: Bytes, value: U256) -> Self {
        self.calls.push(Call { to, data, value });
        self
    }

    pub fn build(self) -> Result<CallBatch> {
        let from = self.from.ok_or(PressKitError::NotConnected)?;
        let chain_id = self
            .chain_id
            .ok_or_else(|| PressKitError::Config("batch needs a chain id".into()))?;
        if self.calls.is_empty() {
            return Err(PressKitError::SubmissionFailure("batch has no calls".into()));
        }

        Ok(CallBatch {
            version: SEND_CALLS_VERSION,
            chain_id,
            from,
            atomic_required: self.atomic_required,
            calls: self.calls,
        })
    }
}

/// Atomic single-call batch invoking `press()` on `contract`.
pub fn press(contract: Address, from: Address, chain_id: u64) -> Result<CallBatch> {
    CallBatchBuilder::new()
        .with_sender(from)
        .with_chain_id(chain_id)
        .add_call(contract, RateButtonCall::Press.calldata())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use presskit_interface::{CHAIN_ID, CONTRACT_ADDRESS};
    use serde_json::json;

    #[test]
    fn test_press_batch_wire_shape() {
        let from = Address::repeat_byte(0xbb);
        let batch = press(CONTRACT_ADDRESS, from, CHAIN_ID).unwrap();
        let wire = serde_json::to_value(&batch).unwrap();

        assert_eq!(wire["version"], json!(SEND_CALLS_VERSION));
        assert_eq!(wire["chainId"], json!("0x14a34"));
        assert_eq!(wire["atomicRequired"], json!(true));
        assert_eq!(wire["calls"].as_array().unwrap().len(), 1);
        assert_eq!(wire["calls"][0]["value"], json!("0x0"));

        let to: Address = wire["calls"][0]["to"].as_str().unwrap().parse().unwrap();
        let sender: Address = wire["from"].as_str().unwrap().parse().unwrap();
        assert_eq!(to, CONTRACT_ADDRESS);
        assert_eq!(sender, from);
        assert_eq!(batch.calls()[0].data, RateButtonCall::Press.calldata());
    }

    #[test]
    fn test_builder_requires_sender_and_calls() {
        let missing_sender = CallBatchBuilder::new()
            .with_chain_id(CHAIN_ID)
            .add_call(CONTRACT_ADDRESS, Bytes::new())
            .build();
        assert!(matches!(missing_sender, Err(PressKitError::NotConnected)));

        let empty = CallBatchBuilder::new()
            .with_sender(Address::ZERO)
            .with_chain_id(CHAIN_ID)
            .build();
        assert!(matches!(empty, Err(PressKitError::SubmissionFailure(_))));
    }

    #[test]
    fn test_to_transaction_only_for_single_call() {
        let from = Address::repeat_byte(0xbb);
        let single = press(CONTRACT_ADDRESS, from, CHAIN_ID).unwrap();
        let tx = single.to_transaction().unwrap();
        assert_eq!(tx.from, from);
        assert_eq!(tx.to, CONTRACT_ADDRESS);
        assert_eq!(tx.value, U256::ZERO);

        let double = CallBatchBuilder::new()
            .with_sender(from)
            .with_chain_id(CHAIN_ID)
            .add_call(CONTRACT_ADDRESS, Bytes::new())
            .add_call(CONTRACT_ADDRESS, Bytes::new())
            .best_effort()
            .build()
            .unwrap();
        assert!(!double.is_atomic());
        assert!(double.to_transaction().is_err());
    }
}
