//! Wire types for the provider methods the SDK issues.

use crate::core::provider::WalletProvider;
use crate::error::{PressKitError, Result};
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

pub mod methods {
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const GET_SUB_ACCOUNTS: &str = "wallet_getSubAccounts";
    pub const ADD_SUB_ACCOUNT: &str = "wallet_addSubAccount";
    pub const SEND_CALLS: &str = "wallet_sendCalls";
    pub const GET_CALLS_STATUS: &str = "wallet_getCallsStatus";
    pub const CALL: &str = "eth_call";
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
}

/// Issue `method` and decode the result into `R`.
pub async fn call<P, R>(provider: &dyn WalletProvider, method: &str, params: P) -> Result<R>
where
    P: Serialize,
    R: DeserializeOwned,
{
    let params = serde_json::to_value(params)?;
    trace!(method, %params, "provider request");

    let raw = provider
        .request(method, params)
        .await
        .map_err(PressKitError::from_provider)?;

    serde_json::from_value(raw)
        .map_err(|e| PressKitError::InvalidResponse(format!("{method}: {e}")))
}

//=============================================================================
// Sub-accounts
//=============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSubAccountsParams<'a> {
    pub account: Address,
    pub domain: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSubAccountsResult {
    #[serde(default)]
    pub sub_accounts: Vec<SubAccountEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAccountEntry {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_data: Option<Bytes>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddSubAccountParams<'a> {
    pub version: &'a str,
    pub account: NewSubAccount,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NewSubAccount {
    Create,
}

//=============================================================================
// Calls & status
//=============================================================================

/// `wallet_sendCalls` returns `{ id }`; early wallets return the bare id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SendCallsResult {
    Object { id: String },
    Bare(String),
}

impl SendCallsResult {
    pub fn into_id(self) -> String {
        match self {
            Self::Object { id } | Self::Bare(id) => id,
        }
    }
}

/// Status is a numeric code in EIP-5792 v2 and a label in v1.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawCallStatus {
    Code(u16),
    Label(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallsStatusResult {
    pub status: RawCallStatus,
    #[serde(default)]
    pub receipts: Option<Vec<CallReceipt>>,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
}

impl CallsStatusResult {
    /// First receipt's hash, falling back to a top-level hash.
    pub fn settlement_reference(&self) -> Option<B256> {
        self.receipts
            .as_ref()
            .and_then(|r| r.first())
            .and_then(|r| r.transaction_hash)
            .or(self.transaction_hash)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallReceipt {
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    #[serde(default)]
    pub status: Option<String>,
}

//=============================================================================
// Plain transactions
//=============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    /// `0x1` success, `0x0` reverted
    #[serde(default)]
    pub status: Option<String>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status
            .as_deref()
            .map_or(true, |s| s.eq_ignore_ascii_case("0x1"))
    }
}

/// Placeholder for methods that take no params.
pub fn no_params() -> Value {
    Value::Array(Vec::new())
}
