use crate::core::config::SubAccountPolicy;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// EIP-1193 error object returned by `request`.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("[{code}] {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderError {
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const DISCONNECTED: i64 = 4900;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INTERNAL: i64 = -32603;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(Self::USER_REJECTED, "User rejected the request")
    }

    pub fn unsupported_method(method: &str) -> Self {
        Self::new(
            Self::UNSUPPORTED_METHOD,
            format!("Method {method} is not supported"),
        )
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Self::USER_REJECTED
    }

    pub fn is_unsupported(&self) -> bool {
        self.code == Self::UNSUPPORTED_METHOD || self.code == Self::METHOD_NOT_FOUND
    }
}

/// Abstraction over an injected wallet (EIP-1193 `request`).
/// This allows the SDK to work with:
/// 1. Browser wallets bridged into Rust
/// 2. Scripted in-memory wallets (tests, demos)
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;
}

/// Shared capability handle; read by every component, mutated by none.
pub type ProviderHandle = Arc<dyn WalletProvider>;

/// Settings handed to the wallet SDK when the provider is created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOptions {
    pub app_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_logo_url: Option<String>,
    pub app_chain_ids: Vec<u64>,
    pub sub_accounts: SubAccountPolicy,
}

/// Builds the provider handle, e.g. from a wallet SDK factory.
pub trait ProviderConnector {
    fn open(&self, options: &ProviderOptions) -> Result<ProviderHandle, ProviderError>;
}

/// An already constructed provider can act as its own connector.
impl ProviderConnector for ProviderHandle {
    fn open(&self, _options: &ProviderOptions) -> Result<ProviderHandle, ProviderError> {
        Ok(Arc::clone(self))
    }
}
