use crate::core::constants::*;
use crate::core::provider::ProviderOptions;
use crate::error::{PressKitError, Result};
use alloy_primitives::Address;
use presskit_interface::CONTRACT_ADDRESS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When the wallet should provision the origin's sub-account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubAccountCreation {
    #[default]
    OnConnect,
    Manual,
}

/// Which identity signs outgoing calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultAccount {
    #[default]
    Sub,
    Universal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubAccountPolicy {
    pub creation: SubAccountCreation,
    pub default_account: DefaultAccount,
}

/// How a press reaches the chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStrategy {
    /// `wallet_sendCalls` + `wallet_getCallsStatus`
    #[default]
    BatchedCalls,
    /// `eth_sendTransaction` + `eth_getTransactionReceipt`
    DirectTransaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PollConfig {
    pub interval_ms: u64,
    pub max_tries: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_tries: DEFAULT_POLL_MAX_TRIES,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Session configuration. Every field has a default, so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub app_name: String,
    pub app_logo_url: Option<String>,
    pub chain_id: u64,
    /// Requesting origin; sub-accounts are scoped to this exact string
    pub origin: String,
    pub contract: Address,
    pub sub_accounts: SubAccountPolicy,
    pub strategy: SubmissionStrategy,
    pub poll: PollConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            app_logo_url: Some(DEFAULT_APP_LOGO_URL.to_string()),
            chain_id: DEFAULT_CHAIN_ID,
            origin: DEFAULT_ORIGIN.to_string(),
            contract: CONTRACT_ADDRESS,
            sub_accounts: SubAccountPolicy::default(),
            strategy: SubmissionStrategy::default(),
            poll: PollConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    /// Parse from JSON and validate.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_strategy(mut self, strategy: SubmissionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_sub_accounts(mut self, policy: SubAccountPolicy) -> Self {
        self.sub_accounts = policy;
        self
    }

    pub fn with_poll(mut self, interval_ms: u64, max_tries: u32) -> Self {
        self.poll = PollConfig {
            interval_ms,
            max_tries,
        };
        self
    }

    pub fn with_contract(mut self, contract: Address) -> Self {
        self.contract = contract;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.origin.trim().is_empty() {
            return Err(PressKitError::Config("origin must not be empty".into()));
        }
        if self.chain_id == 0 {
            return Err(PressKitError::Config("chain id must be non-zero".into()));
        }
        if self.poll.interval_ms == 0 || self.poll.max_tries == 0 {
            return Err(PressKitError::Config(
                "poll interval and max tries must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn provider_options(&self) -> ProviderOptions {
        ProviderOptions {
            app_name: self.app_name.clone(),
            app_logo_url: self.app_logo_url.clone(),
            app_chain_ids: vec![self.chain_id],
            sub_accounts: self.sub_accounts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SessionConfig::from_json(
            r#"{ "origin": "https://app.example", "strategy": "direct-transaction", "poll": { "maxTries": 5 } }"#,
        )
        .unwrap();

        assert_eq!(config.origin, "https://app.example");
        assert_eq!(config.strategy, SubmissionStrategy::DirectTransaction);
        assert_eq!(config.poll.max_tries, 5);
        assert_eq!(config.poll.interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(config.contract, CONTRACT_ADDRESS);
        assert_eq!(config.sub_accounts.creation, SubAccountCreation::OnConnect);
        assert_eq!(config.sub_accounts.default_account, DefaultAccount::Sub);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            SessionConfig::new("  ").validate(),
            Err(PressKitError::Config(_))
        ));
        assert!(SessionConfig::new("https://app.example")
            .with_poll(0, 60)
            .validate()
            .is_err());
        assert!(SessionConfig::from_json(r#"{ "poll": { "maxTries": 0 } }"#).is_err());
    }

    #[test]
    fn test_provider_options_carry_policy() {
        let config = SessionConfig::new("https://app.example");
        let options = config.provider_options();
        assert_eq!(options.app_chain_ids, vec![DEFAULT_CHAIN_ID]);

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["subAccounts"]["creation"], "on-connect");
        assert_eq!(json["subAccounts"]["defaultAccount"], "sub");
    }
}
