#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use presskit_sdk::contract::RateButtonCall;
use presskit_sdk::{
    ProviderError, ProviderHandle, Session, SessionConfig, SessionSnapshot, WalletProvider,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub const ORIGIN: &str = "https://app.example";
pub const BATCH_ID: &str = "0x00000000000000000000000000000000000000000000000000000000000b47c4";

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn hash(byte: u8) -> B256 {
    B256::repeat_byte(byte)
}

pub fn pending() -> Result<Value, ProviderError> {
    Ok(json!({ "status": 100, "receipts": [] }))
}

pub fn confirmed(reference: B256) -> Result<Value, ProviderError> {
    Ok(json!({
        "status": 200,
        "receipts": [{ "transactionHash": reference, "status": "0x1" }]
    }))
}

pub fn method_missing() -> Result<Value, ProviderError> {
    Err(ProviderError::new(
        ProviderError::METHOD_NOT_FOUND,
        "wallet_getCallsStatus not available yet",
    ))
}

/// Scripted wallet state. Tests poke fields directly through `MockWallet::state`.
pub struct MockState {
    pub accounts: Vec<Address>,
    pub reject_connect: bool,
    /// Origin the wallet attributes `wallet_addSubAccount` to
    pub requesting_origin: String,
    pub supports_sub_accounts: bool,
    pub fail_lookup: bool,
    pub sub_accounts: HashMap<String, Vec<Address>>,
    pub to_create: VecDeque<Address>,
    pub reject_send: bool,
    pub batch_id: String,
    pub tx_hash: B256,
    pub statuses: VecDeque<Result<Value, ProviderError>>,
    pub rate_bps: u64,
    pub presses: u64,
    pub fail_reads: bool,
    pub calls: Vec<(String, Value)>,
    pub busy_at_submit: Vec<bool>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            accounts: vec![addr(0xaa)],
            reject_connect: false,
            requesting_origin: ORIGIN.to_string(),
            supports_sub_accounts: true,
            fail_lookup: false,
            sub_accounts: HashMap::new(),
            to_create: VecDeque::from([addr(0xbb)]),
            reject_send: false,
            batch_id: BATCH_ID.to_string(),
            tx_hash: hash(0xdd),
            statuses: VecDeque::new(),
            rate_bps: 425,
            presses: 7,
            fail_reads: false,
            calls: Vec::new(),
            busy_at_submit: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct MockWallet {
    state: Mutex<MockState>,
    observer: Mutex<Option<watch::Receiver<SessionSnapshot>>>,
}

impl MockWallet {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with(configure: impl FnOnce(&mut MockState)) -> Arc<Self> {
        let wallet = Self::default();
        configure(&mut wallet.state.lock().unwrap());
        Arc::new(wallet)
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Record the session's busy flag whenever a press reaches the wallet.
    pub fn observe(&self, session: &Session) {
        *self.observer.lock().unwrap() = Some(session.subscribe());
    }

    pub fn count(&self, method: &str) -> usize {
        self.state().calls.iter().filter(|(m, _)| m == method).count()
    }

    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.state()
            .calls
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
    }

    fn busy_now(&self) -> Option<bool> {
        self.observer
            .lock()
            .unwrap()
            .as_ref()
            .map(|rx| rx.borrow().busy)
    }

    fn next_status(state: &mut MockState) -> Result<Value, ProviderError> {
        let reply = state.statuses.pop_front().unwrap_or_else(pending);
        if let Ok(value) = &reply {
            if value["status"] == json!(200) {
                state.presses += 1;
                state.rate_bps = state.rate_bps.saturating_sub(1);
            }
        }
        reply
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let busy = self.busy_now();
        let mut state = self.state();
        state.calls.push((method.to_string(), params.clone()));

        match method {
            "eth_requestAccounts" => {
                if state.reject_connect {
                    return Err(ProviderError::user_rejected());
                }
                Ok(json!(state.accounts))
            },
            "wallet_getSubAccounts" => {
                if !state.supports_sub_accounts {
                    return Err(ProviderError::unsupported_method(method));
                }
                if state.fail_lookup {
                    return Err(ProviderError::new(ProviderError::DISCONNECTED, "popup closed"));
                }
                let domain = params[0]["domain"].as_str().unwrap_or_default();
                let found: Vec<Value> = state
                    .sub_accounts
                    .get(domain)
                    .into_iter()
                    .flatten()
                    .map(|a| json!({ "address": a }))
                    .collect();
                Ok(json!({ "subAccounts": found }))
            },
            "wallet_addSubAccount" => {
                if !state.supports_sub_accounts {
                    return Err(ProviderError::unsupported_method(method));
                }
                let created = state
                    .to_create
                    .pop_front()
                    .ok_or_else(|| ProviderError::new(ProviderError::INTERNAL, "no key slots"))?;
                let origin = state.requesting_origin.clone();
                state.sub_accounts.entry(origin).or_default().push(created);
                Ok(json!({ "address": created }))
            },
            "wallet_sendCalls" => {
                if let Some(busy) = busy {
                    state.busy_at_submit.push(busy);
                }
                if state.reject_send {
                    return Err(ProviderError::user_rejected());
                }
                Ok(json!({ "id": state.batch_id }))
            },
            "eth_sendTransaction" => {
                if let Some(busy) = busy {
                    state.busy_at_submit.push(busy);
                }
                if state.reject_send {
                    return Err(ProviderError::user_rejected());
                }
                Ok(json!(state.tx_hash))
            },
            "wallet_getCallsStatus" | "eth_getTransactionReceipt" => Self::next_status(&mut state),
            "eth_call" => {
                if state.fail_reads {
                    return Err(ProviderError::new(ProviderError::INTERNAL, "rpc node down"));
                }
                let data: Bytes = serde_json::from_value(params[0]["data"].clone())
                    .map_err(|e| ProviderError::new(-32602, e.to_string()))?;
                let value = match RateButtonCall::unpack(&data) {
                    Ok(RateButtonCall::RateBps) => state.rate_bps,
                    Ok(RateButtonCall::TotalPresses) => state.presses,
                    _ => return Err(ProviderError::new(3, "execution reverted")),
                };
                Ok(json!(Bytes::from(U256::from(value).abi_encode())))
            },
            _ => Err(ProviderError::unsupported_method(method)),
        }
    }
}

pub fn config() -> SessionConfig {
    SessionConfig::new(ORIGIN)
}

/// Session with `wallet` already installed as its provider.
pub fn setup_session(wallet: &Arc<MockWallet>, config: SessionConfig) -> Session {
    let session = Session::new(config).unwrap();
    let handle: ProviderHandle = wallet.clone();
    session.initialize(&handle).unwrap();
    wallet.observe(&session);
    session
}
