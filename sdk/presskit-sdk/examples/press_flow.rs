// Example: connecting, provisioning a sub-account and pressing once
//
// This example demonstrates how to:
// 1. Initialize a session against a wallet provider
// 2. Connect and let the session provision the origin's sub-account
// 3. Submit one press and wait for the wallet to confirm it
//
// The wallet here is an in-memory stand-in that confirms every batch on the
// second status query. Run with `RUST_LOG=presskit_sdk=debug` for detail.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use presskit_sdk::contract::RateButtonCall;
use presskit_sdk::{ProviderError, ProviderHandle, Session, SessionConfig, WalletProvider};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct DemoWallet {
    sub_account: Mutex<Option<Address>>,
    status_queries: Mutex<u32>,
    presses: Mutex<u64>,
}

#[async_trait]
impl WalletProvider for DemoWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        match method {
            "eth_requestAccounts" => Ok(json!([Address::repeat_byte(0x11)])),
            "wallet_getSubAccounts" => {
                let found: Vec<Value> = self
                    .sub_account
                    .lock()
                    .unwrap()
                    .iter()
                    .map(|a| json!({ "address": a }))
                    .collect();
                Ok(json!({ "subAccounts": found }))
            },
            "wallet_addSubAccount" => {
                let created = Address::repeat_byte(0x22);
                *self.sub_account.lock().unwrap() = Some(created);
                Ok(json!({ "address": created }))
            },
            "wallet_sendCalls" => {
                *self.status_queries.lock().unwrap() = 0;
                Ok(json!({ "id": "0xdemo" }))
            },
            "wallet_getCallsStatus" => {
                let mut queries = self.status_queries.lock().unwrap();
                *queries += 1;
                if *queries < 2 {
                    return Ok(json!({ "status": 100 }));
                }
                *self.presses.lock().unwrap() += 1;
                Ok(json!({
                    "status": 200,
                    "receipts": [{ "transactionHash": B256::repeat_byte(0x33) }]
                }))
            },
            "eth_call" => {
                let data: Bytes = serde_json::from_value(params[0]["data"].clone())
                    .map_err(|e| ProviderError::new(-32602, e.to_string()))?;
                let presses = *self.presses.lock().unwrap();
                let value = match RateButtonCall::unpack(&data) {
                    Ok(RateButtonCall::RateBps) => 425 - presses,
                    Ok(RateButtonCall::TotalPresses) => presses,
                    _ => return Err(ProviderError::new(3, "execution reverted")),
                };
                Ok(json!(Bytes::from(U256::from(value).abi_encode())))
            },
            _ => Err(ProviderError::unsupported_method(method)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // 1. Session for the app's origin, provider created once
    let session = Session::new(SessionConfig::new("http://localhost:5173"))?;
    let wallet: ProviderHandle = Arc::new(DemoWallet::default());
    session.initialize(&wallet)?;

    // 2. Connect; the sub-account is provisioned on the way
    let connection = session.connect().await?;
    let snapshot = session.snapshot();
    println!("Connected:");
    println!("  Primary: {}", connection.primary);
    println!("  Sending from: {}", snapshot.account_label().unwrap_or_default());
    println!("  Rate: {}", snapshot.display.rate_label());
    println!("  Clicks: {}", snapshot.display.clicks_label());

    // 3. Press once and wait for confirmation
    match session.submit_press().await? {
        Some(settlement) => {
            let snapshot = session.snapshot();
            println!("Press confirmed after {} status checks", settlement.attempts);
            if let Some(reference) = settlement.reference {
                println!("  Transaction: {reference}");
            }
            println!("  Rate: {}", snapshot.display.rate_label());
            println!("  Clicks: {}", snapshot.display.clicks_label());
            println!("  Gauge: {:.0}%", snapshot.display.default_gauge_percent());
        },
        None => println!("No sender available, nothing submitted"),
    }

    Ok(())
}
