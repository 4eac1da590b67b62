use crate::core::constants::SUB_ACCOUNT_VERSION;
use crate::core::provider::WalletProvider;
use crate::core::rpc::{
    self, methods, AddSubAccountParams, GetSubAccountsParams, GetSubAccountsResult, NewSubAccount,
    SubAccountEntry,
};
use crate::error::{PressKitError, Result};
use alloy_primitives::Address;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Existing sub-accounts of `primary` scoped to the literal `origin`.
/// The wallet defines the order; callers take the first.
pub async fn lookup(
    provider: &dyn WalletProvider,
    primary: Address,
    origin: &str,
) -> Result<Vec<Address>> {
    let params = [GetSubAccountsParams {
        account: primary,
        domain: origin,
    }];
    let result: GetSubAccountsResult =
        rpc::call(provider, methods::GET_SUB_ACCOUNTS, params).await?;

    Ok(result.sub_accounts.into_iter().map(|s| s.address).collect())
}

/// Ask the wallet to create a sub-account for the requesting origin.
pub async fn create(provider: &dyn WalletProvider) -> Result<Address> {
    let params = [AddSubAccountParams {
        version: SUB_ACCOUNT_VERSION,
        account: NewSubAccount::Create,
    }];
    let entry: SubAccountEntry = rpc::call(provider, methods::ADD_SUB_ACCOUNT, params).await?;
    Ok(entry.address)
}

/// Finds or creates the delegated account for a `(primary, origin)` pair.
///
/// Results are cached until [`SubAccountResolver::reset`], so repeated
/// resolution within a session never creates a second account.
#[derive(Default)]
pub struct SubAccountResolver {
    cache: Mutex<HashMap<(Address, String), Address>>,
}

impl SubAccountResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve(
        &self,
        provider: &dyn WalletProvider,
        primary: Address,
        origin: &str,
    ) -> Result<Address> {
        // Held across provider round-trips: one resolution in flight at a time
        let mut cache = self.cache.lock().await;
        let key = (primary, origin.to_string());

        if let Some(address) = cache.get(&key) {
            debug!(%primary, origin, sub_account = %address, "sub-account cache hit");
            return Ok(*address);
        }

        let address = match lookup(provider, primary, origin).await {
            Ok(existing) if !existing.is_empty() => {
                info!(%primary, origin, found = existing.len(), "reusing sub-account");
                existing[0]
            },
            Ok(_) => Self::create_or_unavailable(provider, origin, None).await?,
            Err(e) => {
                if e.is_unsupported() {
                    info!(%primary, origin, "wallet cannot list sub-accounts, trying creation");
                } else {
                    warn!(%primary, origin, error = %e, "sub-account lookup failed");
                }
                Self::create_or_unavailable(provider, origin, Some(e)).await?
            },
        };

        cache.insert(key, address);
        Ok(address)
    }

    async fn create_or_unavailable(
        provider: &dyn WalletProvider,
        origin: &str,
        lookup_error: Option<PressKitError>,
    ) -> Result<Address> {
        match create(provider).await {
            Ok(address) => {
                info!(origin, sub_account = %address, "created sub-account");
                Ok(address)
            },
            Err(e) => {
                let reason = match lookup_error {
                    Some(lookup_error) => format!("lookup: {lookup_error}; create: {e}"),
                    None => format!("create: {e}"),
                };
                Err(PressKitError::DelegationUnavailable {
                    origin: origin.to_string(),
                    reason,
                })
            },
        }
    }

    pub async fn cached(&self, primary: Address, origin: &str) -> Option<Address> {
        self.cache
            .lock()
            .await
            .get(&(primary, origin.to_string()))
            .copied()
    }

    /// Forget every resolution (session reset).
    pub async fn reset(&self) {
        self.cache.lock().await.clear();
    }
}
