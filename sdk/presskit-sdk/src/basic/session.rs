use crate::basic::actions::PressAction;
use crate::basic::reader::StateReader;
use crate::basic::sub_account::SubAccountResolver;
use crate::core::config::{DefaultAccount, SessionConfig, SubAccountCreation};
use crate::core::provider::{ProviderConnector, ProviderHandle};
use crate::core::rpc::{self, methods};
use crate::error::{PressKitError, Result};
use crate::types::{Connection, DisplayState, SessionSnapshot, Settlement};
use alloy_primitives::Address;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A wallet session bound to one origin.
///
/// Owns the provider handle, the primary and delegated identities and the
/// snapshot published to the presentation layer. All methods take `&self`;
/// share it behind an `Arc` when several tasks need it.
pub struct Session {
    config: SessionConfig,
    provider: OnceLock<ProviderHandle>,
    resolver: SubAccountResolver,
    reader: StateReader,
    state: watch::Sender<SessionSnapshot>,
    pub(crate) busy: AtomicBool,
    cancel: Mutex<CancellationToken>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let (state, _) = watch::channel(SessionSnapshot::default());

        Ok(Self {
            reader: StateReader::new(config.contract),
            config,
            provider: OnceLock::new(),
            resolver: SubAccountResolver::new(),
            state,
            busy: AtomicBool::new(false),
            cancel: Mutex::new(CancellationToken::new()),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    //=========================================================================
    // Provider lifecycle
    //=========================================================================

    /// Create the provider handle. Calling again is a no-op.
    pub fn initialize(&self, connector: &impl ProviderConnector) -> Result<()> {
        if self.provider.get().is_some() {
            debug!("provider already initialized");
            return Ok(());
        }

        let options = self.config.provider_options();
        let handle = connector
            .open(&options)
            .map_err(PressKitError::from_provider)?;

        if self.provider.set(handle).is_err() {
            debug!("provider initialized concurrently, keeping the first handle");
        } else {
            info!(app = %options.app_name, chain_id = self.config.chain_id, "provider initialized");
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.provider.get().is_some()
    }

    pub fn provider(&self) -> Result<&ProviderHandle> {
        self.provider.get().ok_or(PressKitError::ProviderUnavailable)
    }

    //=========================================================================
    // Connection
    //=========================================================================

    /// Authorize accounts, then provision the origin's sub-account when the
    /// policy asks for it. Delegation failures fall back to the primary.
    pub async fn connect(&self) -> Result<Connection> {
        let provider = self.provider()?;

        match self.connect_with(provider).await {
            Ok(connection) => Ok(connection),
            Err(e) => {
                warn!(error = %e, "connect failed");
                self.record_error(&e);
                Err(e)
            },
        }
    }

    async fn connect_with(&self, provider: &ProviderHandle) -> Result<Connection> {
        let accounts: Vec<Address> =
            rpc::call(provider.as_ref(), methods::REQUEST_ACCOUNTS, rpc::no_params()).await?;
        let primary = *accounts.first().ok_or_else(|| {
            PressKitError::InvalidResponse("wallet authorized no accounts".into())
        })?;

        info!(%primary, "wallet connected");
        // A previous connection's sub-account may belong to another primary
        self.state.send_modify(|s| {
            s.connected = true;
            s.primary = Some(primary);
            s.delegated = None;
            s.last_error = None;
        });

        let delegated = match self.config.sub_accounts.creation {
            SubAccountCreation::OnConnect => self.provision(provider, primary).await,
            SubAccountCreation::Manual => None,
        };

        self.refresh().await;
        Ok(Connection { primary, delegated })
    }

    async fn provision(&self, provider: &ProviderHandle, primary: Address) -> Option<Address> {
        match self
            .resolver
            .resolve(provider.as_ref(), primary, &self.config.origin)
            .await
        {
            Ok(sub_account) => {
                self.state.send_modify(|s| s.delegated = Some(sub_account));
                Some(sub_account)
            },
            Err(e) => {
                warn!(%primary, error = %e, "sub-account unavailable, sending from primary");
                self.record_error(&e);
                None
            },
        }
    }

    /// Resolve the sub-account explicitly (manual creation policy).
    pub async fn ensure_sub_account(&self) -> Result<Address> {
        let provider = self.provider()?;
        let primary = self
            .state
            .borrow()
            .primary
            .ok_or(PressKitError::NotConnected)?;

        let sub_account = self
            .resolver
            .resolve(provider.as_ref(), primary, &self.config.origin)
            .await
            .inspect_err(|e| self.record_error(e))?;
        self.state.send_modify(|s| s.delegated = Some(sub_account));
        Ok(sub_account)
    }

    /// Drop identities and cached sub-accounts; cancels in-flight work.
    pub async fn disconnect(&self) {
        self.cancel_pending().await;
        self.resolver.reset().await;

        let busy = self.busy.load(Ordering::SeqCst);
        self.state.send_replace(SessionSnapshot {
            busy,
            ..SessionSnapshot::default()
        });
        info!("wallet disconnected");
    }

    /// Delegated identity when resolved, else primary.
    pub fn active_sender(&self) -> Result<Address> {
        let state = self.state.borrow();
        let sender = match self.config.sub_accounts.default_account {
            DefaultAccount::Sub => state.delegated.or(state.primary),
            DefaultAccount::Universal => state.primary,
        };
        sender.ok_or(PressKitError::NotConnected)
    }

    //=========================================================================
    // Display state
    //=========================================================================

    /// Best-effort reload of rate and counter. On failure the previous
    /// display is kept and the error is recorded, never returned.
    pub async fn refresh(&self) -> Option<DisplayState> {
        let Ok(provider) = self.provider() else {
            debug!("refresh skipped, provider not initialized");
            return None;
        };
        let from = self.active_sender().ok();

        match self.reader.load_state(provider.as_ref(), from).await {
            Ok(chain) => {
                let mut display = DisplayState::default();
                self.state.send_modify(|s| {
                    s.display.apply(chain.rate_bps, chain.presses);
                    display = s.display;
                });
                debug!(rate_bps = chain.rate_bps, presses = chain.presses, "display refreshed");
                Some(display)
            },
            Err(e) => {
                warn!(error = %e, "display refresh failed, keeping previous state");
                self.record_error(&e);
                None
            },
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified on every snapshot change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    //=========================================================================
    // Writes
    //=========================================================================

    /// Start building a press submission
    pub fn press(&self) -> PressAction<'_> {
        PressAction::new(self)
    }

    /// Submit one press with the configured strategy.
    /// `Ok(None)` when there is no sender yet.
    pub async fn submit_press(&self) -> Result<Option<Settlement>> {
        self.press().submit().await
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    //=========================================================================
    // Cancellation
    //=========================================================================

    pub async fn cancellation_token(&self) -> CancellationToken {
        self.cancel.lock().await.clone()
    }

    /// Cancel whatever is running and arm a fresh token for the next run.
    pub async fn cancel_pending(&self) {
        let mut token = self.cancel.lock().await;
        token.cancel();
        *token = CancellationToken::new();
    }

    pub(crate) fn clear_error(&self) {
        self.state.send_if_modified(|s| s.last_error.take().is_some());
    }

    pub(crate) fn record_error(&self, e: &PressKitError) {
        let message = e.to_string();
        self.state.send_modify(|s| s.last_error = Some(message));
    }

    pub(crate) fn publish_busy(&self, busy: bool) {
        self.state.send_if_modified(|s| {
            let changed = s.busy != busy;
            s.busy = busy;
            changed
        });
    }
}
