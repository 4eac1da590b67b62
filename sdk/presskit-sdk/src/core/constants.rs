use presskit_interface::CHAIN_ID;

pub const DEFAULT_APP_NAME: &str = "Beat Powell";
pub const DEFAULT_APP_LOGO_URL: &str = "https://base.org/logo.png";
pub const DEFAULT_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_CHAIN_ID: u64 = CHAIN_ID;

// Poller: one status query per second, give up after about a minute
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_POLL_MAX_TRIES: u32 = 60;

/// EIP-5792 request version sent with `wallet_sendCalls`.
pub const SEND_CALLS_VERSION: &str = "2.0.0";

/// Account payload version for `wallet_addSubAccount`.
pub const SUB_ACCOUNT_VERSION: &str = "1";

/// Full-scale rate of the display gauge (5.00%).
pub const GAUGE_FULL_SCALE_BPS: u64 = 500;
