use crate::error::{PressKitError, Result};
use alloy_primitives::{Address, U256};
use presskit_interface::BPS_PER_PERCENT;

//=============================================================================
// Rate Formatting
//=============================================================================

/// Basis points to a percentage (425 -> 4.25).
pub fn bps_to_percent(bps: u64) -> f64 {
    bps as f64 / BPS_PER_PERCENT as f64
}

/// Exact two-decimal rendering using integer math (425 -> "4.25%").
pub fn format_bps(bps: u64) -> String {
    format!("{}.{:02}%", bps / BPS_PER_PERCENT, bps % BPS_PER_PERCENT)
}

//=============================================================================
// Conversions
//=============================================================================

/// Narrow an on-chain uint256 to u64, failing as a read error on overflow.
pub fn u256_to_u64(value: U256, what: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| PressKitError::ReadFailure(format!("{what} does not fit in u64: {value}")))
}

/// `0x1234…abcd` form of an address.
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}
