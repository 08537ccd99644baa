pub mod block;
pub mod chain;
pub mod observer;
pub mod schedule;
pub mod seal;

pub use block::Block;
pub use chain::{Chain, InvalidBlock, InvalidReason, validate_blocks};
pub use observer::{ChainEvent, ChainObserver};
pub use schedule::YieldSchedule;

use chrono::Utc;

use crate::error::{LedgerError, Result};

/// Default Proof-of-Work difficulty (number of leading hex zeros).
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// A SHA-256 seal is 64 hex characters; nothing above this can be met.
pub const MAX_DIFFICULTY: u32 = 64;

pub const GENESIS_PAYLOAD: &str = "Genesis Block";

/// Previous-seal sentinel carried by the genesis block.
pub const GENESIS_PREVIOUS_SEAL: &str = "0";

/// Reject difficulties the chain cannot work with.
pub fn check_difficulty(difficulty: u32) -> Result<()> {
    if difficulty < 1 {
        return Err(LedgerError::config("difficulty must be >= 1"));
    }
    if difficulty > MAX_DIFFICULTY {
        return Err(LedgerError::config(format!(
            "difficulty must be <= {MAX_DIFFICULTY}"
        )));
    }
    Ok(())
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
