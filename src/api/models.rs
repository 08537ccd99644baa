use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::ledger::{Block, Chain, InvalidBlock, validate_blocks};

/// Read-only copy of the chain, republished after every change.
#[derive(Debug, Clone)]
pub struct ChainSnapshot {
    pub blocks: Vec<Block>,
    pub difficulty: u32,
    pub strict_validation: bool,
    pub genesis_mined: bool,
}

impl ChainSnapshot {
    pub fn of(chain: &Chain) -> Self {
        let config = chain.config();
        Self {
            blocks: chain.blocks().to_vec(),
            difficulty: config.difficulty,
            strict_validation: config.strict_validation,
            genesis_mined: config.mine_genesis,
        }
    }

    /// Validate with the chain's configured policy.
    pub fn validate(&self) -> Result<(), InvalidBlock> {
        validate_blocks(
            &self.blocks,
            self.strict_validation.then_some(self.difficulty),
            self.genesis_mined,
        )
    }
}

/// Shared application state.
///
/// Writers serialize on the chain mutex, which an append holds for the
/// whole mining run. Readers only touch the published snapshot, so they
/// never wait on mining.
#[derive(Debug)]
pub struct AppState {
    chain: Mutex<Chain>,
    snapshot: RwLock<Arc<ChainSnapshot>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Chain::default())
    }
}

impl AppState {
    pub fn new(chain: Chain) -> Self {
        let snapshot = Arc::new(ChainSnapshot::of(&chain));
        Self {
            chain: Mutex::new(chain),
            snapshot: RwLock::new(snapshot),
        }
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<ChainSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Run `f` with exclusive access to the chain, then publish a fresh
    /// snapshot. Waits for any append in progress; call it off the async
    /// workers (`web::block`) when that wait can be long.
    pub fn with_chain<R>(&self, f: impl FnOnce(&mut Chain) -> R) -> R {
        let mut chain = self.chain.lock();
        let out = f(&mut chain);
        *self.snapshot.write() = Arc::new(ChainSnapshot::of(&chain));
        out
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub length: usize,
    pub difficulty: u32,
    pub chain: &'a [Block],
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub strict: bool,
    pub length: usize,
    pub difficulty: u32,
    pub failure: Option<InvalidBlock>,
}

#[derive(Deserialize)]
pub struct AppendRequest {
    pub payload: String,
}

#[derive(Serialize)]
pub struct AppendResponse {
    pub index: u64,
    pub seal: String,
    pub nonce: u64,
    pub difficulty: u32,
}

#[derive(Serialize)]
pub struct DifficultyResponse {
    pub difficulty: u32,
}

#[derive(Deserialize)]
pub struct SetDifficultyRequest {
    pub difficulty: u32,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub height: usize,
    pub difficulty: u32,
    pub stats_window: usize,
    pub last_interval_ms: Option<i64>,
    pub avg_interval_ms: Option<f64>,
    pub total_nonces: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_republished_after_each_write() {
        let state = AppState::default();
        let before = state.snapshot();
        assert_eq!(before.blocks.len(), 1);

        state.with_chain(|chain| {
            chain.set_difficulty(1).unwrap();
            chain.append("a");
        });
        let after = state.snapshot();
        assert_eq!(after.blocks.len(), 2);
        assert_eq!(after.difficulty, 1);
        assert!(after.validate().is_ok());
        // earlier snapshots are immutable copies
        assert_eq!(before.blocks.len(), 1);

        state.with_chain(|chain| chain.blocks_mut()[1].payload = "forged".into());
        assert_eq!(state.snapshot().validate().unwrap_err().index, 1);
    }
}
