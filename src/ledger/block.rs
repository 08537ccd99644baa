use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::schedule::YieldSchedule;
use super::seal::{meets_difficulty, seal};
use super::{GENESIS_PAYLOAD, GENESIS_PREVIOUS_SEAL};

/// A single ledger entry.
///
/// Fields are public for inspection. Mutating any sealed field of a block
/// that already sits in a [`super::Chain`] breaks the chain invariant; that
/// divergence is exactly what chain validation detects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: i64, // milliseconds since epoch (UTC)
    pub payload: String,
    pub previous_seal: String,
    pub seal: String,
    pub nonce: u64,
}

impl Block {
    /// Create a block with nonce 0 and its initial seal. No mining is done.
    pub fn new(
        index: u64,
        timestamp: i64,
        payload: impl Into<String>,
        previous_seal: impl Into<String>,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            payload: payload.into(),
            previous_seal: previous_seal.into(),
            seal: String::new(),
            nonce: 0,
        };
        block.seal = block.recompute_seal();
        block
    }

    /// The fixed first entry of a chain.
    pub fn genesis(timestamp: i64) -> Self {
        Self::new(0, timestamp, GENESIS_PAYLOAD, GENESIS_PREVIOUS_SEAL)
    }

    /// Seal of the current fields. Does not touch `self.seal`.
    pub fn recompute_seal(&self) -> String {
        seal(
            self.index,
            &self.previous_seal,
            self.timestamp,
            &self.payload,
            self.nonce,
        )
    }

    /// Stored seal matches the fields.
    pub fn is_sealed(&self) -> bool {
        self.seal == self.recompute_seal()
    }

    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        meets_difficulty(&self.seal, difficulty)
    }

    /// Blocking proof-of-work search.
    ///
    /// Increments `nonce` until the stored seal starts with `difficulty`
    /// zeros. Expected work is about 16^difficulty hashes and there is no
    /// upper bound; run it where unbounded blocking is acceptable.
    pub fn mine_synchronous(&mut self, difficulty: u32) {
        while !self.meets_difficulty(difficulty) {
            self.nonce = self.nonce.wrapping_add(1);
            self.seal = self.recompute_seal();
        }
        debug!(
            "Block #{} mined at difficulty {} (nonce={}, seal={})",
            self.index, difficulty, self.nonce, self.seal
        );
    }

    /// Same search as [`Block::mine_synchronous`], yielding to the async
    /// scheduler every `schedule.interval_for(difficulty)` increments.
    ///
    /// Dropping the future abandons the search; the block is then sealed but
    /// below target, which is a legal intermediate state.
    pub async fn mine_cooperative(&mut self, difficulty: u32, schedule: &YieldSchedule) {
        let Ok(()) = self
            .mine_cooperative_with_progress(difficulty, schedule, |_| {
                Ok::<(), std::convert::Infallible>(())
            })
            .await;
    }

    /// Cooperative search that calls `on_progress` at every yield boundary.
    ///
    /// An `Err` from the callback aborts the search and is returned as is.
    pub async fn mine_cooperative_with_progress<F, E>(
        &mut self,
        difficulty: u32,
        schedule: &YieldSchedule,
        mut on_progress: F,
    ) -> Result<(), E>
    where
        F: FnMut(&Block) -> Result<(), E>,
    {
        let interval = schedule.interval_for(difficulty);
        while !self.meets_difficulty(difficulty) {
            self.nonce = self.nonce.wrapping_add(1);
            self.seal = self.recompute_seal();

            if self.nonce % interval == 0 {
                if let Err(e) = on_progress(&*self) {
                    debug!(
                        "Block #{} mining aborted by progress callback at nonce {}",
                        self.index, self.nonce
                    );
                    return Err(e);
                }
                tokio::task::yield_now().await;
            }
        }
        debug!(
            "Block #{} mined cooperatively at difficulty {} (nonce={}, seal={})",
            self.index, difficulty, self.nonce, self.seal
        );
        Ok(())
    }

    /// Multi-threaded search over the nonces above the current one.
    ///
    /// Worker `k` of `workers` tries `nonce + 1 + k`, stepping by `workers`.
    /// The first worker to find a qualifying seal wins; the others stop and
    /// drop their work. The winner is not necessarily the lowest nonce.
    pub fn mine_parallel(&mut self, difficulty: u32, workers: usize) {
        if self.meets_difficulty(difficulty) {
            return;
        }

        let workers = workers.max(1) as u64;
        let start = self.nonce.wrapping_add(1);
        let found = AtomicBool::new(false);
        let winner: Mutex<Option<(u64, String)>> = Mutex::new(None);

        {
            let this = &*self;
            (0..workers).into_par_iter().for_each(|worker| {
                let mut nonce = start.wrapping_add(worker);
                while !found.load(Ordering::Relaxed) {
                    let candidate = seal(
                        this.index,
                        &this.previous_seal,
                        this.timestamp,
                        &this.payload,
                        nonce,
                    );
                    if meets_difficulty(&candidate, difficulty) {
                        if found
                            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                            .is_ok()
                        {
                            *winner.lock() = Some((nonce, candidate));
                        }
                        break;
                    }
                    nonce = nonce.wrapping_add(workers);
                }
            });
        }

        if let Some((nonce, seal)) = winner.into_inner() {
            self.nonce = nonce;
            self.seal = seal;
            debug!(
                "Block #{} mined by {} workers at difficulty {} (nonce={}, seal={})",
                self.index, workers, difficulty, self.nonce, self.seal
            );
        }
    }
}
