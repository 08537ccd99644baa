use std::convert::Infallible;
use std::fmt;

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use super::observer::{ChainEvent, ChainObserver};
use super::{Block, GENESIS_PREVIOUS_SEAL, check_difficulty, now_millis};
use crate::config::ChainConfig;
use crate::error::Result;

/// Why a block failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    #[error("stored seal does not match its fields")]
    SealMismatch,
    #[error("previous seal does not match the prior block")]
    BrokenLink,
    #[error("seal does not meet the difficulty target")]
    BelowDifficulty,
    #[error("genesis block has the wrong index or previous seal")]
    MalformedGenesis,
}

/// First block found to break the chain, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[error("block #{index} is invalid: {reason}")]
pub struct InvalidBlock {
    pub index: usize,
    pub reason: InvalidReason,
}

/// In-memory proof-of-work chain.
///
/// Always holds at least the genesis block. New entries only come in through
/// [`Chain::append`] or [`Chain::append_cooperative`], each fully mined and
/// linked before the next one starts.
pub struct Chain {
    entries: Vec<Block>,
    config: ChainConfig,
    observers: Vec<Box<dyn ChainObserver>>,
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("entries", &self.entries)
            .field("config", &self.config)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::from_valid_config(ChainConfig::default())
    }
}

impl Chain {
    /// Initialize a chain with its genesis block.
    ///
    /// Genesis is mined at `config.difficulty` only when `config.mine_genesis`
    /// is set.
    pub fn new(config: ChainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ChainConfig) -> Self {
        let mut genesis = Block::genesis(now_millis());
        if config.mine_genesis {
            genesis.mine_synchronous(config.difficulty);
        }
        Self {
            entries: vec![genesis],
            config,
            observers: Vec::new(),
        }
    }

    /// Return the last block in the chain.
    pub fn latest(&self) -> &Block {
        self.entries
            .last()
            .expect("chain always holds at least the genesis block")
    }

    pub fn blocks(&self) -> &[Block] {
        &self.entries
    }

    /// Mutable view of the stored blocks.
    ///
    /// Blocks can be edited in place but not added or removed. Any edit to a
    /// sealed field breaks the chain invariant and makes [`Chain::validate`]
    /// fail; this is the tamper model the ledger demonstrates.
    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: genesis is always present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    /// Change the difficulty used for future appends.
    pub fn set_difficulty(&mut self, difficulty: u32) -> Result<()> {
        check_difficulty(difficulty)?;
        self.config.difficulty = difficulty;
        Ok(())
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn subscribe(&mut self, observer: impl ChainObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Mine and append a new block carrying `payload`.
    ///
    /// Mining is synchronous and unbounded; see [`Block::mine_synchronous`].
    pub fn append(&mut self, payload: impl Into<String>) -> &Block {
        let mut block = self.next_block(payload.into());
        block.mine_synchronous(self.config.difficulty);
        self.push(block)
    }

    /// Like [`Chain::append`], but mines cooperatively and emits
    /// [`ChainEvent::NonceAdvanced`] at every yield boundary.
    ///
    /// Dropping the future discards the candidate block; the chain is left
    /// untouched.
    pub async fn append_cooperative(&mut self, payload: impl Into<String>) -> &Block {
        let mut block = self.next_block(payload.into());
        {
            let observers = &self.observers;
            let Ok(()) = block
                .mine_cooperative_with_progress(
                    self.config.difficulty,
                    &self.config.yield_schedule,
                    |b| {
                        let event = ChainEvent::NonceAdvanced {
                            index: b.index,
                            nonce: b.nonce,
                            seal: b.seal.clone(),
                        };
                        for o in observers {
                            o.notify(&event);
                        }
                        Ok::<(), Infallible>(())
                    },
                )
                .await;
        }
        self.push(block)
    }

    fn next_block(&self, payload: String) -> Block {
        Block::new(
            self.entries.len() as u64,
            now_millis(),
            payload,
            self.latest().seal.clone(),
        )
    }

    fn push(&mut self, block: Block) -> &Block {
        info!(
            "Appended block #{} (nonce={}, seal={})",
            block.index, block.nonce, block.seal
        );
        let event = ChainEvent::BlockAppended {
            index: block.index,
            seal: block.seal.clone(),
        };
        self.entries.push(block);
        for o in &self.observers {
            o.notify(&event);
        }
        self.latest()
    }

    /// Walk the chain and report the first broken block.
    ///
    /// Every block must have a seal matching its fields, and every block
    /// after genesis must link to its predecessor's seal. With
    /// `Some(difficulty)` each non-genesis seal must also meet that
    /// difficulty (genesis too, when the chain mines it).
    ///
    /// Stricter than a walk starting at index 1: an edited but unresealed
    /// genesis block is reported here.
    pub fn validate(&self, difficulty: Option<u32>) -> std::result::Result<(), InvalidBlock> {
        validate_blocks(&self.entries, difficulty, self.config.mine_genesis)
    }

    /// Validate using the configured policy: the chain's current difficulty
    /// is enforced only when `strict_validation` is on.
    pub fn is_valid(&self) -> bool {
        let difficulty = self
            .config
            .strict_validation
            .then_some(self.config.difficulty);
        self.is_valid_with(difficulty)
    }

    pub fn is_valid_with(&self, difficulty: Option<u32>) -> bool {
        self.validate(difficulty).is_ok()
    }
}

/// Validate a sequence of blocks as [`Chain::validate`] does.
///
/// `genesis_mined` says whether genesis is held to `difficulty`. An empty
/// slice is reported as a malformed genesis.
pub fn validate_blocks(
    blocks: &[Block],
    difficulty: Option<u32>,
    genesis_mined: bool,
) -> std::result::Result<(), InvalidBlock> {
    let result = find_invalid(blocks, difficulty, genesis_mined);
    if let Err(failure) = &result {
        warn!("Chain validation failed: {failure}");
    }
    result
}

fn find_invalid(
    blocks: &[Block],
    difficulty: Option<u32>,
    genesis_mined: bool,
) -> std::result::Result<(), InvalidBlock> {
    let fail = |index, reason| Err(InvalidBlock { index, reason });

    let Some(genesis) = blocks.first() else {
        return fail(0, InvalidReason::MalformedGenesis);
    };
    if genesis.index != 0 || genesis.previous_seal != GENESIS_PREVIOUS_SEAL {
        return fail(0, InvalidReason::MalformedGenesis);
    }
    if !genesis.is_sealed() {
        return fail(0, InvalidReason::SealMismatch);
    }
    if let Some(d) = difficulty {
        if genesis_mined && !genesis.meets_difficulty(d) {
            return fail(0, InvalidReason::BelowDifficulty);
        }
    }

    for (i, pair) in blocks.windows(2).enumerate() {
        let (prev, current) = (&pair[0], &pair[1]);
        let index = i + 1;

        if current.seal != current.recompute_seal() {
            return fail(index, InvalidReason::SealMismatch);
        }
        if current.previous_seal != prev.seal {
            return fail(index, InvalidReason::BrokenLink);
        }
        if let Some(d) = difficulty {
            if !current.meets_difficulty(d) {
                return fail(index, InvalidReason::BelowDifficulty);
            }
        }
    }

    Ok(())
}
