//! In-memory proof-of-work ledger.
//!
//! A [`Chain`] of hash-sealed [`Block`]s where every appended block is mined
//! until its SHA-256 seal starts with `difficulty` hex zeros, and the whole
//! sequence can be re-walked to detect tampering.

pub mod api;
pub mod config;
pub mod error;
pub mod ledger;

pub use config::{ChainConfig, ServerConfig};
pub use error::{LedgerError, Result};
pub use ledger::{
    Block, Chain, ChainEvent, ChainObserver, InvalidBlock, InvalidReason, YieldSchedule,
};
