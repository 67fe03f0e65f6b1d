//! Append-only, hash-chained ledger with a proof-of-work gate on appends.
//!
//! ```
//! use pow_ledger::blockchain::{AcceptAll, Blockchain, LinkageValidator, UnminedBlock};
//! use serde_json::json;
//!
//! let genesis = UnminedBlock::new(b"0".to_vec(), json!({"isGenesis": true}));
//! let mut chain = Blockchain::new(genesis, LinkageValidator, AcceptAll, 1)?;
//! chain.add_block(json!({"name": "a"}))?;
//! assert!(chain.is_valid());
//! # Ok::<(), pow_ledger::LedgerError>(())
//! ```

pub mod blockchain;
pub mod config;
pub mod error;

pub use blockchain::{Block, BlockHash, Blockchain, UnminedBlock};
pub use config::Config;
pub use error::{LedgerError, MiningError, Result};
