pub mod block;
pub mod hash;
pub mod model;
pub mod validator;

pub use block::{Block, UnminedBlock};
pub use hash::{BlockHash, HASH_LEN, MAX_DIFFICULTY};
pub use model::Blockchain;
pub use validator::{AcceptAll, ChainValidator, DataValidator, LinkageValidator, StrictValidator};

/// Default Proof-of-Work difficulty (number of leading zeros).
pub const DEFAULT_DIFFICULTY: u32 = 3;

/// Highest difficulty accepted from configuration (keep low in dev to avoid long waits).
pub const DIFF_MAX: u32 = 6;

/// Conventional `previous_hash` for a genesis block: no predecessor.
pub const GENESIS_PREVIOUS_HASH: &[u8] = b"0";
