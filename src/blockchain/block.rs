use chrono::Utc;
use log::debug;
use serde::Serialize;

use super::hash::{BlockHash, MAX_DIFFICULTY, digest_fields, serialize_hex};
use crate::error::{LedgerError, MiningError, Result};

/// A block that has not been sealed yet. Only `proof_of_work` moves, and
/// only while `mine` runs.
#[derive(Debug, Clone)]
pub struct UnminedBlock<T> {
    data: T,
    previous_hash: Vec<u8>,
    timestamp: i64, // Unix timestamp (UTC)
    proof_of_work: u64,
}

/// A sealed block. Read-only outside the crate once it exists.
#[derive(Debug, Clone, Serialize)]
pub struct Block<T> {
    pub(crate) data: T,
    pub(crate) hash: BlockHash,
    #[serde(serialize_with = "serialize_hex")]
    pub(crate) previous_hash: Vec<u8>,
    pub(crate) timestamp: i64,
    pub(crate) proof_of_work: u64,
}

impl<T> UnminedBlock<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn previous_hash(&self) -> &[u8] {
        &self.previous_hash
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn proof_of_work(&self) -> u64 {
        self.proof_of_work
    }
}

impl<T: Serialize> UnminedBlock<T> {
    /// Create a draft linked to `previous_hash`, stamped with the current time.
    pub fn new(previous_hash: impl Into<Vec<u8>>, data: T) -> Self {
        Self::with_timestamp(previous_hash, data, Utc::now().timestamp())
    }

    /// Same as `new` but with a caller-chosen timestamp.
    pub fn with_timestamp(previous_hash: impl Into<Vec<u8>>, data: T, timestamp: i64) -> Self {
        Self {
            data,
            previous_hash: previous_hash.into(),
            timestamp,
            proof_of_work: 0,
        }
    }

    /// Hash of the draft as it stands right now.
    pub fn calculate_hash(&self) -> Result<BlockHash> {
        Ok(digest_fields(
            &self.data,
            self.timestamp,
            self.proof_of_work,
            &self.previous_hash,
        )?)
    }

    /// Perform Proof-of-Work: find the smallest `proof_of_work`, counting up
    /// from the current value, whose hash has `difficulty` leading zero hex
    /// digits. The current value is tried first, so difficulty 0 seals at
    /// the starting counter without any increment.
    pub fn mine(mut self, difficulty: u32) -> Result<Block<T>> {
        if difficulty > MAX_DIFFICULTY {
            return Err(MiningError::DifficultyOutOfRange {
                difficulty,
                max: MAX_DIFFICULTY,
            }
            .into());
        }

        loop {
            let hash = self.calculate_hash()?;
            if hash.meets_difficulty(difficulty) {
                debug!(
                    "mined block over {} (pow={}, hash={})",
                    hex::encode(&self.previous_hash),
                    self.proof_of_work,
                    hash
                );
                return Ok(self.into_block(hash));
            }
            self.proof_of_work = self
                .proof_of_work
                .checked_add(1)
                .ok_or(LedgerError::Mining(MiningError::NonceExhausted))?;
        }
    }

    /// Hash without mining. Used for the genesis block.
    pub(crate) fn seal(self) -> std::result::Result<Block<T>, serde_json::Error> {
        let hash = digest_fields(
            &self.data,
            self.timestamp,
            self.proof_of_work,
            &self.previous_hash,
        )?;
        Ok(self.into_block(hash))
    }

    fn into_block(self, hash: BlockHash) -> Block<T> {
        Block {
            data: self.data,
            hash,
            previous_hash: self.previous_hash,
            timestamp: self.timestamp,
            proof_of_work: self.proof_of_work,
        }
    }
}

impl<T> Block<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    pub fn previous_hash(&self) -> &[u8] {
        &self.previous_hash
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn proof_of_work(&self) -> u64 {
        self.proof_of_work
    }

    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        self.hash.meets_difficulty(difficulty)
    }
}

impl<T: Serialize> Block<T> {
    /// Recompute the hash from the block's current fields (ignores the
    /// stored `hash`).
    pub fn calculate_hash(&self) -> Result<BlockHash> {
        Ok(digest_fields(
            &self.data,
            self.timestamp,
            self.proof_of_work,
            &self.previous_hash,
        )?)
    }

    /// Whether the stored hash still matches the block's content.
    pub fn has_consistent_hash(&self) -> bool {
        matches!(self.calculate_hash(), Ok(h) if h == self.hash)
    }

    /// Validate that the stored `hash` matches the content and satisfies the
    /// PoW difficulty. (Does NOT validate chain linkage.)
    pub fn is_valid(&self, difficulty: u32) -> bool {
        self.has_consistent_hash() && self.meets_difficulty(difficulty)
    }
}
