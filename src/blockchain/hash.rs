use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a SHA-256 digest in bytes.
pub const HASH_LEN: usize = 32;

/// Number of hex digits in a digest, i.e. the highest meaningful difficulty.
pub const MAX_DIFFICULTY: u32 = (HASH_LEN * 2) as u32;

/// A 32-byte SHA-256 block digest. Shown and serialized as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHash([u8; HASH_LEN]);

impl BlockHash {
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Count of leading `'0'` characters in the hex form, without
    /// allocating the string.
    pub fn leading_zero_digits(&self) -> u32 {
        let mut zeros = 0;
        for byte in self.0 {
            if byte == 0 {
                zeros += 2;
                continue;
            }
            if byte >> 4 == 0 {
                zeros += 1;
            }
            break;
        }
        zeros
    }

    /// True when the hex form starts with at least `difficulty` zeros.
    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        self.leading_zero_digits() >= difficulty
    }
}

impl AsRef<[u8]> for BlockHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.to_hex())
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Hash a block's fields. The preimage is laid out as
///
/// ```text
/// json(data) || decimal(timestamp) || decimal(proof_of_work) || previous_hash
/// ```
///
/// where `json` is compact `serde_json` output and the decimals are plain
/// ASCII with no padding or separators.
pub(crate) fn digest_fields<T: Serialize>(
    data: &T,
    timestamp: i64,
    proof_of_work: u64,
    previous_hash: &[u8],
) -> Result<BlockHash, serde_json::Error> {
    let data_json = serde_json::to_vec(data)?;

    let mut hasher = Sha256::new();
    hasher.update(&data_json);
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(proof_of_work.to_string().as_bytes());
    hasher.update(previous_hash);

    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&hasher.finalize());
    Ok(BlockHash(out))
}

pub(crate) fn serialize_hex<B, S>(bytes: &B, serializer: S) -> Result<S::Ok, S::Error>
where
    B: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes.as_ref()))
}
