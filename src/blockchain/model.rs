use log::info;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

use super::hash::MAX_DIFFICULTY;
use super::validator::{ChainValidator, DataValidator};
use super::{Block, UnminedBlock};
use crate::error::{LedgerError, MiningError, Result};

/// In-memory append-only chain of proof-of-work blocks.
///
/// `add_block` takes `&mut self`; sharing a chain between threads needs a
/// lock held across the whole read-tail / mine / append sequence.
pub struct Blockchain<T> {
    pub(crate) blocks: Vec<Block<T>>,
    difficulty: u32,
    chain_validator: Box<dyn ChainValidator<T> + Send + Sync>,
    data_validator: Box<dyn DataValidator<T> + Send + Sync>,
}

impl<T: Serialize> Blockchain<T> {
    /// Start a chain from `genesis`. The genesis block is hashed as-is and
    /// never mined, so its proof of work stays at 0. A difficulty no digest
    /// can meet is refused up front.
    pub fn new<C, D>(
        genesis: UnminedBlock<T>,
        chain_validator: C,
        data_validator: D,
        difficulty: u32,
    ) -> Result<Self>
    where
        C: ChainValidator<T> + Send + Sync + 'static,
        D: DataValidator<T> + Send + Sync + 'static,
    {
        if difficulty > MAX_DIFFICULTY {
            return Err(MiningError::DifficultyOutOfRange {
                difficulty,
                max: MAX_DIFFICULTY,
            }
            .into());
        }

        let genesis = genesis.seal().map_err(LedgerError::Hash)?;
        info!("genesis block sealed (hash={}, difficulty={difficulty})", genesis.hash());

        Ok(Self {
            blocks: vec![genesis],
            difficulty,
            chain_validator: Box::new(chain_validator),
            data_validator: Box::new(data_validator),
        })
    }

    /// Validate `data`, mine a block for it on top of the current tail and
    /// append it. Nothing changes if any step fails.
    pub fn add_block(&mut self, data: T) -> Result<&Block<T>> {
        let height = self.blocks.len();
        if !DataValidator::validate(self.data_validator.as_ref(), self, &data) {
            return Err(LedgerError::Validation { height });
        }

        let prev_hash = self.last_block().hash().as_bytes().to_vec();
        let block = UnminedBlock::new(prev_hash, data).mine(self.difficulty)?;

        info!(
            "sealed block #{height} (hash={}, pow={})",
            block.hash(),
            block.proof_of_work()
        );
        self.blocks.push(block);
        Ok(self.last_block())
    }
}

impl<T> Blockchain<T> {
    /// Run the injected chain validator over the whole chain.
    pub fn is_valid(&self) -> bool {
        ChainValidator::validate(self.chain_validator.as_ref(), self)
    }

    pub fn blocks(&self) -> &[Block<T>] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block<T>> {
        self.blocks.iter()
    }

    pub fn genesis(&self) -> &Block<T> {
        &self.blocks[0]
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block<T> {
        self.blocks
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: a chain holds at least its genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }
}

impl<'a, T> IntoIterator for &'a Blockchain<T> {
    type Item = &'a Block<T>;
    type IntoIter = std::slice::Iter<'a, Block<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for Blockchain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blockchain")
            .field("blocks", &self.blocks)
            .field("difficulty", &self.difficulty)
            .finish_non_exhaustive()
    }
}

impl<T: Serialize> Serialize for Blockchain<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Blockchain", 3)?;
        state.serialize_field("length", &self.len())?;
        state.serialize_field("difficulty", &self.difficulty)?;
        state.serialize_field("chain", &self.blocks)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::Blockchain;
    use crate::blockchain::{
        AcceptAll, ChainValidator, DataValidator, GENESIS_PREVIOUS_HASH, LinkageValidator,
        UnminedBlock,
    };
    use crate::error::{LedgerError, MiningError};
    use chrono::Utc;
    use serde::Serialize;
    use serde_json::{Value, json};
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct User {
        name: String,
        age: u32,
    }

    /// Payload shapes a user registry chain can carry.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(tag = "kind")]
    enum Record {
        Genesis { is_genesis: bool },
        User(User),
    }

    struct UserDataValidator;

    impl DataValidator<Record> for UserDataValidator {
        fn validate(&self, _chain: &Blockchain<Record>, data: &Record) -> bool {
            matches!(data, Record::User(_))
        }
    }

    /// Genesis must be the marker record, then the reference linkage rules.
    struct UserChainValidator;

    impl ChainValidator<Record> for UserChainValidator {
        fn validate(&self, chain: &Blockchain<Record>) -> bool {
            if *chain.genesis().data() != (Record::Genesis { is_genesis: true }) {
                return false;
            }
            ChainValidator::validate(&LinkageValidator, chain)
        }
    }

    fn user(name: &str, age: u32) -> Record {
        Record::User(User {
            name: name.into(),
            age,
        })
    }

    fn user_chain(difficulty: u32) -> Blockchain<Record> {
        let genesis = UnminedBlock::new(
            GENESIS_PREVIOUS_HASH.to_vec(),
            Record::Genesis { is_genesis: true },
        );
        Blockchain::new(genesis, UserChainValidator, UserDataValidator, difficulty).unwrap()
    }

    fn value_chain(difficulty: u32) -> Blockchain<Value> {
        let genesis = UnminedBlock::new(GENESIS_PREVIOUS_HASH.to_vec(), json!({"isGenesis": true}));
        Blockchain::new(genesis, LinkageValidator, AcceptAll, difficulty).unwrap()
    }

    #[test]
    fn new_chain_holds_only_unmined_genesis() {
        let bc = user_chain(2);
        assert_eq!(bc.difficulty(), 2);
        assert_eq!(bc.len(), 1);
        assert!(!bc.is_empty());

        let genesis = bc.genesis();
        assert_eq!(genesis.proof_of_work(), 0);
        assert_eq!(genesis.previous_hash(), GENESIS_PREVIOUS_HASH);
        assert_eq!(*genesis.hash(), genesis.calculate_hash().unwrap());
        assert!(bc.is_valid());
    }

    #[test]
    fn add_block_mines_and_links() {
        let mut bc = user_chain(2);
        bc.add_block(user("Iwo", 20)).unwrap();
        bc.add_block(user("Agness", 22)).unwrap();
        let last = bc.add_block(user("Ty", 58)).unwrap();

        assert!(last.hash().to_hex().starts_with("00"));
        assert_eq!(bc.len(), 4);
        for pair in bc.blocks().windows(2) {
            assert_eq!(pair[1].previous_hash(), pair[0].hash().as_bytes());
        }
        assert!(bc.is_valid());
    }

    #[test]
    fn scenario_two_appends_at_difficulty_one() {
        let mut bc = value_chain(1);
        bc.add_block(json!({"name": "a"})).unwrap();
        bc.add_block(json!({"name": "b"})).unwrap();

        assert_eq!(bc.len(), 3);
        assert_eq!(bc.blocks()[2].previous_hash(), bc.blocks()[1].hash().as_bytes());
        assert!(bc.is_valid());
    }

    #[test]
    fn corrupted_data_without_rehash_is_detected() {
        let mut bc = value_chain(1);
        bc.add_block(json!({"name": "a"})).unwrap();
        bc.add_block(json!({"name": "b"})).unwrap();

        bc.blocks[1].data = json!({"corrupted": true});
        assert!(!bc.is_valid());
    }

    #[test]
    fn rehashed_tamper_breaks_successor_link() {
        let mut bc = value_chain(1);
        bc.add_block(json!({"name": "a"})).unwrap();
        bc.add_block(json!({"name": "b"})).unwrap();

        bc.blocks[1].timestamp += 1;
        bc.blocks[1].hash = bc.blocks[1].calculate_hash().unwrap();
        assert!(!bc.is_valid());
    }

    #[test]
    fn custom_genesis_rule_is_enforced() {
        let mut bc = user_chain(1);
        bc.add_block(user("Iwo", 20)).unwrap();
        assert!(bc.is_valid());

        bc.blocks[0].data = Record::Genesis { is_genesis: false };
        assert!(!bc.is_valid());
    }

    #[test]
    fn rejected_data_leaves_chain_untouched() {
        let mut bc = user_chain(1);
        let tail = *bc.last_block().hash();

        let err = bc.add_block(Record::Genesis { is_genesis: true }).unwrap_err();
        assert!(matches!(err, LedgerError::Validation { height: 1 }));
        assert_eq!(bc.len(), 1);
        assert_eq!(*bc.last_block().hash(), tail);
    }

    #[test]
    fn unreachable_difficulty_fails_construction() {
        let genesis = UnminedBlock::new(GENESIS_PREVIOUS_HASH.to_vec(), json!({"isGenesis": true}));
        let err = Blockchain::new(genesis, LinkageValidator, AcceptAll, 1000).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Mining(MiningError::DifficultyOutOfRange {
                difficulty: 1000,
                max: 64
            })
        ));

        let genesis = UnminedBlock::new(GENESIS_PREVIOUS_HASH.to_vec(), json!({"isGenesis": true}));
        assert!(Blockchain::new(genesis, LinkageValidator, AcceptAll, 64).is_ok());
    }

    #[test]
    fn serialization_failure_leaves_chain_untouched() {
        let genesis = UnminedBlock::new(GENESIS_PREVIOUS_HASH.to_vec(), BTreeMap::new());
        let mut bc: Blockchain<BTreeMap<Vec<u8>, String>> =
            Blockchain::new(genesis, LinkageValidator, AcceptAll, 1).unwrap();

        let mut data = BTreeMap::new();
        data.insert(vec![7u8], "not a json key".to_string());
        let err = bc.add_block(data).unwrap_err();
        assert!(matches!(err, LedgerError::Serialization(_)));
        assert_eq!(bc.len(), 1);
    }

    #[test]
    fn unhashable_genesis_fails_construction() {
        let mut data = BTreeMap::new();
        data.insert(vec![0u8], true);
        let genesis = UnminedBlock::new(GENESIS_PREVIOUS_HASH.to_vec(), data);

        let err = Blockchain::new(genesis, LinkageValidator, AcceptAll, 1).unwrap_err();
        assert!(matches!(err, LedgerError::Hash(_)));
    }

    #[test]
    fn difficulty_zero_appends_at_pow_zero() {
        let mut bc = value_chain(0);
        let block = bc.add_block(json!({"name": "a"})).unwrap();
        assert_eq!(block.proof_of_work(), 0);
        assert!(bc.is_valid());
    }

    #[test]
    fn appended_block_is_stamped_at_append_time() {
        let mut bc = value_chain(1);
        let before = Utc::now().timestamp();
        let stamped = bc.add_block(json!({"name": "a"})).unwrap().timestamp();
        let after = Utc::now().timestamp();

        assert!((before..=after).contains(&stamped));
        assert_eq!(bc.len(), 2);
    }

    #[test]
    fn chain_serializes_with_length_and_difficulty() {
        let mut bc = value_chain(1);
        bc.add_block(json!({"name": "a"})).unwrap();

        let value = serde_json::to_value(&bc).unwrap();
        assert_eq!(value["length"], json!(2));
        assert_eq!(value["difficulty"], json!(1));
        assert_eq!(value["chain"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["chain"][1]["data"], json!({"name": "a"}));
    }
}
