use log::{info, warn};
use serde::Serialize;
use std::env;
use std::error::Error;

use pow_ledger::blockchain::{Blockchain, GENESIS_PREVIOUS_HASH, StrictValidator, UnminedBlock};
use pow_ledger::{Config, LedgerError};

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Entry {
    Genesis { note: Option<String> },
    Note { text: String },
}

fn non_empty_note(_chain: &Blockchain<Entry>, entry: &Entry) -> bool {
    matches!(entry, Entry::Note { text } if !text.trim().is_empty())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let config = Config::from_env();

    println!("⛓️ Starting ledger at difficulty {}", config.difficulty);

    let genesis = UnminedBlock::new(
        GENESIS_PREVIOUS_HASH.to_vec(),
        Entry::Genesis {
            note: config.genesis_note.clone(),
        },
    );
    let mut chain = Blockchain::new(genesis, StrictValidator, non_empty_note, config.difficulty)?;

    for text in env::args().skip(1) {
        match chain.add_block(Entry::Note { text }) {
            Ok(block) => {
                let pow = block.proof_of_work();
                info!("appended block #{} (pow={pow})", chain.len() - 1);
            }
            Err(LedgerError::Validation { height }) => {
                warn!("skipping empty entry for block #{height}")
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("{}", serde_json::to_string_pretty(&chain)?);
    println!("valid: {}", chain.is_valid());
    Ok(())
}
