//! Pluggable policies a [`Blockchain`] consults before appending and when
//! asked to check itself. Both are pure predicates over a shared borrow of
//! the chain, so they cannot mutate it.

use serde::Serialize;

use super::Blockchain;

/// Decides whether `data` may become the next block of `chain`.
pub trait DataValidator<T> {
    fn validate(&self, chain: &Blockchain<T>, data: &T) -> bool;
}

/// Decides whether `chain` as a whole is intact.
pub trait ChainValidator<T> {
    fn validate(&self, chain: &Blockchain<T>) -> bool;
}

impl<T, F> DataValidator<T> for F
where
    F: Fn(&Blockchain<T>, &T) -> bool,
{
    fn validate(&self, chain: &Blockchain<T>, data: &T) -> bool {
        self(chain, data)
    }
}

impl<T, F> ChainValidator<T> for F
where
    F: Fn(&Blockchain<T>) -> bool,
{
    fn validate(&self, chain: &Blockchain<T>) -> bool {
        self(chain)
    }
}

/// Accepts any payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl<T> DataValidator<T> for AcceptAll {
    fn validate(&self, _chain: &Blockchain<T>, _data: &T) -> bool {
        true
    }
}

/// Reference integrity policy: every block after genesis must hash to its
/// stored digest and point at its predecessor's digest. The genesis block
/// itself and proof of work are not checked.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkageValidator;

impl<T: Serialize> ChainValidator<T> for LinkageValidator {
    fn validate(&self, chain: &Blockchain<T>) -> bool {
        chain.blocks().windows(2).all(|pair| {
            let (prev, current) = (&pair[0], &pair[1]);
            current.has_consistent_hash() && current.previous_hash() == prev.hash().as_bytes()
        })
    }
}

/// `LinkageValidator` plus a genesis hash check and the chain's difficulty
/// target on every mined block. Genesis is never mined, so it is exempt
/// from the difficulty check.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictValidator;

impl<T: Serialize> ChainValidator<T> for StrictValidator {
    fn validate(&self, chain: &Blockchain<T>) -> bool {
        if !chain.genesis().has_consistent_hash() {
            return false;
        }

        let difficulty = chain.difficulty();
        chain.blocks().windows(2).all(|pair| {
            let (prev, current) = (&pair[0], &pair[1]);
            current.previous_hash() == prev.hash().as_bytes() && current.is_valid(difficulty)
        })
    }
}
