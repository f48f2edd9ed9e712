// SPDX-License-Identifier: MIT
//
// QKD Toolkit: BB84 Key Distribution Simulator
// Copyright (c) 2025 QKD Toolkit Contributors

//! Parity-block reconciliation
//!
//! A non-interactive detect-and-drop scheme: both keys are cut into fixed-size blocks and
//! a block pair survives only if its parities agree. No bit is ever corrected. A block
//! holding an even number of errors has matching parities and passes through unchanged.

use crate::{protocol::Bit, Error, Result, DEFAULT_BLOCK_SIZE};
use tracing::debug;

/// Parity of a block (sum of bits mod 2)
pub fn parity(block: &[Bit]) -> Bit {
    block.iter().fold(0, |acc, &bit| acc ^ (bit & 1))
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciled {
    /// Bob's bits from every kept block, in block order
    pub key: Vec<Bit>,

    /// Full block pairs whose parities agreed
    pub kept_blocks: usize,

    /// Full block pairs dropped for a parity mismatch
    pub discarded_blocks: usize,

    /// Trailing bits of the shorter key that did not fill a block
    pub dropped_tail_bits: usize,
}

/// Parity-block reconciler with a fixed block size
#[derive(Debug, Clone, Copy)]
pub struct ParityReconciler {
    block_size: usize,
}

impl Default for ParityReconciler {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl ParityReconciler {
    /// Create a reconciler; a zero block size is rejected
    pub fn new(block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::Config("block_size must be > 0".to_string()));
        }
        Ok(Self { block_size })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Reconcile Bob's key against Alice's
    ///
    /// Blocks are paired in order while both keys still have one; a pair where either
    /// block is short, i.e. the tail of the shorter key, is dropped.
    pub fn reconcile(&self, alice_key: &[Bit], bob_key: &[Bit]) -> Reconciled {
        let mut outcome = Reconciled::default();

        for (index, (alice_block, bob_block)) in alice_key
            .chunks(self.block_size)
            .zip(bob_key.chunks(self.block_size))
            .enumerate()
        {
            if alice_block.len() != self.block_size || bob_block.len() != self.block_size {
                continue;
            }

            if parity(alice_block) == parity(bob_block) {
                outcome.key.extend_from_slice(bob_block);
                outcome.kept_blocks += 1;
            } else {
                debug!("Discarding block {} on parity mismatch", index);
                outcome.discarded_blocks += 1;
            }
        }

        let paired_bits = (outcome.kept_blocks + outcome.discarded_blocks) * self.block_size;
        outcome.dropped_tail_bits = alice_key.len().min(bob_key.len()) - paired_bits;
        outcome
    }
}

/// Reconcile with the default block size of 4, returning only the key
pub fn parity_reconciliation(alice_key: &[Bit], bob_key: &[Bit]) -> Vec<Bit> {
    ParityReconciler::default().reconcile(alice_key, bob_key).key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parity() {
        assert_eq!(parity(&[]), 0);
        assert_eq!(parity(&[1, 0, 0, 0]), 1);
        assert_eq!(parity(&[1, 1, 0, 1]), 1);
        assert_eq!(parity(&[1, 1, 1, 1]), 0);
    }

    #[test]
    fn test_matching_blocks_keep_bob_bits() {
        let alice = vec![1, 0, 1, 1, 0, 0, 1, 0];
        let bob = alice.clone();
        assert_eq!(parity_reconciliation(&alice, &bob), bob);
    }

    #[test]
    fn test_even_errors_pass_undetected() {
        let alice = vec![1, 0, 1, 1, 0, 0, 1, 0];
        let bob = vec![0, 1, 1, 1, 0, 0, 1, 0];
        assert_eq!(parity_reconciliation(&alice, &bob), bob);
    }

    #[test]
    fn test_mismatched_block_is_dropped() {
        let alice = vec![1, 0, 1, 1, 0, 0, 1, 0];
        let bob = vec![1, 0, 1, 1, 1, 0, 1, 0];
        let outcome = ParityReconciler::default().reconcile(&alice, &bob);
        assert_eq!(outcome.key, vec![1, 0, 1, 1]);
        assert_eq!(outcome.kept_blocks, 1);
        assert_eq!(outcome.discarded_blocks, 1);
    }

    #[test]
    fn test_trailing_partial_block_is_dropped() {
        let alice = vec![1, 0, 1, 1, 0, 0, 1, 0, 1];
        let bob = alice.clone();
        let outcome = ParityReconciler::default().reconcile(&alice, &bob);
        assert_eq!(outcome.key, alice[..8].to_vec());
        assert_eq!(outcome.dropped_tail_bits, 1);
    }

    #[test]
    fn test_uneven_inputs_pair_only_common_blocks() {
        let alice = vec![0, 1, 1, 0, 1, 1, 1, 1, 0, 0, 0, 0];
        let bob = vec![0, 1, 1, 0, 1, 1];
        let outcome = ParityReconciler::default().reconcile(&alice, &bob);
        assert_eq!(outcome.key, vec![0, 1, 1, 0]);
        assert_eq!(outcome.kept_blocks, 1);
        assert_eq!(outcome.dropped_tail_bits, 2);
    }

    #[test]
    fn test_custom_block_size() {
        let reconciler = ParityReconciler::new(3).unwrap();
        let alice = vec![1, 1, 0, 0, 0, 1, 1];
        let bob = vec![1, 1, 0, 1, 0, 1, 1];
        let outcome = reconciler.reconcile(&alice, &bob);
        assert_eq!(outcome.key, vec![1, 1, 0]);
        assert_eq!(outcome.key.len() % reconciler.block_size(), 0);
    }

    #[test]
    fn test_zero_block_size_rejected() {
        assert!(ParityReconciler::new(0).unwrap_err().is_config_error());
    }

    #[test]
    fn test_empty_input() {
        let outcome = ParityReconciler::default().reconcile(&[], &[]);
        assert!(outcome.key.is_empty());
        assert_eq!(outcome.dropped_tail_bits, 0);
    }
}
