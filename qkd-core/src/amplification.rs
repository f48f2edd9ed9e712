// SPDX-License-Identifier: MIT
//
// QKD Toolkit: BB84 Key Distribution Simulator
// Copyright (c) 2025 QKD Toolkit Contributors

//! Privacy amplification by XOR folding
//!
//! Each fold XORs the first half of the key onto the second half, halving its length.
//! Folding repeats until the key is no longer than the target, so targets below half the
//! input are reached by extra rounds. An odd-length key loses its last bit on each fold.

use crate::protocol::Bit;

/// One fold: `key[i] ^ key[i + half]` for `i < half`, with `half = len / 2`
pub fn fold_once(key: &[Bit]) -> Vec<Bit> {
    let half = key.len() / 2;
    let (front, back) = key.split_at(half);
    front.iter().zip(back).map(|(&a, &b)| a ^ b).collect()
}

/// Fold `key` until its length is at most `target_length`
///
/// The target defaults to half the input length. Keys shorter than 2 bits are returned
/// unchanged.
pub fn privacy_amplification(key: &[Bit], target_length: Option<usize>) -> Vec<Bit> {
    let target_length = target_length.unwrap_or(key.len() / 2);

    if key.len() < 2 {
        return key.to_vec();
    }

    let mut current = key.to_vec();
    while current.len() > target_length {
        current = fold_once(&current);
    }
    current
}

/// Amplifier with a fixed target length
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivacyAmplifier {
    target_length: Option<usize>,
}

impl PrivacyAmplifier {
    /// Create an amplifier; `None` halves every key
    pub fn new(target_length: Option<usize>) -> Self {
        Self { target_length }
    }

    pub fn amplify(&self, key: &[Bit]) -> Vec<Bit> {
        privacy_amplification(key, self.target_length)
    }

    /// Number of folds needed to bring a key of `len` bits to the target
    pub fn rounds(&self, len: usize) -> usize {
        if len < 2 {
            return 0;
        }
        let target = self.target_length.unwrap_or(len / 2);
        let mut current = len;
        let mut rounds = 0;
        while current > target {
            current /= 2;
            rounds += 1;
        }
        rounds
    }
}
