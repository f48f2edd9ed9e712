// SPDX-License-Identifier: MIT
//
// QKD Toolkit: BB84 Key Distribution Simulator
// Copyright (c) 2025 QKD Toolkit Contributors

//! Property-based tests for qkd-core.
//!
//! Uses proptest to check the invariants of simulation and post-processing across
//! random inputs.

use proptest::prelude::*;
use qkd_core::amplification::privacy_amplification;
use qkd_core::pipeline::apply_post_processing;
use qkd_core::reconciliation::parity_reconciliation;
use qkd_core::Simulator;

fn bits(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..=1, 0..max_len)
}

fn key_pair(max_len: usize) -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (0..max_len).prop_flat_map(|len| {
        (
            prop::collection::vec(0u8..=1, len),
            prop::collection::vec(0u8..=1, len),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // =========================================================================
    // simulator properties
    // =========================================================================

    #[test]
    fn prop_sifting_lengths(qubits in 0u32..2_000, eve: bool, seed: u64) {
        let mut sim = Simulator::new(qubits, eve, Some(seed));
        let run = sim.run();

        prop_assert!(run.matching_indices.len() <= qubits as usize);
        prop_assert_eq!(run.sifted_key.len(), run.matching_indices.len());
        prop_assert_eq!(run.alice_bits.len(), qubits as usize);
        prop_assert_eq!(run.bob_results.len(), qubits as usize);
        prop_assert!(run.matching_indices.windows(2).all(|w| w[0] < w[1]));
        prop_assert!((0.0..=1.0).contains(&run.qber));
        prop_assert_eq!(run.interception.is_some(), eve);
    }

    #[test]
    fn prop_seeded_runs_are_deterministic(qubits in 0u32..1_000, eve: bool, seed: u64) {
        let mut first = Simulator::new(qubits, eve, Some(seed));
        let mut second = Simulator::new(qubits, eve, Some(seed));
        prop_assert_eq!(first.run(), second.run());
    }

    #[test]
    fn prop_no_eavesdropper_no_errors(qubits in 0u32..2_000, seed: u64) {
        let mut sim = Simulator::new(qubits, false, Some(seed));
        let run = sim.run();

        prop_assert_eq!(run.qber, 0.0);
        prop_assert_eq!(run.alice_sifted_key(), run.sifted_key.clone());
    }

    // =========================================================================
    // post-processing properties
    // =========================================================================

    #[test]
    fn prop_reconciled_length_is_block_multiple((alice, bob) in key_pair(64)) {
        let reconciled = parity_reconciliation(&alice, &bob);
        prop_assert_eq!(reconciled.len() % 4, 0);
        prop_assert!(reconciled.len() <= alice.len() / 4 * 4);
    }

    #[test]
    fn prop_identical_keys_survive_reconciliation(key in bits(64)) {
        let reconciled = parity_reconciliation(&key, &key);
        prop_assert_eq!(reconciled.as_slice(), &key[..key.len() / 4 * 4]);
    }

    #[test]
    fn prop_folding_reaches_target(key in bits(128), target in 0usize..64) {
        let folded = privacy_amplification(&key, Some(target));
        if key.len() < 2 {
            prop_assert_eq!(folded, key);
        } else {
            prop_assert!(folded.len() <= target);
            prop_assert!(folded.len() <= key.len());
        }
    }

    #[test]
    fn prop_default_folding_halves(key in bits(128)) {
        let folded = privacy_amplification(&key, None);
        if key.len() >= 2 {
            prop_assert_eq!(folded.len(), key.len() / 2);
        }
    }

    #[test]
    fn prop_post_processing_is_idempotent((alice, bob) in key_pair(96)) {
        let first = apply_post_processing(&alice, &bob);
        let second = apply_post_processing(&alice, &bob);
        prop_assert!(first.len() <= bob.len());
        prop_assert_eq!(first, second);
    }
}
