// SPDX-License-Identifier: MIT
//
// QKD Toolkit: BB84 Key Distribution Simulator
// Copyright (c) 2025 QKD Toolkit Contributors

//! BB84 exchange simulation
//!
//! Produces a classical trace of one BB84 exchange with an optional intercept-resend
//! eavesdropper. The run is a chain of pure stages, each returning its own record:
//!
//! ```text
//! encode ──> [intercept] ──> measure ──> sift ──> estimate_qber
//! (Alice)       (Eve)         (Bob)
//! ```
//!
//! # Eavesdropper model
//!
//! When Eve is active Bob measures the qubit Eve resent, so his result follows Eve's basis
//! rather than Alice's. A position can then be sifted (Alice and Bob agree on the basis)
//! and still carry an error, which is what lifts the QBER to roughly 25%.

use crate::protocol::{Basis, Bit, Interception, ProtocolRun};
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Alice's prepared bits and bases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preparation {
    pub bits: Vec<Bit>,
    pub bases: Vec<Basis>,
}

/// Bob's chosen bases and measurement outcomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub bases: Vec<Basis>,
    pub results: Vec<Bit>,
}

/// Positions kept after public basis comparison
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sifting {
    pub matching_indices: Vec<usize>,
    pub sifted_key: Vec<Bit>,
}

fn random_bit<R: Rng + ?Sized>(rng: &mut R) -> Bit {
    rng.gen_range(0..=1)
}

fn random_bases<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Basis> {
    (0..count).map(|_| Basis::random(&mut *rng)).collect()
}

/// Draw Alice's uniform bits, then her uniform bases
pub fn encode<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Preparation {
    let bits = (0..count).map(|_| random_bit(&mut *rng)).collect();
    let bases = random_bases(rng, count);
    Preparation { bits, bases }
}

/// Intercept-resend: Eve learns Alice's bit only where their bases agree
pub fn intercept<R: Rng + ?Sized>(rng: &mut R, alice: &Preparation) -> Interception {
    let bases = random_bases(&mut *rng, alice.bits.len());
    let results = alice
        .bits
        .iter()
        .zip(&alice.bases)
        .zip(&bases)
        .map(|((&bit, &alice_basis), &eve_basis)| {
            if alice_basis == eve_basis {
                bit
            } else {
                random_bit(&mut *rng)
            }
        })
        .collect();
    Interception { bases, results }
}

/// Bob measures whatever reached him: Alice's qubit, or Eve's resent one
pub fn measure<R: Rng + ?Sized>(
    rng: &mut R,
    alice: &Preparation,
    interception: Option<&Interception>,
) -> Measurement {
    let bases = random_bases(&mut *rng, alice.bits.len());
    let (sender_bits, sender_bases) = match interception {
        Some(eve) => (&eve.results, &eve.bases),
        None => (&alice.bits, &alice.bases),
    };

    let results = bases
        .iter()
        .zip(sender_bits.iter().zip(sender_bases))
        .map(|(&bob_basis, (&bit, &sender_basis))| {
            if bob_basis == sender_basis {
                bit
            } else {
                random_bit(&mut *rng)
            }
        })
        .collect();
    Measurement { bases, results }
}

/// Keep Bob's results where Alice's and Bob's bases agree
pub fn sift(alice_bases: &[Basis], bob_bases: &[Basis], bob_results: &[Bit]) -> Sifting {
    let matching_indices: Vec<usize> = alice_bases
        .iter()
        .zip(bob_bases)
        .enumerate()
        .filter(|(_, (a, b))| a == b)
        .map(|(i, _)| i)
        .collect();
    let sifted_key = matching_indices.iter().map(|&i| bob_results[i]).collect();
    Sifting {
        matching_indices,
        sifted_key,
    }
}

/// Fraction of matching positions where Alice's bit and Bob's result differ
///
/// Zero matching positions yield `0.0`.
pub fn estimate_qber(alice_bits: &[Bit], bob_results: &[Bit], matching_indices: &[usize]) -> f64 {
    if matching_indices.is_empty() {
        return 0.0;
    }
    let errors = matching_indices
        .iter()
        .filter(|&&i| alice_bits[i] != bob_results[i])
        .count();
    errors as f64 / matching_indices.len() as f64
}

/// BB84 simulator owning its random source
///
/// Instances share no state, so independent simulators may run on separate threads.
pub struct Simulator {
    qubit_count: u32,
    eavesdropper_present: bool,
    rng: StdRng,
    run: Option<ProtocolRun>,
}

impl Simulator {
    /// Create a simulator; a seed makes every run reproducible
    pub fn new(qubit_count: u32, eavesdropper_present: bool, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(qubit_count, eavesdropper_present, rng)
    }

    /// Create a simulator around an explicit random source
    pub fn with_rng(qubit_count: u32, eavesdropper_present: bool, rng: StdRng) -> Self {
        Self {
            qubit_count,
            eavesdropper_present,
            rng,
            run: None,
        }
    }

    pub fn qubit_count(&self) -> u32 {
        self.qubit_count
    }

    pub fn eavesdropper_present(&self) -> bool {
        self.eavesdropper_present
    }

    /// Execute one exchange and freeze its record
    ///
    /// Running again draws fresh values from the same source and replaces the record.
    pub fn run(&mut self) -> &ProtocolRun {
        let count = self.qubit_count as usize;

        let alice = encode(&mut self.rng, count);
        debug!("Alice prepared {} qubits", count);

        let interception = if self.eavesdropper_present {
            let eve = intercept(&mut self.rng, &alice);
            debug!("Eve intercepted and resent {} qubits", count);
            Some(eve)
        } else {
            None
        };

        let bob = measure(&mut self.rng, &alice, interception.as_ref());
        let sifting = sift(&alice.bases, &bob.bases, &bob.results);
        debug!(
            "Sifting kept {} of {} positions",
            sifting.matching_indices.len(),
            count
        );

        let qber = estimate_qber(&alice.bits, &bob.results, &sifting.matching_indices);
        info!(
            "BB84 run complete: {} qubits, eavesdropper={}, sifted={}, qber={:.4}",
            count,
            self.eavesdropper_present,
            sifting.sifted_key.len(),
            qber
        );

        self.run.insert(ProtocolRun {
            qubit_count: self.qubit_count,
            eavesdropper_present: self.eavesdropper_present,
            alice_bits: alice.bits,
            alice_bases: alice.bases,
            bob_bases: bob.bases,
            bob_results: bob.results,
            interception,
            matching_indices: sifting.matching_indices,
            sifted_key: sifting.sifted_key,
            qber,
            executed: true,
        })
    }

    pub fn has_run(&self) -> bool {
        self.run.is_some()
    }

    /// Result record; before `run()` every array is empty and qber is 0.0
    pub fn summary(&self) -> ProtocolRun {
        self.run
            .clone()
            .unwrap_or_else(|| ProtocolRun::pending(self.qubit_count, self.eavesdropper_present))
    }

    /// Result record, or a precondition error if the simulator has not run
    pub fn try_summary(&self) -> Result<&ProtocolRun> {
        self.run
            .as_ref()
            .ok_or_else(|| Error::Precondition("Run the simulation first".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_runs_are_identical() {
        let mut first = Simulator::new(500, true, Some(1234));
        let mut second = Simulator::new(500, true, Some(1234));
        assert_eq!(first.run(), second.run());
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut first = Simulator::new(500, false, Some(1));
        let mut second = Simulator::new(500, false, Some(2));
        assert_ne!(first.run().alice_bits, second.run().alice_bits);
    }

    #[test]
    fn test_no_eavesdropper_has_zero_qber() {
        let mut sim = Simulator::new(100, false, Some(42));
        let run = sim.run();
        assert_eq!(run.qber, 0.0);
        assert!(run.interception.is_none());
        for &i in &run.matching_indices {
            assert_eq!(run.alice_bits[i], run.bob_results[i]);
        }
        let matches = run.matching_indices.len();
        assert!((30..=70).contains(&matches), "matches = {}", matches);
    }

    #[test]
    fn test_eavesdropper_signature() {
        let mut sim = Simulator::new(10_000, true, Some(42));
        let run = sim.run();
        assert!((run.qber - 0.25).abs() < 0.03, "qber = {}", run.qber);

        let eve = run.interception.as_ref().unwrap();
        assert_eq!(eve.bases.len(), 10_000);
        assert_eq!(eve.results.len(), 10_000);
    }

    #[test]
    fn test_eve_learns_bit_when_bases_agree() {
        let mut sim = Simulator::new(2_000, true, Some(9));
        let run = sim.run();
        let eve_bases = run.eve_bases().unwrap();
        let eve_results = run.eve_results().unwrap();
        for i in 0..run.alice_bits.len() {
            if eve_bases[i] == run.alice_bases[i] {
                assert_eq!(eve_results[i], run.alice_bits[i]);
            }
        }
    }

    #[test]
    fn test_bob_follows_eve_basis() {
        let mut sim = Simulator::new(2_000, true, Some(11));
        let run = sim.run();
        let eve_bases = run.eve_bases().unwrap();
        let eve_results = run.eve_results().unwrap();
        for i in 0..run.bob_results.len() {
            if run.bob_bases[i] == eve_bases[i] {
                assert_eq!(run.bob_results[i], eve_results[i]);
            }
        }
    }

    #[test]
    fn test_zero_qubits_is_empty_run() {
        let mut sim = Simulator::new(0, true, Some(3));
        let run = sim.run();
        assert!(run.alice_bits.is_empty());
        assert!(run.matching_indices.is_empty());
        assert_eq!(run.qber, 0.0);
        assert!(run.is_complete());
    }

    #[test]
    fn test_summary_before_run() {
        let sim = Simulator::new(64, false, Some(5));
        let run = sim.summary();
        assert!(!sim.has_run());
        assert_eq!(run.qubit_count, 64);
        assert!(run.alice_bits.is_empty());
        assert!(run.sifted_key.is_empty());
        assert_eq!(run.qber, 0.0);
        assert!(sim.try_summary().unwrap_err().is_precondition());
    }

    #[test]
    fn test_summary_after_run() {
        let mut sim = Simulator::new(64, false, Some(5));
        let produced = sim.run().clone();
        assert_eq!(sim.summary(), produced);
        assert_eq!(sim.try_summary().unwrap(), &produced);
    }

    #[test]
    fn test_sift_known_bases() {
        use Basis::{Diagonal as X, Rectilinear as Z};
        let sifting = sift(&[Z, X, X, Z, X], &[Z, Z, X, X, X], &[1, 0, 0, 1, 1]);
        assert_eq!(sifting.matching_indices, vec![0, 2, 4]);
        assert_eq!(sifting.sifted_key, vec![1, 0, 1]);
    }

    #[test]
    fn test_estimate_qber() {
        assert_eq!(estimate_qber(&[], &[], &[]), 0.0);
        assert_eq!(estimate_qber(&[1, 0, 1, 1], &[1, 1, 0, 1], &[0, 1, 2, 3]), 0.5);
        assert_eq!(estimate_qber(&[1, 0, 1, 1], &[1, 1, 0, 1], &[0, 3]), 0.0);
    }

    #[test]
    fn test_stage_lengths() {
        let mut rng = StdRng::seed_from_u64(77);
        let alice = encode(&mut rng, 33);
        assert_eq!(alice.bits.len(), 33);
        assert_eq!(alice.bases.len(), 33);
        assert!(alice.bits.iter().all(|&b| b <= 1));

        let bob = measure(&mut rng, &alice, None);
        assert_eq!(bob.bases.len(), 33);
        assert_eq!(bob.results.len(), 33);
    }
}
