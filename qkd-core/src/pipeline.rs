// SPDX-License-Identifier: MIT
//
// QKD Toolkit: BB84 Key Distribution Simulator
// Copyright (c) 2025 QKD Toolkit Contributors

//! Post-processing orchestration
//!
//! Chains reconciliation and privacy amplification, with optional SHA-256 compression on
//! the end. Two entry points are provided:
//!
//! - [`apply_post_processing`] runs the default pipeline and tolerates any input, absorbing
//!   uneven lengths and short keys silently.
//! - [`PostProcessor`] is configurable and checked: it refuses mismatched key lengths and
//!   runs that never executed, and reports the key length after each stage.

use crate::amplification::PrivacyAmplifier;
use crate::config::PostProcessingConfig;
use crate::crypto::sha256_hash_bits;
use crate::protocol::{Bit, ProtocolRun};
use crate::reconciliation::{ParityReconciler, Reconciled};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Key length after each stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageLengths {
    pub sifted: usize,
    pub reconciled: usize,
    pub amplified: usize,
    /// Set only when hash compression ran
    pub hashed: Option<usize>,
}

/// Final key together with its per-stage report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistilledKey {
    pub key: Vec<Bit>,
    pub stages: StageLengths,
    pub reconciliation: Reconciled,
}

/// Reconcile then amplify with default parameters
///
/// Stage lengths are reported through the log only. Hash compression never runs here.
pub fn apply_post_processing(alice_key: &[Bit], bob_key: &[Bit]) -> Vec<Bit> {
    info!("Post-processing raw key of length {}", bob_key.len());

    let reconciled = ParityReconciler::default().reconcile(alice_key, bob_key).key;
    info!("Key length after parity check: {}", reconciled.len());

    let final_key = PrivacyAmplifier::default().amplify(&reconciled);
    info!("Key length after privacy amplification: {}", final_key.len());

    final_key
}

/// Configurable, checked post-processing pipeline
#[derive(Debug, Clone, Default)]
pub struct PostProcessor {
    reconciler: ParityReconciler,
    amplifier: PrivacyAmplifier,
    hash_bits: Option<usize>,
}

impl PostProcessor {
    /// Build a pipeline from validated configuration
    pub fn new(config: &PostProcessingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reconciler: ParityReconciler::new(config.block_size)?,
            amplifier: PrivacyAmplifier::new(config.target_length),
            hash_bits: config.hash_bits,
        })
    }

    /// Distill a key from Alice's and Bob's sifted keys
    pub fn process(&self, alice_key: &[Bit], bob_key: &[Bit]) -> Result<DistilledKey> {
        if alice_key.len() != bob_key.len() {
            return Err(Error::Precondition(format!(
                "Key lengths differ: alice={} bob={}",
                alice_key.len(),
                bob_key.len()
            )));
        }

        let reconciliation = self.reconciler.reconcile(alice_key, bob_key);
        let amplified = self.amplifier.amplify(&reconciliation.key);

        let mut stages = StageLengths {
            sifted: bob_key.len(),
            reconciled: reconciliation.key.len(),
            amplified: amplified.len(),
            hashed: None,
        };

        let key = match self.hash_bits {
            Some(bits) => {
                let hashed = sha256_hash_bits(&amplified, bits);
                stages.hashed = Some(hashed.len());
                hashed
            }
            None => amplified,
        };

        info!(
            "Post-processing: sifted={} reconciled={} (dropped {} blocks) amplified={} final={}",
            stages.sifted,
            stages.reconciled,
            reconciliation.discarded_blocks,
            stages.amplified,
            key.len()
        );

        Ok(DistilledKey {
            key,
            stages,
            reconciliation,
        })
    }

    /// Distill a key from a finished simulation run
    pub fn process_run(&self, run: &ProtocolRun) -> Result<DistilledKey> {
        run.validate()?;
        self.process(&run.alice_sifted_key(), &run.sifted_key)
    }
}
