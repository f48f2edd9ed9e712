// SPDX-License-Identifier: MIT
//
// QKD Toolkit: BB84 Key Distribution Simulator
// Copyright (c) 2025 QKD Toolkit Contributors

//! Run analysis: key-rate estimates and eavesdropper comparisons

use crate::config::AnalysisConfig;
use crate::protocol::ProtocolRun;
use crate::simulator::Simulator;
use crate::{Error, Result};
use tracing::{info, warn};

/// Binary entropy H2(p)
pub fn binary_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        0.0
    } else {
        -p * p.log2() - (1.0 - p) * (1.0 - p).log2()
    }
}

/// Asymptotic secure key fraction per sent qubit:
/// R ≈ sift * [1 - 2 H2(QBER)], with sift = 1/2 for uniform bases
pub fn secure_key_fraction(qber: f64) -> f64 {
    let sift = 0.5;
    let term = 1.0 - 2.0 * binary_entropy(qber.clamp(0.0, 0.5));
    (sift * term).max(0.0)
}

/// True if the run's QBER is above the abort threshold
pub fn eavesdropping_suspected(run: &ProtocolRun, config: &AnalysisConfig) -> bool {
    let suspected = run.qber > config.qber_threshold;
    if suspected {
        warn!(
            "QBER {:.2}% exceeds threshold {:.2}%; abort the exchange",
            run.qber * 100.0,
            config.qber_threshold * 100.0
        );
    }
    suspected
}

/// Side-by-side runs with and without an eavesdropper
#[derive(Debug, Clone, PartialEq)]
pub struct EavesdropComparison {
    pub with_eve: ProtocolRun,
    pub without_eve: ProtocolRun,
}

impl EavesdropComparison {
    /// QBER increase caused by Eve
    pub fn qber_gap(&self) -> f64 {
        self.with_eve.qber - self.without_eve.qber
    }

    /// Sifted key lengths as `(with_eve, without_eve)`
    pub fn sifted_lengths(&self) -> (usize, usize) {
        (self.with_eve.sifted_key.len(), self.without_eve.sifted_key.len())
    }
}

/// Run a with-Eve and a without-Eve simulation in parallel
///
/// Each simulator owns its own source seeded from `seed`, so the pair is reproducible.
pub fn compare_eavesdropping(qubit_count: u32, seed: Option<u64>) -> Result<EavesdropComparison> {
    let (with_eve, without_eve) = crossbeam::thread::scope(|s| {
        let with_eve = s.spawn(|_| {
            let mut sim = Simulator::new(qubit_count, true, seed);
            sim.run().clone()
        });
        let without_eve = s.spawn(|_| {
            let mut sim = Simulator::new(qubit_count, false, seed);
            sim.run().clone()
        });
        (with_eve.join(), without_eve.join())
    })
    .map_err(|_| Error::Internal("Comparison scope panicked".to_string()))?;

    let comparison = EavesdropComparison {
        with_eve: with_eve.map_err(|_| Error::Internal("Simulation with Eve panicked".to_string()))?,
        without_eve: without_eve
            .map_err(|_| Error::Internal("Simulation without Eve panicked".to_string()))?,
    };

    info!(
        "Eavesdropper comparison: qber with Eve {:.2}%, without Eve {:.2}%",
        comparison.with_eve.qber_percent(),
        comparison.without_eve.qber_percent()
    );
    Ok(comparison)
}
