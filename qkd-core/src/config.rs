// SPDX-License-Identifier: MIT
//
// QKD Toolkit: BB84 Key Distribution Simulator
// Copyright (c) 2025 QKD Toolkit Contributors

//! Configuration management for QKD simulations and post-processing

use crate::{simulator::Simulator, Error, Result};
use serde::{Deserialize, Serialize};

/// Simulation request as received from a front-end or the environment
///
/// The qubit count is signed so that a negative request can be rejected explicitly
/// instead of wrapping.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SimulationRequest {
    /// Number of qubits Alice sends
    #[serde(default = "default_qubit_count")]
    pub qubit_count: i64,

    /// Model an intercept-resend eavesdropper
    #[serde(default)]
    pub eavesdropper_present: bool,

    /// Seed for a reproducible run
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            qubit_count: default_qubit_count(),
            eavesdropper_present: false,
            seed: None,
        }
    }
}

impl SimulationRequest {
    pub fn new(qubit_count: i64, eavesdropper_present: bool, seed: Option<u64>) -> Self {
        Self {
            qubit_count,
            eavesdropper_present,
            seed,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config: Self = envy::prefixed("QKD_")
            .from_env()
            .map_err(|e| Error::Config(format!("Failed to parse environment variables: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.qubit_count < 0 {
            return Err(Error::Config(format!(
                "qubit_count must be non-negative, got {}",
                self.qubit_count
            )));
        }

        if self.qubit_count > crate::MAX_QUBIT_COUNT {
            return Err(Error::Config(format!(
                "qubit_count must be at most {}",
                crate::MAX_QUBIT_COUNT
            )));
        }

        Ok(())
    }

    /// Validate and build a simulator for this request
    pub fn into_simulator(self) -> Result<Simulator> {
        self.validate()?;
        let qubit_count = u32::try_from(self.qubit_count)
            .map_err(|e| Error::Config(format!("Invalid qubit_count: {}", e)))?;
        Ok(Simulator::new(qubit_count, self.eavesdropper_present, self.seed))
    }
}

/// Post-processing pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PostProcessingConfig {
    /// Parity block size for reconciliation
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Folding target length (defaults to half the reconciled key)
    #[serde(default)]
    pub target_length: Option<usize>,

    /// Append SHA-256 compression to this many bits
    #[serde(default)]
    pub hash_bits: Option<usize>,
}

impl Default for PostProcessingConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            target_length: None,
            hash_bits: None,
        }
    }
}

impl PostProcessingConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config: Self = envy::prefixed("QKD_")
            .from_env()
            .map_err(|e| Error::Config(format!("Failed to parse environment variables: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(Error::Config("block_size must be > 0".to_string()));
        }

        if let Some(bits) = self.hash_bits {
            if bits > crate::SHA256_BITS {
                return Err(Error::Config(format!(
                    "hash_bits must be at most {}",
                    crate::SHA256_BITS
                )));
            }
        }

        Ok(())
    }
}

/// Thresholds used when judging a run
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AnalysisConfig {
    /// QBER above which the key exchange should be aborted
    #[serde(default = "default_qber_threshold")]
    pub qber_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            qber_threshold: default_qber_threshold(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config: Self = envy::prefixed("QKD_")
            .from_env()
            .map_err(|e| Error::Config(format!("Failed to parse environment variables: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=0.5).contains(&self.qber_threshold) {
            return Err(Error::Config(format!(
                "qber_threshold must be within [0, 0.5], got {}",
                self.qber_threshold
            )));
        }
        Ok(())
    }
}

// Default value functions
fn default_qubit_count() -> i64 {
    100
}

fn default_block_size() -> usize {
    crate::DEFAULT_BLOCK_SIZE
}

fn default_qber_threshold() -> f64 {
    0.11 // Shor-Preskill bound for one-way BB84
}
