// SPDX-License-Identifier: MIT
//
// QKD Toolkit: BB84 Key Distribution Simulator
// Copyright (c) 2025 QKD Toolkit Contributors

//! Protocol data structures for BB84 runs
//!
//! Defines the typed record produced by one simulated exchange and the flat summary
//! contract handed to presentation layers. Uses JSON for the summary encoding.

use crate::{crypto, Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single key bit, always 0 or 1
pub type Bit = u8;

/// Encoding basis shared by preparation and measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Computational basis, |0> and |1>
    #[serde(rename = "Z")]
    Rectilinear,
    /// Hadamard basis, |+> and |->
    #[serde(rename = "X")]
    Diagonal,
}

impl Basis {
    /// Draw a basis uniformly at random
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Basis::Diagonal
        } else {
            Basis::Rectilinear
        }
    }

    /// Short label used by the summary contract
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rectilinear => "Z",
            Self::Diagonal => "X",
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Eve's side of an intercept-resend attack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interception {
    /// Bases Eve measured in
    pub bases: Vec<Basis>,

    /// Bits Eve recorded and resent to Bob
    pub results: Vec<Bit>,
}

/// Complete trace of one simulated BB84 exchange
///
/// Every per-position array is exposed so that post-processing and diagnostics can both
/// work from the same record. Records are never mutated once a simulator produced them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProtocolRun {
    /// Number of bit/basis pairs generated
    pub qubit_count: u32,

    /// Whether an intercept-resend adversary was modeled
    pub eavesdropper_present: bool,

    /// Alice's raw bits
    pub alice_bits: Vec<Bit>,

    /// Alice's preparation bases
    pub alice_bases: Vec<Basis>,

    /// Bob's measurement bases
    pub bob_bases: Vec<Basis>,

    /// Bob's measurement outcomes
    pub bob_results: Vec<Bit>,

    /// Eve's bases and results, present only when she was active
    pub interception: Option<Interception>,

    /// Strictly increasing positions where Alice's and Bob's bases agree
    pub matching_indices: Vec<usize>,

    /// Bob's results at `matching_indices`, i.e. Bob's raw key
    pub sifted_key: Vec<Bit>,

    /// Fraction of sifted positions where Alice and Bob disagree
    pub qber: f64,

    /// Set by the simulator once the exchange has actually run
    #[serde(default)]
    pub executed: bool,
}

impl ProtocolRun {
    /// Record for a configured simulator that has not run yet
    pub fn pending(qubit_count: u32, eavesdropper_present: bool) -> Self {
        Self {
            qubit_count,
            eavesdropper_present,
            ..Default::default()
        }
    }

    /// Check that the record comes from an executed run and is internally consistent
    ///
    /// Records built by hand or deserialized from elsewhere may violate the shape a
    /// simulator guarantees; every violation is reported as `Error::Precondition`.
    pub fn validate(&self) -> Result<()> {
        if !self.executed {
            return Err(Error::Precondition(
                "Run the simulation before post-processing".to_string(),
            ));
        }

        let count = self.qubit_count as usize;
        let arrays = [
            ("alice_bits", self.alice_bits.len()),
            ("alice_bases", self.alice_bases.len()),
            ("bob_bases", self.bob_bases.len()),
            ("bob_results", self.bob_results.len()),
        ];
        if let Some((name, len)) = arrays.iter().find(|(_, len)| *len != count) {
            return Err(Error::Precondition(format!(
                "{} has {} entries for {} qubits",
                name, len, count
            )));
        }

        if let Some(&index) = self.matching_indices.iter().find(|&&i| i >= count) {
            return Err(Error::Precondition(format!(
                "Matching index {} out of range for {} qubits",
                index, count
            )));
        }

        if self.sifted_key.len() != self.matching_indices.len() {
            return Err(Error::Precondition(format!(
                "Sifted key has {} bits for {} matching positions",
                self.sifted_key.len(),
                self.matching_indices.len()
            )));
        }
        Ok(())
    }

    /// True for an executed, internally consistent record
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }

    /// True if no position survived sifting
    pub fn is_empty(&self) -> bool {
        self.matching_indices.is_empty()
    }

    /// Alice's bits at the matching positions, the counterpart of `sifted_key`
    pub fn alice_sifted_key(&self) -> Vec<Bit> {
        self.matching_indices
            .iter()
            .filter_map(|&i| self.alice_bits.get(i).copied())
            .collect()
    }

    /// Number of sifted positions where Alice's bit differs from Bob's result
    pub fn error_count(&self) -> usize {
        self.matching_indices
            .iter()
            .filter(|&&i| {
                matches!(
                    (self.alice_bits.get(i), self.bob_results.get(i)),
                    (Some(a), Some(b)) if a != b
                )
            })
            .count()
    }

    /// Fraction of positions kept by sifting
    pub fn sift_ratio(&self) -> f64 {
        if self.qubit_count == 0 {
            0.0
        } else {
            self.matching_indices.len() as f64 / self.qubit_count as f64
        }
    }

    /// QBER as a percentage rounded to two decimals, ties to even
    pub fn qber_percent(&self) -> f64 {
        (self.qber * 100.0 * 100.0).round_ties_even() / 100.0
    }

    pub fn eve_bases(&self) -> Option<&[Basis]> {
        self.interception.as_ref().map(|i| i.bases.as_slice())
    }

    pub fn eve_results(&self) -> Option<&[Bit]> {
        self.interception.as_ref().map(|i| i.results.as_slice())
    }
}

/// Flat result mapping consumed by front-ends and dashboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub num_qubits: u32,
    pub eavesdropper: bool,
    pub alice_bits: Vec<Bit>,
    pub alice_bases: Vec<Basis>,
    pub bob_bases: Vec<Basis>,
    pub bob_results: Vec<Bit>,
    pub matching_indices: Vec<usize>,
    pub raw_key: Vec<Bit>,
    /// QBER percentage rounded to two decimals
    pub qber: f64,
}

impl From<&ProtocolRun> for SimulationSummary {
    fn from(run: &ProtocolRun) -> Self {
        Self {
            num_qubits: run.qubit_count,
            eavesdropper: run.eavesdropper_present,
            alice_bits: run.alice_bits.clone(),
            alice_bases: run.alice_bases.clone(),
            bob_bases: run.bob_bases.clone(),
            bob_results: run.bob_results.clone(),
            matching_indices: run.matching_indices.clone(),
            raw_key: run.sifted_key.clone(),
            qber: run.qber_percent(),
        }
    }
}

impl SimulationSummary {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Into::into)
    }

    /// Deserialize from JSON
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(Into::into)
    }
}

/// Rendering format for distilled keys
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    /// String of '0'/'1' characters
    #[default]
    Binary,
    /// Hexadecimal encoding of the packed bits
    Hex,
    /// Base64 encoding of the packed bits
    Base64,
}

impl KeyEncoding {
    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "binary" | "bits" => Some(Self::Binary),
            "hex" | "hexadecimal" => Some(Self::Hex),
            "base64" | "b64" => Some(Self::Base64),
            _ => None,
        }
    }

    /// Render key bits in this encoding
    ///
    /// Hex and base64 pack bits MSB-first; a trailing partial byte is zero-padded.
    pub fn render(&self, bits: &[Bit]) -> String {
        match self {
            Self::Binary => crypto::bits_to_string(bits),
            Self::Hex => crypto::encode_hex(&crypto::bits_to_bytes(bits)),
            Self::Base64 => crypto::encode_base64(&crypto::bits_to_bytes(bits)),
        }
    }
}

impl std::str::FromStr for KeyEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::Config(format!("Unknown key encoding '{}'", s)))
    }
}
