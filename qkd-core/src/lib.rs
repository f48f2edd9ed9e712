// SPDX-License-Identifier: MIT
//
// QKD Toolkit: BB84 Key Distribution Simulator
// Copyright (c) 2025 QKD Toolkit Contributors

//! QKD Core Library
//!
//! This crate models the BB84 quantum key distribution protocol in purely classical terms.
//! It reproduces the observable statistics of a BB84 exchange (bit values, basis choices,
//! measurement outcomes and the footprint of an intercept-resend eavesdropper) and then runs
//! the classical post-processing that distills a shorter shared key from the noisy sifted one.
//!
//! # Architecture
//!
//! The library is organized into modules representing core concerns:
//! - `simulator`: Seeded BB84 exchange, sifting and QBER estimation
//! - `protocol`: Typed run records, the summary data contract and key rendering
//! - `reconciliation`: Non-interactive parity-block reconciliation
//! - `amplification`: Privacy amplification by iterative XOR folding
//! - `crypto`: SHA-256 key compression and bit/byte helpers
//! - `pipeline`: Post-processing orchestration with stage-length reporting
//! - `analysis`: Key-rate estimates and eavesdropper comparisons
//! - `config`: Environment-driven configuration with validation
//! - `metrics`: Cumulative counters for callers running many simulations
//! - `error`: Unified error types
//!
//! # Example
//!
//! ```
//! use qkd_core::{pipeline::apply_post_processing, simulator::Simulator};
//!
//! let mut sim = Simulator::new(256, false, Some(7));
//! sim.run();
//! let run = sim.summary();
//!
//! let key = apply_post_processing(&run.alice_sifted_key(), &run.sifted_key);
//! assert_eq!(run.qber, 0.0);
//! assert!(key.len() <= run.sifted_key.len());
//! ```

pub mod amplification;
pub mod analysis;
pub mod config;
pub mod crypto;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod protocol;
pub mod reconciliation;
pub mod simulator;

pub use error::{Error, Result};
pub use protocol::{Basis, Bit, ProtocolRun};
pub use simulator::Simulator;

/// Library version reported by the demonstration binary
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default parity block size used by reconciliation
pub const DEFAULT_BLOCK_SIZE: usize = 4;

/// Default output length of the SHA-256 compression stage, in bits
pub const DEFAULT_HASH_BITS: usize = 128;

/// Width of a SHA-256 digest in bits
pub const SHA256_BITS: usize = 256;

/// Upper bound on a single simulation request to prevent OOM
pub const MAX_QUBIT_COUNT: i64 = 50_000_000;
