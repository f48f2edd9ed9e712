// SPDX-License-Identifier: MIT
//
// QKD Toolkit: BB84 Key Distribution Simulator
// Copyright (c) 2025 QKD Toolkit Contributors

//! QKD Simulator - command-line driver for the BB84 toolkit
//!
//! Runs one BB84 exchange configured from `QKD_*` environment variables, distills
//! the sifted key and prints the run summary plus the final key on stdout.
//!
//! # Flow
//!
//! ```text
//! ┌──────────────┐   qubits    ┌──────────────┐   sifted key   ┌──────────────┐
//! │    Alice     │ ──────────> │  (Eve) Bob   │ ─────────────> │ Post-process │
//! │   (encode)   │             │  (measure)   │   + QBER       │ parity, fold │
//! └──────────────┘             └──────────────┘                └──────────────┘
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use qkd_core::{
    analysis::{compare_eavesdropping, eavesdropping_suspected, secure_key_fraction},
    config::{AnalysisConfig, PostProcessingConfig, SimulationRequest},
    metrics::Metrics,
    pipeline::PostProcessor,
    protocol::{KeyEncoding, SimulationSummary},
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "qkd-sim")]
#[command(about = "QKD Simulator - BB84 exchange with key post-processing", long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Encoding of the printed key (binary, hex, base64)
    #[arg(short, long, default_value = "binary")]
    encoding: KeyEncoding,

    /// Also run the exchange with and without an eavesdropper and print both QBERs
    #[arg(short, long)]
    compare: bool,

    /// Compress the key through SHA-256 when QKD_HASH_BITS is unset
    #[arg(long)]
    hash: bool,

    /// Print the collected counters in Prometheus text format before exiting
    #[arg(short, long)]
    metrics: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let log_level = args
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .json()
        .init();

    info!("QKD Simulator v{} (qkd-core v{})", env!("CARGO_PKG_VERSION"), qkd_core::VERSION);

    // Load configuration from environment variables
    info!("Loading configuration from environment variables");
    let request =
        SimulationRequest::from_env().context("Failed to load simulation configuration")?;
    let mut post_config =
        PostProcessingConfig::from_env().context("Failed to load post-processing configuration")?;
    if args.hash && post_config.hash_bits.is_none() {
        post_config.hash_bits = Some(qkd_core::DEFAULT_HASH_BITS);
    }
    let analysis_config =
        AnalysisConfig::from_env().context("Failed to load analysis configuration")?;

    info!("Qubits: {}", request.qubit_count);
    info!("Eavesdropper present: {}", request.eavesdropper_present);
    info!("Parity block size: {}", post_config.block_size);

    let processor = PostProcessor::new(&post_config).context("Invalid post-processing setup")?;
    let mut simulator = request
        .clone()
        .into_simulator()
        .context("Invalid simulation request")?;
    let metrics = Metrics::new();

    let run = simulator.run().clone();
    metrics.record_run(&run);

    if eavesdropping_suspected(&run, &analysis_config) {
        warn!("Distilled key below must not be used for encryption");
    }
    info!(
        "Secure key fraction at this QBER: {:.4}",
        secure_key_fraction(run.qber)
    );

    let distilled = processor.process_run(&run).context("Post-processing failed")?;
    metrics.record_distillation(distilled.key.len());

    let summary = SimulationSummary::from(&run);
    println!("{}", summary.to_json().context("Failed to encode summary")?);
    println!(
        "{}",
        serde_json::to_string(&distilled.stages).context("Failed to encode stage lengths")?
    );
    println!("{}", args.encoding.render(&distilled.key));

    if args.compare {
        let comparison = compare_eavesdropping(simulator.qubit_count(), request.seed)
            .context("Comparison failed")?;
        metrics.record_run(&comparison.with_eve);
        metrics.record_run(&comparison.without_eve);

        let (with_len, without_len) = comparison.sifted_lengths();
        println!(
            "{}",
            serde_json::json!({
                "qber_with_eve": comparison.with_eve.qber_percent(),
                "qber_without_eve": comparison.without_eve.qber_percent(),
                "sifted_with_eve": with_len,
                "sifted_without_eve": without_len,
            })
        );
    }

    info!(
        "Simulations: {}, keys distilled: {}, sift ratio: {:.4}, mean QBER: {:.4}",
        metrics.simulations_total(),
        metrics.keys_distilled(),
        metrics.sift_ratio(),
        metrics.mean_qber().unwrap_or(0.0)
    );

    if args.metrics {
        print!("{}", metrics.prometheus_format());
    }
    Ok(())
}
