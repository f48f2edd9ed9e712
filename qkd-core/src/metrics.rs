// SPDX-License-Identifier: MIT
//
// QKD Toolkit: BB84 Key Distribution Simulator
// Copyright (c) 2025 QKD Toolkit Contributors

//! Metrics collection and reporting
//!
//! Counters are owned by the caller and fed explicitly; simulators never touch them.

use crate::protocol::ProtocolRun;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const MAX_QBER_SAMPLES: usize = 10_000;

/// Cumulative simulation metrics, cheap to clone and share
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    // Simulation metrics
    simulations_total: AtomicU64,
    intercepted_runs: AtomicU64,
    qubits_total: AtomicU64,
    sifted_bits_total: AtomicU64,

    // Post-processing metrics
    keys_distilled: AtomicU64,
    distilled_bits_total: AtomicU64,

    // Per-run QBER, bounded window
    qber_samples: RwLock<Vec<f64>>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                simulations_total: AtomicU64::new(0),
                intercepted_runs: AtomicU64::new(0),
                qubits_total: AtomicU64::new(0),
                sifted_bits_total: AtomicU64::new(0),
                keys_distilled: AtomicU64::new(0),
                distilled_bits_total: AtomicU64::new(0),
                qber_samples: RwLock::new(Vec::with_capacity(MAX_QBER_SAMPLES)),
            }),
        }
    }

    // Simulation metrics
    pub fn record_run(&self, run: &ProtocolRun) {
        self.inner.simulations_total.fetch_add(1, Ordering::Relaxed);
        if run.eavesdropper_present {
            self.inner.intercepted_runs.fetch_add(1, Ordering::Relaxed);
        }
        self.inner
            .qubits_total
            .fetch_add(run.qubit_count as u64, Ordering::Relaxed);
        self.inner
            .sifted_bits_total
            .fetch_add(run.sifted_key.len() as u64, Ordering::Relaxed);

        let mut samples = self.inner.qber_samples.write();
        samples.push(run.qber);
        if samples.len() > MAX_QBER_SAMPLES {
            samples.drain(0..MAX_QBER_SAMPLES / 2);
        }
    }

    pub fn simulations_total(&self) -> u64 {
        self.inner.simulations_total.load(Ordering::Relaxed)
    }

    pub fn intercepted_runs(&self) -> u64 {
        self.inner.intercepted_runs.load(Ordering::Relaxed)
    }

    pub fn qubits_total(&self) -> u64 {
        self.inner.qubits_total.load(Ordering::Relaxed)
    }

    pub fn sifted_bits_total(&self) -> u64 {
        self.inner.sifted_bits_total.load(Ordering::Relaxed)
    }

    // Post-processing metrics
    pub fn record_distillation(&self, key_bits: usize) {
        self.inner.keys_distilled.fetch_add(1, Ordering::Relaxed);
        self.inner
            .distilled_bits_total
            .fetch_add(key_bits as u64, Ordering::Relaxed);
    }

    pub fn keys_distilled(&self) -> u64 {
        self.inner.keys_distilled.load(Ordering::Relaxed)
    }

    pub fn distilled_bits_total(&self) -> u64 {
        self.inner.distilled_bits_total.load(Ordering::Relaxed)
    }

    // Derived metrics
    pub fn sift_ratio(&self) -> f64 {
        let qubits = self.qubits_total() as f64;
        if qubits > 0.0 {
            self.sifted_bits_total() as f64 / qubits
        } else {
            0.0
        }
    }

    pub fn mean_qber(&self) -> Option<f64> {
        let samples = self.inner.qber_samples.read();
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }

    pub fn qber_percentile(&self, percentile: f64) -> Option<f64> {
        let samples = self.inner.qber_samples.read();
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.clone();
        sorted.sort_unstable_by(|a, b| a.total_cmp(b));
        let index = ((sorted.len() as f64 * percentile).ceil() as usize).min(sorted.len() - 1);
        Some(sorted[index])
    }

    /// Generate Prometheus-compatible metrics output
    pub fn prometheus_format(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP qkd_simulations_total Total number of simulated exchanges\n");
        output.push_str("# TYPE qkd_simulations_total counter\n");
        output.push_str(&format!("qkd_simulations_total {}\n", self.simulations_total()));

        output.push_str("# HELP qkd_intercepted_runs_total Exchanges run with an eavesdropper\n");
        output.push_str("# TYPE qkd_intercepted_runs_total counter\n");
        output.push_str(&format!("qkd_intercepted_runs_total {}\n", self.intercepted_runs()));

        output.push_str("# HELP qkd_qubits_total Total qubits sent\n");
        output.push_str("# TYPE qkd_qubits_total counter\n");
        output.push_str(&format!("qkd_qubits_total {}\n", self.qubits_total()));

        output.push_str("# HELP qkd_sifted_bits_total Total bits kept by sifting\n");
        output.push_str("# TYPE qkd_sifted_bits_total counter\n");
        output.push_str(&format!("qkd_sifted_bits_total {}\n", self.sifted_bits_total()));

        output.push_str("# HELP qkd_keys_distilled_total Total keys produced by post-processing\n");
        output.push_str("# TYPE qkd_keys_distilled_total counter\n");
        output.push_str(&format!("qkd_keys_distilled_total {}\n", self.keys_distilled()));

        output.push_str("# HELP qkd_distilled_bits_total Total bits in distilled keys\n");
        output.push_str("# TYPE qkd_distilled_bits_total counter\n");
        output.push_str(&format!("qkd_distilled_bits_total {}\n", self.distilled_bits_total()));

        if let Some(mean) = self.mean_qber() {
            output.push_str("# HELP qkd_qber_mean Mean QBER over recent runs\n");
            output.push_str("# TYPE qkd_qber_mean gauge\n");
            output.push_str(&format!("qkd_qber_mean {}\n", mean));
        }

        if let Some(p95) = self.qber_percentile(0.95) {
            output.push_str("# HELP qkd_qber_p95 95th percentile QBER over recent runs\n");
            output.push_str("# TYPE qkd_qber_p95 gauge\n");
            output.push_str(&format!("qkd_qber_p95 {}\n", p95));
        }

        output.push_str("# HELP qkd_sift_ratio Fraction of sent qubits kept by sifting\n");
        output.push_str("# TYPE qkd_sift_ratio gauge\n");
        output.push_str(&format!("qkd_sift_ratio {}\n", self.sift_ratio()));

        output
    }
}
