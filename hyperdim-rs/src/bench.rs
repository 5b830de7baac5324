//! Latency and throughput measurement for encode and classify.
//!
//! Inputs are synthesized random feature vectors, so the harness needs no
//! dataset. Both harnesses are read-only with respect to the model; encode
//! and classify are timed as separate phases.

use std::hint::black_box;
use std::thread;
use std::time::Instant;

use hyperdim_core::{split_ranges, Hypervector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::{ModelError, Result};
use crate::model::Model;

const INPUT_SEED: u64 = 0x5eed_cafe;

/// Average per-call wall time, single-threaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyReport {
    pub n_tests: usize,
    /// Average seconds per `encode` call.
    pub encode_secs: f64,
    /// Average seconds per `classify_encoded` call.
    pub classify_secs: f64,
}

/// Aggregate operations per second across a fixed worker count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputReport {
    pub n_tests: usize,
    pub n_threads: usize,
    pub encode_ops_per_sec: f64,
    pub classify_ops_per_sec: f64,
}

/// Worker count used when the caller does not pick one.
pub fn available_cores() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

fn random_inputs(model: &Model, n_tests: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(INPUT_SEED);
    (0..n_tests)
        .map(|_| {
            let mut features = vec![0u8; model.config().feature_size];
            rng.fill(features.as_mut_slice());
            features
        })
        .collect()
}

/// Time encode and classify on one thread over `n_tests` random inputs.
pub fn benchmark_latency(model: &Model, n_tests: usize) -> Result<LatencyReport> {
    if n_tests == 0 {
        return Err(ModelError::InvalidArgument("n_tests must be > 0".into()));
    }
    let inputs = random_inputs(model, n_tests);

    let start = Instant::now();
    let mut encoded = Vec::with_capacity(n_tests);
    for features in &inputs {
        encoded.push(model.encode(features)?);
    }
    let encode_secs = start.elapsed().as_secs_f64() / n_tests as f64;

    let start = Instant::now();
    for hv in &encoded {
        black_box(model.classify_encoded(hv));
    }
    let classify_secs = start.elapsed().as_secs_f64() / n_tests as f64;

    info!(n_tests, encode_secs, classify_secs, "latency benchmark complete");
    Ok(LatencyReport {
        n_tests,
        encode_secs,
        classify_secs,
    })
}

/// Time encode and classify with `n_tests` inputs spread over exactly
/// `n_threads` scoped workers.
pub fn benchmark_throughput(
    model: &Model,
    n_tests: usize,
    n_threads: usize,
) -> Result<ThroughputReport> {
    if n_tests == 0 {
        return Err(ModelError::InvalidArgument("n_tests must be > 0".into()));
    }
    if n_threads == 0 {
        return Err(ModelError::InvalidArgument("n_threads must be > 0".into()));
    }
    let inputs = random_inputs(model, n_tests);
    let ranges = split_ranges(n_tests, n_threads);

    let start = Instant::now();
    let encoded: Vec<Hypervector> = thread::scope(|scope| {
        let handles: Vec<_> = ranges
            .iter()
            .cloned()
            .map(|range| {
                let inputs = &inputs;
                scope.spawn(move || {
                    range
                        .map(|i| model.encode(&inputs[i]))
                        .collect::<Result<Vec<_>>>()
                })
            })
            .collect();
        let mut out = Vec::with_capacity(n_tests);
        for handle in handles {
            match handle.join() {
                Ok(chunk) => out.extend(chunk?),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
        Ok::<_, ModelError>(out)
    })?;
    let encode_ops_per_sec = n_tests as f64 / start.elapsed().as_secs_f64();

    let start = Instant::now();
    thread::scope(|scope| {
        let handles: Vec<_> = ranges
            .iter()
            .cloned()
            .map(|range| {
                let encoded = &encoded;
                scope.spawn(move || {
                    for i in range {
                        black_box(model.classify_encoded(&encoded[i]));
                    }
                })
            })
            .collect();
        for handle in handles {
            if let Err(payload) = handle.join() {
                std::panic::resume_unwind(payload);
            }
        }
    });
    let classify_ops_per_sec = n_tests as f64 / start.elapsed().as_secs_f64();

    info!(
        n_tests,
        n_threads, encode_ops_per_sec, classify_ops_per_sec, "throughput benchmark complete"
    );
    Ok(ThroughputReport {
        n_tests,
        n_threads,
        encode_ops_per_sec,
        classify_ops_per_sec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;

    fn small_model() -> Model {
        let config = ModelConfig {
            dim: 256,
            input_quant: 4,
            class_vector_quant: 0,
            feature_size: 16,
            n_classes: 3,
        };
        Model::new(config, 1).unwrap()
    }

    #[test]
    fn test_latency_reports_positive_averages() {
        let model = small_model();
        let report = benchmark_latency(&model, 50).unwrap();
        assert_eq!(report.n_tests, 50);
        assert!(report.encode_secs > 0.0);
        assert!(report.classify_secs > 0.0);
    }

    #[test]
    fn test_throughput_reports_positive_rates() {
        let model = small_model();
        let report = benchmark_throughput(&model, 50, 2).unwrap();
        assert_eq!(report.n_threads, 2);
        assert!(report.encode_ops_per_sec > 0.0);
        assert!(report.classify_ops_per_sec > 0.0);
    }

    #[test]
    fn test_more_threads_than_tests() {
        let model = small_model();
        let report = benchmark_throughput(&model, 3, 8).unwrap();
        assert_eq!(report.n_tests, 3);
    }

    #[test]
    fn test_zero_arguments_rejected() {
        let model = small_model();
        assert!(benchmark_latency(&model, 0).is_err());
        assert!(benchmark_throughput(&model, 0, 2).is_err());
        assert!(benchmark_throughput(&model, 10, 0).is_err());
    }

    #[test]
    fn test_available_cores_nonzero() {
        assert!(available_cores() >= 1);
    }
}
