//! Trainer + classifier over per-class accumulators.
//!
//! Training is two-phase, mirroring the usual HDC recipe:
//! 1. **initialize**: bundle every training sample's encoding into its
//!    class's accumulator (order-independent sum, safe to parallelize);
//! 2. **retrain**: perceptron-style corrective passes in input order against
//!    the live accumulator. For a misclassified sample the encoding is added
//!    to the true class and subtracted from the predicted one.
//!
//! Classification compares an encoded query against each class's *quantized
//! view* (see `quantized_class_vector`) by plain dot product; ties resolve
//! to the lowest label index.

use std::sync::{Mutex, PoisonError};

use hyperdim_core::{parallel_map_ranges, Hypervector, SplitMix64, DEFAULT_WORKERS};
use tracing::{debug, info};

use crate::basis::Basis;
use crate::config::{validate_class_vector_quant, ModelConfig};
use crate::dataset::Dataset;
use crate::encoder;
use crate::error::{ModelError, Result};

/// Samples encoded ahead of the sequential retrain step, per merge barrier.
const RETRAIN_CHUNK_PER_WORKER: usize = 32;

/// Per-class componentwise sum of encoded training samples.
///
/// `i32` per component: each update moves a component by ±1, so overflow
/// would take ~2^31 updates against one class. Training sets up to 2^31
/// samples per class are safe over a model's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassAccumulator {
    counts: Vec<i32>,
}

impl ClassAccumulator {
    fn new(dim: usize) -> Self {
        Self {
            counts: vec![0; dim],
        }
    }

    pub(crate) fn from_counts(counts: Vec<i32>) -> Self {
        Self { counts }
    }

    #[inline]
    pub fn counts(&self) -> &[i32] {
        &self.counts
    }

    fn add(&mut self, hv: &Hypervector) {
        for (slot, &c) in self.counts.iter_mut().zip(hv.components()) {
            *slot += c as i32;
        }
    }

    fn sub(&mut self, hv: &Hypervector) {
        for (slot, &c) in self.counts.iter_mut().zip(hv.components()) {
            *slot -= c as i32;
        }
    }
}

/// A trained (or trainable) HDC classifier.
///
/// Plain owned value: any number of models may coexist, and dropping one
/// releases everything.
#[derive(Debug, Clone)]
pub struct Model {
    config: ModelConfig,
    seed: u64,
    basis: Basis,
    accumulators: Vec<ClassAccumulator>,
    n_workers: usize,
}

impl Model {
    /// Build an untrained model: validates the config and generates the
    /// basis tables from `seed`.
    pub fn new(config: ModelConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut rng = SplitMix64::new(seed);
        let basis = Basis::generate(config.dim, config.input_quant, config.feature_size, &mut rng);
        debug!(
            dim = config.dim,
            input_quant = config.input_quant,
            feature_size = config.feature_size,
            n_classes = config.n_classes,
            seed,
            "generated basis tables"
        );
        Ok(Self {
            config,
            seed,
            basis,
            accumulators: (0..config.n_classes)
                .map(|_| ClassAccumulator::new(config.dim))
                .collect(),
            n_workers: DEFAULT_WORKERS,
        })
    }

    /// Reassemble a persisted model. The store validates the header and
    /// table shapes before calling.
    pub(crate) fn from_parts(
        config: ModelConfig,
        seed: u64,
        basis: Basis,
        accumulators: Vec<ClassAccumulator>,
    ) -> Self {
        Self {
            config,
            seed,
            basis,
            accumulators,
            n_workers: DEFAULT_WORKERS,
        }
    }

    #[inline]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn n_workers(&self) -> usize {
        self.n_workers
    }

    pub(crate) fn basis(&self) -> &Basis {
        &self.basis
    }

    pub(crate) fn accumulators(&self) -> &[ClassAccumulator] {
        &self.accumulators
    }

    /// Resize the worker pool used by `train` and `test`.
    pub fn set_n_workers(&mut self, n_workers: usize) -> Result<()> {
        if n_workers == 0 {
            return Err(ModelError::InvalidArgument("n_workers must be > 0".into()));
        }
        self.n_workers = n_workers;
        Ok(())
    }

    /// Change the class-vector quantization without retraining. The
    /// quantized view is recomputed lazily from the raw accumulators, so
    /// this only swaps the lens classification looks through.
    pub fn set_class_vector_quant(&mut self, q: usize) -> Result<()> {
        validate_class_vector_quant(q)?;
        self.config.class_vector_quant = q;
        Ok(())
    }

    /// Encode one feature vector.
    pub fn encode(&self, features: &[u8]) -> Result<Hypervector> {
        if features.len() != self.config.feature_size {
            return Err(ModelError::InvalidArgument(format!(
                "expected {} features, got {}",
                self.config.feature_size,
                features.len()
            )));
        }
        Ok(encoder::encode(features, &self.basis, self.config.input_quant))
    }

    /// The class vector classification compares against, derived on demand
    /// from the raw accumulator.
    ///
    /// Q == 0 returns the accumulator as-is. Even Q ≥ 2 rescales each
    /// component into Q equal-width bins over the accumulator's [min, max]
    /// and recenters to `bin - Q/2`; a flat accumulator (min == max) maps
    /// to all zeros.
    pub fn quantized_class_vector(&self, class: usize) -> Vec<i32> {
        let counts = self.accumulators[class].counts();
        let q = self.config.class_vector_quant;
        if q == 0 {
            return counts.to_vec();
        }

        let mut min = i32::MAX;
        let mut max = i32::MIN;
        for &v in counts {
            min = min.min(v);
            max = max.max(v);
        }
        if min == max {
            return vec![0; counts.len()];
        }

        let span = (max as i64) - (min as i64);
        let half = (q / 2) as i64;
        counts
            .iter()
            .map(|&v| {
                let bin = ((v as i64 - min as i64) * q as i64 / span).min(q as i64 - 1);
                (bin - half) as i32
            })
            .collect()
    }

    fn quantized_views(&self) -> Vec<Vec<i32>> {
        (0..self.config.n_classes)
            .map(|c| self.quantized_class_vector(c))
            .collect()
    }

    /// Predict the class of an already-encoded query. Ties go to the lowest
    /// label index.
    pub fn classify_encoded(&self, encoded: &Hypervector) -> usize {
        debug_assert_eq!(encoded.len(), self.config.dim);
        let mut best_class = 0;
        let mut best_score = i64::MIN;
        for class in 0..self.config.n_classes {
            let score = dot_view(&self.quantized_class_vector(class), encoded);
            if score > best_score {
                best_score = score;
                best_class = class;
            }
        }
        best_class
    }

    /// Encode + classify one feature vector.
    pub fn classify(&self, features: &[u8]) -> Result<usize> {
        Ok(self.classify_encoded(&self.encode(features)?))
    }

    /// Count correct predictions over the first `n_samples` items.
    ///
    /// Model state is fixed during testing, so the quantized views are
    /// snapshotted once and classification fans out lock-free.
    pub fn test(&self, data: &Dataset, n_samples: usize) -> Result<usize> {
        self.validate_dataset(data, n_samples)?;
        let views = self.quantized_views();
        let correct: usize = parallel_map_ranges(n_samples, self.n_workers, |range| {
            let mut hits = 0usize;
            for i in range {
                let encoded =
                    encoder::encode(data.features(i), &self.basis, self.config.input_quant);
                if classify_views(&views, &encoded) == data.label(i) as usize {
                    hits += 1;
                }
            }
            hits
        })
        .into_iter()
        .sum();
        debug!(n_samples, correct, "test pass complete");
        Ok(correct)
    }

    /// Full training run: reset + bundle the first `n_samples` items, then
    /// `retrain_iterations` corrective passes.
    pub fn train(
        &mut self,
        data: &Dataset,
        n_samples: usize,
        retrain_iterations: usize,
    ) -> Result<()> {
        self.validate_dataset(data, n_samples)?;
        self.initialize(data, n_samples);
        info!(n_samples, "initial bundling complete");
        for iteration in 0..retrain_iterations {
            let correct = self.retrain_pass(data, n_samples);
            info!(iteration, correct, n_samples, "retrain pass complete");
        }
        Ok(())
    }

    /// One corrective pass over the first `n_samples` items, in input order
    /// against the live accumulators. Returns how many samples the model
    /// classified correctly during the pass.
    pub fn train_one_iteration(&mut self, data: &Dataset, n_samples: usize) -> Result<usize> {
        self.validate_dataset(data, n_samples)?;
        Ok(self.retrain_pass(data, n_samples))
    }

    /// Reset the accumulators and bundle each sample's encoding into its
    /// labeled class. Addition commutes, so parallel workers feeding one
    /// mutex-guarded accumulator set produce the same sums as a serial pass.
    fn initialize(&mut self, data: &Dataset, n_samples: usize) {
        let fresh: Vec<ClassAccumulator> = (0..self.config.n_classes)
            .map(|_| ClassAccumulator::new(self.config.dim))
            .collect();
        let accumulators = Mutex::new(fresh);

        parallel_map_ranges(n_samples, self.n_workers, |range| {
            for i in range {
                let encoded =
                    encoder::encode(data.features(i), &self.basis, self.config.input_quant);
                let label = data.label(i) as usize;
                let mut guard = accumulators
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                guard[label].add(&encoded);
            }
        });

        self.accumulators = accumulators
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Sequential classify-and-correct pass. Encoding is the dominant cost
    /// and has no order dependency, so samples are encoded in parallel one
    /// chunk at a time; the classify+update step then consumes the chunk
    /// strictly in input order, which keeps the pass bit-identical to a
    /// fully serial one.
    fn retrain_pass(&mut self, data: &Dataset, n_samples: usize) -> usize {
        let chunk_size = (self.n_workers * RETRAIN_CHUNK_PER_WORKER).max(1);
        let mut correct = 0usize;

        let mut start = 0;
        while start < n_samples {
            let end = (start + chunk_size).min(n_samples);
            let encoded: Vec<Hypervector> =
                parallel_map_ranges(end - start, self.n_workers, |range| {
                    range
                        .map(|offset| {
                            encoder::encode(
                                data.features(start + offset),
                                &self.basis,
                                self.config.input_quant,
                            )
                        })
                        .collect::<Vec<_>>()
                })
                .into_iter()
                .flatten()
                .collect();

            for (offset, enc) in encoded.iter().enumerate() {
                let label = data.label(start + offset) as usize;
                let predicted = self.classify_encoded(enc);
                if predicted == label {
                    correct += 1;
                } else {
                    self.accumulators[label].add(enc);
                    self.accumulators[predicted].sub(enc);
                }
            }
            start = end;
        }
        correct
    }

    /// All checks run before any accumulator is touched.
    fn validate_dataset(&self, data: &Dataset, n_samples: usize) -> Result<()> {
        if n_samples > data.len() {
            return Err(ModelError::InvalidArgument(format!(
                "n_samples {} exceeds dataset size {}",
                n_samples,
                data.len()
            )));
        }
        if data.feature_size() != self.config.feature_size {
            return Err(ModelError::Consistency(format!(
                "dataset feature size {} does not match model feature size {}",
                data.feature_size(),
                self.config.feature_size
            )));
        }
        for i in 0..n_samples {
            let label = data.label(i) as usize;
            if label >= self.config.n_classes {
                return Err(ModelError::Consistency(format!(
                    "sample {i} has label {label}, model has {} classes",
                    self.config.n_classes
                )));
            }
        }
        Ok(())
    }
}

#[inline]
fn dot_view(view: &[i32], encoded: &Hypervector) -> i64 {
    view.iter()
        .zip(encoded.components())
        .map(|(&v, &c)| (v as i64) * (c as i64))
        .sum()
}

fn classify_views(views: &[Vec<i32>], encoded: &Hypervector) -> usize {
    let mut best_class = 0;
    let mut best_score = i64::MIN;
    for (class, view) in views.iter().enumerate() {
        let score = dot_view(view, encoded);
        if score > best_score {
            best_score = score;
            best_class = class;
        }
    }
    best_class
}
