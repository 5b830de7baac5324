//! # Hyperdim
//!
//! A hyperdimensional-computing (HDC) classifier. Quantized feature vectors
//! are encoded into high-dimensional bipolar hypervectors, bundled into
//! per-class accumulators, and refined with perceptron-style retraining.
//!
//! Typical flow:
//!
//! ```no_run
//! use hyperdim_rs::{Dataset, DatasetProfile, Model};
//!
//! # fn run() -> hyperdim_rs::Result<()> {
//! let profile = DatasetProfile::mnist();
//! let config = profile.model_config(10_000, 16, 0);
//! let mut model = Model::new(config, 42)?;
//!
//! let features = std::fs::File::open("train-images")?;
//! let labels = std::fs::File::open("train-labels")?;
//! let data = Dataset::from_readers(features, labels)?;
//!
//! model.train(&data, data.len(), 20)?;
//! let correct = model.test(&data, data.len())?;
//! println!("{correct}/{} correct", data.len());
//!
//! hyperdim_rs::store::save(&model, "digits.hdm".as_ref())?;
//! # Ok(())
//! # }
//! ```
//!
//! Module map:
//! - [`basis`]: deterministic level/position hypervector tables
//! - [`encoder`]: feature vector to hypervector encoding
//! - [`model`]: trainer, classifier, and the quantized-view policy
//! - [`dataset`]: IDX-style binary decoding and the CSV converter
//! - [`store`]: binary persistence with atomic save
//! - [`bench`]: latency/throughput harnesses
//! - [`config`]: hyperparameters and dataset profiles
//! - [`error`]: the crate-wide error type

pub mod basis;
pub mod bench;
pub mod config;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod model;
pub mod store;

pub use basis::Basis;
pub use bench::{benchmark_latency, benchmark_throughput, LatencyReport, ThroughputReport};
pub use config::{DatasetProfile, ModelConfig};
pub use dataset::{convert_csv, Dataset};
pub use error::{ModelError, Result};
pub use model::{ClassAccumulator, Model};

pub use hyperdim_core::{Hypervector, SplitMix64};
