//! # Hyperdim Core
//!
//! Shared primitives for the hyperdim ecosystem.
//!
//! This crate provides:
//! - **Hypervector**: the bipolar (±1) high-dimensional vector that is the
//!   unit of representation, with bind (componentwise product), dot-product
//!   similarity, and deterministic random generation.
//! - **SplitMix64**: a tiny deterministic PRNG used for all basis-vector
//!   generation, so a seed fully reproduces a model's encoding behavior.
//! - **Worker-pool helpers**: index-range partitioning and scoped-thread
//!   fan-out for data-parallel encode/classify workloads.

pub mod hypervector;
pub mod parallel;
pub mod rng;

pub use hypervector::Hypervector;
pub use parallel::{parallel_map_ranges, split_ranges, DEFAULT_WORKERS};
pub use rng::SplitMix64;
