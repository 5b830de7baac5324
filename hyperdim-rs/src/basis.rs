//! Deterministic basis-vector generation.
//!
//! Two tables, generated once per model from a `SplitMix64` seed and never
//! regenerated (a loaded model restores them verbatim):
//!
//! - **Level table** (`input_quant` entries): level 0 is random; each
//!   subsequent level flips a fresh, non-overlapping set of
//!   `⌊D / (2·(L-1))⌋` components relative to its predecessor. Adjacent
//!   levels stay highly similar while the endpoints end up near-orthogonal
//!   (Hamming distance D/2), giving continuous quantization semantics.
//! - **Position table** (`feature_size` entries): independent random
//!   hypervectors, mutually near-orthogonal by dimensionality alone.

use hyperdim_core::{Hypervector, SplitMix64};

/// Immutable level + position hypervector tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basis {
    dim: usize,
    levels: Vec<Hypervector>,
    positions: Vec<Hypervector>,
}

impl Basis {
    /// Generate fresh tables. `n_levels >= 1`, `n_positions >= 1` (enforced
    /// upstream by `ModelConfig::validate`).
    pub fn generate(
        dim: usize,
        n_levels: usize,
        n_positions: usize,
        rng: &mut SplitMix64,
    ) -> Self {
        let positions = (0..n_positions)
            .map(|_| Hypervector::random(dim, rng))
            .collect();

        let mut levels = Vec::with_capacity(n_levels);
        levels.push(Hypervector::random(dim, rng));

        // Total flips across all steps is D/2, so every step can draw from
        // components no earlier step has touched.
        let flips_per_level = if n_levels > 1 {
            dim / (2 * (n_levels - 1))
        } else {
            0
        };
        let mut flipped = vec![false; dim];
        for _ in 1..n_levels {
            let mut level = levels[levels.len() - 1].clone();
            for _ in 0..flips_per_level {
                let mut idx = rng.next_below(dim);
                while flipped[idx] {
                    idx = (idx + 1) % dim;
                }
                flipped[idx] = true;
                level.flip(idx);
            }
            levels.push(level);
        }

        Self {
            dim,
            levels,
            positions,
        }
    }

    /// Reassemble from persisted tables. All vectors must share one length.
    pub(crate) fn from_tables(levels: Vec<Hypervector>, positions: Vec<Hypervector>) -> Self {
        let dim = levels[0].len();
        debug_assert!(levels.iter().chain(positions.iter()).all(|v| v.len() == dim));
        Self {
            dim,
            levels,
            positions,
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn n_positions(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn level(&self, idx: usize) -> &Hypervector {
        &self.levels[idx]
    }

    #[inline]
    pub fn position(&self, idx: usize) -> &Hypervector {
        &self.positions[idx]
    }

    pub fn levels(&self) -> &[Hypervector] {
        &self.levels
    }

    pub fn positions(&self) -> &[Hypervector] {
        &self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(dim: usize, n_levels: usize, n_positions: usize) -> Basis {
        Basis::generate(dim, n_levels, n_positions, &mut SplitMix64::new(42))
    }

    #[test]
    fn test_table_sizes() {
        let basis = generate(1000, 16, 64);
        assert_eq!(basis.n_levels(), 16);
        assert_eq!(basis.n_positions(), 64);
        assert_eq!(basis.dim(), 1000);
    }

    #[test]
    fn test_adjacent_levels_differ_by_flip_count() {
        let dim = 960;
        let n_levels = 16;
        let basis = generate(dim, n_levels, 4);
        let expected = dim / (2 * (n_levels - 1));
        for i in 1..n_levels {
            assert_eq!(
                basis.level(i - 1).hamming_distance(basis.level(i)),
                expected
            );
        }
    }

    #[test]
    fn test_level_similarity_monotonic() {
        let basis = generate(10_000, 16, 4);
        // Flips never overlap, so distance from level 0 grows strictly.
        for j in 2..16 {
            let closer = basis.level(0).similarity(basis.level(j - 1));
            let farther = basis.level(0).similarity(basis.level(j));
            assert!(
                farther < closer,
                "similarity(0,{}) = {farther} should be < similarity(0,{}) = {closer}",
                j,
                j - 1
            );
        }
    }

    #[test]
    fn test_endpoint_levels_near_orthogonal() {
        let dim = 10_000;
        let n_levels = 2;
        let basis = generate(dim, n_levels, 4);
        // L=2: exactly D/2 flips, endpoints exactly orthogonal.
        assert_eq!(basis.level(0).hamming_distance(basis.level(1)), dim / 2);
        assert_eq!(basis.level(0).dot(basis.level(1)), 0);
    }

    #[test]
    fn test_single_level_no_flips() {
        let basis = generate(1000, 1, 4);
        assert_eq!(basis.n_levels(), 1);
    }

    #[test]
    fn test_positions_near_orthogonal() {
        let basis = generate(10_000, 4, 32);
        let mut total = 0.0;
        let mut pairs = 0usize;
        for i in 0..32 {
            for j in (i + 1)..32 {
                total += basis.position(i).similarity(basis.position(j));
                pairs += 1;
            }
        }
        assert!((total / pairs as f64).abs() < 0.05);
    }

    #[test]
    fn test_same_seed_reproducible() {
        let a = generate(2000, 8, 16);
        let b = generate(2000, 8, 16);
        assert_eq!(a, b);
    }
}
