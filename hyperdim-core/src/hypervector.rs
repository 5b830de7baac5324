//! Bipolar hypervector: the unit of representation.
//!
//! Components are ±1 stored as `i8`. With bipolar components:
//! - **Bind** = componentwise product (self-inverse, result dissimilar to
//!   both inputs)
//! - **Bundle** = componentwise sum + sign (done by the encoder, which keeps
//!   the i32 accumulation buffer)
//! - **Similarity** = dot product / D, in [-1.0, 1.0]; two independent random
//!   hypervectors have expected similarity ≈ 0.

use crate::rng::SplitMix64;

/// Fixed-length bipolar (±1) vector of dimensionality D.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hypervector {
    comps: Vec<i8>,
}

impl Hypervector {
    /// Random bipolar hypervector: one bit of PRNG output per component.
    pub fn random(dim: usize, rng: &mut SplitMix64) -> Self {
        let mut comps = Vec::with_capacity(dim);
        let mut word = 0u64;
        for i in 0..dim {
            if i % 64 == 0 {
                word = rng.next_u64();
            }
            comps.push(if word & 1 == 1 { 1 } else { -1 });
            word >>= 1;
        }
        Self { comps }
    }

    /// Wrap pre-existing components. Callers must pass only ±1 values;
    /// deserialization validates before reaching this point.
    pub fn from_components(comps: Vec<i8>) -> Self {
        debug_assert!(comps.iter().all(|&c| c == 1 || c == -1));
        Self { comps }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.comps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.comps.is_empty()
    }

    #[inline]
    pub fn components(&self) -> &[i8] {
        &self.comps
    }

    /// Negate component `idx`. Used only during level-table construction.
    #[inline]
    pub fn flip(&mut self, idx: usize) {
        self.comps[idx] = -self.comps[idx];
    }

    /// Componentwise product. Self-inverse: `a.bind(&b).bind(&b) == a`.
    pub fn bind(&self, other: &Self) -> Self {
        assert_eq!(self.len(), other.len());
        Self {
            comps: self
                .comps
                .iter()
                .zip(other.comps.iter())
                .map(|(&a, &b)| a * b)
                .collect(),
        }
    }

    /// Dot product. For bipolar operands this is `D - 2 * hamming`.
    pub fn dot(&self, other: &Self) -> i64 {
        assert_eq!(self.len(), other.len());
        self.comps
            .iter()
            .zip(other.comps.iter())
            .map(|(&a, &b)| (a as i64) * (b as i64))
            .sum()
    }

    /// Normalized similarity in [-1.0, 1.0]. 1.0 = identical, 0.0 = orthogonal.
    pub fn similarity(&self, other: &Self) -> f64 {
        self.dot(other) as f64 / self.len() as f64
    }

    /// Number of disagreeing components.
    pub fn hamming_distance(&self, other: &Self) -> usize {
        (self.len() as i64 - self.dot(other)) as usize / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rng() -> SplitMix64 {
        SplitMix64::new(42)
    }

    #[test]
    fn test_random_is_bipolar() {
        let mut rng = make_rng();
        let v = Hypervector::random(1000, &mut rng);
        assert_eq!(v.len(), 1000);
        assert!(v.components().iter().all(|&c| c == 1 || c == -1));
    }

    #[test]
    fn test_dot_self_is_dim() {
        let mut rng = make_rng();
        let v = Hypervector::random(1000, &mut rng);
        assert_eq!(v.dot(&v), 1000);
        assert_eq!(v.hamming_distance(&v), 0);
    }

    #[test]
    fn test_bind_self_inverse() {
        let mut rng = make_rng();
        let a = Hypervector::random(512, &mut rng);
        let b = Hypervector::random(512, &mut rng);
        assert_eq!(a.bind(&b).bind(&b), a);
    }

    #[test]
    fn test_bind_commutative() {
        let mut rng = make_rng();
        let a = Hypervector::random(512, &mut rng);
        let b = Hypervector::random(512, &mut rng);
        assert_eq!(a.bind(&b), b.bind(&a));
    }

    #[test]
    fn test_bind_dissimilar_to_inputs() {
        let mut rng = make_rng();
        let a = Hypervector::random(10_000, &mut rng);
        let b = Hypervector::random(10_000, &mut rng);
        let bound = a.bind(&b);
        assert!(bound.similarity(&a).abs() < 0.05);
        assert!(bound.similarity(&b).abs() < 0.05);
    }

    #[test]
    fn test_random_near_orthogonal() {
        let mut rng = make_rng();
        let a = Hypervector::random(10_000, &mut rng);
        let b = Hypervector::random(10_000, &mut rng);
        assert!(a.similarity(&b).abs() < 0.05);
    }

    #[test]
    fn test_flip_changes_one_component() {
        let mut rng = make_rng();
        let a = Hypervector::random(100, &mut rng);
        let mut b = a.clone();
        b.flip(17);
        assert_eq!(a.hamming_distance(&b), 1);
        assert_eq!(a.dot(&b), 98);
    }

    #[test]
    fn test_same_seed_reproducible() {
        let a = Hypervector::random(777, &mut SplitMix64::new(5));
        let b = Hypervector::random(777, &mut SplitMix64::new(5));
        assert_eq!(a, b);
    }
}
