//! Feature-vector encoding: quantize, bind, bundle.
//!
//! One quantized feature vector maps to one hypervector:
//! 1. each byte value picks a level vector (`v * Q / 256`),
//! 2. the level is bound to that feature's position vector (componentwise
//!    product),
//! 3. all bound vectors are bundled by componentwise summation, and the sum
//!    is collapsed to ±1 by sign (ties go to +1).
//!
//! Pure function of (features, basis): no side effects, O(feature_size · D)
//! time, O(D) scratch.

use hyperdim_core::Hypervector;

use crate::basis::Basis;

/// Map a byte-range feature value to a level index in `[0, input_quant)`.
///
/// Integer form of `floor(v / 256 * input_quant)`; the clamp is implicit
/// because `v <= 255`.
#[inline]
pub fn level_index(value: u8, input_quant: usize) -> usize {
    value as usize * input_quant / 256
}

/// Encode one feature vector against the basis tables.
///
/// `features.len()` must equal the basis position count; the model layer
/// validates this before calling.
pub fn encode(features: &[u8], basis: &Basis, input_quant: usize) -> Hypervector {
    debug_assert_eq!(features.len(), basis.n_positions());

    let dim = basis.dim();
    let mut acc = vec![0i32; dim];
    for (i, &value) in features.iter().enumerate() {
        let level = basis.level(level_index(value, input_quant));
        let position = basis.position(i);
        for (slot, (&l, &p)) in acc
            .iter_mut()
            .zip(level.components().iter().zip(position.components().iter()))
        {
            *slot += (l * p) as i32;
        }
    }

    Hypervector::from_components(
        acc.into_iter()
            .map(|sum| if sum >= 0 { 1 } else { -1 })
            .collect(),
    )
}
