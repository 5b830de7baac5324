//! Model and dataset-profile configuration.
//!
//! A `DatasetProfile` is plain data describing a dataset family (feature
//! layout and class count). It replaces per-dataset model subclasses: one
//! generic engine, parameterized by configuration, no virtual dispatch.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Hyperparameters fixed for a model's lifetime.
///
/// `class_vector_quant` is the one field that is conceptually a view
/// parameter (see the quantization policy in `model`): it may be changed on
/// a live model without retraining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Hypervector dimensionality D (e.g. 10_000).
    pub dim: usize,
    /// Number of input quantization levels (level-table size), ≥ 1.
    pub input_quant: usize,
    /// Class-vector quantization Q: 0 = raw accumulators, otherwise even ≥ 2.
    pub class_vector_quant: usize,
    /// Flat feature-vector length (e.g. 784 for 28×28 images).
    pub feature_size: usize,
    /// Number of class labels.
    pub n_classes: usize,
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dim == 0 {
            return Err(ModelError::InvalidArgument("dim must be > 0".into()));
        }
        if self.input_quant == 0 {
            return Err(ModelError::InvalidArgument("input_quant must be >= 1".into()));
        }
        validate_class_vector_quant(self.class_vector_quant)?;
        if self.feature_size == 0 {
            return Err(ModelError::InvalidArgument("feature_size must be > 0".into()));
        }
        if self.n_classes == 0 {
            return Err(ModelError::InvalidArgument("n_classes must be > 0".into()));
        }
        Ok(())
    }
}

/// Q must be 0 (no quantization) or even and ≥ 2, so the signed level range
/// [-Q/2, Q/2-1] is symmetric around zero.
pub(crate) fn validate_class_vector_quant(q: usize) -> Result<()> {
    if q != 0 && (q < 2 || q % 2 != 0) {
        return Err(ModelError::InvalidArgument(format!(
            "class_vector_quant must be 0 or even >= 2, got {q}"
        )));
    }
    Ok(())
}

/// Shape of a dataset family: feature layout and label count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub name: String,
    pub feature_size: usize,
    pub n_classes: usize,
}

impl DatasetProfile {
    /// 28×28 grayscale digits, 10 classes.
    pub fn mnist() -> Self {
        Self {
            name: "mnist".into(),
            feature_size: 28 * 28,
            n_classes: 10,
        }
    }

    /// 617 acoustic features, 26 spoken-letter classes.
    pub fn isolet() -> Self {
        Self {
            name: "isolet".into(),
            feature_size: 617,
            n_classes: 26,
        }
    }

    /// Combine the profile's shape with the engine hyperparameters.
    pub fn model_config(
        &self,
        dim: usize,
        input_quant: usize,
        class_vector_quant: usize,
    ) -> ModelConfig {
        ModelConfig {
            dim,
            input_quant,
            class_vector_quant,
            feature_size: self.feature_size,
            n_classes: self.n_classes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ModelConfig {
        ModelConfig {
            dim: 10_000,
            input_quant: 16,
            class_vector_quant: 0,
            feature_size: 784,
            n_classes: 10,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_zero_dim_rejected() {
        let mut c = base();
        c.dim = 0;
        assert!(matches!(c.validate(), Err(ModelError::InvalidArgument(_))));
    }

    #[test]
    fn test_zero_input_quant_rejected() {
        let mut c = base();
        c.input_quant = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_odd_class_quant_rejected() {
        let mut c = base();
        c.class_vector_quant = 3;
        assert!(c.validate().is_err());
        c.class_vector_quant = 1;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_even_class_quant_accepted() {
        let mut c = base();
        for q in [0usize, 2, 4, 16, 256] {
            c.class_vector_quant = q;
            assert!(c.validate().is_ok(), "q={q} should be valid");
        }
    }

    #[test]
    fn test_profiles() {
        assert_eq!(DatasetProfile::mnist().feature_size, 784);
        assert_eq!(DatasetProfile::isolet().n_classes, 26);
        let cfg = DatasetProfile::isolet().model_config(10_000, 2, 2);
        assert_eq!(cfg.feature_size, 617);
        assert!(cfg.validate().is_ok());
    }
}
