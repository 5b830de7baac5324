//! Dataset decoding and the CSV converter.
//!
//! The engine never opens dataset files itself: it consumes abstract byte
//! sources (`impl Read`), so callers decide where bytes come from.
//!
//! Wire format (IDX-style, all header words big-endian u32):
//!
//! - **features**: tag, item count, dim0, dim1, then one unsigned byte per
//!   feature value per item, row-major (`feature_size = dim0 * dim1`).
//! - **labels**: tag, item count, then one unsigned byte per item;
//!   labels are zero-based.
//!
//! The reference converter emitted the canonical IDX tags with their low two
//! bytes swapped (`0x0308` / `0x0108` instead of `0x0803` / `0x0801`), and
//! real IDX data carries the canonical form. The loader accepts both and
//! rejects everything else; the converter writes the canonical form.

use std::io::{BufRead, Read, Write};

use crate::error::{ModelError, Result};

/// Canonical IDX tag for 3-dimensional u8 feature data.
pub const FEATURES_TAG: u32 = 0x0000_0803;
/// Byte-swapped features tag written by the legacy converter.
pub const FEATURES_TAG_SWAPPED: u32 = 0x0000_0308;
/// Canonical IDX tag for 1-dimensional u8 label data.
pub const LABELS_TAG: u32 = 0x0000_0801;
/// Byte-swapped labels tag written by the legacy converter.
pub const LABELS_TAG_SWAPPED: u32 = 0x0000_0108;

/// In-memory dataset: flat row-major feature bytes plus one label per item.
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_size: usize,
    features: Vec<u8>,
    labels: Vec<u8>,
}

impl Dataset {
    /// Decode a features stream and a labels stream and cross-check their
    /// item counts.
    pub fn from_readers<F: Read, L: Read>(features: F, labels: L) -> Result<Self> {
        let (feature_size, feature_bytes, n_features) = read_features(features)?;
        let label_bytes = read_labels(labels)?;
        if label_bytes.len() != n_features {
            return Err(ModelError::Format(format!(
                "item count mismatch: {} feature rows vs {} labels",
                n_features,
                label_bytes.len()
            )));
        }
        Ok(Self {
            feature_size,
            features: feature_bytes,
            labels: label_bytes,
        })
    }

    /// Build a dataset directly from parts (hand-built training sets, tests).
    pub fn from_parts(feature_size: usize, features: Vec<u8>, labels: Vec<u8>) -> Result<Self> {
        if feature_size == 0 {
            return Err(ModelError::InvalidArgument("feature_size must be > 0".into()));
        }
        if features.len() != feature_size * labels.len() {
            return Err(ModelError::InvalidArgument(format!(
                "expected {} feature bytes for {} items, got {}",
                feature_size * labels.len(),
                labels.len(),
                features.len()
            )));
        }
        Ok(Self {
            feature_size,
            features,
            labels,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn feature_size(&self) -> usize {
        self.feature_size
    }

    /// Feature row for item `idx`.
    #[inline]
    pub fn features(&self, idx: usize) -> &[u8] {
        &self.features[idx * self.feature_size..(idx + 1) * self.feature_size]
    }

    /// Zero-based label for item `idx`.
    #[inline]
    pub fn label(&self, idx: usize) -> u8 {
        self.labels[idx]
    }
}

fn read_u32_be<R: Read>(r: &mut R, what: &str) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ModelError::Format(format!("truncated {what} header"))
        } else {
            ModelError::Io(e)
        }
    })?;
    Ok(u32::from_be_bytes(buf))
}

fn read_exact_body<R: Read>(r: &mut R, len: usize, what: &str) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ModelError::Format(format!("{what} body shorter than header promises"))
        } else {
            ModelError::Io(e)
        }
    })?;
    Ok(buf)
}

/// Returns (feature_size, flat bytes, item count).
fn read_features<R: Read>(mut r: R) -> Result<(usize, Vec<u8>, usize)> {
    let tag = read_u32_be(&mut r, "features")?;
    if tag != FEATURES_TAG && tag != FEATURES_TAG_SWAPPED {
        return Err(ModelError::Format(format!(
            "features tag {tag:#010x} is neither {FEATURES_TAG:#06x} nor {FEATURES_TAG_SWAPPED:#06x}"
        )));
    }
    let n_items = read_u32_be(&mut r, "features")? as usize;
    let dim0 = read_u32_be(&mut r, "features")? as usize;
    let dim1 = read_u32_be(&mut r, "features")? as usize;
    let feature_size = dim0 * dim1;
    if feature_size == 0 {
        return Err(ModelError::Format(format!(
            "features header declares zero-sized items ({dim0} x {dim1})"
        )));
    }
    let body = read_exact_body(&mut r, n_items * feature_size, "features")?;
    Ok((feature_size, body, n_items))
}

fn read_labels<R: Read>(mut r: R) -> Result<Vec<u8>> {
    let tag = read_u32_be(&mut r, "labels")?;
    if tag != LABELS_TAG && tag != LABELS_TAG_SWAPPED {
        return Err(ModelError::Format(format!(
            "labels tag {tag:#010x} is neither {LABELS_TAG:#06x} nor {LABELS_TAG_SWAPPED:#06x}"
        )));
    }
    let n_items = read_u32_be(&mut r, "labels")? as usize;
    read_exact_body(&mut r, n_items, "labels")
}

/// Map a source feature value in [-1, 1] to a byte: `round(((v+1)/2)*255)`,
/// clamped to [0, 255].
#[inline]
fn map_feature(v: f64) -> u8 {
    (((v + 1.0) / 2.0) * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Convert CSV rows of `feature, ..., feature, label` into the binary
/// features + labels streams. The label column is 1-based (a trailing `.`
/// is tolerated) and is written zero-based. Returns the item count.
pub fn convert_csv<R, FW, LW>(input: R, features_out: &mut FW, labels_out: &mut LW) -> Result<usize>
where
    R: BufRead,
    FW: Write,
    LW: Write,
{
    let mut rows: Vec<Vec<u8>> = Vec::new();
    let mut labels: Vec<u8> = Vec::new();
    let mut feature_size = 0usize;

    for (line_no, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.split(',').collect();
        if columns.len() < 2 {
            return Err(ModelError::Format(format!(
                "line {}: need at least one feature and a label",
                line_no + 1
            )));
        }
        let (feature_cols, label_col) = columns.split_at(columns.len() - 1);

        if feature_size == 0 {
            feature_size = feature_cols.len();
        } else if feature_cols.len() != feature_size {
            return Err(ModelError::Format(format!(
                "line {}: expected {} features, got {}",
                line_no + 1,
                feature_size,
                feature_cols.len()
            )));
        }

        let label_text = label_col[0].trim().trim_end_matches('.');
        let label: u32 = label_text.parse().map_err(|_| {
            ModelError::Format(format!("line {}: bad label {:?}", line_no + 1, label_col[0]))
        })?;
        if label == 0 || label > 256 {
            return Err(ModelError::Format(format!(
                "line {}: label {} outside 1..=256",
                line_no + 1,
                label
            )));
        }
        labels.push((label - 1) as u8);

        let mut row = Vec::with_capacity(feature_size);
        for col in feature_cols {
            let v: f64 = col.trim().parse().map_err(|_| {
                ModelError::Format(format!("line {}: bad feature {:?}", line_no + 1, col))
            })?;
            row.push(map_feature(v));
        }
        rows.push(row);
    }

    let n_items = rows.len() as u32;
    features_out.write_all(&FEATURES_TAG.to_be_bytes())?;
    features_out.write_all(&n_items.to_be_bytes())?;
    features_out.write_all(&(feature_size as u32).to_be_bytes())?;
    features_out.write_all(&1u32.to_be_bytes())?;
    for row in &rows {
        features_out.write_all(row)?;
    }

    labels_out.write_all(&LABELS_TAG.to_be_bytes())?;
    labels_out.write_all(&n_items.to_be_bytes())?;
    labels_out.write_all(&labels)?;

    Ok(rows.len())
}
