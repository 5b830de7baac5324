//! Binary model persistence.
//!
//! One self-describing blob, all integers big-endian (matching the dataset
//! format):
//!
//! | field                   | size                      |
//! |-------------------------|---------------------------|
//! | magic `"HDM1"`          | u32                       |
//! | dim                     | u32                       |
//! | input_quant             | u32                       |
//! | class_vector_quant      | u32                       |
//! | feature_size            | u32                       |
//! | n_classes               | u32                       |
//! | seed                    | u64                       |
//! | level table             | input_quant × dim i8      |
//! | position table          | feature_size × dim i8     |
//! | accumulators            | n_classes × dim i32 (BE)  |
//!
//! The raw accumulators are authoritative; the quantized classify view is
//! always rederived, never persisted. `save` is atomic: the blob lands in a
//! temp file next to the destination and is renamed into place.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use hyperdim_core::Hypervector;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::basis::Basis;
use crate::config::ModelConfig;
use crate::error::{ModelError, Result};
use crate::model::{ClassAccumulator, Model};

/// `"HDM1"` as a big-endian word.
pub const MODEL_MAGIC: u32 = 0x4844_4D31;

/// Serialize `model` to any byte sink.
pub fn write_to<W: Write>(model: &Model, mut w: W) -> Result<()> {
    let config = model.config();
    w.write_all(&MODEL_MAGIC.to_be_bytes())?;
    w.write_all(&(config.dim as u32).to_be_bytes())?;
    w.write_all(&(config.input_quant as u32).to_be_bytes())?;
    w.write_all(&(config.class_vector_quant as u32).to_be_bytes())?;
    w.write_all(&(config.feature_size as u32).to_be_bytes())?;
    w.write_all(&(config.n_classes as u32).to_be_bytes())?;
    w.write_all(&model.seed().to_be_bytes())?;

    for hv in model.basis().levels().iter().chain(model.basis().positions()) {
        write_bipolar(&mut w, hv)?;
    }
    for acc in model.accumulators() {
        for &count in acc.counts() {
            w.write_all(&count.to_be_bytes())?;
        }
    }
    Ok(())
}

/// Deserialize a model from any byte source. Header invariants are checked
/// before any table is allocated.
pub fn read_from<R: Read>(mut r: R) -> Result<Model> {
    let magic = read_u32(&mut r)?;
    if magic != MODEL_MAGIC {
        return Err(ModelError::Format(format!(
            "bad model magic {magic:#010x}, expected {MODEL_MAGIC:#010x}"
        )));
    }
    let config = ModelConfig {
        dim: read_u32(&mut r)? as usize,
        input_quant: read_u32(&mut r)? as usize,
        class_vector_quant: read_u32(&mut r)? as usize,
        feature_size: read_u32(&mut r)? as usize,
        n_classes: read_u32(&mut r)? as usize,
    };
    config
        .validate()
        .map_err(|e| ModelError::Format(format!("model header: {e}")))?;
    let seed = read_u64(&mut r)?;

    let levels = (0..config.input_quant)
        .map(|_| read_bipolar(&mut r, config.dim))
        .collect::<Result<Vec<_>>>()?;
    let positions = (0..config.feature_size)
        .map(|_| read_bipolar(&mut r, config.dim))
        .collect::<Result<Vec<_>>>()?;

    let mut accumulators = Vec::with_capacity(config.n_classes);
    for _ in 0..config.n_classes {
        let mut counts = Vec::with_capacity(config.dim);
        for _ in 0..config.dim {
            counts.push(read_u32(&mut r)? as i32);
        }
        accumulators.push(ClassAccumulator::from_counts(counts));
    }

    Ok(Model::from_parts(
        config,
        seed,
        Basis::from_tables(levels, positions),
        accumulators,
    ))
}

/// Write the model to `path`, replacing any existing file atomically.
pub fn save(model: &Model, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)?;
    let mut writer = BufWriter::new(tmp);
    write_to(model, &mut writer)?;
    let tmp = writer
        .into_inner()
        .map_err(|e| ModelError::Io(e.into_error()))?;
    tmp.persist(path).map_err(|e| ModelError::Io(e.error))?;
    debug!(path = %path.display(), "model saved");
    Ok(())
}

/// Load a model from `path`.
pub fn load(path: &Path) -> Result<Model> {
    let file = File::open(path)?;
    let model = read_from(BufReader::new(file))?;
    debug!(path = %path.display(), "model loaded");
    Ok(model)
}

fn write_bipolar<W: Write>(w: &mut W, hv: &Hypervector) -> Result<()> {
    let bytes: Vec<u8> = hv.components().iter().map(|&c| c as u8).collect();
    w.write_all(&bytes)?;
    Ok(())
}

fn read_bipolar<R: Read>(r: &mut R, dim: usize) -> Result<Hypervector> {
    let mut bytes = vec![0u8; dim];
    r.read_exact(&mut bytes).map_err(truncation)?;
    let mut comps = Vec::with_capacity(dim);
    for b in bytes {
        match b as i8 {
            1 => comps.push(1),
            -1 => comps.push(-1),
            other => {
                return Err(ModelError::Format(format!(
                    "basis table byte {other} is not a bipolar component"
                )))
            }
        }
    }
    Ok(Hypervector::from_components(comps))
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(truncation)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(truncation)?;
    Ok(u64::from_be_bytes(buf))
}

fn truncation(e: std::io::Error) -> ModelError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        ModelError::Format("model blob truncated".into())
    } else {
        ModelError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn trained_model() -> Model {
        let config = ModelConfig {
            dim: 800,
            input_quant: 4,
            class_vector_quant: 0,
            feature_size: 4,
            n_classes: 2,
        };
        let mut model = Model::new(config, 99).unwrap();
        let data = Dataset::from_parts(
            4,
            vec![0, 0, 200, 200, 200, 200, 0, 0],
            vec![0, 1],
        )
        .unwrap();
        model.train(&data, 2, 1).unwrap();
        model
    }

    #[test]
    fn test_round_trip_preserves_behavior() {
        let model = trained_model();
        let mut blob = Vec::new();
        write_to(&model, &mut blob).unwrap();
        let restored = read_from(blob.as_slice()).unwrap();

        assert_eq!(restored.config(), model.config());
        assert_eq!(restored.seed(), model.seed());
        assert_eq!(restored.accumulators(), model.accumulators());
        let features = [13u8, 200, 55, 0];
        assert_eq!(
            restored.encode(&features).unwrap(),
            model.encode(&features).unwrap()
        );
        assert_eq!(
            restored.classify(&features).unwrap(),
            model.classify(&features).unwrap()
        );
    }

    #[test]
    fn test_save_load_file() {
        let model = trained_model();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.hdm");
        save(&model, &path).unwrap();
        let restored = load(&path).unwrap();
        assert_eq!(restored.accumulators(), model.accumulators());
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let model = trained_model();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.hdm");
        std::fs::write(&path, b"stale").unwrap();
        save(&model, &path).unwrap();
        let restored = load(&path).unwrap();
        assert_eq!(restored.config(), model.config());
    }

    #[test]
    fn test_bad_magic_rejected() {
        let model = trained_model();
        let mut blob = Vec::new();
        write_to(&model, &mut blob).unwrap();
        blob[0] ^= 0xff;
        assert!(matches!(
            read_from(blob.as_slice()),
            Err(ModelError::Format(_))
        ));
    }

    #[test]
    fn test_truncated_blob_rejected() {
        let model = trained_model();
        let mut blob = Vec::new();
        write_to(&model, &mut blob).unwrap();
        blob.truncate(blob.len() - 7);
        assert!(matches!(
            read_from(blob.as_slice()),
            Err(ModelError::Format(_))
        ));
    }

    #[test]
    fn test_corrupt_table_byte_rejected() {
        let model = trained_model();
        let mut blob = Vec::new();
        write_to(&model, &mut blob).unwrap();
        blob[32 + 5] = 3; // inside the level table
        assert!(matches!(
            read_from(blob.as_slice()),
            Err(ModelError::Format(_))
        ));
    }

    #[test]
    fn test_invalid_header_rejected_before_tables() {
        // dim = 0 violates config invariants.
        let mut blob = Vec::new();
        blob.extend_from_slice(&MODEL_MAGIC.to_be_bytes());
        for word in [0u32, 4, 0, 4, 2] {
            blob.extend_from_slice(&word.to_be_bytes());
        }
        blob.extend_from_slice(&99u64.to_be_bytes());
        assert!(matches!(
            read_from(blob.as_slice()),
            Err(ModelError::Format(_))
        ));
    }
}
