//! Boundary with named-tensor codecs.
//!
//! A codec hands out native resources that may alias storage it keeps for
//! itself. Loading through [`Tensor::from_source`] or
//! [`AnyTensor::from_source`] always copies first, so the returned handle
//! owns its resource outright.

use std::collections::BTreeMap;

use kiln_native::{NativeError, NativeResult, RawTensor};
use serde::{Deserialize, Serialize};

use crate::{AnyTensor, DType, Element, Result, Tensor};

/// A store of native tensors addressed by name.
pub trait TensorSource {
    /// The resource stored as `name`. It may share storage with the source.
    fn load(&self, name: &str) -> NativeResult<RawTensor>;

    fn names(&self) -> Vec<String>;
}

/// Summary of one archived tensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub name: String,
    pub dtype: DType,
    pub shape: Vec<usize>,
}

/// In-memory [`TensorSource`].
#[derive(Default)]
pub struct TensorArchive {
    entries: BTreeMap<String, RawTensor>,
}

impl TensorArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a copy of `tensor` as `name`, replacing any previous entry.
    pub fn insert<D: Element>(&mut self, name: impl Into<String>, tensor: &Tensor<D>) {
        self.entries.insert(name.into(), tensor.native().deep_clone());
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by name.
    pub fn manifest(&self) -> Vec<ArchiveEntry> {
        self.entries
            .iter()
            .map(|(name, raw)| ArchiveEntry {
                name: name.clone(),
                dtype: DType::from_kind(raw.kind()),
                shape: raw.shape().dims().to_vec(),
            })
            .collect()
    }
}

impl TensorSource for TensorArchive {
    /// Hands out an alias of the archived storage.
    fn load(&self, name: &str) -> NativeResult<RawTensor> {
        self.entries
            .get(name)
            .map(RawTensor::shallow_clone)
            .ok_or_else(|| NativeError::MissingEntry(name.to_string()))
    }

    fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl<D: Element> Tensor<D> {
    /// Load `name` from `source` into an independently owned tensor.
    pub fn from_source(source: &impl TensorSource, name: &str) -> Result<Tensor<D>> {
        let aliased = source.load(name)?;
        Tensor::try_from_raw(aliased.deep_clone())
    }
}

impl AnyTensor {
    /// Like [`Tensor::from_source`], with the element type taken from the
    /// stored resource.
    pub fn from_source(source: &impl TensorSource, name: &str) -> Result<AnyTensor> {
        let aliased = source.load(name)?;
        AnyTensor::from_raw(aliased.deep_clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creation::{arange, eye};
    use crate::KilnError;
    use kiln_native::{Runtime, RuntimeConfig};

    fn archive(rt: &Runtime) -> TensorArchive {
        let mut archive = TensorArchive::new();
        archive.insert("weight", &eye(rt, 2).build().unwrap());
        archive.insert("index", &arange(rt, 4).build().unwrap());
        archive
    }

    #[test]
    fn test_loaded_tensors_do_not_alias_the_archive() {
        let rt = Runtime::new(RuntimeConfig::default());
        let archive = archive(&rt);
        assert_eq!(rt.live_allocations(), 2);

        let w = Tensor::<f32>::from_source(&archive, "weight").unwrap();
        assert_eq!(rt.live_allocations(), 3);
        drop(archive);
        assert_eq!(rt.live_allocations(), 1);
        assert_eq!(w.to_vec().unwrap(), vec![1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_typed_and_dynamic_loads() {
        let rt = Runtime::new(RuntimeConfig::default());
        let archive = archive(&rt);

        let any = AnyTensor::from_source(&archive, "index").unwrap();
        assert_eq!(any.dtype(), DType::Int64);

        let err = Tensor::<f64>::from_source(&archive, "index").unwrap_err();
        assert!(matches!(err, KilnError::ResourceInvariantViolation { .. }));

        let missing = Tensor::<f32>::from_source(&archive, "bias").unwrap_err();
        assert_eq!(
            missing,
            KilnError::Native(NativeError::MissingEntry("bias".into()))
        );
        assert_eq!(rt.live_allocations(), 3);
    }

    #[test]
    fn test_manifest() {
        let rt = Runtime::new(RuntimeConfig::default());
        let mut archive = archive(&rt);
        assert_eq!(archive.names(), vec!["index".to_string(), "weight".to_string()]);

        let manifest = archive.manifest();
        assert_eq!(
            manifest[1],
            ArchiveEntry {
                name: "weight".into(),
                dtype: DType::Float32,
                shape: vec![2, 2],
            }
        );
        let json = serde_json::to_string(&manifest[0]).unwrap();
        assert_eq!(json, r#"{"name":"index","dtype":"int64","shape":[4]}"#);

        assert!(archive.remove("index"));
        assert_eq!(archive.len(), 1);
        assert!(!archive.is_empty());
    }
}
