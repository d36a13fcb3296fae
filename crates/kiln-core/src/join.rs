//! Typed joins.
//!
//! Sharing one element type is enforced by the signature. Shapes are checked
//! here so an incompatible set surfaces as [`KilnError::ShapeMismatch`]
//! without reaching the native layer.

use kiln_native::{RawTensor, Runtime, Shape};

use crate::{Element, KilnError, Result, Tensor};

/// Concatenate along the existing axis `dim`. Negative `dim` counts from the
/// end.
pub fn cat<D: Element>(runtime: &Runtime, tensors: &[&Tensor<D>], dim: isize) -> Result<Tensor<D>> {
    if let Some((first, rest)) = tensors.split_first() {
        let dims = first.dims();
        if let Some(axis) = Shape::normalize_axis(dim, dims.len()) {
            for t in rest {
                let other = t.dims();
                let compatible = other.len() == dims.len()
                    && (0..dims.len()).all(|d| d == axis || other[d] == dims[d]);
                if !compatible {
                    return Err(mismatch("cat", dims, other));
                }
            }
        }
    }
    let raws: Vec<&RawTensor> = tensors.iter().map(|t| t.native()).collect();
    Tensor::try_from_raw(runtime.cat(&raws, dim)?)
}

/// Join along a new axis inserted at `dim`. All inputs must share one shape.
pub fn stack<D: Element>(
    runtime: &Runtime,
    tensors: &[&Tensor<D>],
    dim: isize,
) -> Result<Tensor<D>> {
    if let Some((first, rest)) = tensors.split_first() {
        if let Some(t) = rest.iter().find(|t| t.dims() != first.dims()) {
            return Err(mismatch("stack", first.dims(), t.dims()));
        }
    }
    let raws: Vec<&RawTensor> = tensors.iter().map(|t| t.native()).collect();
    Tensor::try_from_raw(runtime.stack(&raws, dim)?)
}

fn mismatch(op: &'static str, expected: &[usize], got: &[usize]) -> KilnError {
    KilnError::ShapeMismatch {
        op,
        expected: expected.to_vec(),
        got: got.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creation::{arange, full, ones, zeros};
    use kiln_native::{NativeError, RuntimeConfig};

    fn rt() -> Runtime {
        Runtime::new(RuntimeConfig::default().with_num_threads(1))
    }

    #[test]
    fn test_cat_shapes() {
        let rt = rt();
        let a = zeros(&rt, [2, 3]).build().unwrap();
        let b = ones(&rt, [2, 3]).build().unwrap();
        let c = cat(&rt, &[&a, &b], 0).unwrap();
        assert_eq!(c.dims(), &[4, 3]);
        let d = cat(&rt, &[&a, &b], -1).unwrap();
        assert_eq!(d.dims(), &[2, 6]);
        assert_eq!(
            d.to_vec().unwrap(),
            vec![0.0f32, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_cat_shape_mismatch_is_typed() {
        let rt = rt();
        let a = zeros(&rt, [2, 3]).build().unwrap();
        let b = zeros(&rt, [2, 4]).build().unwrap();
        let err = cat(&rt, &[&a, &b], 0).unwrap_err();
        assert_eq!(
            err,
            KilnError::ShapeMismatch {
                op: "cat",
                expected: vec![2, 3],
                got: vec![2, 4],
            }
        );
        assert!(cat(&rt, &[&a, &b], 1).is_ok());
        assert_eq!(rt.live_allocations(), 2);
    }

    #[test]
    fn test_stack() {
        let rt = rt();
        let parts: Vec<Tensor<i64>> = (0..3).map(|v| full(&rt, [2], v).build().unwrap()).collect();
        let refs: Vec<&Tensor<i64>> = parts.iter().collect();
        let s = stack(&rt, &refs, 0).unwrap();
        assert_eq!(s.dims(), &[3, 2]);
        assert_eq!(s.to_vec().unwrap(), vec![0, 0, 1, 1, 2, 2]);
        let t = stack(&rt, &refs, -1).unwrap();
        assert_eq!(t.dims(), &[2, 3]);
        assert_eq!(t.to_vec().unwrap(), vec![0, 1, 2, 0, 1, 2]);

        let odd = arange(&rt, 3).build().unwrap();
        assert!(matches!(
            stack(&rt, &[&parts[0], &odd], 0),
            Err(KilnError::ShapeMismatch { op: "stack", .. })
        ));
    }

    #[test]
    fn test_invalid_arguments_reach_native_layer() {
        let rt = rt();
        let empty: [&Tensor<f32>; 0] = [];
        assert!(matches!(
            cat(&rt, &empty, 0),
            Err(KilnError::Native(NativeError::InvalidArgument(_)))
        ));
        let a = zeros(&rt, [2]).build().unwrap();
        assert!(matches!(
            cat(&rt, &[&a], 3),
            Err(KilnError::Native(NativeError::InvalidArgument(_)))
        ));
    }
}
