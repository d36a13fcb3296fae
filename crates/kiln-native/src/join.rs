//! Native joins: cat and stack.

use crate::storage::Buffer;
use crate::{MemoryFormat, NativeError, NativeOptions, NativeResult, RawTensor, Runtime, Shape};

impl Runtime {
    /// Concatenate along an existing axis. Off-axis dimensions must agree.
    pub fn cat(&self, tensors: &[&RawTensor], dim: isize) -> NativeResult<RawTensor> {
        let first = check_common("cat", tensors)?;
        let ndim = first.shape().ndim();
        if ndim == 0 {
            return Err(NativeError::InvalidArgument(
                "cat: zero-dimensional tensor cannot be concatenated".into(),
            ));
        }
        let axis = Shape::normalize_axis(dim, ndim).ok_or_else(|| {
            NativeError::InvalidArgument(format!("cat: dim {dim} out of range for {ndim}-D tensors"))
        })?;

        let dims = first.shape().dims();
        for t in &tensors[1..] {
            let other = t.shape().dims();
            let compatible = other.len() == ndim
                && (0..ndim).all(|d| d == axis || other[d] == dims[d]);
            if !compatible {
                return Err(NativeError::ShapeMismatch {
                    op: "cat",
                    expected: dims.to_vec(),
                    got: other.to_vec(),
                });
            }
        }

        let sizes: Vec<usize> = tensors.iter().map(|t| t.shape().dims()[axis]).collect();
        let mut out_dims = dims.to_vec();
        out_dims[axis] = sizes.iter().sum();
        let outer: usize = dims[..axis].iter().product();
        let inner: usize = dims[axis + 1..].iter().product();
        self.join("cat", tensors, outer, &sizes, inner, Shape::from(out_dims))
    }

    /// Join along a new axis inserted at `dim`. All shapes must agree.
    pub fn stack(&self, tensors: &[&RawTensor], dim: isize) -> NativeResult<RawTensor> {
        let first = check_common("stack", tensors)?;
        let shape = first.shape();
        let axis = Shape::normalize_axis(dim, shape.ndim() + 1).ok_or_else(|| {
            NativeError::InvalidArgument(format!(
                "stack: dim {dim} out of range for {}-D tensors",
                shape.ndim()
            ))
        })?;
        for t in &tensors[1..] {
            if t.shape() != shape {
                return Err(NativeError::ShapeMismatch {
                    op: "stack",
                    expected: shape.dims().to_vec(),
                    got: t.shape().dims().to_vec(),
                });
            }
        }

        let sizes = vec![1; tensors.len()];
        let outer: usize = shape.dims()[..axis].iter().product();
        let inner: usize = shape.dims()[axis..].iter().product();
        let out_shape = shape.with_axis(axis, tensors.len());
        self.join("stack", tensors, outer, &sizes, inner, out_shape)
    }

    fn join(
        &self,
        op: &'static str,
        tensors: &[&RawTensor],
        outer: usize,
        sizes: &[usize],
        inner: usize,
        out_shape: Shape,
    ) -> NativeResult<RawTensor> {
        let first = tensors[0];
        let buffers: Vec<&Buffer> = tensors.iter().map(|t| t.buffer()).collect();
        let buffer = Buffer::concat(&buffers, outer, sizes, inner).ok_or_else(|| {
            NativeError::InvalidArgument(format!("{op}: inputs do not share one dtype"))
        })?;
        let options = NativeOptions {
            kind: first.kind(),
            layout: first.layout(),
            device: first.device(),
            requires_grad: tensors.iter().any(|t| t.requires_grad()),
            pinned_memory: false,
            memory_format: MemoryFormat::Contiguous,
        };
        Ok(self.finish(op, buffer, out_shape, &options))
    }
}

/// Non-empty input whose members share dtype and device.
fn check_common<'a>(op: &'static str, tensors: &[&'a RawTensor]) -> NativeResult<&'a RawTensor> {
    let first = *tensors.first().ok_or_else(|| {
        NativeError::InvalidArgument(format!("{op}: expected a non-empty list of tensors"))
    })?;
    for t in &tensors[1..] {
        if t.kind() != first.kind() {
            return Err(NativeError::DTypeMismatch {
                op,
                expected: first.kind(),
                got: t.kind(),
            });
        }
        if t.device() != first.device() {
            return Err(NativeError::DeviceMismatch {
                op,
                expected: first.device(),
                got: t.device(),
            });
        }
    }
    Ok(first)
}
