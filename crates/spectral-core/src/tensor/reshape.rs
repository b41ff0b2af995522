//! Shape-changing operations.

use crate::error::{CoreError, Result};
use crate::Scalar;

use super::{compute_strides, Tensor};

impl<T: Scalar> Tensor<T> {
    /// Transpose a 2-D tensor (matrix), returning a new tensor.
    ///
    /// Returns an error for tensors that are not 2-D.
    ///
    /// ```
    /// # use spectral_core::tensor::Tensor;
    /// let t = Tensor::from_vec(vec![1, 2, 3, 4, 5, 6], vec![2, 3]).unwrap();
    /// let tt = t.transpose().unwrap();
    /// assert_eq!(tt.shape(), &[3, 2]);
    /// assert_eq!(tt.as_slice(), &[1, 4, 2, 5, 3, 6]);
    /// ```
    pub fn transpose(&self) -> Result<Self> {
        if self.ndim() != 2 {
            return Err(CoreError::InvalidArgument {
                reason: "transpose requires a 2-D tensor (matrix)",
            });
        }
        let m = self.shape()[0];
        let n = self.shape()[1];
        let src = self.as_slice();
        let mut data = vec![T::zero(); m * n];
        for i in 0..m {
            for j in 0..n {
                data[j * m + i] = src[i * n + j];
            }
        }
        Ok(Self {
            data,
            shape: vec![n, m],
            strides: compute_strides(&[n, m]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose() {
        let t = Tensor::from_vec(vec![1, 2, 3, 4, 5, 6], vec![2, 3]).unwrap();
        let tt = t.transpose().unwrap();
        assert_eq!(tt.shape(), &[3, 2]);
        assert_eq!(tt.as_slice(), &[1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_transpose_square() {
        let t = Tensor::from_vec(vec![1, 2, 3, 4], vec![2, 2]).unwrap();
        let tt = t.transpose().unwrap();
        assert_eq!(tt.as_slice(), &[1, 3, 2, 4]);
    }

    #[test]
    fn test_transpose_twice_is_identity() {
        let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![3, 2]).unwrap();
        assert_eq!(t.transpose().unwrap().transpose().unwrap(), t);
    }

    #[test]
    fn test_transpose_not_2d() {
        let t = Tensor::from_vec(vec![1, 2, 3], vec![3]).unwrap();
        assert!(t.transpose().is_err());
    }
}
