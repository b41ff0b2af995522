//! Tensor creation functions analogous to `np.zeros`, `np.eye`, etc.

use crate::Scalar;

use super::{compute_strides, Tensor};

impl<T: Scalar> Tensor<T> {
    /// Create a tensor filled with zeros.
    ///
    /// ```
    /// # use spectral_core::tensor::Tensor;
    /// let t = Tensor::<f64>::zeros(vec![2, 3]);
    /// assert_eq!(t.shape(), &[2, 3]);
    /// assert!(t.iter().all(|&x| x == 0.0));
    /// ```
    pub fn zeros(shape: Vec<usize>) -> Self {
        let numel: usize = shape.iter().product();
        let strides = compute_strides(&shape);
        Self {
            data: vec![T::zero(); numel],
            shape,
            strides,
        }
    }

    /// Create a tensor filled with ones.
    pub fn ones(shape: Vec<usize>) -> Self {
        let numel: usize = shape.iter().product();
        let strides = compute_strides(&shape);
        Self {
            data: vec![T::one(); numel],
            shape,
            strides,
        }
    }

    /// Create a tensor filled with a constant value.
    pub fn full(shape: Vec<usize>, value: T) -> Self {
        let numel: usize = shape.iter().product();
        let strides = compute_strides(&shape);
        Self {
            data: vec![value; numel],
            shape,
            strides,
        }
    }

    /// Create an identity matrix of size `n x n`.
    ///
    /// ```
    /// # use spectral_core::tensor::Tensor;
    /// let eye = Tensor::<f64>::eye(3);
    /// assert_eq!(eye.shape(), &[3, 3]);
    /// assert_eq!(*eye.get(&[0, 0]).unwrap(), 1.0);
    /// assert_eq!(*eye.get(&[0, 1]).unwrap(), 0.0);
    /// ```
    pub fn eye(n: usize) -> Self {
        let mut data = vec![T::zero(); n * n];
        for i in 0..n {
            data[i * n + i] = T::one();
        }
        let strides = compute_strides(&[n, n]);
        Self {
            data,
            shape: vec![n, n],
            strides,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let t = Tensor::<f64>::zeros(vec![3, 4]);
        assert_eq!(t.shape(), &[3, 4]);
        assert_eq!(t.numel(), 12);
        assert!(t.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_ones() {
        let t = Tensor::<f32>::ones(vec![2, 2]);
        assert!(t.iter().all(|&x| x == 1.0));
    }

    #[test]
    fn test_full() {
        let t = Tensor::full(vec![2, 3], 7_i32);
        assert!(t.iter().all(|&x| x == 7));
    }

    #[test]
    fn test_eye() {
        let t = Tensor::<f64>::eye(3);
        assert_eq!(t.shape(), &[3, 3]);
        assert_eq!(*t.get(&[0, 0]).unwrap(), 1.0);
        assert_eq!(*t.get(&[1, 1]).unwrap(), 1.0);
        assert_eq!(*t.get(&[2, 2]).unwrap(), 1.0);
        assert_eq!(*t.get(&[0, 1]).unwrap(), 0.0);
        assert_eq!(*t.get(&[1, 0]).unwrap(), 0.0);
    }
}
