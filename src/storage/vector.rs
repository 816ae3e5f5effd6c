//! Dense and sparse vector storage.

use crate::core::scalar::Scalar;
use crate::core::traits::VectorStorageOps;
use crate::error::{LinalgError, Result};
use crate::storage::StorageFlags;

/// Flat array of all elements.
#[derive(Debug, Clone)]
pub struct DenseVectorStorage<T> {
    data: Vec<T>,
}

impl<T: Scalar> DenseVectorStorage<T> {
    pub fn new(length: usize) -> Self {
        Self {
            data: vec![T::zero(); length],
        }
    }

    /// Take ownership of the array without copying.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    pub fn values(&self) -> &[T] {
        &self.data
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_values(self) -> Vec<T> {
        self.data
    }
}

impl<T: Scalar> VectorStorageOps<T> for DenseVectorStorage<T> {
    fn length(&self) -> usize {
        self.data.len()
    }

    fn flags(&self) -> StorageFlags {
        StorageFlags::DENSE | StorageFlags::FULLY_MUTABLE
    }

    #[inline]
    fn at(&self, index: usize) -> T {
        self.data[index]
    }

    #[inline]
    fn set(&mut self, index: usize, value: T) {
        self.data[index] = value;
    }

    fn clear(&mut self) {
        self.data.iter_mut().for_each(|x| *x = T::zero());
    }

    fn enumerate_non_zero(&self) -> Box<dyn Iterator<Item = (usize, T)> + '_> {
        Box::new(
            self.data
                .iter()
                .copied()
                .enumerate()
                .filter(|&(_, v)| v != T::zero()),
        )
    }

    fn to_vec(&self) -> Vec<T> {
        self.data.clone()
    }
}

/// Sorted indices plus values; everything else is zero.
#[derive(Debug, Clone)]
pub struct SparseVectorStorage<T> {
    length: usize,
    indices: Vec<usize>,
    values: Vec<T>,
}

impl<T: Scalar> SparseVectorStorage<T> {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn filled(length: usize, value: T) -> Self {
        Self {
            length,
            indices: (0..length).collect(),
            values: vec![value; length],
        }
    }

    /// Store only the non-zero results of `f`.
    pub fn from_fn(length: usize, mut f: impl FnMut(usize) -> T) -> Self {
        let mut indices = Vec::new();
        let mut values = Vec::new();
        for i in 0..length {
            let v = f(i);
            if v != T::zero() {
                indices.push(i);
                values.push(v);
            }
        }
        Self { length, indices, values }
    }

    /// Build from index/value pairs; duplicate indices are summed.
    pub fn from_indexed(length: usize, entries: impl IntoIterator<Item = (usize, T)>) -> Result<Self> {
        let mut pairs: Vec<(usize, T)> = Vec::new();
        for (i, v) in entries {
            if i >= length {
                return Err(LinalgError::IndexOutOfRange { index: i, bound: length });
            }
            pairs.push((i, v));
        }
        pairs.sort_by_key(|&(i, _)| i);
        let mut indices: Vec<usize> = Vec::with_capacity(pairs.len());
        let mut values: Vec<T> = Vec::with_capacity(pairs.len());
        for (i, v) in pairs {
            match indices.last() {
                Some(&last) if last == i => {
                    let k = values.len() - 1;
                    values[k] += v;
                }
                _ => {
                    indices.push(i);
                    values.push(v);
                }
            }
        }
        Ok(Self { length, indices, values })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn non_zeros_count(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn map_stored(&mut self, f: impl Fn(T) -> T) {
        self.values.iter_mut().for_each(|v| *v = f(*v));
    }
}

impl<T: Scalar> VectorStorageOps<T> for SparseVectorStorage<T> {
    fn length(&self) -> usize {
        self.length
    }

    fn flags(&self) -> StorageFlags {
        StorageFlags::FULLY_MUTABLE
    }

    fn at(&self, index: usize) -> T {
        match self.indices.binary_search(&index) {
            Ok(k) => self.values[k],
            Err(_) => T::zero(),
        }
    }

    fn set(&mut self, index: usize, value: T) {
        match self.indices.binary_search(&index) {
            Ok(k) if value == T::zero() => {
                self.indices.remove(k);
                self.values.remove(k);
            }
            Ok(k) => self.values[k] = value,
            Err(_) if value == T::zero() => {}
            Err(k) => {
                self.indices.insert(k, index);
                self.values.insert(k, value);
            }
        }
    }

    fn clear(&mut self) {
        self.indices.clear();
        self.values.clear();
    }

    fn enumerate_non_zero(&self) -> Box<dyn Iterator<Item = (usize, T)> + '_> {
        Box::new(self.indices.iter().copied().zip(self.values.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_vector_set_keeps_indices_sorted() {
        let mut v = SparseVectorStorage::<f64>::new(5);
        v.set(3, 1.0);
        v.set(1, 2.0);
        v.set(4, 3.0);
        assert_eq!(v.indices(), &[1, 3, 4]);
        v.set(3, 0.0);
        assert_eq!(v.indices(), &[1, 4]);
        assert_eq!(v.to_vec(), vec![0.0, 2.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn indexed_duplicates_are_summed() {
        let v = SparseVectorStorage::from_indexed(4, vec![(2, 1.0), (0, 1.0), (2, 2.0)]).unwrap();
        assert_eq!(v.indices(), &[0, 2]);
        assert_eq!(v.values(), &[1.0, 3.0]);
    }

    #[test]
    fn indexed_out_of_range_is_rejected() {
        let err = SparseVectorStorage::from_indexed(2, vec![(2, 1.0)]).unwrap_err();
        assert_eq!(err, LinalgError::IndexOutOfRange { index: 2, bound: 2 });
    }
}
