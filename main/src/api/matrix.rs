use crate::api::element::Element;
use crate::api::error::{CellError, CellResult};

/// Dense row-major `rows x cols` buffer.
///
/// Stand-in for the host framework's tensor container: allocation, shape
/// bookkeeping and flat data access only. Scratch buffers inside the cell are
/// resized in place so the allocation survives batch-size changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Element> Matrix<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> CellResult<Self> {
        if data.len() != rows * cols {
            return Err(CellError::ShapeMismatch {
                expected: vec![rows, cols],
                got: vec![data.len()],
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Resize in place, reusing the allocation. Contents are unspecified
    /// afterwards; the cell always overwrites scratch before reading it.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.data.resize(rows * cols, T::zero());
    }

    /// Resize to `other`'s shape and copy its contents.
    pub fn copy_from(&mut self, other: &Matrix<T>) {
        self.resize(other.rows, other.cols);
        self.data.copy_from_slice(&other.data);
    }
}
