//! Dense matrices and LU factorization.

use std::fmt;

use crate::error::{KirchhoffError, Result};

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// Create a zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Set matrix element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Matrix-vector product.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        debug_assert_eq!(x.len(), self.cols);
        (0..self.rows)
            .map(|r| self.row(r).iter().zip(x).map(|(a, b)| a * b).sum())
            .collect()
    }
}

impl fmt::Display for DenseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            let cells: Vec<String> = self.row(r).iter().map(|v| format!("{v:>8.3}")).collect();
            writeln!(f, "[{}]", cells.join(" "))?;
        }
        Ok(())
    }
}

/// LU factorization with partial pivoting of a square matrix.
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    size: usize,
    /// L below the diagonal (unit diagonal implied), U on and above it
    lu: Vec<f64>,
    /// Row permutation: row i of PA is row pivots[i] of A
    pivots: Vec<usize>,
}

impl LuDecomposition {
    /// Factor `matrix`. Fails with [`KirchhoffError::SingularSystem`] when a
    /// pivot column has no entry larger than `pivot_tolerance`.
    pub fn factor(matrix: &DenseMatrix, pivot_tolerance: f64) -> Result<Self> {
        if matrix.rows != matrix.cols {
            return Err(KirchhoffError::singular(format!(
                "system is {}x{}, not square",
                matrix.rows, matrix.cols
            )));
        }
        let n = matrix.rows;
        let mut lu = matrix.data.clone();
        let mut pivots: Vec<usize> = (0..n).collect();

        for k in 0..n {
            // Find pivot
            let mut max_val = lu[k * n + k].abs();
            let mut max_row = k;
            for i in (k + 1)..n {
                let val = lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if !(max_val > pivot_tolerance) {
                return Err(KirchhoffError::singular(format!(
                    "no usable pivot in column {k} (largest magnitude {max_val:.2e})"
                )));
            }

            // Swap rows if needed
            if max_row != k {
                pivots.swap(k, max_row);
                for j in 0..n {
                    lu.swap(k * n + j, max_row * n + j);
                }
            }

            // Eliminate
            let pivot = lu[k * n + k];
            for i in (k + 1)..n {
                let factor = lu[i * n + k] / pivot;
                lu[i * n + k] = factor;
                if factor == 0.0 {
                    continue;
                }
                for j in (k + 1)..n {
                    lu[i * n + j] -= factor * lu[k * n + j];
                }
            }
        }

        Ok(Self { size: n, lu, pivots })
    }

    /// Solve `A x = b` using the stored factors.
    pub fn solve(&self, b: &[f64]) -> Result<Vec<f64>> {
        let n = self.size;
        if b.len() != n {
            return Err(KirchhoffError::singular(format!(
                "right-hand side has {} rows, system has {n}",
                b.len()
            )));
        }

        // Apply pivot permutation to b
        let mut x: Vec<f64> = self.pivots.iter().map(|&p| b[p]).collect();

        // Forward substitution (L * y = Pb)
        for i in 0..n {
            for j in 0..i {
                x[i] -= self.lu[i * n + j] * x[j];
            }
        }

        // Back substitution (U * x = y)
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                x[i] -= self.lu[i * n + j] * x[j];
            }
            x[i] /= self.lu[i * n + i];
        }

        if x.iter().any(|v| !v.is_finite()) {
            return Err(KirchhoffError::singular("solution is not finite"));
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn matrix(rows: &[&[f64]]) -> DenseMatrix {
        let mut m = DenseMatrix::zeros(rows.len(), rows[0].len());
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                m.set(r, c, *v);
            }
        }
        m
    }

    #[test]
    fn test_solve_requires_pivoting() {
        // zero in the top-left corner forces a row swap
        let a = matrix(&[&[0.0, 2.0, 1.0], &[1.0, 1.0, 0.0], &[3.0, 0.0, 1.0]]);
        let b = [5.0, 3.0, 6.0];
        let lu = LuDecomposition::factor(&a, 1e-12).unwrap();
        let x = lu.solve(&b).unwrap();
        let back = a.mul_vec(&x);
        for (got, want) in back.iter().zip(b.iter()) {
            assert_relative_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_known_solution() {
        let a = matrix(&[&[4.0, -2.0], &[1.0, 1.0]]);
        let x = LuDecomposition::factor(&a, 1e-12)
            .unwrap()
            .solve(&[2.0, 3.0])
            .unwrap();
        assert_relative_eq!(x[0], 4.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 5.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_matrix_rejected() {
        let a = matrix(&[&[1.0, 2.0], &[2.0, 4.0]]);
        assert!(matches!(
            LuDecomposition::factor(&a, 1e-12),
            Err(KirchhoffError::SingularSystem { .. })
        ));
    }

    #[test]
    fn test_non_square_rejected() {
        let a = DenseMatrix::zeros(2, 3);
        assert!(LuDecomposition::factor(&a, 1e-12).is_err());
    }

    #[test]
    fn test_rhs_length_checked() {
        let a = matrix(&[&[1.0, 0.0], &[0.0, 1.0]]);
        let lu = LuDecomposition::factor(&a, 1e-12).unwrap();
        assert!(lu.solve(&[1.0]).is_err());
    }
}
