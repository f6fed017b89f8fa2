use std::f64::consts::PI;

/// Orthonormal DCT-II of a fixed block size with a precomputed basis
///
/// `basis[k][n] = c(k) * cos(PI * (2n + 1) * k / 2N)` with `c(0) = sqrt(1/N)`
/// and `c(k) = sqrt(2/N)` otherwise, so the inverse is the transpose.
#[derive(Debug, Clone)]
pub struct Dct {
    size: usize,
    basis: Vec<f64>,
}

impl Dct {
    pub fn new(size: usize) -> Self {
        let n = size as f64;
        let mut basis = vec![0.0f64; size * size];
        for k in 0..size {
            let norm = if k == 0 {
                (1.0 / n).sqrt()
            } else {
                (2.0 / n).sqrt()
            };
            for i in 0..size {
                basis[k * size + i] = norm * (PI * (2 * i + 1) as f64 * k as f64 / (2.0 * n)).cos();
            }
        }

        Self { size, basis }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// the basis vector of coefficient `k`
    pub fn basis(&self, k: usize) -> &[f64] {
        &self.basis[k * self.size..(k + 1) * self.size]
    }

    /// a single coefficient of the block, cheaper than the full transform
    pub fn coefficient<T: Copy + Into<f64>>(&self, k: usize, block: &[T]) -> f64 {
        self.basis(k)
            .iter()
            .zip(block)
            .map(|(b, s)| {
                let s: f64 = (*s).into();
                b * s
            })
            .sum()
    }

    pub fn forward(&self, block: &[f64]) -> Vec<f64> {
        (0..self.size).map(|k| self.coefficient(k, block)).collect()
    }

    pub fn inverse(&self, coefficients: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0f64; self.size];
        for (k, c) in coefficients.iter().enumerate().take(self.size) {
            for (o, b) in out.iter_mut().zip(self.basis(k)) {
                *o += c * b;
            }
        }

        out
    }
}
