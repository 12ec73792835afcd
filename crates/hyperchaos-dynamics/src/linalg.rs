//! Fixed-size 4×4 linear algebra for tangent-space propagation.

use std::ops::{Add, Mul};

use crate::{DIM, State};

/// Dense 4×4 matrix stored row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    rows: [[f64; DIM]; DIM],
}

/// Result of a QR decomposition: `a = q * r` with orthonormal `q` and upper
/// triangular `r` whose diagonal is strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QrDecomposition {
    /// Orthonormal factor
    pub q: Matrix4,
    /// Upper triangular factor
    pub r: Matrix4,
}

impl Matrix4 {
    /// All-zero matrix.
    pub const ZERO: Self = Self { rows: [[0.0; DIM]; DIM] };

    /// Identity matrix.
    pub fn identity() -> Self {
        let mut m = Self::ZERO;
        for i in 0..DIM {
            m.rows[i][i] = 1.0;
        }
        m
    }

    /// Builds a matrix from its rows.
    pub const fn from_rows(rows: [[f64; DIM]; DIM]) -> Self {
        Self { rows }
    }

    /// Entry at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.rows[i][j]
    }

    /// Column `j` as a vector.
    pub fn column(&self, j: usize) -> State {
        [self.rows[0][j], self.rows[1][j], self.rows[2][j], self.rows[3][j]]
    }

    fn set_column(&mut self, j: usize, v: &State) {
        for i in 0..DIM {
            self.rows[i][j] = v[i];
        }
    }

    /// Matrix transpose.
    pub fn transpose(&self) -> Self {
        let mut t = Self::ZERO;
        for i in 0..DIM {
            for j in 0..DIM {
                t.rows[j][i] = self.rows[i][j];
            }
        }
        t
    }

    /// Multiplies every entry by `s`.
    pub fn scale(&self, s: f64) -> Self {
        self.map(|v| v * s)
    }

    /// Applies `f` to every entry.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let mut out = *self;
        for row in &mut out.rows {
            for v in row.iter_mut() {
                *v = f(*v);
            }
        }
        out
    }

    /// Main diagonal.
    pub fn diagonal(&self) -> State {
        [self.rows[0][0], self.rows[1][1], self.rows[2][2], self.rows[3][3]]
    }

    /// True if every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.rows.iter().flatten().all(|v| v.is_finite())
    }

    /// Modified Gram-Schmidt QR decomposition.
    ///
    /// Returns `None` when the columns are linearly dependent (a zero or
    /// non-finite pivot), which for tangent propagation means the basis has
    /// collapsed.
    pub fn qr(&self) -> Option<QrDecomposition> {
        let mut q = Self::ZERO;
        let mut r = Self::ZERO;

        for j in 0..DIM {
            let mut v = self.column(j);
            for i in 0..j {
                let qi = q.column(i);
                let rij = dot(&qi, &v);
                r.rows[i][j] = rij;
                for k in 0..DIM {
                    v[k] -= rij * qi[k];
                }
            }

            let norm = dot(&v, &v).sqrt();
            if !norm.is_finite() || norm == 0.0 {
                return None;
            }
            r.rows[j][j] = norm;
            for x in &mut v {
                *x /= norm;
            }
            q.set_column(j, &v);
        }

        Some(QrDecomposition { q, r })
    }
}

impl Mul for Matrix4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = Self::ZERO;
        for i in 0..DIM {
            for j in 0..DIM {
                let mut acc = 0.0;
                for k in 0..DIM {
                    acc += self.rows[i][k] * rhs.rows[k][j];
                }
                out.rows[i][j] = acc;
            }
        }
        out
    }
}

impl Add for Matrix4 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut out = self;
        for i in 0..DIM {
            for j in 0..DIM {
                out.rows[i][j] += rhs.rows[i][j];
            }
        }
        out
    }
}

fn dot(a: &State, b: &State) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
