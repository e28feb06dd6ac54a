//! Base covariance functions over feature vectors.
//!
//! A base covariance function scores the similarity of two feature
//! vectors (image patches, whole images, or embedding outputs). All
//! functions here are stationary: they depend on the inputs only
//! through the distance between them, scaled by a `lengthscale` and an
//! output `variance`. Both parameters must be strictly positive;
//! positivity is enforced at evaluation time, while any monotone
//! reparameterization used during optimization belongs to the caller.
//!
//! # Mathematical Background
//!
//! With `d = ||a - b||`:
//!
//! ```text
//! SquaredExponential: variance * exp(-0.5 * d^2 / lengthscale^2)
//! Exponential:        variance * exp(-d / lengthscale)
//! Matern52:           variance * (1 + sqrt(5) r + 5 r^2 / 3) * exp(-sqrt(5) r),  r = d / lengthscale
//! ```
//!
//! # Examples
//!
//! ```
//! use covarianza::kernels::SquaredExponential;
//! use covarianza::primitives::Matrix;
//! use covarianza::traits::CovarianceFunction;
//!
//! let kernel = SquaredExponential::new().with_lengthscale(2.0);
//! let a = Matrix::from_vec(2, 1, vec![0.0, 1.0]).unwrap();
//! let b = Matrix::from_vec(1, 1, vec![3.0]).unwrap();
//!
//! let k = kernel.evaluate(&a, &b).unwrap();
//! assert_eq!(k.shape(), (2, 1));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CovarianzaError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::CovarianceFunction;

fn validate_positive(param: &str, value: f64) -> Result<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(CovarianzaError::invalid_parameter(param, value, ">0"))
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

/// Evaluates `profile` over every squared pairwise distance between the
/// rows of `a` and the rows of `b`.
fn pairwise<F>(profile: F, a: &Matrix<f64>, b: &Matrix<f64>) -> Result<Matrix<f64>>
where
    F: Fn(f64) -> f64,
{
    if a.n_cols() != b.n_cols() {
        return Err(CovarianzaError::shape_mismatch(
            "feature dimension",
            a.n_cols(),
            b.n_cols(),
        ));
    }

    let mut data = Vec::with_capacity(a.n_rows() * b.n_rows());
    for i in 0..a.n_rows() {
        let row = a.row_slice(i);
        for j in 0..b.n_rows() {
            data.push(profile(squared_distance(row, b.row_slice(j))));
        }
    }
    Ok(Matrix::from_vec(a.n_rows(), b.n_rows(), data)?)
}

/// The squared-exponential (RBF) covariance function.
///
/// `k(a, b) = variance * exp(-0.5 * ||a - b||^2 / lengthscale^2)`
///
/// Infinitely smooth; an infinite lengthscale degenerates to the
/// constant function `variance`.
///
/// # Examples
///
/// ```
/// use covarianza::kernels::SquaredExponential;
/// use covarianza::primitives::Matrix;
/// use covarianza::traits::CovarianceFunction;
///
/// let kernel = SquaredExponential::new().with_variance(2.0);
/// let a = Matrix::from_vec(1, 2, vec![0.0, 0.0]).unwrap();
///
/// // Zero distance yields the full variance.
/// let k = kernel.evaluate(&a, &a).unwrap();
/// assert!((k.get(0, 0) - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquaredExponential {
    variance: f64,
    lengthscale: f64,
}

impl SquaredExponential {
    /// Creates the kernel with unit variance and unit lengthscale.
    #[must_use]
    pub fn new() -> Self {
        Self {
            variance: 1.0,
            lengthscale: 1.0,
        }
    }

    /// Sets the output variance.
    #[must_use]
    pub fn with_variance(mut self, variance: f64) -> Self {
        self.variance = variance;
        self
    }

    /// Sets the lengthscale.
    #[must_use]
    pub fn with_lengthscale(mut self, lengthscale: f64) -> Self {
        self.lengthscale = lengthscale;
        self
    }

    /// Returns the output variance.
    #[must_use]
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Returns the lengthscale.
    #[must_use]
    pub fn lengthscale(&self) -> f64 {
        self.lengthscale
    }

    /// Overwrites the output variance (external optimizer hook).
    pub fn set_variance(&mut self, variance: f64) {
        self.variance = variance;
    }

    /// Overwrites the lengthscale (external optimizer hook).
    pub fn set_lengthscale(&mut self, lengthscale: f64) {
        self.lengthscale = lengthscale;
    }

    fn validate(&self) -> Result<()> {
        validate_positive("squared exponential variance", self.variance)?;
        validate_positive("squared exponential lengthscale", self.lengthscale)
    }

    fn profile(&self, squared_dist: f64) -> f64 {
        self.variance * (-0.5 * squared_dist / (self.lengthscale * self.lengthscale)).exp()
    }
}

impl Default for SquaredExponential {
    fn default() -> Self {
        Self::new()
    }
}

impl CovarianceFunction for SquaredExponential {
    fn evaluate(&self, a: &Matrix<f64>, b: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.validate()?;
        pairwise(|d2| self.profile(d2), a, b)
    }

    fn evaluate_diag(&self, a: &Matrix<f64>) -> Result<Vector<f64>> {
        self.validate()?;
        // Same code path as the zero-distance entries of the full
        // matrix, so the diagonal identity holds bit-for-bit.
        Ok(Vector::from_vec(vec![self.profile(0.0); a.n_rows()]))
    }
}

/// The absolute-exponential covariance function.
///
/// `k(a, b) = variance * exp(-||a - b|| / lengthscale)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exponential {
    variance: f64,
    lengthscale: f64,
}

impl Exponential {
    /// Creates the kernel with unit variance and unit lengthscale.
    #[must_use]
    pub fn new() -> Self {
        Self {
            variance: 1.0,
            lengthscale: 1.0,
        }
    }

    /// Sets the output variance.
    #[must_use]
    pub fn with_variance(mut self, variance: f64) -> Self {
        self.variance = variance;
        self
    }

    /// Sets the lengthscale.
    #[must_use]
    pub fn with_lengthscale(mut self, lengthscale: f64) -> Self {
        self.lengthscale = lengthscale;
        self
    }

    /// Returns the output variance.
    #[must_use]
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Returns the lengthscale.
    #[must_use]
    pub fn lengthscale(&self) -> f64 {
        self.lengthscale
    }

    /// Overwrites the output variance (external optimizer hook).
    pub fn set_variance(&mut self, variance: f64) {
        self.variance = variance;
    }

    /// Overwrites the lengthscale (external optimizer hook).
    pub fn set_lengthscale(&mut self, lengthscale: f64) {
        self.lengthscale = lengthscale;
    }

    fn validate(&self) -> Result<()> {
        validate_positive("exponential variance", self.variance)?;
        validate_positive("exponential lengthscale", self.lengthscale)
    }

    fn profile(&self, squared_dist: f64) -> f64 {
        self.variance * (-squared_dist.sqrt() / self.lengthscale).exp()
    }
}

impl Default for Exponential {
    fn default() -> Self {
        Self::new()
    }
}

impl CovarianceFunction for Exponential {
    fn evaluate(&self, a: &Matrix<f64>, b: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.validate()?;
        pairwise(|d2| self.profile(d2), a, b)
    }

    fn evaluate_diag(&self, a: &Matrix<f64>) -> Result<Vector<f64>> {
        self.validate()?;
        Ok(Vector::from_vec(vec![self.profile(0.0); a.n_rows()]))
    }
}

/// The Matérn 5/2 covariance function.
///
/// `k(a, b) = variance * (1 + sqrt(5) r + 5 r^2 / 3) * exp(-sqrt(5) r)`
/// with `r = ||a - b|| / lengthscale`. Twice differentiable, rougher
/// than the squared exponential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matern52 {
    variance: f64,
    lengthscale: f64,
}

impl Matern52 {
    /// Creates the kernel with unit variance and unit lengthscale.
    #[must_use]
    pub fn new() -> Self {
        Self {
            variance: 1.0,
            lengthscale: 1.0,
        }
    }

    /// Sets the output variance.
    #[must_use]
    pub fn with_variance(mut self, variance: f64) -> Self {
        self.variance = variance;
        self
    }

    /// Sets the lengthscale.
    #[must_use]
    pub fn with_lengthscale(mut self, lengthscale: f64) -> Self {
        self.lengthscale = lengthscale;
        self
    }

    /// Returns the output variance.
    #[must_use]
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Returns the lengthscale.
    #[must_use]
    pub fn lengthscale(&self) -> f64 {
        self.lengthscale
    }

    /// Overwrites the output variance (external optimizer hook).
    pub fn set_variance(&mut self, variance: f64) {
        self.variance = variance;
    }

    /// Overwrites the lengthscale (external optimizer hook).
    pub fn set_lengthscale(&mut self, lengthscale: f64) {
        self.lengthscale = lengthscale;
    }

    fn validate(&self) -> Result<()> {
        validate_positive("matern 5/2 variance", self.variance)?;
        validate_positive("matern 5/2 lengthscale", self.lengthscale)
    }

    fn profile(&self, squared_dist: f64) -> f64 {
        let r = squared_dist.sqrt() / self.lengthscale;
        let sqrt5_r = 5.0_f64.sqrt() * r;
        self.variance * (1.0 + sqrt5_r + 5.0 * r * r / 3.0) * (-sqrt5_r).exp()
    }
}

impl Default for Matern52 {
    fn default() -> Self {
        Self::new()
    }
}

impl CovarianceFunction for Matern52 {
    fn evaluate(&self, a: &Matrix<f64>, b: &Matrix<f64>) -> Result<Matrix<f64>> {
        self.validate()?;
        pairwise(|d2| self.profile(d2), a, b)
    }

    fn evaluate_diag(&self, a: &Matrix<f64>) -> Result<Vector<f64>> {
        self.validate()?;
        Ok(Vector::from_vec(vec![self.profile(0.0); a.n_rows()]))
    }
}


#[cfg(test)]
#[path = "tests_se_contract.rs"]
mod tests_se_contract;
