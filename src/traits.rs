//! Core capability traits for covariance evaluation.
//!
//! These traits define the two seams of the engine: pluggable base
//! covariance functions over feature vectors, and opaque learned
//! feature embeddings supplied by the caller.

use crate::error::Result;
use crate::primitives::{Matrix, Vector};

/// A symmetric positive-semi-definite similarity function over feature
/// vectors.
///
/// Inputs are matrices whose rows are feature vectors; `evaluate`
/// returns the full pairwise covariance matrix and `evaluate_diag`
/// returns only the diagonal of `evaluate(a, a)`, computed without
/// materializing the full matrix.
///
/// Implementations must be symmetric (`evaluate(a, b)` equals the
/// transpose of `evaluate(b, a)`) and must satisfy
/// `evaluate_diag(a)[i] == evaluate(a, a)[i][i]` exactly. Scale
/// parameters are assumed already positive at call time; a
/// non-positive value is reported as an error rather than silently
/// clamped.
///
/// # Examples
///
/// ```
/// use covarianza::kernels::SquaredExponential;
/// use covarianza::primitives::Matrix;
/// use covarianza::traits::CovarianceFunction;
///
/// let kernel = SquaredExponential::new();
/// let a = Matrix::from_vec(2, 1, vec![0.0, 1.0]).unwrap();
/// let k = kernel.evaluate(&a, &a).unwrap();
/// assert_eq!(k.shape(), (2, 2));
/// assert!((k.get(0, 0) - 1.0).abs() < 1e-12);
/// ```
pub trait CovarianceFunction {
    /// Evaluates the pairwise covariance matrix between the rows of
    /// `a` and the rows of `b`.
    ///
    /// # Errors
    ///
    /// Returns an error if the feature dimensions of `a` and `b`
    /// differ, or if a scale parameter is outside its domain.
    fn evaluate(&self, a: &Matrix<f64>, b: &Matrix<f64>) -> Result<Matrix<f64>>;

    /// Evaluates only the diagonal of `evaluate(a, a)`.
    ///
    /// # Errors
    ///
    /// Returns an error if a scale parameter is outside its domain.
    fn evaluate_diag(&self, a: &Matrix<f64>) -> Result<Vector<f64>>;
}

/// An opaque differentiable map from raw inputs to feature vectors.
///
/// The embedding's internal architecture is the caller's concern; this
/// crate only requires the capability of mapping a batch of input rows
/// to a batch of feature rows. Used by the embedding mode of
/// [`ConvolutionalCovariance`](crate::convolutional::ConvolutionalCovariance)
/// and by the embedded inducing-feature dispatch variant.
///
/// # Examples
///
/// ```
/// use covarianza::error::Result;
/// use covarianza::primitives::Matrix;
/// use covarianza::traits::FeatureEmbedding;
///
/// struct Identity;
///
/// impl FeatureEmbedding for Identity {
///     fn embed(&self, batch: &Matrix<f64>) -> Result<Matrix<f64>> {
///         Ok(batch.clone())
///     }
/// }
///
/// let x = Matrix::from_vec(1, 3, vec![1.0, 2.0, 3.0]).unwrap();
/// let features = Identity.embed(&x).unwrap();
/// assert_eq!(features.shape(), (1, 3));
/// ```
pub trait FeatureEmbedding {
    /// Maps a batch of input rows to a batch of feature rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch does not match the embedding's
    /// expected input dimension.
    fn embed(&self, batch: &Matrix<f64>) -> Result<Matrix<f64>>;
}
