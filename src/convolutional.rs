//! Convolutional covariance over whole images.
//!
//! The convolutional covariance scores two images by decomposing each
//! into overlapping patches, scoring every patch pair with a base
//! covariance function, and collapsing the patch-pair matrix with a
//! learned per-patch weight vector:
//!
//! ```text
//! K(a, b) = sum_{i,j} w[i] * w[j] * k(patch_i(a), patch_j(b))
//!         = w^T C w
//! ```
//!
//! The alternative embedding mode skips patches entirely: inputs are
//! mapped whole through an opaque learned embedding and the base
//! covariance is applied to the embedding outputs. The two modes are
//! mutually exclusive and chosen at construction time.
//!
//! # Examples
//!
//! ```
//! use covarianza::convolutional::ConvolutionalCovariance;
//! use covarianza::kernels::SquaredExponential;
//! use covarianza::patches::PatchExtractor;
//! use covarianza::primitives::Matrix;
//!
//! // 4x4 images, 2x2 patches: 9 patches per image. With unit weights
//! // and a constant base kernel, every image pair scores 9 * 9 = 81.
//! let extractor = PatchExtractor::new((4, 4), (2, 2)).unwrap();
//! let base = SquaredExponential::new().with_lengthscale(f64::INFINITY);
//! let kernel = ConvolutionalCovariance::with_uniform_weights(base, extractor);
//!
//! let images = Matrix::from_vec(1, 16, (0..16).map(f64::from).collect()).unwrap();
//! let k = kernel.covariance(&images, None).unwrap();
//! assert!((k.get(0, 0) - 81.0).abs() < 1e-9);
//! ```

use crate::error::{CovarianzaError, Result};
use crate::patches::PatchExtractor;
use crate::primitives::{Matrix, Vector};
use crate::traits::{CovarianceFunction, FeatureEmbedding};

/// How raw inputs are turned into feature vectors before the base
/// covariance function sees them.
pub enum FeatureMap {
    /// Decompose each image into overlapping patches and weight the
    /// patch-pair covariances per patch position.
    Patches {
        /// Patch slicing configuration.
        extractor: PatchExtractor,
        /// One weight per patch position, indexed in the extractor's
        /// row-major patch order. May be negative.
        weights: Vector<f64>,
    },
    /// Pass whole inputs through a learned embedding; no patches, no
    /// weights.
    Embedding(Box<dyn FeatureEmbedding>),
}

/// Covariance function over whole images, composed from a base
/// covariance function and a feature map.
///
/// In patch mode the weight vector is owned here and read on every
/// evaluation; the base kernel's parameters live in `base` and are
/// reachable through [`base_mut`](Self::base_mut) for the external
/// optimizer. Nothing is cached between calls.
pub struct ConvolutionalCovariance<K: CovarianceFunction> {
    base: K,
    map: FeatureMap,
}

impl<K: CovarianceFunction> ConvolutionalCovariance<K> {
    /// Creates a patch-mode covariance with an explicit weight vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the weight vector length differs from the
    /// extractor's patch count.
    pub fn with_patches(
        base: K,
        extractor: PatchExtractor,
        weights: Vector<f64>,
    ) -> Result<Self> {
        if weights.len() != extractor.num_patches() {
            return Err(CovarianzaError::shape_mismatch(
                "patch weights",
                extractor.num_patches(),
                weights.len(),
            ));
        }
        Ok(Self {
            base,
            map: FeatureMap::Patches { extractor, weights },
        })
    }

    /// Creates a patch-mode covariance with all weights set to one.
    #[must_use]
    pub fn with_uniform_weights(base: K, extractor: PatchExtractor) -> Self {
        let weights = Vector::ones(extractor.num_patches());
        Self {
            base,
            map: FeatureMap::Patches { extractor, weights },
        }
    }

    /// Creates an embedding-mode covariance.
    #[must_use]
    pub fn with_embedding(base: K, embedding: Box<dyn FeatureEmbedding>) -> Self {
        Self {
            base,
            map: FeatureMap::Embedding(embedding),
        }
    }

    /// Returns the base covariance function.
    #[must_use]
    pub fn base(&self) -> &K {
        &self.base
    }

    /// Returns the base covariance function mutably (external optimizer
    /// hook).
    pub fn base_mut(&mut self) -> &mut K {
        &mut self.base
    }

    /// Returns the feature map.
    #[must_use]
    pub fn feature_map(&self) -> &FeatureMap {
        &self.map
    }

    /// Returns the patch weights, or None in embedding mode.
    #[must_use]
    pub fn weights(&self) -> Option<&Vector<f64>> {
        match &self.map {
            FeatureMap::Patches { weights, .. } => Some(weights),
            FeatureMap::Embedding(_) => None,
        }
    }

    /// Replaces the patch weights (external optimizer hook).
    ///
    /// # Errors
    ///
    /// Returns an error in embedding mode, or if the new vector's
    /// length differs from the patch count.
    pub fn set_weights(&mut self, new_weights: Vector<f64>) -> Result<()> {
        match &mut self.map {
            FeatureMap::Patches { extractor, weights } => {
                if new_weights.len() != extractor.num_patches() {
                    return Err(CovarianzaError::shape_mismatch(
                        "patch weights",
                        extractor.num_patches(),
                        new_weights.len(),
                    ));
                }
                *weights = new_weights;
                Ok(())
            }
            FeatureMap::Embedding(_) => Err(CovarianzaError::Other(
                "embedding mode has no patch weights".to_string(),
            )),
        }
    }

    /// Computes the covariance matrix between two image batches.
    ///
    /// Rows of `a` and `b` are flattened images; `b = None` evaluates
    /// `a` against itself. The result has shape `|a| x |b or a|`.
    /// Empty batches produce empty matrices of the correct shape.
    ///
    /// # Errors
    ///
    /// Returns an error if a batch width doesn't match the configured
    /// image length (patch mode), if the embedding rejects the batch
    /// (embedding mode), or if a base kernel parameter is out of
    /// domain.
    pub fn covariance(&self, a: &Matrix<f64>, b: Option<&Matrix<f64>>) -> Result<Matrix<f64>> {
        match &self.map {
            FeatureMap::Patches { extractor, weights } => {
                check_weights(extractor, weights)?;
                let patches_a = extractor.extract_batch(a)?;
                let pairwise = match b {
                    Some(b) => {
                        let patches_b = extractor.extract_batch(b)?;
                        self.base.evaluate(&patches_a, &patches_b)?
                    }
                    None => self.base.evaluate(&patches_a, &patches_a)?,
                };

                let n_a = a.n_rows();
                let n_b = b.map_or(n_a, |m| m.n_rows());
                let mut data = Vec::with_capacity(n_a * n_b);
                for m in 0..n_a {
                    for n in 0..n_b {
                        data.push(weighted_block_sum(&pairwise, m, n, weights));
                    }
                }
                Ok(Matrix::from_vec(n_a, n_b, data)?)
            }
            FeatureMap::Embedding(embedding) => {
                let features_a = embedding.embed(a)?;
                match b {
                    Some(b) => {
                        let features_b = embedding.embed(b)?;
                        self.base.evaluate(&features_a, &features_b)
                    }
                    None => self.base.evaluate(&features_a, &features_a),
                }
            }
        }
    }

    /// Computes only the diagonal of `covariance(a, Some(a))`, without
    /// evaluating any cross-image patch pairs.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`covariance`](Self::covariance).
    pub fn covariance_diag(&self, a: &Matrix<f64>) -> Result<Vector<f64>> {
        match &self.map {
            FeatureMap::Patches { extractor, weights } => {
                check_weights(extractor, weights)?;
                let mut data = Vec::with_capacity(a.n_rows());
                for n in 0..a.n_rows() {
                    let patches = extractor.extract(&a.row(n))?;
                    let pairwise = self.base.evaluate(&patches, &patches)?;
                    data.push(weighted_block_sum(&pairwise, 0, 0, weights));
                }
                Ok(Vector::from_vec(data))
            }
            FeatureMap::Embedding(embedding) => {
                let features = embedding.embed(a)?;
                self.base.evaluate_diag(&features)
            }
        }
    }
}

fn check_weights(extractor: &PatchExtractor, weights: &Vector<f64>) -> Result<()> {
    if weights.len() != extractor.num_patches() {
        return Err(CovarianzaError::shape_mismatch(
            "patch weights",
            extractor.num_patches(),
            weights.len(),
        ));
    }
    Ok(())
}

/// Collapses one P x P block of a patch-pair covariance matrix with the
/// weight outer product: `sum_{i,j} w[i] * w[j] * c[row*P + i, col*P + j]`.
///
/// Shared by the full-matrix and diagonal paths; the index order here
/// fixes the floating-point result for both.
fn weighted_block_sum(
    pairwise: &Matrix<f64>,
    row_block: usize,
    col_block: usize,
    weights: &Vector<f64>,
) -> f64 {
    let p = weights.len();
    let mut sum = 0.0;
    for i in 0..p {
        let w_i = weights[i];
        for j in 0..p {
            sum += w_i * weights[j] * pairwise.get(row_block * p + i, col_block * p + j);
        }
    }
    sum
}

#[cfg(test)]
#[path = "convolutional_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests_conv_contract.rs"]
mod tests_conv_contract;
