//! Inducing-variable covariances for sparse variational inference.
//!
//! Sparse GP inference needs two matrices: the inducing-to-inducing
//! covariance `Kuu` and the inducing-to-data covariance `Kuf`. Which
//! computation applies depends on two independent axes (how the
//! inducing variables are represented, and which kernel scores them),
//! so resolution is a double dispatch over the pair of tags, not a
//! single virtual call.
//!
//! Both axes are closed enums. Resolution walks an explicit
//! registration table keyed by `(InducingKind, KernelKind)`; a pair
//! with no registered handler is an error, never a silent fallback.
//! Registered variants:
//!
//! | inducing  | kernel        | Kuu                    | Kuf                                  |
//! |-----------|---------------|------------------------|--------------------------------------|
//! | points    | plain         | k(Z,Z) + jitter I      | k(Z, X)                              |
//! | patches   | convolutional | k(Z,Z) + jitter I      | sum_i w[i] k(Z[m], patch_i(X[n]))    |
//! | features  | embedded      | k(Z,Z) + jitter I      | k(Z, embed(X))                       |
//!
//! Inducing patches and features already live in feature space, so
//! `Kuu` always evaluates the base kernel on them directly; only the
//! data side of the convolutional `Kuf` is patch-decomposed.
//!
//! # Examples
//!
//! ```
//! use covarianza::inducing::{InducingCovarianceDispatch, InducingVariables, CovarianceModel};
//! use covarianza::kernels::SquaredExponential;
//! use covarianza::primitives::Matrix;
//!
//! let z = InducingVariables::Points(Matrix::from_vec(2, 1, vec![0.0, 1.0]).unwrap());
//! let kernel = CovarianceModel::Plain(SquaredExponential::new());
//! let x = Matrix::from_vec(3, 1, vec![0.0, 0.5, 1.0]).unwrap();
//!
//! let dispatch = InducingCovarianceDispatch::new();
//! let kuu = dispatch.kuu(&z, &kernel).unwrap();
//! let kuf = dispatch.kuf(&z, &kernel, &x).unwrap();
//! assert_eq!(kuu.shape(), (2, 2));
//! assert_eq!(kuf.shape(), (2, 3));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::convolutional::{ConvolutionalCovariance, FeatureMap};
use crate::error::{CovarianzaError, Result};
use crate::primitives::Matrix;
use crate::traits::CovarianceFunction;

/// Default diagonal jitter added to every inducing-to-inducing matrix.
///
/// Large enough to keep downstream Cholesky factorizations of a PSD
/// `Kuu` numerically positive definite, small enough not to disturb
/// the model.
pub const DEFAULT_JITTER: f64 = 1e-6;

/// Tag for the inducing-representation axis of the dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InducingKind {
    /// Inducing points in the input space.
    Points,
    /// Inducing patches in patch-feature space.
    Patches,
    /// Inducing features in embedding-output space.
    Features,
}

impl fmt::Display for InducingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InducingKind::Points => write!(f, "points"),
            InducingKind::Patches => write!(f, "patches"),
            InducingKind::Features => write!(f, "features"),
        }
    }
}

/// Tag for the kernel axis of the dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KernelKind {
    /// A bare base covariance function over raw inputs.
    Plain,
    /// A patch-mode convolutional covariance.
    Convolutional,
    /// An embedding-mode covariance.
    Embedded,
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelKind::Plain => write!(f, "plain"),
            KernelKind::Convolutional => write!(f, "convolutional"),
            KernelKind::Embedded => write!(f, "embedded"),
        }
    }
}

/// A set of inducing variables, tagged by representation.
///
/// Rows are feature vectors: raw inputs for `Points`, patch vectors of
/// length ph*pw for `Patches`, embedding outputs for `Features`.
/// Deduplication of rows is the caller's responsibility (satisfied by
/// whatever initialization routine produced them).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InducingVariables {
    /// Inducing points in the input space.
    Points(Matrix<f64>),
    /// Inducing patches in patch-feature space.
    Patches(Matrix<f64>),
    /// Inducing features in embedding-output space.
    Features(Matrix<f64>),
}

impl InducingVariables {
    /// Returns the representation tag.
    #[must_use]
    pub fn kind(&self) -> InducingKind {
        match self {
            InducingVariables::Points(_) => InducingKind::Points,
            InducingVariables::Patches(_) => InducingKind::Patches,
            InducingVariables::Features(_) => InducingKind::Features,
        }
    }

    /// Returns the underlying feature rows.
    #[must_use]
    pub fn values(&self) -> &Matrix<f64> {
        match self {
            InducingVariables::Points(z)
            | InducingVariables::Patches(z)
            | InducingVariables::Features(z) => z,
        }
    }

    /// Returns the number of inducing variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values().n_rows()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The kernel axis of the dispatch: either a bare base covariance
/// function or an image covariance (whose mode determines the tag).
pub enum CovarianceModel<K: CovarianceFunction> {
    /// A bare base covariance over raw inputs.
    Plain(K),
    /// A convolutional covariance in either patch or embedding mode.
    Image(ConvolutionalCovariance<K>),
}

impl<K: CovarianceFunction> CovarianceModel<K> {
    /// Returns the kernel tag.
    #[must_use]
    pub fn kind(&self) -> KernelKind {
        match self {
            CovarianceModel::Plain(_) => KernelKind::Plain,
            CovarianceModel::Image(conv) => match conv.feature_map() {
                FeatureMap::Patches { .. } => KernelKind::Convolutional,
                FeatureMap::Embedding(_) => KernelKind::Embedded,
            },
        }
    }

    fn base(&self) -> &K {
        match self {
            CovarianceModel::Plain(kernel) => kernel,
            CovarianceModel::Image(conv) => conv.base(),
        }
    }
}

type KuuHandler<K> = fn(&InducingVariables, &CovarianceModel<K>, f64) -> Result<Matrix<f64>>;
type KufHandler<K> =
    fn(&InducingVariables, &CovarianceModel<K>, &Matrix<f64>) -> Result<Matrix<f64>>;

struct Registration<K: CovarianceFunction> {
    inducing: InducingKind,
    kernel: KernelKind,
    kuu: KuuHandler<K>,
    kuf: KufHandler<K>,
}

fn registry<K: CovarianceFunction>() -> [Registration<K>; 3] {
    [
        Registration {
            inducing: InducingKind::Points,
            kernel: KernelKind::Plain,
            kuu: kuu_inducing_gram::<K>,
            kuf: kuf_plain::<K>,
        },
        Registration {
            inducing: InducingKind::Patches,
            kernel: KernelKind::Convolutional,
            kuu: kuu_inducing_gram::<K>,
            kuf: kuf_patches::<K>,
        },
        Registration {
            inducing: InducingKind::Features,
            kernel: KernelKind::Embedded,
            kuu: kuu_inducing_gram::<K>,
            kuf: kuf_embedded::<K>,
        },
    ]
}

fn resolve<K: CovarianceFunction>(
    inducing: InducingKind,
    kernel: KernelKind,
) -> Result<Registration<K>> {
    registry::<K>()
        .into_iter()
        .find(|registration| registration.inducing == inducing && registration.kernel == kernel)
        .ok_or_else(|| CovarianzaError::unsupported_combination(inducing, kernel))
}

/// Kuu for every registered variant: the inducing rows already live in
/// the space the base kernel scores, so evaluate it on them directly
/// and stabilize the diagonal.
fn kuu_inducing_gram<K: CovarianceFunction>(
    inducing: &InducingVariables,
    kernel: &CovarianceModel<K>,
    jitter: f64,
) -> Result<Matrix<f64>> {
    let z = inducing.values();
    let mut kuu = kernel.base().evaluate(z, z)?;
    for i in 0..kuu.n_rows() {
        let stabilized = kuu.get(i, i) + jitter;
        kuu.set(i, i, stabilized);
    }
    Ok(kuu)
}

fn kuf_plain<K: CovarianceFunction>(
    inducing: &InducingVariables,
    kernel: &CovarianceModel<K>,
    x: &Matrix<f64>,
) -> Result<Matrix<f64>> {
    kernel.base().evaluate(inducing.values(), x)
}

/// Kuf for inducing patches: only the data side is patch-decomposed.
/// `Kuf[m, n] = sum_i w[i] * k(Z[m], patch_i(X[n]))`.
fn kuf_patches<K: CovarianceFunction>(
    inducing: &InducingVariables,
    kernel: &CovarianceModel<K>,
    x: &Matrix<f64>,
) -> Result<Matrix<f64>> {
    let conv = match kernel {
        CovarianceModel::Image(conv) => conv,
        CovarianceModel::Plain(_) => {
            return Err(CovarianzaError::unsupported_combination(
                inducing.kind(),
                kernel.kind(),
            ))
        }
    };
    let (extractor, weights) = match conv.feature_map() {
        FeatureMap::Patches { extractor, weights } => (extractor, weights),
        FeatureMap::Embedding(_) => {
            return Err(CovarianzaError::unsupported_combination(
                inducing.kind(),
                kernel.kind(),
            ))
        }
    };

    let num_patches = extractor.num_patches();
    if weights.len() != num_patches {
        return Err(CovarianzaError::shape_mismatch(
            "patch weights",
            num_patches,
            weights.len(),
        ));
    }

    let z = inducing.values();
    let patches = extractor.extract_batch(x)?;
    let cross = conv.base().evaluate(z, &patches)?;
    let mut data = Vec::with_capacity(z.n_rows() * x.n_rows());
    for m in 0..z.n_rows() {
        for n in 0..x.n_rows() {
            let mut sum = 0.0;
            for i in 0..num_patches {
                sum += weights[i] * cross.get(m, n * num_patches + i);
            }
            data.push(sum);
        }
    }
    Ok(Matrix::from_vec(z.n_rows(), x.n_rows(), data)?)
}

fn kuf_embedded<K: CovarianceFunction>(
    inducing: &InducingVariables,
    kernel: &CovarianceModel<K>,
    x: &Matrix<f64>,
) -> Result<Matrix<f64>> {
    let conv = match kernel {
        CovarianceModel::Image(conv) => conv,
        CovarianceModel::Plain(_) => {
            return Err(CovarianzaError::unsupported_combination(
                inducing.kind(),
                kernel.kind(),
            ))
        }
    };
    let embedding = match conv.feature_map() {
        FeatureMap::Embedding(embedding) => embedding,
        FeatureMap::Patches { .. } => {
            return Err(CovarianzaError::unsupported_combination(
                inducing.kind(),
                kernel.kind(),
            ))
        }
    };

    let features = embedding.embed(x)?;
    conv.base().evaluate(inducing.values(), &features)
}

/// Resolves and evaluates inducing-variable covariances.
///
/// Owns only the jitter; inducing variables and kernels are passed by
/// reference on every call so externally mutated parameters are always
/// read fresh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InducingCovarianceDispatch {
    jitter: f64,
}

impl InducingCovarianceDispatch {
    /// Creates a dispatch with [`DEFAULT_JITTER`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            jitter: DEFAULT_JITTER,
        }
    }

    /// Sets the diagonal jitter used by [`kuu`](Self::kuu).
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Returns the configured jitter.
    #[must_use]
    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Computes the inducing-to-inducing covariance `Kuu` with the
    /// configured jitter added to its diagonal.
    ///
    /// # Errors
    ///
    /// Returns an error if the jitter is not strictly positive, if the
    /// (inducing, kernel) pair has no registered handler, or if the
    /// underlying evaluation fails.
    pub fn kuu<K: CovarianceFunction>(
        &self,
        inducing: &InducingVariables,
        kernel: &CovarianceModel<K>,
    ) -> Result<Matrix<f64>> {
        if self.jitter <= 0.0 || self.jitter.is_nan() {
            return Err(CovarianzaError::invalid_parameter(
                "jitter",
                self.jitter,
                ">0",
            ));
        }
        let registration = resolve::<K>(inducing.kind(), kernel.kind())?;
        (registration.kuu)(inducing, kernel, self.jitter)
    }

    /// Computes the inducing-to-data covariance `Kuf`.
    ///
    /// # Errors
    ///
    /// Returns an error if the (inducing, kernel) pair has no
    /// registered handler, or if the underlying evaluation fails.
    pub fn kuf<K: CovarianceFunction>(
        &self,
        inducing: &InducingVariables,
        kernel: &CovarianceModel<K>,
        x: &Matrix<f64>,
    ) -> Result<Matrix<f64>> {
        let registration = resolve::<K>(inducing.kind(), kernel.kind())?;
        (registration.kuf)(inducing, kernel, x)
    }
}

impl Default for InducingCovarianceDispatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "inducing_tests.rs"]
mod tests;
