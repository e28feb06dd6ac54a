//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use covarianza::prelude::*;
//! ```

pub use crate::convolutional::{ConvolutionalCovariance, FeatureMap};
pub use crate::error::{CovarianzaError, Result};
pub use crate::inducing::{
    CovarianceModel, InducingCovarianceDispatch, InducingKind, InducingVariables, KernelKind,
    DEFAULT_JITTER,
};
pub use crate::kernels::{Exponential, Matern52, SquaredExponential};
pub use crate::patches::PatchExtractor;
pub use crate::primitives::{Matrix, Vector};
pub use crate::traits::{CovarianceFunction, FeatureEmbedding};
