//! Covarianza: convolutional covariance functions for Gaussian process
//! models in pure Rust.
//!
//! Covarianza implements the covariance side of convolutional GPs: it
//! decomposes images into overlapping patches, scores patch pairs with
//! a pluggable base covariance function, collapses the patch-pair
//! matrix with learned per-patch weights, and resolves the
//! inducing-variable covariances (`Kuu`, `Kuf`) that sparse
//! variational inference consumes. Training loops, automatic
//! differentiation, and optimizers are external collaborators.
//!
//! # Quick Start
//!
//! ```
//! use covarianza::prelude::*;
//!
//! // 4x4 images decomposed into 2x2 patches (9 patches per image).
//! let extractor = PatchExtractor::new((4, 4), (2, 2)).unwrap();
//! let base = SquaredExponential::new().with_lengthscale(2.0);
//! let kernel = ConvolutionalCovariance::with_uniform_weights(base, extractor);
//!
//! let images = Matrix::from_vec(2, 16, (0..32).map(|i| f64::from(i % 5)).collect()).unwrap();
//!
//! // Covariance matrix between all image pairs, and its diagonal.
//! let k = kernel.covariance(&images, None).unwrap();
//! let k_diag = kernel.covariance_diag(&images).unwrap();
//! assert_eq!(k.shape(), (2, 2));
//! assert_eq!(k_diag[0], k.get(0, 0));
//!
//! // Inducing-patch covariances for sparse inference.
//! let inducing = InducingVariables::Patches(Matrix::from_vec(3, 4, (0..12).map(f64::from).collect()).unwrap());
//! let model = CovarianceModel::Image(kernel);
//! let dispatch = InducingCovarianceDispatch::new();
//! let kuu = dispatch.kuu(&inducing, &model).unwrap();
//! let kuf = dispatch.kuf(&inducing, &model, &images).unwrap();
//! assert_eq!(kuu.shape(), (3, 3));
//! assert_eq!(kuf.shape(), (3, 2));
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types plus symmetric eigen helpers
//! - [`patches`]: Overlapping patch extraction from flattened images
//! - [`kernels`]: Stationary base covariance functions (squared exponential, exponential, Matérn 5/2)
//! - [`convolutional`]: Patch-weighted and embedding-based image covariances
//! - [`inducing`]: Double-dispatched inducing-variable covariances (`Kuu`, `Kuf`)
//! - [`traits`]: Capability traits for base kernels and feature embeddings
//! - [`error`]: Error types and the crate-wide `Result` alias

pub mod convolutional;
pub mod error;
pub mod inducing;
pub mod kernels;
pub mod patches;
pub mod prelude;
pub mod primitives;
pub mod traits;

pub use convolutional::{ConvolutionalCovariance, FeatureMap};
pub use error::{CovarianzaError, Result};
pub use inducing::{CovarianceModel, InducingCovarianceDispatch, InducingVariables};
pub use patches::PatchExtractor;
pub use primitives::{Matrix, Vector};
pub use traits::{CovarianceFunction, FeatureEmbedding};
