pub(crate) use super::*;
use crate::kernels::SquaredExponential;

fn constant_base() -> SquaredExponential {
    SquaredExponential::new().with_lengthscale(f64::INFINITY)
}

fn image_batch(n: usize, len: usize, seed: u64) -> Matrix<f64> {
    let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    let data: Vec<f64> = (0..n * len)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            ((state >> 33) as f64 / (1u64 << 31) as f64) * 2.0 - 1.0
        })
        .collect();
    Matrix::from_vec(n, len, data).expect("valid matrix")
}

struct IdentityEmbedding;

impl FeatureEmbedding for IdentityEmbedding {
    fn embed(&self, batch: &Matrix<f64>) -> Result<Matrix<f64>> {
        Ok(batch.clone())
    }
}

#[test]
fn test_unit_weights_constant_base_sums_patch_pairs() {
    // 4x4 images, 2x2 patches: P = 9. Constant base kernel and unit
    // weights make every image pair score 9 * 9.
    let extractor = PatchExtractor::new((4, 4), (2, 2)).expect("valid shapes");
    let kernel = ConvolutionalCovariance::with_uniform_weights(constant_base(), extractor);

    let images = image_batch(2, 16, 3);
    let k = kernel.covariance(&images, None).expect("covariance succeeds");

    assert_eq!(k.shape(), (2, 2));
    for m in 0..2 {
        for n in 0..2 {
            assert!((k.get(m, n) - 81.0).abs() < 1e-12);
        }
    }
}

#[test]
fn test_degenerate_patch_shape_reduces_to_base() {
    // patch shape == image shape collapses to P = 1: K = w[0]^2 * base.
    let extractor = PatchExtractor::new((2, 2), (2, 2)).expect("valid shapes");
    let base = SquaredExponential::new().with_lengthscale(1.5);
    let kernel = ConvolutionalCovariance::with_patches(
        base.clone(),
        extractor,
        Vector::from_slice(&[0.5]),
    )
    .expect("weight length matches");

    let a = image_batch(2, 4, 5);
    let b = image_batch(3, 4, 7);

    use crate::traits::CovarianceFunction;
    let k = kernel.covariance(&a, Some(&b)).expect("covariance succeeds");
    let raw = base.evaluate(&a, &b).expect("evaluate succeeds");

    assert_eq!(k.shape(), (2, 3));
    for m in 0..2 {
        for n in 0..3 {
            assert!((k.get(m, n) - 0.25 * raw.get(m, n)).abs() < 1e-15);
        }
    }
}

#[test]
fn test_diag_equals_full_matrix_diagonal_exactly() {
    let extractor = PatchExtractor::new((3, 3), (2, 2)).expect("valid shapes");
    let base = SquaredExponential::new().with_lengthscale(2.0);
    let kernel = ConvolutionalCovariance::with_patches(
        base,
        extractor,
        Vector::from_slice(&[1.0, -0.5, 0.25, 2.0]),
    )
    .expect("weight length matches");

    let images = image_batch(4, 9, 11);
    let full = kernel.covariance(&images, None).expect("covariance succeeds");
    let diag = kernel
        .covariance_diag(&images)
        .expect("covariance_diag succeeds");

    assert_eq!(diag.len(), 4);
    for n in 0..4 {
        assert_eq!(diag[n], full.get(n, n));
    }
}

#[test]
fn test_covariance_symmetry() {
    let extractor = PatchExtractor::new((3, 3), (2, 2)).expect("valid shapes");
    let kernel = ConvolutionalCovariance::with_patches(
        SquaredExponential::new(),
        extractor,
        Vector::from_slice(&[0.3, 1.0, -0.7, 0.1]),
    )
    .expect("weight length matches");

    let a = image_batch(3, 9, 13);
    let b = image_batch(2, 9, 17);

    let kab = kernel.covariance(&a, Some(&b)).expect("covariance succeeds");
    let kba = kernel.covariance(&b, Some(&a)).expect("covariance succeeds");

    assert_eq!(kab.shape(), (3, 2));
    for m in 0..3 {
        for n in 0..2 {
            assert!((kab.get(m, n) - kba.get(n, m)).abs() < 1e-12);
        }
    }
}

#[test]
fn test_negative_weights_are_allowed() {
    let extractor = PatchExtractor::new((2, 2), (1, 1)).expect("valid shapes");
    let kernel = ConvolutionalCovariance::with_patches(
        constant_base(),
        extractor,
        Vector::from_slice(&[1.0, -1.0, 1.0, -1.0]),
    )
    .expect("weight length matches");

    let images = image_batch(1, 4, 19);
    let k = kernel.covariance(&images, None).expect("covariance succeeds");
    // Constant base: K = (sum of weights)^2 = 0.
    assert!(k.get(0, 0).abs() < 1e-12);
}

#[test]
fn test_empty_batch_returns_empty_matrix() {
    let extractor = PatchExtractor::new((4, 4), (2, 2)).expect("valid shapes");
    let kernel = ConvolutionalCovariance::with_uniform_weights(constant_base(), extractor);

    let empty = Matrix::from_vec(0, 16, Vec::new()).expect("valid matrix");
    let k = kernel
        .covariance(&empty, Some(&empty))
        .expect("covariance succeeds");
    assert_eq!(k.shape(), (0, 0));

    let k_self = kernel.covariance(&empty, None).expect("covariance succeeds");
    assert_eq!(k_self.shape(), (0, 0));

    let diag = kernel
        .covariance_diag(&empty)
        .expect("covariance_diag succeeds");
    assert!(diag.is_empty());
}

#[test]
fn test_one_sided_empty_batch() {
    let extractor = PatchExtractor::new((3, 3), (2, 2)).expect("valid shapes");
    let kernel = ConvolutionalCovariance::with_uniform_weights(constant_base(), extractor);

    let a = image_batch(2, 9, 23);
    let empty = Matrix::from_vec(0, 9, Vec::new()).expect("valid matrix");
    let k = kernel.covariance(&a, Some(&empty)).expect("covariance succeeds");
    assert_eq!(k.shape(), (2, 0));
}

#[test]
fn test_rejects_wrong_image_width() {
    let extractor = PatchExtractor::new((4, 4), (2, 2)).expect("valid shapes");
    let kernel = ConvolutionalCovariance::with_uniform_weights(constant_base(), extractor);

    let images = image_batch(1, 9, 29);
    assert!(kernel.covariance(&images, None).is_err());
    assert!(kernel.covariance_diag(&images).is_err());
}

#[test]
fn test_with_patches_rejects_wrong_weight_length() {
    let extractor = PatchExtractor::new((4, 4), (2, 2)).expect("valid shapes");
    let result = ConvolutionalCovariance::with_patches(
        constant_base(),
        extractor,
        Vector::from_slice(&[1.0, 2.0]),
    );
    assert!(result.is_err());
}

#[test]
fn test_set_weights_replaces_and_revalidates() {
    let extractor = PatchExtractor::new((2, 2), (1, 1)).expect("valid shapes");
    let mut kernel = ConvolutionalCovariance::with_uniform_weights(constant_base(), extractor);

    kernel
        .set_weights(Vector::from_slice(&[2.0, 0.0, 0.0, 0.0]))
        .expect("length matches");
    let images = image_batch(1, 4, 31);
    let k = kernel.covariance(&images, None).expect("covariance succeeds");
    // Only the first patch contributes: 2.0^2 * 1.0.
    assert!((k.get(0, 0) - 4.0).abs() < 1e-12);

    assert!(kernel.set_weights(Vector::from_slice(&[1.0])).is_err());
}

#[test]
fn test_set_weights_rejected_in_embedding_mode() {
    let mut kernel = ConvolutionalCovariance::with_embedding(
        SquaredExponential::new(),
        Box::new(IdentityEmbedding),
    );
    assert!(kernel.weights().is_none());
    assert!(kernel.set_weights(Vector::from_slice(&[1.0])).is_err());
}

#[test]
fn test_parameters_reread_on_every_call() {
    let extractor = PatchExtractor::new((2, 2), (2, 2)).expect("valid shapes");
    let mut kernel = ConvolutionalCovariance::with_uniform_weights(
        SquaredExponential::new(),
        extractor,
    );

    let a = image_batch(1, 4, 37);
    let b = image_batch(1, 4, 41);
    let before = kernel.covariance(&a, Some(&b)).expect("covariance succeeds");

    kernel.base_mut().set_lengthscale(100.0);
    let after = kernel.covariance(&a, Some(&b)).expect("covariance succeeds");

    assert!(after.get(0, 0) > before.get(0, 0));
}

#[test]
fn test_embedding_mode_applies_base_to_embeddings() {
    use crate::traits::CovarianceFunction;

    let base = SquaredExponential::new().with_lengthscale(0.9);
    let kernel =
        ConvolutionalCovariance::with_embedding(base.clone(), Box::new(IdentityEmbedding));

    let a = image_batch(3, 5, 43);
    let b = image_batch(2, 5, 47);

    let k = kernel.covariance(&a, Some(&b)).expect("covariance succeeds");
    let raw = base.evaluate(&a, &b).expect("evaluate succeeds");
    assert_eq!(k, raw);
}

#[test]
fn test_embedding_mode_diag_identity() {
    let kernel = ConvolutionalCovariance::with_embedding(
        SquaredExponential::new().with_variance(1.7),
        Box::new(IdentityEmbedding),
    );

    let a = image_batch(3, 5, 53);
    let full = kernel.covariance(&a, None).expect("covariance succeeds");
    let diag = kernel.covariance_diag(&a).expect("covariance_diag succeeds");
    for i in 0..3 {
        assert_eq!(diag[i], full.get(i, i));
    }
}

#[test]
fn test_embedding_mode_empty_batch() {
    let kernel = ConvolutionalCovariance::with_embedding(
        SquaredExponential::new(),
        Box::new(IdentityEmbedding),
    );

    let empty = Matrix::from_vec(0, 5, Vec::new()).expect("valid matrix");
    let k = kernel.covariance(&empty, None).expect("covariance succeeds");
    assert_eq!(k.shape(), (0, 0));
}
