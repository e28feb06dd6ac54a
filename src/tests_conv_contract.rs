// =========================================================================
// FALSIFY-CV: convolutional covariance contract (covarianza convolutional)
//
// Contract under test: the weighted bilinear reduction over patch pairs:
// diagonal identity, symmetry, and the degenerate collapse to the bare
// base kernel.
// =========================================================================

use super::*;
use crate::kernels::SquaredExponential;

/// FALSIFY-CV-001: covariance_diag(X) == diag(covariance(X, X)) exactly
#[test]
fn falsify_cv_001_diag_identity() {
    let extractor = PatchExtractor::new((4, 4), (3, 3)).expect("valid shapes");
    let kernel = ConvolutionalCovariance::with_patches(
        SquaredExponential::new().with_lengthscale(3.0),
        extractor,
        Vector::from_slice(&[1.0, -1.0, 0.5, 2.0]),
    )
    .expect("weight length matches");

    let images = Matrix::from_vec(3, 16, (0..48).map(|i| (i % 7) as f64).collect())
        .expect("valid matrix");

    let full = kernel.covariance(&images, None).expect("covariance succeeds");
    let diag = kernel
        .covariance_diag(&images)
        .expect("covariance_diag succeeds");
    for n in 0..3 {
        assert_eq!(
            diag[n],
            full.get(n, n),
            "FALSIFIED CV-001: diag[{n}]={}, full[{n},{n}]={}",
            diag[n],
            full.get(n, n)
        );
    }
}

/// FALSIFY-CV-002: covariance(A, B) == covariance(B, A)^T
#[test]
fn falsify_cv_002_symmetry() {
    let extractor = PatchExtractor::new((3, 3), (2, 2)).expect("valid shapes");
    let kernel = ConvolutionalCovariance::with_patches(
        SquaredExponential::new(),
        extractor,
        Vector::from_slice(&[0.2, -0.4, 0.6, -0.8]),
    )
    .expect("weight length matches");

    let a = Matrix::from_vec(2, 9, (0..18).map(|i| (i as f64).sin()).collect())
        .expect("valid matrix");
    let b = Matrix::from_vec(3, 9, (0..27).map(|i| (i as f64).cos()).collect())
        .expect("valid matrix");

    let kab = kernel.covariance(&a, Some(&b)).expect("covariance succeeds");
    let kba = kernel.covariance(&b, Some(&a)).expect("covariance succeeds");
    for m in 0..2 {
        for n in 0..3 {
            assert!(
                (kab.get(m, n) - kba.get(n, m)).abs() < 1e-12,
                "FALSIFIED CV-002: K[{m},{n}]={} vs K^T={}",
                kab.get(m, n),
                kba.get(n, m)
            );
        }
    }
}

mod conv_proptest_falsify {
    use super::*;
    use proptest::prelude::*;

    /// FALSIFY-CV-003-prop: diagonal identity on random images and weights
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn falsify_cv_003_prop_diag_identity(
            pixels in proptest::collection::vec(-2.0f64..2.0, 18),
            weights in proptest::collection::vec(-1.0f64..1.0, 4),
        ) {
            let extractor = PatchExtractor::new((3, 3), (2, 2)).expect("valid shapes");
            let kernel = ConvolutionalCovariance::with_patches(
                SquaredExponential::new(),
                extractor,
                Vector::from_vec(weights),
            )
            .expect("weight length matches");

            let images = Matrix::from_vec(2, 9, pixels).expect("valid matrix");
            let full = kernel.covariance(&images, None).expect("covariance succeeds");
            let diag = kernel.covariance_diag(&images).expect("covariance_diag succeeds");
            for n in 0..2 {
                prop_assert_eq!(
                    diag[n],
                    full.get(n, n),
                    "FALSIFIED CV-003-prop: image {}", n
                );
            }
        }
    }

    /// FALSIFY-CV-004-prop: P = 1 collapses to w^2 * base kernel
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn falsify_cv_004_prop_degenerate_collapse(
            a_pixels in proptest::collection::vec(-2.0f64..2.0, 4),
            b_pixels in proptest::collection::vec(-2.0f64..2.0, 4),
            weight in -2.0f64..2.0,
        ) {
            use crate::traits::CovarianceFunction;

            let extractor = PatchExtractor::new((2, 2), (2, 2)).expect("valid shapes");
            let base = SquaredExponential::new();
            let kernel = ConvolutionalCovariance::with_patches(
                base.clone(),
                extractor,
                Vector::from_slice(&[weight]),
            )
            .expect("weight length matches");

            let a = Matrix::from_vec(1, 4, a_pixels).expect("valid matrix");
            let b = Matrix::from_vec(1, 4, b_pixels).expect("valid matrix");

            let k = kernel.covariance(&a, Some(&b)).expect("covariance succeeds");
            let raw = base.evaluate(&a, &b).expect("evaluate succeeds");
            let expected = weight * weight * raw.get(0, 0);
            prop_assert!(
                (k.get(0, 0) - expected).abs() < 1e-12,
                "FALSIFIED CV-004-prop: {} != {}", k.get(0, 0), expected
            );
        }
    }
}
