// =========================================================================
// FALSIFY-PE: patch extraction contract (covarianza patches)
//
// Contract under test: valid-convolution patch extraction over row-major
// flattened images: patch count, patch length, offset ordering, and
// per-image independence within a batch.
// =========================================================================

use super::*;

/// FALSIFY-PE-001: P = (H-ph+1)*(W-pw+1) for every valid shape pair
#[test]
fn falsify_pe_001_patch_count_formula() {
    for (h, w, ph, pw) in [
        (4, 4, 2, 2),
        (5, 3, 2, 3),
        (3, 3, 3, 3),
        (6, 4, 1, 1),
        (2, 7, 2, 4),
    ] {
        let extractor = PatchExtractor::new((h, w), (ph, pw)).expect("valid shapes");
        let expected = (h - ph + 1) * (w - pw + 1);
        assert_eq!(
            extractor.num_patches(),
            expected,
            "FALSIFIED PE-001: {h}x{w}/{ph}x{pw} gave P={}, expected {expected}",
            extractor.num_patches()
        );
    }
}

/// FALSIFY-PE-002: every extracted patch row has length ph*pw
#[test]
fn falsify_pe_002_patch_row_length() {
    let extractor = PatchExtractor::new((5, 4), (3, 2)).expect("valid shapes");
    let image = crate::primitives::Vector::from_vec((0..20).map(f64::from).collect());
    let patches = extractor.extract(&image).expect("extract succeeds");
    assert_eq!(
        patches.shape(),
        (extractor.num_patches(), 6),
        "FALSIFIED PE-002: patch matrix shape {:?}",
        patches.shape()
    );
}

/// FALSIFY-PE-003: patch at offset (r, c) starts at image[r*W + c]
#[test]
fn falsify_pe_003_offset_indexing() {
    let (h, w, ph, pw) = (5, 6, 2, 3);
    let extractor = PatchExtractor::new((h, w), (ph, pw)).expect("valid shapes");
    let image = crate::primitives::Vector::from_vec((0..30).map(f64::from).collect());
    let patches = extractor.extract(&image).expect("extract succeeds");

    let cols = w - pw + 1;
    for r in 0..=(h - ph) {
        for c in 0..=(w - pw) {
            let patch = patches.row_slice(r * cols + c);
            assert_eq!(
                patch[0],
                (r * w + c) as f64,
                "FALSIFIED PE-003: patch ({r},{c}) starts at {}, expected {}",
                patch[0],
                r * w + c
            );
        }
    }
}

mod patches_proptest_falsify {
    use super::*;
    use proptest::prelude::*;

    /// FALSIFY-PE-004-prop: extraction shape holds for random valid configs
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn falsify_pe_004_prop_shapes(
            h in 1usize..8,
            w in 1usize..8,
            ph_off in 0usize..8,
            pw_off in 0usize..8,
        ) {
            let ph = 1 + ph_off % h;
            let pw = 1 + pw_off % w;
            let extractor = PatchExtractor::new((h, w), (ph, pw)).expect("valid shapes");
            let image = crate::primitives::Vector::from_vec(
                (0..h * w).map(|i| i as f64).collect(),
            );
            let patches = extractor.extract(&image).expect("extract succeeds");
            prop_assert_eq!(patches.n_rows(), (h - ph + 1) * (w - pw + 1));
            prop_assert_eq!(patches.n_cols(), ph * pw);
        }
    }

    /// FALSIFY-PE-005-prop: batch rows are per-image extractions in order
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn falsify_pe_005_prop_batch_order(
            n in 0usize..4,
            seed in 0u64..1000,
        ) {
            let extractor = PatchExtractor::new((3, 3), (2, 2)).expect("valid shapes");
            let data: Vec<f64> = (0..n * 9)
                .map(|i| ((seed.wrapping_mul(31).wrapping_add(i as u64)) % 97) as f64)
                .collect();
            let images = crate::primitives::Matrix::from_vec(n, 9, data)
                .expect("valid matrix");

            let batch = extractor.extract_batch(&images).expect("extract succeeds");
            prop_assert_eq!(batch.n_rows(), n * 4);
            for img in 0..n {
                let single = extractor.extract(&images.row(img)).expect("extract succeeds");
                for p in 0..4 {
                    prop_assert_eq!(
                        batch.row_slice(img * 4 + p),
                        single.row_slice(p),
                        "FALSIFIED PE-005-prop: image {} patch {}", img, p
                    );
                }
            }
        }
    }
}
