//! Overlapping patch extraction from flattened images.
//!
//! Images are row-major flattened vectors of length H*W. Extraction
//! produces every patch of a fixed (ph, pw) shape at every valid
//! offset, with no padding: offsets range over [0, H-ph] x [0, W-pw],
//! giving P = (H-ph+1)*(W-pw+1) patches per image. Patches are ordered
//! row-major over offsets, and each patch is itself row-major
//! flattened. Per-patch weight vectors index into this order.
//!
//! # Examples
//!
//! ```
//! use covarianza::patches::PatchExtractor;
//! use covarianza::primitives::Vector;
//!
//! let extractor = PatchExtractor::new((4, 4), (2, 2)).unwrap();
//! assert_eq!(extractor.num_patches(), 9);
//!
//! let image = Vector::from_vec((0..16).map(f64::from).collect());
//! let patches = extractor.extract(&image).unwrap();
//! assert_eq!(patches.shape(), (9, 4));
//! // First patch covers the top-left 2x2 window.
//! assert_eq!(patches.row_slice(0), &[0.0, 1.0, 4.0, 5.0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CovarianzaError, Result};
use crate::primitives::{Matrix, Vector};

/// Slices flattened images into all overlapping fixed-size patches.
///
/// Extraction is a pure function of the input and the configured
/// shapes: the same call always produces the same patch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchExtractor {
    image_height: usize,
    image_width: usize,
    patch_height: usize,
    patch_width: usize,
}

impl PatchExtractor {
    /// Creates an extractor for `image_shape` (H, W) and `patch_shape`
    /// (ph, pw).
    ///
    /// # Errors
    ///
    /// Returns an error unless `1 <= ph <= H` and `1 <= pw <= W`.
    pub fn new(image_shape: (usize, usize), patch_shape: (usize, usize)) -> Result<Self> {
        let (image_height, image_width) = image_shape;
        let (patch_height, patch_width) = patch_shape;

        if patch_height < 1
            || patch_width < 1
            || patch_height > image_height
            || patch_width > image_width
        {
            return Err(CovarianzaError::ShapeMismatch {
                expected: format!("patch shape within 1x1..={image_height}x{image_width}"),
                actual: format!("{patch_height}x{patch_width}"),
            });
        }

        Ok(Self {
            image_height,
            image_width,
            patch_height,
            patch_width,
        })
    }

    /// Returns the configured image shape (H, W).
    #[must_use]
    pub fn image_shape(&self) -> (usize, usize) {
        (self.image_height, self.image_width)
    }

    /// Returns the configured patch shape (ph, pw).
    #[must_use]
    pub fn patch_shape(&self) -> (usize, usize) {
        (self.patch_height, self.patch_width)
    }

    /// Returns the flattened image length H*W.
    #[must_use]
    pub fn image_len(&self) -> usize {
        self.image_height * self.image_width
    }

    /// Returns the flattened patch length ph*pw.
    #[must_use]
    pub fn patch_len(&self) -> usize {
        self.patch_height * self.patch_width
    }

    /// Returns the number of patches P per image.
    #[must_use]
    pub fn num_patches(&self) -> usize {
        (self.image_height - self.patch_height + 1) * (self.image_width - self.patch_width + 1)
    }

    /// Extracts all patches of one image as a P x ph*pw matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if the image length is not H*W.
    pub fn extract(&self, image: &Vector<f64>) -> Result<Matrix<f64>> {
        if image.len() != self.image_len() {
            return Err(CovarianzaError::shape_mismatch(
                "image length",
                self.image_len(),
                image.len(),
            ));
        }

        let mut data = Vec::with_capacity(self.num_patches() * self.patch_len());
        self.copy_patches(image.as_slice(), &mut data);
        Ok(Matrix::from_vec(self.num_patches(), self.patch_len(), data)?)
    }

    /// Extracts all patches of a batch of images as an N*P x ph*pw
    /// matrix.
    ///
    /// Each image is extracted independently; the within-image patch
    /// order is preserved and images are concatenated in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch width is not H*W.
    pub fn extract_batch(&self, images: &Matrix<f64>) -> Result<Matrix<f64>> {
        if images.n_cols() != self.image_len() {
            return Err(CovarianzaError::shape_mismatch(
                "image length",
                self.image_len(),
                images.n_cols(),
            ));
        }

        let mut data =
            Vec::with_capacity(images.n_rows() * self.num_patches() * self.patch_len());
        for n in 0..images.n_rows() {
            self.copy_patches(images.row_slice(n), &mut data);
        }
        Ok(Matrix::from_vec(
            images.n_rows() * self.num_patches(),
            self.patch_len(),
            data,
        )?)
    }

    fn copy_patches(&self, image: &[f64], out: &mut Vec<f64>) {
        for offset_row in 0..=(self.image_height - self.patch_height) {
            for offset_col in 0..=(self.image_width - self.patch_width) {
                for patch_row in 0..self.patch_height {
                    let start = (offset_row + patch_row) * self.image_width + offset_col;
                    out.extend_from_slice(&image[start..start + self.patch_width]);
                }
            }
        }
    }
}


#[cfg(test)]
#[path = "tests_patches_contract.rs"]
mod tests_patches_contract;
