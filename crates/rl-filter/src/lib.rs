//! Windowed raster filters.
//!
//! [`SpatialFilter`] runs one raster pass over a grayscale image. Each source
//! row is equalized through a caller-supplied [`Lut`](rl_core::Lut) into a
//! 3-row rolling cache ([`RowWindow`]); as soon as row `y` is cached, row
//! `y - 1` is filtered from the same equalized 3x3 neighborhoods:
//!
//! - low-pass: truncated mean of the 9 samples,
//! - high-pass: 4-neighbor Laplacian `4c - l - r - t - b`, saturated,
//! - median: exact median of the 9 samples.
//!
//! The outermost ring of pixels gets equalized output only. Outputs are
//! written through a [`CaptureWindow`](rl_core::CaptureWindow), so buffers
//! may hold any contiguous pixel range of the image.
//!
//! [`downsample_block_mean_u8`] reduces an image by averaging
//! non-overlapping `factor x factor` blocks.

mod resample;
mod rows;
mod spatial;

pub use resample::{downsample_block_mean_u8, downsample_block_mean_u8_into};
pub use rows::RowWindow;
pub use spatial::{FilterOutputs, FilterReport, FilteredImages, SpatialFilter, filter_image};
