//! Intensity statistics for 8-bit and RGB565 images.
//!
//! - [`histogram_gray`] / [`histograms_rgb565`] count pixel levels; RGB565
//!   channels are upscaled to 8 bits before counting.
//! - [`equalization_lut`] turns a histogram into a monotonic remapping table.
//! - [`otsu_threshold`] picks the level maximizing between-class variance.
//!   For RGB565 the three per-channel thresholds are combined with luma
//!   weights `(30 R + 59 G + 11 B) / 100`.

mod equalize;
mod histogram;
mod otsu;

pub use equalize::equalization_lut;
pub use histogram::{
    Histogram, ImageHistogram, RgbHistograms, compute_histogram, histogram_gray,
    histograms_rgb565,
};
pub use otsu::{otsu_from_histogram, otsu_threshold};
