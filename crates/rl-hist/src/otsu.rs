use log::debug;
use rl_core::{PixelBuffer, PixelFormat};

use crate::{Histogram, histogram_gray, histograms_rgb565};

/// Otsu threshold of a histogram describing `total` pixels.
///
/// Sweeps every level `t`, treating `[0, t]` as background, and keeps the
/// first `t` with the strictly largest between-class variance
/// `wB * wF * (mB - mF)^2`. Returns 0 when no split has positive variance.
pub fn otsu_from_histogram(hist: &Histogram, total: u64) -> u8 {
    let sum: f64 = hist
        .bins()
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0u64;
    let mut var_max = 0f64;
    let mut threshold = 0u8;

    for (t, &count) in hist.bins().iter().enumerate() {
        w_b += u64::from(count);
        if w_b == 0 {
            continue;
        }

        let w_f = match total.checked_sub(w_b) {
            Some(w) if w > 0 => w,
            _ => break,
        };

        sum_b += t as f64 * count as f64;
        let m_b = sum_b / w_b as f64;
        let m_f = (sum - sum_b) / w_f as f64;

        let diff = m_b - m_f;
        let var_between = w_b as f64 * w_f as f64 * diff * diff;
        if var_between > var_max {
            var_max = var_between;
            threshold = t as u8;
        }
    }

    threshold
}

/// Global Otsu threshold of an image, recomputing its histogram(s).
///
/// RGB565 images are thresholded per upscaled channel and the results are
/// combined as `round((30 tR + 59 tG + 11 tB) / 100)`. This is a luma
/// approximation, not a joint multi-channel Otsu.
pub fn otsu_threshold(img: &PixelBuffer<'_>) -> u8 {
    let total = img.pixel_count() as u64;

    match img.format() {
        PixelFormat::Gray8 => {
            let hist = histogram_gray(img.data(), img.width(), img.height());
            otsu_from_histogram(&hist, total)
        }
        PixelFormat::Rgb565 => {
            let hists = histograms_rgb565(img.data(), img.width(), img.height());
            let t_r = u32::from(otsu_from_histogram(&hists.r, total));
            let t_g = u32::from(otsu_from_histogram(&hists.g, total));
            let t_b = u32::from(otsu_from_histogram(&hists.b, total));

            let t = (30 * t_r + 59 * t_g + 11 * t_b + 50) / 100;
            debug!("otsu rgb565: r={t_r} g={t_g} b={t_b} -> {t}");
            t as u8
        }
    }
}
