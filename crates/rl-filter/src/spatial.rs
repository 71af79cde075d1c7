use log::{debug, warn};
use rl_core::{CaptureWindow, Image, Lut, PixelBuffer};
use rl_hist::Histogram;

use crate::RowWindow;

/// Caller-owned destination buffers for one filter pass.
///
/// Each buffer holds the pixels of the pass's [`CaptureWindow`]: index `i`
/// is image pixel `offset + i`. Border pixels receive no filter output, so
/// their slots in `low_pass`, `high_pass` and `median` keep whatever the
/// caller put there.
#[derive(Debug)]
pub struct FilterOutputs<'a> {
    pub equalized: &'a mut [u8],
    pub low_pass: &'a mut [u8],
    pub high_pass: &'a mut [u8],
    pub median: &'a mut [u8],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterReport {
    /// Histogram of the whole equalized image, border included.
    pub equalized_hist: Histogram,
    /// Number of interior pixels that were filtered.
    pub filtered: usize,
}

/// Full-frame results of [`filter_image`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredImages {
    pub equalized: Image<u8>,
    pub low_pass: Image<u8>,
    pub high_pass: Image<u8>,
    pub median: Image<u8>,
    pub equalized_hist: Histogram,
}

/// Equalize-then-filter engine holding the rolling row cache.
///
/// The cache is allocated once for a fixed image width; [`SpatialFilter::run`]
/// itself does not allocate.
#[derive(Debug, Clone)]
pub struct SpatialFilter {
    rows: RowWindow,
}

impl SpatialFilter {
    pub fn new(width: usize) -> Self {
        Self {
            rows: RowWindow::new(width),
        }
    }

    pub fn width(&self) -> usize {
        self.rows.width()
    }

    /// Runs one raster pass over `src`, equalizing every pixel through `lut`.
    ///
    /// Returns `None` without touching `out` when `src` is not grayscale or
    /// its width differs from the cache width.
    pub fn run(
        &mut self,
        src: &PixelBuffer<'_>,
        lut: &Lut,
        window: CaptureWindow,
        out: &mut FilterOutputs<'_>,
    ) -> Option<FilterReport> {
        let Some(view) = src.gray_view() else {
            warn!("spatial filter: {:?} source is not grayscale", src.format());
            return None;
        };
        let (w, h) = (view.width(), view.height());
        if w != self.rows.width() {
            warn!(
                "spatial filter: row cache width {} does not match image width {w}",
                self.rows.width()
            );
            return None;
        }

        let mut hist = Histogram::new();
        let mut filtered = 0usize;

        for y in 0..h {
            let base = y * w;
            let slot = self.rows.slot_mut(y);
            for (x, (cached, &px)) in slot.iter_mut().zip(view.row(y)).enumerate() {
                let eq = lut.map(px);
                *cached = eq;
                hist.add(eq);
                window.store(out.equalized, base + x, eq);
            }

            if y < 2 || w < 3 {
                continue;
            }

            let (top, mid, bot) = self.rows.rows(y);
            let row_base = (y - 1) * w;
            for x in 1..w - 1 {
                let samples = [
                    top[x - 1],
                    top[x],
                    top[x + 1],
                    mid[x - 1],
                    mid[x],
                    mid[x + 1],
                    bot[x - 1],
                    bot[x],
                    bot[x + 1],
                ];
                let laplacian = 4 * i32::from(mid[x])
                    - i32::from(mid[x - 1])
                    - i32::from(mid[x + 1])
                    - i32::from(top[x])
                    - i32::from(bot[x]);

                let idx = row_base + x;
                window.store(out.low_pass, idx, mean9(&samples));
                window.store(out.high_pass, idx, laplacian.clamp(0, 255) as u8);
                window.store(out.median, idx, median9(samples));
                filtered += 1;
            }
        }

        debug!(
            "spatial filter: {w}x{h} filtered={filtered} window=[{}, +{})",
            window.offset, window.capacity
        );

        Some(FilterReport {
            equalized_hist: hist,
            filtered,
        })
    }
}

/// Allocating convenience: filters the whole frame of `src`.
///
/// Border pixels of the three filter outputs are 0.
pub fn filter_image(src: &PixelBuffer<'_>, lut: &Lut) -> Option<FilteredImages> {
    let (w, h) = (src.width(), src.height());
    let mut equalized = Image::new_fill(w, h, 0u8);
    let mut low_pass = Image::new_fill(w, h, 0u8);
    let mut high_pass = Image::new_fill(w, h, 0u8);
    let mut median = Image::new_fill(w, h, 0u8);

    let report = {
        let mut out = FilterOutputs {
            equalized: equalized.data_mut(),
            low_pass: low_pass.data_mut(),
            high_pass: high_pass.data_mut(),
            median: median.data_mut(),
        };
        SpatialFilter::new(w).run(src, lut, CaptureWindow::full(w * h), &mut out)?
    };

    Some(FilteredImages {
        equalized,
        low_pass,
        high_pass,
        median,
        equalized_hist: report.equalized_hist,
    })
}

#[inline]
fn mean9(samples: &[u8; 9]) -> u8 {
    let sum: u16 = samples.iter().map(|&v| u16::from(v)).sum();
    (sum / 9) as u8
}

#[inline]
fn median9(mut samples: [u8; 9]) -> u8 {
    samples.sort_unstable();
    samples[4]
}

#[cfg(test)]
mod tests {
    use rl_core::{CaptureWindow, Lut, PixelBuffer, PixelFormat};
    use rl_hist::histogram_gray;

    use super::{FilterOutputs, SpatialFilter, filter_image, mean9, median9};

    fn spike_5x5() -> Vec<u8> {
        let mut data = vec![50u8; 25];
        data[12] = 200;
        data
    }

    #[test]
    fn kernels_on_a_single_spike() {
        let data = spike_5x5();
        let img = PixelBuffer::new(&data, 5, 5, PixelFormat::Gray8).expect("valid");
        let out = filter_image(&img, &Lut::identity()).expect("gray source");

        let at = |plane: &rl_core::Image<u8>, x: usize, y: usize| {
            *plane.as_view().get(x, y).expect("in bounds")
        };

        // (8 * 50 + 200) / 9 = 66
        assert_eq!(at(&out.low_pass, 2, 2), 66);
        assert_eq!(at(&out.low_pass, 1, 1), 66);
        // 4 * 200 - 4 * 50 saturates; 4 * 50 - 3 * 50 - 200 clamps to 0
        assert_eq!(at(&out.high_pass, 2, 2), 255);
        assert_eq!(at(&out.high_pass, 1, 2), 0);
        assert_eq!(at(&out.high_pass, 1, 1), 0);
        assert_eq!(at(&out.median, 2, 2), 50);

        assert_eq!(out.equalized.data(), data.as_slice());
    }

    #[test]
    fn border_ring_gets_no_filter_output() {
        let data = vec![120u8; 36];
        let img = PixelBuffer::new(&data, 6, 6, PixelFormat::Gray8).expect("valid");
        let out = filter_image(&img, &Lut::identity()).expect("gray source");

        let view = out.low_pass.as_view();
        for y in 0..6 {
            for x in 0..6 {
                let border = x == 0 || y == 0 || x == 5 || y == 5;
                let expected = if border { 0 } else { 120 };
                assert_eq!(view.get(x, y), Some(&expected), "({x}, {y})");
            }
        }
        assert!(out.equalized.data().iter().all(|&v| v == 120));
    }

    #[test]
    fn filters_read_equalized_samples() {
        let data = spike_5x5();
        let img = PixelBuffer::new(&data, 5, 5, PixelFormat::Gray8).expect("valid");
        let invert = Lut::from_fn(|v| 255 - v);
        let out = filter_image(&img, &invert).expect("gray source");

        // Inverted spike: center 55 surrounded by 205.
        assert_eq!(out.equalized.as_view().get(2, 2), Some(&55));
        assert_eq!(out.median.as_view().get(2, 2), Some(&205));
        assert_eq!(out.high_pass.as_view().get(2, 2), Some(&0));
        // Neighbor of the dip: 4 * 205 - 3 * 205 - 55 = 150
        assert_eq!(out.high_pass.as_view().get(1, 2), Some(&150));
    }

    #[test]
    fn median_stays_within_window_range() {
        let (w, h) = (17usize, 11usize);
        let data: Vec<u8> = (0..w * h)
            .map(|i| ((i * 7919 + 13) % 251) as u8)
            .collect();
        let img = PixelBuffer::new(&data, w, h, PixelFormat::Gray8).expect("valid");
        let out = filter_image(&img, &Lut::identity()).expect("gray source");

        let src = img.gray_view().expect("gray");
        let med = out.median.as_view();
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let mut lo = u8::MAX;
                let mut hi = u8::MIN;
                for dy in 0..3 {
                    for &v in &src.row(y + dy - 1)[x - 1..x + 2] {
                        lo = lo.min(v);
                        hi = hi.max(v);
                    }
                }
                let m = *med.get(x, y).expect("in bounds");
                assert!(lo <= m && m <= hi, "({x}, {y}): {m} not in [{lo}, {hi}]");
            }
        }
    }

    #[test]
    fn capture_window_matches_full_frame_slice() {
        let (w, h) = (7usize, 5usize);
        let data: Vec<u8> = (0..w * h).map(|i| ((i * 37) % 256) as u8).collect();
        let img = PixelBuffer::new(&data, w, h, PixelFormat::Gray8).expect("valid");
        let lut = Lut::from_fn(|v| v / 2 + 10);
        let full = filter_image(&img, &lut).expect("gray source");

        let window = CaptureWindow::new(9, 12);
        let mut eq = vec![0u8; 12];
        let mut lp = vec![0u8; 12];
        let mut hp = vec![0u8; 12];
        let mut md = vec![0u8; 12];
        let mut out = FilterOutputs {
            equalized: &mut eq,
            low_pass: &mut lp,
            high_pass: &mut hp,
            median: &mut md,
        };
        let report = SpatialFilter::new(w)
            .run(&img, &lut, window, &mut out)
            .expect("gray source");

        assert_eq!(report.filtered, (w - 2) * (h - 2));
        assert_eq!(eq.as_slice(), &full.equalized.data()[9..21]);
        assert_eq!(lp.as_slice(), &full.low_pass.data()[9..21]);
        assert_eq!(hp.as_slice(), &full.high_pass.data()[9..21]);
        assert_eq!(md.as_slice(), &full.median.data()[9..21]);
    }

    #[test]
    fn report_histogram_counts_equalized_pixels() {
        let data: Vec<u8> = (0..64u32).map(|i| (i % 5 * 40) as u8).collect();
        let img = PixelBuffer::new(&data, 8, 8, PixelFormat::Gray8).expect("valid");
        let lut = Lut::from_fn(|v| v.saturating_add(3));
        let out = filter_image(&img, &lut).expect("gray source");

        assert_eq!(out.equalized_hist, histogram_gray(out.equalized.data(), 8, 8));
        assert_eq!(out.equalized_hist.total(), 64);
    }

    #[test]
    fn mismatched_inputs_leave_outputs_untouched() {
        let packed = vec![0u8; 32];
        let rgb = PixelBuffer::new(&packed, 4, 4, PixelFormat::Rgb565).expect("valid");
        let gray_data = vec![9u8; 16];
        let gray = PixelBuffer::new(&gray_data, 4, 4, PixelFormat::Gray8).expect("valid");

        let mut eq = vec![1u8; 16];
        let mut lp = vec![1u8; 16];
        let mut hp = vec![1u8; 16];
        let mut md = vec![1u8; 16];
        let mut out = FilterOutputs {
            equalized: &mut eq,
            low_pass: &mut lp,
            high_pass: &mut hp,
            median: &mut md,
        };

        let lut = Lut::identity();
        let window = CaptureWindow::full(16);
        assert!(SpatialFilter::new(4).run(&rgb, &lut, window, &mut out).is_none());
        assert!(SpatialFilter::new(5).run(&gray, &lut, window, &mut out).is_none());
        assert!(eq.iter().chain(&lp).chain(&hp).chain(&md).all(|&v| v == 1));
    }

    #[test]
    fn thin_images_are_equalized_but_not_filtered() {
        let data = vec![5u8, 6, 7, 8];
        let img = PixelBuffer::new(&data, 2, 2, PixelFormat::Gray8).expect("valid");
        let out = filter_image(&img, &Lut::from_fn(|v| v.wrapping_mul(2))).expect("gray source");
        assert_eq!(out.equalized.data(), &[10, 12, 14, 16]);
        assert!(out.low_pass.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn kernel_helpers() {
        assert_eq!(mean9(&[1, 1, 1, 1, 1, 1, 1, 1, 2]), 1);
        assert_eq!(mean9(&[255; 9]), 255);
        assert_eq!(median9([9, 1, 8, 2, 7, 3, 6, 4, 5]), 5);
        assert_eq!(median9([0, 0, 0, 0, 255, 255, 255, 255, 255]), 255);
    }
}
