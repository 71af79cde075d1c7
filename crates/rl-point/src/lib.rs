//! Stateless per-pixel intensity maps.
//!
//! Every map reads `src` and writes `dst` element by element and processes
//! `min(src.len(), dst.len())` bytes. To transform part of an image, pass the
//! slice returned by [`CaptureWindow::source_slice`](rl_core::CaptureWindow::source_slice).
//!
//! Table-driven maps (gamma, piecewise-linear) build a 256-entry [`Lut`] on
//! the stack and apply it with one lookup per pixel.

mod binarize;

pub use binarize::binarize_in_place;

use rl_core::Lut;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdParams {
    pub level: u8,
    pub low: u8,
    pub high: u8,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            level: 128,
            low: 0,
            high: 255,
        }
    }
}

/// Two-segment linear stretch split at `split`.
///
/// `[0, split]` maps onto `[0, low_max]` and `(split, 255]` onto
/// `(high_min, 255]`. The segments do not have to meet at `split`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiecewiseParams {
    pub split: u8,
    pub low_max: u8,
    pub high_min: u8,
}

impl Default for PiecewiseParams {
    fn default() -> Self {
        Self {
            split: 128,
            low_max: 100,
            high_min: 180,
        }
    }
}

pub fn negative_into(src: &[u8], dst: &mut [u8]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = 255 - s;
    }
}

/// `dst = src >= level ? high : low`.
pub fn threshold_into(src: &[u8], dst: &mut [u8], params: &ThresholdParams) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = if s >= params.level {
            params.high
        } else {
            params.low
        };
    }
}

pub fn apply_lut_into(src: &[u8], dst: &mut [u8], lut: &Lut) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = lut.map(s);
    }
}

/// `lut[v] = round(255 * (v / 255)^gamma)`, clamped to `[0, 255]`.
pub fn gamma_lut(gamma: f32) -> Lut {
    Lut::from_fn(|v| {
        let x = v as f32 / 255.0;
        round_to_u8(x.powf(gamma) * 255.0)
    })
}

pub fn gamma_into(src: &[u8], dst: &mut [u8], gamma: f32) {
    apply_lut_into(src, dst, &gamma_lut(gamma));
}

pub fn piecewise_linear_lut(params: &PiecewiseParams) -> Lut {
    let split = params.split as f32;
    let k1 = if params.split == 0 {
        0.0
    } else {
        params.low_max as f32 / split
    };
    let k2 = if params.split == 255 {
        0.0
    } else {
        (255.0 - params.high_min as f32) / (255.0 - split)
    };

    Lut::from_fn(|x| {
        if x <= params.split {
            round_to_u8(k1 * x as f32)
        } else {
            round_to_u8(params.high_min as f32 + k2 * (x - params.split) as f32)
        }
    })
}

pub fn piecewise_linear_into(src: &[u8], dst: &mut [u8], params: &PiecewiseParams) {
    apply_lut_into(src, dst, &piecewise_linear_lut(params));
}

// Half-away-from-zero rounding, then saturation. NaN maps to 0.
#[inline]
fn round_to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use rl_core::CaptureWindow;

    use super::*;

    fn all_levels() -> Vec<u8> {
        (0..=255u8).collect()
    }

    #[test]
    fn negative_is_an_involution() {
        let src = all_levels();
        let mut once = vec![0u8; 256];
        let mut twice = vec![0u8; 256];
        negative_into(&src, &mut once);
        negative_into(&once, &mut twice);

        assert_eq!(once[0], 255);
        assert_eq!(once[255], 0);
        assert_eq!(once[100], 155);
        assert_eq!(twice, src);
    }

    #[test]
    fn threshold_uses_inclusive_level_and_custom_values() {
        let src = [0u8, 127, 128, 255];
        let mut dst = [9u8; 4];
        threshold_into(&src, &mut dst, &ThresholdParams::default());
        assert_eq!(dst, [0, 0, 255, 255]);

        let params = ThresholdParams {
            level: 255,
            low: 10,
            high: 20,
        };
        threshold_into(&src, &mut dst, &params);
        assert_eq!(dst, [10, 10, 10, 20]);
    }

    #[test]
    fn gamma_one_is_identity_within_rounding() {
        let lut = gamma_lut(1.0);
        for v in 0..=255u8 {
            assert!(lut.map(v).abs_diff(v) <= 1, "level {v} -> {}", lut.map(v));
        }
    }

    #[test]
    fn gamma_tables_are_monotonic_with_fixed_endpoints() {
        for gamma in [3.0f32, 1.0 / 3.0, 0.5, 2.2] {
            let lut = gamma_lut(gamma);
            assert!(lut.is_monotonic(), "gamma {gamma}");
            assert_eq!(lut.map(0), 0);
            assert_eq!(lut.map(255), 255);
        }

        let dark = gamma_lut(3.0);
        assert_eq!(dark.map(64), 4);
        assert_eq!(dark.map(128), 32);
        assert_eq!(dark.map(200), 123);

        let bright = gamma_lut(1.0 / 3.0);
        assert_eq!(bright.map(1), 40);
        assert_eq!(bright.map(128), 203);
        assert_eq!(bright.map(200), 235);
    }

    #[test]
    fn piecewise_linear_reference_points() {
        let params = PiecewiseParams {
            split: 128,
            low_max: 100,
            high_min: 180,
        };
        let src = [0u8, 64, 128, 192, 255];
        let mut dst = [0u8; 5];
        piecewise_linear_into(&src, &mut dst, &params);
        // 192 -> 180 + 75 / 127 * 64 = 217.8
        assert_eq!(dst, [0, 50, 100, 218, 255]);
    }

    #[test]
    fn piecewise_linear_jumps_at_split() {
        let lut = piecewise_linear_lut(&PiecewiseParams::default());
        assert_eq!(lut.map(128), 100);
        assert_eq!(lut.map(129), 181);
    }

    #[test]
    fn piecewise_linear_degenerate_splits() {
        let zero = piecewise_linear_lut(&PiecewiseParams {
            split: 0,
            low_max: 100,
            high_min: 180,
        });
        assert_eq!(zero.map(0), 0);
        assert_eq!(zero.map(1), 180);
        assert_eq!(zero.map(255), 255);

        let full = piecewise_linear_lut(&PiecewiseParams {
            split: 255,
            low_max: 100,
            high_min: 180,
        });
        assert_eq!(full.map(255), 100);
        assert!(full.is_monotonic());
    }

    #[test]
    fn maps_run_over_capture_window_slice() {
        let image: Vec<u8> = (0..20).collect();
        let window = CaptureWindow::new(15, 8);
        let src = window.source_slice(&image);
        let mut dst = vec![0u8; window.capacity];

        negative_into(src, &mut dst);
        assert_eq!(&dst[..5], &[240, 239, 238, 237, 236]);
        assert_eq!(&dst[5..], &[0, 0, 0]);
    }
}
