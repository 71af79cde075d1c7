use log::warn;
use rl_core::Lut;

use crate::Histogram;

/// Builds the histogram-equalization table for an image of `total` pixels.
///
/// `cdf_min` is the cumulative count at the first non-empty bin, and level
/// `i` maps to `(cdf(i) - cdf_min) * 255 / (total - cdf_min)`, clamped to
/// `[0, 255]`. When `total == cdf_min` (single-intensity or empty image)
/// every level maps to 0. The table is non-decreasing.
pub fn equalization_lut(hist: &Histogram, total: u64) -> Lut {
    let cdf_min = hist
        .bins()
        .iter()
        .copied()
        .find(|&c| c != 0)
        .map_or(0, u64::from);

    let denom = total.saturating_sub(cdf_min);
    if denom == 0 {
        warn!("equalization: degenerate histogram (total={total}, cdf_min={cdf_min})");
        return Lut::from_table([0; 256]);
    }

    let mut table = [0u8; 256];
    let mut cumulative = 0u64;
    for (slot, &count) in table.iter_mut().zip(hist.bins()) {
        cumulative += u64::from(count);
        let v = cumulative.saturating_sub(cdf_min) * 255 / denom;
        *slot = v.min(255) as u8;
    }

    Lut::from_table(table)
}

#[cfg(test)]
mod tests {
    use super::equalization_lut;
    use crate::{Histogram, histogram_gray};

    #[test]
    fn two_level_image_stretches_to_full_range() {
        let mut data = vec![100u8; 16];
        data[15] = 200;
        let hist = histogram_gray(&data, 4, 4);
        let lut = equalization_lut(&hist, 16);

        assert_eq!(lut.map(100), 0);
        assert_eq!(lut.map(200), 255);
        assert_eq!(lut.map(0), 0);
        assert_eq!(lut.map(150), 0);
        assert_eq!(lut.map(255), 255);
    }

    #[test]
    fn uniform_histogram_gives_identity() {
        let data: Vec<u8> = (0..=255u8).collect();
        let lut = equalization_lut(&histogram_gray(&data, 16, 16), 256);
        for v in 0..=255u8 {
            assert_eq!(lut.map(v), v);
        }
    }

    #[test]
    fn single_intensity_maps_everything_to_zero() {
        let data = vec![77u8; 64];
        let lut = equalization_lut(&histogram_gray(&data, 8, 8), 64);
        assert!(lut.table().iter().all(|&v| v == 0));

        let empty = equalization_lut(&Histogram::new(), 0);
        assert!(empty.table().iter().all(|&v| v == 0));
    }

    #[test]
    fn table_is_non_decreasing_for_skewed_input() {
        let data: Vec<u8> = (0..4096u32)
            .map(|i| ((i * i) % 97 + (i % 13) * 11) as u8)
            .collect();
        let lut = equalization_lut(&histogram_gray(&data, 64, 64), 4096);
        assert!(lut.is_monotonic());
        assert_eq!(*lut.table().iter().max().expect("non-empty"), 255);
    }
}
