use log::warn;
use rl_core::{Image, ImageView, ImageViewMut};

#[inline]
fn dst_dims(src_w: usize, src_h: usize, factor: usize) -> (usize, usize) {
    if factor == 0 {
        return (0, 0);
    }
    (src_w / factor, src_h / factor)
}

/// Averages non-overlapping `factor x factor` blocks (floor of the mean).
///
/// Trailing rows and columns that do not fill a whole block are dropped.
/// `factor == 0` yields an empty image.
pub fn downsample_block_mean_u8(src: &ImageView<'_, u8>, factor: usize) -> Image<u8> {
    let (dst_w, dst_h) = dst_dims(src.width(), src.height(), factor);
    let mut dst = Image::new_fill(dst_w, dst_h, 0u8);
    downsample_block_mean_u8_into(src, &mut dst.as_view_mut(), factor);
    dst
}

/// Writes the block-mean reduction of `src` into `dst`.
///
/// Returns `false` and leaves `dst` untouched when its dimensions are not
/// `(src.width() / factor, src.height() / factor)`. A factor larger than
/// either side leaves no whole block, so only an empty `dst` matches.
pub fn downsample_block_mean_u8_into(
    src: &ImageView<'_, u8>,
    dst: &mut ImageViewMut<'_, u8>,
    factor: usize,
) -> bool {
    let (dst_w, dst_h) = dst_dims(src.width(), src.height(), factor);
    if dst.width() != dst_w || dst.height() != dst_h {
        warn!(
            "downsample: destination {}x{} does not match {dst_w}x{dst_h} for factor {factor}",
            dst.width(),
            dst.height()
        );
        return false;
    }
    if dst_w == 0 || dst_h == 0 {
        return true;
    }

    // factor <= min(width, height) here, so the block area fits in u64.
    let area = factor as u64 * factor as u64;
    for y in 0..dst_h {
        let out_row = dst.row_mut(y);
        for (x, out) in out_row.iter_mut().enumerate() {
            let mut sum = 0u64;
            for dy in 0..factor {
                let row = src.row(y * factor + dy);
                sum += row[x * factor..(x + 1) * factor]
                    .iter()
                    .map(|&v| u64::from(v))
                    .sum::<u64>();
            }
            *out = (sum / area) as u8;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use rl_core::{Image, ImageView};

    use super::{downsample_block_mean_u8, downsample_block_mean_u8_into};

    #[test]
    fn two_by_two_blocks_floor_the_mean() {
        let src = Image::from_vec(
            4,
            2,
            vec![
                0u8, 1, 10, 10, //
                2, 4, 10, 11, //
            ],
        )
        .expect("valid image");

        let dst = downsample_block_mean_u8(&src.as_view(), 2);
        assert_eq!(dst.width(), 2);
        assert_eq!(dst.height(), 1);
        assert_eq!(dst.data(), &[1, 10]);
    }

    #[test]
    fn four_x_reduction_drops_partial_blocks() {
        let src = Image::from_vec(9, 5, (0..45).map(|i| i as u8).collect()).expect("valid");
        let dst = downsample_block_mean_u8(&src.as_view(), 4);

        assert_eq!((dst.width(), dst.height()), (2, 1));
        // block 0: rows 0..4, cols 0..4 -> mean of {0..3, 9..12, 18..21, 27..30} = 15
        assert_eq!(dst.data(), &[15, 19]);
    }

    #[test]
    fn non_contiguous_source_view() {
        #[rustfmt::skip]
        let data = [
            2u8, 4, 99,
            6, 8,
        ];
        let padded = ImageView::from_slice(2, 2, 3, &data).expect("valid view");

        let dst = downsample_block_mean_u8(&padded, 2);
        assert_eq!(dst.data(), &[5]);
    }

    #[test]
    fn zero_factor_and_wrong_destination() {
        let src = Image::new_fill(4, 4, 7u8);
        let empty = downsample_block_mean_u8(&src.as_view(), 0);
        assert!(empty.data().is_empty());

        let mut dst = Image::new_fill(3, 3, 1u8);
        assert!(!downsample_block_mean_u8_into(&src.as_view(), &mut dst.as_view_mut(), 2));
        assert!(dst.data().iter().all(|&v| v == 1));
    }

    #[test]
    fn factor_beyond_the_image_gives_an_empty_result() {
        let src = Image::new_fill(4, 4, 7u8);
        for factor in [5usize, 1 << 20, usize::MAX / 2 + 1, usize::MAX] {
            let dst = downsample_block_mean_u8(&src.as_view(), factor);
            assert_eq!((dst.width(), dst.height()), (0, 0), "factor {factor}");
            assert!(dst.data().is_empty());
        }

        let mut empty = Image::new_fill(0, 0, 0u8);
        assert!(downsample_block_mean_u8_into(
            &src.as_view(),
            &mut empty.as_view_mut(),
            usize::MAX
        ));
    }

    #[test]
    fn factor_equal_to_the_side_averages_everything() {
        let src = Image::from_vec(3, 3, vec![1u8, 2, 3, 4, 5, 6, 7, 8, 10]).expect("valid");
        let dst = downsample_block_mean_u8(&src.as_view(), 3);
        // 46 / 9 = 5
        assert_eq!(dst.data(), &[5]);
    }
}
