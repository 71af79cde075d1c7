use log::debug;
use rl_core::{PixelBufferMut, PixelFormat, luma_u8, unpack_rgb565};

/// Binarizes an image in place against `level`, typically an Otsu threshold.
///
/// - `Gray8`: `v > level` becomes 255, everything else 0.
/// - `Rgb565`: each pixel is reduced to integer luma; `luma <= level`
///   becomes `0x0000` (black), everything else `0xFFFF` (white).
///
/// Returns the number of foreground pixels.
pub fn binarize_in_place(img: &mut PixelBufferMut<'_>, level: u8) -> usize {
    let format = img.format();
    let data = img.data_mut();
    let mut foreground = 0usize;

    match format {
        PixelFormat::Gray8 => {
            for px in data.iter_mut() {
                let on = *px > level;
                foreground += usize::from(on);
                *px = if on { 255 } else { 0 };
            }
        }
        PixelFormat::Rgb565 => {
            for pair in data.chunks_exact_mut(2) {
                let word = u16::from_le_bytes([pair[0], pair[1]]);
                let on = luma_u8(unpack_rgb565(word)) > level;
                foreground += usize::from(on);
                let out: u16 = if on { 0xFFFF } else { 0x0000 };
                pair.copy_from_slice(&out.to_le_bytes());
            }
        }
    }

    debug!("binarize: level={level} format={format:?} foreground={foreground}");
    foreground
}

#[cfg(test)]
mod tests {
    use rl_core::{PixelBufferMut, PixelFormat, pack_rgb565};

    use super::binarize_in_place;

    #[test]
    fn gray_uses_strict_comparison() {
        let mut data = vec![0u8, 99, 100, 101, 255, 100];
        let mut img = PixelBufferMut::new(&mut data, 3, 2, PixelFormat::Gray8).expect("valid");
        let fg = binarize_in_place(&mut img, 100);
        assert_eq!(fg, 2);
        assert_eq!(data, vec![0, 0, 0, 255, 255, 0]);
    }

    #[test]
    fn rgb565_uses_luma_and_writes_black_or_white_words() {
        let dark = pack_rgb565([20, 20, 20]).to_le_bytes();
        let bright = pack_rgb565([230, 230, 230]).to_le_bytes();
        let mut data = vec![dark[0], dark[1], bright[0], bright[1]];

        let mut img = PixelBufferMut::new(&mut data, 2, 1, PixelFormat::Rgb565).expect("valid");
        let fg = binarize_in_place(&mut img, 128);
        assert_eq!(fg, 1);
        assert_eq!(data, vec![0x00, 0x00, 0xFF, 0xFF]);
    }
}
