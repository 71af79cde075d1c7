use crate::Error;

/// Pixel storage layout of a [`PixelBuffer`](crate::PixelBuffer).
///
/// The numeric code of each variant is its size in bytes, which is also how
/// formats are named on the wire by callers that hold a raw format byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Gray8,
    Rgb565,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb565 => 2,
        }
    }
}

impl TryFrom<u8> for PixelFormat {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Gray8),
            2 => Ok(Self::Rgb565),
            other => Err(Error::UnsupportedFormat(other)),
        }
    }
}

/// Splits an RGB565 word into 8-bit channels using rounded linear scaling.
#[inline]
pub fn unpack_rgb565(word: u16) -> [u8; 3] {
    let r5 = u32::from((word >> 11) & 0x1F);
    let g6 = u32::from((word >> 5) & 0x3F);
    let b5 = u32::from(word & 0x1F);

    [
        ((r5 * 255 + 15) / 31) as u8,
        ((g6 * 255 + 31) / 63) as u8,
        ((b5 * 255 + 15) / 31) as u8,
    ]
}

/// Quantizes 8-bit channels to an RGB565 word (round to nearest level).
#[inline]
pub fn pack_rgb565(rgb: [u8; 3]) -> u16 {
    let r5 = (u32::from(rgb[0]) * 31 + 127) / 255;
    let g6 = (u32::from(rgb[1]) * 63 + 127) / 255;
    let b5 = (u32::from(rgb[2]) * 31 + 127) / 255;
    ((r5 << 11) | (g6 << 5) | b5) as u16
}

/// Integer luma approximation `(30 r + 59 g + 11 b) / 100`, truncated.
#[inline]
pub fn luma_u8(rgb: [u8; 3]) -> u8 {
    let sum = 30 * u32::from(rgb[0]) + 59 * u32::from(rgb[1]) + 11 * u32::from(rgb[2]);
    (sum / 100) as u8
}
