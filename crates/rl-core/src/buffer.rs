use crate::{Error, ImageView, ImageViewMut, PixelFormat};

fn checked_size(
    width: usize,
    height: usize,
    format: PixelFormat,
    actual: usize,
) -> Result<usize, Error> {
    if width == 0 || height == 0 {
        return Err(Error::ZeroDimension { width, height });
    }

    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
        .ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual,
        })
}

/// Read-only image handle over caller-owned bytes.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    format: PixelFormat,
}

impl<'a> PixelBuffer<'a> {
    /// Wraps `data` after checking that it holds exactly
    /// `bytes_per_pixel * width * height` bytes.
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self, Error> {
        let size = checked_size(width, height, format, data.len())?;
        if data.len() != size {
            return Err(Error::SizeMismatch {
                expected: size,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Size of the backing buffer in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn same_shape(&self, other: &PixelBuffer<'_>) -> bool {
        self.width == other.width && self.height == other.height && self.format == other.format
    }

    /// Grayscale plane view, or `None` for packed color formats.
    pub fn gray_view(&self) -> Option<ImageView<'a, u8>> {
        match self.format {
            PixelFormat::Gray8 => {
                ImageView::from_slice(self.width, self.height, self.width, self.data).ok()
            }
            PixelFormat::Rgb565 => None,
        }
    }

    /// Iterates the little-endian RGB565 words of a packed color buffer.
    /// Yields nothing for grayscale buffers.
    pub fn rgb565_words(&self) -> impl Iterator<Item = u16> + 'a {
        let data: &'a [u8] = match self.format {
            PixelFormat::Rgb565 => self.data,
            PixelFormat::Gray8 => &[],
        };
        data.chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
    }
}

/// Writable image handle over caller-owned bytes.
#[derive(Debug)]
pub struct PixelBufferMut<'a> {
    data: &'a mut [u8],
    width: usize,
    height: usize,
    format: PixelFormat,
}

impl<'a> PixelBufferMut<'a> {
    pub fn new(
        data: &'a mut [u8],
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self, Error> {
        let size = checked_size(width, height, format, data.len())?;
        if data.len() != size {
            return Err(Error::SizeMismatch {
                expected: size,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn data(&self) -> &[u8] {
        self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data
    }

    pub fn as_buffer(&self) -> PixelBuffer<'_> {
        PixelBuffer {
            data: self.data,
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }

    pub fn gray_view_mut(&mut self) -> Option<ImageViewMut<'_, u8>> {
        match self.format {
            PixelFormat::Gray8 => {
                ImageViewMut::from_slice_mut(self.width, self.height, self.width, self.data).ok()
            }
            PixelFormat::Rgb565 => None,
        }
    }
}
