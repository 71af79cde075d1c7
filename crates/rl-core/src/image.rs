use crate::Error;

/// Owned, tightly packed image plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    /// Takes ownership of `data`, which must hold exactly `width * height`
    /// elements.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, Error> {
        let expected = plane_len(width, height, width, data.len())?;
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn as_view(&self) -> ImageView<'_, T> {
        ImageView {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &self.data,
        }
    }

    pub fn as_view_mut(&mut self) -> ImageViewMut<'_, T> {
        ImageViewMut {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &mut self.data,
        }
    }
}

impl<T: Clone> Image<T> {
    /// Allocates a `width x height` plane filled with `value`.
    ///
    /// Dimensions whose product overflows `usize` produce an empty image.
    pub fn new_fill(width: usize, height: usize, value: T) -> Self {
        match width.checked_mul(height) {
            Some(len) => Self {
                width,
                height,
                data: vec![value; len],
            },
            None => Self {
                width: 0,
                height: 0,
                data: Vec::new(),
            },
        }
    }
}

/// Read-only plane over borrowed elements; rows start `stride` elements
/// apart and only the first `width` of each row belong to the image.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a [T],
}

impl<'a, T> ImageView<'a, T> {
    pub fn from_slice(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a [T],
    ) -> Result<Self, Error> {
        plane_len(width, height, stride, data.len())?;
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row(&self, y: usize) -> &'a [T] {
        assert!(y < self.height, "row {y} outside a plane of height {}", self.height);
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    /// Neighborhood lookup with signed offsets; anything outside the plane
    /// is `None`.
    pub fn get_signed(&self, x: isize, y: isize) -> Option<&'a T> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.get(x, y)
    }
}

/// Writable counterpart of [`ImageView`].
#[derive(Debug)]
pub struct ImageViewMut<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a mut [T],
}

impl<'a, T> ImageViewMut<'a, T> {
    pub fn from_slice_mut(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a mut [T],
    ) -> Result<Self, Error> {
        plane_len(width, height, stride, data.len())?;
        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height, "row {y} outside a plane of height {}", self.height);
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }
}

// Elements a strided plane spans: every full row but the last, plus one
// `width`. Fails when the stride is short, the size overflows, or `available`
// is too small.
fn plane_len(width: usize, height: usize, stride: usize, available: usize) -> Result<usize, Error> {
    if stride < width {
        return Err(Error::InvalidStride);
    }
    if width == 0 || height == 0 {
        return Ok(0);
    }

    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|n| n.checked_add(width))
        .ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: available,
        })?;
    if available < needed {
        return Err(Error::SizeMismatch {
            expected: needed,
            actual: available,
        });
    }
    Ok(needed)
}
