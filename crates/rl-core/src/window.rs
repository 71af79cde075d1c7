/// Linear pixel range `[offset, offset + capacity)` held by an output buffer.
///
/// Index `i` of the buffer corresponds to image pixel `offset + i`. Writes
/// for pixels outside the range are dropped by [`CaptureWindow::store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureWindow {
    pub offset: usize,
    pub capacity: usize,
}

impl CaptureWindow {
    pub const fn new(offset: usize, capacity: usize) -> Self {
        Self { offset, capacity }
    }

    /// Window covering a whole image of `total` pixels.
    pub const fn full(total: usize) -> Self {
        Self {
            offset: 0,
            capacity: total,
        }
    }

    /// Number of pixels the window actually covers in an image of `total`
    /// pixels: `min(capacity, total - offset)`.
    pub fn effective_len(&self, total: usize) -> usize {
        total.saturating_sub(self.offset).min(self.capacity)
    }

    /// Buffer position for a linear pixel index, if inside the window.
    #[inline]
    pub fn position(&self, linear_idx: usize) -> Option<usize> {
        let pos = linear_idx.checked_sub(self.offset)?;
        (pos < self.capacity).then_some(pos)
    }

    /// Writes `value` for pixel `linear_idx`. Returns `false` when the pixel
    /// is outside the window or past the end of `buf`.
    #[inline]
    pub fn store(&self, buf: &mut [u8], linear_idx: usize, value: u8) -> bool {
        match self.position(linear_idx).and_then(|pos| buf.get_mut(pos)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// The slice of a one-byte-per-pixel source that the window covers.
    pub fn source_slice<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        let start = self.offset.min(data.len());
        let len = self.effective_len(data.len());
        &data[start..start + len]
    }
}
