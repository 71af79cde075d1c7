/// Rolling cache of three image rows, slot `y mod 3` holding row `y`.
#[derive(Debug, Clone)]
pub struct RowWindow {
    width: usize,
    rows: Vec<u8>,
}

impl RowWindow {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            rows: vec![0; 3 * width],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Slot that row `y` is written into.
    pub fn slot_mut(&mut self, y: usize) -> &mut [u8] {
        let start = (y % 3) * self.width;
        &mut self.rows[start..start + self.width]
    }

    pub fn slot(&self, y: usize) -> &[u8] {
        let start = (y % 3) * self.width;
        &self.rows[start..start + self.width]
    }

    /// Rows `y - 2`, `y - 1` and `y`, valid once row `y >= 2` is cached.
    pub fn rows(&self, y: usize) -> (&[u8], &[u8], &[u8]) {
        debug_assert!(y >= 2, "rolling window needs three cached rows");
        (self.slot(y - 2), self.slot(y - 1), self.slot(y))
    }
}
