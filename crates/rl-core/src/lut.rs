use core::ops::Index;

/// 256-entry byte-to-byte lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lut([u8; 256]);

impl Lut {
    pub fn identity() -> Self {
        Self::from_fn(|v| v)
    }

    pub fn from_table(table: [u8; 256]) -> Self {
        Self(table)
    }

    pub fn from_fn(mut f: impl FnMut(u8) -> u8) -> Self {
        let mut table = [0u8; 256];
        for (v, slot) in table.iter_mut().enumerate() {
            *slot = f(v as u8);
        }
        Self(table)
    }

    #[inline]
    pub fn map(&self, v: u8) -> u8 {
        self.0[v as usize]
    }

    pub fn table(&self) -> &[u8; 256] {
        &self.0
    }

    /// `true` when `lut[i] <= lut[i + 1]` for every level.
    pub fn is_monotonic(&self) -> bool {
        self.0.windows(2).all(|w| w[0] <= w[1])
    }
}

impl Default for Lut {
    fn default() -> Self {
        Self::identity()
    }
}

impl Index<u8> for Lut {
    type Output = u8;

    fn index(&self, v: u8) -> &u8 {
        &self.0[v as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::Lut;

    #[test]
    fn identity_maps_every_level_to_itself() {
        let lut = Lut::default();
        for v in 0..=255u8 {
            assert_eq!(lut.map(v), v);
            assert_eq!(lut[v], v);
        }
        assert!(lut.is_monotonic());
    }

    #[test]
    fn monotonic_check_detects_a_drop() {
        let lut = Lut::from_fn(|v| if v == 200 { 0 } else { v });
        assert!(!lut.is_monotonic());
    }
}
