use rl_core::{PixelBuffer, PixelFormat, unpack_rgb565};

/// 256-bin intensity histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u32; 256],
}

impl Histogram {
    pub fn new() -> Self {
        Self { bins: [0; 256] }
    }

    #[inline]
    pub fn add(&mut self, level: u8) {
        self.bins[level as usize] += 1;
    }

    pub fn bins(&self) -> &[u32; 256] {
        &self.bins
    }

    pub fn count(&self, level: u8) -> u32 {
        self.bins[level as usize]
    }

    /// Sum of all bins.
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|&c| u64::from(c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.iter().all(|&c| c == 0)
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RgbHistograms {
    pub r: Histogram,
    pub g: Histogram,
    pub b: Histogram,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageHistogram {
    Gray(Histogram),
    Rgb565(RgbHistograms),
}

/// Counts the first `width * height` bytes of `data`.
///
/// Zero dimensions or an empty buffer produce an all-zero histogram, which
/// callers must treat as "no data".
pub fn histogram_gray(data: &[u8], width: usize, height: usize) -> Histogram {
    let mut hist = Histogram::new();
    let n = width.saturating_mul(height).min(data.len());
    for &v in &data[..n] {
        hist.add(v);
    }
    hist
}

/// Counts upscaled R, G and B levels of the first `width * height`
/// little-endian RGB565 words of `data`.
pub fn histograms_rgb565(data: &[u8], width: usize, height: usize) -> RgbHistograms {
    let mut hists = RgbHistograms::default();
    let n = width.saturating_mul(height).min(data.len() / 2);
    for pair in data[..2 * n].chunks_exact(2) {
        let [r, g, b] = unpack_rgb565(u16::from_le_bytes([pair[0], pair[1]]));
        hists.r.add(r);
        hists.g.add(g);
        hists.b.add(b);
    }
    hists
}

pub fn compute_histogram(img: &PixelBuffer<'_>) -> ImageHistogram {
    match img.format() {
        PixelFormat::Gray8 => {
            ImageHistogram::Gray(histogram_gray(img.data(), img.width(), img.height()))
        }
        PixelFormat::Rgb565 => {
            ImageHistogram::Rgb565(histograms_rgb565(img.data(), img.width(), img.height()))
        }
    }
}
