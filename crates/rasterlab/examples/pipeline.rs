//! Example: equalize, filter, threshold and clean one grayscale image.
//!
//! Loads a PNG as 8-bit luma (or builds a synthetic two-level pattern when
//! no input is given), equalizes it, runs the single-pass spatial filter,
//! binarizes at the Otsu threshold of the equalized image and removes specks
//! with a 3x3 opening. A JSON summary is written next to the input.
//!
//! Run from the workspace root:
//!   cargo run -p rasterlab --example pipeline -- --help
//!   cargo run -p rasterlab --example pipeline -- --input data/scene.png

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use image::ImageReader;
use rasterlab::{
    PixelBuffer, PixelBufferMut, PixelFormat, binarize_in_place, equalization_lut, filter_image,
    histogram_gray, open3x3_into, otsu_threshold,
};
use serde::Serialize;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Equalize, filter and binarize a grayscale image")]
struct Args {
    /// Input PNG; a synthetic pattern is used when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// Synthetic pattern width
    #[arg(long, default_value_t = 128)]
    width: usize,

    /// Synthetic pattern height
    #[arg(long, default_value_t = 96)]
    height: usize,

    /// Output JSON path (default: <input stem>_pipeline.json, or
    /// pipeline.json for the synthetic pattern)
    #[arg(long)]
    out: Option<PathBuf>,
}

// ── JSON DTOs ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StageMs {
    histogram: f64,
    filter: f64,
    threshold: f64,
    open: f64,
}

#[derive(Serialize)]
struct Summary {
    width: usize,
    height: usize,
    otsu_threshold: u8,
    foreground: usize,
    foreground_after_open: usize,
    filtered_pixels: usize,
    elapsed_ms: StageMs,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Bright rectangle on a dark ramp, with a sprinkle of isolated bright specks.
fn synthetic(width: usize, height: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let inside = (width / 4..3 * width / 4).contains(&x)
                && (height / 4..3 * height / 4).contains(&y);
            let speck = (x * 7 + y * 13) % 97 == 0;
            let v = if inside || speck {
                200
            } else {
                30 + (x * 40 / width.max(1)) as u8
            };
            data.push(v);
        }
    }
    data
}

fn load_luma(path: &Path) -> Result<(Vec<u8>, usize, usize)> {
    let gray = ImageReader::open(path)
        .with_context(|| format!("opening {}", path.display()))?
        .decode()
        .with_context(|| format!("decoding {}", path.display()))?
        .into_luma8();
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    Ok((gray.into_raw(), w, h))
}

fn ms_since(t: Instant) -> f64 {
    t.elapsed().as_secs_f64() * 1e3
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (data, width, height) = match &args.input {
        Some(path) => load_luma(path)?,
        None => {
            if args.width == 0 || args.height == 0 {
                bail!("synthetic pattern needs non-zero dimensions");
            }
            (synthetic(args.width, args.height), args.width, args.height)
        }
    };
    let out_path = args.out.clone().unwrap_or_else(|| match &args.input {
        Some(p) => {
            let stem = p.file_stem().unwrap_or_default().to_string_lossy();
            let dir = p.parent().unwrap_or(Path::new("."));
            dir.join(format!("{stem}_pipeline.json"))
        }
        None => PathBuf::from("pipeline.json"),
    });

    println!("source: {width}x{height}");
    let src = PixelBuffer::new(&data, width, height, PixelFormat::Gray8)
        .context("wrapping source pixels")?;

    let t0 = Instant::now();
    let hist = histogram_gray(&data, width, height);
    let lut = equalization_lut(&hist, hist.total());
    let histogram_ms = ms_since(t0);

    let t0 = Instant::now();
    let filtered = filter_image(&src, &lut).context("spatial filter rejected the source")?;
    let filter_ms = ms_since(t0);
    let filtered_pixels = width.saturating_sub(2) * height.saturating_sub(2);

    let t0 = Instant::now();
    let mut binary = filtered.equalized.into_vec();
    let eq_buf = PixelBuffer::new(&binary, width, height, PixelFormat::Gray8)
        .context("wrapping equalized pixels")?;
    let level = otsu_threshold(&eq_buf);
    let mut handle = PixelBufferMut::new(&mut binary, width, height, PixelFormat::Gray8)
        .context("wrapping binarization target")?;
    let foreground = binarize_in_place(&mut handle, level);
    let threshold_ms = ms_since(t0);

    let t0 = Instant::now();
    let mut opened = vec![0u8; width * height];
    let mut scratch = vec![0u8; width * height];
    let bin_buf = PixelBuffer::new(&binary, width, height, PixelFormat::Gray8)
        .context("wrapping binary pixels")?;
    let mut dst = PixelBufferMut::new(&mut opened, width, height, PixelFormat::Gray8)
        .context("wrapping opening target")?;
    if !open3x3_into(&bin_buf, &mut dst, &mut scratch) {
        bail!("opening rejected its buffers");
    }
    let foreground_after_open = opened.iter().filter(|&&v| v == 255).count();
    let open_ms = ms_since(t0);

    println!("otsu threshold: {level}");
    println!("foreground: {foreground} -> {foreground_after_open} after opening");

    let summary = Summary {
        width,
        height,
        otsu_threshold: level,
        foreground,
        foreground_after_open,
        filtered_pixels,
        elapsed_ms: StageMs {
            histogram: histogram_ms,
            filter: filter_ms,
            threshold: threshold_ms,
            open: open_ms,
        },
    };

    let out_file = std::fs::File::create(&out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;
    serde_json::to_writer_pretty(out_file, &summary)
        .with_context(|| format!("writing JSON to {}", out_path.display()))?;

    println!("summary written to {}", out_path.display());
    Ok(())
}
