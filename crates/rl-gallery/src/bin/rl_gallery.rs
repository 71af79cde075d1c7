use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::GrayImage;
use log::info;
use rasterlab::{
    CaptureWindow, FilterOutputs, Histogram, ImageHistogram, ImageView, PiecewiseParams,
    PixelBuffer, PixelBufferMut, PixelFormat, SpatialFilter, ThresholdParams, binarize_in_place,
    close3x3_into, compute_histogram, downsample_block_mean_u8, equalization_lut, gamma_into,
    histogram_gray, luma_u8, negative_into, open3x3_into, otsu_from_histogram, otsu_threshold,
    pack_rgb565, piecewise_linear_into, threshold_into, unpack_rgb565,
};
use serde::{Deserialize, Serialize};

const DUMP_PIXELS: usize = 20;

#[derive(Parser, Debug)]
#[command(name = "rl_gallery")]
#[command(about = "Run rasterlab transforms on PNG fixtures or a synthetic pattern")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Negative, threshold, gamma and piecewise-linear over the capture window
    #[command(name = "point")]
    Point(RunArgs),
    /// Histogram equalization and the single-pass low/high/median filter
    #[command(name = "filter")]
    Filter(RunArgs),
    /// Otsu threshold, binarization, opening and closing
    #[command(name = "otsu")]
    Otsu(RunArgs),
    /// Every stage above on the same source
    #[command(name = "all")]
    All(RunArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    /// Source PNG; a synthetic pattern is used when omitted
    #[arg(long)]
    input: Option<PathBuf>,
    /// Pipeline config JSON; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "out")]
    out: PathBuf,
    #[arg(long, value_enum)]
    format: Option<FormatName>,
    /// Block-mean downsample factor applied after loading
    #[arg(long)]
    downsample: Option<usize>,
    #[arg(long)]
    offset: Option<usize>,
    #[arg(long)]
    capacity: Option<usize>,
    #[arg(long)]
    threshold: Option<u8>,
    /// Gamma exponents, one output each (repeat the flag)
    #[arg(long)]
    gamma: Vec<f32>,
    #[arg(long)]
    split: Option<u8>,
    #[arg(long)]
    low_max: Option<u8>,
    #[arg(long)]
    high_min: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum FormatName {
    #[default]
    Gray8,
    Rgb565,
}

impl From<FormatName> for PixelFormat {
    fn from(name: FormatName) -> Self {
        match name {
            FormatName::Gray8 => PixelFormat::Gray8,
            FormatName::Rgb565 => PixelFormat::Rgb565,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct SourceConfig {
    format: FormatName,
    downsample: Option<usize>,
    synthetic_width: usize,
    synthetic_height: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            format: FormatName::Gray8,
            downsample: None,
            synthetic_width: 64,
            synthetic_height: 48,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct WindowConfig {
    offset: usize,
    capacity: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            offset: 0,
            capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct ThresholdConfig {
    level: u8,
    low: u8,
    high: u8,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        let p = ThresholdParams::default();
        Self {
            level: p.level,
            low: p.low,
            high: p.high,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct PiecewiseConfig {
    split: u8,
    low_max: u8,
    high_min: u8,
}

impl Default for PiecewiseConfig {
    fn default() -> Self {
        let p = PiecewiseParams::default();
        Self {
            split: p.split,
            low_max: p.low_max,
            high_min: p.high_min,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct PipelineConfig {
    source: SourceConfig,
    window: WindowConfig,
    threshold: ThresholdConfig,
    gamma: Vec<f32>,
    piecewise: PiecewiseConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            window: WindowConfig::default(),
            threshold: ThresholdConfig::default(),
            gamma: vec![3.0, 1.0 / 3.0],
            piecewise: PiecewiseConfig::default(),
        }
    }
}

impl PipelineConfig {
    fn apply_overrides(&mut self, args: &RunArgs) {
        if let Some(format) = args.format {
            self.source.format = format;
        }
        if args.downsample.is_some() {
            self.source.downsample = args.downsample;
        }
        if let Some(offset) = args.offset {
            self.window.offset = offset;
        }
        if let Some(capacity) = args.capacity {
            self.window.capacity = capacity;
        }
        if let Some(level) = args.threshold {
            self.threshold.level = level;
        }
        if !args.gamma.is_empty() {
            self.gamma = args.gamma.clone();
        }
        if let Some(split) = args.split {
            self.piecewise.split = split;
        }
        if let Some(low_max) = args.low_max {
            self.piecewise.low_max = low_max;
        }
        if let Some(high_min) = args.high_min {
            self.piecewise.high_min = high_min;
        }
    }

    fn capture_window(&self) -> CaptureWindow {
        CaptureWindow::new(self.window.offset, self.window.capacity)
    }

    fn threshold_params(&self) -> ThresholdParams {
        ThresholdParams {
            level: self.threshold.level,
            low: self.threshold.low,
            high: self.threshold.high,
        }
    }

    fn piecewise_params(&self) -> PiecewiseParams {
        PiecewiseParams {
            split: self.piecewise.split,
            low_max: self.piecewise.low_max,
            high_min: self.piecewise.high_min,
        }
    }
}

/// Source pixels in their storage format (RGB565 words are little-endian).
#[derive(Debug, Clone)]
struct Source {
    data: Vec<u8>,
    width: usize,
    height: usize,
    format: PixelFormat,
}

impl Source {
    fn buffer(&self) -> Result<PixelBuffer<'_>> {
        PixelBuffer::new(&self.data, self.width, self.height, self.format)
            .context("wrapping source pixels")
    }

    fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// One byte per pixel: the gray plane itself, or integer luma of RGB565.
    fn luma(&self) -> Vec<u8> {
        match self.format {
            PixelFormat::Gray8 => self.data.clone(),
            PixelFormat::Rgb565 => self
                .data
                .chunks_exact(2)
                .map(|p| luma_u8(unpack_rgb565(u16::from_le_bytes([p[0], p[1]]))))
                .collect(),
        }
    }

    fn is_full_frame(&self, window: CaptureWindow) -> bool {
        window.offset == 0 && window.effective_len(self.pixel_count()) == self.pixel_count()
    }
}

#[derive(Debug, Clone, Serialize)]
struct MetaSource {
    input: Option<String>,
    width: usize,
    height: usize,
    format: FormatName,
    downsample: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
struct MetaPoint {
    window_offset: usize,
    window_len: usize,
    threshold: ThresholdConfig,
    gamma: Vec<f32>,
    piecewise: PiecewiseConfig,
    outputs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct HistogramsDto {
    source: Vec<u32>,
    equalized: Vec<u32>,
    lut: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
struct MetaFilter {
    window_offset: usize,
    window_len: usize,
    filtered: usize,
    border: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct MetaOtsu {
    format: FormatName,
    threshold: u8,
    channel_thresholds: Option<[u8; 3]>,
    foreground: usize,
    foreground_open: usize,
    foreground_close: usize,
    pixel_rule: &'static str,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Point(args) => {
            let (cfg, source) = prepare(&args)?;
            run_point(&args.out, &cfg, &source)
        }
        Command::Filter(args) => {
            let (cfg, source) = prepare(&args)?;
            run_filter(&args.out, &cfg, &source)
        }
        Command::Otsu(args) => {
            let (cfg, source) = prepare(&args)?;
            run_otsu(&args.out, &cfg, &source)
        }
        Command::All(args) => {
            let (cfg, source) = prepare(&args)?;
            run_point(&args.out, &cfg, &source)?;
            run_filter(&args.out, &cfg, &source)?;
            run_otsu(&args.out, &cfg, &source)
        }
    }
}

fn prepare(args: &RunArgs) -> Result<(PipelineConfig, Source)> {
    let mut cfg = match &args.config {
        Some(path) => read_json(path)
            .with_context(|| format!("reading pipeline config at {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    cfg.apply_overrides(args);

    if cfg.source.downsample == Some(0) {
        bail!("downsample factor must be at least 1.");
    }

    let source = match &args.input {
        Some(path) => load_source(path, &cfg.source)?,
        None => synthetic_source(&cfg.source)?,
    };
    info!("source: {}x{} {:?}", source.width, source.height, source.format);

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;

    let debug_path = args.out.join("debug.txt");
    let mut sink = fs::File::create(&debug_path)
        .with_context(|| format!("creating {}", debug_path.display()))?;
    dump_pixels(&mut sink, &source, DUMP_PIXELS).context("writing pixel dump")?;

    write_json(
        args.out.join("source.json"),
        &MetaSource {
            input: args.input.as_ref().map(|p| p.display().to_string()),
            width: source.width,
            height: source.height,
            format: cfg.source.format,
            downsample: cfg.source.downsample,
        },
    )?;

    Ok((cfg, source))
}

fn run_point(out: &Path, cfg: &PipelineConfig, source: &Source) -> Result<()> {
    let dir = case_dir(out, "point")?;
    let luma = source.luma();
    let window = cfg.capture_window();
    let src = window.source_slice(&luma);
    let full = source.is_full_frame(window);

    let mut outputs = Vec::new();
    let mut emit = |name: String, data: &[u8]| -> Result<()> {
        save_capture(&dir, &name, data, full.then_some((source.width, source.height)))?;
        outputs.push(name);
        Ok(())
    };

    let mut dst = vec![0u8; src.len()];
    negative_into(src, &mut dst);
    emit("negative".to_string(), &dst)?;

    threshold_into(src, &mut dst, &cfg.threshold_params());
    emit("threshold".to_string(), &dst)?;

    for (i, &gamma) in cfg.gamma.iter().enumerate() {
        gamma_into(src, &mut dst, gamma);
        emit(format!("gamma_{i}"), &dst)?;
    }

    piecewise_linear_into(src, &mut dst, &cfg.piecewise_params());
    emit("piecewise".to_string(), &dst)?;

    write_json(
        dir.join("meta.json"),
        &MetaPoint {
            window_offset: window.offset,
            window_len: src.len(),
            threshold: cfg.threshold,
            gamma: cfg.gamma.clone(),
            piecewise: cfg.piecewise,
            outputs,
        },
    )?;
    info!("point: {} pixels in window", src.len());
    Ok(())
}

fn run_filter(out: &Path, cfg: &PipelineConfig, source: &Source) -> Result<()> {
    let dir = case_dir(out, "filter")?;
    let luma = source.luma();
    let (w, h) = (source.width, source.height);
    let src = PixelBuffer::new(&luma, w, h, PixelFormat::Gray8).context("wrapping luma plane")?;

    let hist = histogram_gray(&luma, w, h);
    let lut = equalization_lut(&hist, hist.total());

    let window = cfg.capture_window();
    let len = window.effective_len(source.pixel_count());
    let mut equalized = vec![0u8; len];
    let mut low_pass = vec![0u8; len];
    let mut high_pass = vec![0u8; len];
    let mut median = vec![0u8; len];
    let mut outputs = FilterOutputs {
        equalized: &mut equalized,
        low_pass: &mut low_pass,
        high_pass: &mut high_pass,
        median: &mut median,
    };

    let report = SpatialFilter::new(w)
        .run(&src, &lut, window, &mut outputs)
        .context("spatial filter rejected the luma plane")?;

    let size = source.is_full_frame(window).then_some((w, h));
    save_capture(&dir, "equalized", &equalized, size)?;
    save_capture(&dir, "low_pass", &low_pass, size)?;
    save_capture(&dir, "high_pass", &high_pass, size)?;
    save_capture(&dir, "median", &median, size)?;

    write_json(
        dir.join("histograms.json"),
        &HistogramsDto {
            source: hist.bins().to_vec(),
            equalized: report.equalized_hist.bins().to_vec(),
            lut: lut.table().to_vec(),
        },
    )?;
    write_json(
        dir.join("meta.json"),
        &MetaFilter {
            window_offset: window.offset,
            window_len: len,
            filtered: report.filtered,
            border: "outer ring left at zero",
        },
    )?;
    info!("filter: {} interior pixels", report.filtered);
    Ok(())
}

fn run_otsu(out: &Path, cfg: &PipelineConfig, source: &Source) -> Result<()> {
    let dir = case_dir(out, "otsu")?;
    let (w, h) = (source.width, source.height);
    let src = source.buffer()?;

    let threshold = otsu_threshold(&src);
    let channel_thresholds = match compute_histogram(&src) {
        ImageHistogram::Gray(_) => None,
        ImageHistogram::Rgb565(rgb) => {
            let total = src.pixel_count() as u64;
            let otsu = |hist: &Histogram| otsu_from_histogram(hist, total);
            Some([otsu(&rgb.r), otsu(&rgb.g), otsu(&rgb.b)])
        }
    };

    let mut binarized = source.data.clone();
    let mut handle = PixelBufferMut::new(&mut binarized, w, h, source.format)
        .context("wrapping binarization target")?;
    let foreground = binarize_in_place(&mut handle, threshold);

    let mask = binary_mask(&binarized, source.format);
    let mask_buf = PixelBuffer::new(&mask, w, h, PixelFormat::Gray8).context("wrapping mask")?;
    let mut scratch = vec![0u8; mask.len()];

    let mut opened = vec![0u8; mask.len()];
    let mut dst = PixelBufferMut::new(&mut opened, w, h, PixelFormat::Gray8)
        .context("wrapping opening target")?;
    if !open3x3_into(&mask_buf, &mut dst, &mut scratch) {
        bail!("opening rejected a {w}x{h} mask.");
    }

    let mut closed = vec![0u8; mask.len()];
    let mut dst = PixelBufferMut::new(&mut closed, w, h, PixelFormat::Gray8)
        .context("wrapping closing target")?;
    if !close3x3_into(&mask_buf, &mut dst, &mut scratch) {
        bail!("closing rejected a {w}x{h} mask.");
    }

    let count_on = |data: &[u8]| data.iter().filter(|&&v| v == 255).count();
    let meta = MetaOtsu {
        format: cfg.source.format,
        threshold,
        channel_thresholds,
        foreground,
        foreground_open: count_on(&opened),
        foreground_close: count_on(&closed),
        pixel_rule: "foreground iff value (or luma) > threshold",
    };

    save_luma_raw(dir.join("binary.png"), w, h, mask)?;
    save_luma_raw(dir.join("open.png"), w, h, opened)?;
    save_luma_raw(dir.join("close.png"), w, h, closed)?;
    write_json(dir.join("meta.json"), &meta)?;
    info!("otsu: threshold={threshold} foreground={foreground}");
    Ok(())
}

fn load_source(path: &Path, cfg: &SourceConfig) -> Result<Source> {
    ensure_file_exists(path, "input")?;
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;

    match cfg.format {
        FormatName::Gray8 => {
            let luma = dyn_img.to_luma8();
            let (w, h) = luma.dimensions();
            let (data, w, h) =
                downsample_plane(luma.into_raw(), w as usize, h as usize, cfg.downsample)?;
            Ok(Source {
                data,
                width: w,
                height: h,
                format: cfg.format.into(),
            })
        }
        FormatName::Rgb565 => {
            let rgb = dyn_img.to_rgb8();
            let (w, h) = (rgb.width() as usize, rgb.height() as usize);
            let mut planes: [Vec<u8>; 3] = Default::default();
            for px in rgb.as_raw().chunks_exact(3) {
                for (plane, &v) in planes.iter_mut().zip(px) {
                    plane.push(v);
                }
            }
            let [r, g, b] = planes;
            let (r, dw, dh) = downsample_plane(r, w, h, cfg.downsample)?;
            let (g, _, _) = downsample_plane(g, w, h, cfg.downsample)?;
            let (b, _, _) = downsample_plane(b, w, h, cfg.downsample)?;
            Ok(Source {
                data: pack_planes(&r, &g, &b),
                width: dw,
                height: dh,
                format: cfg.format.into(),
            })
        }
    }
}

fn downsample_plane(
    plane: Vec<u8>,
    width: usize,
    height: usize,
    factor: Option<usize>,
) -> Result<(Vec<u8>, usize, usize)> {
    let Some(factor) = factor.filter(|&f| f > 1) else {
        return Ok((plane, width, height));
    };

    let view = ImageView::from_slice(width, height, width, &plane)
        .context("viewing plane for downsampling")?;
    let small = downsample_block_mean_u8(&view, factor);
    if small.width() == 0 || small.height() == 0 {
        bail!("downsample factor {factor} leaves nothing of a {width}x{height} image.");
    }
    let (w, h) = (small.width(), small.height());
    Ok((small.into_vec(), w, h))
}

fn pack_planes(r: &[u8], g: &[u8], b: &[u8]) -> Vec<u8> {
    r.iter()
        .zip(g)
        .zip(b)
        .flat_map(|((&r, &g), &b)| pack_rgb565([r, g, b]).to_le_bytes())
        .collect()
}

/// Bright disk on a horizontal ramp with a few isolated specks.
fn synthetic_plane(width: usize, height: usize) -> Vec<u8> {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let radius = width.min(height) as f32 / 3.0;
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
            let v = if dx * dx + dy * dy <= radius * radius || (x * 7 + y * 13) % 61 == 0 {
                210
            } else {
                20 + (x * 60 / width) as u8
            };
            data.push(v);
        }
    }
    data
}

fn synthetic_source(cfg: &SourceConfig) -> Result<Source> {
    let (w, h) = (cfg.synthetic_width, cfg.synthetic_height);
    if w == 0 || h == 0 {
        bail!("synthetic pattern needs non-zero dimensions, got {w}x{h}.");
    }
    let plane = synthetic_plane(w, h);

    match cfg.format {
        FormatName::Gray8 => {
            let (data, w, h) = downsample_plane(plane, w, h, cfg.downsample)?;
            Ok(Source {
                data,
                width: w,
                height: h,
                format: cfg.format.into(),
            })
        }
        FormatName::Rgb565 => {
            let (plane, w, h) = downsample_plane(plane, w, h, cfg.downsample)?;
            let warm: Vec<u8> = plane.iter().map(|&v| v.saturating_add(20)).collect();
            let cool: Vec<u8> = plane.iter().map(|&v| v / 2).collect();
            Ok(Source {
                data: pack_planes(&warm, &plane, &cool),
                width: w,
                height: h,
                format: cfg.format.into(),
            })
        }
    }
}

/// {0, 255} plane from a binarized buffer of either format.
fn binary_mask(binarized: &[u8], format: PixelFormat) -> Vec<u8> {
    match format {
        PixelFormat::Gray8 => binarized.to_vec(),
        PixelFormat::Rgb565 => binarized
            .chunks_exact(2)
            .map(|p| if p == [0xFF, 0xFF] { 255 } else { 0 })
            .collect(),
    }
}

/// Writes `IMG[i]=v` lines for the first `count` source pixels.
fn dump_pixels(sink: &mut impl Write, source: &Source, count: usize) -> io::Result<()> {
    match source.format {
        PixelFormat::Gray8 => {
            for (i, v) in source.data.iter().take(count).enumerate() {
                writeln!(sink, "IMG[{i}]={v}")?;
            }
        }
        PixelFormat::Rgb565 => {
            for (i, p) in source.data.chunks_exact(2).take(count).enumerate() {
                writeln!(sink, "IMG[{i}]={}", u16::from_le_bytes([p[0], p[1]]))?;
            }
        }
    }
    sink.flush()
}

fn case_dir(out: &Path, case_name: &str) -> Result<PathBuf> {
    let dir = out.join(case_name);
    fs::create_dir_all(&dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    Ok(dir)
}

/// Saves a capture buffer as raw bytes, plus a PNG when it spans the frame.
fn save_capture(
    dir: &Path,
    name: &str,
    data: &[u8],
    frame: Option<(usize, usize)>,
) -> Result<()> {
    let raw = dir.join(format!("{name}.raw"));
    fs::write(&raw, data).with_context(|| format!("writing {}", raw.display()))?;
    if let Some((w, h)) = frame {
        save_luma_raw(dir.join(format!("{name}.png")), w, h, data.to_vec())?;
    }
    Ok(())
}

fn save_luma_raw(path: PathBuf, width: usize, height: usize, data: Vec<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(width as u32, height as u32, data)
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    ensure_file_exists(path, "config")?;
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
