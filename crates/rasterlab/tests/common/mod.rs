#![allow(dead_code)]

use rasterlab::pack_rgb565;

/// Deterministic byte noise from a 32-bit LCG.
pub fn lcg_bytes(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect()
}

/// Filled disk of level `fg` on `bg`, with up to `±jitter` of noise.
pub fn noisy_disk(width: usize, height: usize, radius: f32, fg: u8, bg: u8, jitter: u8) -> Vec<u8> {
    let noise = lcg_bytes(width * height, 7);
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let span = 2 * i32::from(jitter) + 1;

    (0..width * height)
        .map(|i| {
            let (x, y) = ((i % width) as f32 + 0.5, (i / width) as f32 + 0.5);
            let inside = (x - cx).powi(2) + (y - cy).powi(2) <= radius * radius;
            let base = i32::from(if inside { fg } else { bg });
            let offset = i32::from(noise[i]) % span - i32::from(jitter);
            (base + offset).clamp(0, 255) as u8
        })
        .collect()
}

/// Binary {0, 255} mask from noise, foreground where the byte exceeds `cut`.
pub fn binary_noise(len: usize, seed: u32, cut: u8) -> Vec<u8> {
    lcg_bytes(len, seed)
        .into_iter()
        .map(|v| if v > cut { 255 } else { 0 })
        .collect()
}

/// Packs gray levels into little-endian RGB565 bytes.
pub fn gray_to_rgb565(gray: &[u8]) -> Vec<u8> {
    gray.iter()
        .flat_map(|&v| pack_rgb565([v, v, v]).to_le_bytes())
        .collect()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
