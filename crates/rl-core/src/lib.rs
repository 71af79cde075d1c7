//! Foundational raster types for rasterlab.
//!
//! ## Pixel Buffers
//! [`PixelBuffer`] and [`PixelBufferMut`] bundle a borrowed byte buffer with
//! its width, height and [`PixelFormat`]. They are validated once at
//! construction, so algorithms never re-check dimensions against the buffer
//! length. `Gray8` stores one byte per pixel; `Rgb565` stores one
//! little-endian 16-bit word per pixel.
//!
//! ## Image Views and Stride
//! [`ImageView`] and [`ImageViewMut`] are typed planes with element stride
//! (not byte stride). `stride` is the distance, in elements, between adjacent
//! row starts and may be greater than `width`.
//!
//! ## Capture Windows
//! Output buffers may represent only part of an image. A [`CaptureWindow`]
//! names the linear pixel range `[offset, offset + capacity)` such a buffer
//! holds; writes outside that range are skipped.

mod buffer;
mod error;
mod format;
mod image;
mod lut;
mod window;

pub use buffer::{PixelBuffer, PixelBufferMut};
pub use error::Error;
pub use format::{PixelFormat, luma_u8, pack_rgb565, unpack_rgb565};
pub use image::{Image, ImageView, ImageViewMut};
pub use lut::Lut;
pub use window::CaptureWindow;
