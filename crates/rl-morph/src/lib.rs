//! 3x3 binary morphology.
//!
//! Pixels are foreground only when exactly `255`; any other value is
//! background. Outputs are `0` or `255`. Pixels outside the frame count as
//! background, so erosion always clears the outermost ring.
//!
//! The `_into` forms write into caller buffers and never allocate. They
//! return `false` and leave `dst` unmodified when the buffers are not
//! same-sized `Gray8` images or the scratch slice is too small.

use log::warn;
use rl_core::{Image, ImageView, ImageViewMut, PixelBuffer, PixelBufferMut, PixelFormat};

const ON: u8 = 255;

#[inline]
fn is_on(src: &ImageView<'_, u8>, x: isize, y: isize) -> bool {
    src.get_signed(x, y).is_some_and(|&v| v == ON)
}

fn dilate_view(src: &ImageView<'_, u8>, dst: &mut ImageViewMut<'_, u8>) {
    for y in 0..src.height() {
        let out = dst.row_mut(y);
        for (x, px) in out.iter_mut().enumerate() {
            let (cx, cy) = (x as isize, y as isize);
            let any_set = (-1..=1).any(|dy| (-1..=1).any(|dx| is_on(src, cx + dx, cy + dy)));
            *px = if any_set { ON } else { 0 };
        }
    }
}

fn erode_view(src: &ImageView<'_, u8>, dst: &mut ImageViewMut<'_, u8>) {
    for y in 0..src.height() {
        let out = dst.row_mut(y);
        for (x, px) in out.iter_mut().enumerate() {
            let (cx, cy) = (x as isize, y as isize);
            let all_set = (-1..=1).all(|dy| (-1..=1).all(|dx| is_on(src, cx + dx, cy + dy)));
            *px = if all_set { ON } else { 0 };
        }
    }
}

fn gray_pair<'s, 'd>(
    src: &PixelBuffer<'s>,
    dst: &'d mut PixelBufferMut<'_>,
) -> Option<(ImageView<'s, u8>, ImageViewMut<'d, u8>)> {
    if src.format() != PixelFormat::Gray8
        || dst.format() != PixelFormat::Gray8
        || src.width() != dst.width()
        || src.height() != dst.height()
    {
        warn!(
            "morphology: incompatible buffers {}x{} {:?} -> {}x{} {:?}",
            src.width(),
            src.height(),
            src.format(),
            dst.width(),
            dst.height(),
            dst.format()
        );
        return None;
    }

    Some((src.gray_view()?, dst.gray_view_mut()?))
}

/// `dst = 255` where any pixel of the 3x3 neighborhood is 255.
pub fn dilate3x3_into(src: &PixelBuffer<'_>, dst: &mut PixelBufferMut<'_>) -> bool {
    let Some((src, mut dst)) = gray_pair(src, dst) else {
        return false;
    };
    dilate_view(&src, &mut dst);
    true
}

/// `dst = 255` where all 9 pixels of the 3x3 neighborhood are 255.
pub fn erode3x3_into(src: &PixelBuffer<'_>, dst: &mut PixelBufferMut<'_>) -> bool {
    let Some((src, mut dst)) = gray_pair(src, dst) else {
        return false;
    };
    erode_view(&src, &mut dst);
    true
}

#[derive(Clone, Copy)]
enum Order {
    ErodeDilate,
    DilateErode,
}

fn compose_into(
    src: &PixelBuffer<'_>,
    dst: &mut PixelBufferMut<'_>,
    scratch: &mut [u8],
    order: Order,
) -> bool {
    let n = src.pixel_count();
    if scratch.len() < n {
        warn!(
            "morphology: scratch holds {} bytes, {n} needed",
            scratch.len()
        );
        return false;
    }
    if gray_pair(src, dst).is_none() {
        return false;
    }

    let Ok(mut tmp) =
        PixelBufferMut::new(&mut scratch[..n], src.width(), src.height(), PixelFormat::Gray8)
    else {
        return false;
    };

    match order {
        Order::ErodeDilate => {
            erode3x3_into(src, &mut tmp) && dilate3x3_into(&tmp.as_buffer(), dst)
        }
        Order::DilateErode => {
            dilate3x3_into(src, &mut tmp) && erode3x3_into(&tmp.as_buffer(), dst)
        }
    }
}

/// Opening (erode, then dilate) through `scratch`, which must hold at least
/// `width * height` bytes.
pub fn open3x3_into(
    src: &PixelBuffer<'_>,
    dst: &mut PixelBufferMut<'_>,
    scratch: &mut [u8],
) -> bool {
    compose_into(src, dst, scratch, Order::ErodeDilate)
}

/// Closing (dilate, then erode) through `scratch`.
pub fn close3x3_into(
    src: &PixelBuffer<'_>,
    dst: &mut PixelBufferMut<'_>,
    scratch: &mut [u8],
) -> bool {
    compose_into(src, dst, scratch, Order::DilateErode)
}

pub fn erode3x3_binary_u8(src: &ImageView<'_, u8>) -> Image<u8> {
    let mut out = Image::new_fill(src.width(), src.height(), 0u8);
    erode_view(src, &mut out.as_view_mut());
    out
}

pub fn dilate3x3_binary_u8(src: &ImageView<'_, u8>) -> Image<u8> {
    let mut out = Image::new_fill(src.width(), src.height(), 0u8);
    dilate_view(src, &mut out.as_view_mut());
    out
}

pub fn open3x3_binary_u8(src: &ImageView<'_, u8>) -> Image<u8> {
    let eroded = erode3x3_binary_u8(src);
    dilate3x3_binary_u8(&eroded.as_view())
}

pub fn close3x3_binary_u8(src: &ImageView<'_, u8>) -> Image<u8> {
    let dilated = dilate3x3_binary_u8(src);
    erode3x3_binary_u8(&dilated.as_view())
}
