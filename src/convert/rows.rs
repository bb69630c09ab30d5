//! Row kernels. Each converts one scanline of `src` into `dst`; the slices
//! hold whole pixels of the respective formats and the same pixel count.

use crate::numerics::unit_to_byte;

// ===========================================================================
// Helpers
// ===========================================================================

#[inline(always)]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((77 * u32::from(r) + 150 * u32::from(g) + 29 * u32::from(b) + 128) >> 8) as u8
}

#[inline(always)]
fn premul(c: u8, a: u8) -> u8 {
    ((u32::from(c) * u32::from(a) + 127) / 255) as u8
}

#[inline(always)]
fn unpremul(c: u8, a: u8) -> u8 {
    if a == 0 {
        0
    } else {
        ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8
    }
}

// ===========================================================================
// Same-size copies and 8-bit reorders
// ===========================================================================

pub(super) fn copy_row(src: &[u8], dst: &mut [u8]) {
    dst.copy_from_slice(src);
}

pub(super) fn swap_rgb(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(3).zip(dst.chunks_exact_mut(3)) {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
    }
}

pub(super) fn swap_br(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
        d[3] = s[3];
    }
}

pub(super) fn copy_fill_alpha(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        d[..3].copy_from_slice(&s[..3]);
        d[3] = 0xFF;
    }
}

pub(super) fn swap_br_fill_alpha(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
        d[3] = 0xFF;
    }
}

/// RGBA -> ARGB (and BGRA -> ABGR): alpha moves to the front.
pub(super) fn rotate_alpha_first(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        d[0] = s[3];
        d[1] = s[0];
        d[2] = s[1];
        d[3] = s[2];
    }
}

/// ARGB -> RGBA: alpha moves to the back.
pub(super) fn rotate_alpha_last(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        d[0] = s[1];
        d[1] = s[2];
        d[2] = s[3];
        d[3] = s[0];
    }
}

/// BGRA <-> ARGB: full byte reversal.
pub(super) fn reverse4(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let v = u32::from_ne_bytes([s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&v.swap_bytes().to_ne_bytes());
    }
}

// ===========================================================================
// Alpha add / drop
// ===========================================================================

pub(super) fn rgb_to_rgba(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(3).zip(dst.chunks_exact_mut(4)) {
        d[0] = s[0];
        d[1] = s[1];
        d[2] = s[2];
        d[3] = 0xFF;
    }
}

pub(super) fn rgb_to_bgra(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(3).zip(dst.chunks_exact_mut(4)) {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
        d[3] = 0xFF;
    }
}

pub(super) fn rgb_to_argb(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(3).zip(dst.chunks_exact_mut(4)) {
        d[0] = 0xFF;
        d[1] = s[0];
        d[2] = s[1];
        d[3] = s[2];
    }
}

pub(super) fn bgr_to_argb(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(3).zip(dst.chunks_exact_mut(4)) {
        d[0] = 0xFF;
        d[1] = s[2];
        d[2] = s[1];
        d[3] = s[0];
    }
}

pub(super) fn rgba_to_rgb(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(3)) {
        d[0] = s[0];
        d[1] = s[1];
        d[2] = s[2];
    }
}

pub(super) fn bgra_to_rgb(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(3)) {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
    }
}

pub(super) fn argb_to_rgb(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(3)) {
        d[0] = s[1];
        d[1] = s[2];
        d[2] = s[3];
    }
}

pub(super) fn argb_to_bgr(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(3)) {
        d[0] = s[3];
        d[1] = s[2];
        d[2] = s[1];
    }
}

// ===========================================================================
// Gray expansion
// ===========================================================================

pub(super) fn gray_to_rgb(src: &[u8], dst: &mut [u8]) {
    for (&v, d) in src.iter().zip(dst.chunks_exact_mut(3)) {
        d.fill(v);
    }
}

pub(super) fn gray_to_4bpp(src: &[u8], dst: &mut [u8]) {
    for (&v, d) in src.iter().zip(dst.chunks_exact_mut(4)) {
        d[0] = v;
        d[1] = v;
        d[2] = v;
        d[3] = 0xFF;
    }
}

pub(super) fn gray_to_argb(src: &[u8], dst: &mut [u8]) {
    for (&v, d) in src.iter().zip(dst.chunks_exact_mut(4)) {
        d[0] = 0xFF;
        d[1] = v;
        d[2] = v;
        d[3] = v;
    }
}

pub(super) fn gray_to_gray_alpha(src: &[u8], dst: &mut [u8]) {
    for (&v, d) in src.iter().zip(dst.chunks_exact_mut(2)) {
        d[0] = v;
        d[1] = 0xFF;
    }
}

pub(super) fn gray_alpha_to_gray(src: &[u8], dst: &mut [u8]) {
    for (ga, d) in src.chunks_exact(2).zip(dst.iter_mut()) {
        *d = ga[0];
    }
}

pub(super) fn gray_alpha_to_4bpp(src: &[u8], dst: &mut [u8]) {
    for (ga, d) in src.chunks_exact(2).zip(dst.chunks_exact_mut(4)) {
        d[0] = ga[0];
        d[1] = ga[0];
        d[2] = ga[0];
        d[3] = ga[1];
    }
}

pub(super) fn gray_alpha_to_argb(src: &[u8], dst: &mut [u8]) {
    for (ga, d) in src.chunks_exact(2).zip(dst.chunks_exact_mut(4)) {
        d[0] = ga[1];
        d[1] = ga[0];
        d[2] = ga[0];
        d[3] = ga[0];
    }
}

// ===========================================================================
// Luminance (BT.601 weights, 8-bit fixed point)
// ===========================================================================

pub(super) fn rgb_to_gray(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(3).zip(dst.iter_mut()) {
        *d = luma(s[0], s[1], s[2]);
    }
}

pub(super) fn bgr_to_gray(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(3).zip(dst.iter_mut()) {
        *d = luma(s[2], s[1], s[0]);
    }
}

pub(super) fn rgba_to_gray(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.iter_mut()) {
        *d = luma(s[0], s[1], s[2]);
    }
}

pub(super) fn bgra_to_gray(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.iter_mut()) {
        *d = luma(s[2], s[1], s[0]);
    }
}

pub(super) fn argb_to_gray(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.iter_mut()) {
        *d = luma(s[1], s[2], s[3]);
    }
}

pub(super) fn rgba_to_gray_alpha(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(2)) {
        d[0] = luma(s[0], s[1], s[2]);
        d[1] = s[3];
    }
}

pub(super) fn bgra_to_gray_alpha(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(2)) {
        d[0] = luma(s[2], s[1], s[0]);
        d[1] = s[3];
    }
}

// ===========================================================================
// Premultiplication (alpha in the last byte)
// ===========================================================================

pub(super) fn premultiply(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let a = s[3];
        d[0] = premul(s[0], a);
        d[1] = premul(s[1], a);
        d[2] = premul(s[2], a);
        d[3] = a;
    }
}

pub(super) fn unpremultiply(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let a = s[3];
        d[0] = unpremul(s[0], a);
        d[1] = unpremul(s[1], a);
        d[2] = unpremul(s[2], a);
        d[3] = a;
    }
}

// ===========================================================================
// Depth changes (component order preserved)
// ===========================================================================

pub(super) fn u8_to_f32(src: &[u8], dst: &mut [u8]) {
    for (&v, d) in src.iter().zip(dst.chunks_exact_mut(4)) {
        d.copy_from_slice(&(f32::from(v) / 255.0).to_ne_bytes());
    }
}

pub(super) fn f32_to_u8(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.iter_mut()) {
        *d = unit_to_byte(f32::from_ne_bytes([s[0], s[1], s[2], s[3]]));
    }
}

pub(super) fn u8_to_u16(src: &[u8], dst: &mut [u8]) {
    for (&v, d) in src.iter().zip(dst.chunks_exact_mut(2)) {
        d.copy_from_slice(&(u16::from(v) * 257).to_ne_bytes());
    }
}

pub(super) fn u16_to_u8(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(2).zip(dst.iter_mut()) {
        let v = u32::from(u16::from_ne_bytes([s[0], s[1]]));
        *d = ((v + 128) / 257) as u8;
    }
}

// ===========================================================================
// Float reorders
// ===========================================================================

pub(super) fn swap_rgb_f32(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(12).zip(dst.chunks_exact_mut(12)) {
        d[0..4].copy_from_slice(&s[8..12]);
        d[4..8].copy_from_slice(&s[4..8]);
        d[8..12].copy_from_slice(&s[0..4]);
    }
}

pub(super) fn swap_br_f32(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(16).zip(dst.chunks_exact_mut(16)) {
        d[0..4].copy_from_slice(&s[8..12]);
        d[4..8].copy_from_slice(&s[4..8]);
        d[8..12].copy_from_slice(&s[0..4]);
        d[12..16].copy_from_slice(&s[12..16]);
    }
}

pub(super) fn rgb_f32_to_rgba_f32(src: &[u8], dst: &mut [u8]) {
    let one = 1.0f32.to_ne_bytes();
    for (s, d) in src.chunks_exact(12).zip(dst.chunks_exact_mut(16)) {
        d[..12].copy_from_slice(s);
        d[12..].copy_from_slice(&one);
    }
}

pub(super) fn rgba_f32_to_rgb_f32(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(16).zip(dst.chunks_exact_mut(12)) {
        d.copy_from_slice(&s[..12]);
    }
}
