//! Pixel format conversion between views.
//!
//! Conversions run one scanline at a time through a [`RowConverter`] looked
//! up in a static `FormatCode x FormatCode` table. Pairs without an entry
//! fail with [`BitmapError::UnsupportedFormatPair`]; nothing is routed
//! through an intermediate format behind the caller's back.
//!
//! ## Registered conversions
//!
//! | Family | Pairs |
//! |---|---|
//! | Reorder | RGB24 ↔ BGR24, RGBA32 ↔ BGRA32 ↔ ARGB32, BGRX32 → RGBA32/BGRA32, RGBF32 ↔ BGRF32, RGBAF32 ↔ BGRAF32, premultiplied RGBA ↔ BGRA |
//! | Add alpha | RGB24/BGR24 → RGBA32/BGRA32/ARGB32/BGRX32, GRAY8 → GRAYA8, RGBF32 → RGBAF32 |
//! | Drop alpha | RGBA32/BGRA32/ARGB32/BGRX32 → RGB24/BGR24, GRAYA8 → GRAY8, RGBAF32 → RGBF32 |
//! | Gray expansion | GRAY8 → RGB24/BGR24/RGBA32/BGRA32/ARGB32/BGRX32, GRAYA8 → RGBA32/BGRA32/ARGB32 |
//! | Luminance | RGB24/BGR24/RGBA32/BGRA32/ARGB32/BGRX32 → GRAY8, RGBA32/BGRA32 → GRAYA8 |
//! | Premultiply | RGBA32 ↔ RGBA32_PREMUL, BGRA32 ↔ BGRA32_PREMUL |
//! | Depth | 8-bit ↔ f32 and 8-bit ↔ 16-bit with the same component order |
//!
//! Adding a format means adding a [`FormatCode`] and registering its pairs
//! in `build_table`; nothing is derived automatically.

mod rows;


use crate::{BitmapError, BitmapMut, BitmapRef, FormatCode, PixelFormat};

/// Converts one row of whole pixels from one format to another.
pub type RowConverter = fn(&[u8], &mut [u8]);

const N: usize = FormatCode::COUNT;

type Table = [[Option<RowConverter>; N]; N];

static CONVERTERS: Table = build_table();

const fn build_table() -> Table {
    use FormatCode::*;

    let mut t: Table = [[None; N]; N];
    let mut i = 0;
    while i < N {
        t[i][i] = Some(rows::copy_row);
        i += 1;
    }

    macro_rules! register {
        ($($from:ident => $to:ident: $f:ident),* $(,)?) => {
            $( t[$from.index()][$to.index()] = Some(rows::$f); )*
        };
    }

    register! {
        // 3bpp <-> 3bpp, 4bpp <-> 4bpp reorders
        Rgb24 => Bgr24: swap_rgb,
        Bgr24 => Rgb24: swap_rgb,
        Rgba32 => Bgra32: swap_br,
        Bgra32 => Rgba32: swap_br,
        Rgba32 => Argb32: rotate_alpha_first,
        Argb32 => Rgba32: rotate_alpha_last,
        Bgra32 => Argb32: reverse4,
        Argb32 => Bgra32: reverse4,
        Bgrx32 => Bgra32: copy_fill_alpha,
        Bgrx32 => Rgba32: swap_br_fill_alpha,
        Bgra32 => Bgrx32: copy_row,
        Rgba32 => Bgrx32: swap_br,
        Rgba32Premul => Bgra32Premul: swap_br,
        Bgra32Premul => Rgba32Premul: swap_br,

        // Add alpha
        Rgb24 => Rgba32: rgb_to_rgba,
        Bgr24 => Bgra32: rgb_to_rgba,
        Bgr24 => Bgrx32: rgb_to_rgba,
        Rgb24 => Bgra32: rgb_to_bgra,
        Rgb24 => Bgrx32: rgb_to_bgra,
        Bgr24 => Rgba32: rgb_to_bgra,
        Rgb24 => Argb32: rgb_to_argb,
        Bgr24 => Argb32: bgr_to_argb,

        // Drop alpha
        Rgba32 => Rgb24: rgba_to_rgb,
        Bgra32 => Bgr24: rgba_to_rgb,
        Bgrx32 => Bgr24: rgba_to_rgb,
        Bgra32 => Rgb24: bgra_to_rgb,
        Bgrx32 => Rgb24: bgra_to_rgb,
        Rgba32 => Bgr24: bgra_to_rgb,
        Argb32 => Rgb24: argb_to_rgb,
        Argb32 => Bgr24: argb_to_bgr,

        // Gray expansion
        Gray8 => Rgb24: gray_to_rgb,
        Gray8 => Bgr24: gray_to_rgb,
        Gray8 => Rgba32: gray_to_4bpp,
        Gray8 => Bgra32: gray_to_4bpp,
        Gray8 => Bgrx32: gray_to_4bpp,
        Gray8 => Argb32: gray_to_argb,
        Gray8 => GrayA8: gray_to_gray_alpha,
        GrayA8 => Gray8: gray_alpha_to_gray,
        GrayA8 => Rgba32: gray_alpha_to_4bpp,
        GrayA8 => Bgra32: gray_alpha_to_4bpp,
        GrayA8 => Argb32: gray_alpha_to_argb,

        // Luminance
        Rgb24 => Gray8: rgb_to_gray,
        Bgr24 => Gray8: bgr_to_gray,
        Rgba32 => Gray8: rgba_to_gray,
        Bgra32 => Gray8: bgra_to_gray,
        Bgrx32 => Gray8: bgra_to_gray,
        Argb32 => Gray8: argb_to_gray,
        Rgba32 => GrayA8: rgba_to_gray_alpha,
        Bgra32 => GrayA8: bgra_to_gray_alpha,

        // Premultiplied alpha
        Rgba32 => Rgba32Premul: premultiply,
        Bgra32 => Bgra32Premul: premultiply,
        Rgba32Premul => Rgba32: unpremultiply,
        Bgra32Premul => Bgra32: unpremultiply,

        // 8-bit <-> f32
        Gray8 => GrayF32: u8_to_f32,
        Rgb24 => RgbF32: u8_to_f32,
        Bgr24 => BgrF32: u8_to_f32,
        Rgba32 => RgbaF32: u8_to_f32,
        Bgra32 => BgraF32: u8_to_f32,
        GrayF32 => Gray8: f32_to_u8,
        RgbF32 => Rgb24: f32_to_u8,
        BgrF32 => Bgr24: f32_to_u8,
        RgbaF32 => Rgba32: f32_to_u8,
        BgraF32 => Bgra32: f32_to_u8,

        // 8-bit <-> 16-bit
        Gray8 => Gray16: u8_to_u16,
        Rgb24 => Rgb48: u8_to_u16,
        Rgba32 => Rgba64: u8_to_u16,
        Gray16 => Gray8: u16_to_u8,
        Rgb48 => Rgb24: u16_to_u8,
        Rgba64 => Rgba32: u16_to_u8,

        // Float reorders and alpha
        RgbF32 => BgrF32: swap_rgb_f32,
        BgrF32 => RgbF32: swap_rgb_f32,
        RgbaF32 => BgraF32: swap_br_f32,
        BgraF32 => RgbaF32: swap_br_f32,
        RgbF32 => RgbaF32: rgb_f32_to_rgba_f32,
        RgbaF32 => RgbF32: rgba_f32_to_rgb_f32,
    }

    t
}

/// Row converter from `src` to `dst`, if one is registered.
///
/// Identical formats always convert by copying, canonical or not.
pub fn find_converter(src: PixelFormat, dst: PixelFormat) -> Option<RowConverter> {
    if src == dst {
        return Some(rows::copy_row);
    }
    CONVERTERS[src.code()?.index()][dst.code()?.index()]
}

/// Whether [`copy_pixels`] can convert from `src` to `dst`.
#[inline]
pub fn is_supported(src: PixelFormat, dst: PixelFormat) -> bool {
    find_converter(src, dst).is_some()
}

/// Every registered `(src, dst)` pair of distinct canonical formats.
pub fn supported_pairs() -> impl Iterator<Item = (FormatCode, FormatCode)> {
    FormatCode::ALL.into_iter().flat_map(|s| {
        FormatCode::ALL
            .into_iter()
            .filter(move |&d| d != s && CONVERTERS[s.index()][d.index()].is_some())
            .map(move |d| (s, d))
    })
}

/// Copy `src` into `dst`, converting pixel formats row by row, top to bottom.
///
/// Same-format contiguous views are copied in one block.
///
/// # Errors
///
/// [`BitmapError::DimensionMismatch`] if the views differ in width or
/// height, [`BitmapError::UnsupportedFormatPair`] if no converter is
/// registered for the pair.
pub fn copy_pixels(src: BitmapRef<'_>, dst: &mut BitmapMut<'_>) -> Result<(), BitmapError> {
    if src.width() != dst.width() || src.height() != dst.height() {
        return Err(BitmapError::DimensionMismatch);
    }
    let Some(convert) = find_converter(src.format(), dst.format()) else {
        log::debug!(
            "no row converter from {:?} to {:?}",
            src.format(),
            dst.format()
        );
        return Err(BitmapError::UnsupportedFormatPair);
    };
    if src.format() == dst.format() && src.layout().is_contiguous() && dst.layout().is_contiguous() {
        dst.as_bytes_mut().copy_from_slice(src.as_bytes());
        return Ok(());
    }
    for (s, d) in src.rows().zip(dst.rows_mut()) {
        convert(s, d);
    }
    Ok(())
}

/// Convert a single row of `src_format` pixels into `dst_format`.
///
/// # Errors
///
/// [`BitmapError::UnsupportedFormatPair`] if no converter is registered,
/// [`BitmapError::DimensionMismatch`] if the slices don't hold the same
/// whole number of pixels.
pub fn convert_row(
    src_format: PixelFormat,
    src: &[u8],
    dst_format: PixelFormat,
    dst: &mut [u8],
) -> Result<(), BitmapError> {
    let convert = find_converter(src_format, dst_format).ok_or(BitmapError::UnsupportedFormatPair)?;
    let (sb, db) = (src_format.byte_count(), dst_format.byte_count());
    if sb == 0 || db == 0 || src.len() % sb != 0 || dst.len() % db != 0 || src.len() / sb != dst.len() / db {
        return Err(BitmapError::DimensionMismatch);
    }
    convert(src, dst);
    Ok(())
}
