//! Affine numeric kernels for byte and float channel data.
//!
//! The transform is `value = (offset + input) * scale`, optionally clamped
//! into a [`ValueRange`]. Slice kernels walk their input four lanes at a
//! time with a scalar remainder; view kernels apply them row by row to
//! views whose components are all `u8` or all `f32`. View kernels map
//! component `i` to component `i` and never reorder channels; use
//! [`convert`](crate::convert) for that.

use crate::span::check_alignment;
use crate::{BitmapError, BitmapMut, BitmapRef, ChannelType, PixelFormat};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// `value = (offset + input) * scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleOffset {
    /// Added before scaling.
    pub offset: f32,
    /// Applied after the offset.
    pub scale: f32,
}

impl ScaleOffset {
    /// Leaves values unchanged.
    pub const IDENTITY: Self = Self::new(0.0, 1.0);
    /// `[0, 255]` bytes to `[0, 1]` floats.
    pub const BYTE_TO_UNIT: Self = Self::new(0.0, 1.0 / 255.0);
    /// `[0, 1]` floats to `[0, 255]`.
    pub const UNIT_TO_BYTE: Self = Self::new(0.0, 255.0);

    /// Create a transform.
    #[inline]
    pub const fn new(offset: f32, scale: f32) -> Self {
        Self { offset, scale }
    }

    /// Apply to one value.
    #[inline(always)]
    pub fn apply(self, v: f32) -> f32 {
        (self.offset + v) * self.scale
    }

    /// The transform that undoes this one. `scale` must be non-zero.
    #[inline]
    pub fn inverse(self) -> Self {
        Self::new(-self.offset * self.scale, 1.0 / self.scale)
    }
}

impl Default for ScaleOffset {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Inclusive clamp range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl ValueRange {
    /// `[0, 1]`.
    pub const UNIT: Self = Self::new(0.0, 1.0);
    /// `[0, 255]`.
    pub const BYTE: Self = Self::new(0.0, 255.0);

    /// Create a range.
    #[inline]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamp one value. NaN becomes `min`.
    #[inline(always)]
    pub fn clamp(self, v: f32) -> f32 {
        v.max(self.min).min(self.max)
    }
}

/// Round to nearest and saturate into `u8`. NaN maps to 0.
#[inline(always)]
pub fn round_to_byte(v: f32) -> u8 {
    (v + 0.5) as u8
}

/// `[0, 1]` to `[0, 255]`, rounded and saturated.
#[inline(always)]
pub(crate) fn unit_to_byte(v: f32) -> u8 {
    round_to_byte(v * 255.0)
}

// ===========================================================================
// Slice kernels
// ===========================================================================

#[inline(always)]
fn map4<S: Copy, D>(src: &[S], dst: &mut [D], f: impl Fn(S) -> D) -> Result<(), BitmapError> {
    if src.len() != dst.len() {
        return Err(BitmapError::DimensionMismatch);
    }
    let mut s4 = src.chunks_exact(4);
    let mut d4 = dst.chunks_exact_mut(4);
    for (s, d) in (&mut s4).zip(&mut d4) {
        let lanes = [f(s[0]), f(s[1]), f(s[2]), f(s[3])];
        for (d, v) in d.iter_mut().zip(lanes) {
            *d = v;
        }
    }
    for (&s, d) in s4.remainder().iter().zip(d4.into_remainder()) {
        *d = f(s);
    }
    Ok(())
}

#[inline(always)]
fn update4(buf: &mut [f32], f: impl Fn(f32) -> f32) {
    let mut b4 = buf.chunks_exact_mut(4);
    for b in &mut b4 {
        let lanes = [f(b[0]), f(b[1]), f(b[2]), f(b[3])];
        b.copy_from_slice(&lanes);
    }
    for v in b4.into_remainder() {
        *v = f(*v);
    }
}

/// `dst[i] = t(src[i])`.
///
/// # Errors
///
/// [`BitmapError::DimensionMismatch`] if the lengths differ.
pub fn bytes_to_floats(src: &[u8], dst: &mut [f32], t: ScaleOffset) -> Result<(), BitmapError> {
    map4(src, dst, |v| t.apply(f32::from(v)))
}

/// `dst[i] = clamp(t(src[i]))`.
///
/// # Errors
///
/// [`BitmapError::DimensionMismatch`] if the lengths differ.
pub fn bytes_to_floats_clamped(
    src: &[u8],
    dst: &mut [f32],
    t: ScaleOffset,
    range: ValueRange,
) -> Result<(), BitmapError> {
    map4(src, dst, |v| range.clamp(t.apply(f32::from(v))))
}

/// `dst[i] = round(t(src[i]))`, saturated into `[0, 255]`.
///
/// # Errors
///
/// [`BitmapError::DimensionMismatch`] if the lengths differ.
pub fn floats_to_bytes(src: &[f32], dst: &mut [u8], t: ScaleOffset) -> Result<(), BitmapError> {
    map4(src, dst, |v| round_to_byte(t.apply(v)))
}

/// `dst[i] = round(clamp(t(src[i])))`, saturated into `[0, 255]`.
///
/// # Errors
///
/// [`BitmapError::DimensionMismatch`] if the lengths differ.
pub fn floats_to_bytes_clamped(
    src: &[f32],
    dst: &mut [u8],
    t: ScaleOffset,
    range: ValueRange,
) -> Result<(), BitmapError> {
    map4(src, dst, |v| round_to_byte(range.clamp(t.apply(v))))
}

/// `buf[i] = t(buf[i])`.
pub fn transform_in_place(buf: &mut [f32], t: ScaleOffset) {
    update4(buf, |v| t.apply(v));
}

/// `buf[i] = clamp(t(buf[i]))`.
pub fn transform_in_place_clamped(buf: &mut [f32], t: ScaleOffset, range: ValueRange) {
    update4(buf, |v| range.clamp(t.apply(v)));
}

/// `buf[i] = buf[i] * mul + add`.
pub fn multiply_add_in_place(buf: &mut [f32], mul: f32, add: f32) {
    update4(buf, |v| v * mul + add);
}

/// `buf[i] = clamp(buf[i])`.
pub fn clamp_in_place(buf: &mut [f32], range: ValueRange) {
    update4(buf, |v| range.clamp(v));
}

// ===========================================================================
// View kernels
// ===========================================================================

fn check_uniform(format: PixelFormat, ty: ChannelType) -> Result<(), BitmapError> {
    if format.uniform_channel_type() == Some(ty) {
        Ok(())
    } else {
        Err(BitmapError::PixelFormatMismatch {
            expected: format.component_count() * ty.byte_size(),
            actual: format.byte_count(),
        })
    }
}

fn check_pair(
    bytes: PixelFormat,
    floats: PixelFormat,
    width: (usize, usize),
    height: (usize, usize),
) -> Result<(), BitmapError> {
    if width.0 != width.1 || height.0 != height.1 {
        return Err(BitmapError::DimensionMismatch);
    }
    check_uniform(bytes, ChannelType::U8)?;
    check_uniform(floats, ChannelType::F32)?;
    if bytes.component_count() != floats.component_count() {
        return Err(BitmapError::PixelFormatMismatch {
            expected: bytes.component_count() * ChannelType::F32.byte_size(),
            actual: floats.byte_count(),
        });
    }
    Ok(())
}

/// Convert an all-`u8` view into an all-`f32` view with the same component
/// count, component by component, optionally clamping.
///
/// # Errors
///
/// [`BitmapError::DimensionMismatch`], [`BitmapError::PixelFormatMismatch`]
/// when the formats aren't all-`u8` / all-`f32` with equal component
/// counts, or [`BitmapError::Misaligned`] if `dst` isn't `f32`-aligned.
pub fn copy_bytes_to_floats(
    src: BitmapRef<'_>,
    dst: &mut BitmapMut<'_>,
    transform: ScaleOffset,
    range: Option<ValueRange>,
) -> Result<(), BitmapError> {
    check_pair(
        src.format(),
        dst.format(),
        (src.width(), dst.width()),
        (src.height(), dst.height()),
    )?;
    check_alignment::<f32>(dst.as_bytes(), &dst.layout())?;
    for (s, d) in src.rows().zip(dst.rows_mut()) {
        let d: &mut [f32] = bytemuck::cast_slice_mut(d);
        match range {
            Some(r) => bytes_to_floats_clamped(s, d, transform, r)?,
            None => bytes_to_floats(s, d, transform)?,
        }
    }
    Ok(())
}

/// Convert an all-`f32` view into an all-`u8` view with the same component
/// count. Results are rounded and saturated into `[0, 255]` after the
/// optional clamp.
///
/// # Errors
///
/// As [`copy_bytes_to_floats`], with `src` needing `f32` alignment.
pub fn copy_floats_to_bytes(
    src: BitmapRef<'_>,
    dst: &mut BitmapMut<'_>,
    transform: ScaleOffset,
    range: Option<ValueRange>,
) -> Result<(), BitmapError> {
    check_pair(
        dst.format(),
        src.format(),
        (src.width(), dst.width()),
        (src.height(), dst.height()),
    )?;
    check_alignment::<f32>(src.as_bytes(), &src.layout())?;
    for (s, d) in src.rows().zip(dst.rows_mut()) {
        let s: &[f32] = bytemuck::cast_slice(s);
        match range {
            Some(r) => floats_to_bytes_clamped(s, d, transform, r)?,
            None => floats_to_bytes(s, d, transform)?,
        }
    }
    Ok(())
}

// ===========================================================================
// Reductions
// ===========================================================================

/// Per-component extrema.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMax<const N: usize> {
    /// Smallest value seen per component.
    pub min: [f32; N],
    /// Largest value seen per component.
    pub max: [f32; N],
}

impl<const N: usize> MinMax<N> {
    /// The identity for [`merge`](Self::merge): `+inf` minima, `-inf` maxima.
    pub const EMPTY: Self = Self {
        min: [f32::INFINITY; N],
        max: [f32::NEG_INFINITY; N],
    };

    /// Fold one pixel in. NaN components are ignored.
    #[inline]
    pub fn update(&mut self, px: &[f32; N]) {
        for ((lo, hi), &v) in self.min.iter_mut().zip(self.max.iter_mut()).zip(px) {
            *lo = lo.min(v);
            *hi = hi.max(v);
        }
    }

    /// Combine two partial results.
    pub fn merge(mut self, other: &Self) -> Self {
        for i in 0..N {
            self.min[i] = self.min[i].min(other.min[i]);
            self.max[i] = self.max[i].max(other.max[i]);
        }
        self
    }
}

/// Minimum and maximum of each of the `N` components over every pixel of
/// an all-`f32` view, row by row.
///
/// An empty view yields [`MinMax::EMPTY`].
///
/// # Errors
///
/// [`BitmapError::PixelFormatMismatch`] unless the format is `N` `f32`
/// components, [`BitmapError::Misaligned`] if rows aren't `f32`-aligned.
pub fn min_max<const N: usize>(view: BitmapRef<'_>) -> Result<MinMax<N>, BitmapError> {
    let format = view.format();
    if format.uniform_channel_type() != Some(ChannelType::F32) || format.component_count() != N {
        return Err(BitmapError::PixelFormatMismatch {
            expected: N * ChannelType::F32.byte_size(),
            actual: format.byte_count(),
        });
    }
    check_alignment::<f32>(view.as_bytes(), &view.layout())?;
    let mut acc = MinMax::EMPTY;
    for row in view.rows() {
        let floats: &[f32] = bytemuck::cast_slice(row);
        for px in floats.chunks_exact(N) {
            if let Ok(px) = <&[f32; N]>::try_from(px) {
                acc.update(px);
            }
        }
    }
    Ok(acc)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BitmapLayout;
    use alloc::vec;
    use alloc::vec::Vec;

    const LENGTHS: &[usize] = &[0, 1, 3, 4, 5, 8, 13, 64, 67];

    #[test]
    fn byte_float_roundtrip_within_one() {
        let src: Vec<u8> = (0..=255).collect();
        let mut floats = vec![0f32; 256];
        let mut back = vec![0u8; 256];
        bytes_to_floats(&src, &mut floats, ScaleOffset::BYTE_TO_UNIT).unwrap();
        floats_to_bytes(&floats, &mut back, ScaleOffset::UNIT_TO_BYTE).unwrap();
        for (a, b) in src.iter().zip(&back) {
            assert!(a.abs_diff(*b) <= 1, "{a} -> {b}");
        }
    }

    #[test]
    fn remainder_lanes_match_full_lanes() {
        let t = ScaleOffset::new(-10.0, 0.5);
        for &n in LENGTHS {
            let src: Vec<u8> = (0..n).map(|i| (i * 37 % 256) as u8).collect();
            let mut dst = vec![0f32; n];
            bytes_to_floats(&src, &mut dst, t).unwrap();
            for (s, d) in src.iter().zip(&dst) {
                assert_eq!(*d, (f32::from(*s) - 10.0) * 0.5, "n={n}");
            }
        }
    }

    #[test]
    fn clamped_variants_clamp() {
        let src = [0u8, 100, 200, 255, 50];
        let mut dst = [0f32; 5];
        bytes_to_floats_clamped(&src, &mut dst, ScaleOffset::IDENTITY, ValueRange::new(60.0, 210.0)).unwrap();
        assert_eq!(dst, [60.0, 100.0, 200.0, 210.0, 60.0]);

        let floats = [-5.0f32, 0.25, 0.5, 1.5, f32::NAN];
        let mut bytes = [9u8; 5];
        floats_to_bytes_clamped(&floats, &mut bytes, ScaleOffset::UNIT_TO_BYTE, ValueRange::BYTE).unwrap();
        assert_eq!(bytes, [0, 64, 128, 255, 0]);
    }

    #[test]
    fn unclamped_float_to_byte_saturates() {
        let floats = [-3.0f32, 300.0, 127.5, 127.49];
        let mut bytes = [0u8; 4];
        floats_to_bytes(&floats, &mut bytes, ScaleOffset::IDENTITY).unwrap();
        assert_eq!(bytes, [0, 255, 128, 127]);
    }

    #[test]
    fn length_mismatch() {
        let mut dst = [0f32; 3];
        assert_eq!(
            bytes_to_floats(&[1, 2], &mut dst, ScaleOffset::IDENTITY),
            Err(BitmapError::DimensionMismatch)
        );
    }

    #[test]
    fn in_place_kernels() {
        for &n in LENGTHS {
            let mut buf: Vec<f32> = (0..n).map(|i| i as f32).collect();
            transform_in_place(&mut buf, ScaleOffset::new(1.0, 2.0));
            assert!(buf.iter().enumerate().all(|(i, &v)| v == (i as f32 + 1.0) * 2.0));
            transform_in_place_clamped(&mut buf, ScaleOffset::IDENTITY, ValueRange::new(0.0, 10.0));
            assert!(buf.iter().all(|&v| v <= 10.0));
            multiply_add_in_place(&mut buf, 0.5, 1.0);
            assert!(buf.iter().all(|&v| v <= 6.0));
            clamp_in_place(&mut buf, ValueRange::new(2.0, 3.0));
            assert!(buf.iter().all(|&v| (2.0..=3.0).contains(&v)));
        }
    }

    #[test]
    fn inverse_undoes_transform() {
        let t = ScaleOffset::new(3.0, 4.0);
        let v = 7.0f32;
        assert!((t.inverse().apply(t.apply(v)) - v).abs() < 1e-5);
    }

    #[test]
    fn view_roundtrip() {
        let bytes: Vec<u8> = (0..24).map(|i| i * 10).collect();
        let src = BitmapRef::new(&bytes, BitmapLayout::new(4, 2, PixelFormat::RGB24)).unwrap();
        let mut floats = vec![0f32; 24];
        let mut fview = BitmapMut::new(bytemuck::cast_slice_mut(&mut floats), BitmapLayout::new(4, 2, PixelFormat::RGBF32)).unwrap();
        copy_bytes_to_floats(src, &mut fview, ScaleOffset::BYTE_TO_UNIT, None).unwrap();

        let mut out = vec![0u8; 24];
        let mut bview = BitmapMut::new(&mut out, BitmapLayout::new(4, 2, PixelFormat::RGB24)).unwrap();
        copy_floats_to_bytes(fview.as_ref(), &mut bview, ScaleOffset::UNIT_TO_BYTE, Some(ValueRange::BYTE)).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn view_kernels_check_formats() {
        let bytes = vec![0u8; 16];
        let src = BitmapRef::new(&bytes, BitmapLayout::new(4, 1, PixelFormat::RGBA32)).unwrap();
        let mut floats = vec![0f32; 12];
        let mut dst = BitmapMut::new(bytemuck::cast_slice_mut(&mut floats), BitmapLayout::new(4, 1, PixelFormat::RGBF32)).unwrap();
        assert_eq!(
            copy_bytes_to_floats(src, &mut dst, ScaleOffset::IDENTITY, None),
            Err(BitmapError::PixelFormatMismatch {
                expected: 16,
                actual: 12
            })
        );
        let small = BitmapRef::new(&bytes, BitmapLayout::new(3, 1, PixelFormat::RGB24)).unwrap();
        assert_eq!(
            copy_bytes_to_floats(small, &mut dst, ScaleOffset::IDENTITY, None),
            Err(BitmapError::DimensionMismatch)
        );
    }

    #[test]
    fn min_max_per_component() {
        let px: Vec<f32> = vec![
            0.5, -1.0, 2.0, //
            0.1, 4.0, 2.0, //
            f32::NAN, 0.0, -3.0, //
            0.9, 1.0, 1.0,
        ];
        let layout = BitmapLayout::new(2, 2, PixelFormat::RGBF32);
        let view = BitmapRef::new(bytemuck::cast_slice(&px), layout).unwrap();
        let mm = min_max::<3>(view).unwrap();
        assert_eq!(mm.min, [0.1, -1.0, -3.0]);
        assert_eq!(mm.max, [0.9, 4.0, 2.0]);
        assert!(min_max::<4>(view).is_err());
    }

    #[test]
    fn min_max_skips_padding_and_handles_empty() {
        let px = vec![1.0f32, 2.0, 100.0, 3.0, 4.0];
        let layout = BitmapLayout::new_stride(2, 2, PixelFormat::GRAYF32, 12).unwrap();
        let view = BitmapRef::from_pixels(&px, layout).unwrap();
        let mm = min_max::<1>(view).unwrap();
        assert_eq!((mm.min, mm.max), ([1.0], [4.0]));

        let empty = BitmapRef::new(&[], BitmapLayout::new(0, 0, PixelFormat::GRAYF32)).unwrap();
        assert_eq!(min_max::<1>(empty).unwrap(), MinMax::EMPTY);
    }

    #[test]
    fn merge_combines() {
        let a = MinMax { min: [0.0], max: [1.0] };
        let b = MinMax { min: [-1.0], max: [0.5] };
        assert_eq!(a.merge(&b), MinMax { min: [-1.0], max: [1.0] });
    }
}
