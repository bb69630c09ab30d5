//! Borrowed views typed by pixel.
//!
//! [`PixelsRef`] and [`PixelsMut`] wrap the untyped views and cast each row
//! to `&[P]` on access. Size and alignment are validated once at
//! construction, so the per-row casts cannot fail.

use core::fmt;
use core::marker::PhantomData;

use crate::sampler::{self, Boundary};
use crate::span::check_alignment;
use crate::{BitmapError, BitmapLayout, BitmapMut, BitmapRef, Pixel, PixelBitmap, PixelFormat, Rect};

/// Rows of a zero-width view may sit at any address; only non-empty rows
/// carry the alignment checked at construction.
#[inline]
fn cast_row<P: Pixel>(row: &[u8]) -> &[P] {
    if row.is_empty() { &[] } else { bytemuck::cast_slice(row) }
}

#[inline]
fn cast_row_mut<P: Pixel>(row: &mut [u8]) -> &mut [P] {
    if row.is_empty() { &mut [] } else { bytemuck::cast_slice_mut(row) }
}

/// Canonical format of `P`, for constructors that only get dimensions.
pub(crate) fn canonical_format<P: Pixel>() -> Result<PixelFormat, BitmapError> {
    P::FORMAT.ok_or(BitmapError::InvalidFormat)
}

// ---------------------------------------------------------------------------
// PixelsRef
// ---------------------------------------------------------------------------

/// Read-only view of strided pixels of type `P`.
pub struct PixelsRef<'a, P> {
    bytes: BitmapRef<'a>,
    _pixel: PhantomData<&'a [P]>,
}

impl<P> Clone for PixelsRef<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for PixelsRef<'_, P> {}

impl<'a, P: Pixel> PixelsRef<'a, P> {
    /// Packed view of `width * height` pixels in `P`'s canonical format.
    ///
    /// # Errors
    ///
    /// [`BitmapError::InvalidFormat`] if `P` has no canonical format,
    /// [`BitmapError::InsufficientData`] if `pixels` is too short.
    pub fn new(pixels: &'a [P], width: usize, height: usize) -> Result<Self, BitmapError> {
        let layout = BitmapLayout::try_new_stride(width, height, canonical_format::<P>()?, 0)?;
        Self::with_layout(pixels, layout)
    }

    /// Like [`new`](Self::new) with a row stride counted in pixels.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new), plus [`BitmapError::StrideTooSmall`] and
    /// [`BitmapError::SizeOverflow`] for strides past `usize`.
    pub fn new_stride(
        pixels: &'a [P],
        width: usize,
        height: usize,
        stride_pixels: usize,
    ) -> Result<Self, BitmapError> {
        let format = canonical_format::<P>()?;
        let stride = stride_pixels.checked_mul(size_of::<P>()).ok_or(BitmapError::SizeOverflow)?;
        let layout = BitmapLayout::try_new_stride(width, height, format, stride)?;
        Self::with_layout(pixels, layout)
    }

    /// View `pixels` through an arbitrary compatible layout.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`], [`BitmapError::InsufficientData`]
    /// or [`BitmapError::Misaligned`] (stride not a multiple of `P`'s alignment).
    pub fn with_layout(pixels: &'a [P], layout: BitmapLayout) -> Result<Self, BitmapError> {
        Self::from_untyped(BitmapRef::from_pixels(pixels, layout)?)
    }

    pub(crate) fn from_untyped(bytes: BitmapRef<'a>) -> Result<Self, BitmapError> {
        bytes.format().check_compatible::<P>()?;
        check_alignment::<P>(bytes.as_bytes(), &bytes.layout())?;
        Ok(Self {
            bytes,
            _pixel: PhantomData,
        })
    }

    /// Layout of this view.
    #[inline]
    pub fn layout(&self) -> BitmapLayout {
        self.bytes.layout()
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.bytes.width()
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.bytes.height()
    }

    /// No pixels to address.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The same memory without the pixel type.
    #[inline]
    pub fn as_untyped(&self) -> BitmapRef<'a> {
        self.bytes
    }

    /// Row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [P] {
        cast_row(self.bytes.scanline(y))
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the view.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> P {
        let row = self.row(y);
        assert!(x < row.len(), "column index {x} out of bounds (width: {})", row.len());
        row[x]
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &'a [P]> + use<'a, P> {
        self.bytes.rows().map(cast_row)
    }

    /// Every pixel in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = P> + use<'a, P> {
        self.rows().flat_map(|row| row.iter().copied())
    }

    /// Sub-rectangle sharing this view's memory.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfBounds`] if `rect` isn't inside the view.
    pub fn slice(&self, rect: Rect) -> Result<Self, BitmapError> {
        Ok(Self {
            bytes: self.bytes.slice(rect)?,
            _pixel: PhantomData,
        })
    }

    /// Pixel at signed coordinates, resolving the edge with `boundary`.
    ///
    /// `None` only when the view is empty and the policy has no default.
    pub fn sample(&self, x: isize, y: isize, boundary: Boundary<P>) -> Option<P> {
        sampler::sample(*self, x, y, boundary)
    }

    /// Copy into a new packed owned bitmap.
    pub fn to_bitmap(&self) -> PixelBitmap<P> {
        PixelBitmap::from_untyped_unchecked(self.bytes.to_bitmap())
    }
}

impl<P> fmt::Debug for PixelsRef<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelsRef")
            .field("pixel", &core::any::type_name::<P>())
            .field("layout", &self.bytes.layout())
            .finish()
    }
}

impl<P: Pixel + PartialEq> PartialEq for PixelsRef<'_, P> {
    /// Same dimensions and equal visible pixels.
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.rows().zip(other.rows()).all(|(a, b)| a == b)
    }
}

// ---------------------------------------------------------------------------
// PixelsMut
// ---------------------------------------------------------------------------

/// Read-write view of strided pixels of type `P`.
pub struct PixelsMut<'a, P> {
    bytes: BitmapMut<'a>,
    _pixel: PhantomData<&'a mut [P]>,
}

impl<'a, P: Pixel> PixelsMut<'a, P> {
    /// Packed mutable view of `width * height` pixels in `P`'s canonical format.
    ///
    /// # Errors
    ///
    /// [`BitmapError::InvalidFormat`] if `P` has no canonical format,
    /// [`BitmapError::InsufficientData`] if `pixels` is too short.
    pub fn new(pixels: &'a mut [P], width: usize, height: usize) -> Result<Self, BitmapError> {
        let layout = BitmapLayout::try_new_stride(width, height, canonical_format::<P>()?, 0)?;
        Self::with_layout(pixels, layout)
    }

    /// Like [`new`](Self::new) with a row stride counted in pixels.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new), plus [`BitmapError::StrideTooSmall`] and
    /// [`BitmapError::SizeOverflow`] for strides past `usize`.
    pub fn new_stride(
        pixels: &'a mut [P],
        width: usize,
        height: usize,
        stride_pixels: usize,
    ) -> Result<Self, BitmapError> {
        let format = canonical_format::<P>()?;
        let stride = stride_pixels.checked_mul(size_of::<P>()).ok_or(BitmapError::SizeOverflow)?;
        let layout = BitmapLayout::try_new_stride(width, height, format, stride)?;
        Self::with_layout(pixels, layout)
    }

    /// View `pixels` through an arbitrary compatible layout.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`], [`BitmapError::InsufficientData`]
    /// or [`BitmapError::Misaligned`].
    pub fn with_layout(pixels: &'a mut [P], layout: BitmapLayout) -> Result<Self, BitmapError> {
        Self::from_untyped(BitmapMut::from_pixels(pixels, layout)?)
    }

    pub(crate) fn from_untyped(bytes: BitmapMut<'a>) -> Result<Self, BitmapError> {
        bytes.format().check_compatible::<P>()?;
        check_alignment::<P>(bytes.as_bytes(), &bytes.layout())?;
        Ok(Self {
            bytes,
            _pixel: PhantomData,
        })
    }

    /// Layout of this view.
    #[inline]
    pub fn layout(&self) -> BitmapLayout {
        self.bytes.layout()
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.bytes.width()
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.bytes.height()
    }

    /// No pixels to address.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read-only view of the same memory.
    #[inline]
    pub fn as_ref(&self) -> PixelsRef<'_, P> {
        PixelsRef {
            bytes: self.bytes.as_ref(),
            _pixel: PhantomData,
        }
    }

    /// Give up write access for the rest of `'a`.
    #[inline]
    pub fn into_ref(self) -> PixelsRef<'a, P> {
        PixelsRef {
            bytes: self.bytes.into_ref(),
            _pixel: PhantomData,
        }
    }

    /// Shorter-lived mutable view of the same memory.
    #[inline]
    pub fn reborrow(&mut self) -> PixelsMut<'_, P> {
        PixelsMut {
            bytes: self.bytes.reborrow(),
            _pixel: PhantomData,
        }
    }

    /// The same memory without the pixel type.
    #[inline]
    pub fn as_untyped_mut(&mut self) -> BitmapMut<'_> {
        self.bytes.reborrow()
    }

    /// Drop the pixel type for the rest of `'a`.
    #[inline]
    pub fn into_untyped(self) -> BitmapMut<'a> {
        self.bytes
    }

    /// Row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &[P] {
        cast_row(self.bytes.scanline(y))
    }

    /// Row `y`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [P] {
        cast_row_mut(self.bytes.scanline_mut(y))
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the view.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> P {
        self.as_ref().get(x, y)
    }

    /// Overwrite the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the view.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: P) {
        let row = self.row_mut(y);
        assert!(x < row.len(), "column index {x} out of bounds (width: {})", row.len());
        row[x] = value;
    }

    /// Mutable rows top to bottom.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [P]> + '_ {
        self.bytes.rows_mut().map(cast_row_mut)
    }

    /// Set every pixel to `value`.
    pub fn fill(&mut self, value: P) {
        for row in self.rows_mut() {
            row.fill(value);
        }
    }

    /// Mutable sub-rectangle of this view.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfBounds`] if `rect` isn't inside the view.
    pub fn slice(&mut self, rect: Rect) -> Result<PixelsMut<'_, P>, BitmapError> {
        Ok(PixelsMut {
            bytes: self.bytes.slice(rect)?,
            _pixel: PhantomData,
        })
    }

    /// Like [`slice`](Self::slice), keeping the full lifetime.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfBounds`] if `rect` isn't inside the view.
    pub fn into_slice(self, rect: Rect) -> Result<PixelsMut<'a, P>, BitmapError> {
        Ok(PixelsMut {
            bytes: self.bytes.into_slice(rect)?,
            _pixel: PhantomData,
        })
    }

    /// Blit `src` with its top-left corner at `(x, y)`, clipped to this view.
    ///
    /// # Errors
    ///
    /// [`BitmapError::UnsupportedFormatPair`] if the formats have no converter.
    pub fn set_pixels(&mut self, x: isize, y: isize, src: BitmapRef<'_>) -> Result<(), BitmapError> {
        self.bytes.set_pixels(x, y, src)
    }

    /// Copy an equally sized `src` of the same pixel type.
    ///
    /// # Errors
    ///
    /// [`BitmapError::DimensionMismatch`] if the sizes differ.
    pub fn copy_from(&mut self, src: PixelsRef<'_, P>) -> Result<(), BitmapError> {
        if src.width() != self.width() || src.height() != self.height() {
            return Err(BitmapError::DimensionMismatch);
        }
        for (d, s) in self.rows_mut().zip(src.rows()) {
            d.copy_from_slice(s);
        }
        Ok(())
    }

    /// Copy into a new packed owned bitmap.
    pub fn to_bitmap(&self) -> PixelBitmap<P> {
        self.as_ref().to_bitmap()
    }
}

impl<'a, P: Pixel> From<PixelsMut<'a, P>> for PixelsRef<'a, P> {
    fn from(view: PixelsMut<'a, P>) -> Self {
        view.into_ref()
    }
}

impl<P> fmt::Debug for PixelsMut<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelsMut")
            .field("pixel", &core::any::type_name::<P>())
            .field("layout", &self.bytes.layout())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use rgb::{Bgr, Rgb, Rgba};

    #[test]
    fn new_uses_canonical_format() {
        let px = vec![Rgb::new(1u8, 2, 3); 6];
        let view = PixelsRef::new(&px, 3, 2).unwrap();
        assert_eq!(view.layout().format(), PixelFormat::RGB24);
        assert_eq!(view.layout().stride(), 9);
    }

    #[test]
    fn size_only_types_need_a_layout() {
        let px = vec![[0u8; 3]; 4];
        assert_eq!(
            PixelsRef::new(&px, 2, 2).unwrap_err(),
            BitmapError::InvalidFormat
        );
        let layout = BitmapLayout::new(2, 2, PixelFormat::BGR24);
        assert!(PixelsRef::with_layout(&px, layout).is_ok());
    }

    #[test]
    fn untyped_to_typed_checks_size() {
        let data = vec![0u8; 12];
        let bytes = BitmapRef::new(&data, BitmapLayout::new(2, 2, PixelFormat::RGB24)).unwrap();
        assert_eq!(
            bytes.as_typed::<Rgba<u8>>().unwrap_err(),
            BitmapError::PixelFormatMismatch {
                expected: 3,
                actual: 4
            }
        );
        assert!(bytes.as_typed::<Bgr<u8>>().is_ok());
    }

    #[test]
    fn misaligned_stride_is_rejected() {
        let data = vec![0f32; 16];
        let bytes: &[u8] = bytemuck::cast_slice(&data);
        let layout = BitmapLayout::new_stride(2, 2, PixelFormat::GRAYF32, 10).unwrap();
        let view = BitmapRef::new(bytes, layout).unwrap();
        assert_eq!(view.as_typed::<f32>().unwrap_err(), BitmapError::Misaligned);
        let odd = BitmapRef::new(&bytes[1..], BitmapLayout::new(2, 2, PixelFormat::GRAYF32)).unwrap();
        assert_eq!(odd.as_typed::<f32>().unwrap_err(), BitmapError::Misaligned);
    }

    #[test]
    fn strided_rows_and_pixels() {
        let px: Vec<u16> = (0..12).collect();
        let view = PixelsRef::new_stride(&px, 3, 3, 4).unwrap();
        assert_eq!(view.row(1), &[4, 5, 6]);
        assert_eq!(view.get(2, 2), 10);
        let all: Vec<u16> = view.pixels().collect();
        assert_eq!(all, vec![0, 1, 2, 4, 5, 6, 8, 9, 10]);
    }

    #[test]
    fn huge_strides_are_errors() {
        let px = vec![0u16; 4];
        assert_eq!(
            PixelsRef::new_stride(&px, 2, 2, usize::MAX).unwrap_err(),
            BitmapError::SizeOverflow
        );
        assert_eq!(
            PixelsRef::new_stride(&px, 2, 2, usize::MAX / 2).unwrap_err(),
            BitmapError::SizeOverflow
        );
        // A single row never steps by the stride.
        assert!(PixelsRef::new_stride(&px, 2, 1, usize::MAX / 2).is_ok());
        let mut out = vec![0u16; 4];
        assert_eq!(
            PixelsMut::new_stride(&mut out, 2, 2, usize::MAX).unwrap_err(),
            BitmapError::SizeOverflow
        );
        assert_eq!(
            PixelsRef::<u8>::new(&[], usize::MAX, 2).unwrap_err(),
            BitmapError::SizeOverflow
        );
    }

    #[test]
    fn empty_views_reinterpret_as_typed() {
        let empty = BitmapRef::empty().as_typed::<f32>().unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.rows().count(), 0);

        let zero_width: PixelsRef<'_, Rgba<f32>> = PixelsRef::new(&[], 0, 3).unwrap();
        assert!(zero_width.is_empty());
        assert!(zero_width.row(2).is_empty());

        let mut none: [u8; 0] = [];
        let bytes = BitmapMut::new(&mut none, BitmapLayout::new(0, 2, PixelFormat::RGBAF32)).unwrap();
        let mut typed = bytes.into_typed::<Rgba<f32>>().unwrap();
        typed.fill(Rgba::new(1.0, 1.0, 1.0, 1.0));
        assert!(typed.row_mut(1).is_empty());
    }

    #[test]
    fn set_and_fill() {
        let mut px = vec![Rgba::new(0u8, 0, 0, 0); 4];
        let mut view = PixelsMut::new(&mut px, 2, 2).unwrap();
        view.fill(Rgba::new(1, 2, 3, 4));
        view.set(1, 1, Rgba::new(9, 9, 9, 9));
        assert_eq!(view.get(0, 1), Rgba::new(1, 2, 3, 4));
        assert_eq!(px[3], Rgba::new(9, 9, 9, 9));
    }

    #[test]
    #[should_panic(expected = "column index 2 out of bounds")]
    fn get_past_width_panics() {
        let px = vec![0u8; 4];
        let view = PixelsRef::new(&px, 2, 2).unwrap();
        let _ = view.get(2, 0);
    }

    #[test]
    fn slice_and_copy() {
        let src: Vec<u8> = (0..16).collect();
        let src = PixelsRef::new(&src, 4, 4).unwrap();
        let inner = src.slice(Rect::new(1, 1, 2, 2)).unwrap();
        let mut out = vec![0u8; 4];
        let mut dst = PixelsMut::new(&mut out, 2, 2).unwrap();
        dst.copy_from(inner).unwrap();
        assert_eq!(out, vec![5, 6, 9, 10]);
    }

    #[test]
    fn copy_from_rejects_size_mismatch() {
        let src = vec![0u8; 4];
        let src = PixelsRef::new(&src, 2, 2).unwrap();
        let mut out = vec![0u8; 6];
        let mut dst = PixelsMut::new(&mut out, 3, 2).unwrap();
        assert_eq!(dst.copy_from(src), Err(BitmapError::DimensionMismatch));
    }

    #[test]
    fn equality_ignores_padding() {
        let a = vec![1u8, 2, 3, 4];
        let b = vec![1u8, 2, 99, 3, 4];
        let a = PixelsRef::new(&a, 2, 2).unwrap();
        let b = PixelsRef::new_stride(&b, 2, 2, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn demotion_keeps_memory() {
        let mut px = vec![7u8; 4];
        let view = PixelsMut::new(&mut px, 2, 2).unwrap();
        let read: PixelsRef<'_, u8> = view.into();
        assert_eq!(read.get(1, 1), 7);
    }
}
