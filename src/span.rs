//! Borrowed untyped views.
//!
//! [`BitmapRef`] and [`BitmapMut`] pair a [`BitmapLayout`] with a byte slice
//! that is exactly `total_bytes` long. The borrow checker bounds their
//! lifetime to the memory they came from, and a `BitmapRef` can never be
//! turned back into a `BitmapMut`.

use alloc::vec::Vec;
use core::fmt;

use crate::convert::copy_pixels;
use crate::{BitmapError, BitmapLayout, Bitmap, Pixel, PixelFormat, PixelsMut, PixelsRef, Rect};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Number of rows a row iterator yields: none for layouts without pixels.
#[inline]
fn iter_rows(layout: &BitmapLayout) -> usize {
    if layout.is_empty() { 0 } else { layout.height() }
}

fn check_value(layout: &BitmapLayout, value: &[u8]) -> Result<(), BitmapError> {
    if value.len() != layout.pixel_bytes() {
        return Err(BitmapError::PixelFormatMismatch {
            expected: layout.pixel_bytes(),
            actual: value.len(),
        });
    }
    Ok(())
}

/// Overlap of a `src_w x src_h` source placed at `(x, y)` with a
/// `dst_w x dst_h` destination, as `(source rect, destination rect)`.
fn clip_blit(
    x: isize,
    y: isize,
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    dst_h: usize,
) -> Option<(Rect, Rect)> {
    fn axis(at: isize, src: usize, dst: usize) -> Option<(usize, usize, usize)> {
        let skip = at.min(0).unsigned_abs();
        let start = at.max(0).unsigned_abs();
        if skip >= src || start >= dst {
            return None;
        }
        let len = (src - skip).min(dst - start);
        Some((skip, start, len))
    }
    let (sx, dx, w) = axis(x, src_w, dst_w)?;
    let (sy, dy, h) = axis(y, src_h, dst_h)?;
    Some((Rect::new(sx, sy, w, h), Rect::new(dx, dy, w, h)))
}

pub(crate) fn check_alignment<P: Pixel>(
    data: &[u8],
    layout: &BitmapLayout,
) -> Result<(), BitmapError> {
    check_address_alignment::<P>(data.as_ptr().addr(), layout)
}

/// Rows starting at `addr` can be read as `P`. A layout with no bytes has
/// nothing to read and is always aligned.
pub(crate) fn check_address_alignment<P: Pixel>(
    addr: usize,
    layout: &BitmapLayout,
) -> Result<(), BitmapError> {
    if layout.total_bytes() == 0 {
        return Ok(());
    }
    let align = align_of::<P>();
    if addr % align != 0 || (layout.height() > 1 && layout.stride() % align != 0) {
        return Err(BitmapError::Misaligned);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// BitmapRef
// ---------------------------------------------------------------------------

/// Read-only view of strided pixel bytes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BitmapRef<'a> {
    data: &'a [u8],
    layout: BitmapLayout,
}

impl<'a> BitmapRef<'a> {
    /// View `data` through `layout`. Bytes past `total_bytes` are ignored.
    ///
    /// # Errors
    ///
    /// [`BitmapError::InsufficientData`] if `data` is shorter than the layout.
    pub fn new(data: &'a [u8], layout: BitmapLayout) -> Result<Self, BitmapError> {
        layout.check_len(data.len())?;
        Ok(Self::from_parts(&data[..layout.total_bytes()], layout))
    }

    /// View a slice of typed pixels through `layout`.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] if `P` doesn't fit the layout's
    /// format, [`BitmapError::InsufficientData`] if the slice is too short.
    pub fn from_pixels<P: Pixel>(pixels: &'a [P], layout: BitmapLayout) -> Result<Self, BitmapError> {
        layout.format().check_compatible::<P>()?;
        Self::new(bytemuck::cast_slice(pixels), layout)
    }

    /// A view with no pixels.
    pub const fn empty() -> Self {
        Self {
            data: &[],
            layout: BitmapLayout::EMPTY,
        }
    }

    #[inline]
    pub(crate) fn from_parts(data: &'a [u8], layout: BitmapLayout) -> Self {
        debug_assert_eq!(data.len(), layout.total_bytes());
        Self { data, layout }
    }

    /// Layout of this view.
    #[inline]
    pub fn layout(&self) -> BitmapLayout {
        self.layout
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.layout.width()
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.layout.height()
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.layout.format()
    }

    /// No pixels to address.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// The underlying bytes, `total_bytes` long (padding between rows included).
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Visible bytes of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn scanline(&self, y: usize) -> &'a [u8] {
        &self.data[self.layout.scanline_range(y)]
    }

    /// Bytes of pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the view.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &'a [u8] {
        &self.data[self.layout.pixel_range(x, y)]
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &'a [u8]> + use<'a> {
        let data = self.data;
        let layout = self.layout;
        (0..iter_rows(&layout)).map(move |y| &data[layout.scanline_range(y)])
    }

    /// Sub-rectangle sharing this view's memory.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfBounds`] if `rect` isn't inside the view.
    pub fn slice(&self, rect: Rect) -> Result<BitmapRef<'a>, BitmapError> {
        let (offset, layout) = self.layout.slice(rect)?;
        Ok(Self::from_parts(
            &self.data[offset..offset + layout.total_bytes()],
            layout,
        ))
    }

    /// Reinterpret as typed pixels.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] if `P` has the wrong size,
    /// [`BitmapError::Misaligned`] if rows aren't aligned for `P`.
    pub fn as_typed<P: Pixel>(&self) -> Result<PixelsRef<'a, P>, BitmapError> {
        PixelsRef::from_untyped(*self)
    }

    /// Same-layout view with a different format of equal byte size.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] if the byte sizes differ.
    pub fn reinterpret(&self, format: PixelFormat) -> Result<BitmapRef<'a>, BitmapError> {
        let layout = self.layout.with_pixel_format_same_size(format)?;
        Ok(Self::from_parts(self.data, layout))
    }

    /// Copy into a new packed owned bitmap.
    pub fn to_bitmap(&self) -> Bitmap {
        let mut out = Bitmap::new(self.layout.with_size(self.width(), self.height()));
        let mut dst = out.to_mut();
        for (d, s) in dst.rows_mut().zip(self.rows()) {
            d.copy_from_slice(s);
        }
        out
    }

    /// Copy the visible bytes into a packed `Vec`.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width() * self.layout.pixel_bytes() * self.height());
        for row in self.rows() {
            out.extend_from_slice(row);
        }
        out
    }
}

impl Default for BitmapRef<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for BitmapRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapRef")
            .field("layout", &self.layout)
            .field("len", &self.data.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// BitmapMut
// ---------------------------------------------------------------------------

/// Read-write view of strided pixel bytes.
pub struct BitmapMut<'a> {
    data: &'a mut [u8],
    layout: BitmapLayout,
}

impl<'a> BitmapMut<'a> {
    /// View `data` through `layout`. Bytes past `total_bytes` are ignored.
    ///
    /// # Errors
    ///
    /// [`BitmapError::InsufficientData`] if `data` is shorter than the layout.
    pub fn new(data: &'a mut [u8], layout: BitmapLayout) -> Result<Self, BitmapError> {
        layout.check_len(data.len())?;
        Ok(Self::from_parts(&mut data[..layout.total_bytes()], layout))
    }

    /// View a mutable slice of typed pixels through `layout`.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] if `P` doesn't fit the layout's
    /// format, [`BitmapError::InsufficientData`] if the slice is too short.
    pub fn from_pixels<P: Pixel>(
        pixels: &'a mut [P],
        layout: BitmapLayout,
    ) -> Result<Self, BitmapError> {
        layout.format().check_compatible::<P>()?;
        Self::new(bytemuck::cast_slice_mut(pixels), layout)
    }

    #[inline]
    pub(crate) fn from_parts(data: &'a mut [u8], layout: BitmapLayout) -> Self {
        debug_assert_eq!(data.len(), layout.total_bytes());
        Self { data, layout }
    }

    /// Layout of this view.
    #[inline]
    pub fn layout(&self) -> BitmapLayout {
        self.layout
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.layout.width()
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.layout.height()
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.layout.format()
    }

    /// No pixels to address.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Read-only view of the same memory.
    #[inline]
    pub fn as_ref(&self) -> BitmapRef<'_> {
        BitmapRef::from_parts(self.data, self.layout)
    }

    /// Give up write access for the rest of `'a`.
    #[inline]
    pub fn into_ref(self) -> BitmapRef<'a> {
        BitmapRef::from_parts(self.data, self.layout)
    }

    /// Shorter-lived mutable view of the same memory.
    #[inline]
    pub fn reborrow(&mut self) -> BitmapMut<'_> {
        BitmapMut::from_parts(self.data, self.layout)
    }

    /// The underlying bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.data
    }

    /// The underlying bytes, mutably. Writing padding between rows is allowed.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.data
    }

    /// Visible bytes of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn scanline(&self, y: usize) -> &[u8] {
        &self.data[self.layout.scanline_range(y)]
    }

    /// Visible bytes of row `y`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn scanline_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.data[self.layout.scanline_range(y)]
    }

    /// Bytes of pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the view.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        &self.data[self.layout.pixel_range(x, y)]
    }

    /// Bytes of pixel `(x, y)`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the view.
    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        &mut self.data[self.layout.pixel_range(x, y)]
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.as_ref().rows()
    }

    /// Mutable rows top to bottom.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> + '_ {
        let rows = iter_rows(&self.layout);
        let row_bytes = self.layout.row_bytes();
        self.data
            .chunks_mut(self.layout.stride().max(1))
            .take(rows)
            .map(move |r| &mut r[..row_bytes])
    }

    /// Mutable sub-rectangle of this view.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfBounds`] if `rect` isn't inside the view.
    pub fn slice(&mut self, rect: Rect) -> Result<BitmapMut<'_>, BitmapError> {
        self.reborrow().into_slice(rect)
    }

    /// Like [`slice`](Self::slice), keeping the full lifetime.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfBounds`] if `rect` isn't inside the view.
    pub fn into_slice(self, rect: Rect) -> Result<BitmapMut<'a>, BitmapError> {
        let (offset, layout) = self.layout.slice(rect)?;
        let end = offset + layout.total_bytes();
        Ok(Self::from_parts(&mut self.data[offset..end], layout))
    }

    /// Reinterpret as mutable typed pixels.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] if `P` has the wrong size,
    /// [`BitmapError::Misaligned`] if rows aren't aligned for `P`.
    pub fn into_typed<P: Pixel>(self) -> Result<PixelsMut<'a, P>, BitmapError> {
        PixelsMut::from_untyped(self)
    }

    /// Same-layout view with a different format of equal byte size.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] if the byte sizes differ.
    pub fn reinterpret(self, format: PixelFormat) -> Result<BitmapMut<'a>, BitmapError> {
        let layout = self.layout.with_pixel_format_same_size(format)?;
        Ok(Self::from_parts(self.data, layout))
    }

    /// Set every pixel to `value`, the raw bytes of one pixel.
    ///
    /// Contiguous views are filled in a single pass over the whole buffer;
    /// padded views row by row, leaving the padding untouched.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] if `value` isn't `pixel_bytes` long.
    pub fn fill(&mut self, value: &[u8]) -> Result<(), BitmapError> {
        check_value(&self.layout, value)?;
        if self.layout.is_empty() {
            return Ok(());
        }
        if self.layout.is_contiguous() {
            fill_row(self.data, value);
        } else {
            for row in self.rows_mut() {
                fill_row(row, value);
            }
        }
        Ok(())
    }

    /// Blit `src` with its top-left corner at `(x, y)`.
    ///
    /// The blit is clipped to this view: parts of `src` falling outside are
    /// skipped, and a source entirely outside is a no-op. Different formats
    /// go through [`copy_pixels`].
    ///
    /// # Errors
    ///
    /// [`BitmapError::UnsupportedFormatPair`] if no converter exists.
    pub fn set_pixels(&mut self, x: isize, y: isize, src: BitmapRef<'_>) -> Result<(), BitmapError> {
        let Some((from, to)) = clip_blit(x, y, src.width(), src.height(), self.width(), self.height())
        else {
            return Ok(());
        };
        let src = src.slice(from)?;
        let mut dst = self.slice(to)?;
        copy_pixels(src, &mut dst)
    }

    /// Copy an equally sized `src` into this view, converting formats.
    ///
    /// # Errors
    ///
    /// [`BitmapError::DimensionMismatch`] or
    /// [`BitmapError::UnsupportedFormatPair`].
    pub fn copy_from(&mut self, src: BitmapRef<'_>) -> Result<(), BitmapError> {
        copy_pixels(src, self)
    }

    /// Copy into a new packed owned bitmap.
    pub fn to_bitmap(&self) -> Bitmap {
        self.as_ref().to_bitmap()
    }
}

impl<'a> From<BitmapMut<'a>> for BitmapRef<'a> {
    fn from(view: BitmapMut<'a>) -> Self {
        view.into_ref()
    }
}

impl fmt::Debug for BitmapMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapMut")
            .field("layout", &self.layout)
            .field("len", &self.data.len())
            .finish()
    }
}

fn fill_row(row: &mut [u8], value: &[u8]) {
    if let [v] = value {
        row.fill(*v);
    } else {
        for px in row.chunks_exact_mut(value.len()) {
            px.copy_from_slice(value);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn gradient(layout: &BitmapLayout) -> Vec<u8> {
        (0..layout.total_bytes()).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn new_rejects_short_memory() {
        let layout = BitmapLayout::new(4, 4, PixelFormat::RGBA32);
        let data = vec![0u8; 63];
        assert_eq!(
            BitmapRef::new(&data, layout),
            Err(BitmapError::InsufficientData {
                required: 64,
                actual: 63
            })
        );
    }

    #[test]
    fn new_trims_to_total_bytes() {
        let layout = BitmapLayout::new_stride(2, 2, PixelFormat::GRAY8, 4).unwrap();
        let data = vec![1u8; 100];
        let view = BitmapRef::new(&data, layout).unwrap();
        assert_eq!(view.as_bytes().len(), 6);
    }

    #[test]
    fn from_pixels_checks_size() {
        let px = [rgb::Rgb::new(1u8, 2, 3); 4];
        let layout = BitmapLayout::new(2, 2, PixelFormat::RGBA32);
        assert_eq!(
            BitmapRef::from_pixels(&px, layout),
            Err(BitmapError::PixelFormatMismatch {
                expected: 4,
                actual: 3
            })
        );
        let layout = BitmapLayout::new(2, 2, PixelFormat::RGB24);
        let view = BitmapRef::from_pixels(&px, layout).unwrap();
        assert_eq!(view.pixel(1, 1), &[1, 2, 3]);
    }

    #[test]
    fn scanline_skips_padding() {
        let layout = BitmapLayout::new_stride(3, 3, PixelFormat::GRAY8, 5).unwrap();
        let data = gradient(&layout);
        let view = BitmapRef::new(&data, layout).unwrap();
        assert_eq!(view.scanline(1), &[5, 6, 7]);
        assert_eq!(view.pixel(2, 2), &[12]);
        let rows: Vec<_> = view.rows().collect();
        assert_eq!(rows, vec![&[0u8, 1, 2][..], &[5, 6, 7], &[10, 11, 12]]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn scanline_past_height_panics() {
        let layout = BitmapLayout::new(2, 2, PixelFormat::GRAY8);
        let data = vec![0u8; 4];
        let view = BitmapRef::new(&data, layout).unwrap();
        let _ = view.scanline(2);
    }

    #[test]
    fn slice_reads_parent_memory() {
        let layout = BitmapLayout::new(10, 10, PixelFormat::RGB24);
        let data = gradient(&layout);
        let view = BitmapRef::new(&data, layout).unwrap();
        let sub = view.slice(Rect::new(3, 4, 5, 2)).unwrap();
        assert_eq!(sub.width(), 5);
        assert_eq!(sub.pixel(0, 0), view.pixel(3, 4));
        assert_eq!(sub.pixel(4, 1), view.pixel(7, 5));
        assert_eq!(view.slice(Rect::new(8, 0, 3, 1)), Err(BitmapError::OutOfBounds));
    }

    #[test]
    fn mutable_slice_writes_through() {
        let layout = BitmapLayout::new(4, 4, PixelFormat::GRAY8);
        let mut data = vec![0u8; 16];
        let mut view = BitmapMut::new(&mut data, layout).unwrap();
        view.slice(Rect::new(1, 1, 2, 2)).unwrap().fill(&[9]).unwrap();
        assert_eq!(
            data,
            vec![0, 0, 0, 0, 0, 9, 9, 0, 0, 9, 9, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn fill_contiguous() {
        let layout = BitmapLayout::new(256, 1, PixelFormat::BGR24);
        let mut data = vec![0u8; layout.total_bytes()];
        let mut view = BitmapMut::new(&mut data, layout).unwrap();
        view.fill(&[10, 20, 30]).unwrap();
        assert_eq!(view.pixel(255, 0), &[10, 20, 30]);
        assert_eq!(view.pixel(0, 0), &[10, 20, 30]);
    }

    #[test]
    fn fill_padded_leaves_padding() {
        let layout = BitmapLayout::new_stride(2, 3, PixelFormat::GRAY8, 4).unwrap();
        let mut data = vec![7u8; layout.total_bytes()];
        BitmapMut::new(&mut data, layout).unwrap().fill(&[1]).unwrap();
        assert_eq!(data, vec![1, 1, 7, 7, 1, 1, 7, 7, 1, 1]);
    }

    #[test]
    fn fill_rejects_wrong_value_size() {
        let layout = BitmapLayout::new(2, 2, PixelFormat::RGB24);
        let mut data = vec![0u8; 12];
        let mut view = BitmapMut::new(&mut data, layout).unwrap();
        assert_eq!(
            view.fill(&[1, 2]),
            Err(BitmapError::PixelFormatMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn set_pixels_same_format() {
        let src_layout = BitmapLayout::new(2, 2, PixelFormat::GRAY8);
        let src_data = vec![1u8, 2, 3, 4];
        let src = BitmapRef::new(&src_data, src_layout).unwrap();
        let mut data = vec![0u8; 16];
        let mut dst = BitmapMut::new(&mut data, BitmapLayout::new(4, 4, PixelFormat::GRAY8)).unwrap();
        dst.set_pixels(1, 2, src).unwrap();
        assert_eq!(
            data,
            vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 0, 0, 3, 4, 0]
        );
    }

    #[test]
    fn set_pixels_clips_negative_and_overhanging() {
        let src_data: Vec<u8> = (1..=9).collect();
        let src = BitmapRef::new(&src_data, BitmapLayout::new(3, 3, PixelFormat::GRAY8)).unwrap();
        let mut data = vec![0u8; 4];
        let mut dst = BitmapMut::new(&mut data, BitmapLayout::new(2, 2, PixelFormat::GRAY8)).unwrap();
        dst.set_pixels(-2, -2, src).unwrap();
        assert_eq!(data, vec![9, 0, 0, 0]);

        let mut data = vec![0u8; 4];
        let mut dst = BitmapMut::new(&mut data, BitmapLayout::new(2, 2, PixelFormat::GRAY8)).unwrap();
        dst.set_pixels(1, 0, src).unwrap();
        assert_eq!(data, vec![0, 1, 0, 4]);
    }

    #[test]
    fn set_pixels_outside_is_noop() {
        let src_data = vec![5u8; 4];
        let src = BitmapRef::new(&src_data, BitmapLayout::new(2, 2, PixelFormat::GRAY8)).unwrap();
        let mut data = vec![0u8; 4];
        let mut dst = BitmapMut::new(&mut data, BitmapLayout::new(2, 2, PixelFormat::GRAY8)).unwrap();
        dst.set_pixels(2, 0, src).unwrap();
        dst.set_pixels(0, -2, src).unwrap();
        assert_eq!(data, vec![0; 4]);
    }

    #[test]
    fn set_pixels_converts_formats() {
        let src_data = vec![1u8, 2, 3, 4, 5, 6];
        let src = BitmapRef::new(&src_data, BitmapLayout::new(2, 1, PixelFormat::RGB24)).unwrap();
        let mut data = vec![0u8; 8];
        let mut dst = BitmapMut::new(&mut data, BitmapLayout::new(2, 1, PixelFormat::BGRA32)).unwrap();
        dst.set_pixels(0, 0, src).unwrap();
        assert_eq!(data, vec![3, 2, 1, 255, 6, 5, 4, 255]);
    }

    #[test]
    fn reinterpret_keeps_memory() {
        let data = vec![1u8, 2, 3, 4];
        let view = BitmapRef::new(&data, BitmapLayout::new(1, 1, PixelFormat::RGBA32)).unwrap();
        let bgra = view.reinterpret(PixelFormat::BGRA32).unwrap();
        assert_eq!(bgra.format(), PixelFormat::BGRA32);
        assert_eq!(bgra.as_bytes(), view.as_bytes());
        assert!(view.reinterpret(PixelFormat::RGB24).is_err());
    }

    #[test]
    fn to_vec_packs_rows() {
        let layout = BitmapLayout::new_stride(2, 2, PixelFormat::GRAY8, 3).unwrap();
        let data = vec![1u8, 2, 0, 3, 4];
        let view = BitmapRef::new(&data, layout).unwrap();
        assert_eq!(view.to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn to_bitmap_copies_and_packs() {
        let layout = BitmapLayout::new_stride(2, 2, PixelFormat::GRAY8, 3).unwrap();
        let data = vec![1u8, 2, 0, 3, 4];
        let view = BitmapRef::new(&data, layout).unwrap();
        let owned = view.to_bitmap();
        assert!(owned.layout().is_contiguous());
        assert_eq!(owned.as_ref().to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn empty_views_iterate_nothing() {
        let view = BitmapRef::empty();
        assert!(view.is_empty());
        assert_eq!(view.rows().count(), 0);
        let mut data = [0u8; 0];
        let mut view = BitmapMut::new(&mut data, BitmapLayout::new(0, 3, PixelFormat::RGB24)).unwrap();
        assert_eq!(view.rows_mut().count(), 0);
        view.fill(&[1, 2, 3]).unwrap();
    }

    #[test]
    fn clip_blit_axes() {
        assert_eq!(
            clip_blit(-1, 2, 4, 4, 5, 5),
            Some((Rect::new(1, 0, 3, 3), Rect::new(0, 2, 3, 3)))
        );
        assert_eq!(clip_blit(-4, 0, 4, 4, 5, 5), None);
        assert_eq!(clip_blit(0, 5, 4, 4, 5, 5), None);
    }
}
