//! Bitmap layout arithmetic.
//!
//! [`BitmapLayout`] is a pure value: width, height, row stride and pixel
//! format, with no memory attached. Every view tier embeds one and defers to
//! it for scanline addressing and sub-rectangle slicing.

use core::ops::Range;

use crate::{BitmapError, PixelFormat};

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: usize,
    /// Top edge.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Rect {
    /// Create a rectangle.
    #[inline]
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin.
    #[inline]
    pub const fn from_size(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Zero width or zero height.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge, `None` on overflow.
    #[inline]
    pub const fn right(&self) -> Option<usize> {
        self.x.checked_add(self.width)
    }

    /// Exclusive bottom edge, `None` on overflow.
    #[inline]
    pub const fn bottom(&self) -> Option<usize> {
        self.y.checked_add(self.height)
    }

    /// Half-open point test.
    #[inline]
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && y >= self.y && x - self.x < self.width && y - self.y < self.height
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        match (other.right(), other.bottom(), self.right(), self.bottom()) {
            (Some(or), Some(ob), Some(sr), Some(sb)) => {
                other.x >= self.x && other.y >= self.y && or <= sr && ob <= sb
            }
            _ => false,
        }
    }

    /// Overlap of two rectangles, `None` when they don't overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right()?.min(other.right()?);
        let b = self.bottom()?.min(other.bottom()?);
        (r > x && b > y).then(|| Rect::new(x, y, r - x, b - y))
    }

    /// Same size, origin moved by `(dx, dy)`.
    #[inline]
    pub const fn translate(&self, dx: usize, dy: usize) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// BitmapLayout
// ---------------------------------------------------------------------------

/// Width, height, stride and pixel format of a bitmap.
///
/// Invariants, upheld by every constructor:
///
/// - `pixel_bytes == format.byte_count()`
/// - `stride >= width * pixel_bytes`
/// - a zero-byte format collapses the whole layout to the default value
///
/// `total_bytes` excludes the trailing padding of the last row, so a cropped
/// layout can address memory that ends exactly at its last visible pixel.
///
/// Layouts whose `total_bytes` would overflow `usize` are a precondition
/// violation; constructors panic rather than wrap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitmapLayout {
    width: usize,
    height: usize,
    stride: usize,
    pixel_bytes: usize,
    format: PixelFormat,
}

#[inline]
fn mul(a: usize, b: usize) -> usize {
    match a.checked_mul(b) {
        Some(v) => v,
        None => panic!("bitmap layout arithmetic overflows usize ({a} * {b})"),
    }
}

impl BitmapLayout {
    /// The zero-sized layout, also `Default::default()`.
    pub const EMPTY: Self = Self {
        width: 0,
        height: 0,
        stride: 0,
        pixel_bytes: 0,
        format: PixelFormat::EMPTY,
    };

    /// Tightly packed layout (`stride == width * pixel_bytes`).
    ///
    /// # Panics
    ///
    /// Panics if `width * pixel_bytes` or `total_bytes` overflows.
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        let pixel_bytes = format.byte_count();
        if pixel_bytes == 0 {
            return Self::EMPTY;
        }
        let layout = Self {
            width,
            height,
            stride: mul(width, pixel_bytes),
            pixel_bytes,
            format,
        };
        layout.assert_addressable();
        layout
    }

    /// Layout with an explicit row stride in bytes. `stride == 0` selects
    /// the packed default.
    ///
    /// # Errors
    ///
    /// [`BitmapError::StrideTooSmall`] if `stride < width * pixel_bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `total_bytes` overflows.
    pub fn new_stride(
        width: usize,
        height: usize,
        format: PixelFormat,
        stride: usize,
    ) -> Result<Self, BitmapError> {
        let packed = Self::new(width, height, format);
        if stride == 0 || packed.pixel_bytes == 0 {
            return Ok(packed);
        }
        if stride < packed.row_bytes() {
            return Err(BitmapError::StrideTooSmall);
        }
        let layout = Self { stride, ..packed };
        layout.assert_addressable();
        Ok(layout)
    }

    /// Like [`new_stride`](Self::new_stride), with overflow reported
    /// instead of panicking.
    ///
    /// # Errors
    ///
    /// [`BitmapError::StrideTooSmall`] if `stride < width * pixel_bytes`,
    /// [`BitmapError::SizeOverflow`] if the row size or `total_bytes`
    /// doesn't fit in `usize`.
    pub fn try_new_stride(
        width: usize,
        height: usize,
        format: PixelFormat,
        stride: usize,
    ) -> Result<Self, BitmapError> {
        let pixel_bytes = format.byte_count();
        if pixel_bytes == 0 {
            return Ok(Self::EMPTY);
        }
        let row_bytes = width.checked_mul(pixel_bytes).ok_or(BitmapError::SizeOverflow)?;
        let stride = if stride == 0 { row_bytes } else { stride };
        if stride < row_bytes {
            return Err(BitmapError::StrideTooSmall);
        }
        if height > 0 {
            stride
                .checked_mul(height - 1)
                .and_then(|v| v.checked_add(row_bytes))
                .ok_or(BitmapError::SizeOverflow)?;
        }
        Ok(Self {
            width,
            height,
            stride,
            pixel_bytes,
            format,
        })
    }

    fn assert_addressable(&self) {
        if self.height > 0 {
            let preceding = mul(self.stride, self.height - 1);
            if preceding.checked_add(self.row_bytes()).is_none() {
                panic!("bitmap layout total size overflows usize");
            }
        }
    }

    /// Same format, new dimensions, packed stride.
    pub fn with_size(&self, width: usize, height: usize) -> Self {
        Self::new(width, height, self.format)
    }

    /// Same dimensions and format, new stride.
    ///
    /// # Errors
    ///
    /// [`BitmapError::StrideTooSmall`] if `stride < row_bytes`.
    pub fn with_stride(&self, stride: usize) -> Result<Self, BitmapError> {
        Self::new_stride(self.width, self.height, self.format, stride)
    }

    /// Same dimensions, new format, packed stride for the new pixel size.
    pub fn with_pixel_format(&self, format: PixelFormat) -> Self {
        Self::new(self.width, self.height, format)
    }

    /// Swap the format while keeping width, height and stride.
    ///
    /// Used to reinterpret the same memory, e.g. RGBA32 as BGRA32.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] if the byte sizes differ.
    pub fn with_pixel_format_same_size(&self, format: PixelFormat) -> Result<Self, BitmapError> {
        if format.byte_count() != self.pixel_bytes {
            return Err(BitmapError::PixelFormatMismatch {
                expected: self.pixel_bytes,
                actual: format.byte_count(),
            });
        }
        Ok(Self { format, ..*self })
    }

    /// Width in pixels.
    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Bytes from the start of one row to the start of the next.
    #[inline]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Bytes per pixel.
    #[inline]
    pub const fn pixel_bytes(&self) -> usize {
        self.pixel_bytes
    }

    /// Pixel format.
    #[inline]
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Visible bytes per row (`width * pixel_bytes`, never more than stride).
    #[inline]
    pub const fn row_bytes(&self) -> usize {
        self.width * self.pixel_bytes
    }

    /// Bytes spanned from the first pixel to the end of the last visible pixel.
    #[inline]
    pub const fn total_bytes(&self) -> usize {
        if self.height == 0 {
            0
        } else {
            self.stride * (self.height - 1) + self.pixel_bytes * self.width
        }
    }

    /// Rows are back to back with no padding.
    #[inline]
    pub const fn is_contiguous(&self) -> bool {
        self.row_bytes() == self.stride
    }

    /// No pixels to address.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixel_bytes == 0
    }

    /// `(0, 0, width, height)`.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Half-open bounds test.
    #[inline]
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Byte offset of pixel `(x, y)`. No bounds check.
    #[inline]
    pub const fn pixel_offset(&self, x: usize, y: usize) -> usize {
        self.stride * y + self.pixel_bytes * x
    }

    /// Byte range of row `y` (visible bytes only).
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn scanline_range(&self, y: usize) -> Range<usize> {
        assert!(
            y < self.height,
            "row index {y} out of bounds (height: {})",
            self.height
        );
        let start = y * self.stride;
        start..start + self.row_bytes()
    }

    /// Byte range of pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the layout.
    #[inline]
    pub fn pixel_range(&self, x: usize, y: usize) -> Range<usize> {
        assert!(
            x < self.width,
            "column index {x} out of bounds (width: {})",
            self.width
        );
        let row = self.scanline_range(y);
        let start = row.start + x * self.pixel_bytes;
        start..start + self.pixel_bytes
    }

    /// Sub-rectangle as `(byte_offset, layout)`.
    ///
    /// The returned layout keeps this layout's stride, so it addresses the
    /// parent's memory starting at `byte_offset`. Rectangles with zero width
    /// or height yield an empty layout at offset 0.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfBounds`] unless `rect` lies inside `bounds()`.
    pub fn slice(&self, rect: Rect) -> Result<(usize, BitmapLayout), BitmapError> {
        if !self.bounds().contains_rect(&rect) {
            return Err(BitmapError::OutOfBounds);
        }
        if rect.is_empty() {
            return Ok((0, Self::new(rect.width, rect.height, self.format)));
        }
        let offset = self.pixel_offset(rect.x, rect.y);
        let layout = Self {
            width: rect.width,
            height: rect.height,
            ..*self
        };
        Ok((offset, layout))
    }

    /// Check that a memory region of `len` bytes can back this layout.
    ///
    /// # Errors
    ///
    /// [`BitmapError::InsufficientData`] if `len < total_bytes`.
    #[inline]
    pub fn check_len(&self, len: usize) -> Result<(), BitmapError> {
        let required = self.total_bytes();
        if len < required {
            Err(BitmapError::InsufficientData {
                required,
                actual: len,
            })
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
