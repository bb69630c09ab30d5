//! Owned, reference-counted bitmaps.
//!
//! A [`Bitmap`] is a layout plus an `Arc` of type-erased [`Storage`] and a
//! byte offset into it. Cloning and slicing share the storage; writing to a
//! bitmap whose storage is shared first copies its own region out
//! (copy-on-write), so no bitmap ever observes another's writes.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use bytemuck::Pod;

use crate::span::check_alignment;
use crate::typed::canonical_format;
use crate::{BitmapError, BitmapLayout, BitmapMut, BitmapRef, Pixel, PixelFormat, PixelsMut, PixelsRef, Rect};

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Owned byte storage behind a [`Bitmap`].
///
/// Implemented for `Vec<T>` of any plain-old-data `T`, so caller buffers are
/// adopted without copying. Implement it for other owners (memory-mapped
/// regions, pooled buffers) to hand them to [`Bitmap::from_storage`].
pub trait Storage: Send + Sync + 'static {
    /// All stored bytes.
    fn bytes(&self) -> &[u8];
    /// All stored bytes, mutably.
    fn bytes_mut(&mut self) -> &mut [u8];
}

impl<T: Pod + Send + Sync> Storage for Vec<T> {
    fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(self.as_mut_slice())
    }
}

/// Zeroed storage of at least `len` bytes, aligned for every canonical pixel type.
fn zeroed(len: usize) -> Vec<u64> {
    vec![0u64; len.div_ceil(size_of::<u64>())]
}

// ---------------------------------------------------------------------------
// Bitmap
// ---------------------------------------------------------------------------

/// Owned bitmap with shared, copy-on-write storage.
///
/// Equality is identity: two bitmaps are equal when they have the same
/// layout over the same bytes of the same allocation. Byte-identical
/// bitmaps in different allocations compare unequal; compare
/// `as_ref()` views for content equality.
#[derive(Clone)]
pub struct Bitmap {
    storage: Arc<dyn Storage>,
    offset: usize,
    layout: BitmapLayout,
}

impl Bitmap {
    /// Allocate a zero-filled bitmap.
    pub fn new(layout: BitmapLayout) -> Self {
        let len = layout.total_bytes();
        log::trace!(
            "allocating {len} bytes for {}x{} {:?}",
            layout.width(),
            layout.height(),
            layout.format()
        );
        Self {
            storage: Arc::new(zeroed(len)),
            offset: 0,
            layout,
        }
    }

    /// Adopt a caller-provided buffer without copying.
    ///
    /// Bytes beyond `total_bytes` stay allocated but are never addressed.
    ///
    /// # Errors
    ///
    /// [`BitmapError::InsufficientData`] if the buffer is too short.
    pub fn from_vec<T: Pod + Send + Sync>(data: Vec<T>, layout: BitmapLayout) -> Result<Self, BitmapError> {
        Self::from_storage(Box::new(data), layout)
    }

    /// Adopt any [`Storage`] implementation.
    ///
    /// # Errors
    ///
    /// [`BitmapError::InsufficientData`] if the storage is too short.
    pub fn from_storage(storage: Box<dyn Storage>, layout: BitmapLayout) -> Result<Self, BitmapError> {
        layout.check_len(storage.bytes().len())?;
        Ok(Self {
            storage: Arc::from(storage),
            offset: 0,
            layout,
        })
    }

    /// Layout of this bitmap.
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

    #[inline]
    fn range(&self) -> core::ops::Range<usize> {
        self.offset..self.offset + self.layout.total_bytes()
    }

    /// Borrow as a read-only view.
    #[inline]
    pub fn as_ref(&self) -> BitmapRef<'_> {
        BitmapRef::from_parts(&self.storage.bytes()[self.range()], self.layout)
    }

    /// Borrow as a mutable view, detaching from shared storage first.
    pub fn to_mut(&mut self) -> BitmapMut<'_> {
        if Arc::get_mut(&mut self.storage).is_none() {
            self.detach();
        }
        let range = self.range();
        let layout = self.layout;
        let Some(storage) = Arc::get_mut(&mut self.storage) else {
            unreachable!("bitmap storage is unique after detaching");
        };
        BitmapMut::from_parts(&mut storage.bytes_mut()[range], layout)
    }

    /// Copy this bitmap's region into storage of its own, keeping the stride.
    fn detach(&mut self) {
        let len = self.layout.total_bytes();
        log::trace!("copy-on-write: detaching {len} bytes from shared storage");
        let mut fresh = zeroed(len);
        bytemuck::cast_slice_mut::<u64, u8>(&mut fresh)[..len]
            .copy_from_slice(&self.storage.bytes()[self.range()]);
        self.storage = Arc::new(fresh);
        self.offset = 0;
    }

    /// Crop sharing this bitmap's storage.
    ///
    /// The crop reads the parent's pixels, but writing through it detaches
    /// (copy on write), so the parent never sees those writes. To write
    /// into a region of `self`, borrow it mutably instead:
    /// `parent.to_mut().slice(rect)`.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfBounds`] if `rect` isn't inside the bitmap.
    pub fn slice(&self, rect: Rect) -> Result<Bitmap, BitmapError> {
        let (offset, layout) = self.layout.slice(rect)?;
        Ok(Self {
            storage: Arc::clone(&self.storage),
            offset: if layout.is_empty() { 0 } else { self.offset + offset },
            layout,
        })
    }

    /// Other bitmaps hold the same storage.
    #[inline]
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.storage) > 1
    }

    /// Both bitmaps are backed by the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Bitmap) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    /// Visible bytes of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn scanline(&self, y: usize) -> &[u8] {
        self.as_ref().scanline(y)
    }

    /// Bytes of pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the bitmap.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        self.as_ref().pixel(x, y)
    }

    /// Set every pixel to `value`.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] if `value` isn't `pixel_bytes` long.
    pub fn fill(&mut self, value: &[u8]) -> Result<(), BitmapError> {
        self.to_mut().fill(value)
    }

    /// Blit `src` at `(x, y)`, clipped and converted as in [`BitmapMut::set_pixels`].
    ///
    /// # Errors
    ///
    /// [`BitmapError::UnsupportedFormatPair`] if no converter exists.
    pub fn set_pixels(&mut self, x: isize, y: isize, src: BitmapRef<'_>) -> Result<(), BitmapError> {
        self.to_mut().set_pixels(x, y, src)
    }

    /// Copy an equally sized `src`, converting formats.
    ///
    /// # Errors
    ///
    /// [`BitmapError::DimensionMismatch`] or [`BitmapError::UnsupportedFormatPair`].
    pub fn copy_from(&mut self, src: BitmapRef<'_>) -> Result<(), BitmapError> {
        self.to_mut().copy_from(src)
    }

    /// New bitmap holding `self` converted to `format`.
    ///
    /// # Errors
    ///
    /// [`BitmapError::UnsupportedFormatPair`] if no converter exists.
    pub fn convert_to(&self, format: PixelFormat) -> Result<Bitmap, BitmapError> {
        let mut out = Bitmap::new(self.layout.with_pixel_format(format));
        out.copy_from(self.as_ref())?;
        Ok(out)
    }

    /// Typed handle sharing this bitmap's storage.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] or [`BitmapError::Misaligned`].
    pub fn as_typed<P: Pixel>(&self) -> Result<PixelBitmap<P>, BitmapError> {
        self.clone().into_typed()
    }

    /// Attach a pixel type.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] or [`BitmapError::Misaligned`].
    pub fn into_typed<P: Pixel>(self) -> Result<PixelBitmap<P>, BitmapError> {
        self.format().check_compatible::<P>()?;
        check_alignment::<P>(self.as_ref().as_bytes(), &self.layout)?;
        Ok(PixelBitmap::from_untyped_unchecked(self))
    }
}

impl Default for Bitmap {
    fn default() -> Self {
        Self::new(BitmapLayout::EMPTY)
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.layout == other.layout && self.offset == other.offset && self.ptr_eq(other)
    }
}

impl Eq for Bitmap {}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("layout", &self.layout)
            .field("offset", &self.offset)
            .field("shared", &self.is_shared())
            .finish()
    }
}

impl From<BitmapRef<'_>> for Bitmap {
    fn from(view: BitmapRef<'_>) -> Self {
        view.to_bitmap()
    }
}

// ---------------------------------------------------------------------------
// PixelBitmap
// ---------------------------------------------------------------------------

/// Owned bitmap of pixels of type `P`.
pub struct PixelBitmap<P> {
    inner: Bitmap,
    _pixel: PhantomData<P>,
}

impl<P: Pixel> PixelBitmap<P> {
    /// Allocate `width * height` zeroed pixels in `P`'s canonical format.
    ///
    /// # Errors
    ///
    /// [`BitmapError::InvalidFormat`] if `P` has no canonical format.
    pub fn new(width: usize, height: usize) -> Result<Self, BitmapError> {
        Self::with_layout(BitmapLayout::new(width, height, canonical_format::<P>()?))
    }

    /// Allocate a zeroed bitmap for any layout compatible with `P`.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] if `P` doesn't fit the format, or
    /// [`BitmapError::Misaligned`] if the stride isn't a multiple of `P`'s alignment.
    pub fn with_layout(layout: BitmapLayout) -> Result<Self, BitmapError> {
        Bitmap::new(layout).into_typed()
    }

    /// Adopt a packed `Vec` of pixels without copying.
    ///
    /// # Errors
    ///
    /// [`BitmapError::InvalidFormat`] if `P` has no canonical format,
    /// [`BitmapError::InsufficientData`] if `pixels` is shorter than `width * height`.
    pub fn from_pixels(pixels: Vec<P>, width: usize, height: usize) -> Result<Self, BitmapError>
    where
        P: Send + Sync,
    {
        let layout = BitmapLayout::new(width, height, canonical_format::<P>()?);
        Bitmap::from_vec(pixels, layout)?.into_typed()
    }

    pub(crate) fn from_untyped_unchecked(inner: Bitmap) -> Self {
        Self {
            inner,
            _pixel: PhantomData,
        }
    }

    /// Layout of this bitmap.
    #[inline]
    pub fn layout(&self) -> BitmapLayout {
        self.inner.layout()
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.inner.width()
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.inner.height()
    }

    /// No pixels to address.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Borrow as a read-only typed view.
    #[inline]
    pub fn as_pixels(&self) -> PixelsRef<'_, P> {
        typed_ref(self.inner.as_ref())
    }

    /// Borrow as a mutable typed view, detaching from shared storage first.
    #[inline]
    pub fn to_pixels_mut(&mut self) -> PixelsMut<'_, P> {
        typed_mut(self.inner.to_mut())
    }

    /// The untyped bitmap.
    #[inline]
    pub fn as_untyped(&self) -> &Bitmap {
        &self.inner
    }

    /// Drop the pixel type.
    #[inline]
    pub fn into_untyped(self) -> Bitmap {
        self.inner
    }

    /// Row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &[P] {
        self.as_pixels().row(y)
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the bitmap.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> P {
        self.as_pixels().get(x, y)
    }

    /// Overwrite the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the bitmap.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: P) {
        self.to_pixels_mut().set(x, y, value);
    }

    /// Set every pixel to `value`.
    pub fn fill(&mut self, value: P) {
        self.to_pixels_mut().fill(value);
    }

    /// Crop sharing this bitmap's storage.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfBounds`] if `rect` isn't inside the bitmap.
    pub fn slice(&self, rect: Rect) -> Result<Self, BitmapError> {
        Ok(Self::from_untyped_unchecked(self.inner.slice(rect)?))
    }

    /// Visible pixels packed into a `Vec`.
    pub fn to_vec(&self) -> Vec<P> {
        self.as_pixels().pixels().collect()
    }
}

// Compatibility and alignment were checked when the typed bitmap was made,
// and every derived view keeps the same format and stride.
fn typed_ref<P: Pixel>(view: BitmapRef<'_>) -> PixelsRef<'_, P> {
    match view.as_typed() {
        Ok(v) => v,
        Err(e) => unreachable!("typed bitmap lost its pixel invariant: {e}"),
    }
}

fn typed_mut<P: Pixel>(view: BitmapMut<'_>) -> PixelsMut<'_, P> {
    match view.into_typed() {
        Ok(v) => v,
        Err(e) => unreachable!("typed bitmap lost its pixel invariant: {e}"),
    }
}

impl<P> Clone for PixelBitmap<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _pixel: PhantomData,
        }
    }
}

impl<P> PartialEq for PixelBitmap<P> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<P> Eq for PixelBitmap<P> {}

impl<P> fmt::Debug for PixelBitmap<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBitmap")
            .field("pixel", &core::any::type_name::<P>())
            .field("layout", &self.inner.layout)
            .finish()
    }
}

impl<P> From<PixelBitmap<P>> for Bitmap {
    fn from(bitmap: PixelBitmap<P>) -> Self {
        bitmap.inner
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
