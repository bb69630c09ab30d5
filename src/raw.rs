//! Raw-pointer views.
//!
//! A [`RawBitmap`] is an address and a layout, nothing more. Creating one,
//! slicing it and inspecting it are safe; turning it back into a borrowed or
//! owned view dereferences the address and is `unsafe`, with the caller
//! vouching that `total_bytes` are readable (and writable, for mutable
//! access) for as long as the resulting view lives.
//!
//! The safe way to get a raw view of memory you already borrow is the
//! scoped pin: [`BitmapRef::with_pinned`], [`BitmapMut::with_pinned_mut`]
//! and [`Bitmap::with_pinned`] hand the closure a `RawBitmap` whose address
//! stays valid, and unaliased by safe code, until the closure returns.

#![allow(unsafe_code)]

use core::marker::PhantomData;
use core::ptr;

use crate::span::check_address_alignment;
use crate::{Bitmap, BitmapError, BitmapLayout, BitmapMut, BitmapRef, Pixel, PixelsMut, PixelsRef, Rect};

// ---------------------------------------------------------------------------
// RawBitmap
// ---------------------------------------------------------------------------

/// Unmanaged view: a bare address plus a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawBitmap {
    address: *mut u8,
    layout: BitmapLayout,
    read_only: bool,
}

impl RawBitmap {
    /// Read-only raw view of `address`.
    #[inline]
    pub const fn new(address: *const u8, layout: BitmapLayout) -> Self {
        Self {
            address: address.cast_mut(),
            layout,
            read_only: true,
        }
    }

    /// Read-write raw view of `address`.
    #[inline]
    pub const fn new_mut(address: *mut u8, layout: BitmapLayout) -> Self {
        Self {
            address,
            layout,
            read_only: false,
        }
    }

    /// The null view.
    #[inline]
    pub const fn null() -> Self {
        Self::new(ptr::null(), BitmapLayout::EMPTY)
    }

    /// Address of the first pixel.
    #[inline]
    pub const fn address(&self) -> *const u8 {
        self.address.cast_const()
    }

    /// Address of the first pixel, for writing.
    ///
    /// # Errors
    ///
    /// [`BitmapError::ReadOnly`] for views made with [`new`](Self::new).
    #[inline]
    pub fn address_mut(&self) -> Result<*mut u8, BitmapError> {
        if self.read_only {
            Err(BitmapError::ReadOnly)
        } else {
            Ok(self.address)
        }
    }

    /// Layout of this view.
    #[inline]
    pub const fn layout(&self) -> BitmapLayout {
        self.layout
    }

    /// Whether writes are forbidden.
    #[inline]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Null address or no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.address.is_null() || self.layout.is_empty()
    }

    /// Sub-rectangle: new layout, address moved by the byte offset.
    ///
    /// No memory is touched, so this is safe even for dangling addresses.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfBounds`] if `rect` isn't inside the layout.
    pub fn slice(&self, rect: Rect) -> Result<RawBitmap, BitmapError> {
        let (offset, layout) = self.layout.slice(rect)?;
        let address = if self.address.is_null() {
            self.address
        } else {
            self.address.wrapping_add(offset)
        };
        Ok(Self { address, layout, ..*self })
    }

    /// Attach a pixel type.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] if `P` doesn't fit the format,
    /// [`BitmapError::Misaligned`] if the address or stride isn't aligned for `P`.
    pub fn as_typed<P: Pixel>(&self) -> Result<RawPixels<P>, BitmapError> {
        self.layout.format().check_compatible::<P>()?;
        check_address_alignment::<P>(self.address.addr(), &self.layout)?;
        Ok(RawPixels {
            raw: *self,
            _pixel: PhantomData,
        })
    }

    /// Borrow the memory as a read-only view.
    ///
    /// A null or empty view yields an empty `BitmapRef`.
    ///
    /// # Safety
    ///
    /// `total_bytes` starting at `address` must be initialized, readable and
    /// not written through any other path for the whole of `'a`.
    pub unsafe fn as_bitmap_ref<'a>(&self) -> BitmapRef<'a> {
        if self.is_empty() {
            return BitmapRef::empty();
        }
        // SAFETY: the caller guarantees `total_bytes` readable bytes at `address` for `'a`.
        let data = unsafe { core::slice::from_raw_parts(self.address.cast_const(), self.layout.total_bytes()) };
        BitmapRef::from_parts(data, self.layout)
    }

    /// Borrow the memory as a mutable view.
    ///
    /// # Errors
    ///
    /// [`BitmapError::ReadOnly`] for views made with [`new`](Self::new).
    ///
    /// # Safety
    ///
    /// `total_bytes` starting at `address` must be initialized, writable and
    /// not accessed through any other path for the whole of `'a`.
    pub unsafe fn as_bitmap_mut<'a>(&self) -> Result<BitmapMut<'a>, BitmapError> {
        let address = self.address_mut()?;
        if self.is_empty() {
            return Ok(BitmapMut::from_parts(&mut [], BitmapLayout::EMPTY));
        }
        // SAFETY: the caller guarantees exclusive, writable access for `'a`.
        let data = unsafe { core::slice::from_raw_parts_mut(address, self.layout.total_bytes()) };
        Ok(BitmapMut::from_parts(data, self.layout))
    }

    /// Copy the memory into a new owned bitmap.
    ///
    /// # Safety
    ///
    /// `total_bytes` starting at `address` must be initialized and readable
    /// for the duration of the call.
    pub unsafe fn to_bitmap(&self) -> Bitmap {
        // SAFETY: forwarded to the caller; the borrow ends inside this call.
        unsafe { self.as_bitmap_ref() }.to_bitmap()
    }
}

impl Default for RawBitmap {
    fn default() -> Self {
        Self::null()
    }
}

// ---------------------------------------------------------------------------
// RawPixels
// ---------------------------------------------------------------------------

/// Unmanaged view of pixels of type `P`.
#[derive(Debug, PartialEq, Eq)]
pub struct RawPixels<P> {
    raw: RawBitmap,
    _pixel: PhantomData<*mut P>,
}

impl<P> Clone for RawPixels<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for RawPixels<P> {}

impl<P: Pixel> RawPixels<P> {
    /// Layout of this view.
    #[inline]
    pub const fn layout(&self) -> BitmapLayout {
        self.raw.layout
    }

    /// Address of the first pixel.
    #[inline]
    pub fn address(&self) -> *const P {
        self.raw.address().cast()
    }

    /// Null address or no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The same view without the pixel type.
    #[inline]
    pub const fn as_untyped(&self) -> RawBitmap {
        self.raw
    }

    /// Sub-rectangle. Alignment is preserved because the stride and pixel
    /// size are multiples of `P`'s alignment.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfBounds`] if `rect` isn't inside the layout.
    pub fn slice(&self, rect: Rect) -> Result<Self, BitmapError> {
        Ok(Self {
            raw: self.raw.slice(rect)?,
            _pixel: PhantomData,
        })
    }

    /// Borrow as a read-only typed view.
    ///
    /// # Errors
    ///
    /// [`BitmapError::Misaligned`] if the borrowed rows can't be read as `P`.
    ///
    /// # Safety
    ///
    /// As [`RawBitmap::as_bitmap_ref`].
    pub unsafe fn as_pixels_ref<'a>(&self) -> Result<PixelsRef<'a, P>, BitmapError> {
        // SAFETY: forwarded to the caller.
        let bytes = unsafe { self.raw.as_bitmap_ref() };
        PixelsRef::from_untyped(bytes)
    }

    /// Borrow as a mutable typed view.
    ///
    /// # Errors
    ///
    /// [`BitmapError::ReadOnly`] for read-only views.
    ///
    /// # Safety
    ///
    /// As [`RawBitmap::as_bitmap_mut`].
    pub unsafe fn as_pixels_mut<'a>(&self) -> Result<PixelsMut<'a, P>, BitmapError> {
        // SAFETY: forwarded to the caller.
        let bytes = unsafe { self.raw.as_bitmap_mut()? };
        PixelsMut::from_untyped(bytes)
    }
}

// ---------------------------------------------------------------------------
// Scoped pinning
// ---------------------------------------------------------------------------

impl BitmapRef<'_> {
    /// Run `f` with a read-only raw view of this memory.
    ///
    /// The raw address is valid for reads until `f` returns; it must not be
    /// kept past that.
    pub fn with_pinned<R>(&self, f: impl FnOnce(&RawBitmap) -> R) -> R {
        let raw = RawBitmap::new(self.as_bytes().as_ptr(), self.layout());
        f(&raw)
    }
}

impl BitmapMut<'_> {
    /// Run `f` with a read-write raw view of this memory.
    ///
    /// `self` is mutably borrowed for the call, so the raw address is the
    /// only path to the memory until `f` returns.
    pub fn with_pinned_mut<R>(&mut self, f: impl FnOnce(&RawBitmap) -> R) -> R {
        let layout = self.layout();
        let raw = RawBitmap::new_mut(self.as_bytes_mut().as_mut_ptr(), layout);
        f(&raw)
    }
}

impl Bitmap {
    /// Run `f` with a read-only raw view of this bitmap's pixels.
    pub fn with_pinned<R>(&self, f: impl FnOnce(&RawBitmap) -> R) -> R {
        self.as_ref().with_pinned(f)
    }

    /// Run `f` with a read-write raw view, detaching shared storage first.
    pub fn with_pinned_mut<R>(&mut self, f: impl FnOnce(&RawBitmap) -> R) -> R {
        self.to_mut().with_pinned_mut(f)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
