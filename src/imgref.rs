//! Conversions between [`imgref`] images and typed views.
//!
//! `imgref` counts stride in pixels; views count it in bytes. Conversions
//! from `imgref` borrow the same buffer without copying.
//!
//! ```rust
//! use ::imgref::ImgVec;
//! use rasterview::PixelsRef;
//! use rgb::Rgb;
//!
//! let img = ImgVec::new(vec![Rgb::new(1u8, 2, 3); 6], 3, 2);
//! let view = PixelsRef::try_from(img.as_ref()).unwrap();
//! assert_eq!(view.get(2, 1), Rgb::new(1, 2, 3));
//! assert_eq!(view.to_imgvec().into_buf(), img.into_buf());
//! ```

use alloc::vec::Vec;

use ::imgref::{ImgRef, ImgRefMut, ImgVec};

use crate::{BitmapError, Pixel, PixelsMut, PixelsRef};

impl<'a, P: Pixel> TryFrom<ImgRef<'a, P>> for PixelsRef<'a, P> {
    type Error = BitmapError;

    fn try_from(img: ImgRef<'a, P>) -> Result<Self, BitmapError> {
        let (width, height, stride) = (img.width(), img.height(), img.stride());
        PixelsRef::new_stride(img.into_buf(), width, height, stride)
    }
}

impl<'a, P: Pixel> TryFrom<ImgRefMut<'a, P>> for PixelsMut<'a, P> {
    type Error = BitmapError;

    fn try_from(img: ImgRefMut<'a, P>) -> Result<Self, BitmapError> {
        let (width, height, stride) = (img.width(), img.height(), img.stride());
        PixelsMut::new_stride(img.into_buf(), width, height, stride)
    }
}

impl<P: Pixel> PixelsRef<'_, P> {
    /// Copy the visible pixels into a packed [`ImgVec`].
    pub fn to_imgvec(&self) -> ImgVec<P> {
        let pixels: Vec<P> = self.pixels().collect();
        ImgVec::new(pixels, self.width(), self.height())
    }
}
