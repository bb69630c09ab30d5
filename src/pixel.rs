//! Concrete pixel representations.
//!
//! Typed views are generic over [`Pixel`]: any plain-old-data type whose
//! size matches the layout's pixel size. Types that stand for a canonical
//! format say so through [`Pixel::FORMAT`], which is what
//! [`PixelFormat::identify`] reads.

use bytemuck::Pod;
use rgb::{Argb, Bgr, Bgra, Gray, GrayAlpha, Rgb, Rgba};

use crate::PixelFormat;

/// A fixed-size, plain-old-data pixel value.
///
/// Implement this for your own `#[repr(C)]` pixel structs (deriving
/// `bytemuck::Pod`) to use them with typed views. Leave `FORMAT` as `None`
/// unless the type maps to exactly one canonical format.
pub trait Pixel: Pod {
    /// Canonical format for this representation, if it has one.
    const FORMAT: Option<PixelFormat> = None;
}

macro_rules! impl_pixel {
    ($ty:ty => $format:expr) => {
        impl Pixel for $ty {
            const FORMAT: Option<PixelFormat> = Some($format);
        }
    };
    ($ty:ty) => {
        impl Pixel for $ty {}
    };
}

impl_pixel!(u8 => PixelFormat::GRAY8);
impl_pixel!(u16 => PixelFormat::GRAY16);
impl_pixel!(f32 => PixelFormat::GRAYF32);

impl_pixel!(Gray<u8> => PixelFormat::GRAY8);
impl_pixel!(Gray<u16> => PixelFormat::GRAY16);
impl_pixel!(Gray<f32> => PixelFormat::GRAYF32);
impl_pixel!(GrayAlpha<u8> => PixelFormat::GRAYA8);
impl_pixel!(Rgb<u8> => PixelFormat::RGB24);
impl_pixel!(Bgr<u8> => PixelFormat::BGR24);
impl_pixel!(Rgba<u8> => PixelFormat::RGBA32);
impl_pixel!(Bgra<u8> => PixelFormat::BGRA32);
impl_pixel!(Argb<u8> => PixelFormat::ARGB32);
impl_pixel!(Rgb<u16> => PixelFormat::RGB48);
impl_pixel!(Rgba<u16> => PixelFormat::RGBA64);
impl_pixel!(Rgb<f32> => PixelFormat::RGBF32);
impl_pixel!(Bgr<f32> => PixelFormat::BGRF32);
impl_pixel!(Rgba<f32> => PixelFormat::RGBAF32);
impl_pixel!(Bgra<f32> => PixelFormat::BGRAF32);

// Size-only representations: compatible with any format of the same size.
impl_pixel!(u32);
impl_pixel!(u64);
impl_pixel!([u8; 2]);
impl_pixel!([u8; 3]);
impl_pixel!([u8; 4]);
impl_pixel!([u16; 3]);
impl_pixel!([u16; 4]);
impl_pixel!([f32; 2]);
impl_pixel!([f32; 3]);
impl_pixel!([f32; 4]);
