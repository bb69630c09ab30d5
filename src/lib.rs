//! # rasterview
//!
//! Layout-aware views over raster memory.
//!
//! A [`BitmapLayout`] describes width, height, row stride and
//! [`PixelFormat`]. Every view pairs one with memory under a different
//! ownership discipline:
//!
//! | Tier     | Untyped        | Typed              | Memory                          |
//! |----------|----------------|--------------------|---------------------------------|
//! | Raw      | [`RawBitmap`]  | [`RawPixels<P>`]   | bare pointer, caller keeps it alive |
//! | Borrowed | [`BitmapRef`] / [`BitmapMut`] | [`PixelsRef`] / [`PixelsMut`] | `&[u8]` / `&mut [u8]` |
//! | Owned    | [`Bitmap`]     | [`PixelBitmap<P>`] | reference-counted buffer        |
//!
//! Cropping never copies: [`BitmapLayout::slice`] yields a byte offset and a
//! layout with the parent's stride, and every tier reslices its memory with
//! it. Pixels move between formats through row converters looked up in a
//! static table ([`convert`]).
//!
//! ```rust
//! use rasterview::{Bitmap, BitmapLayout, PixelFormat, Rect};
//!
//! let mut bmp = Bitmap::new(BitmapLayout::new(256, 1, PixelFormat::BGR24));
//! bmp.fill(&[10, 20, 30]).unwrap();
//! assert_eq!(bmp.as_ref().pixel(255, 0), &[10, 20, 30]);
//!
//! let crop = bmp.slice(Rect::new(16, 0, 8, 1)).unwrap();
//! assert!(crop.ptr_eq(&bmp));
//! ```
//!
//! ## Feature flags
//!
//! - **`std`** (default): `std::io` adapters for the raw persistence format.
//! - **`imgref`**: zero-copy conversions between `imgref` images and typed
//!   borrowed views.

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod error;
mod format;
mod header;
mod layout;
mod owned;
mod pixel;
mod raw;
mod span;
mod typed;

pub mod convert;
pub mod numerics;
pub mod planes;
pub mod sampler;

#[cfg(feature = "imgref")]
pub mod imgref;

pub use error::BitmapError;
pub use format::{AlphaMode, Channel, ChannelType, Component, FormatCode, MAX_COMPONENTS, PixelFormat};
pub use header::HEADER_LEN;
pub use layout::{BitmapLayout, Rect};
pub use owned::{Bitmap, PixelBitmap, Storage};
pub use pixel::Pixel;
pub use raw::{RawBitmap, RawPixels};
pub use sampler::Boundary;
pub use span::{BitmapMut, BitmapRef};
pub use typed::{PixelsMut, PixelsRef};
