//! Three-plane views of interleaved color data.
//!
//! [`Planes`] holds three equally sized single-channel views, always in
//! (red, green, blue) order. De-interleaving from a packed source and
//! re-interleaving into a packed destination decide the component order from
//! the packed format: if its first component is blue, components 0 and 2 are
//! swapped on the way in and on the way out; otherwise component `i` maps to
//! plane `i`.

use bytemuck::{bytes_of, pod_read_unaligned};

use crate::numerics::{self, ScaleOffset, ValueRange};
use crate::{
    BitmapError, BitmapMut, BitmapRef, Channel, Pixel, PixelBitmap, PixelFormat, PixelsMut, PixelsRef, Rect,
};

/// A single-channel sample type usable as a plane.
pub trait PlaneSample: Pixel {
    /// Value written to a fourth (alpha or padding) component on re-interleave.
    const OPAQUE: Self;
}

impl PlaneSample for u8 {
    const OPAQUE: Self = u8::MAX;
}

impl PlaneSample for u16 {
    const OPAQUE: Self = u16::MAX;
}

impl PlaneSample for f32 {
    const OPAQUE: Self = 1.0;
}

/// Component index feeding each of the (R, G, B) planes.
fn component_order<T: PlaneSample>(format: PixelFormat) -> Result<[usize; 3], BitmapError> {
    let n = format.component_count();
    let ty = format.uniform_channel_type();
    if ty.map(|t| t.byte_size()) != Some(size_of::<T>()) {
        return Err(BitmapError::PixelFormatMismatch {
            expected: n * size_of::<T>(),
            actual: format.byte_count(),
        });
    }
    let fourth_is_extra = match format.component(3) {
        None => true,
        Some(c) => matches!(c.channel, Channel::Alpha | Channel::Undefined),
    };
    if !(n == 3 || n == 4) || !fourth_is_extra {
        return Err(BitmapError::UnsupportedFormatPair);
    }
    if format.first_channel() == Some(Channel::Blue) {
        Ok([2, 1, 0])
    } else {
        Ok([0, 1, 2])
    }
}

// ---------------------------------------------------------------------------
// Planes
// ---------------------------------------------------------------------------

/// Three borrowed planes of equal size, in (R, G, B) order.
pub struct Planes<'a, T> {
    planes: [PixelsMut<'a, T>; 3],
}

impl<'a, T: PlaneSample> Planes<'a, T> {
    /// Group three planes.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PlaneSizeMismatch`] unless all three have the same
    /// width and height.
    pub fn new(r: PixelsMut<'a, T>, g: PixelsMut<'a, T>, b: PixelsMut<'a, T>) -> Result<Self, BitmapError> {
        let size = (r.width(), r.height());
        if (g.width(), g.height()) != size || (b.width(), b.height()) != size {
            return Err(BitmapError::PlaneSizeMismatch);
        }
        Ok(Self { planes: [r, g, b] })
    }

    /// Width shared by all planes.
    #[inline]
    pub fn width(&self) -> usize {
        self.planes[0].width()
    }

    /// Height shared by all planes.
    #[inline]
    pub fn height(&self) -> usize {
        self.planes[0].height()
    }

    /// Plane `i` (0 = red, 1 = green, 2 = blue).
    ///
    /// # Panics
    ///
    /// Panics if `i > 2`.
    #[inline]
    pub fn plane(&self, i: usize) -> &PixelsMut<'a, T> {
        &self.planes[i]
    }

    /// Plane `i`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `i > 2`.
    #[inline]
    pub fn plane_mut(&mut self, i: usize) -> &mut PixelsMut<'a, T> {
        &mut self.planes[i]
    }

    /// Release the three planes.
    pub fn into_inner(self) -> [PixelsMut<'a, T>; 3] {
        self.planes
    }

    /// Same planes cropped to `rect`.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfBounds`] if `rect` isn't inside the planes.
    pub fn slice(&mut self, rect: Rect) -> Result<Planes<'_, T>, BitmapError> {
        let [r, g, b] = &mut self.planes;
        Ok(Planes {
            planes: [r.slice(rect)?, g.slice(rect)?, b.slice(rect)?],
        })
    }

    /// De-interleave a packed 3- or 4-component source into the planes.
    ///
    /// A fourth component is ignored.
    ///
    /// # Errors
    ///
    /// [`BitmapError::DimensionMismatch`] if the sizes differ,
    /// [`BitmapError::PixelFormatMismatch`] if the source components aren't
    /// all `size_of::<T>()` bytes, [`BitmapError::UnsupportedFormatPair`] for
    /// sources that aren't three colors plus an optional trailing extra.
    pub fn set_pixels(&mut self, src: BitmapRef<'_>) -> Result<(), BitmapError> {
        if src.width() != self.width() || src.height() != self.height() {
            return Err(BitmapError::DimensionMismatch);
        }
        let order = component_order::<T>(src.format())?;
        let bpc = size_of::<T>();
        let bpp = src.layout().pixel_bytes();
        let read = |px: &[u8], i: usize| pod_read_unaligned::<T>(&px[i * bpc..][..bpc]);
        let [p0, p1, p2] = &mut self.planes;
        for (y, row) in src.rows().enumerate() {
            let (r0, r1, r2) = (p0.row_mut(y), p1.row_mut(y), p2.row_mut(y));
            for (((px, a), b), c) in row.chunks_exact(bpp).zip(r0).zip(r1).zip(r2) {
                *a = read(px, order[0]);
                *b = read(px, order[1]);
                *c = read(px, order[2]);
            }
        }
        Ok(())
    }

    /// Re-interleave the planes into a packed 3- or 4-component destination.
    ///
    /// A fourth component is set to [`PlaneSample::OPAQUE`].
    ///
    /// # Errors
    ///
    /// As [`set_pixels`](Self::set_pixels), for the destination format.
    pub fn copy_to(&self, dst: &mut BitmapMut<'_>) -> Result<(), BitmapError> {
        interleave(self.planes.each_ref().map(PixelsMut::as_ref), dst)
    }
}

fn interleave<T: PlaneSample>(planes: [PixelsRef<'_, T>; 3], dst: &mut BitmapMut<'_>) -> Result<(), BitmapError> {
    if dst.width() != planes[0].width() || dst.height() != planes[0].height() {
        return Err(BitmapError::DimensionMismatch);
    }
    let format = dst.format();
    let order = component_order::<T>(format)?;
    let has_fourth = format.component_count() == 4;
    let bpc = size_of::<T>();
    let bpp = dst.layout().pixel_bytes();
    for (y, row) in dst.rows_mut().enumerate() {
        let (r0, r1, r2) = (planes[0].row(y), planes[1].row(y), planes[2].row(y));
        for (((px, a), b), c) in row.chunks_exact_mut(bpp).zip(r0).zip(r1).zip(r2) {
            for (plane, value) in [a, b, c].into_iter().enumerate() {
                px[order[plane] * bpc..][..bpc].copy_from_slice(bytes_of(value));
            }
            if has_fourth {
                px[3 * bpc..][..bpc].copy_from_slice(bytes_of(&T::OPAQUE));
            }
        }
    }
    Ok(())
}

impl Planes<'_, f32> {
    fn for_each_plane(&mut self, mut f: impl FnMut(usize, &mut [f32])) {
        for (i, plane) in self.planes.iter_mut().enumerate() {
            for row in plane.rows_mut() {
                f(i, row);
            }
        }
    }

    /// `plane[i] = (plane[i] + add[i]) * mul[i]`.
    pub fn add_multiply(&mut self, add: [f32; 3], mul: [f32; 3]) {
        self.for_each_plane(|i, row| numerics::transform_in_place(row, ScaleOffset::new(add[i], mul[i])));
    }

    /// `plane[i] = plane[i] * mul[i] + add[i]`.
    pub fn multiply_add(&mut self, mul: [f32; 3], add: [f32; 3]) {
        self.for_each_plane(|i, row| numerics::multiply_add_in_place(row, mul[i], add[i]));
    }

    /// Clamp plane `i` into `[min[i], max[i]]`.
    pub fn clamp(&mut self, min: [f32; 3], max: [f32; 3]) {
        self.for_each_plane(|i, row| numerics::clamp_in_place(row, ValueRange::new(min[i], max[i])));
    }
}

// ---------------------------------------------------------------------------
// PlanarBitmap
// ---------------------------------------------------------------------------

/// Three owned planes of equal size, in (R, G, B) order.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanarBitmap<T> {
    planes: [PixelBitmap<T>; 3],
}

impl<T: PlaneSample> PlanarBitmap<T> {
    /// Allocate three zeroed `width x height` planes.
    ///
    /// # Errors
    ///
    /// [`BitmapError::InvalidFormat`] if `T` has no canonical format.
    pub fn new(width: usize, height: usize) -> Result<Self, BitmapError> {
        Ok(Self {
            planes: [
                PixelBitmap::new(width, height)?,
                PixelBitmap::new(width, height)?,
                PixelBitmap::new(width, height)?,
            ],
        })
    }

    /// De-interleave `src` into freshly allocated planes.
    ///
    /// # Errors
    ///
    /// As [`Planes::set_pixels`].
    pub fn from_interleaved(src: BitmapRef<'_>) -> Result<Self, BitmapError> {
        let mut out = Self::new(src.width(), src.height())?;
        out.as_planes().set_pixels(src)?;
        Ok(out)
    }

    /// Width shared by all planes.
    #[inline]
    pub fn width(&self) -> usize {
        self.planes[0].width()
    }

    /// Height shared by all planes.
    #[inline]
    pub fn height(&self) -> usize {
        self.planes[0].height()
    }

    /// Plane `i` (0 = red, 1 = green, 2 = blue).
    ///
    /// # Panics
    ///
    /// Panics if `i > 2`.
    #[inline]
    pub fn plane(&self, i: usize) -> &PixelBitmap<T> {
        &self.planes[i]
    }

    /// Borrow all three planes mutably.
    pub fn as_planes(&mut self) -> Planes<'_, T> {
        let [r, g, b] = &mut self.planes;
        Planes {
            planes: [r.to_pixels_mut(), g.to_pixels_mut(), b.to_pixels_mut()],
        }
    }

    /// Re-interleave into `dst`.
    ///
    /// # Errors
    ///
    /// As [`Planes::copy_to`].
    pub fn copy_to(&self, dst: &mut BitmapMut<'_>) -> Result<(), BitmapError> {
        interleave(self.planes.each_ref().map(PixelBitmap::as_pixels), dst)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
