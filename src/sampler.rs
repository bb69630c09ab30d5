//! Edge policies for sampling outside a view.
//!
//! Each policy maps signed coordinates onto the view (or onto a fallback
//! value) and then reads through the normal typed addressing.

use crate::{Pixel, PixelsRef};

/// What to return for coordinates outside the view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Boundary<P> {
    /// The given pixel.
    OrDefault(P),
    /// The nearest edge pixel.
    Clamp,
    /// Wrap around modulo the dimensions.
    Wrap,
}

/// Sample `(x, y)` under `boundary`.
///
/// Empty views have no pixel to clamp or wrap to, so those policies
/// return `None`; `OrDefault` still returns its default.
pub fn sample<P: Pixel>(view: PixelsRef<'_, P>, x: isize, y: isize, boundary: Boundary<P>) -> Option<P> {
    match boundary {
        Boundary::OrDefault(default) => Some(sample_or_default(view, x, y, default)),
        Boundary::Clamp => sample_clamp(view, x, y),
        Boundary::Wrap => sample_wrap(view, x, y),
    }
}

/// The pixel at `(x, y)` if it's inside the view, else `default`.
pub fn sample_or_default<P: Pixel>(view: PixelsRef<'_, P>, x: isize, y: isize, default: P) -> P {
    match (usize::try_from(x), usize::try_from(y)) {
        (Ok(x), Ok(y)) if view.layout().contains(x, y) => view.get(x, y),
        _ => default,
    }
}

/// The pixel at `(x, y)` with both coordinates clamped into the view.
pub fn sample_clamp<P: Pixel>(view: PixelsRef<'_, P>, x: isize, y: isize) -> Option<P> {
    if view.is_empty() {
        return None;
    }
    Some(view.get(clamp(x, view.width()), clamp(y, view.height())))
}

/// The pixel at `(x, y)` with both coordinates wrapped modulo the dimensions.
pub fn sample_wrap<P: Pixel>(view: PixelsRef<'_, P>, x: isize, y: isize) -> Option<P> {
    if view.is_empty() {
        return None;
    }
    Some(view.get(wrap(x, view.width()), wrap(y, view.height())))
}

#[inline]
fn clamp(v: isize, len: usize) -> usize {
    usize::try_from(v).map_or(0, |v| v.min(len - 1))
}

#[inline]
fn wrap(v: isize, len: usize) -> usize {
    match isize::try_from(len) {
        Ok(n) => v.rem_euclid(n).unsigned_abs(),
        // Dimensions past isize::MAX: every isize is already in range or negative.
        Err(_) => usize::try_from(v).unwrap_or_else(|_| len - v.unsigned_abs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn grid() -> Vec<u8> {
        (0..12).collect()
    }

    #[test]
    fn inside_is_identical_for_every_policy() {
        let data = grid();
        let view = PixelsRef::new(&data, 4, 3).unwrap();
        for boundary in [Boundary::OrDefault(255), Boundary::Clamp, Boundary::Wrap] {
            assert_eq!(view.sample(2, 1, boundary), Some(6));
        }
    }

    #[test]
    fn or_default_outside() {
        let data = grid();
        let view = PixelsRef::new(&data, 4, 3).unwrap();
        assert_eq!(sample_or_default(view, -1, 0, 200), 200);
        assert_eq!(sample_or_default(view, 4, 0, 200), 200);
        assert_eq!(sample_or_default(view, 0, 3, 200), 200);
        assert_eq!(sample_or_default(view, 3, 2, 200), 11);
    }

    #[test]
    fn clamp_outside() {
        let data = grid();
        let view = PixelsRef::new(&data, 4, 3).unwrap();
        assert_eq!(sample_clamp(view, -5, -5), Some(0));
        assert_eq!(sample_clamp(view, 100, 0), Some(3));
        assert_eq!(sample_clamp(view, 100, 100), Some(11));
        assert_eq!(sample_clamp(view, 1, isize::MIN), Some(1));
    }

    #[test]
    fn wrap_outside() {
        let data = grid();
        let view = PixelsRef::new(&data, 4, 3).unwrap();
        assert_eq!(sample_wrap(view, 4, 0), Some(0));
        assert_eq!(sample_wrap(view, -1, 0), Some(3));
        assert_eq!(sample_wrap(view, -1, -1), Some(11));
        assert_eq!(sample_wrap(view, 9, 7), Some(5));
    }

    #[test]
    fn empty_view() {
        let data: Vec<u8> = Vec::new();
        let view = PixelsRef::new(&data, 0, 0).unwrap();
        assert_eq!(view.sample(0, 0, Boundary::OrDefault(7)), Some(7));
        assert_eq!(view.sample(0, 0, Boundary::Clamp), None);
        assert_eq!(view.sample(0, 0, Boundary::Wrap), None);
    }
}
