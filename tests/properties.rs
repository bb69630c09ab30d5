//! Layout, conversion and view properties checked over deterministic grids.

use rasterview::convert::copy_pixels;
use rasterview::numerics::{self, ScaleOffset};
use rasterview::planes::PlanarBitmap;
use rasterview::sampler::{self, Boundary};
use rasterview::{
    Bitmap, BitmapLayout, BitmapMut, BitmapRef, FormatCode, PixelFormat, PixelsRef, Rect,
};

const SIZES: &[usize] = &[0, 1, 2, 3, 7, 16, 33];
const STRIDE_PADDING: &[usize] = &[0, 1, 3, 64];

fn layouts() -> impl Iterator<Item = BitmapLayout> {
    FormatCode::ALL.into_iter().flat_map(|code| {
        SIZES.iter().flat_map(move |&w| {
            SIZES.iter().flat_map(move |&h| {
                STRIDE_PADDING.iter().map(move |&pad| {
                    let format = code.format();
                    let stride = w * format.byte_count() + pad;
                    BitmapLayout::new_stride(w, h, format, stride).unwrap()
                })
            })
        })
    })
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 253) as u8).collect()
}

#[test]
fn total_bytes_formula() {
    for layout in layouts() {
        let expected = if layout.height() == 0 {
            0
        } else {
            layout.stride() * (layout.height() - 1) + layout.pixel_bytes() * layout.width()
        };
        assert_eq!(layout.total_bytes(), expected, "{layout:?}");
    }
}

#[test]
fn contiguous_iff_packed_stride() {
    for layout in layouts() {
        assert_eq!(
            layout.is_contiguous(),
            layout.stride() == layout.width() * layout.pixel_bytes(),
            "{layout:?}"
        );
    }
}

#[test]
fn full_slice_is_identity() {
    for layout in layouts().filter(|l| !l.is_empty()) {
        assert_eq!(layout.slice(layout.bounds()), Ok((0, layout)), "{layout:?}");
    }
}

#[test]
fn slice_composition() {
    let layout = BitmapLayout::new_stride(40, 30, PixelFormat::RGBA32, 200).unwrap();
    let outer = [Rect::new(0, 0, 40, 30), Rect::new(3, 2, 20, 20), Rect::new(10, 7, 30, 23)];
    let inner = [Rect::new(0, 0, 1, 1), Rect::new(1, 4, 5, 6), Rect::new(2, 3, 17, 15)];
    for r1 in outer {
        let (off1, sub) = layout.slice(r1).unwrap();
        for r2 in inner {
            let (off2, nested) = sub.slice(r2).unwrap();
            let (direct_off, direct) = layout.slice(r2.translate(r1.x, r1.y)).unwrap();
            assert_eq!(off1 + off2, direct_off, "{r1:?} then {r2:?}");
            assert_eq!(nested, direct);
        }
    }
}

#[test]
fn slice_of_100x100() {
    let layout = BitmapLayout::new(100, 100, PixelFormat::BGR24);
    let (offset, sub) = layout.slice(Rect::new(10, 10, 20, 20)).unwrap();
    assert_eq!(offset, layout.stride() * 10 + layout.pixel_bytes() * 10);
    assert_eq!((sub.width(), sub.height()), (20, 20));
    assert_eq!(sub.stride(), layout.stride());
}

#[test]
fn lossless_pairs_are_idempotent() {
    let pairs = [
        (PixelFormat::RGB24, PixelFormat::BGR24),
        (PixelFormat::RGBA32, PixelFormat::BGRA32),
        (PixelFormat::BGRA32, PixelFormat::ARGB32),
        (PixelFormat::RGBA32_PREMUL, PixelFormat::BGRA32_PREMUL),
        (PixelFormat::GRAY8, PixelFormat::GRAY16),
        (PixelFormat::RGBA32, PixelFormat::RGBA64),
        (PixelFormat::RGB24, PixelFormat::RGBF32),
    ];
    for (a, b) in pairs {
        for (w, h) in [(1, 1), (5, 3), (17, 9)] {
            let layout = BitmapLayout::new_stride(w, h, a, w * a.byte_count() + 3).unwrap();
            let original = pattern(layout.total_bytes());
            let src = BitmapRef::new(&original, layout).unwrap();

            let mut mid = Bitmap::new(BitmapLayout::new(w, h, b));
            mid.copy_from(src).unwrap();

            let mut back = vec![0u8; layout.total_bytes()];
            let mut dst = BitmapMut::new(&mut back, layout).unwrap();
            copy_pixels(mid.as_ref(), &mut dst).unwrap();

            for y in 0..h {
                let row = layout.scanline_range(y);
                assert_eq!(back[row.clone()], original[row], "{a:?} <-> {b:?}, row {y}");
            }
        }
    }
}

#[test]
fn byte_float_affine_roundtrip() {
    let bytes: Vec<u8> = (0..=255).collect();
    let mut floats = vec![0.0f32; 256];
    numerics::bytes_to_floats(&bytes, &mut floats, ScaleOffset::new(0.0, 1.0 / 255.0)).unwrap();
    let mut back = vec![0u8; 256];
    numerics::floats_to_bytes(&floats, &mut back, ScaleOffset::new(0.0, 255.0)).unwrap();
    for (b, r) in bytes.iter().zip(&back) {
        assert!(b.abs_diff(*r) <= 1, "{b} -> {r}");
    }
}

#[test]
fn planar_roundtrip_is_exact() {
    for format in [PixelFormat::RGB24, PixelFormat::BGR24] {
        for (w, h) in [(1, 1), (4, 4), (13, 5)] {
            let layout = BitmapLayout::new_stride(w, h, format, w * 3 + 2).unwrap();
            let original = pattern(layout.total_bytes());
            let src = BitmapRef::new(&original, layout).unwrap();
            let planes = PlanarBitmap::<u8>::from_interleaved(src).unwrap();

            let mut back = original.clone();
            for y in 0..h {
                back[layout.scanline_range(y)].fill(0);
            }
            planes.copy_to(&mut BitmapMut::new(&mut back, layout).unwrap()).unwrap();
            assert_eq!(back, original, "{format:?} {w}x{h}");
        }
    }
}

#[test]
fn bgr_256_fill_and_read_back() {
    let layout = BitmapLayout::new(256, 1, PixelFormat::BGR24);
    assert_eq!((layout.pixel_bytes(), layout.stride(), layout.total_bytes()), (3, 768, 768));

    let mut bmp = Bitmap::new(layout);
    let px = [10u8, 20, 30];
    for x in 0..256 {
        let src = BitmapRef::new(&px, BitmapLayout::new(1, 1, PixelFormat::BGR24)).unwrap();
        bmp.set_pixels(x, 0, src).unwrap();
    }
    assert_eq!(bmp.pixel(255, 0), &[10, 20, 30]);

    let mut filled = Bitmap::new(layout);
    filled.to_mut().fill(&px).unwrap();
    assert_eq!(filled.as_ref().to_vec(), bmp.as_ref().to_vec());
    let rgb = filled.convert_to(PixelFormat::RGB24).unwrap();
    assert!((0..256).all(|x| rgb.pixel(x, 0) == [30, 20, 10]));
}

#[test]
fn fill_leaves_row_padding_alone() {
    for code in FormatCode::ALL {
        let format = code.format();
        let bpp = format.byte_count();
        let layout = BitmapLayout::new_stride(5, 4, format, 5 * bpp + 7).unwrap();
        let outer: Vec<u8> = (1..=bpp as u8).collect();
        let inner = vec![0x55u8; bpp];
        let mut data = vec![0xAAu8; layout.total_bytes()];
        {
            let mut view = BitmapMut::new(&mut data, layout).unwrap();
            view.fill(&outer).unwrap();
            view.slice(Rect::new(1, 1, 3, 2)).unwrap().fill(&inner).unwrap();
        }
        for y in 0..4 {
            let start = y * layout.stride();
            for x in 0..5 {
                let px = &data[start + x * bpp..][..bpp];
                let expected = if (1..4).contains(&x) && (1..3).contains(&y) { &inner } else { &outer };
                assert_eq!(px, &expected[..], "{format:?} at ({x}, {y})");
            }
            if y < 3 {
                let padding = &data[start + 5 * bpp..start + layout.stride()];
                assert!(padding.iter().all(|&b| b == 0xAA), "{format:?} row {y} padding");
            }
        }
    }
}

#[test]
fn owned_equality_is_by_reference() {
    let mut a = Bitmap::new(BitmapLayout::new(3, 3, PixelFormat::GRAY8));
    a.fill(&[7]).unwrap();
    let b = a.clone();
    let c = Bitmap::from(a.as_ref());

    assert_eq!(a, b);
    assert_eq!(a.as_ref().to_vec(), c.as_ref().to_vec());
    // Same bytes in a different allocation still compare unequal.
    assert_ne!(a, c);
    // Different crops of the same storage compare unequal too.
    assert_ne!(a.slice(Rect::new(0, 0, 1, 1)).unwrap(), a.slice(Rect::new(1, 0, 1, 1)).unwrap());
}

#[test]
fn boundary_sampling_grid() {
    let px: Vec<u8> = (0..12).collect();
    let view = PixelsRef::new(&px, 4, 3).unwrap();
    for y in -5isize..8 {
        for x in -5isize..9 {
            let inside = (0..4).contains(&x) && (0..3).contains(&y);
            let or_default = sampler::sample(view, x, y, Boundary::OrDefault(99)).unwrap();
            if inside {
                assert_eq!(or_default, (y * 4 + x) as u8);
            } else {
                assert_eq!(or_default, 99);
            }
            let cx = x.clamp(0, 3);
            let cy = y.clamp(0, 2);
            assert_eq!(sampler::sample(view, x, y, Boundary::Clamp), Some((cy * 4 + cx) as u8));
            let wx = x.rem_euclid(4);
            let wy = y.rem_euclid(3);
            assert_eq!(sampler::sample(view, x, y, Boundary::Wrap), Some((wy * 4 + wx) as u8));
        }
    }
}
