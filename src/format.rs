//! Pixel format descriptors.
//!
//! A [`PixelFormat`] lists up to four components (channel identity plus
//! storage type) and an alpha interpretation. Its byte size is always the
//! sum of its component sizes, so a format can be checked against a concrete
//! pixel type with nothing more than `size_of`.

use core::fmt;
use core::mem::size_of;

use crate::BitmapError;
use crate::pixel::Pixel;

// ---------------------------------------------------------------------------
// Component descriptors
// ---------------------------------------------------------------------------

/// Storage type of a single component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum ChannelType {
    /// 8-bit unsigned integer.
    U8 = 1,
    /// 16-bit unsigned integer.
    U16 = 2,
    /// 32-bit IEEE float.
    F32 = 3,
}

impl ChannelType {
    /// Byte size of one component value.
    #[inline]
    pub const fn byte_size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::F32 => 4,
        }
    }

    /// Bit width of one component value.
    #[inline]
    pub const fn bit_width(self) -> usize {
        self.byte_size() * 8
    }

    /// Whether values are floating point.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32)
    }

    const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Self::U8),
            2 => Some(Self::U16),
            3 => Some(Self::F32),
            _ => None,
        }
    }
}

/// What a component means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum Channel {
    /// Padding; stored but carries no meaning (the X in BGRX).
    Undefined = 1,
    /// Red.
    Red = 2,
    /// Green.
    Green = 3,
    /// Blue.
    Blue = 4,
    /// Alpha (coverage).
    Alpha = 5,
    /// Luminance (gray).
    Luminance = 6,
}

impl Channel {
    const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Self::Undefined),
            2 => Some(Self::Red),
            3 => Some(Self::Green),
            4 => Some(Self::Blue),
            5 => Some(Self::Alpha),
            6 => Some(Self::Luminance),
            _ => None,
        }
    }
}

/// One component of a pixel: channel identity and storage type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Component {
    /// Channel identity.
    pub channel: Channel,
    /// Storage type.
    pub ty: ChannelType,
}

impl Component {
    /// Create a component descriptor.
    pub const fn new(channel: Channel, ty: ChannelType) -> Self {
        Self { channel, ty }
    }

    // high nibble = channel, low nibble = type; 0 means "no component"
    const fn to_bits(self) -> u8 {
        ((self.channel as u8) << 4) | self.ty as u8
    }

    const fn from_bits(bits: u8) -> Option<Self> {
        match (Channel::from_bits(bits >> 4), ChannelType::from_bits(bits & 0x0F)) {
            (Some(channel), Some(ty)) => Some(Self { channel, ty }),
            _ => None,
        }
    }
}

/// Alpha channel interpretation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum AlphaMode {
    /// No alpha channel.
    #[default]
    None = 0,
    /// Straight (unpremultiplied) alpha.
    Straight = 1,
    /// Color channels are premultiplied by alpha.
    Premultiplied = 2,
}

impl AlphaMode {
    const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::None),
            1 => Some(Self::Straight),
            2 => Some(Self::Premultiplied),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PixelFormat
// ---------------------------------------------------------------------------

/// Maximum number of components in a pixel format.
pub const MAX_COMPONENTS: usize = 4;

/// Compact, immutable pixel format descriptor.
///
/// The default value is the empty format: zero components, zero bytes. It is
/// compatible with every pixel type and is what uninitialized layouts carry.
///
/// Two formats are equal iff their encoded representations
/// ([`to_bits`](Self::to_bits)) are equal.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    components: [u8; MAX_COMPONENTS],
    alpha: AlphaMode,
}

const fn comps<const N: usize>(list: [(Channel, ChannelType); N], alpha: AlphaMode) -> PixelFormat {
    let mut components = [0u8; MAX_COMPONENTS];
    let mut i = 0;
    while i < N {
        components[i] = Component::new(list[i].0, list[i].1).to_bits();
        i += 1;
    }
    PixelFormat { components, alpha }
}

use Channel::{Alpha as A, Blue as B, Green as G, Luminance as L, Red as R, Undefined as X};
use ChannelType::{F32, U8, U16};

impl PixelFormat {
    /// The empty format (zero bytes, compatible with everything).
    pub const EMPTY: Self = Self {
        components: [0; MAX_COMPONENTS],
        alpha: AlphaMode::None,
    };

    /// 8-bit gray.
    pub const GRAY8: Self = comps([(L, U8)], AlphaMode::None);
    /// 16-bit gray.
    pub const GRAY16: Self = comps([(L, U16)], AlphaMode::None);
    /// f32 gray.
    pub const GRAYF32: Self = comps([(L, F32)], AlphaMode::None);
    /// 8-bit gray + straight alpha.
    pub const GRAYA8: Self = comps([(L, U8), (A, U8)], AlphaMode::Straight);
    /// 8-bit R, G, B.
    pub const RGB24: Self = comps([(R, U8), (G, U8), (B, U8)], AlphaMode::None);
    /// 8-bit B, G, R.
    pub const BGR24: Self = comps([(B, U8), (G, U8), (R, U8)], AlphaMode::None);
    /// 8-bit R, G, B, A (straight).
    pub const RGBA32: Self = comps([(R, U8), (G, U8), (B, U8), (A, U8)], AlphaMode::Straight);
    /// 8-bit B, G, R, A (straight).
    pub const BGRA32: Self = comps([(B, U8), (G, U8), (R, U8), (A, U8)], AlphaMode::Straight);
    /// 8-bit A, R, G, B (straight).
    pub const ARGB32: Self = comps([(A, U8), (R, U8), (G, U8), (B, U8)], AlphaMode::Straight);
    /// 8-bit B, G, R plus one padding byte.
    pub const BGRX32: Self = comps([(B, U8), (G, U8), (R, U8), (X, U8)], AlphaMode::None);
    /// 8-bit R, G, B, A (premultiplied).
    pub const RGBA32_PREMUL: Self =
        comps([(R, U8), (G, U8), (B, U8), (A, U8)], AlphaMode::Premultiplied);
    /// 8-bit B, G, R, A (premultiplied).
    pub const BGRA32_PREMUL: Self =
        comps([(B, U8), (G, U8), (R, U8), (A, U8)], AlphaMode::Premultiplied);
    /// 16-bit R, G, B.
    pub const RGB48: Self = comps([(R, U16), (G, U16), (B, U16)], AlphaMode::None);
    /// 16-bit R, G, B, A (straight).
    pub const RGBA64: Self = comps([(R, U16), (G, U16), (B, U16), (A, U16)], AlphaMode::Straight);
    /// f32 R, G, B.
    pub const RGBF32: Self = comps([(R, F32), (G, F32), (B, F32)], AlphaMode::None);
    /// f32 B, G, R.
    pub const BGRF32: Self = comps([(B, F32), (G, F32), (R, F32)], AlphaMode::None);
    /// f32 R, G, B, A (straight).
    pub const RGBAF32: Self = comps([(R, F32), (G, F32), (B, F32), (A, F32)], AlphaMode::Straight);
    /// f32 B, G, R, A (straight).
    pub const BGRAF32: Self = comps([(B, F32), (G, F32), (R, F32), (A, F32)], AlphaMode::Straight);

    /// Build a format from explicit components.
    ///
    /// # Errors
    ///
    /// [`BitmapError::InvalidFormat`] if there are no components or more than
    /// four, or if `alpha` disagrees with the presence of an
    /// [`Channel::Alpha`] component.
    pub fn new(components: &[Component], alpha: AlphaMode) -> Result<Self, BitmapError> {
        if components.is_empty() || components.len() > MAX_COMPONENTS {
            return Err(BitmapError::InvalidFormat);
        }
        let has_alpha_channel = components.iter().any(|c| c.channel == Channel::Alpha);
        if has_alpha_channel == (alpha == AlphaMode::None) {
            return Err(BitmapError::InvalidFormat);
        }
        let mut packed = [0u8; MAX_COMPONENTS];
        for (slot, c) in packed.iter_mut().zip(components) {
            *slot = c.to_bits();
        }
        Ok(Self {
            components: packed,
            alpha,
        })
    }

    /// Number of components.
    #[inline]
    pub const fn component_count(&self) -> usize {
        let mut n = 0;
        while n < MAX_COMPONENTS && self.components[n] != 0 {
            n += 1;
        }
        n
    }

    /// Component at `index`, if present.
    #[inline]
    pub const fn component(&self, index: usize) -> Option<Component> {
        if index >= MAX_COMPONENTS {
            return None;
        }
        Component::from_bits(self.components[index])
    }

    /// Iterate over the components in memory order.
    pub fn components(&self) -> impl Iterator<Item = Component> + '_ {
        self.components.iter().map_while(|&b| Component::from_bits(b))
    }

    /// Channel of the first component (used for BGR vs RGB decisions).
    #[inline]
    pub const fn first_channel(&self) -> Option<Channel> {
        match self.component(0) {
            Some(c) => Some(c.channel),
            None => None,
        }
    }

    /// Byte size of one pixel; the sum of the component sizes.
    #[inline]
    pub const fn byte_count(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < MAX_COMPONENTS {
            if let Some(c) = Component::from_bits(self.components[i]) {
                total += c.ty.byte_size();
            }
            i += 1;
        }
        total
    }

    /// Bit size of one pixel.
    #[inline]
    pub const fn bit_count(&self) -> usize {
        self.byte_count() * 8
    }

    /// Whether this is the empty format.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.components[0] == 0
    }

    /// Alpha interpretation.
    #[inline]
    pub const fn alpha_mode(&self) -> AlphaMode {
        self.alpha
    }

    /// Whether the format has an alpha component.
    #[inline]
    pub const fn has_alpha(&self) -> bool {
        !matches!(self.alpha, AlphaMode::None)
    }

    /// Whether the format has straight (unpremultiplied) alpha.
    #[inline]
    pub const fn has_unpremultiplied_alpha(&self) -> bool {
        matches!(self.alpha, AlphaMode::Straight)
    }

    /// Whether color components are premultiplied by alpha.
    #[inline]
    pub const fn is_premultiplied(&self) -> bool {
        matches!(self.alpha, AlphaMode::Premultiplied)
    }

    /// Storage type shared by every component, if they all agree.
    pub fn uniform_channel_type(&self) -> Option<ChannelType> {
        let mut iter = self.components();
        let first = iter.next()?.ty;
        iter.all(|c| c.ty == first).then_some(first)
    }

    /// Whether every component is floating point.
    pub fn is_floating_point(&self) -> bool {
        self.uniform_channel_type().is_some_and(ChannelType::is_float)
    }

    /// Whether a pixel type `P` can represent this format.
    ///
    /// True iff `size_of::<P>() == byte_count()`. The empty format is
    /// compatible with every type.
    #[inline]
    pub fn is_compatible<P: Pixel>(&self) -> bool {
        self.is_empty() || self.byte_count() == size_of::<P>()
    }

    /// Like [`is_compatible`](Self::is_compatible), but reports the mismatch.
    ///
    /// # Errors
    ///
    /// [`BitmapError::PixelFormatMismatch`] when the byte sizes disagree.
    pub fn check_compatible<P: Pixel>(&self) -> Result<(), BitmapError> {
        if self.is_compatible::<P>() {
            Ok(())
        } else {
            Err(BitmapError::PixelFormatMismatch {
                expected: self.byte_count(),
                actual: size_of::<P>(),
            })
        }
    }

    /// Canonical format of a known pixel type, if it has one.
    #[inline]
    pub const fn identify<P: Pixel>() -> Option<PixelFormat> {
        P::FORMAT
    }

    /// Dense code for canonical formats; `None` for custom ones.
    pub fn code(&self) -> Option<FormatCode> {
        FormatCode::ALL.iter().copied().find(|c| c.format() == *self)
    }

    /// Encoded representation: components in bytes 0..4, alpha mode in byte 4.
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        u32::from_le_bytes(self.components) as u64 | ((self.alpha as u64) << 32)
    }

    /// Decode a value produced by [`to_bits`](Self::to_bits).
    ///
    /// # Errors
    ///
    /// [`BitmapError::InvalidFormat`] for unknown codes, gaps between
    /// components, or an alpha mode that disagrees with the components.
    pub fn from_bits(bits: u64) -> Result<Self, BitmapError> {
        if bits >> 40 != 0 {
            return Err(BitmapError::InvalidFormat);
        }
        let alpha = AlphaMode::from_bits((bits >> 32) as u8).ok_or(BitmapError::InvalidFormat)?;
        let raw = (bits as u32).to_le_bytes();
        if raw == [0; MAX_COMPONENTS] {
            return if alpha == AlphaMode::None {
                Ok(Self::EMPTY)
            } else {
                Err(BitmapError::InvalidFormat)
            };
        }
        let n = raw.iter().take_while(|&&b| b != 0).count();
        if raw[n..].iter().any(|&b| b != 0) {
            return Err(BitmapError::InvalidFormat);
        }
        let mut list = [Component::new(Channel::Undefined, ChannelType::U8); MAX_COMPONENTS];
        for (slot, &b) in list.iter_mut().zip(&raw[..n]) {
            *slot = Component::from_bits(b).ok_or(BitmapError::InvalidFormat)?;
        }
        Self::new(&list[..n], alpha)
    }
}

impl fmt::Debug for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("PixelFormat(Empty)");
        }
        if let Some(code) = self.code() {
            return write!(f, "PixelFormat({code:?})");
        }
        f.write_str("PixelFormat(")?;
        for (i, c) in self.components().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}:{:?}", c.channel, c.ty)?;
        }
        write!(f, "; {:?})", self.alpha)
    }
}

// ---------------------------------------------------------------------------
// FormatCode
// ---------------------------------------------------------------------------

/// Dense tag for each canonical format.
///
/// Indexes the converter table in [`crate::convert`]. Adding a canonical
/// format means adding a variant here, a row in [`FormatCode::ALL`], and
/// registering its converters explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FormatCode {
    Gray8,
    Gray16,
    GrayF32,
    GrayA8,
    Rgb24,
    Bgr24,
    Rgba32,
    Bgra32,
    Argb32,
    Bgrx32,
    Rgba32Premul,
    Bgra32Premul,
    Rgb48,
    Rgba64,
    RgbF32,
    BgrF32,
    RgbaF32,
    BgraF32,
}

impl FormatCode {
    /// Number of canonical formats.
    pub const COUNT: usize = 18;

    /// Every code, in discriminant order.
    pub const ALL: [FormatCode; Self::COUNT] = [
        Self::Gray8,
        Self::Gray16,
        Self::GrayF32,
        Self::GrayA8,
        Self::Rgb24,
        Self::Bgr24,
        Self::Rgba32,
        Self::Bgra32,
        Self::Argb32,
        Self::Bgrx32,
        Self::Rgba32Premul,
        Self::Bgra32Premul,
        Self::Rgb48,
        Self::Rgba64,
        Self::RgbF32,
        Self::BgrF32,
        Self::RgbaF32,
        Self::BgraF32,
    ];

    /// Table index.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The format this code stands for.
    pub const fn format(self) -> PixelFormat {
        match self {
            Self::Gray8 => PixelFormat::GRAY8,
            Self::Gray16 => PixelFormat::GRAY16,
            Self::GrayF32 => PixelFormat::GRAYF32,
            Self::GrayA8 => PixelFormat::GRAYA8,
            Self::Rgb24 => PixelFormat::RGB24,
            Self::Bgr24 => PixelFormat::BGR24,
            Self::Rgba32 => PixelFormat::RGBA32,
            Self::Bgra32 => PixelFormat::BGRA32,
            Self::Argb32 => PixelFormat::ARGB32,
            Self::Bgrx32 => PixelFormat::BGRX32,
            Self::Rgba32Premul => PixelFormat::RGBA32_PREMUL,
            Self::Bgra32Premul => PixelFormat::BGRA32_PREMUL,
            Self::Rgb48 => PixelFormat::RGB48,
            Self::Rgba64 => PixelFormat::RGBA64,
            Self::RgbF32 => PixelFormat::RGBF32,
            Self::BgrF32 => PixelFormat::BGRF32,
            Self::RgbaF32 => PixelFormat::RGBAF32,
            Self::BgraF32 => PixelFormat::BGRAF32,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use rgb::{Bgr, Bgra, Rgb, Rgba};

    #[test]
    fn byte_counts() {
        assert_eq!(PixelFormat::EMPTY.byte_count(), 0);
        assert_eq!(PixelFormat::GRAY8.byte_count(), 1);
        assert_eq!(PixelFormat::GRAY16.byte_count(), 2);
        assert_eq!(PixelFormat::GRAYA8.byte_count(), 2);
        assert_eq!(PixelFormat::BGR24.byte_count(), 3);
        assert_eq!(PixelFormat::BGRA32.byte_count(), 4);
        assert_eq!(PixelFormat::RGB48.byte_count(), 6);
        assert_eq!(PixelFormat::RGBA64.byte_count(), 8);
        assert_eq!(PixelFormat::RGBF32.byte_count(), 12);
        assert_eq!(PixelFormat::RGBAF32.byte_count(), 16);
    }

    #[test]
    fn byte_count_matches_bit_widths() {
        for code in FormatCode::ALL {
            let f = code.format();
            let bits: usize = f.components().map(|c| c.ty.bit_width()).sum();
            assert_eq!(f.bit_count(), bits, "{code:?}");
        }
    }

    #[test]
    fn default_is_empty() {
        assert_eq!(PixelFormat::default(), PixelFormat::EMPTY);
        assert!(PixelFormat::default().is_empty());
        assert_eq!(PixelFormat::EMPTY.component_count(), 0);
        assert_eq!(PixelFormat::EMPTY.first_channel(), None);
    }

    #[test]
    fn compatibility_is_byte_size() {
        assert!(PixelFormat::BGR24.is_compatible::<Bgr<u8>>());
        assert!(PixelFormat::BGR24.is_compatible::<Rgb<u8>>());
        assert!(PixelFormat::BGR24.is_compatible::<[u8; 3]>());
        assert!(!PixelFormat::BGR24.is_compatible::<Bgra<u8>>());
        assert!(PixelFormat::BGRA32.is_compatible::<u32>());
        assert_eq!(
            PixelFormat::BGR24.check_compatible::<Rgba<u8>>(),
            Err(BitmapError::PixelFormatMismatch {
                expected: 3,
                actual: 4
            })
        );
    }

    #[test]
    fn empty_format_accepts_everything() {
        assert!(PixelFormat::EMPTY.is_compatible::<u8>());
        assert!(PixelFormat::EMPTY.is_compatible::<Rgba<f32>>());
        assert!(PixelFormat::EMPTY.check_compatible::<[u8; 3]>().is_ok());
    }

    #[test]
    fn identify_known_types() {
        assert_eq!(PixelFormat::identify::<Rgb<u8>>(), Some(PixelFormat::RGB24));
        assert_eq!(PixelFormat::identify::<Bgra<u8>>(), Some(PixelFormat::BGRA32));
        assert_eq!(PixelFormat::identify::<Rgba<f32>>(), Some(PixelFormat::RGBAF32));
        assert_eq!(PixelFormat::identify::<u8>(), Some(PixelFormat::GRAY8));
        assert_eq!(PixelFormat::identify::<[u8; 3]>(), None);
        assert_eq!(PixelFormat::identify::<u32>(), None);
    }

    #[test]
    fn alpha_flags() {
        assert!(PixelFormat::RGBA32.has_unpremultiplied_alpha());
        assert!(!PixelFormat::RGBA32.is_premultiplied());
        assert!(PixelFormat::RGBA32_PREMUL.is_premultiplied());
        assert!(!PixelFormat::RGBA32_PREMUL.has_unpremultiplied_alpha());
        assert!(!PixelFormat::BGRX32.has_alpha());
        assert!(!PixelFormat::RGB24.has_alpha());
    }

    #[test]
    fn premultiplied_differs_from_straight() {
        assert_ne!(PixelFormat::RGBA32, PixelFormat::RGBA32_PREMUL);
        assert_eq!(PixelFormat::RGBA32.byte_count(), PixelFormat::RGBA32_PREMUL.byte_count());
    }

    #[test]
    fn first_channel_distinguishes_bgr() {
        assert_eq!(PixelFormat::BGR24.first_channel(), Some(Channel::Blue));
        assert_eq!(PixelFormat::RGB24.first_channel(), Some(Channel::Red));
        assert_eq!(PixelFormat::ARGB32.first_channel(), Some(Channel::Alpha));
    }

    #[test]
    fn new_validates_alpha_and_count() {
        let r = Component::new(Channel::Red, ChannelType::U8);
        let a = Component::new(Channel::Alpha, ChannelType::U8);
        assert_eq!(PixelFormat::new(&[], AlphaMode::None), Err(BitmapError::InvalidFormat));
        assert_eq!(PixelFormat::new(&[r, a], AlphaMode::None), Err(BitmapError::InvalidFormat));
        assert_eq!(PixelFormat::new(&[r], AlphaMode::Straight), Err(BitmapError::InvalidFormat));
        assert_eq!(
            PixelFormat::new(&[r; 5], AlphaMode::None),
            Err(BitmapError::InvalidFormat)
        );
        let custom = PixelFormat::new(&[r, a], AlphaMode::Straight).unwrap();
        assert_eq!(custom.byte_count(), 2);
        assert_eq!(custom.code(), None);
    }

    #[test]
    fn bits_roundtrip_every_canonical_format() {
        for code in FormatCode::ALL {
            let f = code.format();
            assert_eq!(PixelFormat::from_bits(f.to_bits()), Ok(f), "{code:?}");
            assert_eq!(f.code(), Some(code));
        }
        assert_eq!(PixelFormat::from_bits(0), Ok(PixelFormat::EMPTY));
    }

    #[test]
    fn from_bits_rejects_garbage() {
        assert_eq!(PixelFormat::from_bits(0xFF), Err(BitmapError::InvalidFormat));
        // gap between components
        let gap = (PixelFormat::GRAY8.to_bits() & 0xFF) | (0x21 << 16);
        assert_eq!(PixelFormat::from_bits(gap), Err(BitmapError::InvalidFormat));
        assert_eq!(PixelFormat::from_bits(1 << 50), Err(BitmapError::InvalidFormat));
    }

    #[test]
    fn float_detection() {
        assert!(PixelFormat::RGBF32.is_floating_point());
        assert!(!PixelFormat::RGB24.is_floating_point());
        assert!(!PixelFormat::EMPTY.is_floating_point());
        assert_eq!(PixelFormat::RGBA64.uniform_channel_type(), Some(ChannelType::U16));
    }

    #[test]
    fn debug_names_canonical_formats() {
        assert_eq!(format!("{:?}", PixelFormat::BGR24), "PixelFormat(Bgr24)");
        assert_eq!(format!("{:?}", PixelFormat::EMPTY), "PixelFormat(Empty)");
    }

    #[test]
    fn codes_are_dense() {
        for (i, code) in FormatCode::ALL.iter().enumerate() {
            assert_eq!(code.index(), i);
        }
    }
}
