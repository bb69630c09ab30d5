use thiserror::Error;

/// Errors from layout construction, view construction and pixel operations.
///
/// Every variant is raised at the point where the precondition is violated;
/// nothing is retried and nothing falls back to a default value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BitmapError {
    /// A pixel type's byte size disagrees with the pixel format.
    #[error("pixel type is {actual} bytes but the format requires {expected}")]
    PixelFormatMismatch {
        /// Byte count declared by the pixel format.
        expected: usize,
        /// Byte size of the concrete pixel type.
        actual: usize,
    },
    /// Rectangle or coordinate lies outside the layout bounds.
    #[error("rectangle or coordinate is outside the bitmap bounds")]
    OutOfBounds,
    /// Two operands must share width and height but don't.
    #[error("operands have different dimensions")]
    DimensionMismatch,
    /// No row converter is registered between the two formats.
    #[error("no converter registered for this pixel format pair")]
    UnsupportedFormatPair,
    /// The planes of a multi-plane view have different sizes.
    #[error("planes have different dimensions")]
    PlaneSizeMismatch,
    /// Explicit stride is smaller than `width * pixel_bytes`.
    #[error("stride is smaller than width * pixel_bytes")]
    StrideTooSmall,
    /// Memory region is shorter than the layout requires.
    #[error("memory region holds {actual} bytes but the layout requires {required}")]
    InsufficientData {
        /// Bytes needed by the layout (`total_bytes`).
        required: usize,
        /// Bytes available.
        actual: usize,
    },
    /// Memory is not aligned for the requested pixel type.
    #[error("memory is not aligned for the pixel type")]
    Misaligned,
    /// Mutable access was requested from a read-only view.
    #[error("view is read-only")]
    ReadOnly,
    /// A persisted layout header is malformed.
    #[error("malformed bitmap header")]
    InvalidHeader,
    /// Input ended before the header or pixel data was complete.
    #[error("input is truncated")]
    Truncated,
    /// Width, stride or total size of a layout doesn't fit in `usize`.
    #[error("layout size overflows usize")]
    SizeOverflow,
    /// Components cannot form a pixel format.
    #[error("invalid pixel format components")]
    InvalidFormat,
}
