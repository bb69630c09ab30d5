//! Raw bitmap persistence: a fixed 24-byte layout header followed by pixel
//! bytes.
//!
//! | Offset | Type | Field |
//! |---|---|---|
//! | 0 | `i32` LE | width |
//! | 4 | `i32` LE | height |
//! | 8 | `i32` LE | pixel byte size |
//! | 12 | `i32` LE | stride |
//! | 16 | `u64` LE | [`PixelFormat::to_bits`] |
//!
//! The header is followed by exactly `total_bytes` of pixel data, laid out
//! with the stored stride (no trailing padding after the last row).

use alloc::vec::Vec;

use crate::{Bitmap, BitmapError, BitmapLayout, PixelFormat};

/// Size of the encoded layout header in bytes.
pub const HEADER_LEN: usize = 24;

fn to_field(v: usize) -> Result<[u8; 4], BitmapError> {
    i32::try_from(v)
        .map(i32::to_le_bytes)
        .map_err(|_| BitmapError::InvalidHeader)
}

fn from_field(bytes: &[u8]) -> Result<usize, BitmapError> {
    let mut le = [0u8; 4];
    le.copy_from_slice(bytes);
    usize::try_from(i32::from_le_bytes(le)).map_err(|_| BitmapError::InvalidHeader)
}

fn decode(header: &[u8]) -> Result<BitmapLayout, BitmapError> {
    if header.len() < HEADER_LEN {
        return Err(BitmapError::Truncated);
    }
    let width = from_field(&header[0..4])?;
    let height = from_field(&header[4..8])?;
    let pixel_bytes = from_field(&header[8..12])?;
    let stride = from_field(&header[12..16])?;
    let mut bits = [0u8; 8];
    bits.copy_from_slice(&header[16..24]);
    let format = PixelFormat::from_bits(u64::from_le_bytes(bits)).map_err(|_| BitmapError::InvalidHeader)?;

    if pixel_bytes != format.byte_count() {
        return Err(BitmapError::InvalidHeader);
    }
    if pixel_bytes == 0 {
        // Only the all-zero header describes a zero-byte format.
        return if width == 0 && height == 0 && stride == 0 {
            Ok(BitmapLayout::EMPTY)
        } else {
            Err(BitmapError::InvalidHeader)
        };
    }
    let row_bytes = width.checked_mul(pixel_bytes).ok_or(BitmapError::InvalidHeader)?;
    if stride < row_bytes {
        return Err(BitmapError::InvalidHeader);
    }
    if height > 0 {
        stride
            .checked_mul(height - 1)
            .and_then(|v| v.checked_add(row_bytes))
            .ok_or(BitmapError::InvalidHeader)?;
    }
    BitmapLayout::new_stride(width, height, format, stride).map_err(|_| BitmapError::InvalidHeader)
}

impl BitmapLayout {
    /// Append the 24-byte header describing this layout to `out`.
    ///
    /// # Errors
    ///
    /// [`BitmapError::InvalidHeader`] if a dimension doesn't fit in an `i32`.
    pub fn write_header(&self, out: &mut Vec<u8>) -> Result<(), BitmapError> {
        let mut header = [0u8; HEADER_LEN];
        header[0..4].copy_from_slice(&to_field(self.width())?);
        header[4..8].copy_from_slice(&to_field(self.height())?);
        header[8..12].copy_from_slice(&to_field(self.pixel_bytes())?);
        header[12..16].copy_from_slice(&to_field(self.stride())?);
        header[16..24].copy_from_slice(&self.format().to_bits().to_le_bytes());
        out.extend_from_slice(&header);
        Ok(())
    }

    /// Decode a header from the front of `data`, returning the layout and
    /// the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// [`BitmapError::Truncated`] if `data` is shorter than [`HEADER_LEN`],
    /// [`BitmapError::InvalidHeader`] for negative fields, an unknown
    /// format, a stride shorter than a row, or a pixel byte size that
    /// disagrees with the stored format.
    pub fn read_header(data: &[u8]) -> Result<(BitmapLayout, usize), BitmapError> {
        match decode(data) {
            Ok(layout) => Ok((layout, HEADER_LEN)),
            Err(e) => {
                log::debug!("rejected bitmap header: {e}");
                Err(e)
            }
        }
    }
}

impl Bitmap {
    /// Append the layout header and the pixel bytes to `out`.
    ///
    /// # Errors
    ///
    /// As [`BitmapLayout::write_header`].
    pub fn write_raw(&self, out: &mut Vec<u8>) -> Result<(), BitmapError> {
        let view = self.as_ref();
        out.reserve(HEADER_LEN + view.as_bytes().len());
        self.layout().write_header(out)?;
        out.extend_from_slice(view.as_bytes());
        Ok(())
    }

    /// Decode a bitmap written by [`write_raw`](Self::write_raw) into a new
    /// allocation. Bytes past the pixel data are ignored.
    ///
    /// # Errors
    ///
    /// As [`BitmapLayout::read_header`], plus [`BitmapError::Truncated`] if
    /// fewer than `total_bytes` of pixel data follow the header.
    pub fn read_raw(data: &[u8]) -> Result<Bitmap, BitmapError> {
        let (layout, consumed) = BitmapLayout::read_header(data)?;
        let Some(pixels) = data[consumed..].get(..layout.total_bytes()) else {
            log::debug!(
                "raw bitmap truncated: {} of {} pixel bytes",
                data.len() - consumed,
                layout.total_bytes()
            );
            return Err(BitmapError::Truncated);
        };
        let mut bitmap = Bitmap::new(layout);
        bitmap.to_mut().as_bytes_mut().copy_from_slice(pixels);
        Ok(bitmap)
    }
}

#[cfg(feature = "std")]
impl Bitmap {
    /// Stream the header and pixel bytes to `w`.
    ///
    /// # Errors
    ///
    /// Any I/O error from `w`; a layout that can't be encoded is reported
    /// as [`std::io::ErrorKind::InvalidInput`].
    pub fn write_raw_to(&self, mut w: impl std::io::Write) -> std::io::Result<()> {
        let mut header = Vec::with_capacity(HEADER_LEN);
        self.layout()
            .write_header(&mut header)
            .map_err(|e| io_error(std::io::ErrorKind::InvalidInput, e))?;
        w.write_all(&header)?;
        w.write_all(self.as_ref().as_bytes())
    }

    /// Read a bitmap written by [`write_raw_to`](Self::write_raw_to).
    ///
    /// # Errors
    ///
    /// Any I/O error from `r` (a short stream is
    /// [`std::io::ErrorKind::UnexpectedEof`]); a malformed header is
    /// [`std::io::ErrorKind::InvalidData`].
    pub fn read_raw_from(mut r: impl std::io::Read) -> std::io::Result<Bitmap> {
        use std::io::Read as _;
        let mut header = [0u8; HEADER_LEN];
        r.read_exact(&mut header)?;
        let (layout, _) = BitmapLayout::read_header(&header)
            .map_err(|e| io_error(std::io::ErrorKind::InvalidData, e))?;
        let total = layout.total_bytes();
        let limit = u64::try_from(total).map_err(|_| io_error(std::io::ErrorKind::InvalidData, BitmapError::SizeOverflow))?;
        // The header is untrusted: grow with the data actually read rather
        // than allocating `total` up front.
        let mut data = Vec::new();
        data.try_reserve(total.min(READ_CHUNK))
            .map_err(|_| std::io::Error::from(std::io::ErrorKind::OutOfMemory))?;
        r.take(limit).read_to_end(&mut data)?;
        if data.len() != total {
            log::debug!("raw bitmap stream ended after {} of {total} pixel bytes", data.len());
            return Err(io_error(std::io::ErrorKind::UnexpectedEof, BitmapError::Truncated));
        }
        Bitmap::from_vec(data, layout).map_err(|e| io_error(std::io::ErrorKind::InvalidData, e))
    }
}

/// Initial buffer for streamed pixel data.
#[cfg(feature = "std")]
const READ_CHUNK: usize = 1 << 20;

#[cfg(feature = "std")]
fn io_error(kind: std::io::ErrorKind, e: BitmapError) -> std::io::Error {
    std::io::Error::new(kind, e)
}
