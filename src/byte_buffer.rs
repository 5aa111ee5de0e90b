//! Bounds-checked byte storage with little-endian scalar access.
//!
//! [`ByteBuffer`] is generic over its storage: readers wrap a borrowed
//! `&[u8]`, the builder owns a `Vec<u8>`. Nothing resizes implicitly; the
//! builder grows its storage through the explicit [`ByteBuffer::grow_front`]
//! reallocation step.

use log::debug;

use crate::scalar::{Scalar, SIZE_UOFFSET};
use crate::{Error, Result};

/// Raw byte storage with bounds-checked scalar reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteBuffer<B> {
    data: B,
}

/// Prueft `offset + size <= len` ohne Ueberlauf.
#[inline(always)]
fn check_range(offset: usize, size: usize, len: usize) -> Result<()> {
    match offset.checked_add(size) {
        Some(end) if end <= len => Ok(()),
        _ => Err(Error::out_of_bounds(offset, size, len)),
    }
}

#[inline]
fn slice_in(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    check_range(offset, len, data.len())?;
    Ok(&data[offset..offset + len])
}

#[inline]
fn get_in<T: Scalar>(data: &[u8], offset: usize) -> Result<T> {
    Ok(T::from_le_slice(slice_in(data, offset, T::SIZE)?))
}

/// Length-prefixed string: `[len:4][bytes...]`. The NUL terminator is not
/// required for reading.
#[inline]
fn string_in(data: &[u8], offset: usize) -> Result<&[u8]> {
    let len = get_in::<u32>(data, offset)? as usize;
    slice_in(data, offset + SIZE_UOFFSET, len)
}

impl<B: AsRef<[u8]>> ByteBuffer<B> {
    /// Wraps existing storage.
    pub fn new(data: B) -> Self {
        Self { data }
    }

    /// Number of bytes in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.as_ref().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole buffer.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Reads a scalar at an absolute byte offset.
    ///
    /// Fails with [`Error::OutOfBounds`] if `offset + size(T)` exceeds the buffer.
    #[inline]
    pub fn get<T: Scalar>(&self, offset: usize) -> Result<T> {
        get_in(self.data.as_ref(), offset)
    }

    /// Returns `len` bytes starting at `offset`.
    #[inline]
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        slice_in(self.data.as_ref(), offset, len)
    }

    /// Reads a length-prefixed byte string (4-byte little-endian length).
    pub fn read_string(&self, offset: usize) -> Result<&[u8]> {
        string_in(self.data.as_ref(), offset)
    }
}

impl<'a> ByteBuffer<&'a [u8]> {
    /// The borrowed bytes with their original lifetime.
    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Like [`ByteBuffer::slice`], but the result outlives `self`.
    #[inline]
    pub fn slice_ref(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        slice_in(self.data, offset, len)
    }

    /// Like [`ByteBuffer::read_string`], but the result outlives `self`.
    #[inline]
    pub fn string_ref(&self, offset: usize) -> Result<&'a [u8]> {
        string_in(self.data, offset)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ByteBuffer<B> {
    /// Writes a scalar at an absolute byte offset. Same bounds contract as [`ByteBuffer::get`].
    #[inline]
    pub fn set<T: Scalar>(&mut self, offset: usize, value: T) -> Result<()> {
        let data = self.data.as_mut();
        check_range(offset, T::SIZE, data.len())?;
        value.write_le(&mut data[offset..offset + T::SIZE]);
        Ok(())
    }

    /// Copies `bytes` to `offset`.
    pub fn set_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let data = self.data.as_mut();
        check_range(offset, bytes.len(), data.len())?;
        data[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Fills `len` bytes at `offset` with zeros.
    pub fn zero(&mut self, offset: usize, len: usize) -> Result<()> {
        let data = self.data.as_mut();
        check_range(offset, len, data.len())?;
        data[offset..offset + len].fill(0);
        Ok(())
    }
}

impl ByteBuffer<Vec<u8>> {
    /// Allocates a zero-filled buffer of `len` bytes.
    pub fn zeroed(len: usize) -> Self {
        Self { data: vec![0u8; len] }
    }

    /// Reallocates to `new_len` bytes, moving the current content to the tail.
    ///
    /// The freed space appears at the front, zero-filled. Fails with
    /// [`Error::BufferTooLarge`] if `new_len > max`. A `new_len` not larger
    /// than the current length is a no-op.
    pub fn grow_front(&mut self, new_len: usize, max: usize) -> Result<()> {
        let old_len = self.data.len();
        if new_len <= old_len {
            return Ok(());
        }
        if new_len > max {
            return Err(Error::BufferTooLarge { requested: new_len, max });
        }
        debug!("[tablebuf] buffer grow {old_len} -> {new_len} bytes");
        let mut grown = vec![0u8; new_len];
        grown[new_len - old_len..].copy_from_slice(&self.data);
        self.data = grown;
        Ok(())
    }

    /// Gibt den internen Vec zurueck.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_reads_little_endian() {
        let buf = ByteBuffer::new(&[0x03u8, 0x00, 0x00, 0x00, 0xFF][..]);
        assert_eq!(buf.get::<i32>(0).unwrap(), 3);
        assert_eq!(buf.get::<u8>(4).unwrap(), 0xFF);
        assert_eq!(buf.get::<i8>(4).unwrap(), -1);
    }

    #[test]
    fn get_past_end_is_out_of_bounds() {
        let buf = ByteBuffer::new(&[0u8; 6][..]);
        assert_eq!(
            buf.get::<u32>(3).unwrap_err(),
            Error::OutOfBounds { offset: 3, size: 4, len: 6 }
        );
        assert!(buf.get::<u16>(4).is_ok());
        assert!(buf.get::<u8>(6).is_err());
    }

    #[test]
    fn get_with_overflowing_offset_is_out_of_bounds() {
        let buf = ByteBuffer::new(&[0u8; 8][..]);
        assert!(matches!(buf.get::<u64>(usize::MAX - 2), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn set_then_get() {
        let mut buf = ByteBuffer::zeroed(16);
        buf.set::<f64>(8, -1.5).unwrap();
        buf.set::<u16>(0, 0xBEEF).unwrap();
        assert_eq!(buf.get::<f64>(8).unwrap(), -1.5);
        assert_eq!(buf.as_slice()[..2].to_vec(), vec![0xEF, 0xBE]);
        assert!(buf.set::<u32>(14, 1).is_err());
    }

    #[test]
    fn read_string_with_terminator() {
        let raw = [3u8, 0, 0, 0, b'a', b'b', b'c', 0];
        let buf = ByteBuffer::new(&raw[..]);
        assert_eq!(buf.read_string(0).unwrap(), b"abc");
    }

    #[test]
    fn read_string_truncated() {
        let raw = [5u8, 0, 0, 0, b'a', b'b'];
        let buf = ByteBuffer::new(&raw[..]);
        assert!(matches!(buf.read_string(0), Err(Error::OutOfBounds { offset: 4, size: 5, len: 6 })));
        // Laengenpraefix selbst abgeschnitten
        assert!(matches!(buf.read_string(4), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn borrowed_views_outlive_wrapper() {
        let raw = vec![2u8, 0, 0, 0, b'o', b'k'];
        let s: &[u8] = {
            let buf = ByteBuffer::new(raw.as_slice());
            buf.string_ref(0).unwrap()
        };
        assert_eq!(s, b"ok");
    }

    #[test]
    fn grow_front_moves_content_to_tail() {
        let mut buf = ByteBuffer::zeroed(4);
        buf.set::<u32>(0, 0xAABB_CCDD).unwrap();
        buf.grow_front(8, 1024).unwrap();
        assert_eq!(buf.len(), 8);
        assert_eq!(buf.get::<u32>(0).unwrap(), 0);
        assert_eq!(buf.get::<u32>(4).unwrap(), 0xAABB_CCDD);
    }

    #[test]
    fn grow_front_respects_maximum() {
        let mut buf = ByteBuffer::zeroed(4);
        assert_eq!(
            buf.grow_front(64, 32).unwrap_err(),
            Error::BufferTooLarge { requested: 64, max: 32 }
        );
        buf.grow_front(2, 32).unwrap();
        assert_eq!(buf.len(), 4);
    }
}
