//! Per-shape field layout tables.
//!
//! Layout on the wire:
//!
//! ```text
//! [vtable byte-size:2][object byte-size:2][field offset:2] * N
//! ```
//!
//! Entry `i` holds the byte offset of slot `i` relative to the table start,
//! or 0 when the field is absent. Slots beyond `N` are absent as well, which
//! lets writers trim trailing absent slots.

use crate::byte_buffer::ByteBuffer;
use crate::scalar::{VOffset, SIZE_VOFFSET};
use crate::{Error, Result};

/// Size of the two leading vtable entries (vtable size, object size).
pub const VTABLE_HEADER_SIZE: usize = 2 * SIZE_VOFFSET;

/// Position of a slot's entry inside the vtable (`4 + 2 * slot`).
#[inline]
pub const fn voffset_for_slot(slot: usize) -> usize {
    VTABLE_HEADER_SIZE + SIZE_VOFFSET * slot
}

/// Read view of a vtable inside a buffer.
#[derive(Debug, Clone, Copy)]
pub struct VTable<'a> {
    buf: ByteBuffer<&'a [u8]>,
    pos: usize,
    byte_len: usize,
    object_size: usize,
}

impl<'a> VTable<'a> {
    /// Validates and opens the vtable at `pos`.
    ///
    /// Fails with [`Error::MalformedBuffer`] if the vtable is not fully inside
    /// the buffer or its byte-size is inconsistent with a whole number of entries.
    pub fn init(buf: ByteBuffer<&'a [u8]>, pos: usize) -> Result<Self> {
        let byte_len = buf
            .get::<u16>(pos)
            .map_err(|_| Error::malformed(format!("vtable at {pos} lies outside the buffer")))?
            as usize;
        if byte_len < VTABLE_HEADER_SIZE || byte_len % SIZE_VOFFSET != 0 {
            return Err(Error::malformed(format!(
                "vtable at {pos} declares inconsistent size {byte_len}"
            )));
        }
        if buf.slice(pos, byte_len).is_err() {
            return Err(Error::malformed(format!(
                "vtable at {pos} with size {byte_len} exceeds buffer length {}",
                buf.len()
            )));
        }
        let object_size = buf.get::<u16>(pos + SIZE_VOFFSET)? as usize;
        if object_size < crate::scalar::SIZE_SOFFSET {
            return Err(Error::malformed(format!(
                "vtable at {pos} declares object size {object_size}"
            )));
        }
        Ok(Self { buf, pos, byte_len, object_size })
    }

    /// Absolute position of the vtable.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Vtable size in bytes, header included.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Inline size of the table object, soffset included.
    pub fn object_size(&self) -> usize {
        self.object_size
    }

    /// Number of slots the vtable describes.
    pub fn num_fields(&self) -> usize {
        (self.byte_len - VTABLE_HEADER_SIZE) / SIZE_VOFFSET
    }

    /// Byte offset of `slot` relative to the table start; 0 means absent.
    #[inline]
    pub fn offset_of(&self, slot: usize) -> VOffset {
        if slot >= self.num_fields() {
            return 0;
        }
        // Bereich wurde in init() geprueft
        self.buf.get::<u16>(self.pos + voffset_for_slot(slot)).unwrap_or(0)
    }

    /// The raw vtable bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.buf.slice_ref(self.pos, self.byte_len).unwrap_or(&[])
    }
}

/// Write-side vtable: collected while an object is built, emitted by `end_object`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VTableLayout {
    object_size: VOffset,
    entries: Vec<VOffset>,
}

impl VTableLayout {
    /// Builds the layout from `(slot, offset-within-object)` pairs.
    ///
    /// Slots without a pair (skipped at their default) keep offset 0; trailing
    /// absent slots are not emitted.
    pub fn from_fields(object_size: VOffset, fields: &[(usize, VOffset)]) -> Self {
        let count = fields
            .iter()
            .filter(|&&(_, off)| off != 0)
            .map(|&(slot, _)| slot + 1)
            .max()
            .unwrap_or(0);
        let mut entries = vec![0; count];
        for &(slot, off) in fields {
            if off != 0 {
                entries[slot] = off;
            }
        }
        Self { object_size, entries }
    }

    pub fn object_size(&self) -> VOffset {
        self.object_size
    }

    pub fn num_fields(&self) -> usize {
        self.entries.len()
    }

    pub fn offset_of(&self, slot: usize) -> VOffset {
        self.entries.get(slot).copied().unwrap_or(0)
    }

    /// Encoded size in bytes.
    pub fn byte_len(&self) -> usize {
        voffset_for_slot(self.entries.len())
    }

    /// Bit-exact wire encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        out.extend_from_slice(&(self.byte_len() as u16).to_le_bytes());
        out.extend_from_slice(&self.object_size.to_le_bytes());
        for entry in &self.entries {
            out.extend_from_slice(&entry.to_le_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voffset_mapping() {
        assert_eq!(voffset_for_slot(0), 4);
        assert_eq!(voffset_for_slot(1), 6);
        assert_eq!(voffset_for_slot(2), 8);
    }

    #[test]
    fn layout_trims_trailing_absent_slots() {
        let layout = VTableLayout::from_fields(8, &[(0, 4)]);
        assert_eq!(layout.num_fields(), 1);
        assert_eq!(layout.offset_of(1), 0);
        assert_eq!(layout.to_bytes(), vec![6, 0, 8, 0, 4, 0]);
    }

    #[test]
    fn layout_keeps_interior_gaps() {
        let layout = VTableLayout::from_fields(12, &[(2, 4), (0, 8)]);
        assert_eq!(layout.num_fields(), 3);
        assert_eq!(layout.offset_of(0), 8);
        assert_eq!(layout.offset_of(1), 0);
        assert_eq!(layout.offset_of(2), 4);
        assert_eq!(layout.byte_len(), 10);
    }

    #[test]
    fn empty_layout() {
        let layout = VTableLayout::from_fields(4, &[]);
        assert_eq!(layout.to_bytes(), vec![4, 0, 4, 0]);
    }

    #[test]
    fn read_view_matches_layout() {
        let bytes = VTableLayout::from_fields(12, &[(0, 4), (1, 8)]).to_bytes();
        let vt = VTable::init(ByteBuffer::new(&bytes[..]), 0).unwrap();
        assert_eq!(vt.num_fields(), 2);
        assert_eq!(vt.object_size(), 12);
        assert_eq!(vt.offset_of(0), 4);
        assert_eq!(vt.offset_of(1), 8);
        assert_eq!(vt.offset_of(7), 0);
        assert_eq!(vt.as_bytes(), &bytes[..]);
    }

    #[test]
    fn odd_vtable_size_is_malformed() {
        let bytes = [5u8, 0, 8, 0, 4, 0];
        let err = VTable::init(ByteBuffer::new(&bytes[..]), 0).unwrap_err();
        assert!(matches!(err, Error::MalformedBuffer(_)), "{err}");
    }

    #[test]
    fn vtable_larger_than_buffer_is_malformed() {
        let bytes = [10u8, 0, 8, 0, 4, 0];
        let err = VTable::init(ByteBuffer::new(&bytes[..]), 0).unwrap_err();
        assert!(matches!(err, Error::MalformedBuffer(_)), "{err}");
    }

    #[test]
    fn vtable_outside_buffer_is_malformed() {
        let bytes = [4u8, 0, 4, 0];
        let err = VTable::init(ByteBuffer::new(&bytes[..]), 3).unwrap_err();
        assert!(matches!(err, Error::MalformedBuffer(_)), "{err}");
    }
}
