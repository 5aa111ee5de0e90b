//! Lazy read access to tables, strings and vectors.
//!
//! A [`Table`] is a `(buffer, position)` pair plus its resolved vtable. No
//! field is decoded until it is requested, and every request re-reads the
//! buffer. Offset fields store forward uoffsets relative to their own
//! position; a zero uoffset is rejected, so every chain of references moves
//! strictly towards the end of the buffer.
//!
//! # Beispiel
//!
//! ```
//! use tablebuf::{Builder, Table};
//!
//! let mut b = Builder::new();
//! b.start_object(2).unwrap();
//! b.add_field::<i32>(0, 3, 0).unwrap();
//! b.add_field::<i8>(1, 0, 0).unwrap();
//! let root = b.end_object().unwrap();
//! b.finish(root).unwrap();
//!
//! let table = Table::open(b.finished_data().unwrap(), 0).unwrap();
//! assert_eq!(table.get_field::<i32>(0, 0).unwrap(), 3);
//! assert_eq!(table.get_field::<i8>(1, 0).unwrap(), 0);
//! assert_eq!(table.vtable().offset_of(1), 0);
//! ```

use core::fmt;
use core::marker::PhantomData;

use crate::byte_buffer::ByteBuffer;
use crate::scalar::{Scalar, UOffset, SIZE_UOFFSET};
use crate::vtable::VTable;
use crate::{Error, Result};

/// Length of the optional file identifier that follows the root uoffset.
pub const FILE_IDENTIFIER_LENGTH: usize = 4;

/// A value that can be read from a location inside a buffer.
///
/// Scalars are read inline. References (strings, tables, vectors) occupy a
/// uoffset inline and are resolved through it.
pub trait Follow<'a>: Sized {
    /// Groesse des Inline-Anteils (Skalar oder uoffset).
    const INLINE_SIZE: usize;

    fn follow(buf: ByteBuffer<&'a [u8]>, loc: usize) -> Result<Self>;
}

macro_rules! impl_follow_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl<'a> Follow<'a> for $t {
                const INLINE_SIZE: usize = <$t as Scalar>::SIZE;

                #[inline]
                fn follow(buf: ByteBuffer<&'a [u8]>, loc: usize) -> Result<Self> {
                    buf.get::<$t>(loc)
                }
            }
        )*
    };
}

impl_follow_scalar!(bool, i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// Resolves the uoffset stored at `loc` to an absolute position.
pub(crate) fn deref_uoffset(buf: ByteBuffer<&[u8]>, loc: usize) -> Result<usize> {
    let off = buf.get::<UOffset>(loc)?;
    if off == 0 {
        return Err(Error::malformed(format!("zero uoffset at {loc}")));
    }
    match loc.checked_add(off as usize) {
        Some(target) if target < buf.len() => Ok(target),
        _ => Err(Error::malformed(format!(
            "uoffset {off} at {loc} points outside buffer of length {}",
            buf.len()
        ))),
    }
}

impl<'a> Follow<'a> for &'a [u8] {
    const INLINE_SIZE: usize = SIZE_UOFFSET;

    fn follow(buf: ByteBuffer<&'a [u8]>, loc: usize) -> Result<Self> {
        let target = deref_uoffset(buf, loc)?;
        buf.string_ref(target)
    }
}

impl<'a> Follow<'a> for &'a str {
    const INLINE_SIZE: usize = SIZE_UOFFSET;

    fn follow(buf: ByteBuffer<&'a [u8]>, loc: usize) -> Result<Self> {
        let target = deref_uoffset(buf, loc)?;
        let bytes = buf.string_ref(target)?;
        core::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 { offset: target })
    }
}

impl<'a> Follow<'a> for Table<'a> {
    const INLINE_SIZE: usize = SIZE_UOFFSET;

    fn follow(buf: ByteBuffer<&'a [u8]>, loc: usize) -> Result<Self> {
        let target = deref_uoffset(buf, loc)?;
        Table::new(buf, target)
    }
}

impl<'a, T: Follow<'a>> Follow<'a> for Vector<'a, T> {
    const INLINE_SIZE: usize = SIZE_UOFFSET;

    fn follow(buf: ByteBuffer<&'a [u8]>, loc: usize) -> Result<Self> {
        let target = deref_uoffset(buf, loc)?;
        Vector::init(buf, target)
    }
}

/// Checks whether a finished buffer carries `ident` right after its root uoffset.
pub fn buffer_has_identifier(buf: &[u8], ident: &[u8; FILE_IDENTIFIER_LENGTH]) -> bool {
    buf.get(SIZE_UOFFSET..SIZE_UOFFSET + FILE_IDENTIFIER_LENGTH) == Some(&ident[..])
}

/// A table inside a buffer: non-owning view, valid as long as the buffer.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    buf: ByteBuffer<&'a [u8]>,
    pos: usize,
    vtable: VTable<'a>,
}

impl<'a> Table<'a> {
    /// Opens the root table through the uoffset stored at `root_offset`.
    ///
    /// Fails with [`Error::MalformedBuffer`] if the indirection or the table
    /// header it points to lies outside the buffer.
    pub fn open(buf: &'a [u8], root_offset: usize) -> Result<Self> {
        let bb = ByteBuffer::new(buf);
        if bb.get::<u32>(root_offset).is_err() {
            return Err(Error::malformed(format!(
                "root uoffset at {root_offset} lies outside buffer of length {}",
                buf.len()
            )));
        }
        let pos = deref_uoffset(bb, root_offset)?;
        Self::new(bb, pos)
    }

    /// Opens the root table after checking the file identifier.
    pub fn open_with_identifier(buf: &'a [u8], ident: &[u8; FILE_IDENTIFIER_LENGTH]) -> Result<Self> {
        if !buffer_has_identifier(buf, ident) {
            return Err(Error::malformed(format!(
                "file identifier {:?} not found",
                String::from_utf8_lossy(ident)
            )));
        }
        Self::open(buf, 0)
    }

    /// Creates a table view at `pos`, resolving its vtable.
    pub fn new(buf: ByteBuffer<&'a [u8]>, pos: usize) -> Result<Self> {
        let soffset = buf
            .get::<i32>(pos)
            .map_err(|_| Error::malformed(format!("table at {pos} lies outside the buffer")))?;
        // vtable = table - soffset; negativ bei wiederverwendeten vtables
        let vt_pos = pos as i64 - i64::from(soffset);
        if vt_pos < 0 || vt_pos as u64 >= buf.len() as u64 {
            return Err(Error::malformed(format!(
                "vtable soffset {soffset} of table at {pos} points outside the buffer"
            )));
        }
        let vtable = VTable::init(buf, vt_pos as usize)?;
        if buf.slice(pos, vtable.object_size()).is_err() {
            return Err(Error::malformed(format!(
                "table at {pos} with object size {} exceeds buffer length {}",
                vtable.object_size(),
                buf.len()
            )));
        }
        Ok(Self { buf, pos, vtable })
    }

    /// Absolute position of the table (its soffset).
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn vtable(&self) -> VTable<'a> {
        self.vtable
    }

    pub fn buffer(&self) -> ByteBuffer<&'a [u8]> {
        self.buf
    }

    /// True if the slot is present (non-zero vtable entry).
    pub fn has_field(&self, slot: usize) -> bool {
        self.vtable.offset_of(slot) != 0
    }

    /// Absolute position of a present field.
    pub fn field_position(&self, slot: usize) -> Option<usize> {
        match self.vtable.offset_of(slot) {
            0 => None,
            off => Some(self.pos + off as usize),
        }
    }

    /// Reads a scalar field, or `default` when the slot is absent.
    #[inline]
    pub fn get_field<T: Scalar>(&self, slot: usize, default: T) -> Result<T> {
        match self.field_position(slot) {
            None => Ok(default),
            Some(loc) => self.buf.get::<T>(loc),
        }
    }

    /// Follows a reference field (string, table or vector); `None` when absent.
    pub fn get_ref<T: Follow<'a>>(&self, slot: usize) -> Result<Option<T>> {
        match self.field_position(slot) {
            None => Ok(None),
            Some(loc) => T::follow(self.buf, loc).map(Some),
        }
    }

    /// String field as raw bytes (length prefix resolved, terminator excluded).
    pub fn get_string(&self, slot: usize) -> Result<Option<&'a [u8]>> {
        self.get_ref::<&'a [u8]>(slot)
    }

    /// String field validated as UTF-8.
    pub fn get_str(&self, slot: usize) -> Result<Option<&'a str>> {
        self.get_ref::<&'a str>(slot)
    }

    /// Nested table field.
    pub fn get_table(&self, slot: usize) -> Result<Option<Table<'a>>> {
        self.get_ref::<Table<'a>>(slot)
    }

    /// Vector field of scalars, strings or tables.
    pub fn get_vector<T: Follow<'a>>(&self, slot: usize) -> Result<Option<Vector<'a, T>>> {
        self.get_ref::<Vector<'a, T>>(slot)
    }
}

/// A length-prefixed vector: `[len:4][elements...]`.
#[derive(Debug)]
pub struct Vector<'a, T> {
    buf: ByteBuffer<&'a [u8]>,
    start: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T> Clone for Vector<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Vector<'_, T> {}

impl<'a, T: Follow<'a>> Vector<'a, T> {
    /// Opens the vector whose length prefix is at `pos`.
    ///
    /// All elements must fit in the buffer, otherwise [`Error::OutOfBounds`].
    pub fn init(buf: ByteBuffer<&'a [u8]>, pos: usize) -> Result<Self> {
        let len = buf.get::<u32>(pos)? as usize;
        let start = pos + SIZE_UOFFSET;
        let bytes = len
            .checked_mul(T::INLINE_SIZE)
            .ok_or_else(|| Error::out_of_bounds(start, usize::MAX, buf.len()))?;
        buf.slice(start, bytes)?;
        Ok(Self { buf, start, len, _marker: PhantomData })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element `index`; out-of-range indices fail with [`Error::OutOfBounds`].
    pub fn get(&self, index: usize) -> Result<T> {
        if index >= self.len {
            return Err(Error::out_of_bounds(
                self.start.saturating_add(index.saturating_mul(T::INLINE_SIZE)),
                T::INLINE_SIZE,
                self.start + self.len * T::INLINE_SIZE,
            ));
        }
        T::follow(self.buf, self.start + index * T::INLINE_SIZE)
    }

    pub fn iter(&self) -> VectorIter<'a, T> {
        VectorIter { vector: *self, index: 0 }
    }

    /// Decodes every element.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.iter().collect()
    }
}

impl<'a, T: Follow<'a>> IntoIterator for Vector<'a, T> {
    type Item = Result<T>;
    type IntoIter = VectorIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over vector elements; each element is resolved on demand.
pub struct VectorIter<'a, T> {
    vector: Vector<'a, T>,
    index: usize,
}

impl<'a, T: Follow<'a>> Iterator for VectorIter<'a, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.vector.len {
            return None;
        }
        let item = self.vector.get(self.index);
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.vector.len - self.index;
        (rest, Some(rest))
    }
}

impl<'a, T: Follow<'a>> ExactSizeIterator for VectorIter<'a, T> {}

impl<T> fmt::Debug for VectorIter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorIter")
            .field("index", &self.index)
            .field("len", &self.vector.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Root -> Tabelle {0: int32 = 3}, Slot 1 fehlt.
    const AXIS_TABLE: [u8; 20] = [
        12, 0, 0, 0, // root uoffset
        0, 0, // padding
        6, 0, 8, 0, 4, 0, // vtable: size 6, object 8, slot 0 at +4
        6, 0, 0, 0, // soffset -> vtable at 12 - 6
        3, 0, 0, 0, // axis
    ];

    #[test]
    fn open_and_read_scalar_fields() {
        let table = Table::open(&AXIS_TABLE, 0).unwrap();
        assert_eq!(table.position(), 12);
        assert_eq!(table.vtable().position(), 6);
        assert_eq!(table.get_field::<i32>(0, 0).unwrap(), 3);
        assert_eq!(table.get_field::<i8>(1, 0).unwrap(), 0);
        assert_eq!(table.get_field::<i8>(1, -7).unwrap(), -7);
        assert!(table.has_field(0));
        assert!(!table.has_field(1));
        assert_eq!(table.vtable().offset_of(1), 0);
    }

    #[test]
    fn absent_reference_fields_are_none() {
        let table = Table::open(&AXIS_TABLE, 0).unwrap();
        assert_eq!(table.get_string(5).unwrap(), None);
        assert!(table.get_table(1).unwrap().is_none());
        assert!(table.get_vector::<u8>(2).unwrap().is_none());
    }

    #[test]
    fn wide_read_past_end_is_out_of_bounds() {
        let table = Table::open(&AXIS_TABLE, 0).unwrap();
        assert!(matches!(table.get_field::<i64>(0, 0), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn root_outside_buffer_is_malformed() {
        let err = Table::open(&[200, 0, 0, 0], 0).unwrap_err();
        assert!(matches!(err, Error::MalformedBuffer(_)), "{err}");
        let err = Table::open(&[1, 0], 0).unwrap_err();
        assert!(matches!(err, Error::MalformedBuffer(_)), "{err}");
    }

    #[test]
    fn zero_root_uoffset_is_malformed() {
        let err = Table::open(&[0, 0, 0, 0, 0, 0, 0, 0], 0).unwrap_err();
        assert!(matches!(err, Error::MalformedBuffer(_)), "{err}");
    }

    #[test]
    fn soffset_outside_buffer_is_malformed() {
        let mut raw = AXIS_TABLE;
        raw[12..16].copy_from_slice(&(-100i32).to_le_bytes());
        let err = Table::open(&raw, 0).unwrap_err();
        assert!(matches!(err, Error::MalformedBuffer(_)), "{err}");

        raw[12..16].copy_from_slice(&100i32.to_le_bytes());
        let err = Table::open(&raw, 0).unwrap_err();
        assert!(matches!(err, Error::MalformedBuffer(_)), "{err}");
    }

    #[test]
    fn object_size_past_end_is_malformed() {
        let mut raw = AXIS_TABLE;
        raw[8] = 12; // object size 12 > 8 verfuegbare Bytes
        let err = Table::open(&raw, 0).unwrap_err();
        assert!(matches!(err, Error::MalformedBuffer(_)), "{err}");
    }

    #[test]
    fn string_field_via_handmade_buffer() {
        // root -> table{0: string "abc"}
        let raw: [u8; 28] = [
            12, 0, 0, 0, // root
            0, 0, // padding
            6, 0, 8, 0, 4, 0, // vtable
            6, 0, 0, 0, // soffset
            4, 0, 0, 0, // uoffset -> 20
            3, 0, 0, 0, b'a', b'b', b'c', 0,
        ];
        let table = Table::open(&raw, 0).unwrap();
        assert_eq!(table.get_string(0).unwrap(), Some(&b"abc"[..]));
        assert_eq!(table.get_str(0).unwrap(), Some("abc"));
    }

    #[test]
    fn invalid_utf8_string() {
        let raw: [u8; 28] = [
            12, 0, 0, 0, 0, 0, 6, 0, 8, 0, 4, 0, 6, 0, 0, 0, 4, 0, 0, 0, 2, 0, 0, 0, 0xFF, 0xFE, 0, 0,
        ];
        let table = Table::open(&raw, 0).unwrap();
        assert_eq!(table.get_string(0).unwrap(), Some(&[0xFF, 0xFE][..]));
        assert_eq!(table.get_str(0).unwrap_err(), Error::InvalidUtf8 { offset: 20 });
    }

    #[test]
    fn zero_uoffset_field_is_malformed() {
        let raw: [u8; 20] = [12, 0, 0, 0, 0, 0, 6, 0, 8, 0, 4, 0, 6, 0, 0, 0, 0, 0, 0, 0];
        let table = Table::open(&raw, 0).unwrap();
        assert!(matches!(table.get_string(0), Err(Error::MalformedBuffer(_))));
    }

    #[test]
    fn scalar_vector_field() {
        // table{0: [u16; 3] = [1, 2, 3]}
        let raw: [u8; 32] = [
            12, 0, 0, 0, 0, 0, 6, 0, 8, 0, 4, 0, 6, 0, 0, 0, //
            4, 0, 0, 0, // uoffset -> 20
            3, 0, 0, 0, 1, 0, 2, 0, 3, 0, 0, 0,
        ];
        let table = Table::open(&raw, 0).unwrap();
        let v = table.get_vector::<u16>(0).unwrap().unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v.get(2).unwrap(), 3);
        assert_eq!(v.to_vec().unwrap(), vec![1, 2, 3]);
        assert!(matches!(v.get(3), Err(Error::OutOfBounds { .. })));
        assert_eq!(v.iter().len(), 3);
    }

    #[test]
    fn truncated_vector_is_out_of_bounds() {
        let raw: [u8; 28] = [
            12, 0, 0, 0, 0, 0, 6, 0, 8, 0, 4, 0, 6, 0, 0, 0, 4, 0, 0, 0, //
            9, 0, 0, 0, 1, 0, 2, 0, // 9 Elemente angekuendigt, 2 vorhanden
        ];
        let table = Table::open(&raw, 0).unwrap();
        assert!(matches!(table.get_vector::<u16>(0), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn identifier_check() {
        let mut raw = vec![8u8, 0, 0, 0];
        raw.extend_from_slice(b"TFL3");
        assert!(buffer_has_identifier(&raw, b"TFL3"));
        assert!(!buffer_has_identifier(&raw, b"CIR0"));
        assert!(!buffer_has_identifier(&raw[..6], b"TFL3"));
        assert!(matches!(
            Table::open_with_identifier(&raw, b"CIR0"),
            Err(Error::MalformedBuffer(_))
        ));
    }
}
