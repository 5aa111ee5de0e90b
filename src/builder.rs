//! Bottom-up table builder.
//!
//! The buffer is filled back to front: every write lands in front of the
//! previous one, and positions handed out as [`Offset`] are distances from the
//! tail. A child is therefore always finalized at a smaller distance than any
//! object that references it, and the finished buffer only contains forward
//! uoffsets.
//!
//! State machine per object:
//!
//! ```text
//! Idle --start_object--> Building --add_*--> Building --end_object--> Idle
//! Idle --finish--> Finished --reset--> Idle
//! ```
//!
//! Only one object can be open at a time. Strings, vectors and child tables
//! must be created before their parent is started.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use log::{debug, trace};

use crate::byte_buffer::ByteBuffer;
use crate::options::BuilderOptions;
use crate::scalar::{SOffset, Scalar, VOffset, SIZE_UOFFSET, SIZE_VOFFSET};
use crate::table::FILE_IDENTIFIER_LENGTH;
use crate::vtable::{voffset_for_slot, VTableLayout};
use crate::{Error, FastHashMap, Result};

/// Marker for offsets of finalized tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableMarker {}

/// Marker for offsets of strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringMarker {}

/// Marker for offsets of vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorMarker {}

/// Position of a finalized object, measured from the tail of the buffer under construction.
pub struct Offset<T> {
    value: u32,
    _marker: PhantomData<T>,
}

impl<T> Offset<T> {
    pub(crate) const fn new(value: u32) -> Self {
        Self { value, _marker: PhantomData }
    }

    /// Distance from the tail of the buffer.
    pub const fn value(&self) -> u32 {
        self.value
    }
}

impl<T> Clone for Offset<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Offset<T> {}

impl<T> PartialEq for Offset<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Offset<T> {}

impl<T> Hash for Offset<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Offset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Offset({})", self.value)
    }
}

/// Largest slot count whose vtable size still fits a voffset.
pub const MAX_FIELD_COUNT: usize = (VOffset::MAX as usize - 2 * SIZE_VOFFSET) / SIZE_VOFFSET;

/// Art eines fertigen Objekts im aktuellen Buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectKind {
    Table,
    String,
    Vector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Building {
        /// Belegte Bytes beim Start des Objekts.
        start: u32,
        field_count: usize,
    },
    Finished,
}

/// Incremental buffer builder. One builder produces one buffer at a time.
#[derive(Debug)]
pub struct Builder {
    buf: ByteBuffer<Vec<u8>>,
    /// Erstes belegtes Byte; alles ab `head` ist geschrieben.
    head: usize,
    min_align: usize,
    /// (slot, Abstand vom Ende) der Felder des offenen Objekts.
    field_locs: Vec<(usize, u32)>,
    state: State,
    vtables: FastHashMap<Vec<u8>, u32>,
    /// Alle fertigen Objekte, nach Abstand vom Ende.
    finalized: FastHashMap<u32, ObjectKind>,
    shared_strings: FastHashMap<Vec<u8>, u32>,
    options: BuilderOptions,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Creates a builder with default options.
    pub fn new() -> Self {
        Self::with_options(BuilderOptions::default())
    }

    pub fn with_options(options: BuilderOptions) -> Self {
        let capacity = options.initial_capacity.min(options.max_buffer_size);
        Self {
            buf: ByteBuffer::zeroed(capacity),
            head: capacity,
            min_align: 1,
            field_locs: Vec::new(),
            state: State::Idle,
            vtables: FastHashMap::default(),
            finalized: FastHashMap::default(),
            shared_strings: FastHashMap::default(),
            options,
        }
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Bytes written so far.
    #[inline]
    pub fn used_size(&self) -> usize {
        self.buf.len() - self.head
    }

    /// Number of distinct vtables emitted into the current buffer.
    pub fn vtable_count(&self) -> usize {
        self.vtables.len()
    }

    /// Discards the current buffer, keeping the allocation.
    pub fn reset(&mut self) {
        self.head = self.buf.len();
        self.min_align = 1;
        self.field_locs.clear();
        self.state = State::Idle;
        self.vtables.clear();
        self.finalized.clear();
        self.shared_strings.clear();
    }

    // --- Low-level writes ---

    /// Stellt sicher, dass vor `head` mindestens `n` Bytes frei sind.
    fn ensure(&mut self, n: usize) -> Result<()> {
        if self.head >= n {
            return Ok(());
        }
        let max = self.options.max_buffer_size;
        let old_len = self.buf.len();
        let needed = self
            .used_size()
            .checked_add(n)
            .ok_or(Error::BufferTooLarge { requested: usize::MAX, max })?;
        if needed > max {
            return Err(Error::BufferTooLarge { requested: needed, max });
        }
        let mut new_len = old_len.max(64);
        while new_len < needed {
            new_len = new_len.saturating_mul(2);
        }
        let new_len = new_len.min(max);
        self.buf.grow_front(new_len, max)?;
        self.head += new_len - old_len;
        Ok(())
    }

    fn pad(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.ensure(n)?;
        self.head -= n;
        self.buf.zero(self.head, n)
    }

    /// Pads so that after writing `additional` bytes a value of `size` bytes is
    /// naturally aligned relative to the tail.
    fn prep(&mut self, size: usize, additional: usize) -> Result<()> {
        if size > self.min_align {
            self.min_align = size;
        }
        let align = (!(self.used_size().wrapping_add(additional))).wrapping_add(1) & (size - 1);
        self.ensure(align + size + additional)?;
        self.pad(align)
    }

    fn place<T: Scalar>(&mut self, value: T) -> Result<()> {
        self.ensure(T::SIZE)?;
        self.head -= T::SIZE;
        self.buf.set(self.head, value)
    }

    fn place_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure(bytes.len())?;
        self.head -= bytes.len();
        self.buf.set_bytes(self.head, bytes)
    }

    fn push<T: Scalar>(&mut self, value: T) -> Result<()> {
        self.prep(T::SIZE, 0)?;
        self.place(value)
    }

    /// Writes a uoffset to `target`, relative to the uoffset's own position.
    fn push_uoffset(&mut self, target: u32) -> Result<()> {
        self.prep(SIZE_UOFFSET, 0)?;
        let off = (self.used_size() + SIZE_UOFFSET) as u32 - target;
        self.place::<u32>(off)
    }

    /// `value` muss ein fertiges Objekt bis `limit` bezeichnen (bei `Some(kind)` dieser Art).
    fn check_reference(&self, value: u32, limit: u32, kind: Option<ObjectKind>) -> Result<()> {
        let known = match self.finalized.get(&value) {
            Some(&found) => kind.map_or(true, |k| k == found),
            None => false,
        };
        if value == 0 || value > limit || !known {
            return Err(Error::InvalidReference { offset: value, limit });
        }
        Ok(())
    }

    fn finalize<T>(&mut self, kind: ObjectKind) -> Offset<T> {
        let value = self.used_size() as u32;
        self.finalized.insert(value, kind);
        Offset::new(value)
    }

    fn require_idle(&self, what: &'static str) -> Result<()> {
        match self.state {
            State::Idle => Ok(()),
            State::Building { .. } => {
                Err(Error::invalid_state(format!("{what} while an object is open")))
            }
            State::Finished => Err(Error::invalid_state(format!("{what} after finish"))),
        }
    }

    fn require_building(&self, slot: usize, what: &'static str) -> Result<u32> {
        match self.state {
            State::Building { start, field_count } => {
                if slot >= field_count {
                    return Err(Error::invalid_state(format!(
                        "{what}: slot {slot} exceeds declared field count {field_count}"
                    )));
                }
                Ok(start)
            }
            _ => Err(Error::invalid_state(format!("{what} without an open object"))),
        }
    }

    // --- Objects ---

    /// Begins a new object with `field_count` slots.
    pub fn start_object(&mut self, field_count: usize) -> Result<()> {
        self.require_idle("start_object")?;
        if field_count > MAX_FIELD_COUNT {
            return Err(Error::malformed(format!(
                "field count {field_count} exceeds the vtable limit of {MAX_FIELD_COUNT}"
            )));
        }
        self.field_locs.clear();
        self.state = State::Building { start: self.used_size() as u32, field_count };
        Ok(())
    }

    /// Adds a scalar field. Equal to `default` means absent, so nothing is written
    /// (unless the builder forces defaults).
    pub fn add_field<T: Scalar>(&mut self, slot: usize, value: T, default: T) -> Result<()> {
        self.require_building(slot, "add_field")?;
        if value == default && !self.options.force_defaults {
            return Ok(());
        }
        self.push(value)?;
        self.field_locs.push((slot, self.used_size() as u32));
        Ok(())
    }

    /// Adds a reference to a string, vector or table finalized before this object started.
    pub fn add_offset_field<T>(&mut self, slot: usize, child: Offset<T>) -> Result<()> {
        let start = self.require_building(slot, "add_offset_field")?;
        self.check_reference(child.value, start, None)?;
        self.push_uoffset(child.value)?;
        self.field_locs.push((slot, self.used_size() as u32));
        Ok(())
    }

    /// Finalizes the open object: writes its vtable (or reuses an identical one)
    /// and patches the soffset at the object's start.
    pub fn end_object(&mut self) -> Result<Offset<TableMarker>> {
        let start = match self.state {
            State::Building { start, .. } => start,
            _ => return Err(Error::invalid_state("end_object without an open object")),
        };
        self.push::<SOffset>(0)?;
        let object_offset = self.used_size() as u32;
        let object_size = VOffset::try_from(object_offset - start).map_err(|_| {
            Error::malformed(format!(
                "object size {} exceeds the vtable limit of {}",
                object_offset - start,
                VOffset::MAX
            ))
        })?;

        let fields: Vec<(usize, VOffset)> = self
            .field_locs
            .iter()
            .map(|&(slot, loc)| (slot, (object_offset - loc) as VOffset))
            .collect();
        let layout = VTableLayout::from_fields(object_size, &fields);
        if layout.byte_len() > voffset_for_slot(MAX_FIELD_COUNT) {
            return Err(Error::malformed(format!(
                "vtable size {} exceeds the voffset limit of {}",
                layout.byte_len(),
                VOffset::MAX
            )));
        }
        let vtable = layout.to_bytes();

        let existing = if self.options.dedup_vtables {
            self.vtables.get(&vtable).copied()
        } else {
            None
        };
        let vt_offset = match existing {
            Some(vt) => {
                debug!("[tablebuf] object at {object_offset} reuses vtable at {vt}");
                vt
            }
            None => {
                // Objekt ist 4-ausgerichtet, vtable besteht aus u16
                if self.min_align < SIZE_VOFFSET {
                    self.min_align = SIZE_VOFFSET;
                }
                self.place_bytes(&vtable)?;
                let vt = self.used_size() as u32;
                if self.options.dedup_vtables {
                    self.vtables.insert(vtable, vt);
                }
                vt
            }
        };

        // Beide Werte vom Ende gemessen: soffset = table - vtable (absolut)
        let soffset = (i64::from(vt_offset) - i64::from(object_offset)) as SOffset;
        let table_index = self.buf.len() - object_offset as usize;
        self.buf.set(table_index, soffset)?;

        self.field_locs.clear();
        self.state = State::Idle;
        self.finalized.insert(object_offset, ObjectKind::Table);
        Ok(Offset::new(object_offset))
    }

    // --- Strings and vectors ---

    /// Writes a string: `[len:4][bytes][NUL]`.
    pub fn create_string(&mut self, s: &str) -> Result<Offset<StringMarker>> {
        self.create_bytes(s.as_bytes())
    }

    /// Writes a byte string with the same layout as [`Builder::create_string`].
    pub fn create_bytes(&mut self, bytes: &[u8]) -> Result<Offset<StringMarker>> {
        self.require_idle("create_string")?;
        self.prep(SIZE_UOFFSET, bytes.len() + 1)?;
        self.place::<u8>(0)?;
        self.place_bytes(bytes)?;
        self.push::<u32>(bytes.len() as u32)?;
        Ok(self.finalize(ObjectKind::String))
    }

    /// Like [`Builder::create_string`], but identical strings are written once per buffer.
    pub fn create_shared_string(&mut self, s: &str) -> Result<Offset<StringMarker>> {
        if let Some(&existing) = self.shared_strings.get(s.as_bytes()) {
            self.require_idle("create_shared_string")?;
            return Ok(Offset::new(existing));
        }
        let offset = self.create_string(s)?;
        self.shared_strings.insert(s.as_bytes().to_vec(), offset.value);
        Ok(offset)
    }

    /// Writes a vector of scalars: `[len:4][elements...]`.
    pub fn create_vector<T: Scalar>(&mut self, items: &[T]) -> Result<Offset<VectorMarker>> {
        self.require_idle("create_vector")?;
        let elem_bytes = T::SIZE.checked_mul(items.len()).ok_or(Error::BufferTooLarge {
            requested: usize::MAX,
            max: self.options.max_buffer_size,
        })?;
        self.prep(SIZE_UOFFSET, elem_bytes)?;
        self.prep(T::SIZE, elem_bytes)?;
        for item in items.iter().rev() {
            self.place(*item)?;
        }
        self.push::<u32>(items.len() as u32)?;
        Ok(self.finalize(ObjectKind::Vector))
    }

    /// Writes a vector of references (strings, tables or vectors).
    pub fn create_vector_of_offsets<T>(&mut self, items: &[Offset<T>]) -> Result<Offset<VectorMarker>> {
        self.require_idle("create_vector_of_offsets")?;
        let limit = self.used_size() as u32;
        for item in items {
            self.check_reference(item.value, limit, None)?;
        }
        self.prep(SIZE_UOFFSET, SIZE_UOFFSET * items.len())?;
        for item in items.iter().rev() {
            self.push_uoffset(item.value)?;
        }
        self.push::<u32>(items.len() as u32)?;
        Ok(self.finalize(ObjectKind::Vector))
    }

    // --- Finish ---

    /// Writes the root uoffset. The buffer is complete afterwards.
    pub fn finish(&mut self, root: Offset<TableMarker>) -> Result<()> {
        self.finish_inner(root, None)
    }

    /// Like [`Builder::finish`], with a 4-byte file identifier after the root uoffset.
    pub fn finish_with_identifier(
        &mut self,
        root: Offset<TableMarker>,
        ident: &[u8; FILE_IDENTIFIER_LENGTH],
    ) -> Result<()> {
        self.finish_inner(root, Some(ident))
    }

    fn finish_inner(
        &mut self,
        root: Offset<TableMarker>,
        ident: Option<&[u8; FILE_IDENTIFIER_LENGTH]>,
    ) -> Result<()> {
        self.require_idle("finish")?;
        self.check_reference(root.value, self.used_size() as u32, Some(ObjectKind::Table))?;
        let extra = SIZE_UOFFSET + ident.map_or(0, |_| FILE_IDENTIFIER_LENGTH);
        let align = self.min_align.max(SIZE_UOFFSET);
        self.prep(align, extra)?;
        if let Some(ident) = ident {
            self.place_bytes(ident)?;
        }
        self.push_uoffset(root.value)?;
        self.state = State::Finished;
        trace!(
            "[tablebuf] finished buffer: {} bytes, {} vtables, min_align {}",
            self.used_size(),
            self.vtables.len(),
            self.min_align
        );
        Ok(())
    }

    /// The finished buffer.
    pub fn finished_data(&self) -> Result<&[u8]> {
        if self.state != State::Finished {
            return Err(Error::invalid_state("finished_data before finish"));
        }
        Ok(&self.buf.as_slice()[self.head..])
    }

    /// Consumes the builder and returns the finished buffer.
    pub fn into_finished(self) -> Result<Vec<u8>> {
        if self.state != State::Finished {
            return Err(Error::invalid_state("into_finished before finish"));
        }
        let head = self.head;
        let mut data = self.buf.into_inner();
        data.drain(..head);
        Ok(data)
    }
}
