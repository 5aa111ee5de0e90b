//! tablebuf – minimal FlatBuffers-style binary table codec
//!
//! Tables are written bottom-up by a [`Builder`] into one contiguous
//! little-endian buffer and read back lazily through [`Table`] views that
//! borrow the buffer. Absent fields cost nothing on the wire: the reader
//! returns the declared default.
//!
//! # Beispiel
//!
//! ```
//! use tablebuf::{Builder, Table};
//!
//! let mut b = Builder::new();
//! let name = b.create_string("CONCATENATION").unwrap();
//! b.start_object(3).unwrap();
//! b.add_field::<i8>(0, 2, 0).unwrap();
//! b.add_offset_field(1, name).unwrap();
//! b.add_field::<i32>(2, 1, 1).unwrap();
//! let root = b.end_object().unwrap();
//! b.finish(root).unwrap();
//!
//! let table = Table::open(b.finished_data().unwrap(), 0).unwrap();
//! assert_eq!(table.get_field::<i8>(0, 0).unwrap(), 2);
//! assert_eq!(table.get_str(1).unwrap(), Some("CONCATENATION"));
//! assert_eq!(table.get_field::<i32>(2, 1).unwrap(), 1);
//! assert!(!table.has_field(2));
//! ```

pub mod builder;
pub mod byte_buffer;
pub mod error;
pub mod options;
pub mod scalar;
pub mod schema;
pub mod table;
pub mod vtable;

pub use error::{Error, Result};

/// HashMap mit ahash (schneller, nicht DoS-resistent; nur fuer interne Indizes).
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

/// IndexMap mit ahash (deterministische Iteration + schnelles Hashing).
pub(crate) type FastIndexMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;

// Public API: Write side
pub use builder::{Builder, Offset, StringMarker, TableMarker, VectorMarker, MAX_FIELD_COUNT};

// Public API: Read side
pub use byte_buffer::ByteBuffer;
pub use table::{buffer_has_identifier, Follow, Table, Vector, VectorIter, FILE_IDENTIFIER_LENGTH};
pub use vtable::{VTable, VTableLayout};

// Public API: Types
pub use options::{BuilderOptions, DecodeLimits};
pub use scalar::Scalar;
pub use schema::{ElementType, FieldDef, FieldDefault, FieldType, Record, ScalarType, TableDef, Value};
