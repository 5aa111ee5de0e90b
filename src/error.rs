//! Central error types for the table codec.
//!
//! Every failure is fatal to the operation that produced it. Field absence is
//! never an error: readers return the declared default instead.

use core::fmt;
use std::borrow::Cow;

/// All error kinds produced by readers, the builder and the schema layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A read or write needs `size` bytes at `offset`, but the buffer holds only `len`.
    OutOfBounds { offset: usize, size: usize, len: usize },
    /// The buffer structure is inconsistent (root, vtable or uoffset resolves badly).
    MalformedBuffer(Cow<'static, str>),
    /// Builder API misuse (e.g. nested `start_object`, `end_object` without object).
    InvalidState(Cow<'static, str>),
    /// An offset refers to an object that is not finalized before the current object.
    InvalidReference {
        /// Abstand vom Buffer-Ende, wie vom Aufrufer uebergeben.
        offset: u32,
        /// Groesster zulaessiger Wert zum Zeitpunkt des Aufrufs.
        limit: u32,
    },
    /// Growing the builder buffer would exceed the configured maximum.
    BufferTooLarge { requested: usize, max: usize },
    /// A string field does not contain valid UTF-8.
    InvalidUtf8 { offset: usize },
    /// A field name is not declared by the table definition.
    UnknownField { table: &'static str, field: String },
    /// A value does not fit the declared field type.
    TypeMismatch { field: &'static str, expected: &'static str },
    /// A decode walk exceeded the configured depth or table budget.
    LimitExceeded(Cow<'static, str>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { offset, size, len } => write!(
                f,
                "out of bounds: {size} bytes at offset {offset} exceed buffer length {len}"
            ),
            Self::MalformedBuffer(msg) => {
                if msg.is_empty() {
                    write!(f, "malformed buffer")
                } else {
                    write!(f, "malformed buffer: {msg}")
                }
            }
            Self::InvalidState(msg) => {
                if msg.is_empty() {
                    write!(f, "invalid builder state")
                } else {
                    write!(f, "invalid builder state: {msg}")
                }
            }
            Self::InvalidReference { offset, limit } => write!(
                f,
                "invalid reference: offset {offset} is not a finalized object (limit {limit})"
            ),
            Self::BufferTooLarge { requested, max } => write!(
                f,
                "buffer too large: {requested} bytes requested, maximum is {max}"
            ),
            Self::InvalidUtf8 { offset } => write!(f, "string at offset {offset} is not valid UTF-8"),
            Self::UnknownField { table, field } => {
                write!(f, "table '{table}' has no field named '{field}'")
            }
            Self::TypeMismatch { field, expected } => {
                write!(f, "type mismatch for field '{field}': expected {expected}")
            }
            Self::LimitExceeded(msg) => write!(f, "decode limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Erstellt einen `MalformedBuffer` Fehler mit Nachricht.
    pub fn malformed(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::MalformedBuffer(msg.into())
    }

    /// Erstellt einen `InvalidState` Fehler mit Nachricht.
    pub fn invalid_state(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Erstellt einen `LimitExceeded` Fehler mit Nachricht.
    pub fn limit_exceeded(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::LimitExceeded(msg.into())
    }

    pub(crate) fn out_of_bounds(offset: usize, size: usize, len: usize) -> Self {
        Self::OutOfBounds { offset, size, len }
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_display() {
        let e = Error::out_of_bounds(12, 4, 14);
        let msg = e.to_string();
        assert!(msg.contains("out of bounds"), "{msg}");
        assert!(msg.contains("12"), "{msg}");
        assert!(msg.contains("14"), "{msg}");
    }

    #[test]
    fn malformed_buffer_display() {
        assert_eq!(Error::malformed("").to_string(), "malformed buffer");
        let msg = Error::malformed("vtable outside buffer").to_string();
        assert!(msg.contains("vtable outside buffer"), "{msg}");
    }

    #[test]
    fn invalid_state_display() {
        assert_eq!(Error::invalid_state("").to_string(), "invalid builder state");
        let msg = Error::invalid_state("object already open").to_string();
        assert!(msg.contains("object already open"), "{msg}");
    }

    #[test]
    fn invalid_reference_display() {
        let msg = Error::InvalidReference { offset: 40, limit: 16 }.to_string();
        assert!(msg.contains("40"), "{msg}");
        assert!(msg.contains("16"), "{msg}");
    }

    #[test]
    fn buffer_too_large_display() {
        let msg = Error::BufferTooLarge { requested: 4096, max: 1024 }.to_string();
        assert!(msg.contains("4096"), "{msg}");
        assert!(msg.contains("1024"), "{msg}");
    }

    #[test]
    fn schema_errors_display() {
        let msg = Error::UnknownField { table: "ConcatenationOptions", field: "axes".into() }.to_string();
        assert!(msg.contains("ConcatenationOptions"), "{msg}");
        assert!(msg.contains("axes"), "{msg}");

        let msg = Error::TypeMismatch { field: "axis", expected: "int32" }.to_string();
        assert!(msg.contains("axis"), "{msg}");
        assert!(msg.contains("int32"), "{msg}");
    }

    #[test]
    fn limit_exceeded_display() {
        let msg = Error::limit_exceeded("depth 65 > 64").to_string();
        assert!(msg.contains("depth 65 > 64"), "{msg}");
    }

    #[test]
    fn error_implements_std_error() {
        let e: Box<dyn std::error::Error> = Box::new(Error::InvalidUtf8 { offset: 8 });
        assert!(!e.to_string().is_empty());
    }

    #[test]
    fn error_is_clone_and_eq() {
        let e1 = Error::malformed("zero uoffset");
        let e2 = e1.clone();
        assert_eq!(e1, e2);
    }

    #[test]
    fn result_type_alias_works() {
        let ok: Result<u32> = Ok(42);
        assert_eq!(ok.unwrap(), 42);

        let err: Result<u32> = Err(Error::invalid_state(""));
        assert!(err.is_err());
    }
}
