//! Fixed-width little-endian scalars.
//!
//! Every scalar that can live inline in a table, a vector or a vtable
//! implements [`Scalar`]. Encoding is always little-endian, independent of
//! the host byte order.

use core::fmt;

mod sealed {
    pub trait Sealed {}
}

/// A fixed-width value with a little-endian wire representation.
///
/// Sealed: the set of wire scalars is closed.
pub trait Scalar: sealed::Sealed + Copy + PartialEq + fmt::Debug + 'static {
    /// Groesse in Bytes, gleichzeitig die natuerliche Ausrichtung.
    const SIZE: usize;

    /// Reads the value from exactly `SIZE` bytes.
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Writes the value into exactly `SIZE` bytes.
    fn write_le(self, out: &mut [u8]);
}

macro_rules! impl_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $t {}

            impl Scalar for $t {
                const SIZE: usize = core::mem::size_of::<$t>();

                #[inline(always)]
                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; core::mem::size_of::<$t>()];
                    raw.copy_from_slice(bytes);
                    <$t>::from_le_bytes(raw)
                }

                #[inline(always)]
                fn write_le(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_scalar!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

impl sealed::Sealed for bool {}

impl Scalar for bool {
    const SIZE: usize = 1;

    // Jedes Byte != 0 gilt als true (wie bei den Referenz-Readern).
    #[inline(always)]
    fn from_le_slice(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline(always)]
    fn write_le(self, out: &mut [u8]) {
        out[0] = u8::from(self);
    }
}

/// Wire size of an unsigned forward offset.
pub const SIZE_UOFFSET: usize = 4;
/// Wire size of the signed table-to-vtable offset.
pub const SIZE_SOFFSET: usize = 4;
/// Wire size of a vtable entry.
pub const SIZE_VOFFSET: usize = 2;

/// Forward offset, relative to the position it is stored at.
pub type UOffset = u32;
/// Signed offset from a table to its vtable (`vtable = table - soffset`).
pub type SOffset = i32;
/// Vtable entry: field position relative to the table start.
pub type VOffset = u16;
