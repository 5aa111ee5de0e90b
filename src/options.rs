//! Builder and decoder configuration.
//!
//! # Beispiel
//!
//! ```
//! use tablebuf::options::{BuilderOptions, DecodeLimits};
//!
//! let opts = BuilderOptions::default()
//!     .with_initial_capacity(256)
//!     .with_dedup_vtables(false);
//! assert_eq!(opts.initial_capacity(), 256);
//! assert!(!opts.dedup_vtables());
//! assert!(!opts.force_defaults());
//!
//! let limits = DecodeLimits::default().with_max_depth(8);
//! assert_eq!(limits.max_depth(), 8);
//! ```

/// Largest buffer the format can address with signed 32-bit offsets.
pub const MAX_BUFFER_SIZE: usize = (i32::MAX) as usize;

/// Options controlling how a [`Builder`](crate::Builder) lays out a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderOptions {
    pub(crate) initial_capacity: usize,
    pub(crate) max_buffer_size: usize,
    pub(crate) dedup_vtables: bool,
    pub(crate) force_defaults: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            max_buffer_size: MAX_BUFFER_SIZE,
            dedup_vtables: true,
            force_defaults: false,
        }
    }
}

impl BuilderOptions {
    /// Bytes allocated up front.
    pub fn initial_capacity(&self) -> usize { self.initial_capacity }
    /// Upper bound for buffer growth.
    pub fn max_buffer_size(&self) -> usize { self.max_buffer_size }
    /// Reuse byte-identical vtables within one buffer.
    pub fn dedup_vtables(&self) -> bool { self.dedup_vtables }
    /// Write scalar fields even when they equal their default.
    pub fn force_defaults(&self) -> bool { self.force_defaults }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Werte ueber [`MAX_BUFFER_SIZE`] werden gekappt.
    pub fn with_max_buffer_size(mut self, max: usize) -> Self {
        self.max_buffer_size = max.min(MAX_BUFFER_SIZE);
        self
    }

    pub fn with_dedup_vtables(mut self, dedup: bool) -> Self {
        self.dedup_vtables = dedup;
        self
    }

    pub fn with_force_defaults(mut self, force: bool) -> Self {
        self.force_defaults = force;
        self
    }
}

/// Limits for schema-driven decoding of untrusted buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    pub(crate) max_depth: usize,
    pub(crate) max_tables: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self { max_depth: 64, max_tables: 1_000_000 }
    }
}

impl DecodeLimits {
    /// Maximum nesting depth of tables (the root counts as depth 1).
    pub fn max_depth(&self) -> usize { self.max_depth }
    /// Maximum number of tables visited in one decode.
    pub fn max_tables(&self) -> usize { self.max_tables }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_tables(mut self, tables: usize) -> Self {
        self.max_tables = tables;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let opts = BuilderOptions::default();
        assert_eq!(opts.initial_capacity(), 1024);
        assert_eq!(opts.max_buffer_size(), MAX_BUFFER_SIZE);
        assert!(opts.dedup_vtables());
        assert!(!opts.force_defaults());
    }

    #[test]
    fn max_buffer_size_is_capped() {
        let opts = BuilderOptions::default().with_max_buffer_size(usize::MAX);
        assert_eq!(opts.max_buffer_size(), MAX_BUFFER_SIZE);
        let opts = BuilderOptions::default().with_max_buffer_size(64);
        assert_eq!(opts.max_buffer_size(), 64);
    }

    #[test]
    fn decode_limit_defaults() {
        let limits = DecodeLimits::default();
        assert_eq!(limits.max_depth(), 64);
        assert_eq!(limits.max_tables(), 1_000_000);
        assert_eq!(limits.with_max_tables(3).max_tables(), 3);
    }
}
