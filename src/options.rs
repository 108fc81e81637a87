//! Stream configuration.

use crate::parsing::Endianness;

/// Default cap on the buffered extension region (64 MiB).
pub const DEFAULT_MAX_EXTENSION_SIZE: usize = 64 * 1024 * 1024;

/// Default read size for reader-backed sources (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Options for [`NiftiStream`](crate::NiftiStream) and its async counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Byte order of the header. `None` detects it from `dim[0]`.
    pub byte_order: Option<Endianness>,
    /// Fail with `MalformedHeader` instead of logging a warning.
    pub strict: bool,
    /// Largest extension region the stream will buffer.
    pub max_extension_size: usize,
    /// Read size when pulling from an `io::Read` or `AsyncRead`.
    pub chunk_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            byte_order: None,
            strict: false,
            max_extension_size: DEFAULT_MAX_EXTENSION_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
