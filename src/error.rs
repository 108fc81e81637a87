//! Error types for NIFTI-1 stream decoding.
//!
//! This module provides the [`NiftiError`] type which covers every way a
//! stream can fail, from header decoding to API misuse.
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | Header | [`UndeterminedByteOrder`], [`MalformedHeader`], [`BufferTooSmall`] | The first 352 bytes are not a usable NIFTI-1 header |
//! | Truncation | [`TruncatedHeader`], [`TruncatedExtension`] | The source ended before a phase boundary |
//! | Limits | [`ExtensionTooLarge`], [`InvalidSliceSize`] | The header declares regions the stream refuses to buffer |
//! | Usage | [`InvalidState`] | A region was accessed before it was produced |
//! | I/O | [`Io`] | Error raised by the byte source, passed through unchanged |
//!
//! Every error is terminal for the stream that produced it: no further events
//! follow, and nothing is retried.
//!
//! ## Example
//!
//! ```rust,ignore
//! use nifti_stream::{NiftiError, NiftiStream};
//!
//! match stream.read_header() {
//!     Ok(header) => println!("dim = {:?}", header.dim),
//!     Err(NiftiError::TruncatedHeader { have, .. }) => eprintln!("only {} bytes", have),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```
//!
//! [`UndeterminedByteOrder`]: NiftiError::UndeterminedByteOrder
//! [`MalformedHeader`]: NiftiError::MalformedHeader
//! [`BufferTooSmall`]: NiftiError::BufferTooSmall
//! [`TruncatedHeader`]: NiftiError::TruncatedHeader
//! [`TruncatedExtension`]: NiftiError::TruncatedExtension
//! [`ExtensionTooLarge`]: NiftiError::ExtensionTooLarge
//! [`InvalidSliceSize`]: NiftiError::InvalidSliceSize
//! [`InvalidState`]: NiftiError::InvalidState
//! [`Io`]: NiftiError::Io

use std::io;
use thiserror::Error;

/// Error type for NIFTI stream operations.
#[derive(Debug, Error)]
pub enum NiftiError {
    /// Neither byte order yields a `dim[0]` in `1..=7`.
    ///
    /// Carries `dim[0]` as read little-endian and big-endian.
    #[error("could not detect byte order: dim[0] reads {little} (LE) and {big} (BE)")]
    UndeterminedByteOrder { little: u16, big: u16 },

    /// The source ended before the 352-byte header region was complete.
    #[error("stream ended after {have} bytes, header needs {needed}")]
    TruncatedHeader { have: usize, needed: usize },

    /// The source ended inside the extension region.
    #[error("stream ended after {have} of {needed} extension bytes")]
    TruncatedExtension { have: usize, needed: usize },

    /// The header decoded but violates a NIFTI-1 invariant.
    ///
    /// Decoding reports this as advisory through
    /// [`NiftiHeader::validate`](crate::NiftiHeader::validate); streams only
    /// raise it when [`StreamOptions::strict`](crate::StreamOptions::strict) is set.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// `vox_offset` declares an extension larger than the configured limit.
    #[error("extension of {len} bytes exceeds the limit of {limit} bytes")]
    ExtensionTooLarge { len: usize, limit: usize },

    /// `dim[1] * dim[2] * bitpix / 8` is not a positive byte count.
    #[error("invalid slice size (dim[1]={dim1}, dim[2]={dim2}, bitpix={bitpix})")]
    InvalidSliceSize { dim1: i16, dim2: i16, bitpix: i16 },

    /// API misuse: a region was requested before it was produced, or the
    /// source was claimed twice.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// A fixed-size buffer was shorter than the layout requires.
    #[error("buffer too small: need {needed} bytes, have {have}")]
    BufferTooSmall { needed: usize, have: usize },

    /// Error raised by the byte source.
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, NiftiError>;
